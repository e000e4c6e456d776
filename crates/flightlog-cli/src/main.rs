// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use flightlog_core::events::{scan_calendars, CalendarEvent};
use flightlog_core::{
    paths, report, routes, AirportCode, AirportDirectory, CachedEventSource, Config,
    ConfigManager, DistanceModel, EventSource, FlightSegment, FlightStatistics, JsonEventFile,
    SegmentLog,
};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to the per-user config directory)
    #[arg(short, long, env = "FLIGHTLOG_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Airport reference table, overriding the configured one
    #[arg(long, global = true)]
    airports: Option<PathBuf>,

    /// Country counted as home for the domestic/international breakdown
    #[arg(long, global = true)]
    home_country: Option<String>,

    /// How many airports to list under most takeoffs and landings
    #[arg(long, global = true)]
    top: Option<usize>,

    /// Log debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Calendar export (JSON) to read flights from
    #[arg(long, conflicts_with = "segments")]
    events: Option<PathBuf>,

    /// Flat segment log, one AAA-BBB,<type> per line
    #[arg(long)]
    segments: Option<PathBuf>,

    /// Ignore the event cache and re-read the calendar export
    #[arg(long)]
    refresh: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full statistics report
    Report {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Write great-circle paths for every segment as CSV
    Paths {
        #[command(flatten)]
        source: SourceArgs,
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Save the flights found in a source as a segment log
    Segments {
        #[command(flatten)]
        source: SourceArgs,
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// List the flights of one year
    Year {
        year: i32,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Find which calendar exports contain flights
    Scan {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Distance between two airports
    Distance {
        origin: AirportCode,
        destination: AirportCode,
    },
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    let config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    // A logger may already be installed when embedded; that is not fatal.
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

fn load_config(cli: &Cli) -> Result<Config> {
    let manager = ConfigManager::new(
        cli.config
            .clone()
            .unwrap_or_else(ConfigManager::default_path),
    );
    log::debug!("Using config {}", manager.path().display());
    let mut config = manager.load()?;

    if let Some(ref airports) = cli.airports {
        config.airports_path = airports.clone();
    }
    if let Some(ref home) = cli.home_country {
        config.home_country = home.clone();
    }
    if let Some(top) = cli.top {
        config.top_endpoints = top;
    }
    Ok(config)
}

fn load_directory(config: &Config) -> Result<AirportDirectory> {
    AirportDirectory::load_file(&config.airports_path).with_context(|| {
        format!(
            "Failed to load airport table {}",
            config.airports_path.display()
        )
    })
}

fn load_segments(source: &SourceArgs, config: &Config) -> Result<Vec<FlightSegment>> {
    let events = if let Some(ref log_path) = source.segments {
        SegmentLog::new(log_path).list_events()?
    } else if let Some(ref export) = source.events {
        let use_cache = config.use_cached_events && !source.refresh;
        CachedEventSource::new(
            JsonEventFile::new(export),
            &config.events_cache_path,
            use_cache,
        )
        .list_events()?
    } else {
        JsonEventFile::new(&config.events_cache_path)
            .list_events()
            .context("No --events or --segments given and no event cache to fall back on")?
    };

    Ok(routes::segments_from_events(&events))
}

fn calendar_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Report { source } => {
            let directory = load_directory(&config)?;
            let segments = load_segments(source, &config)?;
            let stats = FlightStatistics::compute(&segments, &directory, &config.stats_options());
            print!(
                "{}",
                report::render_report(
                    &stats,
                    &directory,
                    config.distance_unit,
                    &config.home_country
                )
            );
        }
        Commands::Paths { source, output } => {
            let directory = load_directory(&config)?;
            let segments = load_segments(source, &config)?;
            let export = paths::write_path_file(output, &segments, &directory)?;
            println!(
                "Wrote {} points for {} segments to {}",
                export.points_written,
                export.segments_written,
                output.display()
            );
            for issue in &export.issues {
                println!("Skipped {}", issue);
            }
        }
        Commands::Segments { source, output } => {
            let segments = load_segments(source, &config)?;
            SegmentLog::save_file(output, &segments)?;
            println!("Wrote {} segments to {}", segments.len(), output.display());
        }
        Commands::Year { year, source } => {
            let segments = load_segments(source, &config)?;
            print!("{}", report::render_year(&segments, *year));
        }
        Commands::Scan { files } => {
            let mut calendars: Vec<(String, Vec<CalendarEvent>)> = Vec::new();
            for file in files {
                calendars.push((calendar_name(file), JsonEventFile::new(file).list_events()?));
            }
            for found in scan_calendars(&calendars) {
                println!(
                    "{} has {} events matching format.",
                    found.calendar, found.flights
                );
            }
        }
        Commands::Distance {
            origin,
            destination,
        } => {
            let directory = load_directory(&config)?;
            let (a, b) = directory.lookup_pair(*origin, *destination)?;
            let km = config
                .distance_model
                .distance_km(a.latitude, a.longitude, b.latitude, b.longitude)?;
            println!(
                "{}-{}: {:.0} {} ({})",
                origin,
                destination,
                config.distance_unit.from_km(km),
                config.distance_unit.label(),
                match config.distance_model {
                    DistanceModel::Ellipsoidal => "WGS84",
                    DistanceModel::Spherical => "sphere",
                }
            );
        }
    }

    Ok(())
}
