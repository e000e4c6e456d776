use crate::events::{CalendarEvent, EventSource};
use crate::routes::FlightSegment;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Flat text log with one `AAA-BBB,<type>` segment per line and no dates.
#[derive(Debug, Clone)]
pub struct SegmentLog {
    path: PathBuf,
}

impl SegmentLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<CalendarEvent>> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Failed to open segment log {}", path.as_ref().display()))?;
        Self::parse(BufReader::new(file))
    }

    pub fn save_file<P: AsRef<Path>>(path: P, segments: &[FlightSegment]) -> Result<()> {
        use std::io::Write;

        // Keep the previous log around
        let bak_path = path.as_ref().with_extension("bak");
        if path.as_ref().exists() {
            std::fs::copy(&path, &bak_path).context("Failed to create segment log backup")?;
        }

        let mut file = File::create(path).context("Failed to create segment log")?;
        for segment in segments {
            writeln!(file, "{}", segment.to_log_line())?;
        }

        Ok(())
    }

    /// Lines become undated events; route filtering happens downstream.
    pub fn parse<R: BufRead>(reader: R) -> Result<Vec<CalendarEvent>> {
        let mut events = Vec::new();

        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            events.push(CalendarEvent {
                summary: trimmed.to_string(),
                date: None,
            });
        }

        Ok(events)
    }
}

impl EventSource for SegmentLog {
    fn list_events(&self) -> Result<Vec<CalendarEvent>> {
        let events = Self::parse_file(&self.path)?;
        log::info!("Read {} lines from {}", events.len(), self.path.display());
        Ok(events)
    }
}
