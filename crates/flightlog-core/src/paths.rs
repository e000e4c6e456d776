// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Generated path file: one CSV row per geodesic point, grouped by segment.

use crate::airports::AirportDirectory;
use crate::geodesic;
use crate::routes::FlightSegment;
use crate::{RouteIssue, SkipReason};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const HEADER: [&str; 5] = ["longitude", "latitude", "airport_start", "airport_end", "type"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathExport {
    pub segments_written: usize,
    pub points_written: usize,
    pub issues: Vec<RouteIssue>,
}

fn segment_path(
    segment: &FlightSegment,
    directory: &AirportDirectory,
) -> Result<Vec<geodesic::PathPoint>, SkipReason> {
    let (origin, destination) = directory.lookup_pair(segment.origin, segment.destination)?;
    Ok(geodesic::path(
        origin.latitude,
        origin.longitude,
        destination.latitude,
        destination.longitude,
    )?)
}

/// Writes the path of every segment, in input order. Segments whose
/// airports cannot be resolved, or whose path cannot be computed, are left
/// out and reported in the returned summary.
pub fn export_paths<W: Write>(
    writer: W,
    segments: &[FlightSegment],
    directory: &AirportDirectory,
) -> Result<PathExport, csv::Error> {
    // Header is written by hand so an empty export still has one.
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(HEADER)?;

    let mut export = PathExport::default();
    for segment in segments {
        let points = match segment_path(segment, directory) {
            Ok(points) => points,
            Err(reason) => {
                export.issues.push(RouteIssue::new(segment.route(), reason));
                continue;
            }
        };

        let start = segment.origin.to_string();
        let end = segment.destination.to_string();
        for point in &points {
            wtr.write_record([
                point.longitude.to_string().as_str(),
                point.latitude.to_string().as_str(),
                start.as_str(),
                end.as_str(),
                segment.category.as_str(),
            ])?;
        }

        export.segments_written += 1;
        export.points_written += points.len();
    }
    wtr.flush()?;

    for issue in &export.issues {
        log::warn!("Skipping route {}", issue);
    }

    log::info!(
        "Exported {} points for {} segments ({} skipped)",
        export.points_written,
        export.segments_written,
        export.issues.len()
    );
    Ok(export)
}

pub fn write_path_file<P: AsRef<Path>>(
    path: P,
    segments: &[FlightSegment],
    directory: &AirportDirectory,
) -> Result<PathExport> {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    export_paths(file, segments, directory)
        .with_context(|| format!("Failed to write path file {}", path.display()))
}
