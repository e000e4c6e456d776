// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Where flight records come from.
//!
//! The core only needs a summary line and a date per record. Calendar
//! providers sit behind [`EventSource`]; the adapters here read calendar
//! exports and flat segment files, and [`CachedEventSource`] keeps a local
//! copy so a provider is only queried on refresh.

use crate::routes;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub date: Option<NaiveDate>,
}

pub trait EventSource {
    fn list_events(&self) -> Result<Vec<CalendarEvent>>;

    /// Identifies the data this source would return, so a cache built from
    /// one source is not served for another. `None` when unknown.
    fn source_id(&self) -> Option<String> {
        None
    }
}

impl EventSource for Vec<CalendarEvent> {
    fn list_events(&self) -> Result<Vec<CalendarEvent>> {
        Ok(self.clone())
    }
}

// Calendar API item shape. Only the fields we read are modelled.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start: Option<RawStart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawStart {
    #[serde(
        rename = "dateTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawExport {
    List(Vec<RawEvent>),
    Page { items: Vec<RawEvent> },
}

impl RawStart {
    /// Calendar date as written in the event, before any timezone shift.
    fn calendar_date(&self) -> Option<NaiveDate> {
        if let Some(ref stamp) = self.date_time {
            if let Ok(dt) = DateTime::parse_from_rfc3339(stamp) {
                return Some(dt.date_naive());
            }
            if let Some(Ok(dt)) = stamp
                .get(..19)
                .map(|s| NaiveDateTime::parse_from_str(s, DATE_TIME_FORMAT))
            {
                return Some(dt.date());
            }
            log::warn!("Unrecognised event start time '{}'", stamp);
        }
        if let Some(ref day) = self.date {
            match NaiveDate::parse_from_str(day, DATE_FORMAT) {
                Ok(date) => return Some(date),
                Err(_) => log::warn!("Unrecognised event start date '{}'", day),
            }
        }
        None
    }
}

impl From<RawEvent> for CalendarEvent {
    fn from(raw: RawEvent) -> Self {
        Self {
            date: raw.start.as_ref().and_then(RawStart::calendar_date),
            summary: raw.summary.unwrap_or_default(),
        }
    }
}

impl From<&CalendarEvent> for RawEvent {
    fn from(event: &CalendarEvent) -> Self {
        Self {
            summary: Some(event.summary.clone()),
            start: event.date.map(|d| RawStart {
                date_time: None,
                date: Some(d.format(DATE_FORMAT).to_string()),
            }),
        }
    }
}

/// A calendar export on disk: either a bare JSON array of events or an API
/// response page with an `items` array.
#[derive(Debug, Clone)]
pub struct JsonEventFile {
    path: PathBuf,
}

impl JsonEventFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parse<R: Read>(reader: R) -> Result<Vec<CalendarEvent>> {
        let export: RawExport =
            serde_json::from_reader(reader).context("Failed to parse calendar events")?;
        let raw = match export {
            RawExport::List(items) | RawExport::Page { items } => items,
        };
        Ok(raw.into_iter().map(CalendarEvent::from).collect())
    }

    /// Writes events in the same shape [`JsonEventFile::parse`] reads.
    pub fn save(&self, events: &[CalendarEvent]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("Failed to create event cache directory")?;
            }
        }
        let raw: Vec<RawEvent> = events.iter().map(RawEvent::from).collect();
        let content = serde_json::to_string_pretty(&raw).context("Failed to serialize events")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

impl EventSource for JsonEventFile {
    /// Path, size and modification time of the export.
    fn source_id(&self) -> Option<String> {
        let path = fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone());
        let mut id = path.display().to_string();
        if let Ok(meta) = fs::metadata(&self.path) {
            id.push_str(&format!("|{}", meta.len()));
            if let Ok(since_epoch) = meta
                .modified()
                .map(|m| m.duration_since(UNIX_EPOCH).unwrap_or_default())
            {
                id.push_str(&format!("|{}", since_epoch.as_nanos()));
            }
        }
        Some(id)
    }

    fn list_events(&self) -> Result<Vec<CalendarEvent>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open events file {}", self.path.display()))?;
        let events = Self::parse(BufReader::new(file))
            .with_context(|| format!("Invalid events file {}", self.path.display()))?;
        log::info!("Read {} events from {}", events.len(), self.path.display());
        Ok(events)
    }
}

/// Serves events from a local cache, asking `inner` only when the cache is
/// disabled, missing, or was built from a different source. A fresh answer
/// from `inner` replaces the cache.
///
/// The source id of `inner` is stored beside the cache (`<cache>.source`).
pub struct CachedEventSource<S> {
    inner: S,
    cache: JsonEventFile,
    stamp_path: PathBuf,
    use_cache: bool,
}

impl<S: EventSource> CachedEventSource<S> {
    pub fn new<P: AsRef<Path>>(inner: S, cache_path: P, use_cache: bool) -> Self {
        let cache_path = cache_path.as_ref();
        Self {
            inner,
            cache: JsonEventFile::new(cache_path),
            stamp_path: cache_path.with_extension("source"),
            use_cache,
        }
    }

    fn cache_is_current(&self) -> bool {
        if !self.use_cache || !self.cache.path().exists() {
            return false;
        }
        match self.inner.source_id() {
            None => true,
            Some(id) => match fs::read_to_string(&self.stamp_path) {
                Ok(stored) if stored == id => true,
                _ => {
                    log::info!(
                        "Event cache {} was built from another source, refreshing",
                        self.cache.path().display()
                    );
                    false
                }
            },
        }
    }
}

impl<S: EventSource> EventSource for CachedEventSource<S> {
    fn list_events(&self) -> Result<Vec<CalendarEvent>> {
        if self.cache_is_current() {
            log::debug!("Using cached events at {}", self.cache.path().display());
            return self.cache.list_events();
        }

        let events = self.inner.list_events()?;
        self.cache.save(&events)?;
        match self.inner.source_id() {
            Some(id) => fs::write(&self.stamp_path, id)
                .with_context(|| format!("Failed to write {}", self.stamp_path.display()))?,
            None => {
                if self.stamp_path.exists() {
                    fs::remove_file(&self.stamp_path).with_context(|| {
                        format!("Failed to remove {}", self.stamp_path.display())
                    })?;
                }
            }
        }
        log::info!(
            "Refreshed event cache at {} ({} events)",
            self.cache.path().display(),
            events.len()
        );
        Ok(events)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMatch {
    pub calendar: String,
    pub flights: usize,
}

/// Counts route-shaped summaries per calendar, keeping only calendars that
/// have any. Useful for spotting flights filed in the wrong calendar.
pub fn scan_calendars(calendars: &[(String, Vec<CalendarEvent>)]) -> Vec<CalendarMatch> {
    calendars
        .iter()
        .filter_map(|(name, events)| {
            let flights = events
                .iter()
                .filter(|e| routes::is_route_summary(&e.summary))
                .count();
            (flights > 0).then(|| CalendarMatch {
                calendar: name.clone(),
                flights,
            })
        })
        .collect()
}
