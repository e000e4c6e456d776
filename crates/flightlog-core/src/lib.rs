pub mod airports;
pub mod config;
pub mod events;
pub mod geodesic;
pub mod logbook;
pub mod paths;
pub mod report;
pub mod routes;
pub mod stats;

use std::path::PathBuf;
use thiserror::Error;

pub use airports::{AirportCode, AirportDirectory, AirportRecord, DirectoryError, LookupError};
pub use config::{Config, ConfigManager};
pub use events::{CachedEventSource, CalendarEvent, EventSource, JsonEventFile};
pub use geodesic::{DistanceModel, DistanceUnit, GeodesicError, PathPoint};
pub use logbook::SegmentLog;
pub use routes::{DirectedRoute, FlightSegment, RouteKey};
pub use stats::{FlightStatistics, StatsOptions};

/// Why a route was left out of a computed result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipReason {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Geodesic(#[from] GeodesicError),
}

/// A route that could not be resolved or measured. Collected instead of
/// aborting, so one bad airport never hides the rest of the log. Whoever
/// reports the issues logs them; building one only traces at debug level.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteIssue {
    pub route: String,
    pub reason: SkipReason,
}

impl RouteIssue {
    pub fn new(route: impl ToString, reason: impl Into<SkipReason>) -> Self {
        let issue = Self {
            route: route.to_string(),
            reason: reason.into(),
        };
        log::debug!("Route {} left out: {}", issue.route, issue.reason);
        issue
    }
}

impl std::fmt::Display for RouteIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.route, self.reason)
    }
}

/// Per-user configuration directory (`~/.config/flightlog` on Linux).
pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("org", "flightlog", "flightlog")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".flightlog"))
}
