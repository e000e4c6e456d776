// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Flight segments extracted from free-text summaries such as
//! `"JFK-LHR,economy"` or `"SFO-NRT UA837"`.

use crate::airports::{AirportCode, InvalidCode};
use crate::events::CalendarEvent;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn route_regex() -> &'static Regex {
    static ROUTE_RE: OnceLock<Regex> = OnceLock::new();
    ROUTE_RE.get_or_init(|| Regex::new(r"(?s)^([A-Z]{3})-([A-Z]{3})(.*)$").unwrap())
}

/// True when the summary starts with an `AAA-BBB` route.
pub fn is_route_summary(summary: &str) -> bool {
    route_regex().is_match(summary)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightSegment {
    pub origin: AirportCode,
    pub destination: AirportCode,
    /// Whatever followed the route: cabin, carrier, flight number.
    pub category: String,
    pub date: Option<NaiveDate>,
}

impl FlightSegment {
    pub fn route(&self) -> DirectedRoute {
        DirectedRoute::new(self.origin, self.destination)
    }

    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }

    /// The `AAA-BBB,<type>` line used by segment log files.
    pub fn to_log_line(&self) -> String {
        format!("{},{}", self.route(), self.category)
    }
}

/// Parses a summary into a segment. Anything that does not start with an
/// `AAA-BBB` route is not a flight and yields `None`.
pub fn parse(summary: &str) -> Option<FlightSegment> {
    let caps = route_regex().captures(summary)?;
    let origin = caps[1].parse().ok()?;
    let destination = caps[2].parse().ok()?;
    let category = caps[3]
        .trim_start_matches(|c: char| c == ',' || c.is_whitespace())
        .trim_end()
        .to_string();

    Some(FlightSegment {
        origin,
        destination,
        category,
        date: None,
    })
}

pub fn parse_event(event: &CalendarEvent) -> Option<FlightSegment> {
    parse(&event.summary).map(|segment| FlightSegment {
        date: event.date,
        ..segment
    })
}

/// Flight segments among `events`, in event order.
pub fn segments_from_events(events: &[CalendarEvent]) -> Vec<FlightSegment> {
    let segments: Vec<FlightSegment> = events.iter().filter_map(parse_event).collect();
    log::debug!(
        "{} of {} events are flight segments",
        segments.len(),
        events.len()
    );
    segments
}

/// Every airport that appears as either endpoint.
pub fn unique_airports(segments: &[FlightSegment]) -> BTreeSet<AirportCode> {
    segments
        .iter()
        .flat_map(|s| [s.origin, s.destination])
        .collect()
}

/// Origin and destination in the order flown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DirectedRoute {
    pub origin: AirportCode,
    pub destination: AirportCode,
}

impl DirectedRoute {
    pub fn new(origin: AirportCode, destination: AirportCode) -> Self {
        Self {
            origin,
            destination,
        }
    }

    pub fn reversed(self) -> Self {
        Self::new(self.destination, self.origin)
    }

    pub fn key(self) -> RouteKey {
        RouteKey::new(self.origin, self.destination)
    }
}

impl fmt::Display for DirectedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.origin, self.destination)
    }
}

impl FromStr for DirectedRoute {
    type Err = InvalidCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (origin, destination) = s
            .split_once('-')
            .ok_or_else(|| InvalidCode(s.to_string()))?;
        Ok(Self::new(origin.parse()?, destination.parse()?))
    }
}

/// A pair of airports regardless of direction, stored alphabetised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteKey {
    first: AirportCode,
    second: AirportCode,
}

impl RouteKey {
    pub fn new(a: AirportCode, b: AirportCode) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    pub fn first(&self) -> AirportCode {
        self.first
    }

    pub fn second(&self) -> AirportCode {
        self.second
    }

    /// The alphabetised direction, first to second.
    pub fn as_directed(&self) -> DirectedRoute {
        DirectedRoute::new(self.first, self.second)
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.first, self.second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> AirportCode {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_log_line() {
        let segment = parse("JFK-LHR,economy").unwrap();
        assert_eq!(segment.origin, code("JFK"));
        assert_eq!(segment.destination, code("LHR"));
        assert_eq!(segment.category, "economy");
        assert_eq!(segment.date, None);
    }

    #[test]
    fn test_parse_calendar_summary() {
        let segment = parse("SFO-NRT UA837").unwrap();
        assert_eq!(segment.route().to_string(), "SFO-NRT");
        assert_eq!(segment.category, "UA837");

        let bare = parse("ORD-LAX").unwrap();
        assert_eq!(bare.category, "");
    }

    #[test]
    fn test_non_flights_are_filtered() {
        assert_eq!(parse("Lunch with Bob"), None);
        assert_eq!(parse("jfk-lhr"), None);
        assert_eq!(parse("Flight JFK-LHR"), None);
        assert_eq!(parse("JF-LHR"), None);
        assert_eq!(parse(""), None);
        assert!(!is_route_summary("Dentist"));
        assert!(is_route_summary("BOS-DCA delta"));
    }

    #[test]
    fn test_parse_event_keeps_date() {
        let event = CalendarEvent {
            summary: "BOS-DCA".to_string(),
            date: NaiveDate::from_ymd_opt(2014, 3, 9),
        };
        let segment = parse_event(&event).unwrap();
        assert_eq!(segment.year(), Some(2014));
    }

    #[test]
    fn test_segments_from_events_preserves_order() {
        let events = vec![
            CalendarEvent {
                summary: "Lunch".to_string(),
                date: None,
            },
            CalendarEvent {
                summary: "LHR-JFK".to_string(),
                date: None,
            },
            CalendarEvent {
                summary: "JFK-LAX".to_string(),
                date: None,
            },
        ];
        let routes: Vec<String> = segments_from_events(&events)
            .iter()
            .map(|s| s.route().to_string())
            .collect();
        assert_eq!(routes, vec!["LHR-JFK", "JFK-LAX"]);
    }

    #[test]
    fn test_route_key_ignores_direction() {
        let outbound = DirectedRoute::new(code("JFK"), code("LHR"));
        assert_eq!(outbound.key(), outbound.reversed().key());
        assert_eq!(outbound.key().first(), code("JFK"));
        assert_ne!(outbound, outbound.reversed());
        assert_eq!(
            RouteKey::new(code("LHR"), code("CDG")).as_directed().to_string(),
            "CDG-LHR"
        );
    }

    #[test]
    fn test_directed_route_from_str() {
        let route: DirectedRoute = "LHR-CDG".parse().unwrap();
        assert_eq!(route.origin, code("LHR"));
        assert!("LHRCDG".parse::<DirectedRoute>().is_err());
        assert!("LHR-cdg".parse::<DirectedRoute>().is_err());
    }

    #[test]
    fn test_unique_airports() {
        let segments: Vec<FlightSegment> = ["JFK-LHR", "LHR-CDG", "CDG-JFK"]
            .iter()
            .filter_map(|s| parse(s))
            .collect();
        let airports: Vec<String> = unique_airports(&segments)
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(airports, vec!["CDG", "JFK", "LHR"]);
    }

    #[test]
    fn test_log_line() {
        assert_eq!(
            parse("JFK-LHR,economy").unwrap().to_log_line(),
            "JFK-LHR,economy"
        );
    }
}
