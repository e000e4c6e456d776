// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Aggregates over a flight log.
//!
//! Every function here is a pure read of its inputs and can be called on
//! its own. Routes that cannot be resolved against the airport directory,
//! or measured, are skipped and returned as [`RouteIssue`]s.
//!
//! Ordering is deterministic: route-level results keep first-seen order,
//! frequency results are sorted by count (descending) then code.

use crate::airports::{AirportCode, AirportDirectory, LookupError};
use crate::geodesic::DistanceModel;
use crate::routes::{DirectedRoute, FlightSegment, RouteKey};
use crate::{RouteIssue, SkipReason};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

pub const DEFAULT_HOME_COUNTRY: &str = "United States";
pub const DEFAULT_TOP_ENDPOINTS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct StatsOptions {
    pub home_country: String,
    /// How many frequency ranks to list for takeoffs and landings.
    pub top_endpoints: usize,
    pub distance_model: DistanceModel,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            home_country: DEFAULT_HOME_COUNTRY.to_string(),
            top_endpoints: DEFAULT_TOP_ENDPOINTS,
            distance_model: DistanceModel::default(),
        }
    }
}

fn measure(
    key: RouteKey,
    directory: &AirportDirectory,
    model: DistanceModel,
) -> Result<f64, SkipReason> {
    let (a, b) = directory.lookup_pair(key.first(), key.second())?;
    let ((lat1, lon1), (lat2, lon2)) = (a.location(), b.location());
    Ok(model.distance_km(lat1, lon1, lat2, lon2)?)
}

// ---------------------------------------------------------------------------
// Distances
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteDistance {
    pub route: RouteKey,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteDistances {
    /// One entry per undirected route, in first-flown order.
    pub routes: Vec<RouteDistance>,
    pub issues: Vec<RouteIssue>,
}

impl RouteDistances {
    pub fn get(&self, key: RouteKey) -> Option<f64> {
        self.routes
            .iter()
            .find(|r| r.route == key)
            .map(|r| r.distance_km)
    }
}

pub fn route_distances(
    segments: &[FlightSegment],
    directory: &AirportDirectory,
    model: DistanceModel,
) -> RouteDistances {
    let mut seen = HashSet::new();
    let mut result = RouteDistances::default();

    for segment in segments {
        let key = segment.route().key();
        if !seen.insert(key) {
            continue;
        }
        match measure(key, directory, model) {
            Ok(distance_km) => result.routes.push(RouteDistance {
                route: key,
                distance_km,
            }),
            Err(reason) => result.issues.push(RouteIssue::new(segment.route(), reason)),
        }
    }

    result
}

/// A route with its length, in a direction that was actually flown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentExtreme {
    pub route: DirectedRoute,
    pub distance_km: f64,
}

fn orient(key: RouteKey, segments: &[FlightSegment]) -> DirectedRoute {
    let alphabetised = key.as_directed();
    if segments.iter().any(|s| s.route() == alphabetised) {
        alphabetised
    } else {
        alphabetised.reversed()
    }
}

/// Longest measured route. Ties go to the route flown first.
pub fn longest_segment(
    distances: &RouteDistances,
    segments: &[FlightSegment],
) -> Option<SegmentExtreme> {
    extreme(distances, segments, |candidate, best| candidate > best)
}

/// Shortest measured route. Ties go to the route flown first.
pub fn shortest_segment(
    distances: &RouteDistances,
    segments: &[FlightSegment],
) -> Option<SegmentExtreme> {
    extreme(distances, segments, |candidate, best| candidate < best)
}

fn extreme(
    distances: &RouteDistances,
    segments: &[FlightSegment],
    better: impl Fn(f64, f64) -> bool,
) -> Option<SegmentExtreme> {
    let mut best: Option<&RouteDistance> = None;
    for candidate in &distances.routes {
        match best {
            Some(current) if !better(candidate.distance_km, current.distance_km) => {}
            _ => best = Some(candidate),
        }
    }
    best.map(|r| SegmentExtreme {
        route: orient(r.route, segments),
        distance_km: r.distance_km,
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TotalDistance {
    pub distance_km: f64,
    /// Segments that contributed to the total.
    pub segments_counted: usize,
    pub segments_skipped: usize,
    /// Earliest dated segment in the log.
    pub since: Option<NaiveDate>,
    pub issues: Vec<RouteIssue>,
}

/// Lifetime distance: every segment counts, so an out-and-back trip adds
/// the route length twice.
pub fn total_distance(
    segments: &[FlightSegment],
    directory: &AirportDirectory,
    model: DistanceModel,
) -> TotalDistance {
    let mut memo: HashMap<RouteKey, Option<f64>> = HashMap::new();
    let mut total = TotalDistance {
        since: segments.iter().filter_map(|s| s.date).min(),
        ..TotalDistance::default()
    };

    for segment in segments {
        let key = segment.route().key();
        let distance = *memo.entry(key).or_insert_with(|| {
            match measure(key, directory, model) {
                Ok(km) => Some(km),
                Err(reason) => {
                    total.issues.push(RouteIssue::new(segment.route(), reason));
                    None
                }
            }
        });

        match distance {
            Some(km) => {
                total.distance_km += km;
                total.segments_counted += 1;
            }
            None => total.segments_skipped += 1,
        }
    }

    total
}

// ---------------------------------------------------------------------------
// Frequencies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteCount {
    pub route: DirectedRoute,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AirportCount {
    pub code: AirportCode,
    pub count: usize,
}

fn directed_counts(segments: &[FlightSegment]) -> BTreeMap<DirectedRoute, usize> {
    let mut counts = BTreeMap::new();
    for segment in segments {
        *counts.entry(segment.route()).or_insert(0) += 1;
    }
    counts
}

/// Every directed route flown the maximum number of times.
pub fn most_frequent_segments(segments: &[FlightSegment]) -> Vec<RouteCount> {
    let counts = directed_counts(segments);
    let Some(&max) = counts.values().max() else {
        return Vec::new();
    };
    counts
        .into_iter()
        .filter(|&(_, count)| count == max)
        .map(|(route, count)| RouteCount { route, count })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointRole {
    Origin,
    Destination,
}

impl EndpointRole {
    pub fn of(self, segment: &FlightSegment) -> AirportCode {
        match self {
            EndpointRole::Origin => segment.origin,
            EndpointRole::Destination => segment.destination,
        }
    }

    pub fn noun(self) -> &'static str {
        match self {
            EndpointRole::Origin => "takeoff",
            EndpointRole::Destination => "landing",
        }
    }
}

/// The `k` most frequent airports in one role. Airports tied with the
/// k-th entry are included too, so the list can run longer than `k`.
pub fn top_endpoints(segments: &[FlightSegment], role: EndpointRole, k: usize) -> Vec<AirportCount> {
    let mut counts: BTreeMap<AirportCode, usize> = BTreeMap::new();
    for segment in segments {
        *counts.entry(role.of(segment)).or_insert(0) += 1;
    }

    let mut ranked: Vec<AirportCount> = counts
        .into_iter()
        .map(|(code, count)| AirportCount { code, count })
        .collect();
    // Stable: equal counts stay in code order.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));

    if k == 0 {
        return Vec::new();
    }
    let Some(cutoff) = ranked.get(k - 1).or(ranked.last()).map(|c| c.count) else {
        return Vec::new();
    };
    ranked.into_iter().take_while(|c| c.count >= cutoff).collect()
}

/// Airports that appear in exactly one segment, as either endpoint.
pub fn single_appearance_airports(segments: &[FlightSegment]) -> Vec<AirportCode> {
    let mut counts: BTreeMap<AirportCode, usize> = BTreeMap::new();
    for segment in segments {
        *counts.entry(segment.origin).or_insert(0) += 1;
        *counts.entry(segment.destination).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .filter(|&(_, count)| count == 1)
        .map(|(code, _)| code)
        .collect()
}

/// Dated segments per calendar year. Undated segments are not counted.
pub fn flights_per_year(segments: &[FlightSegment]) -> BTreeMap<i32, usize> {
    let mut per_year = BTreeMap::new();
    for year in segments.iter().filter_map(FlightSegment::year) {
        *per_year.entry(year).or_insert(0) += 1;
    }
    per_year
}

/// The segments flown in `year`, in log order.
pub fn flights_in_year(segments: &[FlightSegment], year: i32) -> Vec<&FlightSegment> {
    segments.iter().filter(|s| s.year() == Some(year)).collect()
}

// ---------------------------------------------------------------------------
// Domestic / international
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelCategory {
    Domestic,
    Outward,
    Inward,
    International,
}

impl TravelCategory {
    pub const ALL: [TravelCategory; 4] = [
        TravelCategory::Domestic,
        TravelCategory::Outward,
        TravelCategory::Inward,
        TravelCategory::International,
    ];

    pub fn from_countries(origin: &str, destination: &str, home: &str) -> Self {
        match (origin == home, destination == home) {
            (true, true) => TravelCategory::Domestic,
            (true, false) => TravelCategory::Outward,
            (false, true) => TravelCategory::Inward,
            (false, false) => TravelCategory::International,
        }
    }

    pub fn describe(self, home: &str) -> String {
        match self {
            TravelCategory::Domestic => format!("within {}", home),
            TravelCategory::Outward => format!("from {} to another country", home),
            TravelCategory::Inward => format!("to {} from another country", home),
            TravelCategory::International => "between two foreign countries".to_string(),
        }
    }
}

impl fmt::Display for TravelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TravelCategory::Domestic => "domestic",
            TravelCategory::Outward => "outward",
            TravelCategory::Inward => "inward",
            TravelCategory::International => "international",
        };
        f.write_str(name)
    }
}

pub fn classify_route(
    route: DirectedRoute,
    directory: &AirportDirectory,
    home_country: &str,
) -> Result<TravelCategory, LookupError> {
    let (origin, destination) = directory.lookup_pair(route.origin, route.destination)?;
    Ok(TravelCategory::from_countries(
        &origin.country,
        &destination.country,
        home_country,
    ))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTally {
    /// Distinct directed routes in this category.
    pub routes: Vec<DirectedRoute>,
    /// Flights over those routes, repeats included.
    pub flights: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TravelBreakdown {
    tallies: BTreeMap<TravelCategory, CategoryTally>,
    pub foreign_countries: BTreeSet<String>,
    pub issues: Vec<RouteIssue>,
}

impl TravelBreakdown {
    pub fn tally(&self, category: TravelCategory) -> CategoryTally {
        self.tallies.get(&category).cloned().unwrap_or_default()
    }

    pub fn unique_routes(&self, category: TravelCategory) -> usize {
        self.tallies.get(&category).map_or(0, |t| t.routes.len())
    }

    pub fn flights(&self, category: TravelCategory) -> usize {
        self.tallies.get(&category).map_or(0, |t| t.flights)
    }
}

pub fn travel_breakdown(
    segments: &[FlightSegment],
    directory: &AirportDirectory,
    home_country: &str,
) -> TravelBreakdown {
    let mut breakdown = TravelBreakdown::default();

    for (route, count) in directed_counts(segments) {
        let (origin, destination) = match directory.lookup_pair(route.origin, route.destination) {
            Ok(pair) => pair,
            Err(e) => {
                breakdown.issues.push(RouteIssue::new(route, e));
                continue;
            }
        };

        let category =
            TravelCategory::from_countries(&origin.country, &destination.country, home_country);
        for country in [&origin.country, &destination.country] {
            if country != home_country {
                breakdown.foreign_countries.insert(country.clone());
            }
        }

        let tally = breakdown.tallies.entry(category).or_default();
        tally.routes.push(route);
        tally.flights += count;
    }

    breakdown
}

// ---------------------------------------------------------------------------
// Everything at once
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FlightStatistics {
    pub segment_count: usize,
    pub distances: RouteDistances,
    pub longest: Option<SegmentExtreme>,
    pub shortest: Option<SegmentExtreme>,
    pub total: TotalDistance,
    pub most_frequent: Vec<RouteCount>,
    pub top_origins: Vec<AirportCount>,
    pub top_destinations: Vec<AirportCount>,
    pub single_appearance: Vec<AirportCode>,
    pub per_year: BTreeMap<i32, usize>,
    pub undated: usize,
    pub breakdown: TravelBreakdown,
}

impl FlightStatistics {
    pub fn compute(
        segments: &[FlightSegment],
        directory: &AirportDirectory,
        options: &StatsOptions,
    ) -> Self {
        let distances = route_distances(segments, directory, options.distance_model);
        let longest = longest_segment(&distances, segments);
        let shortest = shortest_segment(&distances, segments);

        let stats = Self {
            segment_count: segments.len(),
            longest,
            shortest,
            total: total_distance(segments, directory, options.distance_model),
            most_frequent: most_frequent_segments(segments),
            top_origins: top_endpoints(segments, EndpointRole::Origin, options.top_endpoints),
            top_destinations: top_endpoints(
                segments,
                EndpointRole::Destination,
                options.top_endpoints,
            ),
            single_appearance: single_appearance_airports(segments),
            per_year: flights_per_year(segments),
            undated: segments.iter().filter(|s| s.date.is_none()).count(),
            breakdown: travel_breakdown(segments, directory, &options.home_country),
            distances,
        };

        let issues = stats.issues();
        for issue in &issues {
            log::warn!("Skipping route {}", issue);
        }
        log::info!(
            "Computed statistics over {} segments ({} distinct routes, {} skipped)",
            stats.segment_count,
            stats.distances.routes.len(),
            issues.len()
        );
        stats
    }

    /// Every skipped route, once each, in the order first reported.
    pub fn issues(&self) -> Vec<&RouteIssue> {
        let mut seen = HashSet::new();
        self.distances
            .issues
            .iter()
            .chain(&self.total.issues)
            .chain(&self.breakdown.issues)
            .filter(|issue| seen.insert(issue.to_string()))
            .collect()
    }
}
