// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Plain-text rendering of computed statistics.

use crate::airports::AirportDirectory;
use crate::geodesic::DistanceUnit;
use crate::routes::FlightSegment;
use crate::stats::{self, AirportCount, EndpointRole, FlightStatistics, TravelCategory};
use std::fmt::{self, Write as _};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Borrowing view that renders the full report through `Display`.
pub struct Report<'a> {
    pub stats: &'a FlightStatistics,
    pub directory: &'a AirportDirectory,
    pub unit: DistanceUnit,
    pub home_country: &'a str,
}

impl<'a> Report<'a> {
    fn write_extremes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Segment flight distances:")?;
        let label = self.unit.label();
        match self.stats.longest {
            Some(longest) => writeln!(
                f,
                "\t Longest segment flown is {}, at {:5.0} {}.",
                longest.route,
                self.unit.from_km(longest.distance_km),
                label
            )?,
            None => writeln!(f, "\tNo measurable segments.")?,
        }
        if let Some(shortest) = self.stats.shortest {
            writeln!(
                f,
                "\tShortest segment flown is {}, at {:5.0} {}.",
                shortest.route,
                self.unit.from_km(shortest.distance_km),
                label
            )?;
        }
        Ok(())
    }

    fn write_total(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = &self.stats.total;
        let amount = group_thousands(self.unit.from_km(total.distance_km) as u64);
        match total.since {
            Some(since) => writeln!(
                f,
                "Lifetime air mileage flown since {} is {} {}.",
                since.format(DATE_FORMAT),
                amount,
                self.unit.label()
            ),
            None => writeln!(
                f,
                "Lifetime air mileage flown is {} {}.",
                amount,
                self.unit.label()
            ),
        }
    }

    fn write_endpoints(
        &self,
        f: &mut fmt::Formatter<'_>,
        role: EndpointRole,
        counts: &[AirportCount],
    ) -> fmt::Result {
        writeln!(f, "Most {}s:", role.noun())?;
        for count in counts {
            writeln!(f, "\t{}, {} times", count.code, count.count)?;
        }
        Ok(())
    }

    fn write_singles(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Airports that only appear as a single endpoint (landing or takeoff):"
        )?;
        for code in &self.stats.single_appearance {
            match self.directory.lookup(*code) {
                Ok(airport) => writeln!(f, "\t{} ({})", code, airport.name)?,
                Err(_) => writeln!(f, "\t{}", code)?,
            }
        }
        Ok(())
    }

    fn write_breakdown(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let breakdown = &self.stats.breakdown;
        writeln!(f, "Did I need a passport?")?;
        for category in TravelCategory::ALL {
            writeln!(
                f,
                "\t{:3} flights ({:3} unique segments) {}",
                breakdown.flights(category),
                breakdown.unique_routes(category),
                category.describe(self.home_country)
            )?;
        }
        writeln!(f)?;

        let countries: Vec<&str> = breakdown
            .foreign_countries
            .iter()
            .map(String::as_str)
            .collect();
        writeln!(f, "Countries flown to/from ({}):", countries.len())?;
        writeln!(f, "\t{}", countries.join(", "))
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats;

        self.write_extremes(f)?;
        writeln!(f)?;
        self.write_total(f)?;
        writeln!(f)?;

        writeln!(f, "Most common segment flown:")?;
        for route in &stats.most_frequent {
            writeln!(f, "\t{}, {} times", route.route, route.count)?;
        }
        writeln!(f)?;

        self.write_endpoints(f, EndpointRole::Origin, &stats.top_origins)?;
        writeln!(f)?;
        self.write_endpoints(f, EndpointRole::Destination, &stats.top_destinations)?;
        writeln!(f)?;

        self.write_singles(f)?;
        writeln!(f)?;

        writeln!(f, "Total flight segments per year:")?;
        for (year, count) in &stats.per_year {
            writeln!(f, "\t{:2} flights in {}", count, year)?;
        }
        if stats.undated > 0 {
            writeln!(f, "\t{:2} flights without a date", stats.undated)?;
        }
        writeln!(f)?;

        self.write_breakdown(f)?;

        let issues = stats.issues();
        if !issues.is_empty() {
            writeln!(f)?;
            writeln!(f, "Skipped routes ({}):", issues.len())?;
            for issue in issues {
                writeln!(f, "\t{}", issue)?;
            }
        }
        Ok(())
    }
}

pub fn render_report(
    stats: &FlightStatistics,
    directory: &AirportDirectory,
    unit: DistanceUnit,
    home_country: &str,
) -> String {
    Report {
        stats,
        directory,
        unit,
        home_country,
    }
    .to_string()
}

/// `YYYY-MM-DD - AAA-BBB <type>`, or just the route when there is no type.
pub fn listing_line(segment: &FlightSegment) -> String {
    let mut line = String::new();
    if let Some(date) = segment.date {
        let _ = write!(line, "{} - ", date.format(DATE_FORMAT));
    }
    let _ = write!(line, "{}", segment.route());
    if !segment.category.is_empty() {
        let _ = write!(line, " {}", segment.category);
    }
    line
}

/// Headline and listing of the flights in one calendar year.
pub fn render_year(segments: &[FlightSegment], year: i32) -> String {
    let flights = stats::flights_in_year(segments, year);
    let mut out = match flights.len() {
        0 => format!("No flights in {}\n", year),
        1 => format!("1 flight in {}\n", year),
        n => format!("{} flights in {}\n", n, year),
    };
    if !flights.is_empty() {
        out.push('\n');
        for segment in flights {
            out.push_str(&listing_line(segment));
            out.push('\n');
        }
    }
    out
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
