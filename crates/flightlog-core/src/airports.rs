// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Airport reference table, keyed by IATA code.
//!
//! The table is the OpenFlights `airports.dat` layout: headerless CSV with
//! `airport_id, name, city, country, IATA, ICAO, latitude, longitude, ...`.
//! Only the first eight columns are read; anything after the longitude is
//! ignored so both the old 12-column and current 14-column files load.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

const COL_NAME: usize = 1;
const COL_CITY: usize = 2;
const COL_COUNTRY: usize = 3;
const COL_IATA: usize = 4;
const COL_LAT: usize = 6;
const COL_LON: usize = 7;
const MIN_COLUMNS: usize = COL_LON + 1;

/// OpenFlights writes `\N` for missing values.
const NULL_FIELD: &str = "\\N";

/// Three uppercase ASCII letters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AirportCode([u8; 3]);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid airport code '{0}': expected three uppercase letters")]
pub struct InvalidCode(pub String);

impl AirportCode {
    pub fn as_str(&self) -> &str {
        // Only ever built from validated ASCII.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl FromStr for AirportCode {
    type Err = InvalidCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_uppercase) {
            return Err(InvalidCode(s.to_string()));
        }
        Ok(Self([bytes[0], bytes[1], bytes[2]]))
    }
}

impl TryFrom<String> for AirportCode {
    type Error = InvalidCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AirportCode> for String {
    fn from(code: AirportCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AirportCode({})", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportRecord {
    pub code: AirportCode,
    pub name: String,
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl AirportRecord {
    /// (latitude, longitude) in decimal degrees.
    pub fn location(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Malformed airport table at line {line}: {message}")]
    DataFormat { line: u64, message: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("No airport found for code {0}")]
    NotFound(AirportCode),
    #[error("{count} airports share code {code}")]
    Ambiguous { code: AirportCode, count: usize },
}

/// Read-only map from IATA code to airport.
///
/// Codes that occur more than once in the source table are remembered and
/// resolve to [`LookupError::Ambiguous`] rather than to an arbitrary row.
#[derive(Debug, Default, Clone)]
pub struct AirportDirectory {
    airports: HashMap<AirportCode, AirportRecord>,
    duplicates: BTreeMap<AirportCode, usize>,
}

impl AirportDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<I: IntoIterator<Item = AirportRecord>>(records: I) -> Self {
        let mut directory = Self::new();
        for record in records {
            directory.insert(record);
        }
        directory
    }

    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, DirectoryError> {
        let file = File::open(path.as_ref())?;
        let directory = Self::load(BufReader::new(file))?;
        log::info!(
            "Loaded {} airports from {}",
            directory.len(),
            path.as_ref().display()
        );
        Ok(directory)
    }

    pub fn load<R: Read>(reader: R) -> Result<Self, DirectoryError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut directory = Self::new();
        let mut skipped = 0usize;

        for result in rdr.records() {
            let row = result?;
            let line = row.position().map(|p| p.line()).unwrap_or_default();

            if row.len() < MIN_COLUMNS {
                return Err(DirectoryError::DataFormat {
                    line,
                    message: format!("expected at least {} columns, found {}", MIN_COLUMNS, row.len()),
                });
            }

            let raw_code = row[COL_IATA].trim();
            if raw_code.is_empty() || raw_code == NULL_FIELD {
                // No IATA code assigned; nothing can refer to this airport.
                skipped += 1;
                continue;
            }

            let code = raw_code
                .parse::<AirportCode>()
                .map_err(|e| DirectoryError::DataFormat {
                    line,
                    message: e.to_string(),
                })?;
            let latitude = parse_degrees(&row[COL_LAT], 90.0, "latitude", line)?;
            let longitude = parse_degrees(&row[COL_LON], 180.0, "longitude", line)?;

            directory.insert(AirportRecord {
                code,
                name: row[COL_NAME].trim().to_string(),
                city: row[COL_CITY].trim().to_string(),
                country: row[COL_COUNTRY].trim().to_string(),
                latitude,
                longitude,
            });
        }

        log::debug!(
            "Airport table parsed: {} codes, {} rows without IATA code, {} duplicate codes",
            directory.len(),
            skipped,
            directory.duplicates.len()
        );

        Ok(directory)
    }

    fn insert(&mut self, record: AirportRecord) {
        let code = record.code;
        if self.airports.contains_key(&code) {
            let count = self.duplicates.entry(code).or_insert(1);
            *count += 1;
            if *count == 2 {
                log::warn!("Airport code {} appears more than once in the reference table", code);
            }
            return;
        }
        self.airports.insert(code, record);
    }

    /// Exactly one airport for `code`, or why not.
    pub fn lookup(&self, code: AirportCode) -> Result<&AirportRecord, LookupError> {
        if let Some(&count) = self.duplicates.get(&code) {
            return Err(LookupError::Ambiguous { code, count });
        }
        self.airports.get(&code).ok_or(LookupError::NotFound(code))
    }

    /// Both endpoints of a route, origin first.
    pub fn lookup_pair(
        &self,
        origin: AirportCode,
        destination: AirportCode,
    ) -> Result<(&AirportRecord, &AirportRecord), LookupError> {
        Ok((self.lookup(origin)?, self.lookup(destination)?))
    }

    /// Codes seen more than once, with how many rows carried each.
    pub fn duplicates(&self) -> impl Iterator<Item = (AirportCode, usize)> + '_ {
        self.duplicates.iter().map(|(code, count)| (*code, *count))
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }
}

fn parse_degrees(field: &str, limit: f64, what: &str, line: u64) -> Result<f64, DirectoryError> {
    let value = field
        .trim()
        .parse::<f64>()
        .map_err(|_| DirectoryError::DataFormat {
            line,
            message: format!("{} '{}' is not a number", what, field.trim()),
        })?;
    if !(-limit..=limit).contains(&value) {
        return Err(DirectoryError::DataFormat {
            line,
            message: format!("{} {} outside [-{}, {}]", what, value, limit, limit),
        });
    }
    Ok(value)
}
