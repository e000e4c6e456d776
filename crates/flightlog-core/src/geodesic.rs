// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Great-circle distances and paths.
//!
//! Distances and paths use Vincenty's formulae on the WGS84 ellipsoid. The
//! inverse problem (two points to distance and bearing) is iterative and can
//! fail to converge for nearly antipodal points; that surfaces as
//! [`GeodesicError::Convergence`] so a caller can skip the route. A spherical
//! haversine estimate is kept for statistics that do not need the
//! ellipsoid.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);

/// Mean radius used by the spherical model.
pub const SPHERE_RADIUS_KM: f64 = 6367.0;
pub const KM_PER_MILE: f64 = 1.60934;

const MAX_ITERATIONS: usize = 200;
const TOLERANCE: f64 = 1e-12;

/// One path point per this many kilometres of route.
const KM_PER_PATH_POINT: f64 = 1000.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeodesicError {
    #[error("Geodesic between ({lat1}, {lon1}) and ({lat2}, {lon2}) did not converge")]
    Convergence {
        lat1: f64,
        lon1: f64,
        lat2: f64,
        lon2: f64,
    },
    #[error("Invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },
}

/// A point on a path, longitude first to match plotting conventions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl PathPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// Earth model used to measure a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceModel {
    /// Vincenty inverse on WGS84.
    #[default]
    Ellipsoidal,
    /// Haversine on a sphere of radius [`SPHERE_RADIUS_KM`].
    Spherical,
}

impl DistanceModel {
    pub fn distance_km(
        self,
        lat1: f64,
        lon1: f64,
        lat2: f64,
        lon2: f64,
    ) -> Result<f64, GeodesicError> {
        match self {
            DistanceModel::Ellipsoidal => distance_km(lat1, lon1, lat2, lon2),
            DistanceModel::Spherical => {
                check_coordinate(lat1, lon1)?;
                check_coordinate(lat2, lon2)?;
                Ok(haversine_km(lat1, lon1, lat2, lon2))
            }
        }
    }
}

/// Unit used when presenting distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Miles,
    Kilometers,
}

impl DistanceUnit {
    pub fn from_km(self, km: f64) -> f64 {
        match self {
            DistanceUnit::Miles => km / KM_PER_MILE,
            DistanceUnit::Kilometers => km,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DistanceUnit::Miles => "miles",
            DistanceUnit::Kilometers => "km",
        }
    }
}

/// Solution of the inverse problem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inverse {
    pub distance_m: f64,
    /// Forward azimuth at the first point, degrees clockwise from north.
    pub initial_bearing: f64,
}

/// Ellipsoidal distance in kilometres.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<f64, GeodesicError> {
    inverse(lat1, lon1, lat2, lon2).map(|inv| inv.distance_m / 1000.0)
}

/// Spherical distance in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();
    SPHERE_RADIUS_KM * c
}

/// Number of points strictly between the endpoints of a path of this length.
pub fn interior_point_count(distance_km: f64) -> usize {
    1 + (distance_km / KM_PER_PATH_POINT).floor() as usize
}

/// Points along the geodesic from the first coordinate to the second.
///
/// The first and last points are the inputs exactly. Between them sit
/// [`interior_point_count`] points at equal geodesic spacing. Coincident
/// endpoints give the one location twice.
pub fn path(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<Vec<PathPoint>, GeodesicError> {
    let origin = PathPoint::new(lon1, lat1);
    let destination = PathPoint::new(lon2, lat2);

    let inv = inverse(lat1, lon1, lat2, lon2)?;
    if inv.distance_m == 0.0 {
        return Ok(vec![origin, destination]);
    }

    let interior = interior_point_count(inv.distance_m / 1000.0);
    let step = inv.distance_m / (interior + 1) as f64;

    let mut points = Vec::with_capacity(interior + 2);
    points.push(origin);
    for i in 1..=interior {
        let (lat, lon) = direct(lat1, lon1, inv.initial_bearing, step * i as f64)?;
        points.push(PathPoint::new(lon, lat));
    }
    points.push(destination);

    Ok(points)
}

fn check_coordinate(lat: f64, lon: f64) -> Result<(), GeodesicError> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(GeodesicError::InvalidCoordinate { lat, lon });
    }
    Ok(())
}

/// Vincenty's inverse formula.
pub fn inverse(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<Inverse, GeodesicError> {
    check_coordinate(lat1, lon1)?;
    check_coordinate(lat2, lon2)?;

    let non_convergent = GeodesicError::Convergence {
        lat1,
        lon1,
        lat2,
        lon2,
    };

    let l = normalize_longitude(lon2 - lon1).to_radians();
    let u1 = ((1.0 - WGS84_F) * lat1.to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * lat2.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;

        if sin_sigma == 0.0 {
            if cos_sigma > 0.0 {
                return Ok(Inverse {
                    distance_m: 0.0,
                    initial_bearing: 0.0,
                });
            }
            // Exactly antipodal: every azimuth is a geodesic.
            return Err(non_convergent);
        }

        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        let cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            // Both points on the equator.
            0.0
        };
        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));

        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if lambda.abs() > PI {
            return Err(non_convergent);
        }

        if (lambda - previous).abs() < TOLERANCE {
            let u_sq = cos_sq_alpha * (WGS84_A.powi(2) - WGS84_B.powi(2)) / WGS84_B.powi(2);
            let (big_a, big_b) = series_coefficients(u_sq);
            let delta_sigma = sigma_correction(big_b, sin_sigma, cos_sigma, cos_2sigma_m);
            let distance_m = WGS84_B * big_a * (sigma - delta_sigma);

            let (sin_lambda, cos_lambda) = lambda.sin_cos();
            let alpha1 = (cos_u2 * sin_lambda).atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);

            return Ok(Inverse {
                distance_m,
                initial_bearing: (alpha1.to_degrees() + 360.0) % 360.0,
            });
        }
    }

    Err(non_convergent)
}

/// Vincenty's direct formula: the point `distance_m` from the start along
/// `bearing` (degrees). Returns (latitude, longitude).
pub fn direct(
    lat1: f64,
    lon1: f64,
    bearing: f64,
    distance_m: f64,
) -> Result<(f64, f64), GeodesicError> {
    check_coordinate(lat1, lon1)?;

    let (sin_alpha1, cos_alpha1) = bearing.to_radians().sin_cos();
    let tan_u1 = (1.0 - WGS84_F) * lat1.to_radians().tan();
    let cos_u1 = 1.0 / (1.0 + tan_u1 * tan_u1).sqrt();
    let sin_u1 = tan_u1 * cos_u1;

    let sigma1 = tan_u1.atan2(cos_alpha1);
    let sin_alpha = cos_u1 * sin_alpha1;
    let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
    let u_sq = cos_sq_alpha * (WGS84_A.powi(2) - WGS84_B.powi(2)) / WGS84_B.powi(2);
    let (big_a, big_b) = series_coefficients(u_sq);

    let first_guess = distance_m / (WGS84_B * big_a);
    let mut sigma = first_guess;
    let mut converged = false;
    for _ in 0..MAX_ITERATIONS {
        let (sin_sigma, cos_sigma) = sigma.sin_cos();
        let cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
        let next = first_guess + sigma_correction(big_b, sin_sigma, cos_sigma, cos_2sigma_m);
        let done = (next - sigma).abs() < TOLERANCE;
        sigma = next;
        if done {
            converged = true;
            break;
        }
    }
    if !converged {
        return Err(GeodesicError::Convergence {
            lat1,
            lon1,
            lat2: f64::NAN,
            lon2: f64::NAN,
        });
    }

    let (sin_sigma, cos_sigma) = sigma.sin_cos();
    let cos_2sigma_m = (2.0 * sigma1 + sigma).cos();

    let x = sin_u1 * sin_sigma - cos_u1 * cos_sigma * cos_alpha1;
    let lat2 = (sin_u1 * cos_sigma + cos_u1 * sin_sigma * cos_alpha1)
        .atan2((1.0 - WGS84_F) * (sin_alpha * sin_alpha + x * x).sqrt());
    let lambda = (sin_sigma * sin_alpha1).atan2(cos_u1 * cos_sigma - sin_u1 * sin_sigma * cos_alpha1);
    let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));
    let l = lambda
        - (1.0 - c)
            * WGS84_F
            * sin_alpha
            * (sigma
                + c * sin_sigma * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

    Ok((lat2.to_degrees(), normalize_longitude(lon1 + l.to_degrees())))
}

fn series_coefficients(u_sq: f64) -> (f64, f64) {
    let a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    (a, b)
}

fn sigma_correction(big_b: f64, sin_sigma: f64, cos_sigma: f64, cos_2sigma_m: f64) -> f64 {
    big_b
        * sin_sigma
        * (cos_2sigma_m
            + big_b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                    - big_b / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma.powi(2))
                        * (-3.0 + 4.0 * cos_2sigma_m.powi(2))))
}

fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}
