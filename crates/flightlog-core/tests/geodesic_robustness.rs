use flightlog_core::geodesic::{self, interior_point_count, DistanceModel, GeodesicError};

// (lat, lon) pairs covering both hemispheres, the dateline and the poles.
const PLACES: [(f64, f64); 8] = [
    (40.63980103, -73.77890015), // JFK
    (51.4706, -0.461941),        // LHR
    (-33.946111, 151.177222),    // SYD
    (35.552258, 139.779694),     // HND
    (-53.002642, -70.854586),    // PUQ
    (64.190922, -51.678064),     // GOH
    (1.350189, 103.994433),      // SIN
    (89.0, 0.0),
];

#[test]
fn test_paths_between_all_pairs() {
    for &(lat1, lon1) in &PLACES {
        for &(lat2, lon2) in &PLACES {
            let points = geodesic::path(lat1, lon1, lat2, lon2).unwrap();
            let first = points.first().unwrap();
            let last = points.last().unwrap();
            assert_eq!((first.latitude, first.longitude), (lat1, lon1));
            assert_eq!((last.latitude, last.longitude), (lat2, lon2));

            let km = geodesic::distance_km(lat1, lon1, lat2, lon2).unwrap();
            if km == 0.0 {
                assert_eq!(points.len(), 2);
                continue;
            }
            assert_eq!(points.len(), interior_point_count(km) + 2);

            // Each point is further from the origin than the one before.
            let mut previous = 0.0;
            for p in &points[1..] {
                let d = geodesic::distance_km(lat1, lon1, p.latitude, p.longitude).unwrap();
                assert!(d > previous, "path from ({lat1}, {lon1}) regresses at {p:?}");
                previous = d;
            }
            assert!((previous - km).abs() < 1e-6);
        }
    }
}

#[test]
fn test_spherical_model_is_close_to_ellipsoid() {
    for &(lat1, lon1) in &PLACES {
        for &(lat2, lon2) in &PLACES {
            let ellipsoid = DistanceModel::Ellipsoidal
                .distance_km(lat1, lon1, lat2, lon2)
                .unwrap();
            let sphere = DistanceModel::Spherical
                .distance_km(lat1, lon1, lat2, lon2)
                .unwrap();
            assert!(
                (ellipsoid - sphere).abs() <= ellipsoid * 0.01 + 1e-9,
                "{ellipsoid} vs {sphere}"
            );
        }
    }
}

#[test]
fn test_near_antipodal_routes_fail_cleanly() {
    let err = geodesic::path(0.0, 0.0, 0.5, 179.7).unwrap_err();
    assert!(matches!(err, GeodesicError::Convergence { .. }));
    assert!(err.to_string().contains("did not converge"));

    // The spherical model has no iteration to fail.
    assert!(DistanceModel::Spherical
        .distance_km(0.0, 0.0, 0.5, 179.7)
        .is_ok());
}
