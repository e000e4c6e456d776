use flightlog_core::events::scan_calendars;
use flightlog_core::report::{render_report, render_year};
use flightlog_core::routes::segments_from_events;
use flightlog_core::{
    paths, AirportDirectory, CachedEventSource, Config, ConfigManager, EventSource,
    FlightStatistics, JsonEventFile, SegmentLog,
};
use std::fs::{self, File};
use std::io::Write;
use tempfile::TempDir;

const AIRPORTS: &str = r#"507,"London Heathrow Airport","London","United Kingdom","LHR","EGLL",51.4706,-0.461941,83,0,"E","Europe/London","airport","OurAirports"
3797,"John F Kennedy International Airport","New York","United States","JFK","KJFK",40.63980103,-73.77890015,13,-5,"A","America/New_York","airport","OurAirports"
3484,"Los Angeles International Airport","Los Angeles","United States","LAX","KLAX",33.94250107,-118.4079971,125,-8,"A","America/Los_Angeles","airport","OurAirports"
1382,"Charles de Gaulle International Airport","Paris","France","CDG","LFPG",49.012798,2.55,392,1,"E","Europe/Paris","airport","OurAirports"
3830,"Chicago O'Hare International Airport","Chicago","United States","ORD","KORD",41.9786,-87.9048,672,-6,"A","America/Chicago","airport","OurAirports"
9999,"Some Heliport","Nowhere","United States",\N,"XHEL",10.0,10.0,0,0,"A","\N","heliport","OurAirports"
"#;

const EXPORT: &str = r#"{"kind": "calendar#events", "items": [
    {"summary": "JFK-LHR BA112", "start": {"dateTime": "2015-06-01T18:30:00-04:00"}},
    {"summary": "Dentist", "start": {"dateTime": "2015-06-03T09:00:00-04:00"}},
    {"summary": "LHR-CDG", "start": {"dateTime": "2015-06-05T07:00:00+01:00"}},
    {"summary": "CDG-JFK AF22", "start": {"dateTime": "2015-06-09T10:00:00+02:00"}},
    {"summary": "JFK-LAX", "start": {"date": "2016-02-14"}},
    {"summary": "LAX-ORD", "start": {"date": "2016-02-20"}},
    {"summary": "ORD-JFK", "start": {"date": "2016-02-21"}}
]}"#;

fn create_data_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let data = temp_dir.path().join("data");
    fs::create_dir_all(&data).unwrap();

    let mut airports = File::create(data.join("airports.txt")).unwrap();
    airports.write_all(AIRPORTS.as_bytes()).unwrap();
    fs::write(data.join("export.json"), EXPORT).unwrap();

    temp_dir
}

fn config_for(temp_dir: &TempDir) -> Config {
    let data = temp_dir.path().join("data");
    Config {
        airports_path: data.join("airports.txt"),
        events_cache_path: data.join("cache").join("events.json"),
        ..Config::default()
    }
}

#[test]
fn test_e2e_report() {
    let _ = simplelog::TestLogger::init(simplelog::LevelFilter::Debug, simplelog::Config::default());
    let temp_dir = create_data_dir();
    let config = config_for(&temp_dir);

    let directory = AirportDirectory::load_file(&config.airports_path).unwrap();
    assert_eq!(directory.len(), 5);

    let source = CachedEventSource::new(
        JsonEventFile::new(temp_dir.path().join("data/export.json")),
        &config.events_cache_path,
        config.use_cached_events,
    );
    let events = source.list_events().unwrap();
    assert_eq!(events.len(), 7);
    assert!(config.events_cache_path.exists());

    let segments = segments_from_events(&events);
    assert_eq!(segments.len(), 6);

    let stats = FlightStatistics::compute(&segments, &directory, &config.stats_options());
    assert!(stats.issues().is_empty());
    assert_eq!(stats.per_year.get(&2015), Some(&3));
    assert_eq!(stats.per_year.get(&2016), Some(&3));
    assert_eq!(stats.undated, 0);
    assert_eq!(stats.longest.unwrap().route.to_string(), "CDG-JFK");
    assert_eq!(stats.shortest.unwrap().route.to_string(), "LHR-CDG");

    let text = render_report(&stats, &directory, config.distance_unit, &config.home_country);
    assert!(text.contains("Lifetime air mileage flown since 2015-06-01 is"));
    assert!(text.contains("Countries flown to/from (2):\n\tFrance, United Kingdom\n"));
    // Every airport appears at least twice in a closed loop.
    assert!(text.contains("(landing or takeoff):\n\nTotal flight segments per year:"));

    let listing = render_year(&segments, 2016);
    assert!(listing.starts_with("3 flights in 2016\n"));
    assert!(listing.contains("2016-02-20 - LAX-ORD\n"));
}

#[test]
fn test_e2e_cache_follows_export() {
    let temp_dir = create_data_dir();
    let config = config_for(&temp_dir);
    let export_a = temp_dir.path().join("data/export.json");
    let export_b = temp_dir.path().join("data/other.json");
    fs::write(
        &export_b,
        r#"[{"summary": "SFO-NRT UA837", "start": {"date": "2017-03-01"}}]"#,
    )
    .unwrap();

    let read = |export: &std::path::Path| {
        let events = CachedEventSource::new(
            JsonEventFile::new(export),
            &config.events_cache_path,
            true,
        )
        .list_events()
        .unwrap();
        segments_from_events(&events)
    };

    assert_eq!(read(export_a.as_path()).len(), 6);
    let from_b = read(export_b.as_path());
    assert_eq!(from_b.len(), 1);
    assert_eq!(from_b[0].route().to_string(), "SFO-NRT");
    assert_eq!(read(export_a.as_path()).len(), 6);

    // An unchanged export is served from the cache.
    fs::write(&config.events_cache_path, r#"[{"summary": "BOS-DCA"}]"#).unwrap();
    assert_eq!(read(export_a.as_path())[0].route().to_string(), "BOS-DCA");

    // A missing export cannot be matched to the cache.
    fs::remove_file(&export_a).unwrap();
    let missing =
        CachedEventSource::new(JsonEventFile::new(&export_a), &config.events_cache_path, true)
            .list_events();
    assert!(missing.is_err());
}

#[test]
fn test_e2e_segment_log_to_paths() {
    let temp_dir = create_data_dir();
    let config = config_for(&temp_dir);
    let directory = AirportDirectory::load_file(&config.airports_path).unwrap();

    let log_path = temp_dir.path().join("flights.txt");
    fs::write(&log_path, "JFK-LHR,economy\nLHR-CDG,economy\nCDG-XXX,economy\n").unwrap();

    let events = SegmentLog::new(&log_path).list_events().unwrap();
    let segments = segments_from_events(&events);
    let out_path = temp_dir.path().join("paths.csv");
    let export = paths::write_path_file(&out_path, &segments, &directory).unwrap();

    assert_eq!(export.segments_written, 2);
    assert_eq!(export.points_written, 8 + 3);
    assert_eq!(export.issues.len(), 1);

    let content = fs::read_to_string(&out_path).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("longitude,latitude,airport_start,airport_end,type")
    );
    assert_eq!(
        lines.next(),
        Some("-73.77890015,40.63980103,JFK,LHR,economy")
    );
    assert_eq!(content.lines().count(), 12);
    assert!(content.trim_end().ends_with("2.55,49.012798,LHR,CDG,economy"));
}

#[test]
fn test_e2e_scan_and_config() {
    let temp_dir = create_data_dir();
    let travel = JsonEventFile::new(temp_dir.path().join("data/export.json"))
        .list_events()
        .unwrap();
    let found = scan_calendars(&[("Travel".to_string(), travel), ("Empty".to_string(), vec![])]);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].flights, 6);

    let manager = ConfigManager::new(temp_dir.path().join("config.json"));
    let config = config_for(&temp_dir);
    manager.save(&config).unwrap();
    assert_eq!(manager.load().unwrap(), config);
}

#[test]
fn test_e2e_export_to_segment_log() {
    let temp_dir = create_data_dir();
    let events = JsonEventFile::new(temp_dir.path().join("data/export.json"))
        .list_events()
        .unwrap();
    let segments = segments_from_events(&events);

    let log_path = temp_dir.path().join("flights.txt");
    SegmentLog::save_file(&log_path, &segments).unwrap();
    let content = fs::read_to_string(&log_path).unwrap();
    assert!(content.starts_with("JFK-LHR,BA112\nLHR-CDG,\n"));

    let reloaded = segments_from_events(&SegmentLog::new(&log_path).list_events().unwrap());
    let routes: Vec<_> = reloaded.iter().map(|s| s.route()).collect();
    let expected: Vec<_> = segments.iter().map(|s| s.route()).collect();
    assert_eq!(routes, expected);
    assert!(reloaded.iter().all(|s| s.date.is_none()));
}
