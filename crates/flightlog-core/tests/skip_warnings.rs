use flightlog_core::routes::parse;
use flightlog_core::{paths, AirportDirectory, FlightStatistics, StatsOptions};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::io::Cursor;
use std::sync::Mutex;

const AIRPORTS: &str = r#"507,"London Heathrow Airport","London","United Kingdom","LHR","EGLL",51.4706,-0.461941,83,0,"E","Europe/London","airport","OurAirports"
3797,"John F Kennedy International Airport","New York","United States","JFK","KJFK",40.63980103,-73.77890015,13,-5,"A","America/New_York","airport","OurAirports"
"#;

struct WarningRecorder {
    warnings: Mutex<Vec<String>>,
}

impl Log for WarningRecorder {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.warnings
                .lock()
                .unwrap()
                .push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static RECORDER: WarningRecorder = WarningRecorder {
    warnings: Mutex::new(Vec::new()),
};

fn warnings_about(needle: &str) -> usize {
    RECORDER
        .warnings
        .lock()
        .unwrap()
        .iter()
        .filter(|w| w.contains(needle))
        .count()
}

// Single test so the global logger sees one workload at a time.
#[test]
fn test_unknown_airport_warns_once_per_report() {
    log::set_logger(&RECORDER).unwrap();
    log::set_max_level(LevelFilter::Warn);

    let directory = AirportDirectory::load(Cursor::new(AIRPORTS)).unwrap();
    let segments: Vec<_> = ["JFK-LHR", "JFK-ZZZ", "JFK-ZZZ", "LHR-JFK"]
        .iter()
        .filter_map(|s| parse(s))
        .collect();

    let stats = FlightStatistics::compute(&segments, &directory, &StatsOptions::default());
    assert_eq!(stats.issues().len(), 1);
    assert_eq!(warnings_about("JFK-ZZZ"), 1);

    let mut out = Vec::new();
    let export = paths::export_paths(&mut out, &segments, &directory).unwrap();
    assert_eq!(export.issues.len(), 2);
    assert_eq!(warnings_about("JFK-ZZZ"), 3);
}
