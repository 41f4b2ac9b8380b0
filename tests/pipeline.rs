use std::fs;
use std::io::Cursor;

use geoprox::config::app_config::AppConfig;
use geoprox::core::session::{run_session_with_io, SessionOptions};
use geoprox::Coordinate;
use tempfile::TempDir;

const AGGRESSORS: &str = "location,precision,time\n\
    \"10.0,10.0001\",5,2024-03-01 08:00\n\
    bad-location,5,2024-03-01 08:10\n\
    \"50.0,50.0\",5,2024-03-01 08:20\n\
    \"10.0,10.0002\",99,2024-03-01 08:30\n";

const VICTIMS: &str = "location,precision,time,valid\n\
    \"10.0,10.0\",3,2024-03-01 08:01,0\n\
    25.5,3,2024-03-01 08:05,0\n\
    \"30.0,30.0\",3,2024-03-01 08:11,0\n";

fn config(zones: &str) -> AppConfig {
    let zones = zones.to_string();
    AppConfig::from_lookup(move |key| match key {
        "PROXIMITY_DISTANCE" => Some("50".to_string()),
        "SECURED_AREAS" => Some(zones.clone()),
        "VALID_PRECISION" => Some("20".to_string()),
        _ => None,
    })
    .unwrap()
}

fn workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("1_aggressors.csv"), AGGRESSORS).unwrap();
    fs::write(data.join("2_victims.csv"), VICTIMS).unwrap();
    tmp
}

fn options(tmp: &TempDir, explicit: bool) -> SessionOptions {
    let data = tmp.path().join("data");
    SessionOptions {
        base_dir: tmp.path().to_path_buf(),
        aggressors: explicit.then(|| data.join("1_aggressors.csv")),
        victims: explicit.then(|| data.join("2_victims.csv")),
        output_file: "map_points.html".to_string(),
        parallel: false,
        export_csv: true,
    }
}

#[test]
fn end_to_end_with_explicit_files() {
    let tmp = workspace();
    let config = config(r#"[{"name": "Home", "coordinates": [10.0, 10.0], "type": "home", "active": true}]"#);

    let summary = run_session_with_io(&config, &options(&tmp, true), &mut Cursor::new(""), &mut Vec::new()).unwrap();
    let outcome = &summary.outcome;

    // The precision-99 aggressor is filtered out; the malformed one is kept but unlocated.
    assert_eq!(
        outcome.aggressor_route.points,
        vec![Coordinate::new(10.0, 10.0001).unwrap(), Coordinate::new(50.0, 50.0).unwrap()]
    );
    assert_eq!(outcome.results.len(), 2);
    assert!(outcome.results[0].is_near);
    assert_eq!(outcome.results[0].triggering_aggressor_indices().collect::<Vec<_>>(), vec![0]);
    assert_eq!((outcome.results[1].victim_index, outcome.results[1].position), (2, 2));
    assert!(!outcome.results[1].is_near);
    assert_eq!(outcome.victim_route.points, vec![Coordinate::new(10.0, 10.0).unwrap()]);
    assert_eq!(summary.cached_pairs, 4);

    assert_eq!(summary.map_path, tmp.path().join("result").join("map_points.html"));
    let html = fs::read_to_string(&summary.map_path).unwrap();
    assert!(html.contains("Proximity Alert: 10.96m"));
    assert!(html.contains("<center>Home<\\/center>"));
    assert_eq!(summary.export_files.len(), 2);
    assert!(summary.export_files.iter().all(|f| f.exists()));
}

#[test]
fn prompts_for_files_when_not_given() {
    let tmp = workspace();
    let config = config("[]");
    let mut opts = options(&tmp, false);
    opts.export_csv = false;
    opts.parallel = true;

    let mut output = Vec::new();
    let summary = run_session_with_io(&config, &opts, &mut Cursor::new("1\n2\n"), &mut output).unwrap();

    let printed = String::from_utf8(output).unwrap();
    assert!(printed.contains("Available aggressor files:"));
    assert!(printed.contains("Available victim files:"));
    assert_eq!(summary.outcome.near_count(), 1);
    assert!(summary.export_files.is_empty());
}

#[test]
fn missing_input_file_is_reported() {
    let tmp = workspace();
    let config = config("[]");
    let mut opts = options(&tmp, true);
    opts.victims = Some(tmp.path().join("data").join("missing.csv"));

    let err = run_session_with_io(&config, &opts, &mut Cursor::new(""), &mut Vec::new()).unwrap_err();
    assert!(format!("{:#}", err).contains("could not select the victim file"));
}
