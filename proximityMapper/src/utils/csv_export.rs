use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use tracing::info;

use crate::core::proximity::{MatchOutcome, Route};
use crate::utils::logging::{self, FileIOType, OperationCategory};

const RESULTS_FILE: &str = "proximity_results.csv";
const ROUTES_FILE: &str = "routes.csv";

#[derive(Debug, Serialize)]
struct ResultRow {
    victim_index: usize,
    position: usize,
    lat: f64,
    lng: f64,
    is_near: bool,
    min_distance_m: Option<f64>,
    /// Semicolon-separated aggressor indices.
    triggering_aggressors: String,
}

#[derive(Debug, Serialize)]
struct RouteRow {
    role: &'static str,
    sequence: usize,
    lat: f64,
    lng: f64,
}

/// Writes match results into a timestamped directory under the result dir.
pub struct CsvExporter {
    output_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(result_dir: impl AsRef<Path>) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        Self::with_dir(result_dir.as_ref().join(timestamp))
    }

    pub fn with_dir(output_dir: impl AsRef<Path>) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn export_outcome(&self, outcome: &MatchOutcome) -> Result<Vec<PathBuf>, Box<dyn Error + Send + Sync>> {
        let _timing = logging::start_timing("CsvExporter::export_outcome",
            OperationCategory::FileIO { subcategory: FileIOType::ResultsExport });

        let results_path = self.output_dir.join(RESULTS_FILE);
        let mut writer = csv::Writer::from_path(&results_path)?;
        for result in &outcome.results {
            writer.serialize(ResultRow {
                victim_index: result.victim_index,
                position: result.position,
                lat: result.coordinate.lat(),
                lng: result.coordinate.lng(),
                is_near: result.is_near,
                min_distance_m: result.min_distance,
                triggering_aggressors: result
                    .triggering_aggressor_indices()
                    .map(|i| i.to_string())
                    .collect::<Vec<_>>()
                    .join(";"),
            })?;
        }
        writer.flush()?;

        let routes_path = self.output_dir.join(ROUTES_FILE);
        let mut writer = csv::Writer::from_path(&routes_path)?;
        for route in [&outcome.aggressor_route, &outcome.victim_route] {
            write_route(&mut writer, route)?;
        }
        writer.flush()?;

        info!(dir = %self.output_dir.display(), "results exported");
        Ok(vec![results_path, routes_path])
    }
}

fn write_route<W: std::io::Write>(writer: &mut csv::Writer<W>, route: &Route) -> csv::Result<()> {
    for (i, point) in route.points.iter().enumerate() {
        writer.serialize(RouteRow {
            role: route.role.label(),
            sequence: i + 1,
            lat: point.lat(),
            lng: point.lng(),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::distance::DistanceOracle;
    use crate::core::proximity::ProximityMatcher;
    use crate::models::coordinate::Coordinate;
    use crate::models::location_record::{EntityRole, EntitySet};
    use tempfile::TempDir;

    #[test]
    fn writes_results_and_routes() {
        let c = |lat, lng| Coordinate::new(lat, lng).unwrap();
        let victims = EntitySet::from_coordinates(EntityRole::Victim, [c(10.0, 10.0), c(30.0, 30.0)]);
        let aggressors = EntitySet::from_coordinates(EntityRole::Aggressor, [c(10.0, 10.0001), c(10.0, 10.0)]);
        let oracle = DistanceOracle::new();
        let outcome = ProximityMatcher::new(&oracle).run(&victims, &aggressors, 50.0).unwrap();

        let tmp = TempDir::new().unwrap();
        let exporter = CsvExporter::new(tmp.path()).unwrap();
        let files = exporter.export_outcome(&outcome).unwrap();
        assert!(exporter.output_dir().starts_with(tmp.path()));

        let results = fs::read_to_string(&files[0]).unwrap();
        let mut lines = results.lines();
        assert_eq!(
            lines.next(),
            Some("victim_index,position,lat,lng,is_near,min_distance_m,triggering_aggressors")
        );
        assert!(lines.next().unwrap().ends_with(",true,0.0,0;1"));
        assert!(lines.next().unwrap().starts_with("1,2,30.0,30.0,false,"));

        let routes = fs::read_to_string(&files[1]).unwrap();
        // Header, two aggressor points, one victim point.
        assert_eq!(routes.lines().count(), 4);
        assert!(routes.contains("Victim,1,10.0,10.0"));
    }
}
