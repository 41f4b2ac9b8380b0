use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::{debug, info};

use super::location_parser::{LocationParser, RawLocation};
use crate::config::constants::{CSV_EXTENSION, PRECISION_COLUMN, TIME_COLUMN};
use crate::models::location_record::{EntityRole, EntitySet, LocationRecord, RowAttributes};
use crate::utils::logging::{self, FileIOType, OperationCategory};

#[derive(Debug)]
pub enum RecordsLoadError {
    IoError(std::io::Error),
    CsvError(csv::Error),
    NotCsv(PathBuf),
    CsvCount { dir: PathBuf, count: usize },
    NotFound(PathBuf),
    MissingColumn { path: PathBuf, column: String },
    NoCsvFiles(PathBuf),
    NoSelection,
}

impl From<std::io::Error> for RecordsLoadError {
    fn from(err: std::io::Error) -> Self {
        RecordsLoadError::IoError(err)
    }
}

impl From<csv::Error> for RecordsLoadError {
    fn from(err: csv::Error) -> Self {
        RecordsLoadError::CsvError(err)
    }
}

impl std::fmt::Display for RecordsLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordsLoadError::IoError(e) => write!(f, "IO error: {}", e),
            RecordsLoadError::CsvError(e) => write!(f, "CSV error: {}", e),
            RecordsLoadError::NotCsv(p) => write!(f, "The specified file is not a CSV: {}", p.display()),
            RecordsLoadError::CsvCount { dir, count } => write!(
                f,
                "Expected exactly one CSV file in '{}', found {}",
                dir.display(),
                count
            ),
            RecordsLoadError::NotFound(p) => write!(f, "Path not found: {}", p.display()),
            RecordsLoadError::MissingColumn { path, column } => {
                write!(f, "Column '{}' not found in {}", column, path.display())
            }
            RecordsLoadError::NoCsvFiles(dir) => write!(f, "No CSV files available in {}", dir.display()),
            RecordsLoadError::NoSelection => write!(f, "No file was selected"),
        }
    }
}

impl std::error::Error for RecordsLoadError {}

/// How rows are turned into records.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub location_column: String,
    /// Rows whose precision is above this value, or missing, are dropped.
    pub valid_precision: f64,
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(CSV_EXTENSION))
        .unwrap_or(false)
}

/// CSV files directly inside `dir`, sorted by name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>, RecordsLoadError> {
    if !dir.is_dir() {
        return Err(RecordsLoadError::NotFound(dir.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_csv_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// A `.csv` file path is used as is; a directory must hold exactly one CSV.
pub fn resolve_csv_file(path: &Path) -> Result<PathBuf, RecordsLoadError> {
    if path.is_file() {
        if has_csv_extension(path) {
            Ok(path.to_path_buf())
        } else {
            Err(RecordsLoadError::NotCsv(path.to_path_buf()))
        }
    } else if path.is_dir() {
        let mut files = list_csv_files(path)?;
        if files.len() != 1 {
            return Err(RecordsLoadError::CsvCount {
                dir: path.to_path_buf(),
                count: files.len(),
            });
        }
        Ok(files.remove(0))
    } else {
        Err(RecordsLoadError::NotFound(path.to_path_buf()))
    }
}

pub fn load_entity_set(csv_path: &Path, role: EntityRole, options: &LoadOptions) -> Result<EntitySet, RecordsLoadError> {
    let _timing = logging::start_timing("load_entity_set",
        OperationCategory::FileIO { subcategory: FileIOType::DataLoad });

    let mut file = File::open(csv_path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let set = parse_entity_set(&contents, role, options).map_err(|e| match e {
        RecordsLoadError::MissingColumn { column, .. } => RecordsLoadError::MissingColumn {
            path: csv_path.to_path_buf(),
            column,
        },
        other => other,
    })?;

    info!(
        role = %role,
        path = %csv_path.display(),
        records = set.len(),
        located = set.located_count(),
        "loaded records"
    );
    Ok(set)
}

/// Parses CSV text into an entity set. This is the only place raw rows are
/// looked at; everything downstream works on `LocationRecord`.
pub fn parse_entity_set(contents: &str, role: EntityRole, options: &LoadOptions) -> Result<EntitySet, RecordsLoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(contents.as_bytes());

    let headers = reader.headers()?.clone();
    let column_index = |name: &str| headers.iter().position(|h| h == name);
    let missing = |column: &str| RecordsLoadError::MissingColumn {
        path: PathBuf::new(),
        column: column.to_string(),
    };

    let location_idx = column_index(&options.location_column).ok_or_else(|| missing(&options.location_column))?;
    let precision_idx = column_index(PRECISION_COLUMN).ok_or_else(|| missing(PRECISION_COLUMN))?;
    let time_idx = column_index(TIME_COLUMN);

    let parser = LocationParser::new(options.location_column.clone());
    let mut records = Vec::new();
    let mut dropped = 0usize;

    for (row, result) in reader.records().enumerate() {
        let record = result?;

        let precision = record.get(precision_idx).and_then(|p| p.trim().parse::<f64>().ok());
        match precision {
            Some(p) if p <= options.valid_precision => {}
            _ => {
                debug!(row = row + 1, precision = ?record.get(precision_idx), "dropping row above valid precision");
                dropped += 1;
                continue;
            }
        }

        let cell = record.get(location_idx).unwrap_or("");
        let coordinate = parser.parse(&RawLocation::from_cell(cell));
        let raw_location = Some(cell.to_string()).filter(|c| !c.trim().is_empty());
        let timestamp = time_idx
            .and_then(|i| record.get(i))
            .map(str::to_string)
            .filter(|t| !t.is_empty());

        let attributes: RowAttributes = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();

        records.push(LocationRecord::new(raw_location, coordinate, precision, timestamp, attributes));
    }

    if dropped > 0 {
        info!(role = %role, dropped, valid_precision = options.valid_precision, "rows filtered by precision");
    }

    Ok(EntitySet::new(role, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn options() -> LoadOptions {
        LoadOptions {
            location_column: "location".to_string(),
            valid_precision: 20.0,
        }
    }

    const SAMPLE: &str = "location,precision,time,valid\n\
        \"40.0,-3.0\",5,2024-01-01 10:00,0\n\
        \"40.1,-3.1\",50,2024-01-01 10:05,0\n\
        25.5,10,2024-01-01 10:10,1\n\
        \"40.2,-3.2\",,2024-01-01 10:15,0\n\
        \"40.3,-3.3\",20,,1\n";

    #[test]
    fn filters_by_precision_and_keeps_unparsed_rows() {
        let set = parse_entity_set(SAMPLE, EntityRole::Victim, &options()).unwrap();
        // Row 2 (precision 50) and row 4 (no precision) are filtered out.
        assert_eq!(set.len(), 3);
        assert_eq!(set.located_count(), 2);

        let records = set.records();
        assert_eq!(records[0].timestamp(), Some("2024-01-01 10:00"));
        assert_eq!(records[0].precision(), Some(5.0));
        assert_eq!(records[1].coordinate(), None);
        assert_eq!(records[1].raw_location(), Some("25.5"));
        assert_eq!(records[1].attribute("valid"), Some("1"));
        assert_eq!(records[2].timestamp(), None);
        assert_eq!(records[2].precision(), Some(20.0));
    }

    #[test]
    fn missing_columns_are_reported() {
        let err = parse_entity_set("location,time\n\"1,2\",x\n", EntityRole::Aggressor, &options()).unwrap_err();
        assert!(matches!(err, RecordsLoadError::MissingColumn { ref column, .. } if column == "precision"));

        let err = parse_entity_set("coords,precision\n\"1,2\",1\n", EntityRole::Aggressor, &options()).unwrap_err();
        assert!(matches!(err, RecordsLoadError::MissingColumn { ref column, .. } if column == "location"));
    }

    #[test]
    fn resolves_files_and_directories() {
        let tmp = TempDir::new().unwrap();
        let single = tmp.path().join("single");
        fs::create_dir(&single).unwrap();
        let csv_path = single.join("aggressors.csv");
        File::create(&csv_path).unwrap().write_all(b"location,precision\n").unwrap();
        File::create(single.join("notes.txt")).unwrap();

        assert_eq!(resolve_csv_file(&csv_path).unwrap(), csv_path);
        assert_eq!(resolve_csv_file(&single).unwrap(), csv_path);
        assert!(matches!(resolve_csv_file(&single.join("notes.txt")), Err(RecordsLoadError::NotCsv(_))));
        assert!(matches!(resolve_csv_file(&tmp.path().join("nope")), Err(RecordsLoadError::NotFound(_))));

        File::create(single.join("victims.csv")).unwrap();
        assert!(matches!(resolve_csv_file(&single), Err(RecordsLoadError::CsvCount { count: 2, .. })));
        assert_eq!(list_csv_files(&single).unwrap().len(), 2);
    }

    #[test]
    fn loads_from_disk_with_path_in_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("victims.csv");
        fs::write(&path, SAMPLE).unwrap();
        let set = load_entity_set(&path, EntityRole::Victim, &options()).unwrap();
        assert_eq!(set.role(), EntityRole::Victim);
        assert_eq!(set.len(), 3);

        let bad = tmp.path().join("bad.csv");
        fs::write(&bad, "time\n1\n").unwrap();
        match load_entity_set(&bad, EntityRole::Victim, &options()) {
            Err(RecordsLoadError::MissingColumn { path, .. }) => assert_eq!(path, bad),
            other => panic!("unexpected {other:?}"),
        }
    }
}
