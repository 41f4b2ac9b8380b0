use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use super::records_loader::{list_csv_files, RecordsLoadError};
use crate::models::location_record::EntityRole;

/// Lists the CSV files in `data_dir` and asks which one holds `role` records.
/// Keeps asking until a valid number is entered; fails if input runs out.
pub fn choose_file<R: BufRead, W: Write>(
    data_dir: &Path,
    role: EntityRole,
    input: &mut R,
    output: &mut W,
) -> Result<PathBuf, RecordsLoadError> {
    let files = list_csv_files(data_dir)?;
    if files.is_empty() {
        return Err(RecordsLoadError::NoCsvFiles(data_dir.to_path_buf()));
    }

    writeln!(output, "\nAvailable {} files:", role.label().to_lowercase())?;
    for (i, file) in files.iter().enumerate() {
        let name = file.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        writeln!(output, "{}. {}", i + 1, name)?;
    }

    let mut line = String::new();
    loop {
        write!(output, "Choose the {} file to process (1-{}): ", role.label().to_lowercase(), files.len())?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(RecordsLoadError::NoSelection);
        }
        match line.trim().parse::<usize>() {
            Ok(choice) if (1..=files.len()).contains(&choice) => return Ok(files[choice - 1].clone()),
            _ => writeln!(output, "Invalid option. Please try again.")?,
        }
    }
}
