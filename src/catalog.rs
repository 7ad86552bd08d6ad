use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

use crate::domain::ImdbId;
use crate::error::MetaError;

pub type Row = Vec<String>;

/// Lists the `.csv` files directly inside `data_dir`, sorted by name.
pub fn discover_csv_files(data_dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, MetaError> {
    let read_err = |err: std::io::Error| MetaError::DataDirRead {
        path: data_dir.to_path_buf(),
        message: err.to_string(),
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(data_dir.as_std_path()).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        if !entry.file_type().map_err(read_err)?.is_file() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.ends_with(".csv") {
            files.push(data_dir.join(name));
        }
    }
    files.sort();
    Ok(files)
}

/// Reads every record of a CSV file, header included, as raw string fields.
pub fn read_rows(path: &Utf8Path) -> Result<Vec<Row>, MetaError> {
    let csv_err = |err: csv::Error| MetaError::CsvRead {
        path: path.to_path_buf(),
        message: err.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path.as_std_path())
        .map_err(csv_err)?;

    reader
        .records()
        .map(|record| {
            record
                .map(|record| record.iter().map(str::to_string).collect())
                .map_err(csv_err)
        })
        .collect()
}

/// Finds `column` in the header row and returns the identifier of each data row.
///
/// A data row too short to hold the identifier column is fatal. Blank cells and
/// cells that can't be used as a file name are skipped with a warning.
pub fn extract_ids(rows: &[Row], column: &str) -> Result<Vec<ImdbId>, MetaError> {
    let (header, data) = rows.split_first().ok_or(MetaError::EmptyCsv)?;
    let index = header
        .iter()
        .position(|cell| cell == column)
        .ok_or_else(|| MetaError::MissingIdColumn {
            column: column.to_string(),
            header: header.clone(),
        })?;

    let mut ids = Vec::with_capacity(data.len());
    for (offset, row) in data.iter().enumerate() {
        let row_number = offset + 2;
        let cell = row.get(index).ok_or_else(|| MetaError::ShortRow {
            row: row_number,
            len: row.len(),
            needed: index + 1,
            column: column.to_string(),
        })?;
        match cell.parse::<ImdbId>() {
            Ok(id) => ids.push(id),
            Err(err) => warn!(row = row_number, "Skipping row: {err}"),
        }
    }
    debug!(count = ids.len(), "extracted identifiers");
    Ok(ids)
}
