use crate::core::models::table::ScoreTable;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV writing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
}

/// Persists aggregated tables.
pub trait ReportSink {
    /// Saves `table` to `destination`.
    ///
    /// An unset destination is not an error: the table is dropped with a warning naming `label`.
    fn save_table(
        &self,
        table: &ScoreTable,
        destination: Option<&Path>,
        label: &str,
    ) -> Result<(), ReportError>;
}

/// Writes tables as CSV with a leading unnamed index column and empty cells for NaN.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReportSink;

impl CsvReportSink {
    fn write(table: &ScoreTable, path: &Path) -> Result<(), ReportError> {
        let path_str = path.to_string_lossy().to_string();
        let csv_err = |source| ReportError::Csv {
            path: path_str.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ReportError::Io {
                path: parent.to_string_lossy().to_string(),
                source: e,
            })?;
        }

        let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
        writer
            .write_record(std::iter::once("").chain(table.columns().iter().map(String::as_str)))
            .map_err(csv_err)?;
        for row in table.rows() {
            let cells = std::iter::once(row.label.clone()).chain(row.values.iter().map(|v| format_cell(*v)));
            writer.write_record(cells).map_err(csv_err)?;
        }
        writer.flush().map_err(|e| ReportError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        Ok(())
    }
}

impl ReportSink for CsvReportSink {
    fn save_table(
        &self,
        table: &ScoreTable,
        destination: Option<&Path>,
        label: &str,
    ) -> Result<(), ReportError> {
        let Some(path) = destination else {
            warn!(table = label, "No destination path set, the table is not saved");
            return Ok(());
        };
        Self::write(table, path)?;
        info!(table = label, path = %path.display(), "Table saved");
        Ok(())
    }
}

fn format_cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
