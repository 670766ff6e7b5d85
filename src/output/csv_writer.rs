//! CSV result sink
//!
//! Writes `url,title,description` rows as UTF-8 with a byte-order mark so
//! spreadsheet applications detect the encoding.

use crate::output::traits::{OutputError, OutputResult, PageRecord, ResultSink};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// UTF-8 byte-order mark
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column header row
pub const CSV_HEADER: [&str; 3] = ["url", "title", "description"];

/// Sink that writes records to a CSV file
///
/// The file is first written next to the target under a `.part` suffix and
/// then renamed over it, so the target never holds a partial row.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".part");
        self.path.with_file_name(name)
    }

    /// Writes the full CSV document to `staging`
    fn write_staging(staging: &Path, records: &[PageRecord]) -> OutputResult<()> {
        let mut file = File::create(staging)?;
        file.write_all(UTF8_BOM)?;

        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(CSV_HEADER)?;
        for record in records {
            writer.write_record([
                record.url.as_str(),
                record.title.as_str(),
                record.description.as_str(),
            ])?;
        }

        let file = writer
            .into_inner()
            .map_err(|e| OutputError::Write(e.to_string()))?;
        file.sync_all()?;
        Ok(())
    }
}

impl ResultSink for CsvSink {
    fn write_records(&mut self, records: &[PageRecord]) -> OutputResult<()> {
        let staging = self.staging_path();

        let written = Self::write_staging(&staging, records)
            .and_then(|()| std::fs::rename(&staging, &self.path).map_err(OutputError::from));

        if let Err(e) = written {
            // A failed write never leaves a partial staging file behind
            if let Err(cleanup) = std::fs::remove_file(&staging) {
                tracing::debug!("Could not remove {}: {}", staging.display(), cleanup);
            }
            return Err(e);
        }

        tracing::debug!("Wrote {} rows to {}", records.len(), self.path.display());
        Ok(())
    }

    fn target(&self) -> String {
        self.path.display().to_string()
    }
}
