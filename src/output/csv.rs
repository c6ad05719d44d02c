use super::OutputHandler;
use crate::error::{Error, Result};
use crate::record::{header_row, SweepRecord, Target};
use async_trait::async_trait;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Appends sweep records to the CSV log, one row per sweep.
///
/// The file is opened, written, flushed and closed on every append; nothing
/// is held open between sweeps.
pub struct LogWriter {
    path: PathBuf,
    header: Vec<String>,
    marker: String,
}

impl LogWriter {
    pub fn new(path: impl Into<PathBuf>, targets: &[Target], marker: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            header: header_row(targets),
            marker: marker.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &SweepRecord) -> Result<()> {
        if record.values.len() + 1 != self.header.len() {
            return Err(Error::Internal(format!(
                "record has {} values, log has {} columns",
                record.values.len(),
                self.header.len() - 1
            )));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let needs_header = self.check_header()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Terminate a dangling last line so the new row starts on its own.
        if !needs_header && !Self::ends_with_newline(&self.path)? {
            file.write_all(b"\n")?;
        }

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);

        if needs_header {
            writer.write_record(&self.header)?;
        }
        writer.write_record(record.to_row(&self.marker))?;
        writer.flush()?;

        let file = writer
            .into_inner()
            .map_err(|e| Error::Internal(e.to_string()))?;
        file.sync_all()?;

        log::debug!("Appended sweep {} to {}", record.formatted_timestamp(), self.path.display());
        Ok(())
    }

    fn ends_with_newline(path: &Path) -> Result<bool> {
        let mut file = File::open(path)?;
        if file.seek(SeekFrom::End(0))? == 0 {
            return Ok(true);
        }
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] == b'\n')
    }

    /// True when the log is missing or empty and needs a header first.
    fn check_header(&self) -> Result<bool> {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.len() > 0 => {}
            Ok(_) => return Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
            Err(e) => return Err(e.into()),
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(File::open(&self.path)?);

        let found: Vec<String> = match reader.records().next() {
            Some(row) => row?.iter().map(str::to_string).collect(),
            None => return Ok(true),
        };

        if found != self.header {
            return Err(Error::SchemaMismatch {
                path: self.path.clone(),
                expected: self.header.clone(),
                found,
            });
        }
        Ok(false)
    }
}

#[async_trait]
impl OutputHandler for LogWriter {
    async fn write(&mut self, record: &SweepRecord) -> Result<()> {
        self.append(record)
    }
}
