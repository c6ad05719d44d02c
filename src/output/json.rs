use super::OutputHandler;
use crate::error::Result;
use crate::record::{SweepRecord, Target};
use async_trait::async_trait;
use std::io::{Stdout, Write};

/// Writes each record as one JSON object keyed by target label, with `null`
/// for unavailable values.
pub struct JsonOutput<W: Write + Send + Sync> {
    targets: Vec<Target>,
    out: W,
}

impl JsonOutput<Stdout> {
    pub fn stdout(targets: &[Target]) -> Self {
        Self::new(targets, std::io::stdout())
    }
}

impl<W: Write + Send + Sync> JsonOutput<W> {
    pub fn new(targets: &[Target], out: W) -> Self {
        Self {
            targets: targets.to_vec(),
            out,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[async_trait]
impl<W: Write + Send + Sync> OutputHandler for JsonOutput<W> {
    async fn write(&mut self, record: &SweepRecord) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.out, &record.to_json(&self.targets))?;
        writeln!(self.out)?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
