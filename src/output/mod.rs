use crate::error::Result;
use crate::record::SweepRecord;
use async_trait::async_trait;

pub mod console;
pub mod csv;
pub mod json;

pub use self::csv::LogWriter;

/// Destination for a finished sweep record.
#[async_trait]
pub trait OutputHandler: Send + Sync {
    async fn write(&mut self, record: &SweepRecord) -> Result<()>;
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
