use super::OutputHandler;
use crate::error::{Error, Result};
use crate::record::{SweepRecord, Target};
use async_trait::async_trait;
use indicatif::MultiProgress;
use std::sync::Arc;

/// Prints one `label: value` line per target.
pub struct ConsoleOutput {
    labels: Vec<String>,
    marker: String,
    multi: Option<Arc<MultiProgress>>,
}

impl ConsoleOutput {
    pub fn new(targets: &[Target], marker: impl Into<String>, multi: Option<Arc<MultiProgress>>) -> Self {
        Self {
            labels: targets.iter().map(|t| t.label.clone()).collect(),
            marker: marker.into(),
            multi,
        }
    }

    fn lines(&self, record: &SweepRecord) -> Vec<String> {
        let width = self.labels.iter().map(|l| l.len()).max().unwrap_or(0);
        std::iter::once(format!("Sweep at {}", record.formatted_timestamp()))
            .chain(self.labels.iter().zip(&record.values).map(|(label, value)| {
                format!("   {:<width$}  {}", label, value.as_field(&self.marker), width = width)
            }))
            .collect()
    }
}

#[async_trait]
impl OutputHandler for ConsoleOutput {
    async fn write(&mut self, record: &SweepRecord) -> Result<()> {
        for line in self.lines(record) {
            if let Some(multi) = &self.multi {
                multi.println(&line).map_err(|e| Error::Internal(e.to_string()))?;
            } else {
                println!("{}", line);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MetricValue;
    use chrono::{Local, TimeZone};

    #[test]
    fn test_lines_align_labels() {
        let targets = vec![Target::new("a", "sihlcity"), Target::new("b", "puls5")];
        let out = ConsoleOutput::new(&targets, "unavailable", None);
        let record = SweepRecord::new(
            Local.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
            vec![MetricValue::Observed("12".into()), MetricValue::Unavailable],
        );

        assert_eq!(
            out.lines(&record),
            vec![
                "Sweep at 2025-03-01 09:00:00",
                "   sihlcity  12",
                "   puls5     unavailable",
            ]
        );
    }
}
