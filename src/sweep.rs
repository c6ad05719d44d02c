use crate::error::Result;
use crate::extractor::MetricExtractor;
use crate::metrics::collector::MetricsCollector;
use crate::metrics::snapshot::MetricsSnapshot;
use crate::record::{MetricValue, SweepRecord, Target};
use crate::renderer::{PageSession, Renderer};
use chrono::{Local, Timelike};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    Idle,
    Running,
    Finished,
    Failed,
}

/// Runs one pass over all targets on a single shared rendering session.
pub struct BatchCollector {
    extractor: MetricExtractor,
    metrics: Arc<MetricsCollector>,
    state_watcher: watch::Sender<SweepState>,
}

impl BatchCollector {
    pub fn new(extractor: MetricExtractor, metrics: Arc<MetricsCollector>) -> Self {
        let (state_tx, _) = watch::channel(SweepState::Idle);

        Self {
            extractor,
            metrics,
            state_watcher: state_tx,
        }
    }

    /// Opens a session, reads every target in order, closes the session.
    ///
    /// Only a failure to open the session is returned as an error; per-target
    /// failures show up as [`MetricValue::Unavailable`] in the record.
    pub async fn run_sweep(
        &self,
        renderer: &dyn Renderer,
        targets: &[Target],
    ) -> Result<SweepRecord> {
        let timestamp = Local::now().with_nanosecond(0).unwrap_or_else(Local::now);
        self.metrics.set_targets_total(targets.len() as u64);
        self.set_state(SweepState::Running);

        let mut session = match renderer.open().await {
            Ok(session) => session,
            Err(e) => {
                log::error!("Sweep aborted, no rendering session: {}", e);
                self.set_state(SweepState::Failed);
                return Err(e);
            }
        };

        let values = self.collect(session.as_mut(), targets).await;

        if let Err(e) = session.close().await {
            log::warn!("Error releasing rendering session: {}", e);
        }

        let record = SweepRecord::new(timestamp, values);
        log::info!(
            "Sweep finished: {}/{} targets available",
            record.available_count(),
            targets.len()
        );
        self.set_state(SweepState::Finished);
        Ok(record)
    }

    // Infallible so that `run_sweep` always reaches `close`.
    async fn collect(&self, session: &mut dyn PageSession, targets: &[Target]) -> Vec<MetricValue> {
        let mut values = Vec::with_capacity(targets.len());
        for target in targets {
            values.push(self.extractor.extract(session, target).await);
        }
        values
    }

    pub fn get_metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn watch_metrics(&self) -> watch::Receiver<MetricsSnapshot> {
        let (tx, rx) = watch::channel(self.metrics.snapshot());
        let metrics = self.metrics.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(500));
            loop {
                interval.tick().await;
                if tx.send(metrics.snapshot()).is_err() {
                    break;
                }
            }
        });
        rx
    }

    pub fn state(&self) -> SweepState {
        *self.state_watcher.borrow()
    }

    fn set_state(&self, state: SweepState) {
        self.state_watcher.send_replace(state);
    }
}
