use crate::error::Result;
use crate::metrics::collector::MetricsCollector;
use crate::poller::ReadinessPoller;
use crate::record::{MetricValue, Target};
use crate::renderer::PageSession;
use crate::selector::Locator;
use std::sync::Arc;
use std::time::Instant;

/// Placeholder the target pages show before the count has rendered.
pub const NOT_READY: &str = "LOADING...";

/// Reads one target's metric, turning any failure into `Unavailable`.
pub struct MetricExtractor {
    locator: Locator,
    not_ready: String,
    poller: ReadinessPoller,
    metrics: Arc<MetricsCollector>,
}

impl MetricExtractor {
    pub fn new(
        locator: Locator,
        not_ready: impl Into<String>,
        poller: ReadinessPoller,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            locator,
            not_ready: not_ready.into(),
            poller,
            metrics,
        }
    }

    pub async fn extract(&self, session: &mut dyn PageSession, target: &Target) -> MetricValue {
        log::info!("Visiting {}: {}", target.label, target.url);
        let started = Instant::now();

        match self.try_extract(session, target).await {
            Ok(text) => {
                self.metrics.record_success(started.elapsed());
                log::info!("{}: {}", target.label, text);
                MetricValue::Observed(text)
            }
            Err(e) => {
                self.metrics.record_failure(&e, started.elapsed());
                log::warn!("{} ({}) unavailable [{}]: {}", target.label, target.url, e.kind(), e);
                MetricValue::Unavailable
            }
        }
    }

    async fn try_extract(&self, session: &mut dyn PageSession, target: &Target) -> Result<String> {
        session.load(&target.url).await?;
        self.poller
            .await_ready(session, &self.locator, &self.not_ready)
            .await
    }
}
