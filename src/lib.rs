pub mod config;
pub mod error;
pub mod extractor;
pub mod metrics;
pub mod output;
pub mod poller;
pub mod record;
pub mod renderer;
pub mod selector;
pub mod sweep;

pub use error::{Error, Result};
pub use extractor::MetricExtractor;
pub use metrics::collector::MetricsCollector;
pub use metrics::snapshot::MetricsSnapshot;
pub use output::LogWriter;
pub use poller::ReadinessPoller;
pub use record::{MetricValue, SweepRecord, Target};
pub use renderer::{PageSession, Renderer};
pub use selector::Locator;
pub use sweep::{BatchCollector, SweepState};
