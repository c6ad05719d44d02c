use crate::record::{Target, UNAVAILABLE};
use crate::selector::Locator;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MonitorConfig {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub name: String,

    /// Monitored pages, in log column order.
    #[serde(default)]
    #[validate(length(min = 1))]
    pub targets: Vec<TargetConfig>,

    #[serde(default)]
    pub locator: Locator,

    #[serde(default = "default_not_ready")]
    #[validate(length(min = 1))]
    pub not_ready_value: String,

    #[serde(default = "default_marker")]
    #[validate(length(min = 1))]
    pub unavailable_marker: String,

    #[serde(default = "default_settle_timeout")]
    pub settle_timeout_ms: u64,

    #[serde(default = "default_navigation_timeout")]
    #[validate(range(min = 1))]
    pub navigation_timeout_ms: u64,

    #[serde(default = "default_ready_timeout")]
    #[validate(range(min = 1))]
    pub ready_timeout_ms: u64,

    #[serde(default = "default_poll_interval")]
    #[validate(range(min = 1))]
    pub poll_interval_ms: u64,

    #[serde(default = "default_log_path")]
    #[validate(length(min = 1))]
    pub log_path: String,

    /// Chromium executable; detected when absent.
    #[serde(default)]
    pub chrome_path: Option<String>,

    /// Optional path to a parent configuration file to inherit from
    #[serde(default)]
    pub extends: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub url: String,

    /// Column name in the log; the URL when omitted.
    #[serde(default)]
    pub label: Option<String>,
}

impl TargetConfig {
    pub fn to_target(&self) -> Target {
        let label = self.label.clone().unwrap_or_else(|| self.url.clone());
        Target::new(self.url.clone(), label)
    }
}

impl MonitorConfig {
    pub fn targets(&self) -> Vec<Target> {
        self.targets.iter().map(TargetConfig::to_target).collect()
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

pub(crate) fn default_not_ready() -> String {
    crate::extractor::NOT_READY.to_string()
}

pub(crate) fn default_marker() -> String {
    UNAVAILABLE.to_string()
}

pub(crate) fn default_settle_timeout() -> u64 {
    10_000
}

pub(crate) fn default_navigation_timeout() -> u64 {
    30_000
}

pub(crate) fn default_ready_timeout() -> u64 {
    20_000
}

pub(crate) fn default_poll_interval() -> u64 {
    250
}

pub(crate) fn default_log_path() -> String {
    "visitors_data.csv".to_string()
}
