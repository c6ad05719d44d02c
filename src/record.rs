use chrono::{DateTime, Local};
use serde_json::{Map, Value};

/// Timestamp layout of the log's first column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Marker written in place of a value that could not be extracted.
pub const UNAVAILABLE: &str = "unavailable";

/// One monitored location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub url: String,
    pub label: String,
}

impl Target {
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
        }
    }
}

/// The text read for one target during one sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricValue {
    Observed(String),
    Unavailable,
}

impl MetricValue {
    pub fn is_available(&self) -> bool {
        matches!(self, MetricValue::Observed(_))
    }

    /// The text written to the log column.
    pub fn as_field<'a>(&'a self, marker: &'a str) -> &'a str {
        match self {
            MetricValue::Observed(text) => text,
            MetricValue::Unavailable => marker,
        }
    }
}

/// One row of the log: sweep start time plus one value per target, in
/// target order.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRecord {
    pub timestamp: DateTime<Local>,
    pub values: Vec<MetricValue>,
}

impl SweepRecord {
    pub fn new(timestamp: DateTime<Local>, values: Vec<MetricValue>) -> Self {
        Self { timestamp, values }
    }

    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn available_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_available()).count()
    }

    /// Log row: timestamp followed by each value, failures as `marker`.
    pub fn to_row(&self, marker: &str) -> Vec<String> {
        std::iter::once(self.formatted_timestamp())
            .chain(self.values.iter().map(|v| v.as_field(marker).to_string()))
            .collect()
    }

    /// JSON object keyed by target label; failures become `null`.
    pub fn to_json(&self, targets: &[Target]) -> Value {
        let mut obj = Map::new();
        obj.insert("timestamp".into(), Value::String(self.formatted_timestamp()));
        for (target, value) in targets.iter().zip(&self.values) {
            let v = match value {
                MetricValue::Observed(text) => Value::String(text.clone()),
                MetricValue::Unavailable => Value::Null,
            };
            obj.insert(target.label.clone(), v);
        }
        Value::Object(obj)
    }
}

/// Header row matching [`SweepRecord::to_row`].
pub fn header_row(targets: &[Target]) -> Vec<String> {
    std::iter::once("timestamp".to_string())
        .chain(targets.iter().map(|t| t.label.clone()))
        .collect()
}
