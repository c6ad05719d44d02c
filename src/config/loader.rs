use crate::config::schema::{self, MonitorConfig};
use crate::error::{Error, Result};
use crate::extractor::MetricExtractor;
use crate::metrics::collector::MetricsCollector;
use crate::poller::ReadinessPoller;
use crate::renderer::ChromiumRenderer;
use crate::sweep::BatchCollector;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;
use validator::Validate;

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<MonitorConfig> {
        let path = path.as_ref();
        let mut visited = HashSet::new();
        Self::load_with_inheritance(path, &mut visited, false)
    }

    fn load_with_inheritance(
        path: &Path,
        visited: &mut HashSet<PathBuf>,
        is_parent_load: bool,
    ) -> Result<MonitorConfig> {
        let path = fs::canonicalize(path).map_err(|e| {
            Error::Config(format!("{}: {}", path.display(), e))
        })?;

        if visited.contains(&path) {
            return Err(Error::Config(format!(
                "Circular inheritance detected involving {}",
                path.display()
            )));
        }
        visited.insert(path.clone());

        let config = Self::load_file(&path)?;

        let final_config = if let Some(parent_path_str) = &config.extends {
            let parent_path = path.parent()
                .ok_or_else(|| Error::Config(format!(
                    "Cannot determine parent directory for {}",
                    path.display()
                )))?
                .join(parent_path_str);

            let parent_config = Self::load_with_inheritance(&parent_path, visited, true)?;
            Self::merge_configs(parent_config, config)
        } else {
            config
        };

        if !is_parent_load {
            Self::validate(&final_config)?;
        }

        Ok(final_config)
    }

    fn load_file(path: &Path) -> Result<MonitorConfig> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config: MonitorConfig = serde_json::from_str(&content)?;
                Ok(config)
            }
            Some("yaml") | Some("yml") => {
                let config: MonitorConfig = serde_yaml::from_str(&content)?;
                Ok(config)
            }
            Some("toml") => {
                let config: MonitorConfig = toml::from_str(&content)?;
                Ok(config)
            }
            _ => Err(Error::Config(format!(
                "Unsupported file extension: {}",
                path.display()
            ))),
        }
    }

    fn validate(config: &MonitorConfig) -> Result<()> {
        config.validate()?;

        if config.poll_interval_ms >= config.ready_timeout_ms {
            return Err(Error::Config(format!(
                "poll_interval_ms ({}) must be shorter than ready_timeout_ms ({})",
                config.poll_interval_ms, config.ready_timeout_ms
            )));
        }

        let mut labels = HashSet::new();
        for target in config.targets() {
            Url::parse(&target.url)
                .map_err(|e| Error::Config(format!("invalid target URL {:?}: {}", target.url, e)))?;

            if target.label.trim().is_empty() || target.label.eq_ignore_ascii_case("timestamp") {
                return Err(Error::Config(format!(
                    "invalid column label {:?} for {}",
                    target.label, target.url
                )));
            }
            if !labels.insert(target.label.clone()) {
                return Err(Error::Config(format!("duplicate target label {:?}", target.label)));
            }
        }

        Ok(())
    }

    fn merge_configs(mut parent: MonitorConfig, child: MonitorConfig) -> MonitorConfig {
        if !child.name.is_empty() {
            parent.name = child.name;
        }
        if !child.targets.is_empty() {
            parent.targets = child.targets;
        }
        if child.locator != Default::default() {
            parent.locator = child.locator;
        }
        if child.not_ready_value != schema::default_not_ready() {
            parent.not_ready_value = child.not_ready_value;
        }
        if child.unavailable_marker != schema::default_marker() {
            parent.unavailable_marker = child.unavailable_marker;
        }
        if child.settle_timeout_ms != schema::default_settle_timeout() {
            parent.settle_timeout_ms = child.settle_timeout_ms;
        }
        if child.navigation_timeout_ms != schema::default_navigation_timeout() {
            parent.navigation_timeout_ms = child.navigation_timeout_ms;
        }
        if child.ready_timeout_ms != schema::default_ready_timeout() {
            parent.ready_timeout_ms = child.ready_timeout_ms;
        }
        if child.poll_interval_ms != schema::default_poll_interval() {
            parent.poll_interval_ms = child.poll_interval_ms;
        }
        if child.log_path != schema::default_log_path() {
            parent.log_path = child.log_path;
        }
        if child.chrome_path.is_some() {
            parent.chrome_path = child.chrome_path;
        }

        parent.extends = None;
        parent
    }

    pub fn create_renderer(config: &MonitorConfig) -> ChromiumRenderer {
        ChromiumRenderer::new(
            config.chrome_path.as_ref().map(PathBuf::from),
            config.navigation_timeout(),
            config.settle_timeout(),
        )
    }

    pub fn create_collector(
        config: &MonitorConfig,
        metrics: Arc<MetricsCollector>,
    ) -> BatchCollector {
        let poller = ReadinessPoller::new(config.ready_timeout(), config.poll_interval());
        let extractor = MetricExtractor::new(
            config.locator.clone(),
            config.not_ready_value.clone(),
            poller,
            metrics.clone(),
        );
        BatchCollector::new(extractor, metrics)
    }
}
