//! Prometheus metrics.
//!
//! Metric names emitted across the crate:
//!
//! | Name | Kind | Labels |
//! |------|------|--------|
//! | `corpus_load_total` | counter | `status` |
//! | `corpus_canons` | gauge | |
//! | `canon_match_queries_total` | counter | |
//! | `canon_search_queries_total` | counter | |
//! | `validation_errors_total` | counter | |
//! | `mcp_requests_total` | counter | `method`, `status` |
//! | `mcp_request_duration_ms` | histogram | `method` |
//! | `mcp_tool_calls_total` | counter | `tool`, `status` |

use crate::config::MetricsSettings;
use crate::{Error, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::thread;

/// Default exporter port.
pub const DEFAULT_METRICS_PORT: u16 = 9090;

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,
    /// Address to bind the metrics exporter.
    pub listen_addr: SocketAddr,
}

impl MetricsConfig {
    /// Builds metrics configuration from config settings with env overrides.
    #[must_use]
    pub fn from_settings(settings: Option<&MetricsSettings>) -> Self {
        Self::resolve(settings, |key| std::env::var(key).ok())
    }

    fn resolve(settings: Option<&MetricsSettings>, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut enabled = settings.and_then(|s| s.enabled).unwrap_or(false);
        let mut port = settings
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_METRICS_PORT);

        if let Some(value) = env("DEADENDS_METRICS_ENABLED") {
            enabled = parse_bool(&value);
        }
        if let Some(value) = env("DEADENDS_METRICS_PORT").and_then(|v| v.trim().parse().ok()) {
            port = value;
        }

        Self {
            enabled,
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port),
        }
    }
}

/// Handle to the installed recorder.
#[derive(Debug, Clone)]
pub struct MetricsHandle {
    prometheus: PrometheusHandle,
}

impl MetricsHandle {
    /// Renders the current metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.prometheus.render()
    }
}

/// Installs the Prometheus recorder, with an HTTP listener when `expose`.
///
/// # Errors
///
/// Returns an error if a recorder is already installed or the listener
/// cannot start.
pub fn install_prometheus(config: &MetricsConfig, expose: bool) -> Result<Option<MetricsHandle>> {
    if !config.enabled {
        return Ok(None);
    }

    let builder = PrometheusBuilder::new();
    let prometheus = if expose {
        install_listener(builder.with_http_listener(config.listen_addr))?
    } else {
        let recorder = builder.build_recorder();
        let handle = recorder.handle();
        set_global_recorder(recorder)?;
        handle
    };
    tracing::info!(addr = %config.listen_addr, expose, "Metrics recorder installed");

    Ok(Some(MetricsHandle { prometheus }))
}

fn install_listener(builder: PrometheusBuilder) -> Result<PrometheusHandle> {
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        return install_with_runtime(builder, &handle);
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::operation("metrics_runtime_init", e))?;
    let handle = runtime.handle().clone();
    let prometheus = install_with_runtime(builder, &handle)?;
    thread::Builder::new()
        .name("metrics-exporter-prometheus-http".to_string())
        .spawn(move || runtime.block_on(std::future::pending::<()>()))
        .map_err(|e| Error::operation("metrics_runtime_thread", e))?;
    Ok(prometheus)
}

fn install_with_runtime(
    builder: PrometheusBuilder,
    runtime_handle: &tokio::runtime::Handle,
) -> Result<PrometheusHandle> {
    let (recorder, exporter) = {
        let _guard = runtime_handle.enter();
        builder
            .build()
            .map_err(|e| Error::operation("metrics_exporter_build", e))?
    };
    let handle = recorder.handle();
    set_global_recorder(recorder)?;
    runtime_handle.spawn(exporter);
    Ok(handle)
}

fn set_global_recorder(recorder: PrometheusRecorder) -> Result<()> {
    metrics::set_global_recorder(recorder).map_err(|e| Error::operation("metrics_recorder_install", e))
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_metrics_registry_smoke() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        if metrics::set_global_recorder(recorder).is_err() {
            return;
        }

        metrics::counter!("test_metrics_registry_total").increment(1);
        let rendered = handle.render();
        assert!(rendered.contains("test_metrics_registry_total"));
    }

    #[test]
    fn test_disabled_by_default() {
        let config = MetricsConfig::resolve(None, |_| None);
        assert!(!config.enabled);
        assert_eq!(config.listen_addr.port(), DEFAULT_METRICS_PORT);
        assert!(install_prometheus(&config, false).unwrap().is_none());
    }

    #[test]
    fn test_env_overrides_settings() {
        let settings = MetricsSettings {
            enabled: Some(false),
            port: Some(9100),
        };
        let env: HashMap<&str, &str> =
            HashMap::from([("DEADENDS_METRICS_ENABLED", "yes"), ("DEADENDS_METRICS_PORT", "9200")]);
        let config = MetricsConfig::resolve(Some(&settings), |k| env.get(k).map(|v| (*v).to_string()));
        assert!(config.enabled);
        assert_eq!(config.listen_addr.port(), 9200);
    }

    #[test]
    fn test_bad_port_ignored() {
        let settings = MetricsSettings {
            enabled: Some(true),
            port: Some(9100),
        };
        let config = MetricsConfig::resolve(Some(&settings), |k| {
            (k == "DEADENDS_METRICS_PORT").then(|| "not-a-port".to_string())
        });
        assert_eq!(config.listen_addr.port(), 9100);
    }
}
