//! Application State

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use site_assistant_agent::SiteAssistant;
use site_assistant_config::Settings;

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub assistant: Arc<SiteAssistant>,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let assistant = SiteAssistant::from_settings(&settings);
        Self::with_assistant(settings, assistant)
    }

    pub fn with_assistant(settings: Settings, assistant: SiteAssistant) -> Self {
        Self {
            settings: Arc::new(settings),
            assistant: Arc::new(assistant),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
