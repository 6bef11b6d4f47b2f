use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    DashboardError,
    backend::{BackendClient, DEFAULT_BACKEND_URL},
    live_monitor::{MonitorSettings, OverlapPolicy},
    upload_preview::{HEATMAP_PAGE, PreviewSettings},
};

/// How many poll intervals a request may take before it is abandoned.
const REQUEST_TIMEOUT_POLLS: u32 = 5;

/// Dashboard configuration. Each field can be overridden by the environment
/// variable of the same name in upper case, e.g. `POLL_INTERVAL_MS=500`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend_url: String,
    pub poll_interval_ms: u64,
    pub simulation_delay_ms: u64,
    pub heatmap_page: String,
    pub overlap_policy: OverlapPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            poll_interval_ms: 1000,
            simulation_delay_ms: 3000,
            heatmap_page: HEATMAP_PAGE.to_string(),
            overlap_policy: OverlapPolicy::Race,
        }
    }
}

impl Config {
    /// # Errors
    /// If the poll interval is zero or the heatmap page is empty.
    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.poll_interval_ms == 0 {
            return Err(DashboardError::InvalidSetting {
                name: "poll_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.heatmap_page.trim().is_empty() {
            return Err(DashboardError::InvalidSetting {
                name: "heatmap_page",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn monitor_settings(&self, backend: &BackendClient) -> MonitorSettings {
        MonitorSettings {
            feed_url: backend.feed_url(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            overlap: self.overlap_policy,
        }
    }

    /// Upper bound on a single backend request.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
            .saturating_mul(REQUEST_TIMEOUT_POLLS)
    }

    #[must_use]
    pub fn preview_settings(&self) -> PreviewSettings {
        PreviewSettings {
            simulation_delay: Duration::from_millis(self.simulation_delay_ms),
            heatmap_page: self.heatmap_page.clone(),
        }
    }
}
