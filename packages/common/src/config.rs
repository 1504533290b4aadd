use serde::Deserialize;

/// Battery monitor configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    /// Whether the periodic battery check runs at all. Default: true.
    #[serde(default = "default_monitor_enabled")]
    pub enabled: bool,
    /// Seconds between two battery checks. Default: 3600 (hourly).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Retries of a check after its first run, for drones whose update failed. Default: 3.
    #[serde(default = "default_max_retries")]
    pub max_retries: u8,
    /// Base delay for exponential backoff between attempts. Default: 500ms.
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
    /// Upper bound for the backoff delay. Default: 10s.
    #[serde(default = "default_retry_max_ms")]
    pub retry_max_ms: u64,
    /// Fixed seed for the charge simulation. Entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_monitor_enabled() -> bool {
    true
}
fn default_interval_secs() -> u64 {
    3600
}
fn default_max_retries() -> u8 {
    3
}
fn default_retry_base_ms() -> u64 {
    500
}
fn default_retry_max_ms() -> u64 {
    10_000
}

impl MonitorConfig {
    /// Runs per check: the first one plus `max_retries`.
    pub fn max_attempts(&self) -> u8 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: default_monitor_enabled(),
            interval_secs: default_interval_secs(),
            max_retries: default_max_retries(),
            retry_base_ms: default_retry_base_ms(),
            retry_max_ms: default_retry_max_ms(),
            seed: None,
        }
    }
}
