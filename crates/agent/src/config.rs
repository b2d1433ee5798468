//! Daemon configuration

use anyhow::Result;
use linkpulse_lib::AgentConfig;
use serde::Deserialize;

/// Daemon configuration, loaded from `LINKPULSE_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Host name reported in structured logs
    #[serde(default = "default_host_name")]
    pub host_name: String,

    /// HTTP port for status and metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Seconds of wall time per simulated tick
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,

    /// Scenario feeding the pipeline (A|B|C|D)
    #[serde(default = "default_scenario")]
    pub scenario: String,

    /// Drive the state machine from the smoothed score
    #[serde(default = "default_use_ewma")]
    pub use_ewma: bool,
}

fn default_host_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
}

fn default_api_port() -> u16 {
    8080
}

fn default_tick_interval() -> u64 {
    1
}

fn default_scenario() -> String {
    "D".to_string()
}

fn default_use_ewma() -> bool {
    true
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host_name: default_host_name(),
            api_port: default_api_port(),
            tick_interval_secs: default_tick_interval(),
            scenario: default_scenario(),
            use_ewma: default_use_ewma(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("LINKPULSE"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }

    /// Core pipeline configuration derived from the daemon settings.
    pub fn core_config(&self) -> AgentConfig {
        let mut cfg = AgentConfig::default();
        cfg.score.use_ewma = self.use_ewma;
        cfg
    }
}
