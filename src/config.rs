use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub engine: EngineConfig,
    pub orchestrator: OrchestratorConfig,
    pub controls: ControlsConfig,
    pub sandbox: SandboxConfig,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    pub base_url: String,
    pub mode: EngineMode,
    pub request_timeout_seconds: u64,
}

/// Which engine the console drives: a remote deployment, or the embedded
/// loopback sandbox for demos and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    Remote,
    Sandbox,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrchestratorConfig {
    pub poll_interval_ms: u64,
    pub trigger_grace_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlsConfig {
    pub default_batch_size: u32,
    pub default_industry: String,
    pub default_dry_run: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SandboxConfig {
    pub listen_address: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub directory: String,
}

impl EngineConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl OrchestratorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn trigger_grace(&self) -> Duration {
        Duration::from_millis(self.trigger_grace_ms)
    }
}

impl SandboxConfig {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.listen_address, self.port)
    }
}

impl Config {
    /// Environment wins over the file for deployment-specific values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("LEAD_ENGINE_URL") {
            if !url.is_empty() {
                self.engine.base_url = url;
            }
        }
        if let Ok(mode) = std::env::var("LEAD_ENGINE_MODE") {
            match mode.to_lowercase().as_str() {
                "remote" => self.engine.mode = EngineMode::Remote,
                "sandbox" => self.engine.mode = EngineMode::Sandbox,
                _ => {}
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig {
                base_url: "http://localhost:8000".to_string(),
                mode: EngineMode::Remote,
                request_timeout_seconds: 10,
            },
            orchestrator: OrchestratorConfig {
                // Reference cadence: resync every 3s, resync 800ms after a
                // trigger is acknowledged.
                poll_interval_ms: 3000,
                trigger_grace_ms: 800,
            },
            controls: ControlsConfig {
                default_batch_size: 10,
                default_industry: String::new(),
                default_dry_run: true,
            },
            sandbox: SandboxConfig {
                listen_address: "127.0.0.1".to_string(),
                port: 8900,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            output: OutputConfig {
                directory: "out".to_string(),
            },
        }
    }
}

pub async fn load_config(
    path: &str,
) -> std::result::Result<Config, Box<dyn std::error::Error + Send + Sync>> {
    let content = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&content)?;
    Ok(config)
}
