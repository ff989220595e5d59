use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Pacing for consecutive respawns of a partner that keeps dying
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RespawnConfig {
    /// Delay enforced after the first rapid respawn (in milliseconds)
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Upper bound for the exponential delay (in milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Respawns allowed before the partner is considered broken
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// A partner that stays up this long resets the attempt budget (in milliseconds)
    #[serde(default = "default_stable_after_ms")]
    pub stable_after_ms: u64,

    /// Whether to randomize delays
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RespawnConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: default_max_attempts(),
            stable_after_ms: default_stable_after_ms(),
            jitter: false,
        }
    }
}

impl RespawnConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and return errors if invalid
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.min_delay_ms > self.max_delay_ms {
            return Err(anyhow::anyhow!(
                "min_delay_ms cannot be greater than max_delay_ms"
            ));
        }

        if self.max_attempts == 0 {
            return Err(anyhow::anyhow!("max_attempts must allow at least one respawn"));
        }

        if self.max_delay_ms > 600_000 {
            return Err(anyhow::anyhow!("max_delay_ms should not exceed 10 minutes"));
        }

        Ok(())
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn stable_after(&self) -> Duration {
        Duration::from_millis(self.stable_after_ms)
    }
}

/// Everything a supervisor needs to know, resolved once by the caller
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct SupervisorConfig {
    /// File holding one registered pid per line
    pub registry_path: PathBuf,
    /// Marker file whose presence asks every supervisor to exit
    pub sentinel_path: PathBuf,
    /// Program launched (with a role subcommand) to start a counterpart
    pub executable: PathBuf,
    /// Arguments placed before the role subcommand when launching a counterpart
    #[builder(default)]
    #[builder(setter(custom))]
    pub forwarded_args: Vec<String>,
    #[builder(default = "Duration::from_secs(1)")]
    pub poll_interval: Duration,
    #[builder(default = "Duration::from_secs(30)")]
    pub heartbeat_interval: Duration,
    #[builder(default)]
    pub respawn: RespawnConfig,
}

impl SupervisorConfig {
    pub fn builder() -> SupervisorConfigBuilder {
        SupervisorConfigBuilder::default()
    }
}

impl SupervisorConfigBuilder {
    pub fn forwarded_args<S: ToString, I: IntoIterator<Item = S>>(&mut self, iter: I) -> &mut Self {
        let args: Vec<String> = iter.into_iter().map(|s| s.to_string()).collect();
        self.forwarded_args = Some(args);
        self
    }

    fn validate(&self) -> Result<(), String> {
        if self.poll_interval.is_some_and(|d| d.is_zero()) {
            return Err("poll_interval must be greater than zero".to_string());
        }
        if self.heartbeat_interval.is_some_and(|d| d.is_zero()) {
            return Err("heartbeat_interval must be greater than zero".to_string());
        }
        if let Some(respawn) = &self.respawn {
            respawn.validate().map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

// Default value functions for serde
fn default_min_delay_ms() -> u64 {
    1_000
}
fn default_max_delay_ms() -> u64 {
    30_000
}
fn default_max_attempts() -> u32 {
    10
}
fn default_stable_after_ms() -> u64 {
    60_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RespawnConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_delay(), Duration::from_secs(1));
        assert_eq!(config.stable_after(), Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_config() {
        let mut config = RespawnConfig {
            min_delay_ms: 1000,
            max_delay_ms: 500,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.max_delay_ms = 1000;
        config.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serialization_defaults() {
        let config: RespawnConfig = serde_json::from_str(r#"{"maxAttempts": 3}"#).unwrap();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.min_delay_ms, 1_000);
        assert!(!config.jitter);
    }

    #[test]
    fn test_builder_defaults() {
        let config = SupervisorConfig::builder()
            .registry_path("/tmp/pids")
            .sentinel_path("/tmp/stop_signal")
            .executable("/usr/local/bin/procpair")
            .forwarded_args(["--registry", "/tmp/pids"])
            .build()
            .unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.heartbeat_interval, Duration::from_secs(30));
        assert_eq!(config.forwarded_args, vec!["--registry", "/tmp/pids"]);
        assert_eq!(config.respawn, RespawnConfig::default());
    }

    #[test]
    fn test_builder_rejects_zero_interval() {
        let result = SupervisorConfig::builder()
            .registry_path("/tmp/pids")
            .sentinel_path("/tmp/stop_signal")
            .executable("procpair")
            .poll_interval(Duration::ZERO)
            .build();
        assert!(result.is_err());

        let missing = SupervisorConfig::builder().executable("procpair").build();
        assert!(missing.is_err());
    }
}
