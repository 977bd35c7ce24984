//! Bridge configuration.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Largest accepted `fault_history`.
pub const MAX_FAULT_HISTORY: usize = 4096;

/// How a frame buffer is exposed to the managed side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferMode {
    /// Zero-copy view when the runtime supports it, a copy otherwise
    #[default]
    Auto,
    /// Zero-copy view only; unsupported runtimes drop the frame
    Direct,
    /// Always copy
    Copy,
}

/// Configuration for a frame bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub buffer_mode: BufferMode,
    /// Reject video frames whose buffer is smaller than the recognized
    /// pixel format requires.
    pub validate_frame_size: bool,
    /// Number of recent faults kept for diagnostics.
    pub fault_history: usize,
    /// Faults logged at warn level before throttling kicks in.
    pub log_burst: u64,
    /// Once throttled, log every n-th fault.
    pub log_every: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            buffer_mode: BufferMode::Auto,
            validate_frame_size: true,
            fault_history: 16,
            log_burst: 10,
            log_every: 100,
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON configuration. Missing fields take their defaults; an
    /// empty string yields the default configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: BridgeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_every == 0 {
            return Err(ConfigError::Invalid("log_every must be at least 1".to_string()));
        }
        if self.fault_history > MAX_FAULT_HISTORY {
            return Err(ConfigError::Invalid(format!(
                "fault_history must be at most {}, got {}",
                MAX_FAULT_HISTORY, self.fault_history
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(BridgeConfig::from_json("").unwrap(), BridgeConfig::default());
        assert_eq!(BridgeConfig::from_json("  ").unwrap(), BridgeConfig::default());
        assert_eq!(BridgeConfig::from_json("{}").unwrap(), BridgeConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config = BridgeConfig::from_json(r#"{"buffer_mode": "copy", "fault_history": 0}"#).unwrap();
        assert_eq!(config.buffer_mode, BufferMode::Copy);
        assert_eq!(config.fault_history, 0);
        assert!(config.validate_frame_size);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let config = BridgeConfig::from_json(r#"{"color": "blue"}"#).unwrap();
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(BridgeConfig::from_json("{"), Err(ConfigError::Json(_))));
        assert!(matches!(
            BridgeConfig::from_json(r#"{"buffer_mode": "mmap"}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_zero_log_every_rejected() {
        assert!(matches!(
            BridgeConfig::from_json(r#"{"log_every": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_fault_history_limit() {
        let config = BridgeConfig::from_json(r#"{"fault_history": 4096}"#).unwrap();
        assert_eq!(config.fault_history, MAX_FAULT_HISTORY);

        assert!(matches!(
            BridgeConfig::from_json(r#"{"fault_history": 4097}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            BridgeConfig::from_json(r#"{"fault_history": 1099511627776}"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_serialized_config_parses() {
        let config = BridgeConfig {
            buffer_mode: BufferMode::Direct,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(BridgeConfig::from_json(&json).unwrap(), config);
    }
}
