//! Simulation configuration files.
//!
//! A configuration is a JSON object; every field is optional:
//!
//! ```json
//! {
//!   "timing": { "period": 1048576, "pulse_width": 8192 },
//!   "inputs": { "a": 5, "b": 3, "selector": 7 },
//!   "steps": 13
//! }
//! ```

use crate::board::Inputs;
use crate::display::{Step, Timing, TimingError};
use serde::{Serialize, Deserialize};
use std::path::Path;
use thiserror::Error;

/// Largest step count a single run may request.
pub const MAX_STEPS: u64 = 1_000_000;

/// Settings for a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Sequencer pacing.
    pub timing: Timing,
    /// Operand and selector levels held for the run.
    pub inputs: Inputs,
    /// Number of sequencer steps to run.
    pub steps: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            timing: Timing::REFERENCE,
            inputs: Inputs::default(),
            steps: Step::COUNT as u64,
        }
    }
}

impl SimConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
    
    /// Check limits that the field types alone do not enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps > MAX_STEPS {
            return Err(ConfigError::TooManySteps { steps: self.steps, max: MAX_STEPS });
        }
        Ok(())
    }
    
    /// Replace either half of the timing, keeping the other.
    pub fn override_timing(
        &mut self,
        period: Option<u32>,
        pulse_width: Option<u32>,
    ) -> Result<(), ConfigError> {
        if period.is_none() && pulse_width.is_none() {
            return Ok(());
        }
        self.timing = Timing::new(
            period.unwrap_or(self.timing.period()),
            pulse_width.unwrap_or(self.timing.pulse_width()),
        )?;
        Ok(())
    }
    
    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> String {
        // Plain structs of integers always serialize.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Load a configuration file from disk.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SimConfig, ConfigError> {
    let text = std::fs::read_to_string(path.as_ref())
        .map_err(|e| ConfigError::IoError(e.to_string()))?;
    let config = SimConfig::from_json(&text)?;
    tracing::info!(path = %path.as_ref().display(), ?config, "loaded config");
    Ok(config)
}

/// Save a configuration file to disk.
pub fn save_config<P: AsRef<Path>>(path: P, config: &SimConfig) -> Result<(), ConfigError> {
    std::fs::write(path.as_ref(), config.to_json())
        .map_err(|e| ConfigError::IoError(e.to_string()))
}

/// Errors that can occur loading a configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(String),
    
    #[error("invalid config: {0}")]
    ParseError(String),
    
    #[error("invalid timing: {0}")]
    Timing(#[from] TimingError),
    
    #[error("{steps} steps requested, at most {max} allowed")]
    TooManySteps { steps: u64, max: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alu::Opcode;
    
    #[test]
    fn test_empty_object_is_default() {
        let config = SimConfig::from_json("{}").unwrap();
        assert_eq!(config, SimConfig::default());
        assert_eq!(config.timing, Timing::REFERENCE);
        assert_eq!(config.steps, 13);
    }
    
    #[test]
    fn test_partial_config() {
        let config = SimConfig::from_json(
            r#"{ "inputs": { "a": -128, "b": -1, "selector": 4 }, "timing": { "period": 64, "pulse_width": 4 } }"#,
        )
        .unwrap();
        assert_eq!(config.inputs.a, -128);
        assert_eq!(config.inputs.opcode(), Opcode::Div);
        assert_eq!(config.timing.period(), 64);
        assert_eq!(config.steps, 13);
    }
    
    #[test]
    fn test_invalid_timing_rejected() {
        let err = SimConfig::from_json(r#"{ "timing": { "period": 4, "pulse_width": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(err.to_string().contains("at least one tick"));
    }
    
    #[test]
    fn test_out_of_range_operand_rejected() {
        assert!(SimConfig::from_json(r#"{ "inputs": { "a": 200 } }"#).is_err());
    }
    
    #[test]
    fn test_json_roundtrip() {
        let config = SimConfig {
            timing: Timing::new(100, 10).unwrap(),
            inputs: Inputs::new(1, 2, Opcode::Xor),
            steps: 40,
        };
        assert_eq!(SimConfig::from_json(&config.to_json()).unwrap(), config);
    }
    
    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("alu8-config-{}.json", std::process::id()));
        let config = SimConfig {
            timing: Timing::new(256, 16).unwrap(),
            inputs: Inputs::new(-128, -1, Opcode::Div),
            steps: 22,
        };
        
        save_config(&path, &config).unwrap();
        let loaded = load_config(&path);
        let _ = std::fs::remove_file(&path);
        
        assert_eq!(loaded.unwrap(), config);
    }
    
    #[test]
    fn test_too_many_steps_rejected() {
        let err = SimConfig::from_json(r#"{ "steps": 18446744073709551615 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::TooManySteps { max: MAX_STEPS, .. }));
        
        let config = SimConfig { steps: MAX_STEPS, ..SimConfig::default() };
        assert!(config.validate().is_ok());
    }
    
    #[test]
    fn test_override_timing() {
        let mut config = SimConfig::default();
        config.override_timing(None, None).unwrap();
        assert_eq!(config.timing, Timing::REFERENCE);
        
        config.override_timing(Some(64), Some(8)).unwrap();
        assert_eq!(config.timing, Timing::new(64, 8).unwrap());
        
        config.override_timing(None, Some(4)).unwrap();
        assert_eq!(config.timing.period(), 64);
        assert_eq!(config.timing.pulse_width(), 4);
        
        let err = config.override_timing(Some(4), None).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Timing(TimingError::PulseTooLong { pulse_width: 4, period: 4 })
        ));
        // A rejected override leaves the previous timing in place.
        assert_eq!(config.timing.period(), 64);
    }
    
    #[test]
    fn test_missing_file() {
        let err = load_config("/nonexistent/alu8.json").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
