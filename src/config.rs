//! Configuration system for simulation sessions.
//!
//! This module provides YAML/JSON configuration file support for describing
//! a session declaratively: global parameters plus an optional scenario that
//! picks a device, seeds its tape and replays a list of commands.
//!
//! # Configuration File Structure
//!
//! ```yaml
//! simulation:
//!   initial_cycles: 8
//!   playback_period_ms: 500
//!   log_level: debug
//!
//! scenario:
//!   device: jk-flip-flop-pe
//!   polarity: negative
//!   clock_enabled: true
//!   tape:
//!     - { J: 1, K: 0 }
//!     - { J: 1, K: 1 }
//!   commands:
//!     - command: add_cycle
//!     - command: toggle
//!       cycle: 2
//!       input: K
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::clock::ClockPolarity;
use crate::session::{is_valid_period, SessionCommand, DEFAULT_PERIOD_MS};
use crate::signal::SignalVector;
use crate::tape::DEFAULT_CYCLES;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Global simulation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Cycles on a fresh tape
    #[serde(default = "default_initial_cycles")]
    pub initial_cycles: usize,

    /// Auto-advance period in milliseconds
    #[serde(default = "default_playback_period_ms")]
    pub playback_period_ms: u64,

    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_initial_cycles() -> usize {
    DEFAULT_CYCLES
}

fn default_playback_period_ms() -> u64 {
    DEFAULT_PERIOD_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            initial_cycles: default_initial_cycles(),
            playback_period_ms: default_playback_period_ms(),
            log_level: default_log_level(),
        }
    }
}

/// A scripted starting point for a session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Catalog id of the device to select
    #[serde(default)]
    pub device: Option<String>,

    /// Clock polarity override
    #[serde(default)]
    pub polarity: Option<ClockPolarity>,

    /// Clock enable override
    #[serde(default)]
    pub clock_enabled: Option<bool>,

    /// Explicit tape; unassigned inputs take their defaults
    #[serde(default)]
    pub tape: Option<Vec<SignalVector>>,

    /// Commands replayed after setup
    #[serde(default)]
    pub commands: Vec<SessionCommand>,
}

impl ScenarioConfig {
    /// Validates the scenario.
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(tape) = &self.tape {
            if tape.is_empty() {
                return Err(ConfigError::Validation(
                    "Scenario tape must contain at least one cycle".to_string(),
                ));
            }
        }
        if self.device.is_none() && (self.tape.is_some() || !self.commands.is_empty()) {
            tracing::warn!("Scenario names no device; the default device is used");
        }
        Ok(())
    }
}

/// Complete session configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Global simulation parameters
    #[serde(default)]
    pub simulation: SimulationParams,

    /// Optional scenario
    #[serde(default)]
    pub scenario: Option<ScenarioConfig>,
}

impl SimConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: SimConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Loads configuration from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file, auto-detecting format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            _ => Err(ConfigError::UnknownFormat(ext.to_string())),
        }
    }

    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let sim = &self.simulation;
        if sim.initial_cycles == 0 {
            return Err(ConfigError::Validation(
                "initial_cycles must be at least 1".to_string(),
            ));
        }
        if !is_valid_period(sim.playback_period_ms) {
            return Err(ConfigError::Validation(format!(
                "playback_period_ms {} must be within 100..=2000 and a multiple of 100",
                sim.playback_period_ms
            )));
        }
        if let Some(scenario) = &self.scenario {
            scenario.validate()?;
        }
        Ok(())
    }

    /// Saves configuration to a YAML file.
    pub fn to_yaml_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Saves configuration to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Converts to YAML string.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Converts to JSON string.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of scripted commands.
    pub fn command_count(&self) -> usize {
        self.scenario.as_ref().map_or(0, |s| s.commands.len())
    }
}

/// Builder for creating SimConfig programmatically.
#[derive(Default)]
pub struct SimConfigBuilder {
    config: SimConfig,
}

impl SimConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    fn scenario(&mut self) -> &mut ScenarioConfig {
        self.config.scenario.get_or_insert_with(ScenarioConfig::default)
    }

    /// Sets the number of cycles on a fresh tape.
    pub fn initial_cycles(mut self, cycles: usize) -> Self {
        self.config.simulation.initial_cycles = cycles;
        self
    }

    /// Sets the playback period.
    pub fn playback_period_ms(mut self, ms: u64) -> Self {
        self.config.simulation.playback_period_ms = ms;
        self
    }

    /// Sets the log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.simulation.log_level = level.into();
        self
    }

    /// Selects the scenario device.
    pub fn device(mut self, id: impl Into<String>) -> Self {
        self.scenario().device = Some(id.into());
        self
    }

    /// Overrides the clock polarity.
    pub fn polarity(mut self, polarity: ClockPolarity) -> Self {
        self.scenario().polarity = Some(polarity);
        self
    }

    /// Overrides the clock enable.
    pub fn clock_enabled(mut self, enabled: bool) -> Self {
        self.scenario().clock_enabled = Some(enabled);
        self
    }

    /// Sets an explicit tape.
    pub fn tape(mut self, tape: Vec<SignalVector>) -> Self {
        self.scenario().tape = Some(tape);
        self
    }

    /// Appends a scripted command.
    pub fn command(mut self, command: SessionCommand) -> Self {
        self.scenario().commands.push(command);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> ConfigResult<SimConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
