//! Tests for loading and saving session configuration files.

use std::path::PathBuf;

use seqwave::config::ScenarioConfig;
use seqwave::{ClockPolarity, ConfigError, Session, SessionCommand, SimConfig, SimConfigBuilder};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("seqwave-{}-{}", std::process::id(), name))
}

fn sample_config() -> SimConfig {
    SimConfigBuilder::new()
        .initial_cycles(6)
        .playback_period_ms(300)
        .log_level("debug")
        .device("jk-flip-flop-async")
        .polarity(ClockPolarity::Negative)
        .command(SessionCommand::Toggle {
            cycle: 0,
            input: "CLR".to_string(),
        })
        .build()
        .unwrap()
}

#[test]
fn test_yaml_file_roundtrip() {
    let path = temp_path("session.yaml");
    let config = sample_config();
    config.to_yaml_file(&path).unwrap();

    let loaded = SimConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_file_roundtrip() {
    let path = temp_path("session.json");
    let config = sample_config();
    config.to_json_file(&path).unwrap();

    let loaded = SimConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded, config);
}

#[test]
fn test_missing_file_is_io_error() {
    let result = SimConfig::from_file(temp_path("does-not-exist.yml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_malformed_json_is_parse_error() {
    let result = SimConfig::from_json(r#"{"simulation": {"initial_cycles": "many"}}"#);
    assert!(matches!(result, Err(ConfigError::Json(_))));
}

#[test]
fn test_unknown_command_is_rejected() {
    let yaml = r#"
scenario:
  device: d-flip-flop-pe
  commands:
    - command: explode
"#;
    assert!(matches!(SimConfig::from_yaml(yaml), Err(ConfigError::Yaml(_))));
}

#[test]
fn test_loaded_config_drives_session() {
    let session = Session::from_config(&sample_config()).unwrap();
    assert_eq!(session.tape().len(), 6);
    assert_eq!(session.clock().polarity, ClockPolarity::Negative);

    // CLR held low on cycle 0 forces Q=0, Q'=1
    let first = session.waveform().states_after_cycles().next().unwrap();
    assert_eq!(u8::from(first.level("Q'")), 1);
    assert_eq!(session.waveform().stats.async_overrides, 1);
}

#[test]
fn test_scenario_defaults() {
    let scenario: ScenarioConfig = serde_yaml::from_str("device: sr-latch").unwrap();
    assert_eq!(scenario.device.as_deref(), Some("sr-latch"));
    assert!(scenario.polarity.is_none());
    assert!(scenario.commands.is_empty());
}
