//! Loading and saving configs on disk.

use std::fs;
use tailrisk_config::prelude::*;
use tailrisk_risk::var::VaRMethod;
use tempfile::TempDir;

fn customized() -> AnalysisConfig {
    let mut config = AnalysisConfig {
        confidence_level: 0.99,
        horizons: vec![1, 10],
        var_methods: vec![VaRMethod::Parametric],
        monte_carlo_seed: Some(42),
        start_date: chrono::NaiveDate::from_ymd_opt(2020, 1, 1),
        ..AnalysisConfig::default()
    };
    config.portfolio_assets.insert("EQ".into(), 0.7);
    config.portfolio_assets.insert("BOND".into(), 0.3);
    config
}

#[test]
fn save_then_load_preserves_values_in_every_format() {
    let dir = TempDir::new().unwrap();
    let config = customized();
    for name in ["analysis.json", "analysis.toml", "analysis.yaml", "analysis.yml"] {
        let path = dir.path().join(name);
        config.save(&path).unwrap();
        let loaded = AnalysisConfig::load_validated(&path).unwrap();
        assert_eq!(loaded, config, "mismatch for {name}");
    }
}

#[test]
fn unsupported_extension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("analysis.ini");
    assert!(matches!(
        AnalysisConfig::default().save(&path),
        Err(ConfigError::UnsupportedFormat { .. })
    ));
    fs::write(&path, "confidence_level = 0.9").unwrap();
    assert!(matches!(
        AnalysisConfig::load(&path),
        Err(ConfigError::UnsupportedFormat { .. })
    ));
}

#[test]
fn missing_file_reports_io_error() {
    let dir = TempDir::new().unwrap();
    let err = AnalysisConfig::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn malformed_file_reports_deserialization_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ \"horizons\": [1, ").unwrap();
    assert!(matches!(
        AnalysisConfig::load(&path),
        Err(ConfigError::Deserialization(_))
    ));
}

#[test]
fn load_validated_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "confidence_level: 1.5\n").unwrap();
    assert!(AnalysisConfig::load(&path).is_ok());
    assert!(matches!(
        AnalysisConfig::load_validated(&path),
        Err(ConfigError::Validation { ref field, .. }) if field == "confidence_level"
    ));
}
