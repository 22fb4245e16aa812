// Config file loading, saving, and translation.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use pretty_assertions::assert_eq;

use lightpoke_api::DEFAULT_SERVER_URL;
use lightpoke_api::transport::TlsMode;
use lightpoke_config::{Config, ConfigError, load_config_from, save_config_to};

// ── Loading ─────────────────────────────────────────────────────────

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config_from(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(config, Config::default());
    assert!(config.client.enabled);
    assert_eq!(config.client.server, DEFAULT_SERVER_URL);
    assert_eq!(config.tuning.preset_id, 249);
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[client]
api_key = "abc123"

[tuning]
failure_threshold = 3
"#,
    )
    .unwrap();

    let config = load_config_from(&path).unwrap();

    assert_eq!(config.client.api_key, "abc123");
    assert!(config.client.enabled);
    assert_eq!(config.tuning.failure_threshold, 3);
    assert_eq!(config.tuning.tick_interval_ms, 50);
}

#[test]
fn test_malformed_file_is_figment_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[tuning]\npreset_id = 300\n").unwrap();

    let err = load_config_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Figment(_)), "got {err:?}");
}

// ── Saving ──────────────────────────────────────────────────────────

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.client.api_key = "k".into();
    config.client.server = "https://api.lightpoke.io".into();
    config.device.url = "http://192.168.1.50".into();
    config.tuning.preset_id = 200;

    save_config_to(&config, &path).unwrap();
    let loaded = load_config_from(&path).unwrap();

    assert_eq!(loaded, config);
}

// ── Translation ─────────────────────────────────────────────────────

#[test]
fn test_resolve_defaults() {
    let runtime = Config::default().resolve().unwrap();

    assert_eq!(runtime.client.server_url, DEFAULT_SERVER_URL);
    assert_eq!(runtime.tuning.restore_preset_id, 249);
    assert_eq!(
        runtime.tuning.supervisor.failure_interval,
        Duration::from_millis(1000)
    );
    assert_eq!(runtime.tuning.supervisor.failure_threshold, 10);
    assert_eq!(runtime.tick_interval, Duration::from_millis(50));
    assert_eq!(runtime.transport.connect_timeout, Duration::from_secs(10));
    assert_eq!(runtime.tuning.session_timeout, Duration::from_secs(20));
    assert!(matches!(runtime.transport.tls, TlsMode::System));
}

#[test]
fn test_untrusted_server_is_replaced() {
    let mut config = Config::default();
    config.client.server = "https://attacker.example".into();

    assert_eq!(config.client_config().server_url, DEFAULT_SERVER_URL);
}

#[test]
fn test_lan_server_is_kept() {
    let mut config = Config::default();
    config.client.server = "http://10.1.2.3:3000".into();

    assert_eq!(config.client_config().server_url, "http://10.1.2.3:3000");
}

#[test]
fn test_insecure_selects_permissive_tls() {
    let mut config = Config::default();
    config.client.insecure = true;

    assert!(matches!(
        config.transport().tls,
        TlsMode::DangerAcceptInvalid
    ));
}

#[test]
fn test_invalid_device_url_rejected() {
    let mut config = Config::default();
    config.device.url = "not a url".into();
    assert!(matches!(
        config.resolve(),
        Err(ConfigError::Validation { ref field, .. }) if field == "device.url"
    ));

    config.device.url = "ftp://192.168.1.50".into();
    assert!(matches!(
        config.device_url(),
        Err(ConfigError::Validation { .. })
    ));
}

#[test]
fn test_zero_tick_interval_rejected() {
    let mut config = Config::default();
    config.tuning.tick_interval_ms = 0;

    assert!(matches!(
        config.resolve(),
        Err(ConfigError::Validation { ref field, .. }) if field == "tuning.tick_interval_ms"
    ));
}
