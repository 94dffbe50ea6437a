//! Integration tests for bridge configuration loading

use std::io::Write;

use tether_core::{
    Bridge, BridgeConfig, BridgeError, ConfigError, LocalRuntime, NativeAddr, ReusePolicy,
    Signature,
};

#[test]
fn test_nested_bridge_table() {
    let toml = r#"
[app]
name = "notepad"

[bridge]
label = "libui"
reuse_policy = "reject"
registry_capacity = 256
"#;

    let config = BridgeConfig::from_str(toml).unwrap();
    assert_eq!(config.label, "libui");
    assert_eq!(config.reuse_policy, ReusePolicy::Reject);
    assert_eq!(config.registry_capacity, 256);
}

#[test]
fn test_partial_config_keeps_defaults() {
    let config = BridgeConfig::from_str("[bridge]\nlabel = \"ui\"\n").unwrap();
    assert_eq!(config.label, "ui");
    assert_eq!(config.reuse_policy, ReusePolicy::Overwrite);
    assert_eq!(config.registry_capacity, 64);
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "reuse_policy = \"reject\"").unwrap();

    let config = BridgeConfig::from_file(file.path()).unwrap();
    assert_eq!(config.reuse_policy, ReusePolicy::Reject);
    assert_eq!(config.label, "tether");
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = BridgeConfig::from_file(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::IoError(_))));
}

#[test]
fn test_serialize_roundtrip() {
    let config = BridgeConfig {
        label: "libui".to_string(),
        reuse_policy: ReusePolicy::Reject,
        registry_capacity: 8,
    };
    let text = config.to_toml().unwrap();
    assert!(text.contains("reuse_policy = \"reject\""));
    assert_eq!(BridgeConfig::from_str(&text).unwrap(), config);
}

#[test]
fn test_configured_bridge_applies_policy() {
    let config = BridgeConfig::from_str("reuse_policy = \"reject\"").unwrap();
    let bridge = Bridge::with_config(config);
    let mut rt = LocalRuntime::new();
    let at = NativeAddr::from_bits(0x1000);

    bridge.create(&mut rt, at, Signature::new(1), &[]).unwrap();
    let err = bridge.create(&mut rt, at, Signature::new(1), &[]).unwrap_err();
    assert_eq!(err, BridgeError::AddressInUse { addr: at });
    assert_eq!(
        bridge.describe_error(&err),
        "tether address 0x1000 is already registered"
    );
}
