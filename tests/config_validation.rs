//! Integration tests for configuration validation

#![allow(clippy::expect_used)]

use pcp_client::config::{
    ClientConfig, LoggingConfig, PcpConfig, TransportProtocol, DEFAULT_REQUESTED_LIFETIME,
    PCP_SERVER_PORT,
};
use tracing::Level;

fn valid_config() -> PcpConfig {
    PcpConfig::default_with_overrides(|c| {
        c.client.server_address = "192.168.1.1".to_string();
        c.client.local_address = "192.168.1.20".to_string();
        c.client.port = 8080;
    })
}

#[test]
fn test_default_config_requires_addresses_and_port() {
    let config = PcpConfig::default();
    let errors = config.validate();
    assert_eq!(errors.len(), 3, "Unexpected errors: {errors:?}");
    assert!(errors.iter().any(|e| e == "Server address cannot be empty"));
    assert!(errors.iter().any(|e| e == "Local address cannot be empty"));
    assert!(errors.iter().any(|e| e.contains("Port to map")));
}

#[test]
fn test_port_only_config_rejected() {
    let config = PcpConfig::default_with_overrides(|c| c.client.port = 8080);

    let errors = config.validate();
    assert_eq!(errors.len(), 2, "Unexpected errors: {errors:?}");
    assert!(errors.iter().any(|e| e.contains("Server address cannot be empty")));
    assert!(errors.iter().any(|e| e.contains("Local address cannot be empty")));
    assert!(config.validate_strict().is_err());
    assert!(config.client.server_socket_addr().is_err());
    assert!(config.client.local_socket_addr().is_err());
}

#[test]
fn test_port_with_one_address_rejected() {
    let config = PcpConfig::default_with_overrides(|c| {
        c.client.port = 8080;
        c.client.server_address = "192.168.1.1".to_string();
    });

    let errors = config.validate();
    assert_eq!(errors, vec!["Local address cannot be empty".to_string()]);
}

#[test]
fn test_defaults() {
    let client = ClientConfig::default();
    assert!(client.server_address.is_empty());
    assert!(client.local_address.is_empty());
    assert_eq!(client.port, 0);
    assert_eq!(client.server_port, PCP_SERVER_PORT);
    assert_eq!(client.requested_lifetime, DEFAULT_REQUESTED_LIFETIME);
    assert_eq!(client.protocol, TransportProtocol::Tcp);
    assert!(!client.prefer_failure);

    let logging = LoggingConfig::default();
    assert_eq!(logging.log_level, Level::WARN);
    assert!(!logging.json_format);
}

#[test]
fn test_valid_config_validates() {
    let errors = valid_config().validate();
    assert!(errors.is_empty(), "Config should be valid, got: {errors:?}");
    assert!(valid_config().validate_strict().is_ok());
}

#[test]
fn test_invalid_server_address() {
    let mut config = valid_config();
    config.client.server_address = "gateway.local".to_string();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Invalid server address")));
}

#[test]
fn test_empty_local_address() {
    let mut config = valid_config();
    config.client.local_address = String::new();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("cannot be empty")));
}

#[test]
fn test_address_family_mismatch() {
    let mut config = valid_config();
    config.client.local_address = "2001:db8::20".to_string();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Address family mismatch")));
}

#[test]
fn test_ipv6_pair_validates() {
    let mut config = valid_config();
    config.client.server_address = "2001:db8::1".to_string();
    config.client.local_address = "2001:db8::20".to_string();

    assert!(config.validate().is_empty());
    let server = config.client.server_socket_addr().expect("server addr");
    assert_eq!(server.port(), PCP_SERVER_PORT);
    let local = config.client.local_socket_addr().expect("local addr");
    assert_eq!(local.port(), 0);
}

#[test]
fn test_zero_server_port() {
    let mut config = valid_config();
    config.client.server_port = 0;

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Server port")));
}

#[test]
fn test_empty_app_name() {
    let mut config = valid_config();
    config.logging.app_name = String::new();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Application name cannot be empty")));
}

#[test]
fn test_validate_strict_lists_every_error() {
    let mut config = PcpConfig::default();
    config.client.server_address = "nope".to_string();

    let err = config.validate_strict().expect_err("should fail");
    let message = err.to_string();
    assert!(message.contains("Configuration validation failed"));
    assert!(message.contains("Invalid server address"));
    assert!(message.contains("Port to map"));
}

#[test]
fn test_from_toml_partial_tables() {
    let config = PcpConfig::from_toml(
        r#"
        [client]
        server_address = "10.0.0.1"
        local_address = "10.0.0.2"
        port = 3478
        protocol = "udp"
        prefer_failure = true

        [logging]
        log_level = "debug"
        "#,
    )
    .expect("valid TOML");

    assert_eq!(config.client.protocol, TransportProtocol::Udp);
    assert_eq!(config.client.protocol.number(), 17);
    assert_eq!(config.client.requested_lifetime, DEFAULT_REQUESTED_LIFETIME);
    assert!(config.client.prefer_failure);
    assert_eq!(config.logging.log_level, Level::DEBUG);
    assert_eq!(config.logging.app_name, "pcpclient");
    assert!(config.validate().is_empty());
}

#[test]
fn test_from_toml_rejects_bad_values() {
    assert!(PcpConfig::from_toml("[client]\nprotocol = \"sctp\"\n").is_err());
    assert!(PcpConfig::from_toml("[logging]\nlog_level = \"loud\"\n").is_err());
    assert!(PcpConfig::from_toml("[client]\nport = 70000\n").is_err());
}

#[test]
fn test_save_and_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pcp.toml");

    let mut config = valid_config();
    config.client.requested_lifetime = 7200;
    config.logging.json_format = true;
    config.save_to_file(&path).expect("save");

    let reloaded = PcpConfig::from_file(&path).expect("reload");
    assert_eq!(reloaded.client.server_address, "192.168.1.1");
    assert_eq!(reloaded.client.port, 8080);
    assert_eq!(reloaded.client.requested_lifetime, 7200);
    assert!(reloaded.logging.json_format);
}

#[test]
fn test_example_config_parses() {
    let example = PcpConfig::example_config();
    assert!(example.contains("[client]"));
    let parsed = PcpConfig::from_toml(&example).expect("example parses");
    assert_eq!(parsed.client.server_port, PCP_SERVER_PORT);
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = PcpConfig::from_file(dir.path().join("absent.toml")).expect_err("missing file");
    assert!(err.to_string().contains("Failed to open config file"));
}

#[test]
fn test_from_env_overrides() {
    std::env::set_var("PCP_SERVER_ADDRESS", "10.1.1.1");
    std::env::set_var("PCP_PORT", "2222");
    std::env::set_var("PCP_PROTOCOL", "UDP");
    std::env::set_var("PCP_PREFER_FAILURE", "true");
    let config = PcpConfig::from_env().expect("env config");
    assert_eq!(config.client.server_address, "10.1.1.1");
    assert_eq!(config.client.port, 2222);
    assert_eq!(config.client.protocol, TransportProtocol::Udp);
    assert!(config.client.prefer_failure);

    std::env::set_var("PCP_PORT", "not-a-port");
    assert!(PcpConfig::from_env().is_err());

    for var in [
        "PCP_SERVER_ADDRESS",
        "PCP_PORT",
        "PCP_PROTOCOL",
        "PCP_PREFER_FAILURE",
    ] {
        std::env::remove_var(var);
    }
}
