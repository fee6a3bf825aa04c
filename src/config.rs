//! # Configuration Management
//!
//! Protocol constants and the client configuration.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-specific overrides via `from_env()`
//!
//! ## Lifetime vs. Timeout
//! `requested_lifetime` is the mapping lifetime asked of the gateway. It is
//! not a local receive timeout; the client waits for the response for as
//! long as the transport blocks.

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use tracing::Level;

/// Supported PCP version
pub const PCP_VERSION: u8 = 2;

/// Well-known PCP server port
pub const PCP_SERVER_PORT: u16 = 5351;

/// Max allowed PCP message size
pub const MAX_PAYLOAD_SIZE: usize = 1100;

/// Size of the buffer responses are received into
pub const RECV_BUFFER_SIZE: usize = 1280;

/// Default mapping lifetime in seconds
pub const DEFAULT_REQUESTED_LIFETIME: u32 = 120;

/// IANA protocol numbers
pub const PROTO_TCP: u8 = 6;
pub const PROTO_UDP: u8 = 17;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PcpConfig {
    /// Client-specific configuration
    #[serde(default)]
    pub client: ClientConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PcpConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("PCP_SERVER_ADDRESS") {
            config.client.server_address = addr;
        }

        if let Ok(addr) = std::env::var("PCP_LOCAL_ADDRESS") {
            config.client.local_address = addr;
        }

        if let Ok(port) = std::env::var("PCP_PORT") {
            config.client.port = port
                .parse::<u16>()
                .map_err(|e| ProtocolError::ConfigError(format!("Invalid PCP_PORT: {e}")))?;
        }

        if let Ok(lifetime) = std::env::var("PCP_LIFETIME") {
            config.client.requested_lifetime = lifetime
                .parse::<u32>()
                .map_err(|e| ProtocolError::ConfigError(format!("Invalid PCP_LIFETIME: {e}")))?;
        }

        if let Ok(protocol) = std::env::var("PCP_PROTOCOL") {
            config.client.protocol = match protocol.to_ascii_lowercase().as_str() {
                "tcp" => TransportProtocol::Tcp,
                "udp" => TransportProtocol::Udp,
                other => {
                    return Err(ProtocolError::ConfigError(format!(
                        "Invalid PCP_PROTOCOL: '{other}' (expected 'tcp' or 'udp')"
                    )))
                }
            };
        }

        if let Ok(flag) = std::env::var("PCP_PREFER_FAILURE") {
            config.client.prefer_failure = matches!(flag.as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.client.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Transport protocol of the mapping being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportProtocol {
    #[default]
    Tcp,
    Udp,
}

impl TransportProtocol {
    /// IANA protocol number carried in the MAP body
    pub fn number(self) -> u8 {
        match self {
            TransportProtocol::Tcp => PROTO_TCP,
            TransportProtocol::Udp => PROTO_UDP,
        }
    }
}

/// Client-specific configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Gateway address (numeric IPv4 or IPv6); empty until set
    pub server_address: String,

    /// Gateway port
    pub server_port: u16,

    /// Local address to bind and to report as the client address; empty until set
    pub local_address: String,

    /// Internal port to map; also suggested as the external port
    pub port: u16,

    /// Protocol of the mapping
    pub protocol: TransportProtocol,

    /// Mapping lifetime requested from the gateway, in seconds
    pub requested_lifetime: u32,

    /// Ask the gateway to fail rather than assign a different mapping
    pub prefer_failure: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_address: String::new(),
            server_port: PCP_SERVER_PORT,
            local_address: String::new(),
            port: 0,
            protocol: TransportProtocol::Tcp,
            requested_lifetime: DEFAULT_REQUESTED_LIFETIME,
            prefer_failure: false,
        }
    }
}

impl ClientConfig {
    /// Gateway socket address
    pub fn server_socket_addr(&self) -> Result<SocketAddr> {
        let ip = parse_ip("server", &self.server_address)?;
        Ok(SocketAddr::new(ip, self.server_port))
    }

    /// Local socket address; the port is left to the OS
    pub fn local_socket_addr(&self) -> Result<SocketAddr> {
        let ip = parse_ip("local", &self.local_address)?;
        Ok(SocketAddr::new(ip, 0))
    }

    /// Validate client configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let server = validate_ip("Server", &self.server_address, &mut errors);
        let local = validate_ip("Local", &self.local_address, &mut errors);

        if let (Some(server), Some(local)) = (server, local) {
            if server.is_ipv4() != local.is_ipv4() {
                errors.push(format!(
                    "Address family mismatch: server '{}' and local '{}'",
                    self.server_address, self.local_address
                ));
            }
        }

        if self.server_port == 0 {
            errors.push("Server port must be greater than 0".to_string());
        }

        if self.port == 0 {
            errors.push("Port to map must be greater than 0".to_string());
        }

        errors
    }
}

fn parse_ip(which: &str, value: &str) -> Result<IpAddr> {
    value
        .parse::<IpAddr>()
        .map_err(|_| ProtocolError::ConfigError(format!("Invalid {which} address: {value}")))
}

fn validate_ip(which: &str, value: &str, errors: &mut Vec<String>) -> Option<IpAddr> {
    if value.is_empty() {
        errors.push(format!("{which} address cannot be empty"));
        return None;
    }
    match value.parse::<IpAddr>() {
        Ok(ip) => Some(ip),
        Err(_) => {
            errors.push(format!(
                "Invalid {} address format: '{value}' (expected a numeric IPv4 or IPv6 address)",
                which.to_ascii_lowercase()
            ));
            None
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("pcpclient"),
            log_level: Level::WARN,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
