//! # PCP Client
//!
//! Client side of the Port Control Protocol (RFC 6887): ask a gateway to
//! create or renew an external address/port mapping and read back the
//! outcome.
//!
//! ## Layers
//! - [`core`]: bounds-checked wire codec for headers, opcode bodies and options
//! - [`protocol`]: MAP request construction and the ordered response checks
//! - [`transport`]: datagram transport trait and its UDP implementation
//! - [`service`]: one-shot [`MapClient`] tying the layers together
//! - [`config`], [`utils`]: configuration, logging and metrics
//!
//! ## Example
//! ```no_run
//! use pcp_client::config::ClientConfig;
//! use pcp_client::service::run_map;
//!
//! # async fn demo() -> pcp_client::error::Result<()> {
//! let config = ClientConfig {
//!     server_address: "192.168.1.1".into(),
//!     local_address: "192.168.1.20".into(),
//!     port: 8080,
//!     ..ClientConfig::default()
//! };
//! let mapping = run_map(&config).await?;
//! println!("{}:{}", mapping.external_address, mapping.external_port);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod transport;
pub mod utils;

pub use config::{ClientConfig, PcpConfig};
pub use error::{ProtocolError, Result};
pub use protocol::exchange::{MapParams, MappingResult};
pub use service::MapClient;
