use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::{ClientConfig, RECV_BUFFER_SIZE};
use crate::error::{ProtocolError, Result};
use crate::protocol::entropy::{EntropySource, OsEntropy};
use crate::protocol::exchange::{validate_map_response, Exchange, MapParams, MappingResult};
use crate::transport::{DatagramTransport, UdpTransport};
use crate::utils::metrics::{Metrics, Timer};

/// One-shot MAP client over a datagram transport
///
/// Each call to [`MapClient::request_mapping`] runs exactly one
/// request/response cycle with a fresh nonce. There is no retransmission
/// and no receive timeout: the call completes when the transport delivers
/// a datagram or fails.
pub struct MapClient<T, E> {
    transport: T,
    exchange: Exchange<E>,
    metrics: Arc<Metrics>,
}

impl<T: DatagramTransport> MapClient<T, OsEntropy> {
    /// Client drawing nonces from the OS CSPRNG
    pub fn new(transport: T) -> Self {
        Self::with_entropy(transport, OsEntropy)
    }
}

impl<T: DatagramTransport, E: EntropySource> MapClient<T, E> {
    pub fn with_entropy(transport: T, entropy: E) -> Self {
        Self {
            transport,
            exchange: Exchange::new(entropy),
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Record into a shared collector instead of a private one
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Request a mapping and wait for the gateway's answer
    #[instrument(skip(self), fields(port = params.port, protocol = params.protocol))]
    pub async fn request_mapping(&mut self, params: &MapParams) -> Result<MappingResult> {
        let _timer = Timer::start("pcp_map_exchange");
        let outcome = self.exchange_once(params).await;

        match &outcome {
            Ok(mapping) => {
                self.metrics.mapping_granted();
                info!(
                    external = %mapping.external_address,
                    external_port = mapping.external_port,
                    lifetime = mapping.lifetime,
                    "Mapping granted"
                );
            }
            Err(e) => {
                self.metrics.exchange_failed(e);
                warn!(error = %e, "MAP exchange failed");
            }
        }
        outcome
    }

    async fn exchange_once(&mut self, params: &MapParams) -> Result<MappingResult> {
        let request = self.exchange.build_map_request(params)?;

        let sent = self.transport.send(&request.bytes).await?;
        if sent != request.bytes.len() {
            return Err(ProtocolError::TransportError(format!(
                "Short send: {sent} of {} bytes",
                request.bytes.len()
            )));
        }
        self.metrics.request_sent(sent as u64);

        let mut buf = [0u8; RECV_BUFFER_SIZE];
        let received = self.transport.recv(&mut buf).await?;
        self.metrics.response_received(received as u64);
        debug!(received, "Received response datagram");

        validate_map_response(&buf[..received], &request.nonce)
    }
}

/// Validate `config`, open a UDP transport and run one MAP exchange
#[instrument(skip(config), fields(server = %config.server_address, port = config.port))]
pub async fn run_map(config: &ClientConfig) -> Result<MappingResult> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ProtocolError::ConfigError(errors.join("; ")));
    }

    let params = MapParams::from_config(config)?;
    let transport =
        UdpTransport::connect(config.local_socket_addr()?, config.server_socket_addr()?).await?;
    let mut client = MapClient::new(transport);
    let result = client.request_mapping(&params).await;
    client.metrics().log_metrics();
    result
}
