//! End-to-end MAP exchanges against a loopback gateway and scripted transports

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};

use tokio::net::UdpSocket;

use pcp_client::config::{ClientConfig, PCP_VERSION, PROTO_UDP};
use pcp_client::core::body::{MapInfo, Nonce};
use pcp_client::core::cursor::{ByteReader, ByteWriter};
use pcp_client::core::header::{OpCode, RequestHeader, ResponseHeader, ResultCode};
use pcp_client::core::option::{decode_options, DecodedOption, PcpOption};
use pcp_client::core::WireFormat;
use pcp_client::error::{ProtocolError, Result};
use pcp_client::protocol::exchange::MapParams;
use pcp_client::service::{run_map, MapClient};
use pcp_client::transport::{DatagramTransport, UdpTransport};
use pcp_client::utils::Metrics;

const EXTERNAL: Ipv4Addr = Ipv4Addr::new(203, 0, 113, 50);

/// Answer a MAP request the way a gateway would, echoing the nonce
fn gateway_reply(request: &[u8], result: ResultCode, nonce_override: Option<Nonce>) -> Vec<u8> {
    let mut r = ByteReader::new(request);
    let header = RequestHeader::decode(&mut r).unwrap();
    let map = MapInfo::decode(&mut r).unwrap();

    let mut buf = vec![0u8; 60];
    let mut w = ByteWriter::new(&mut buf);
    ResponseHeader::new(PCP_VERSION, OpCode::Map, result, header.requested_lifetime, 77)
        .encode(&mut w)
        .unwrap();
    MapInfo {
        nonce: nonce_override.unwrap_or(map.nonce),
        external_port: map.internal_port + 1000,
        external_addr: EXTERNAL.to_ipv6_mapped(),
        ..map
    }
    .encode(&mut w)
    .unwrap();
    buf
}

/// Spawn a one-shot gateway; returns its address and the request it saw
async fn spawn_gateway(
    result: ResultCode,
    nonce_override: Option<Nonce>,
) -> (SocketAddr, tokio::task::JoinHandle<Vec<u8>>) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut buf = [0u8; 1280];
        let (n, peer) = socket.recv_from(&mut buf).await.unwrap();
        let reply = gateway_reply(&buf[..n], result, nonce_override);
        socket.send_to(&reply, peer).await.unwrap();
        buf[..n].to_vec()
    });
    (addr, handle)
}

fn loopback_params(port: u16) -> MapParams {
    MapParams {
        client_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
        protocol: PROTO_UDP,
        port,
        requested_lifetime: 900,
        prefer_failure: false,
    }
}

#[tokio::test]
async fn test_udp_mapping_granted() {
    let (gateway, handle) = spawn_gateway(ResultCode::Success, None).await;
    let local: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let transport = UdpTransport::connect(local, gateway).await.unwrap();
    assert!(transport.local_addr().unwrap().port() != 0);

    let mut client = MapClient::new(transport);
    let mapping = client.request_mapping(&loopback_params(4000)).await.unwrap();

    assert_eq!(mapping.lifetime, 900);
    assert_eq!(mapping.epoch_time, 77);
    assert_eq!(mapping.protocol, PROTO_UDP);
    assert_eq!(mapping.internal_port, 4000);
    assert_eq!(mapping.external_port, 5000);
    assert_eq!(mapping.external_address, IpAddr::V4(EXTERNAL));

    let request = handle.await.unwrap();
    assert_eq!(request.len(), 60);
    assert_eq!(&request[24..36], mapping.nonce.as_bytes());

    let snap = client.metrics().snapshot();
    assert_eq!(snap.requests_sent, 1);
    assert_eq!(snap.responses_received, 1);
    assert_eq!(snap.mappings_granted, 1);
    assert_eq!(snap.bytes_sent, 60);
}

#[tokio::test]
async fn test_udp_server_error_is_reported() {
    let (gateway, handle) = spawn_gateway(ResultCode::NoResources, None).await;
    let transport = UdpTransport::connect("127.0.0.1:0".parse().unwrap(), gateway)
        .await
        .unwrap();

    let metrics = Arc::new(Metrics::new());
    let mut client = MapClient::new(transport).with_metrics(Arc::clone(&metrics));
    let err = client.request_mapping(&loopback_params(22)).await.unwrap_err();

    assert!(matches!(err, ProtocolError::ServerResult(ResultCode::NoResources)));
    assert_eq!(metrics.snapshot().server_errors, 1);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_udp_stale_nonce_rejected() {
    let stale = Nonce::from_bytes([0xAB; 12]);
    let (gateway, handle) = spawn_gateway(ResultCode::Success, Some(stale)).await;
    let transport = UdpTransport::connect("127.0.0.1:0".parse().unwrap(), gateway)
        .await
        .unwrap();

    let mut client = MapClient::new(transport);
    let err = client.request_mapping(&loopback_params(8080)).await.unwrap_err();
    assert!(matches!(err, ProtocolError::NonceMismatch));
    assert_eq!(client.metrics().snapshot().responses_rejected, 1);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_run_map_with_prefer_failure() {
    let (gateway, handle) = spawn_gateway(ResultCode::Success, None).await;
    let config = ClientConfig {
        server_address: gateway.ip().to_string(),
        server_port: gateway.port(),
        local_address: "127.0.0.1".to_string(),
        port: 6000,
        prefer_failure: true,
        ..ClientConfig::default()
    };

    let mapping = run_map(&config).await.unwrap();
    assert_eq!(mapping.internal_port, 6000);
    assert_eq!(mapping.lifetime, config.requested_lifetime);

    let request = handle.await.unwrap();
    assert_eq!(request.len(), 64);
    let mut r = ByteReader::new(&request[60..]);
    assert_eq!(
        decode_options(&mut r).unwrap(),
        vec![DecodedOption::Known(PcpOption::PreferFailure)]
    );
}

#[tokio::test]
async fn test_run_map_rejects_invalid_config() {
    let config = ClientConfig::default();
    let err = run_map(&config).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConfigError(ref msg) if msg.contains("Port to map")));
}

#[tokio::test]
async fn test_connect_rejects_family_mismatch() {
    let err = UdpTransport::connect(
        "127.0.0.1:0".parse().unwrap(),
        "[::1]:5351".parse().unwrap(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ProtocolError::AddressFamilyMismatch));
}

// ============================================================================
// SCRIPTED TRANSPORTS
// ============================================================================

/// Transport that records the request and answers with a canned reply
struct Scripted {
    sent: Mutex<Vec<u8>>,
    reply: fn(&[u8]) -> Vec<u8>,
    short_send: bool,
}

impl Scripted {
    fn new(reply: fn(&[u8]) -> Vec<u8>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reply,
            short_send: false,
        }
    }
}

impl DatagramTransport for Scripted {
    async fn send(&self, buf: &[u8]) -> Result<usize> {
        *self.sent.lock().unwrap() = buf.to_vec();
        Ok(if self.short_send { buf.len() - 1 } else { buf.len() })
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<usize> {
        let request = self.sent.lock().unwrap().clone();
        let reply = (self.reply)(&request);
        buf[..reply.len()].copy_from_slice(&reply);
        Ok(reply.len())
    }
}

#[tokio::test]
async fn test_short_send_is_a_transport_error() {
    let mut transport = Scripted::new(|req| gateway_reply(req, ResultCode::Success, None));
    transport.short_send = true;

    let mut client = MapClient::new(transport);
    let err = client.request_mapping(&loopback_params(80)).await.unwrap_err();
    assert!(matches!(err, ProtocolError::TransportError(_)));
    assert_eq!(client.metrics().snapshot().transport_errors, 1);
}

#[tokio::test]
async fn test_validation_uses_received_length_only() {
    // A 24-byte success header with no body must not be completed by
    // leftover bytes in the receive buffer.
    let transport = Scripted::new(|req| gateway_reply(req, ResultCode::Success, None)[..24].to_vec());

    let mut client = MapClient::new(transport);
    let err = client.request_mapping(&loopback_params(80)).await.unwrap_err();
    assert!(matches!(err, ProtocolError::MalformedBody { needed: 36, remaining: 0 }));
}

#[tokio::test]
async fn test_each_request_draws_a_fresh_nonce() {
    let transport = Scripted::new(|req| gateway_reply(req, ResultCode::Success, None));
    let mut client = MapClient::new(transport);

    let first = client.request_mapping(&loopback_params(80)).await.unwrap();
    let second = client.request_mapping(&loopback_params(80)).await.unwrap();
    assert_ne!(first.nonce, second.nonce);
    assert_eq!(
        &client.transport().sent.lock().unwrap()[24..36],
        second.nonce.as_bytes()
    );
}
