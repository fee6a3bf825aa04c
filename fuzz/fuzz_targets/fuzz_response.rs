#![no_main]

use libfuzzer_sys::fuzz_target;
use pcp_client::core::body::Nonce;
use pcp_client::protocol::exchange::validate_map_response;

fuzz_target!(|data: &[u8]| {
    // First 12 bytes pick the expected nonce, the rest is the datagram
    if data.len() < 12 {
        return;
    }
    let mut nonce = [0u8; 12];
    nonce.copy_from_slice(&data[..12]);
    let _ = validate_map_response(&data[12..], &Nonce::from_bytes(nonce));
});
