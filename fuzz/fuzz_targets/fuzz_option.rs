#![no_main]

use libfuzzer_sys::fuzz_target;
use pcp_client::core::cursor::ByteReader;
use pcp_client::core::option::{DecodedOption, OPTION_HEADER_SIZE};

fuzz_target!(|data: &[u8]| {
    // Each decoded option advances at least one header; a failure never moves the cursor
    let mut r = ByteReader::new(data);
    while !r.is_empty() {
        let before = r.position();
        match DecodedOption::decode(&mut r) {
            Ok(_) => assert!(r.position() >= before + OPTION_HEADER_SIZE),
            Err(_) => {
                assert_eq!(r.position(), before);
                break;
            }
        }
    }
});
