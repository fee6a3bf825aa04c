//! # Fixed-Size Addresses
//!
//! PCP carries every address as a 128-bit value. IPv4 addresses travel in
//! their IPv4-mapped form (`::ffff:a.b.c.d`), so a single [`Ipv6Addr`]
//! serves both families throughout the headers, bodies and options.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// The 96-bit prefix of an IPv4-mapped IPv6 address
pub const V4_MAPPED_PREFIX: [u8; 12] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff];

/// `::ffff:0.0.0.0`, the "any" address in mapped form
pub const V4_MAPPED_ANY: Ipv6Addr = Ipv6Addr::new(0, 0, 0, 0, 0, 0xffff, 0, 0);

/// True when the top 96 bits are the IPv4-mapped prefix
pub fn is_v4_mapped(addr: &Ipv6Addr) -> bool {
    addr.octets()[..12] == V4_MAPPED_PREFIX
}

/// True for the IPv6 global unicast range `2000::/3`
pub fn is_global_unicast(addr: &Ipv6Addr) -> bool {
    addr.octets()[0] & 0xe0 == 0x20
}

pub fn map_4_to_6(addr: Ipv4Addr) -> Ipv6Addr {
    addr.to_ipv6_mapped()
}

/// Recover the IPv4 address from a mapped one, `None` for any other address
pub fn map_6_to_4(addr: &Ipv6Addr) -> Option<Ipv4Addr> {
    if !is_v4_mapped(addr) {
        return None;
    }
    let o = addr.octets();
    Some(Ipv4Addr::new(o[12], o[13], o[14], o[15]))
}

/// Normalize a transport-level address to its 128-bit wire form
pub fn fixed_size_addr(addr: IpAddr) -> Ipv6Addr {
    match addr {
        IpAddr::V4(v4) => map_4_to_6(v4),
        IpAddr::V6(v6) => v6,
    }
}

/// External address hint for a MAP request sent from `local`.
///
/// IPv4 clients suggest the mapped "any" address. IPv6 clients suggest
/// their own address when it is globally routable, otherwise `::`.
pub fn suggested_external_addr(local: IpAddr) -> Ipv6Addr {
    match local {
        IpAddr::V4(_) => V4_MAPPED_ANY,
        IpAddr::V6(v6) if is_global_unicast(&v6) => v6,
        IpAddr::V6(_) => Ipv6Addr::UNSPECIFIED,
    }
}

/// Present a wire address in its natural family
pub fn to_ip_addr(addr: Ipv6Addr) -> IpAddr {
    match map_6_to_4(&addr) {
        Some(v4) => IpAddr::V4(v4),
        None => IpAddr::V6(addr),
    }
}
