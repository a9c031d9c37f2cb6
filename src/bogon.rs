//! Bogon Detection Module
//!
//! Classifies addresses that fall inside reserved, non-globally-routable ranges.
//! Such addresses are answered locally and never sent upstream.

use std::net::IpAddr;
use std::sync::LazyLock;

use ipnet::IpNet;

use crate::error::{IpinfoError, Result};

// == Reserved Ranges ==
const RESERVED_V4: &[&str] = &[
    "0.0.0.0/8",
    "10.0.0.0/8",
    "100.64.0.0/10",
    "127.0.0.0/8",
    "169.254.0.0/16",
    "172.16.0.0/12",
    "192.0.0.0/24",
    "192.0.2.0/24",
    "192.168.0.0/16",
    "198.18.0.0/15",
    "198.51.100.0/24",
    "203.0.113.0/24",
    "224.0.0.0/4",
    "240.0.0.0/4",
    "255.255.255.255/32",
];

// Native IPv6 blocks followed by the 6to4 (2002::/16) and Teredo (2001::/32)
// images of the IPv4 blocks above.
const RESERVED_V6: &[&str] = &[
    "::/128",
    "::1/128",
    "::ffff:0:0/96",
    "::/96",
    "100::/64",
    "2001:10::/28",
    "2001:db8::/32",
    "fc00::/7",
    "fe80::/10",
    "fec0::/10",
    "ff00::/8",
    "2002::/24",
    "2002:a00::/24",
    "2002:7f00::/24",
    "2002:a9fe::/32",
    "2002:ac10::/28",
    "2002:c000::/40",
    "2002:c000:200::/40",
    "2002:c0a8::/32",
    "2002:c612::/31",
    "2002:c633:6400::/40",
    "2002:cb00:7100::/40",
    "2002:e000::/20",
    "2002:f000::/20",
    "2002:ffff:ffff::/48",
    "2001::/40",
    "2001:0:a00::/40",
    "2001:0:7f00::/40",
    "2001:0:a9fe::/48",
    "2001:0:ac10::/44",
    "2001:0:c000::/56",
    "2001:0:c000:200::/56",
    "2001:0:c0a8::/48",
    "2001:0:c612::/47",
    "2001:0:c633:6400::/56",
    "2001:0:cb00:7100::/56",
    "2001:0:e000::/36",
    "2001:0:f000::/36",
    "2001:0:ffff:ffff::/64",
];

static RESERVED_RANGES: LazyLock<Vec<IpNet>> = LazyLock::new(|| {
    RESERVED_V4
        .iter()
        .chain(RESERVED_V6)
        .map(|cidr| cidr.parse::<IpNet>().expect("valid CIDR literal"))
        .map(|net| net.trunc())
        .collect()
});

/// Returns the compiled reserved range table.
pub fn reserved_ranges() -> &'static [IpNet] {
    &RESERVED_RANGES
}

/// Returns true if `ip` lies inside any reserved range.
///
/// Ranges of the other address family never match.
pub fn is_reserved(ip: IpAddr) -> bool {
    RESERVED_RANGES.iter().any(|net| net.contains(&ip))
}

/// Parses an address literal, rejecting anything that is not plain IPv4 or IPv6.
pub fn parse_address(address: &str) -> Result<IpAddr> {
    address
        .trim()
        .parse::<IpAddr>()
        .map_err(|_| IpinfoError::InvalidAddress(address.to_string()))
}

/// Classifies a textual address.
///
/// # Returns
/// - `Ok(false)` for an absent or empty address (a self-lookup is never a bogon)
/// - `Ok(true)` if the address is inside a reserved range
/// - `Err(InvalidAddress)` if the literal does not parse
pub fn is_bogon(address: Option<&str>) -> Result<bool> {
    match address {
        None => Ok(false),
        Some(raw) if raw.trim().is_empty() => Ok(false),
        Some(raw) => parse_address(raw).map(is_reserved),
    }
}
