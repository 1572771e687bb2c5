//! IPv4 address and prefix conversions.
//!
//! The bit-string helpers ([`ip_to_binary`], [`network_prefix_of`]) describe
//! prefixes the way a forwarding table is usually explained: a destination
//! matches a prefix when the prefix bits are a leading substring of the
//! address bits. [`Ipv4Prefix`] implements the same test with a shift and
//! mask on `u32` values, which is what lookups use.

use crate::error::{Result, RouterError};
use ipnet::Ipv4Net;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Number of bits in an IPv4 address.
pub const IPV4_BITS: u8 = 32;

/// Parse a dotted-quad IPv4 address.
pub fn parse_addr(address: &str) -> Result<Ipv4Addr> {
    address
        .parse::<Ipv4Addr>()
        .map_err(|_| RouterError::InvalidAddress(address.to_string()))
}

/// Convert a dotted-quad address into its 32-character binary form.
///
/// `"223.1.1.100"` becomes `"11011111000000010000000101100100"`.
pub fn ip_to_binary(address: &str) -> Result<String> {
    let addr = parse_addr(address)?;
    Ok(format!("{:032b}", u32::from(addr)))
}

/// Leading `n` bits of the address in an `a.b.c.d/n` string.
///
/// `"223.1.0.0/16"` becomes `"1101111100000001"`, and `/0` yields an empty
/// string.
pub fn network_prefix_of(cidr: &str) -> Result<String> {
    Ok(cidr.parse::<Ipv4Prefix>()?.to_binary())
}

/// An IPv4 network prefix stored as a masked `u32` and a bit length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Prefix {
    network: u32,
    len: u8,
}

impl Ipv4Prefix {
    /// Build a prefix from an address and length, clearing host bits.
    pub fn new(addr: Ipv4Addr, len: u8) -> Result<Self> {
        let net = Ipv4Net::new(addr, len)
            .map_err(|_| RouterError::InvalidPrefix(format!("{addr}/{len}")))?;
        Ok(Self::from(net))
    }

    /// Network bits, host part zeroed.
    pub fn network(&self) -> u32 {
        self.network
    }

    /// Prefix length in bits.
    pub fn len(&self) -> u8 {
        self.len
    }

    /// True for `/0`, which matches every address.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Netmask for this prefix length.
    pub fn mask(&self) -> u32 {
        mask_for(self.len)
    }

    /// Whether `addr` falls inside this prefix.
    #[inline]
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & self.mask() == self.network
    }

    /// Leading `len` bits of the network address as a `0`/`1` string.
    pub fn to_binary(&self) -> String {
        let bits = format!("{:032b}", self.network);
        bits[..usize::from(self.len)].to_string()
    }
}

#[inline]
fn mask_for(len: u8) -> u32 {
    match len {
        0 => 0,
        n => u32::MAX << (IPV4_BITS - n),
    }
}

impl From<Ipv4Net> for Ipv4Prefix {
    fn from(net: Ipv4Net) -> Self {
        let len = net.prefix_len();
        Ipv4Prefix {
            network: u32::from(net.addr()) & mask_for(len),
            len,
        }
    }
}

impl FromStr for Ipv4Prefix {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self> {
        let net: Ipv4Net = s
            .parse()
            .map_err(|_| RouterError::InvalidPrefix(s.to_string()))?;
        Ok(Self::from(net))
    }
}

impl fmt::Display for Ipv4Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", Ipv4Addr::from(self.network), self.len)
    }
}
