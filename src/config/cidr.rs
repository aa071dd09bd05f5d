//! CIDR block value type used for peering address prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// An IP network in CIDR notation (e.g. `192.168.1.0/30`).
///
/// Invariants:
/// - Valid IPv4 or IPv6 address
/// - Prefix length present and within range for the address family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CidrBlock {
    address: IpAddr,
    prefix_length: u8,
}

impl CidrBlock {
    /// Parses a CIDR block from a string.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the string is not a valid
    /// `address/prefix` pair.
    pub fn parse(s: &str) -> Result<Self, String> {
        let (addr_str, prefix_str) = s
            .split_once('/')
            .ok_or_else(|| format!("'{s}' is not in CIDR notation (missing prefix length)"))?;

        let address = IpAddr::from_str(addr_str)
            .map_err(|_| format!("'{addr_str}' is not a valid IP address"))?;

        let prefix_length = prefix_str
            .parse::<u8>()
            .map_err(|_| format!("'{prefix_str}' is not a valid prefix length"))?;

        let max_prefix = match address {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };

        if prefix_length > max_prefix {
            return Err(format!(
                "prefix length {prefix_length} exceeds {max_prefix} in '{s}'"
            ));
        }

        Ok(Self {
            address,
            prefix_length,
        })
    }

    /// Returns the prefix length.
    #[must_use]
    pub const fn prefix_length(&self) -> u8 {
        self.prefix_length
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_length)
    }
}

impl FromStr for CidrBlock {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CidrBlock {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<CidrBlock> for String {
    fn from(block: CidrBlock) -> Self {
        block.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ipv4() {
        let block = CidrBlock::parse("192.168.1.0/30").unwrap();
        assert_eq!(block.prefix_length(), 30);
        assert_eq!(block.to_string(), "192.168.1.0/30");
    }

    #[test]
    fn test_parse_ipv6() {
        let block = CidrBlock::parse("2001:db8::/126").unwrap();
        assert_eq!(block.prefix_length(), 126);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(CidrBlock::parse("192.168.1.0").is_err());
        assert!(CidrBlock::parse("192.168.1.0/33").is_err());
        assert!(CidrBlock::parse("999.168.1.0/30").is_err());
        assert!(CidrBlock::parse("10.0.0.0/abc").is_err());
        assert!(CidrBlock::parse("").is_err());
    }
}
