//! CIDR network blocks
//!
//! Provides [`NetworkBlock`], a contiguous IPv4 range written in CIDR notation:
//! - Parse CIDR notation (e.g., "192.168.0.0/24"), lenient or strict
//! - Network, broadcast and mask calculations
//! - Containment and overlap checks between blocks
//!
//! # Examples
//!
//! ```
//! use netsplit_cidr::NetworkBlock;
//! use netsplit_core::Ipv4;
//!
//! let block = NetworkBlock::parse("192.168.1.0/24").unwrap();
//! assert_eq!(block.prefix_len(), 24);
//! assert_eq!(block.network(), Ipv4(0xC0A80100)); // 192.168.1.0
//! assert!(block.contains(Ipv4(0xC0A80101))); // 192.168.1.1
//! assert!(!block.contains(Ipv4(0xC0A80001))); // 192.168.0.1
//! ```

use netsplit_core::{Ipv4, NetsplitError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Longest IPv4 prefix
pub const MAX_PREFIX_LEN: u8 = 32;

/// CIDR errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CidrError {
    /// Invalid CIDR notation
    #[error("Invalid CIDR notation: {0}")]
    InvalidNotation(String),

    /// Invalid IP address
    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    /// Invalid prefix length
    #[error("Invalid prefix length: {0} (must be 0-32)")]
    InvalidPrefixLength(u8),

    /// Address has bits set beyond the prefix
    #[error("{0} has host bits set (network address is {1})")]
    HostBitsSet(String, Ipv4),
}

impl From<CidrError> for NetsplitError {
    fn from(err: CidrError) -> Self {
        NetsplitError::InvalidArgument(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CidrError>;

/// Network mask with the top `prefix_len` bits set
///
/// ```
/// assert_eq!(netsplit_cidr::prefix_mask(24), 0xFFFF_FF00);
/// assert_eq!(netsplit_cidr::prefix_mask(0), 0);
/// ```
pub fn prefix_mask(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else {
        u32::MAX << (MAX_PREFIX_LEN - prefix_len.min(MAX_PREFIX_LEN))
    }
}

/// IPv4 network block: a base address aligned to its prefix length
///
/// Serializes as its CIDR string; deserializing goes through
/// [`NetworkBlock::parse_strict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NetworkBlock {
    /// Network address (base IP)
    network: u32,
    /// Prefix length (0-32)
    prefix_len: u8,
    /// Network mask
    mask: u32,
}

impl NetworkBlock {
    /// Parse CIDR notation string
    ///
    /// Host bits in the address are cleared.
    ///
    /// # Arguments
    ///
    /// * `cidr` - CIDR string (e.g., "192.168.1.0/24")
    ///
    /// # Examples
    ///
    /// ```
    /// use netsplit_cidr::NetworkBlock;
    ///
    /// let block = NetworkBlock::parse("10.1.2.3/8").unwrap();
    /// assert_eq!(block.to_string(), "10.0.0.0/8");
    /// ```
    pub fn parse(cidr: &str) -> Result<Self> {
        let (ip, prefix_len) = Self::split_notation(cidr)?;
        let block = Self::new(ip, prefix_len)?;
        if block.network != ip {
            debug!(input = cidr, network = %block, "cleared host bits");
        }
        Ok(block)
    }

    /// Parse CIDR notation string, rejecting addresses with host bits set
    ///
    /// ```
    /// use netsplit_cidr::NetworkBlock;
    ///
    /// assert!(NetworkBlock::parse_strict("10.0.0.0/8").is_ok());
    /// assert!(NetworkBlock::parse_strict("10.1.2.3/8").is_err());
    /// ```
    pub fn parse_strict(cidr: &str) -> Result<Self> {
        let (ip, prefix_len) = Self::split_notation(cidr)?;
        Self::aligned(ip, prefix_len)
    }

    fn split_notation(cidr: &str) -> Result<(u32, u8)> {
        let parts: Vec<&str> = cidr.trim().split('/').collect();
        if parts.len() != 2 {
            return Err(CidrError::InvalidNotation(
                "Expected format: x.x.x.x/prefix".to_string(),
            ));
        }

        let ip_str = parts[0];
        let prefix_str = parts[1];

        if prefix_str.is_empty() || !prefix_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CidrError::InvalidNotation(format!(
                "Invalid prefix: {}",
                prefix_str
            )));
        }
        let prefix_len: u8 = prefix_str
            .parse()
            .map_err(|_| CidrError::InvalidNotation(format!("Invalid prefix: {}", prefix_str)))?;

        if prefix_len > MAX_PREFIX_LEN {
            return Err(CidrError::InvalidPrefixLength(prefix_len));
        }

        let ip = Ipv4::from_str(ip_str)
            .map_err(|_| CidrError::InvalidIpAddress(ip_str.to_string()))?;

        Ok((ip.to_bits(), prefix_len))
    }

    /// Create new block from network address and prefix length
    ///
    /// # Arguments
    ///
    /// * `network` - Network address as u32, host bits are cleared
    /// * `prefix_len` - Prefix length (0-32)
    pub fn new(network: u32, prefix_len: u8) -> Result<Self> {
        if prefix_len > MAX_PREFIX_LEN {
            return Err(CidrError::InvalidPrefixLength(prefix_len));
        }

        let mask = prefix_mask(prefix_len);

        Ok(Self {
            network: network & mask,
            prefix_len,
            mask,
        })
    }

    /// Create new block, rejecting a network address with host bits set
    ///
    /// ```
    /// use netsplit_cidr::NetworkBlock;
    ///
    /// assert!(NetworkBlock::aligned(0x0A000000, 8).is_ok());
    /// assert!(NetworkBlock::aligned(0x0A000001, 8).is_err());
    /// ```
    pub fn aligned(network: u32, prefix_len: u8) -> Result<Self> {
        let block = Self::new(network, prefix_len)?;
        if block.network != network {
            return Err(CidrError::HostBitsSet(
                format!("{}/{}", Ipv4(network), prefix_len),
                block.network(),
            ));
        }
        Ok(block)
    }

    /// Get network address
    pub fn network(&self) -> Ipv4 {
        Ipv4(self.network)
    }

    /// Get prefix length
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Get network mask (dotted-decimal mask)
    pub fn mask(&self) -> Ipv4 {
        Ipv4(self.mask)
    }

    /// Get host mask (inverse of the network mask)
    pub fn host_mask(&self) -> Ipv4 {
        Ipv4(!self.mask)
    }

    /// Get broadcast address
    pub fn broadcast(&self) -> Ipv4 {
        Ipv4(self.network | !self.mask)
    }

    /// Get total number of addresses in this block
    pub fn size(&self) -> u64 {
        1u64 << (MAX_PREFIX_LEN - self.prefix_len)
    }

    /// Check if IP address is in this block
    pub fn contains(&self, ip: Ipv4) -> bool {
        (ip.to_bits() & self.mask) == self.network
    }

    /// Check if `other` lies entirely inside this block
    pub fn contains_block(&self, other: &NetworkBlock) -> bool {
        other.prefix_len >= self.prefix_len && self.contains(other.network())
    }

    /// Check if the two blocks share any address
    ///
    /// Aligned blocks either nest or are disjoint.
    pub fn overlaps(&self, other: &NetworkBlock) -> bool {
        self.contains_block(other) || other.contains_block(self)
    }
}

impl fmt::Display for NetworkBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix_len)
    }
}

impl TryFrom<String> for NetworkBlock {
    type Error = CidrError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse_strict(&value)
    }
}

impl From<NetworkBlock> for String {
    fn from(block: NetworkBlock) -> Self {
        block.to_string()
    }
}

impl FromStr for NetworkBlock {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
