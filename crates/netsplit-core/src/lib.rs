//! Core types and traits for netsplit
//!
//! This crate provides the foundational types used throughout the netsplit workspace:
//! - [`Ipv4`] - IPv4 address as a 32-bit value
//! - [`StepPolicy`] / [`HostPolicy`] - partitioning policies
//! - [`Settings`] - environment configuration
//! - [`NetsplitError`] - Error types
//!
//! ```
//! use netsplit_core::Ipv4;
//!
//! let ip: Ipv4 = "192.168.1.0".parse().unwrap();
//! assert_eq!(ip, Ipv4(0xC0A80100));
//! assert_eq!(ip.to_string(), "192.168.1.0");
//! ```

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

pub mod config;
pub mod policy;

pub use config::{ConfigError, Settings};
pub use policy::{HostPolicy, StepPolicy};

/// IPv4 address
///
/// A 32-bit unsigned value, displayed in dotted-quad form.
///
/// # Examples
///
/// ```
/// use netsplit_core::Ipv4;
///
/// let dns = Ipv4(0x08080808);
/// assert_eq!(dns.to_string(), "8.8.8.8");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ipv4(pub u32);

impl Ipv4 {
    /// Raw 32-bit value
    pub fn to_bits(self) -> u32 {
        self.0
    }

    /// The four octets, most significant first
    pub fn octets(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.octets();
        write!(f, "{}.{}.{}.{}", a, b, c, d)
    }
}

impl FromStr for Ipv4 {
    type Err = NetsplitError;

    fn from_str(s: &str) -> Result<Self> {
        let octets: Vec<&str> = s.split('.').collect();
        if octets.len() != 4 {
            return Err(NetsplitError::InvalidArgument(format!(
                "Expected 4 octets in '{}'",
                s
            )));
        }

        let mut result = 0u32;
        for (i, octet_str) in octets.iter().enumerate() {
            // u8::from_str accepts a leading '+', dotted quads do not
            if octet_str.is_empty() || !octet_str.bytes().all(|b| b.is_ascii_digit()) {
                return Err(NetsplitError::InvalidArgument(format!(
                    "Invalid octet: '{}'",
                    octet_str
                )));
            }
            let octet: u8 = octet_str.parse().map_err(|_| {
                NetsplitError::InvalidArgument(format!("Invalid octet: '{}'", octet_str))
            })?;
            result |= (octet as u32) << (24 - i * 8);
        }

        Ok(Ipv4(result))
    }
}

impl From<u32> for Ipv4 {
    fn from(value: u32) -> Self {
        Ipv4(value)
    }
}

impl From<Ipv4> for u32 {
    fn from(value: Ipv4) -> Self {
        value.0
    }
}

impl From<Ipv4Addr> for Ipv4 {
    fn from(value: Ipv4Addr) -> Self {
        Ipv4(u32::from(value))
    }
}

impl From<Ipv4> for Ipv4Addr {
    fn from(value: Ipv4) -> Self {
        Ipv4Addr::from(value.0)
    }
}

impl Serialize for Ipv4 {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Ipv4 {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Ipv4, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|_| de::Error::custom(format!("invalid IPv4 address: {}", s)))
    }
}

/// Error types for netsplit operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetsplitError {
    /// Malformed or out-of-range input (address, prefix length, subnet count)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Bad configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for netsplit operations
pub type Result<T> = std::result::Result<T, NetsplitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_display() {
        assert_eq!(Ipv4(0xC0A80100).to_string(), "192.168.1.0");
        assert_eq!(Ipv4(0).to_string(), "0.0.0.0");
        assert_eq!(Ipv4(u32::MAX).to_string(), "255.255.255.255");
    }

    #[test]
    fn test_ipv4_parse() {
        let ip: Ipv4 = "10.0.0.4".parse().unwrap();
        assert_eq!(ip, Ipv4(0x0A000004));
    }

    #[test]
    fn test_ipv4_parse_invalid() {
        assert!("256.0.0.0".parse::<Ipv4>().is_err());
        assert!("10.0.0".parse::<Ipv4>().is_err());
        assert!("10.0.0.0.0".parse::<Ipv4>().is_err());
        assert!("10..0.0".parse::<Ipv4>().is_err());
        assert!("10.+1.0.0".parse::<Ipv4>().is_err());
        assert!("a.b.c.d".parse::<Ipv4>().is_err());
    }

    #[test]
    fn test_ipv4_std_conversion() {
        let std_ip = Ipv4Addr::new(172, 16, 0, 1);
        let ip = Ipv4::from(std_ip);
        assert_eq!(ip.octets(), [172, 16, 0, 1]);
        assert_eq!(Ipv4Addr::from(ip), std_ip);
        assert_eq!(u32::from(ip), 0xAC100001);
    }

    #[test]
    fn test_ipv4_ordering() {
        assert!(Ipv4(0x0A000000) < Ipv4(0x0A000001));
    }

    #[test]
    fn test_ipv4_serialization() {
        let json = serde_json::to_string(&Ipv4(0xC0A80110)).expect("serialization failed");
        assert_eq!(json, r#""192.168.1.16""#);
    }

    #[test]
    fn test_ipv4_deserialization() {
        let ip: Ipv4 = serde_json::from_str(r#""10.0.0.4""#).expect("deserialization failed");
        assert_eq!(ip, Ipv4(0x0A000004));

        assert!(serde_json::from_str::<Ipv4>(r#""10.0.0.400""#).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = NetsplitError::InvalidArgument("subnet count 0".to_string());
        assert_eq!(format!("{}", err), "Invalid argument: subnet count 0");
    }

    #[test]
    fn test_result_type() {
        fn returns_result() -> Result<Ipv4> {
            Ok(Ipv4(1))
        }

        assert_eq!(returns_result().unwrap(), Ipv4(1));
    }
}
