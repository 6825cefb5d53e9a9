//! Partitioning policies
//!
//! [`StepPolicy`] decides how many bits a split borrows at a time,
//! [`HostPolicy`] decides how /31 and /32 subnets count usable hosts.

use crate::NetsplitError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parent prefix lengths up to this value split in 4-bit steps.
pub const WIDE_STEP_MAX_PREFIX: u8 = 26;

/// Granularity of the prefix extension chosen for a split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepPolicy {
    /// 4-bit steps for parents up to /26, 2-bit steps above
    #[default]
    Quantized,
    /// Smallest extension that yields enough subnets
    Minimal,
}

impl StepPolicy {
    /// Number of bits added per step for a parent of `parent_prefix`
    ///
    /// ```
    /// use netsplit_core::StepPolicy;
    ///
    /// assert_eq!(StepPolicy::Quantized.step_bits(24), 4);
    /// assert_eq!(StepPolicy::Quantized.step_bits(28), 2);
    /// assert_eq!(StepPolicy::Minimal.step_bits(24), 1);
    /// ```
    pub fn step_bits(self, parent_prefix: u8) -> u8 {
        match self {
            StepPolicy::Quantized if parent_prefix <= WIDE_STEP_MAX_PREFIX => 4,
            StepPolicy::Quantized => 2,
            StepPolicy::Minimal => 1,
        }
    }
}

impl fmt::Display for StepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepPolicy::Quantized => write!(f, "quantized"),
            StepPolicy::Minimal => write!(f, "minimal"),
        }
    }
}

impl FromStr for StepPolicy {
    type Err = NetsplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quantized" => Ok(StepPolicy::Quantized),
            "minimal" => Ok(StepPolicy::Minimal),
            other => Err(NetsplitError::Config(format!(
                "unknown step policy '{}' (expected quantized or minimal)",
                other
            ))),
        }
    }
}

/// Usable-host accounting for point-to-point and host subnets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostPolicy {
    /// Subtract network and broadcast, floored at zero
    #[default]
    Clamp,
    /// RFC 3021: a /31 has two usable addresses, a /32 has one
    Rfc3021,
}

impl HostPolicy {
    /// Usable host count for a subnet of `prefix_len`
    ///
    /// ```
    /// use netsplit_core::HostPolicy;
    ///
    /// assert_eq!(HostPolicy::Clamp.usable_hosts(24), 254);
    /// assert_eq!(HostPolicy::Clamp.usable_hosts(31), 0);
    /// assert_eq!(HostPolicy::Rfc3021.usable_hosts(31), 2);
    /// ```
    pub fn usable_hosts(self, prefix_len: u8) -> u64 {
        let size = 1u64 << (32 - u32::from(prefix_len.min(32)));
        match (self, prefix_len) {
            (HostPolicy::Rfc3021, 31) => 2,
            (HostPolicy::Rfc3021, 32) => 1,
            _ => size.saturating_sub(2),
        }
    }
}

impl fmt::Display for HostPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostPolicy::Clamp => write!(f, "clamp"),
            HostPolicy::Rfc3021 => write!(f, "rfc3021"),
        }
    }
}

impl FromStr for HostPolicy {
    type Err = NetsplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(HostPolicy::Clamp),
            "rfc3021" => Ok(HostPolicy::Rfc3021),
            other => Err(NetsplitError::Config(format!(
                "unknown host policy '{}' (expected clamp or rfc3021)",
                other
            ))),
        }
    }
}
