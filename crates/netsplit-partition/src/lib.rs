//! Subnet partitioning
//!
//! Splits a [`NetworkBlock`] into equal power-of-two subnets and derives
//! per-subnet addressing facts:
//! - Maximum subnet count for a prefix length
//! - Split planning under a [`StepPolicy`]
//! - Lazy generation of exactly the requested number of [`SubnetReport`]s
//!
//! All inputs are validated before any subnet is produced; a request either
//! fails with [`NetsplitError::InvalidArgument`] or yields every report.
//!
//! # Examples
//!
//! ```
//! use netsplit_cidr::NetworkBlock;
//! use netsplit_partition::partition;
//!
//! let block = NetworkBlock::parse("192.168.1.0/24").unwrap();
//! let reports = partition(&block, 4).unwrap();
//!
//! assert_eq!(reports.len(), 4);
//! assert_eq!(reports[1].cidr().unwrap().to_string(), "192.168.1.16/28");
//! assert_eq!(reports[1].usable_hosts, 14);
//! ```

use netsplit_cidr::{NetworkBlock, MAX_PREFIX_LEN};
use netsplit_core::{HostPolicy, Ipv4, NetsplitError, Result, StepPolicy};
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;
use tracing::debug;

/// Total addresses available for subdivision at `prefix_len`
///
/// This is the upper bound on the subnet count a block of that prefix
/// length can be split into.
///
/// # Examples
///
/// ```
/// use netsplit_partition::compute_max_subnets;
///
/// assert_eq!(compute_max_subnets(30).unwrap(), 4);
/// assert_eq!(compute_max_subnets(24).unwrap(), 256);
/// assert!(compute_max_subnets(0).is_err());
/// ```
pub fn compute_max_subnets(prefix_len: u8) -> Result<u64> {
    if !(1..=MAX_PREFIX_LEN).contains(&prefix_len) {
        return Err(NetsplitError::InvalidArgument(format!(
            "prefix length /{} is outside 1-32",
            prefix_len
        )));
    }
    Ok(1u64 << (MAX_PREFIX_LEN - prefix_len))
}

/// Split `block` into `count` subnets with the default policies
pub fn partition(block: &NetworkBlock, count: u64) -> Result<Vec<SubnetReport>> {
    SubnetPartitioner::default().partition(block, count)
}

/// Smallest `k` with `2^k >= count`
fn bits_for(count: u64) -> u8 {
    if count <= 1 {
        0
    } else {
        (u64::BITS - (count - 1).leading_zeros()) as u8
    }
}

/// A validated split of one block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionPlan {
    /// Block being split
    pub parent: NetworkBlock,
    /// Prefix length shared by every child
    pub new_prefix: u8,
    /// Bits borrowed from the host part (`new_prefix - parent prefix`)
    pub split_bits: u8,
    /// Number of children that will be reported
    pub requested: u64,
}

impl PartitionPlan {
    /// Addresses per child
    pub fn subnet_size(&self) -> u64 {
        1u64 << (MAX_PREFIX_LEN - self.new_prefix)
    }

    /// Children the split creates, reported or not
    pub fn total_subnets(&self) -> u64 {
        1u64 << self.split_bits
    }
}

/// One generated subnet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetReport {
    /// Position in generation order, starting at 0
    pub index: u64,
    /// First address of the subnet (host bits zero)
    pub network: Ipv4,
    /// Last address of the subnet (host bits all one)
    pub broadcast: Ipv4,
    /// First usable address, absent when the subnet has no usable host
    pub first_usable: Option<Ipv4>,
    /// Last usable address, absent when the subnet has no usable host
    pub last_usable: Option<Ipv4>,
    /// Prefix length of the subnet
    pub prefix_len: u8,
    /// Dotted-decimal network mask
    pub subnet_mask: Ipv4,
    /// Inverse of the network mask
    pub host_mask: Ipv4,
    /// Usable addresses under the partitioner's host policy
    pub usable_hosts: u64,
}

impl SubnetReport {
    /// Describe `block` as the subnet at position `index`
    pub fn from_block(index: u64, block: NetworkBlock, hosts: HostPolicy) -> Self {
        let usable_hosts = hosts.usable_hosts(block.prefix_len());
        let (first_usable, last_usable) = match (usable_hosts, block.prefix_len()) {
            (0, _) => (None, None),
            (_, p) if p >= MAX_PREFIX_LEN - 1 => (Some(block.network()), Some(block.broadcast())),
            _ => (
                Some(Ipv4(block.network().to_bits() + 1)),
                Some(Ipv4(block.broadcast().to_bits() - 1)),
            ),
        };

        Self {
            index,
            network: block.network(),
            broadcast: block.broadcast(),
            first_usable,
            last_usable,
            prefix_len: block.prefix_len(),
            subnet_mask: block.mask(),
            host_mask: block.host_mask(),
            usable_hosts,
        }
    }

    /// The subnet as a network block
    ///
    /// Fails when the report was built by hand (or deserialized) with a
    /// prefix above 32 or a network address that is not aligned to it.
    pub fn cidr(&self) -> netsplit_cidr::Result<NetworkBlock> {
        NetworkBlock::aligned(self.network.to_bits(), self.prefix_len)
    }

    /// Usable range as `"first - last"`, or `"-"` when there is none
    pub fn subnet_range(&self) -> String {
        match (self.first_usable, self.last_usable) {
            (Some(first), Some(last)) => format!("{} - {}", first, last),
            _ => "-".to_string(),
        }
    }
}

/// Splits network blocks into equal subnets
///
/// # Examples
///
/// ```
/// use netsplit_cidr::NetworkBlock;
/// use netsplit_core::StepPolicy;
/// use netsplit_partition::SubnetPartitioner;
///
/// let block = NetworkBlock::parse("10.0.0.0/16").unwrap();
/// let partitioner = SubnetPartitioner::new().with_step(StepPolicy::Minimal);
///
/// let plan = partitioner.plan(&block, 3).unwrap();
/// assert_eq!(plan.new_prefix, 18);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubnetPartitioner {
    step: StepPolicy,
    hosts: HostPolicy,
}

impl SubnetPartitioner {
    /// Create a partitioner with the default policies
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `step` to choose the new prefix length
    pub fn with_step(mut self, step: StepPolicy) -> Self {
        self.step = step;
        self
    }

    /// Use `hosts` to count usable addresses
    pub fn with_hosts(mut self, hosts: HostPolicy) -> Self {
        self.hosts = hosts;
        self
    }

    pub fn step(&self) -> StepPolicy {
        self.step
    }

    pub fn hosts(&self) -> HostPolicy {
        self.hosts
    }

    /// Validate a request and choose the new prefix length
    ///
    /// # Arguments
    ///
    /// * `block` - Block to split
    /// * `count` - Number of subnets wanted, `1..=compute_max_subnets(prefix)`
    pub fn plan(&self, block: &NetworkBlock, count: u64) -> Result<PartitionPlan> {
        let max = compute_max_subnets(block.prefix_len())?;
        if count == 0 || count > max {
            return Err(NetsplitError::InvalidArgument(format!(
                "cannot split {} into {} subnets (expected 1-{})",
                block, count, max
            )));
        }

        let parent_prefix = block.prefix_len();
        let step = self.step.step_bits(parent_prefix);
        let needed = bits_for(count);
        let split_bits = (needed.div_ceil(step) * step).min(MAX_PREFIX_LEN - parent_prefix);

        let plan = PartitionPlan {
            parent: *block,
            new_prefix: parent_prefix + split_bits,
            split_bits,
            requested: count,
        };

        debug!(
            block = %block,
            count,
            policy = %self.step,
            new_prefix = plan.new_prefix,
            total = plan.total_subnets(),
            "planned split"
        );

        Ok(plan)
    }

    /// Lazily generate the first `count` subnets of `block`
    pub fn iter(&self, block: &NetworkBlock, count: u64) -> Result<Subnets> {
        let plan = self.plan(block, count)?;
        Ok(Subnets::new(plan, self.hosts))
    }

    /// Split `block` into `count` subnets, in ascending address order
    pub fn partition(&self, block: &NetworkBlock, count: u64) -> Result<Vec<SubnetReport>> {
        Ok(self.iter(block, count)?.collect())
    }
}

/// Iterator over the reports of a [`PartitionPlan`]
#[derive(Debug, Clone)]
pub struct Subnets {
    plan: PartitionPlan,
    hosts: HostPolicy,
    position: u64,
}

impl Subnets {
    fn new(plan: PartitionPlan, hosts: HostPolicy) -> Self {
        Self {
            plan,
            hosts,
            position: 0,
        }
    }

    /// The plan being generated
    pub fn plan(&self) -> &PartitionPlan {
        &self.plan
    }
}

impl Iterator for Subnets {
    type Item = SubnetReport;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.plan.requested {
            return None;
        }

        let index = self.position;
        self.position += 1;

        let base = u64::from(self.plan.parent.network().to_bits()) + index * self.plan.subnet_size();
        // children of an aligned parent stay inside the 32-bit space
        let child = NetworkBlock::new(base as u32, self.plan.new_prefix).ok()?;

        Some(SubnetReport::from_block(index, child, self.hosts))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.position = self
            .position
            .saturating_add(n as u64)
            .min(self.plan.requested);
        self.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.plan.requested - self.position) {
            Ok(remaining) => (remaining, Some(remaining)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl ExactSizeIterator for Subnets {}

impl FusedIterator for Subnets {}
