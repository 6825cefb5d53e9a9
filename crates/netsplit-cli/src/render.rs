//! Output rendering
//!
//! Turns subnet reports and block summaries into the human table, JSON and
//! CSV forms printed by the CLI.

use anyhow::Result;
use netsplit_cidr::NetworkBlock;
use netsplit_core::{HostPolicy, Ipv4};
use netsplit_partition::{compute_max_subnets, SubnetReport};
use serde::{Serialize, Serializer};
use std::io::Write;

/// Rows shown by the human table; larger splits point at CSV or JSON.
pub const HUMAN_ROW_LIMIT: usize = 4096;

/// Table columns, in display order
pub const COLUMNS: [&str; 8] = [
    "Network ID",
    "Network IP",
    "Broadcast IP",
    "Subnet Range",
    "CIDR Mask",
    "DD Mask",
    "Anti-DD Mask",
    "Usable Hosts",
];

/// Columns holding numbers are right-aligned
const NUMERIC: [bool; 8] = [true, false, false, false, true, false, false, true];

fn row(report: &SubnetReport) -> [String; 8] {
    [
        report.index.to_string(),
        report.network.to_string(),
        report.broadcast.to_string(),
        report.subnet_range(),
        report.prefix_len.to_string(),
        report.subnet_mask.to_string(),
        report.host_mask.to_string(),
        report.usable_hosts.to_string(),
    ]
}

fn table_line(cells: &[&str], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .zip(NUMERIC)
        .map(|((cell, &w), numeric)| {
            if numeric {
                format!(" {:>w$} ", cell)
            } else {
                format!(" {:<w$} ", cell)
            }
        })
        .collect();
    format!("|{}|", padded.join("|"))
}

/// Render reports as a pipe-delimited table
pub fn subnet_table(reports: &[SubnetReport]) -> String {
    let rows: Vec<[String; 8]> = reports.iter().map(row).collect();

    let mut widths = COLUMNS.map(str::len);
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    out.push_str(&table_line(&COLUMNS, &widths));
    out.push('\n');
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    out.push_str(&format!("|{}|", separator.join("|")));
    for cells in &rows {
        out.push('\n');
        let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
        out.push_str(&table_line(&cells, &widths));
    }
    out
}

/// Write reports as a JSON array, one element at a time
pub fn subnet_json<W, I>(reports: I, mut writer: W, pretty: bool) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = SubnetReport>,
{
    if pretty {
        let mut ser = serde_json::Serializer::pretty(&mut writer);
        (&mut ser).collect_seq(reports)?;
    } else {
        let mut ser = serde_json::Serializer::new(&mut writer);
        (&mut ser).collect_seq(reports)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write reports as CSV, one row per subnet as it is generated
pub fn subnet_csv<W, I>(reports: I, writer: W) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = SubnetReport>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "network_id",
        "network_ip",
        "broadcast_ip",
        "subnet_range",
        "cidr_mask",
        "dd_mask",
        "anti_dd_mask",
        "usable_hosts",
    ])?;
    for report in reports {
        wtr.write_record(row(&report))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Summary of a single network block
#[derive(Debug, Serialize)]
pub struct BlockInfo {
    /// Block in CIDR notation
    pub cidr: String,
    /// Network address
    pub network: Ipv4,
    /// Broadcast address
    pub broadcast: Ipv4,
    /// First usable address, if any
    pub first_usable: Option<Ipv4>,
    /// Last usable address, if any
    pub last_usable: Option<Ipv4>,
    /// Prefix length
    pub prefix_len: u8,
    /// Dotted-decimal network mask
    pub subnet_mask: Ipv4,
    /// Inverse of the network mask
    pub host_mask: Ipv4,
    /// Total addresses in the block
    pub size: u64,
    /// Usable addresses under the chosen host policy
    pub usable_hosts: u64,
    /// Absent for /0, which cannot be split
    pub max_subnets: Option<u64>,
}

impl BlockInfo {
    pub fn new(block: NetworkBlock, hosts: HostPolicy) -> Self {
        let report = SubnetReport::from_block(0, block, hosts);
        Self {
            cidr: block.to_string(),
            network: report.network,
            broadcast: report.broadcast,
            first_usable: report.first_usable,
            last_usable: report.last_usable,
            prefix_len: report.prefix_len,
            subnet_mask: report.subnet_mask,
            host_mask: report.host_mask,
            size: block.size(),
            usable_hosts: report.usable_hosts,
            max_subnets: compute_max_subnets(block.prefix_len()).ok(),
        }
    }

    /// Usable range as `"first - last"`, or `"-"`
    pub fn usable_range(&self) -> String {
        match (self.first_usable, self.last_usable) {
            (Some(first), Some(last)) => format!("{} - {}", first, last),
            _ => "-".to_string(),
        }
    }

    /// Label/value pairs in display order
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("CIDR", self.cidr.clone()),
            ("Network", self.network.to_string()),
            ("Broadcast", self.broadcast.to_string()),
            ("Usable range", self.usable_range()),
            ("DD Mask", self.subnet_mask.to_string()),
            ("Anti-DD Mask", self.host_mask.to_string()),
            ("Addresses", self.size.to_string()),
            ("Usable hosts", self.usable_hosts.to_string()),
            (
                "Max subnets",
                self.max_subnets.map_or("-".to_string(), |m| m.to_string()),
            ),
        ]
    }
}

/// Write a block summary as a single CSV record
pub fn info_csv<W: Write>(info: &BlockInfo, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "cidr",
        "network",
        "broadcast",
        "usable_range",
        "dd_mask",
        "anti_dd_mask",
        "addresses",
        "usable_hosts",
        "max_subnets",
    ])?;
    wtr.write_record(info.fields().into_iter().map(|(_, value)| value))?;
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use netsplit_partition::{partition, SubnetPartitioner};

    fn reports(cidr: &str, count: u64) -> Vec<SubnetReport> {
        partition(&NetworkBlock::parse(cidr).unwrap(), count).unwrap()
    }

    #[test]
    fn test_table_layout() {
        let table = subnet_table(&reports("192.168.1.0/24", 4));
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("| Network ID | Network IP"));
        assert!(lines[1].starts_with("|------------|"));
        assert_eq!(
            lines[2],
            "|          0 | 192.168.1.0  | 192.168.1.15 | 192.168.1.1 - 192.168.1.14  \
             |        28 | 255.255.255.240 | 0.0.0.15     |           14 |"
        );
        assert!(lines[5].contains("192.168.1.48"));

        // every line has the same width
        assert!(lines.iter().all(|l| l.len() == lines[0].len()));
    }

    #[test]
    fn test_table_empty_range() {
        let table = subnet_table(&reports("10.0.0.0/31", 2));
        assert!(table.lines().nth(2).unwrap().contains("| -  "));
    }

    #[test]
    fn test_csv_output() {
        let mut buf = Vec::new();
        subnet_csv(reports("10.0.0.0/28", 2), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("network_id,network_ip"));
        assert_eq!(
            lines[2],
            "1,10.0.0.4,10.0.0.7,10.0.0.5 - 10.0.0.6,30,255.255.255.252,0.0.0.3,2"
        );
    }

    #[test]
    fn test_json_matches_collected_output() {
        let reports = reports("10.0.0.0/24", 5);

        let mut compact = Vec::new();
        subnet_json(reports.clone(), &mut compact, false).unwrap();
        let expected = serde_json::to_string(&reports).unwrap() + "\n";
        assert_eq!(String::from_utf8(compact).unwrap(), expected);

        let mut pretty = Vec::new();
        subnet_json(reports.clone(), &mut pretty, true).unwrap();
        let expected = serde_json::to_string_pretty(&reports).unwrap() + "\n";
        assert_eq!(String::from_utf8(pretty).unwrap(), expected);
    }

    #[test]
    fn test_streaming_from_large_split() {
        let block = NetworkBlock::parse("0.0.0.0/1").unwrap();
        let subnets = SubnetPartitioner::new().iter(&block, 1u64 << 31).unwrap();

        let mut buf = Vec::new();
        subnet_csv(subnets.take(3), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().nth(3).unwrap().starts_with("2,0.0.0.2,0.0.0.2,-,32,"));
    }

    #[test]
    fn test_block_info() {
        let block = NetworkBlock::parse("10.0.0.0/30").unwrap();
        let info = BlockInfo::new(block, HostPolicy::Clamp);

        assert_eq!(info.size, 4);
        assert_eq!(info.usable_hosts, 2);
        assert_eq!(info.max_subnets, Some(4));
        assert_eq!(info.usable_range(), "10.0.0.1 - 10.0.0.2");
    }

    #[test]
    fn test_block_info_slash_0() {
        let block = NetworkBlock::parse("0.0.0.0/0").unwrap();
        let info = BlockInfo::new(block, HostPolicy::Clamp);

        assert_eq!(info.max_subnets, None);
        assert_eq!(info.broadcast.to_string(), "255.255.255.255");
    }

    #[test]
    fn test_info_csv() {
        let block = NetworkBlock::parse("192.168.1.0/24").unwrap();
        let mut buf = Vec::new();
        info_csv(&BlockInfo::new(block, HostPolicy::Clamp), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.lines().nth(1).unwrap().starts_with("192.168.1.0/24,192.168.1.0,"));
        assert!(text.trim_end().ends_with(",256,254,256"));
    }
}
