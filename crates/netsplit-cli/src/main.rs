use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use netsplit_cidr::NetworkBlock;
use netsplit_core::{HostPolicy, Settings, StepPolicy};
use netsplit_partition::{SubnetPartitioner, Subnets};
use std::io::{BufWriter, Write};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod render;

use render::{BlockInfo, HUMAN_ROW_LIMIT};

/// Split IPv4 networks into equal subnets
#[derive(Parser)]
#[command(name = "netsplit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "human", global = true)]
    output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a network into subnets
    Split(SplitArgs),
    /// Show addressing details of a network
    Info(InfoArgs),
}

#[derive(Parser)]
struct SplitArgs {
    /// Network to split in CIDR notation (e.g., 192.168.1.0/24)
    #[arg(short = 'i', long = "ip", visible_short_alias = 'I', value_name = "CIDR")]
    ip: String,

    /// Number of subnets [default: $NETSPLIT_DEFAULT_COUNT or 4]
    #[arg(short = 'n', long = "subnet", value_name = "COUNT")]
    count: Option<u64>,

    /// Prefix step policy: quantized or minimal
    #[arg(long, value_name = "POLICY")]
    step: Option<StepPolicy>,

    /// Usable host policy: clamp or rfc3021
    #[arg(long, value_name = "POLICY")]
    hosts: Option<HostPolicy>,

    /// Reject addresses with host bits set
    #[arg(long)]
    strict: bool,
}

#[derive(Parser)]
struct InfoArgs {
    /// Network in CIDR notation
    #[arg(value_name = "CIDR")]
    cidr: String,

    /// Usable host policy: clamp or rfc3021
    #[arg(long, value_name = "POLICY")]
    hosts: Option<HostPolicy>,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable table output
    Human,
    /// JSON output (pretty-printed)
    Json,
    /// JSON output (compact)
    JsonCompact,
    /// CSV output
    Csv,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::from_env()?;
    debug!(?settings, "loaded settings");

    match cli.command {
        Commands::Split(args) => handle_split(args, &settings, cli.output)?,
        Commands::Info(args) => handle_info(args, &settings, cli.output)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_block(cidr: &str, strict: bool) -> Result<NetworkBlock> {
    let block = if strict {
        NetworkBlock::parse_strict(cidr)?
    } else {
        NetworkBlock::parse(cidr)?
    };
    Ok(block)
}

fn handle_split(args: SplitArgs, settings: &Settings, format: OutputFormat) -> Result<()> {
    let block = parse_block(&args.ip, args.strict)?;
    let count = args.count.unwrap_or(settings.default_count);

    let partitioner = SubnetPartitioner::new()
        .with_step(args.step.unwrap_or(settings.step))
        .with_hosts(args.hosts.unwrap_or(settings.hosts));

    let subnets = partitioner.iter(&block, count)?;
    let stdout = std::io::stdout();
    write_split(subnets, &partitioner, format, BufWriter::new(stdout.lock()))
}

/// Write a split to `out` without holding more than one table's worth of reports
fn write_split<W: Write>(
    subnets: Subnets,
    partitioner: &SubnetPartitioner,
    format: OutputFormat,
    mut out: W,
) -> Result<()> {
    let plan = *subnets.plan();

    match format {
        OutputFormat::Human => {
            let reports: Vec<_> = subnets.take(HUMAN_ROW_LIMIT).collect();
            let omitted = plan.requested - reports.len() as u64;

            writeln!(out)?;
            writeln!(
                out,
                "{}",
                format!("Subnets of {}", plan.parent).bold().cyan()
            )?;
            writeln!(out, "{}", "─".repeat(50).dimmed())?;
            writeln!(out, "{}", render::subnet_table(&reports))?;
            if omitted > 0 {
                debug!(omitted, "human table truncated");
                writeln!(
                    out,
                    "{}",
                    format!(
                        "... {} more subnets not shown, use --output csv or json for all",
                        omitted
                    )
                    .yellow()
                )?;
            }
            writeln!(
                out,
                "{}",
                format!(
                    "{} of {} /{} subnets ({} steps, {} hosts)",
                    plan.requested,
                    plan.total_subnets(),
                    plan.new_prefix,
                    partitioner.step(),
                    partitioner.hosts()
                )
                .dimmed()
            )?;
            writeln!(out)?;
            out.flush()?;
        }
        OutputFormat::Json => render::subnet_json(subnets, out, true)?,
        OutputFormat::JsonCompact => render::subnet_json(subnets, out, false)?,
        OutputFormat::Csv => render::subnet_csv(subnets, out)?,
    }
    Ok(())
}

fn handle_info(args: InfoArgs, settings: &Settings, format: OutputFormat) -> Result<()> {
    let block = parse_block(&args.cidr, false)?;
    let info = BlockInfo::new(block, args.hosts.unwrap_or(settings.hosts));

    match format {
        OutputFormat::Human => print_info_human(&info),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
        OutputFormat::JsonCompact => println!("{}", serde_json::to_string(&info)?),
        OutputFormat::Csv => render::info_csv(&info, std::io::stdout())?,
    }
    Ok(())
}

fn print_info_human(info: &BlockInfo) {
    println!();
    println!("{}", "Network Block".bold().cyan());
    println!("{}", "─".repeat(50).dimmed());
    for (label, value) in info.fields() {
        println!("{:>15}: {}", label.bold(), value);
    }
    println!();
}
