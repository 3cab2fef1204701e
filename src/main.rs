use anyhow::Context;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::{debug, error, trace};

use mtv_report::config::ReportConfig;
use mtv_report::pipeline;
use mtv_report::report::{ReportSink, WriterSink};

/// Summarize VM migration plans by operating system and outcome
#[derive(Parser)]
#[command(name = "mtv-report", version)]
#[command(about = "Summarize VM migration plans into statistical reports", long_about = None)]
struct Cli {
    /// VM inventory document (YAML list of virtual machines)
    #[arg(short, long)]
    inventory: PathBuf,

    /// Migration plan document (YAML list of plans)
    #[arg(short, long)]
    plans: PathBuf,

    /// Write reports to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Label holding the VM identifier in the inventory
    #[arg(long)]
    vm_id_label: Option<String>,

    /// Template annotation holding the guest OS
    #[arg(long)]
    os_annotation: Option<String>,

    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(cli.verbose >= 2)
        .with_line_number(cli.verbose >= 3)
        .init();

    debug!("mtv-report started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli) {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;

    let open_sink = || -> mtv_report::Result<Box<dyn ReportSink>> {
        match &cli.output {
            Some(path) => Ok(Box::new(WriterSink::create(path)?)),
            None => Ok(Box::new(WriterSink::stdout())),
        }
    };

    pipeline::run(&cli.inventory, &cli.plans, &config, open_sink)?;
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<ReportConfig> {
    let mut config = match &cli.config {
        Some(path) => ReportConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ReportConfig::default(),
    };
    config.merge_env_vars()?;

    if let Some(label) = &cli.vm_id_label {
        config.vm_id_label = label.clone();
    }
    if let Some(annotation) = &cli.os_annotation {
        config.os_annotation = annotation.clone();
    }
    config.validate()?;

    debug!("Using configuration: {:?}", config);
    Ok(config)
}
