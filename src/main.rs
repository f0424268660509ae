use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sainsburys_assistant::{config, Assistant, Config, TerminalOperator};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// WebDriver server controlling the browser (e.g. geckodriver)
    #[arg(long, env = "WEBDRIVER_URL", default_value = config::DEFAULT_WEBDRIVER_URL)]
    webdriver_url: String,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Round item counts up only when more than this above a whole number
    #[arg(long, default_value_t = config::DEFAULT_ITEMS_ROUNDING_TOLERANCE)]
    items_rounding_tolerance: f64,

    /// Do not show a progress bar while adding known items
    #[arg(long)]
    no_progress: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "sainsburys_assistant=info",
        _ => "sainsburys_assistant=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    println!("        Sainsbury's Assistant        ");

    let config = Config::from_env()?;
    let assistant = Assistant::builder()
        .webdriver_url(&args.webdriver_url)
        .timeout(Duration::from_secs(args.timeout))
        .items_rounding_tolerance(args.items_rounding_tolerance)
        .show_progress(!args.no_progress)
        .build(config)?;
    tracing::debug!("{}", assistant);

    let mut operator = TerminalOperator::stdio();
    let report = assistant
        .run(&mut operator)
        .context("ordering session failed")?;

    println!(
        "Added {} items automatically, recorded {} new mappings, skipped {}",
        report.added_automatically,
        report.recorded.len(),
        report.skipped
    );
    Ok(())
}
