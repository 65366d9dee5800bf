mod commands;
mod mock_hv;

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use hvlink_core::config::{
    DEFAULT_HV_API_URL, DEFAULT_LEDGER_PATH, DEFAULT_PIK_API_KEY, DEFAULT_PIK_API_URL,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use hvlink_core::{ConnectorConfig, IdentityStrategy, RunMode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Identity-linking rule, as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum IdentityArg {
    AllowList,
    Handle,
}

impl From<IdentityArg> for IdentityStrategy {
    fn from(arg: IdentityArg) -> Self {
        match arg {
            IdentityArg::AllowList => IdentityStrategy::AllowList,
            IdentityArg::Handle => IdentityStrategy::Handle,
        }
    }
}

/// Heroes' Veritas → PIK progression connector.
#[derive(Parser)]
#[command(
    name = "hvlink",
    version,
    about = "Heroes' Veritas to PIK progression connector"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Only log warnings and errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to the forwarded-session ledger (SQLite)
    #[arg(long, global = true, env = "HVLINK_LEDGER", default_value = DEFAULT_LEDGER_PATH)]
    ledger: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll HV and forward completed sessions to PIK
    Run(RunArgs),

    /// List sessions already forwarded
    Ledger,

    /// Serve the mock HV session API
    MockHv {
        /// Port to listen on
        #[arg(long, default_value = "8000")]
        port: u16,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Make a single poll pass, then exit
    #[arg(long, conflicts_with = "dry_run")]
    once: bool,

    /// Log what would be sent; no ingest calls, no ledger writes
    #[arg(long)]
    dry_run: bool,

    /// Heroes' Veritas API base URL
    #[arg(long, env = "HV_API_URL", default_value = DEFAULT_HV_API_URL)]
    hv_api_url: String,

    /// PIK API base URL
    #[arg(long, env = "PIK_API_URL", default_value = DEFAULT_PIK_API_URL)]
    pik_api_url: String,

    /// PIK source API key
    #[arg(long, env = "PIK_API_KEY", default_value = DEFAULT_PIK_API_KEY, hide_env_values = true)]
    pik_api_key: String,

    /// Seconds between polls in continuous mode
    #[arg(
        long,
        env = "POLL_INTERVAL",
        default_value_t = DEFAULT_POLL_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    poll_interval: u64,

    /// Per-request HTTP timeout in seconds
    #[arg(
        long,
        env = "HVLINK_TIMEOUT",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: u64,

    /// How HV players are linked to PIK accounts
    #[arg(long, default_value = "allow-list", value_enum)]
    identity: IdentityArg,
}

impl RunArgs {
    fn mode(&self) -> RunMode {
        if self.dry_run {
            RunMode::DryRun
        } else if self.once {
            RunMode::Once
        } else {
            RunMode::Continuous
        }
    }

    fn config(&self, ledger: PathBuf) -> ConnectorConfig {
        ConnectorConfig {
            hv_api_url: self.hv_api_url.clone(),
            pik_api_url: self.pik_api_url.clone(),
            pik_api_key: self.pik_api_key.clone(),
            poll_interval: Duration::from_secs(self.poll_interval),
            request_timeout: Duration::from_secs(self.timeout),
            ledger_path: ledger,
            identity: self.identity.into(),
        }
        .normalized()
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    match cli.command {
        Commands::Run(args) => {
            let mode = args.mode();
            let config = args.config(cli.ledger);
            if let Err(e) = commands::run::cmd_run(&config, mode, cli.output) {
                report_error(&format!("error: {}", e), cli.output);
                process::exit(1);
            }
        }
        Commands::Ledger => {
            if let Err(e) = commands::ledger::cmd_ledger(&cli.ledger, cli.output) {
                report_error(&format!("error: {}", e), cli.output);
                process::exit(1);
            }
        }
        Commands::MockHv { port } => {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    report_error(&format!("error: failed to start runtime: {}", e), cli.output);
                    process::exit(1);
                }
            };
            if let Err(e) = rt.block_on(mock_hv::start_server(port)) {
                report_error(&format!("Server error: {}", e), cli.output);
                process::exit(1);
            }
        }
    }
}

/// Logs go to stderr so stdout stays clean for `--output json`.
fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

pub(crate) fn report_error(msg: &str, output: OutputFormat) {
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": msg })),
    }
}
