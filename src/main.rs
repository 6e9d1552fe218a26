//! HMS Billing: pricing server and CLI
//!
//! ```sh
//! # Run with default config (~/.config/hms-billing/config.toml)
//! hms-billing
//!
//! # Custom config path and port
//! hms-billing --config /etc/hms-billing/config.toml serve --port 9090
//!
//! # Validate config and pricing tables without starting
//! hms-billing check
//!
//! # Price a request document
//! hms-billing quote ambulance --input dispatch.json
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use chrono::Utc;
use tracing::{error, info};
use validator::Validate;

use hms_billing::application::BillingService;
use hms_billing::config::{default_config_path, AppConfig, CONFIG_ENV_VAR};
use hms_billing::infrastructure::tables::TableStore;
use hms_billing::interfaces::http::modules::ambulance::{AmbulanceQuoteRequest, AmbulanceQuoteResponse};
use hms_billing::interfaces::http::modules::invoices::{
    InvoiceLineDto, InvoiceLineResponse, InvoiceQuoteRequest, InvoiceQuoteResponse,
};
use hms_billing::server::{init_tracing, ServerHandle};
use hms_billing::support::errors::AppError;

/// Ambulance and hospital invoice pricing service.
#[derive(Parser, Debug)]
#[command(
    name = "hms-billing",
    version,
    about = "Deterministic pricing, GST and insurance breakdowns",
    long_about = "HMS Billing: REST API and CLI that price ambulance dispatches \
                  and hospital invoice lines from configurable rate tables.\n\n\
                  Default config: ~/.config/hms-billing/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = CONFIG_ENV_VAR, global = true)]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the REST API (default).
    Serve {
        /// Override the listen port.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Validate the configuration and pricing tables, then exit.
    Check,
    /// Price a JSON request document and print the breakdown.
    Quote {
        kind: QuoteKind,
        /// Request document; reads stdin when omitted.
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum QuoteKind {
    Ambulance,
    Line,
    Invoice,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = AppConfig::load(&config_path)?;
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            init_tracing(&config);
            info!("Configuration loaded from {}", config_path.display());
            if let Some(port) = port {
                info!("CLI override: port = {}", port);
                config.server.port = port;
            }

            let handle = ServerHandle::start(config).await?;
            handle.install_signal_handler();
            info!("🚀 Press Ctrl+C to shutdown gracefully, send SIGHUP to reload tables.");

            handle.shutdown_signal().wait().await;
            handle.wait().await;
            Ok(())
        }
        Command::Check => {
            let store = TableStore::open(config.pricing.tables_path.as_deref())?;
            let tables = store.current();
            println!("✅ Configuration is valid");
            println!("   Config file    : {}", config_path.display());
            println!("   API address    : {}", config.server.address());
            println!("   Log level      : {}", config.logging.level);
            match store.source() {
                Some(path) => println!("   Pricing tables : {} ({})", tables.version, path.display()),
                None => println!("   Pricing tables : {} (built-in)", tables.version),
            }
            Ok(())
        }
        Command::Quote { kind, input } => {
            init_cli_tracing(&config);
            let document = read_document(input.as_deref())?;
            let store = TableStore::open(config.pricing.tables_path.as_deref())?;
            let billing = BillingService::new(Arc::new(store));
            println!("{}", quote_document(&billing, kind, &document)?);
            Ok(())
        }
    }
}

/// Logs go to stderr so the quote on stdout stays machine-readable.
fn init_cli_tracing(config: &AppConfig) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();
}

fn read_document(input: Option<&Path>) -> Result<String, AppError> {
    match input {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Price `document` the same way the matching HTTP endpoint would and
/// return the response body as pretty JSON.
fn quote_document(billing: &BillingService, kind: QuoteKind, document: &str) -> Result<String, AppError> {
    let body = match kind {
        QuoteKind::Ambulance => {
            let req: AmbulanceQuoteRequest = serde_json::from_str(document)?;
            req.validate()?;
            let breakdown = billing.quote_ambulance(&req.to_domain())?;
            serde_json::to_string_pretty(&AmbulanceQuoteResponse::new(&breakdown, Utc::now()))?
        }
        QuoteKind::Line => {
            let req: InvoiceLineDto = serde_json::from_str(document)?;
            req.validate()?;
            let line = billing.quote_invoice_line(&req.to_domain())?;
            serde_json::to_string_pretty(&InvoiceLineResponse::from(&line))?
        }
        QuoteKind::Invoice => {
            let req: InvoiceQuoteRequest = serde_json::from_str(document)?;
            req.validate()?;
            let lines: Vec<_> = req.lines.iter().map(InvoiceLineDto::to_domain).collect();
            let invoice = billing.quote_invoice(&lines)?;
            serde_json::to_string_pretty(&InvoiceQuoteResponse::new(&invoice, Utc::now()))?
        }
    };
    Ok(body)
}
