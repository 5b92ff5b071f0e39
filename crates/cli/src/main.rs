//! Downpour CLI - Send purchase receipts and sale notices.
//!
//! # Usage
//!
//! ```bash
//! # Send the receipt (and sale notice) for a payment
//! dp-cli --store store.yaml receipt 42
//!
//! # Send only the sale notice
//! dp-cli --store store.yaml admin-notice 42
//!
//! # Preview the receipt template with example values
//! dp-cli --store store.yaml --dry-run test-receipt
//! ```
//!
//! # Commands
//!
//! - `receipt` - Email the purchase receipt, optionally followed by the sale notice
//! - `admin-notice` - Email the sale notice to the store administrators
//! - `test-receipt` - Email an example receipt to the store administrators
//!
//! # Environment Variables
//!
//! - `SENTRY_DSN` - Enables Sentry error reporting when set
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `RUST_LOG` - Log filter (default: `downpour_cli=info,downpour_mailer=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use downpour_core::PaymentId;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::notify::Notification;

mod commands;
mod snapshot;

#[derive(Parser)]
#[command(name = "dp-cli")]
#[command(author, version, about = "Downpour notification tools")]
struct Cli {
    /// Store snapshot (YAML) with payments, products, and users
    #[arg(short, long, global = true, default_value = "store.yaml")]
    store: PathBuf,

    /// Compose and log messages without sending them
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send the purchase receipt for a payment
    Receipt {
        /// Payment ID
        payment_id: i32,

        /// Skip the sale notice to administrators
        #[arg(long)]
        no_admin_notice: bool,
    },
    /// Send the sale notice for a payment to administrators
    AdminNotice {
        /// Payment ID
        payment_id: i32,
    },
    /// Send an example receipt to administrators
    TestReceipt,
}

impl From<Commands> for Notification {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Receipt {
                payment_id,
                no_admin_notice,
            } => Self::Receipt {
                payment_id: PaymentId::new(payment_id),
                admin_notice: !no_admin_notice,
            },
            Commands::AdminNotice { payment_id } => Self::AdminNotice {
                payment_id: PaymentId::new(payment_id),
            },
            Commands::TestReceipt => Self::TestReceipt,
        }
    }
}

/// Initialize Sentry when `SENTRY_DSN` is set; the guard must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|v| !v.is_empty())?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: std::env::var("SENTRY_ENVIRONMENT")
                .ok()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Warnings and errors become Sentry events, info and debug breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let _sentry_guard = init_sentry();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "downpour_cli=info,downpour_mailer=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    commands::notify::send(&cli.store, cli.dry_run, cli.command.into()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_receipt_args() {
        let cli = Cli::try_parse_from(["dp-cli", "--store", "s.yaml", "receipt", "42"])
            .expect("valid arguments");

        assert_eq!(cli.store, PathBuf::from("s.yaml"));
        assert!(!cli.dry_run);
        assert_eq!(
            Notification::from(cli.command),
            Notification::Receipt {
                payment_id: PaymentId::new(42),
                admin_notice: true,
            }
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "dp-cli",
            "receipt",
            "42",
            "--no-admin-notice",
            "--dry-run",
        ])
        .expect("valid arguments");

        assert!(cli.dry_run);
        assert_eq!(cli.store, PathBuf::from("store.yaml"));
        assert_eq!(
            Notification::from(cli.command),
            Notification::Receipt {
                payment_id: PaymentId::new(42),
                admin_notice: false,
            }
        );
    }

    #[test]
    fn test_other_commands() {
        let admin = Cli::try_parse_from(["dp-cli", "admin-notice", "7"]).expect("valid arguments");
        assert_eq!(
            Notification::from(admin.command),
            Notification::AdminNotice {
                payment_id: PaymentId::new(7)
            }
        );

        let preview = Cli::try_parse_from(["dp-cli", "test-receipt"]).expect("valid arguments");
        assert_eq!(Notification::from(preview.command), Notification::TestReceipt);
    }
}
