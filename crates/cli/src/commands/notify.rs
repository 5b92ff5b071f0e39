//! Send purchase notifications from a store snapshot.
//!
//! # Usage
//!
//! ```bash
//! # Receipt for payment 42, plus the sale notice to admins
//! dp-cli --store store.yaml receipt 42
//!
//! # Receipt only
//! dp-cli --store store.yaml receipt 42 --no-admin-notice
//!
//! # Sale notice only
//! dp-cli --store store.yaml admin-notice 42
//!
//! # Example receipt to the admin recipients, logged instead of sent
//! dp-cli --store store.yaml --dry-run test-receipt
//! ```
//!
//! # Environment Variables
//!
//! Mailer settings are read as described in `downpour_mailer::config`.
//! SMTP settings are required unless `--dry-run` is given.

use std::path::Path;

use downpour_core::{Email, EmailError, PaymentId};
use downpour_mailer::{
    ComposedMessage, ConfigError, MailTransport, MailerConfig, MailerError, NotificationComposer,
    Outbox, SmtpMailer, Storefront, TransportError,
};
use thiserror::Error;
use tracing::{error, info};

use crate::snapshot::{SnapshotError, StoreSnapshot};

/// Errors that stop a notification command.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Site admin email is invalid: {0}")]
    InvalidAdminEmail(EmailError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("{0} snapshot validation errors found")]
    InvalidSnapshot(usize),

    #[error("SMTP is not configured; set SMTP_HOST, SMTP_USERNAME, SMTP_PASSWORD, and SMTP_FROM or pass --dry-run")]
    SmtpNotConfigured,

    #[error("SMTP setup failed: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Mailer(#[from] MailerError),
}

/// Which notification to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    Receipt {
        payment_id: PaymentId,
        admin_notice: bool,
    },
    AdminNotice {
        payment_id: PaymentId,
    },
    TestReceipt,
}

/// Load configuration and the snapshot, then send one notification.
///
/// # Errors
///
/// Returns an error if configuration or the snapshot is invalid, SMTP is
/// needed but not configured, or the payment does not exist.
pub async fn send(
    store_path: &Path,
    dry_run: bool,
    notification: Notification,
) -> Result<(), NotifyError> {
    let config = MailerConfig::from_env()?;
    Email::parse(&config.settings.site.admin_email).map_err(NotifyError::InvalidAdminEmail)?;

    info!(path = %store_path.display(), "Loading store snapshot");
    let store = StoreSnapshot::load(store_path).await?;

    let errors = store.validate();
    if !errors.is_empty() {
        error!("Snapshot validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(NotifyError::InvalidSnapshot(errors.len()));
    }
    info!(payments = store.payments.len(), "Snapshot validated");

    if dry_run {
        let outbox = Outbox::new();
        let composer = NotificationComposer::new(store, outbox.clone(), config.settings);
        dispatch(&composer, notification).await?;

        let messages = outbox.take();
        info!(count = messages.len(), "Dry run complete, nothing was sent");
        for message in &messages {
            log_message(message);
        }
        return Ok(());
    }

    let smtp = config.smtp.ok_or(NotifyError::SmtpNotConfigured)?;
    let mailer = SmtpMailer::new(&smtp)?;
    let composer = NotificationComposer::new(store, mailer, config.settings);
    dispatch(&composer, notification).await
}

/// Run one notification through a composer.
///
/// # Errors
///
/// Returns [`MailerError::PaymentNotFound`] if the payment is not in the
/// snapshot.
pub async fn dispatch<T: MailTransport>(
    composer: &NotificationComposer<StoreSnapshot, T>,
    notification: Notification,
) -> Result<(), NotifyError> {
    match notification {
        Notification::Receipt {
            payment_id,
            admin_notice,
        } => {
            composer
                .send_purchase_receipt(payment_id, admin_notice)
                .await?;
        }
        Notification::AdminNotice { payment_id } => {
            let payment = composer
                .store()
                .payment(payment_id)
                .ok_or(MailerError::PaymentNotFound(payment_id))?;
            composer.send_admin_notice(payment_id, &payment).await;
        }
        Notification::TestReceipt => composer.send_test_receipt().await?,
    }
    Ok(())
}

fn log_message(message: &ComposedMessage) {
    info!(
        to = ?message.to,
        subject = %message.subject,
        attachments = ?message.attachments,
        "Composed message"
    );
    for (name, value) in message.headers.iter() {
        info!("  {name}: {value}");
    }
    for line in message.body.lines() {
        info!("  | {line}");
    }
}
