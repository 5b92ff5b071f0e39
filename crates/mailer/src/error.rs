//! Error types for the mailer.

use std::path::PathBuf;

use downpour_core::PaymentId;
use thiserror::Error;

/// Errors returned by the notification composer.
///
/// Delivery failures are not represented here: the composer logs them and
/// carries on.
#[derive(Debug, Error)]
pub enum MailerError {
    /// The payment record could not be loaded.
    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),

    /// The receipt header/footer layout failed to render.
    #[error("Layout error: {0}")]
    Layout(#[from] askama::Error),
}

/// Errors that can occur when handing a message to a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Invalid content type for a body part or attachment.
    #[error("Invalid content type: {0}")]
    ContentType(String),

    /// An attachment could not be read from disk.
    #[error("Failed to read attachment {path}: {source}")]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport refused the message for another reason.
    #[error("Transport rejected message: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mailer_error_display() {
        let err = MailerError::PaymentNotFound(PaymentId::new(17));
        assert_eq!(err.to_string(), "Payment not found: 17");
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::InvalidAddress("nobody".to_string());
        assert_eq!(err.to_string(), "Invalid email address: nobody");

        let err = TransportError::Attachment {
            path: PathBuf::from("/tmp/license.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to read attachment /tmp/license.pdf: missing"
        );
    }
}
