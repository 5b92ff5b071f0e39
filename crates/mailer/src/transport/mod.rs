//! Message delivery.
//!
//! - [`SmtpMailer`] - Async SMTP via lettre
//! - [`Outbox`] - Records messages in memory (dry runs and tests)

mod outbox;
mod smtp;

pub use outbox::Outbox;
pub use smtp::SmtpMailer;

use crate::error::TransportError;
use crate::message::ComposedMessage;

/// Hands a composed message to a delivery mechanism.
///
/// One call is one attempt. Implementations do not retry, and callers do
/// not expect a delivery confirmation.
pub trait MailTransport: Send + Sync {
    /// Send a single message.
    fn send(
        &self,
        message: ComposedMessage,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}
