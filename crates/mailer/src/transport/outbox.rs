use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::MailTransport;
use crate::error::TransportError;
use crate::message::ComposedMessage;

/// In-memory transport that keeps every message it is given.
///
/// Clones share the same record, so a caller can keep one handle and give
/// another to the composer.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    sent: Arc<Mutex<Vec<ComposedMessage>>>,
}

impl Outbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<ComposedMessage> {
        self.lock().clone()
    }

    /// Remove and return every recorded message.
    #[must_use]
    pub fn take(&self) -> Vec<ComposedMessage> {
        std::mem::take(&mut *self.lock())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ComposedMessage>> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MailTransport for Outbox {
    async fn send(&self, message: ComposedMessage) -> Result<(), TransportError> {
        tracing::debug!(
            to = ?message.to,
            subject = %message.subject,
            "Message recorded in outbox"
        );
        self.lock().push(message);
        Ok(())
    }
}
