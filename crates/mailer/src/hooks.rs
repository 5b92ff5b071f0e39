//! Extension points for observing or rewriting composed notifications.
//!
//! Each extension point is an ordered list of callbacks registered at
//! startup. Filters receive the current value and return the new working
//! value; actions only observe. An empty list is a no-op.
//!
//! ```
//! use downpour_mailer::{Attachment, Hooks};
//!
//! let mut hooks = Hooks::default();
//! hooks
//!     .purchase_subject
//!     .add(|subject, _ctx| format!("[Downpour] {subject}"));
//! hooks.receipt_attachments.add(|mut files, _ctx| {
//!     files.push(Attachment::new("/srv/license.txt"));
//!     files
//! });
//! ```

use std::fmt;

use downpour_core::{Payment, PaymentId};

use crate::message::{Attachment, MailHeaders};

/// Payment the current notification is about.
///
/// Both fields are `None` for the test receipt, which is not tied to a
/// real payment.
#[derive(Debug, Clone, Copy, Default)]
pub struct HookContext<'a> {
    pub payment_id: Option<PaymentId>,
    pub payment: Option<&'a Payment>,
}

impl<'a> HookContext<'a> {
    /// Context not tied to any payment.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            payment_id: None,
            payment: None,
        }
    }

    #[must_use]
    pub const fn for_payment(payment: &'a Payment) -> Self {
        Self {
            payment_id: Some(payment.id),
            payment: Some(payment),
        }
    }
}

type Filter<T> = Box<dyn Fn(T, &HookContext<'_>) -> T + Send + Sync>;
type Action = Box<dyn Fn(&HookContext<'_>) + Send + Sync>;

/// Ordered filters for one extension point.
pub struct FilterChain<T> {
    filters: Vec<Filter<T>>,
}

impl<T> FilterChain<T> {
    /// Register a filter; it runs after every filter registered before it.
    pub fn add<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(T, &HookContext<'_>) -> T + Send + Sync + 'static,
    {
        self.filters.push(Box::new(filter));
        self
    }

    /// Thread `value` through every filter in registration order.
    pub fn apply(&self, value: T, ctx: &HookContext<'_>) -> T {
        self.filters.iter().fold(value, |acc, filter| filter(acc, ctx))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl<T> Default for FilterChain<T> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for FilterChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.filters.len())
            .finish()
    }
}

/// Ordered observers for one event.
#[derive(Default)]
pub struct ActionChain {
    actions: Vec<Action>,
}

impl ActionChain {
    pub fn add<F>(&mut self, action: F) -> &mut Self
    where
        F: Fn(&HookContext<'_>) + Send + Sync + 'static,
    {
        self.actions.push(Box::new(action));
        self
    }

    pub fn fire(&self, ctx: &HookContext<'_>) {
        for action in &self.actions {
            action(ctx);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Debug for ActionChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionChain")
            .field("actions", &self.actions.len())
            .finish()
    }
}

/// Every extension point the composer calls, in the order it calls them.
#[derive(Debug, Default)]
pub struct Hooks {
    /// Receipt subject, before `{tag}` rendering.
    pub purchase_subject: FilterChain<String>,
    /// Rendered receipt content, before the header/footer layout.
    pub purchase_receipt: FilterChain<String>,
    /// Files attached to the receipt.
    pub receipt_attachments: FilterChain<Vec<Attachment>>,
    /// Fired after the receipt is sent when an admin notice was requested.
    pub sale_notice: ActionChain,
    /// Admin notice recipients after settings resolution.
    pub admin_notice_emails: FilterChain<Vec<String>>,
    pub admin_subject: FilterChain<String>,
    /// Complete admin notice body.
    pub admin_message: FilterChain<String>,
    pub admin_headers: FilterChain<MailHeaders>,
    pub admin_attachments: FilterChain<Vec<Attachment>>,
}
