//! Downpour Mailer - purchase receipts and sale notices.
//!
//! After a payment completes, the buyer gets a receipt rendered from a
//! configurable template and the store administrators get a plain-text sale
//! notice. Everything the mailer needs from the rest of the store (payment
//! records, user and product lookups, currency formatting) comes through the
//! [`Storefront`] trait; delivery goes through a [`MailTransport`].
//!
//! # Flow
//!
//! ```text
//! payment completed
//!   -> NotificationComposer::send_purchase_receipt
//!        buyer name -> template render -> hooks -> transport (buyer)
//!        sale_notice hook -> send_admin_notice
//!          recipients -> line items -> hooks -> transport (admins)
//! ```
//!
//! Delivery is fire-and-forget: a failed send is logged and never retried.
//!
//! # Modules
//!
//! - [`composer`] - Orchestrates receipts, admin notices, and test receipts
//! - [`template`] - `{tag}` substitution for subjects and bodies
//! - [`hooks`] - Ordered extension points that can rewrite composed values
//! - [`transport`] - SMTP delivery and an in-memory outbox

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod buyer;
pub mod composer;
pub mod config;
pub mod error;
pub mod hooks;
pub mod layout;
pub mod line_items;
pub mod message;
pub mod recipients;
pub mod store;
pub mod template;
pub mod text;
pub mod transport;

pub use composer::NotificationComposer;
pub use config::{ConfigError, MailSettings, MailerConfig, NotificationSettings, SiteSettings, SmtpConfig};
pub use error::{MailerError, TransportError};
pub use hooks::{HookContext, Hooks};
pub use message::{Attachment, ComposedMessage, MailHeaders};
pub use store::Storefront;
pub use template::{TemplateContext, TemplateTag};
pub use transport::{MailTransport, Outbox, SmtpMailer};
