//! Purchase receipt and sale notice composition.
//!
//! One composer is built at startup and shared for the life of the process.
//! Each entry point reads the payment fresh, composes one message per
//! audience, and makes exactly one transport call per message. A failed
//! send is logged and otherwise ignored: there is no retry and no
//! delivery status.

use chrono::Utc;
use downpour_core::{Payment, PaymentId};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::buyer::resolve_buyer_name;
use crate::config::MailSettings;
use crate::error::MailerError;
use crate::hooks::{HookContext, Hooks};
use crate::layout::wrap_receipt;
use crate::line_items::format_line_items;
use crate::message::{ComposedMessage, MailHeaders};
use crate::recipients::resolve_admin_recipients;
use crate::store::Storefront;
use crate::template::{TemplateContext, render};
use crate::text::{decode_entities, strip_slashes};
use crate::transport::MailTransport;

/// Subject of the sale notice before the `admin_subject` hook.
pub const DEFAULT_ADMIN_SUBJECT: &str = "New download purchase";

/// Amount shown in the test receipt's `{price}` tag.
const PREVIEW_AMOUNT: Decimal = Decimal::from_parts(1050, 0, 0, false, 2);

/// Composes and sends purchase notifications.
pub struct NotificationComposer<S, T> {
    store: S,
    transport: T,
    settings: MailSettings,
    hooks: Hooks,
}

impl<S, T> NotificationComposer<S, T>
where
    S: Storefront,
    T: MailTransport,
{
    /// Create a composer with no hooks registered.
    pub fn new(store: S, transport: T, settings: MailSettings) -> Self {
        Self {
            store,
            transport,
            settings,
            hooks: Hooks::default(),
        }
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub const fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn settings(&self) -> &MailSettings {
        &self.settings
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Payment-completed event handler: receipt plus admin notice.
    ///
    /// # Errors
    ///
    /// See [`Self::send_purchase_receipt`].
    pub async fn on_payment_completed(&self, payment_id: PaymentId) -> Result<(), MailerError> {
        self.send_purchase_receipt(payment_id, true).await
    }

    /// Email the purchase receipt to the buyer.
    ///
    /// When `admin_notice` is set, the `sale_notice` hook fires after the
    /// receipt is handed off and the sale notice is sent.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError::PaymentNotFound`] if the payment cannot be
    /// loaded, or [`MailerError::Layout`] if the receipt layout fails to
    /// render. Transport failures are logged, not returned.
    #[tracing::instrument(skip(self), fields(payment_id = %payment_id))]
    pub async fn send_purchase_receipt(
        &self,
        payment_id: PaymentId,
        admin_notice: bool,
    ) -> Result<(), MailerError> {
        let payment = self
            .store
            .payment(payment_id)
            .ok_or(MailerError::PaymentNotFound(payment_id))?;
        let ctx = HookContext::for_payment(&payment);

        let buyer_name = resolve_buyer_name(&self.store, &payment.user_info);
        debug!(buyer = %buyer_name, "Resolved buyer name");
        let tags =
            TemplateContext::for_payment(&self.store, &self.settings.site, &payment, &buyer_name);

        let content = self
            .hooks
            .purchase_receipt
            .apply(render(self.settings.purchase_receipt(), &tags), &ctx);
        let body = wrap_receipt(&self.settings.site.name, &content)?;

        let subject = self
            .hooks
            .purchase_subject
            .apply(self.settings.purchase_subject(), &ctx);
        let subject = render(&subject, &tags);

        let attachments = self.hooks.receipt_attachments.apply(Vec::new(), &ctx);

        self.dispatch(
            "purchase_receipt",
            ComposedMessage {
                to: vec![payment.email.clone()],
                subject,
                body,
                headers: self.receipt_headers(),
                attachments,
            },
        )
        .await;

        if admin_notice {
            self.hooks.sale_notice.fire(&ctx);
            self.send_admin_notice(payment_id, &payment).await;
        }

        Ok(())
    }

    /// Email the sale notice to the store administrators.
    #[tracing::instrument(skip(self, payment), fields(payment_id = %payment_id))]
    pub async fn send_admin_notice(&self, payment_id: PaymentId, payment: &Payment) {
        let ctx = HookContext {
            payment_id: Some(payment_id),
            payment: Some(payment),
        };

        let recipients = resolve_admin_recipients(&self.settings, &self.hooks);
        let buyer_name = resolve_buyer_name(&self.store, &payment.user_info);

        let subject = self
            .hooks
            .admin_subject
            .apply(DEFAULT_ADMIN_SUBJECT.to_string(), &ctx);

        let items = format_line_items(&self.store, payment_id, &payment.downloads);
        let amount = self.store.format_currency(payment.amount);
        let gateway = self.store.gateway_label(&payment.gateway);
        let body = admin_notice_body(
            &self.settings.site.label_plural,
            &decode_entities(&items),
            &decode_entities(&buyer_name),
            &decode_entities(&amount),
            &gateway,
        );
        let body = self.hooks.admin_message.apply(body, &ctx);

        let headers = self.hooks.admin_headers.apply(MailHeaders::new(), &ctx);
        let attachments = self.hooks.admin_attachments.apply(Vec::new(), &ctx);

        self.dispatch(
            "admin_notice",
            ComposedMessage {
                to: recipients,
                subject,
                body,
                headers,
                attachments,
            },
        )
        .await;
    }

    /// Send a receipt filled with example values to the administrators.
    ///
    /// Lets an administrator check template formatting without a real
    /// payment. The subject goes through the `purchase_subject` hook with an
    /// empty context and is not tag-rendered.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError::Layout`] if the receipt layout fails to render.
    #[tracing::instrument(skip(self))]
    pub async fn send_test_receipt(&self) -> Result<(), MailerError> {
        let ctx = HookContext::none();
        let tags = TemplateContext::preview(
            &self.settings.site,
            self.store.format_currency(PREVIEW_AMOUNT),
            Utc::now(),
        );

        let content = self
            .hooks
            .purchase_receipt
            .apply(render(self.settings.purchase_receipt(), &tags), &ctx);
        let body = wrap_receipt(&self.settings.site.name, &content)?;

        let subject = self
            .hooks
            .purchase_subject
            .apply(self.settings.purchase_subject(), &ctx);

        self.dispatch(
            "test_receipt",
            ComposedMessage {
                to: resolve_admin_recipients(&self.settings, &self.hooks),
                subject,
                body,
                headers: self.receipt_headers(),
                attachments: Vec::new(),
            },
        )
        .await;

        Ok(())
    }

    /// From, Reply-To, and HTML content headers shared by receipts.
    fn receipt_headers(&self) -> MailHeaders {
        let from_name = decode_entities(self.settings.from_name());
        let from_name = strip_slashes(&from_name);
        let from_email = self.settings.from_email();

        let mut headers = MailHeaders::new();
        headers
            .append("From", format!("{from_name} <{from_email}>"))
            .append("Reply-To", from_email)
            .append("MIME-Version", "1.0")
            .append("Content-Type", "text/html; charset=utf-8");
        headers
    }

    async fn dispatch(&self, kind: &'static str, message: ComposedMessage) {
        let recipients = message.to.join(", ");
        let subject = message.subject.clone();

        match self.transport.send(message).await {
            Ok(()) => info!(
                kind,
                recipients = %recipients,
                subject = %subject,
                "Notification handed to transport"
            ),
            Err(e) => warn!(
                kind,
                recipients = %recipients,
                subject = %subject,
                error = %e,
                "Notification send failed"
            ),
        }
    }
}

/// Plain-text sale notice.
///
/// Each item line ends in a newline, followed by one blank line, so an
/// empty purchase leaves a single blank line under the heading.
fn admin_notice_body(
    label_plural: &str,
    items: &str,
    buyer_name: &str,
    amount: &str,
    gateway: &str,
) -> String {
    let items = if items.is_empty() {
        String::new()
    } else {
        format!("{items}\n")
    };
    format!(
        "Hello\n\n\
         A {label_plural} purchase has been made.\n\n\
         {label_plural} sold:\n\n\
         {items}\n\
         Purchased by:  {buyer_name}\n\
         Amount:  {amount}\n\n\
         Payment Method:  {gateway}\n\n\
         Thank you"
    )
}
