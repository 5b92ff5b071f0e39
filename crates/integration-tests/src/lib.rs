//! Integration tests for Downpour.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p downpour-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `resolution` - Buyer names, admin recipients, line items, and tag rendering
//! - `receipt_flow` - Receipts, sale notices, and test receipts through an outbox
//!
//! This crate holds the shared fixtures: an in-memory [`MemoryStore`] and
//! payment builders. No network or database is needed.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use downpour_core::{
    CurrencyCode, DownloadId, LineItem, Payment, PaymentId, Price, PriceOptionId, UserId, UserInfo,
};
use downpour_mailer::{MailSettings, NotificationComposer, Outbox, Storefront};
use rust_decimal::Decimal;

/// In-memory storefront.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    payments: HashMap<PaymentId, Payment>,
    users: HashMap<UserId, String>,
    titles: HashMap<DownloadId, String>,
    price_options: HashMap<(DownloadId, PriceOptionId), String>,
    gateways: HashMap<String, String>,
    currency: CurrencyCode,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_payment(mut self, payment: Payment) -> Self {
        self.payments.insert(payment.id, payment);
        self
    }

    #[must_use]
    pub fn with_user(mut self, id: i32, display_name: &str) -> Self {
        self.users.insert(UserId::new(id), display_name.to_string());
        self
    }

    #[must_use]
    pub fn with_download(mut self, id: i32, title: &str) -> Self {
        self.titles.insert(DownloadId::new(id), title.to_string());
        self
    }

    #[must_use]
    pub fn with_price_option(mut self, download: i32, option: i32, name: &str) -> Self {
        self.price_options.insert(
            (DownloadId::new(download), PriceOptionId::new(option)),
            name.to_string(),
        );
        self
    }

    #[must_use]
    pub fn with_gateway(mut self, id: &str, label: &str) -> Self {
        self.gateways.insert(id.to_string(), label.to_string());
        self
    }

    #[must_use]
    pub const fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = currency;
        self
    }
}

impl Storefront for MemoryStore {
    fn payment(&self, id: PaymentId) -> Option<Payment> {
        self.payments.get(&id).cloned()
    }

    fn user_display_name(&self, id: UserId) -> String {
        self.users.get(&id).cloned().unwrap_or_default()
    }

    fn download_title(&self, id: DownloadId) -> String {
        self.titles.get(&id).cloned().unwrap_or_default()
    }

    fn price_option_name(
        &self,
        download: DownloadId,
        price_option: PriceOptionId,
        _payment: PaymentId,
    ) -> String {
        self.price_options
            .get(&(download, price_option))
            .cloned()
            .unwrap_or_default()
    }

    fn gateway_label(&self, gateway: &str) -> String {
        self.gateways
            .get(gateway)
            .cloned()
            .unwrap_or_else(|| gateway.to_string())
    }

    fn format_currency(&self, amount: Decimal) -> String {
        Price::new(amount, self.currency).display()
    }
}

/// Fixed purchase timestamp: March 14, 2026 09:30 UTC.
#[must_use]
pub fn purchase_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
        .single()
        .unwrap_or_default()
}

/// Guest checkout with first and last name.
#[must_use]
pub fn guest(first: &str, last: &str, email: &str) -> UserInfo {
    UserInfo {
        id: None,
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        email: email.to_string(),
    }
}

/// A payment through `gateway` for `amount` (in cents) buying `downloads`.
#[must_use]
pub fn payment(
    id: i32,
    user_info: UserInfo,
    cents: i64,
    gateway: &str,
    downloads: Vec<LineItem>,
) -> Payment {
    Payment {
        id: PaymentId::new(id),
        amount: Decimal::new(cents, 2),
        date: purchase_date(),
        gateway: gateway.to_string(),
        email: user_info.email.clone(),
        purchase_key: None,
        user_info,
        downloads,
    }
}

/// Settings for a store named "Downpour" administered by `owner@downpour.test`.
#[must_use]
pub fn settings() -> MailSettings {
    MailSettings::new("Downpour", "owner@downpour.test")
}

/// A composer over `store` whose sends land in the returned outbox.
#[must_use]
pub fn composer(
    store: MemoryStore,
    settings: MailSettings,
) -> (NotificationComposer<MemoryStore, Outbox>, Outbox) {
    let outbox = Outbox::new();
    (
        NotificationComposer::new(store, outbox.clone(), settings),
        outbox,
    )
}
