//! Lookups the mailer needs from the rest of the store.

use downpour_core::{DownloadId, Payment, PaymentId, PriceOptionId, UserId};
use rust_decimal::Decimal;

/// Read access to payments, users, catalog data, and store formatting.
///
/// Lookups are infallible by contract: a missing user or download yields
/// whatever the implementation considers a blank value (usually an empty
/// string), and the mailer passes it through unchanged. Only a missing
/// payment stops a notification.
pub trait Storefront {
    /// Load a payment and its metadata.
    fn payment(&self, id: PaymentId) -> Option<Payment>;

    /// Display name stored on a user account.
    fn user_display_name(&self, id: UserId) -> String;

    /// Title of a download.
    fn download_title(&self, id: DownloadId) -> String;

    /// Name of the price option a buyer selected for a download.
    fn price_option_name(
        &self,
        download: DownloadId,
        price_option: PriceOptionId,
        payment: PaymentId,
    ) -> String;

    /// Admin-facing label for a payment gateway identifier.
    fn gateway_label(&self, gateway: &str) -> String;

    /// Format an amount in the store currency, e.g. `$9.99`.
    fn format_currency(&self, amount: Decimal) -> String;
}

impl<S: Storefront + ?Sized> Storefront for &S {
    fn payment(&self, id: PaymentId) -> Option<Payment> {
        (**self).payment(id)
    }

    fn user_display_name(&self, id: UserId) -> String {
        (**self).user_display_name(id)
    }

    fn download_title(&self, id: DownloadId) -> String {
        (**self).download_title(id)
    }

    fn price_option_name(
        &self,
        download: DownloadId,
        price_option: PriceOptionId,
        payment: PaymentId,
    ) -> String {
        (**self).price_option_name(download, price_option, payment)
    }

    fn gateway_label(&self, gateway: &str) -> String {
        (**self).gateway_label(gateway)
    }

    fn format_currency(&self, amount: Decimal) -> String {
        (**self).format_currency(amount)
    }
}

/// In-memory storefront shared by unit tests.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod fake {
    use std::collections::HashMap;

    use chrono::{TimeZone, Utc};
    use downpour_core::{CurrencyCode, LineItem, Price, UserInfo};

    use super::*;

    #[derive(Debug, Default)]
    pub struct FakeStore {
        pub payments: HashMap<PaymentId, Payment>,
        pub users: HashMap<UserId, String>,
        pub titles: HashMap<DownloadId, String>,
        pub price_options: HashMap<(DownloadId, PriceOptionId), String>,
    }

    impl FakeStore {
        pub fn with_payment(mut self, payment: Payment) -> Self {
            self.payments.insert(payment.id, payment);
            self
        }

        pub fn with_user(mut self, id: i32, name: &str) -> Self {
            self.users.insert(UserId::new(id), name.to_string());
            self
        }

        pub fn with_title(mut self, id: i32, title: &str) -> Self {
            self.titles.insert(DownloadId::new(id), title.to_string());
            self
        }

        pub fn with_price_option(mut self, id: i32, option: i32, name: &str) -> Self {
            self.price_options.insert(
                (DownloadId::new(id), PriceOptionId::new(option)),
                name.to_string(),
            );
            self
        }
    }

    impl Storefront for FakeStore {
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
            match gateway {
                "stripe" => "Stripe".to_string(),
                "manual" => "Test Payment".to_string(),
                other => other.to_string(),
            }
        }

        fn format_currency(&self, amount: Decimal) -> String {
            Price::new(amount, CurrencyCode::USD).display()
        }
    }

    /// Guest payment for Jane Doe buying download 1.
    pub fn jane_payment(id: i32) -> Payment {
        Payment {
            id: PaymentId::new(id),
            amount: Decimal::new(1999, 2),
            date: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
            gateway: "stripe".to_string(),
            email: "jane@x.com".to_string(),
            purchase_key: Some("a1b2c3".to_string()),
            user_info: UserInfo {
                id: None,
                first_name: Some("Jane".to_string()),
                last_name: Some("Doe".to_string()),
                email: "jane@x.com".to_string(),
            },
            downloads: vec![LineItem::new(DownloadId::new(1))],
        }
    }
}
