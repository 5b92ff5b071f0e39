//! YAML store snapshot used as the CLI's storefront.
//!
//! # Format
//!
//! ```yaml
//! currency: USD
//! users:
//!   5: jdoe
//! downloads:
//!   1:
//!     title: E-Book
//!   2:
//!     title: Shirt
//!     price_options:
//!       3: Large
//! gateways:
//!   stripe: Stripe
//! payments:
//!   - id: 42
//!     amount: "19.99"
//!     date: 2026-03-14T09:30:00Z
//!     gateway: stripe
//!     email: jane@x.com
//!     user_info:
//!       first_name: Jane
//!       last_name: Doe
//!       email: jane@x.com
//!     downloads:
//!       - id: 1
//!       - id: 2
//!         price_id: 3
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use downpour_core::{
    CurrencyCode, DownloadId, Email, Payment, PaymentId, Price, PriceOptionId, UserId,
};
use downpour_mailer::Storefront;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Errors loading a snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid snapshot: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// A product as it appears in the snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadRecord {
    pub title: String,
    #[serde(default)]
    pub price_options: BTreeMap<PriceOptionId, String>,
}

/// Everything the mailer reads from a store, frozen into one file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StoreSnapshot {
    pub currency: CurrencyCode,
    /// Display names of registered accounts.
    pub users: BTreeMap<UserId, String>,
    pub downloads: BTreeMap<DownloadId, DownloadRecord>,
    /// Admin-facing gateway labels, keyed by gateway identifier.
    pub gateways: BTreeMap<String, String>,
    pub payments: Vec<Payment>,
}

impl StoreSnapshot {
    /// Read and parse a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not a valid snapshot.
    pub async fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_yaml(&content)
    }

    /// Parse a snapshot from YAML text.
    ///
    /// # Errors
    ///
    /// Returns error if the text is not a valid snapshot.
    pub fn from_yaml(content: &str) -> Result<Self, SnapshotError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Problems that would make a notification undeliverable or wrong.
    ///
    /// Returns one message per problem; an empty list means the snapshot is
    /// usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut seen = BTreeSet::new();
        for payment in &self.payments {
            if !seen.insert(payment.id) {
                errors.push(format!("payment {}: duplicate id", payment.id));
            }
            if let Err(e) = Email::parse(&payment.email) {
                errors.push(format!("payment {}: receipt email: {e}", payment.id));
            }
            for item in &payment.downloads {
                let Some(download) = self.downloads.get(&item.id) else {
                    errors.push(format!("payment {}: unknown download {}", payment.id, item.id));
                    continue;
                };
                if let Some(option) = item.price_id
                    && !download.price_options.contains_key(&option)
                {
                    errors.push(format!(
                        "payment {}: download {} has no price option {option}",
                        payment.id, item.id
                    ));
                }
            }
        }

        errors
    }
}

impl Storefront for StoreSnapshot {
    fn payment(&self, id: PaymentId) -> Option<Payment> {
        self.payments.iter().find(|p| p.id == id).cloned()
    }

    fn user_display_name(&self, id: UserId) -> String {
        self.users.get(&id).cloned().unwrap_or_default()
    }

    fn download_title(&self, id: DownloadId) -> String {
        self.downloads
            .get(&id)
            .map(|d| d.title.clone())
            .unwrap_or_default()
    }

    fn price_option_name(
        &self,
        download: DownloadId,
        price_option: PriceOptionId,
        _payment: PaymentId,
    ) -> String {
        self.downloads
            .get(&download)
            .and_then(|d| d.price_options.get(&price_option))
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use downpour_core::LineItem;

    use super::*;

    const SNAPSHOT: &str = r#"
currency: EUR
users:
  5: jdoe
downloads:
  1:
    title: E-Book
  2:
    title: Shirt
    price_options:
      3: Large
gateways:
  stripe: Stripe
payments:
  - id: 42
    amount: "1234.5"
    date: 2026-03-14T09:30:00Z
    gateway: stripe
    email: jane@x.com
    user_info:
      first_name: Jane
      last_name: Doe
      email: jane@x.com
    downloads:
      - id: 1
      - id: 2
        price_id: 3
"#;

    #[test]
    fn test_parse_snapshot() {
        let store = StoreSnapshot::from_yaml(SNAPSHOT).unwrap();

        let payment = store.payment(PaymentId::new(42)).unwrap();
        assert_eq!(payment.amount, Decimal::new(12345, 1));
        assert_eq!(
            payment.date,
            Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
        );
        assert_eq!(
            payment.downloads[1],
            LineItem::with_price_option(DownloadId::new(2), PriceOptionId::new(3))
        );
        assert!(store.payment(PaymentId::new(7)).is_none());
        assert!(store.validate().is_empty());
    }

    #[test]
    fn test_lookups() {
        let store = StoreSnapshot::from_yaml(SNAPSHOT).unwrap();

        assert_eq!(store.user_display_name(UserId::new(5)), "jdoe");
        assert_eq!(store.user_display_name(UserId::new(6)), "");
        assert_eq!(store.download_title(DownloadId::new(2)), "Shirt");
        assert_eq!(
            store.price_option_name(DownloadId::new(2), PriceOptionId::new(3), PaymentId::new(42)),
            "Large"
        );
        assert_eq!(store.gateway_label("stripe"), "Stripe");
        assert_eq!(store.gateway_label("paypal"), "paypal");
        assert_eq!(store.format_currency(Decimal::new(12345, 1)), "€1,234.50");
    }

    #[test]
    fn test_empty_snapshot_defaults() {
        let store = StoreSnapshot::from_yaml("{}").unwrap();

        assert_eq!(store.currency, CurrencyCode::USD);
        assert!(store.payments.is_empty());
        assert_eq!(store.format_currency(Decimal::new(5, 0)), "$5.00");
    }

    #[test]
    fn test_validate_reports_each_problem() {
        let yaml = r#"
downloads:
  1:
    title: E-Book
payments:
  - id: 1
    amount: "5"
    date: 2026-03-14T09:30:00Z
    gateway: manual
    email: not-an-address
    user_info:
      email: not-an-address
    downloads:
      - id: 1
        price_id: 9
      - id: 4
  - id: 1
    amount: "5"
    date: 2026-03-14T09:30:00Z
    gateway: manual
    email: jane@x.com
    user_info:
      email: jane@x.com
"#;
        let errors = StoreSnapshot::from_yaml(yaml).unwrap().validate();

        assert_eq!(
            errors,
            vec![
                "payment 1: receipt email: email must contain exactly one @ symbol",
                "payment 1: download 1 has no price option 9",
                "payment 1: unknown download 4",
                "payment 1: duplicate id",
            ]
        );
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = StoreSnapshot::load(Path::new("/nonexistent/downpour/store.yaml"))
            .await
            .unwrap_err();

        assert!(matches!(err, SnapshotError::Io { .. }));
    }
}
