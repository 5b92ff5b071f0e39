//! Completed payment records.
//!
//! These are read-only to the notification layer: the payment processor
//! writes them, the mailer only reads them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{DownloadId, PaymentId, PriceOptionId, UserId};

/// A completed payment and its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    /// Total charged, in the store currency.
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    /// Gateway identifier (e.g. `stripe`, `paypal`, `manual`).
    pub gateway: String,
    /// Address the purchase receipt is sent to.
    pub email: String,
    #[serde(default)]
    pub purchase_key: Option<String>,
    pub user_info: UserInfo,
    #[serde(default)]
    pub downloads: Vec<LineItem>,
}

/// Buyer identity captured at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Account reference; guests have none or a non-positive value.
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: String,
}

impl UserInfo {
    /// Classify the buyer by the strongest identity source available.
    ///
    /// A registered account always wins over name fields, and name fields
    /// only count when both are present (empty strings included).
    #[must_use]
    pub fn identity(&self) -> BuyerIdentity<'_> {
        if let Some(user_id) = self.id.filter(UserId::is_registered) {
            return BuyerIdentity::Registered(user_id);
        }
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => BuyerIdentity::NameParts { first, last },
            _ => BuyerIdentity::EmailOnly(&self.email),
        }
    }
}

/// Identity source used to address the buyer, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuyerIdentity<'a> {
    /// A stored user account; its display name is looked up.
    Registered(UserId),
    /// Freeform first and last name from checkout.
    NameParts { first: &'a str, last: &'a str },
    /// Nothing but the checkout email.
    EmailOnly(&'a str),
}

/// One purchased download, optionally with a selected price option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: DownloadId,
    #[serde(default)]
    pub price_id: Option<PriceOptionId>,
}

impl LineItem {
    #[must_use]
    pub const fn new(id: DownloadId) -> Self {
        Self { id, price_id: None }
    }

    #[must_use]
    pub const fn with_price_option(id: DownloadId, price_id: PriceOptionId) -> Self {
        Self {
            id,
            price_id: Some(price_id),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn info(id: Option<i32>, first: Option<&str>, last: Option<&str>) -> UserInfo {
        UserInfo {
            id: id.map(UserId::new),
            first_name: first.map(String::from),
            last_name: last.map(String::from),
            email: "jane@x.com".to_string(),
        }
    }

    #[test]
    fn test_identity_registered_wins_over_names() {
        let user = info(Some(5), Some("Jane"), Some("Doe"));
        assert_eq!(user.identity(), BuyerIdentity::Registered(UserId::new(5)));
    }

    #[test]
    fn test_identity_non_positive_id_is_guest() {
        let user = info(Some(0), Some("Jane"), Some("Doe"));
        assert_eq!(
            user.identity(),
            BuyerIdentity::NameParts {
                first: "Jane",
                last: "Doe"
            }
        );
    }

    #[test]
    fn test_identity_empty_names_still_count() {
        let user = info(None, Some(""), Some(""));
        assert_eq!(
            user.identity(),
            BuyerIdentity::NameParts { first: "", last: "" }
        );
    }

    #[test]
    fn test_identity_single_name_falls_back_to_email() {
        let user = info(None, Some("Jane"), None);
        assert_eq!(user.identity(), BuyerIdentity::EmailOnly("jane@x.com"));
    }

    #[test]
    fn test_payment_deserializes_with_defaults() {
        let json = r#"{
            "id": 42,
            "amount": "19.99",
            "date": "2026-03-01T12:00:00Z",
            "gateway": "stripe",
            "email": "jane@x.com",
            "user_info": {"email": "jane@x.com"},
            "downloads": [{"id": 1}, {"id": 2, "price_id": 3}]
        }"#;
        let payment: Payment = serde_json::from_str(json).unwrap();

        assert_eq!(payment.id, PaymentId::new(42));
        assert_eq!(payment.amount, Decimal::new(1999, 2));
        assert_eq!(payment.purchase_key, None);
        assert_eq!(
            payment.downloads,
            vec![
                LineItem::new(DownloadId::new(1)),
                LineItem::with_price_option(DownloadId::new(2), PriceOptionId::new(3)),
            ]
        );
    }
}
