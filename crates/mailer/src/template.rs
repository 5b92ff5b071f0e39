//! `{tag}` substitution for receipt subjects and bodies.
//!
//! Templates are plain strings stored in settings, so there are no loops
//! or conditionals: a recognized `{tag}` is replaced by its value and
//! everything else, unknown tags included, is copied through verbatim.
//!
//! # Tags
//!
//! | Tag | Value |
//! |-----|-------|
//! | `{name}` | Buyer display name |
//! | `{fullname}` | Checkout first and last name, else the buyer display name |
//! | `{download_list}` | Purchased items, one per line |
//! | `{sitename}` | Store name |
//! | `{date}` | Payment date, e.g. `March 14, 2026` |
//! | `{price}` | Formatted payment amount |
//! | `{payment_id}` | Payment ID |
//! | `{receipt_id}` | Purchase key |
//! | `{payment_method}` | Gateway label |

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use downpour_core::Payment;

use crate::buyer::checkout_full_name;
use crate::config::SiteSettings;
use crate::line_items::format_line_items;
use crate::store::Storefront;

const DATE_FORMAT: &str = "%B %-d, %Y";

/// A recognized template tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateTag {
    Name,
    FullName,
    DownloadList,
    SiteName,
    Date,
    Price,
    PaymentId,
    ReceiptId,
    PaymentMethod,
}

impl TemplateTag {
    pub const ALL: [Self; 9] = [
        Self::Name,
        Self::FullName,
        Self::DownloadList,
        Self::SiteName,
        Self::Date,
        Self::Price,
        Self::PaymentId,
        Self::ReceiptId,
        Self::PaymentMethod,
    ];

    /// Name between the braces.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::FullName => "fullname",
            Self::DownloadList => "download_list",
            Self::SiteName => "sitename",
            Self::Date => "date",
            Self::Price => "price",
            Self::PaymentId => "payment_id",
            Self::ReceiptId => "receipt_id",
            Self::PaymentMethod => "payment_method",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == name)
    }
}

/// Values substituted for each tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    values: HashMap<TemplateTag, String>,
}

impl TemplateContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, tag: TemplateTag, value: impl Into<String>) -> Self {
        self.set(tag, value);
        self
    }

    pub fn set(&mut self, tag: TemplateTag, value: impl Into<String>) {
        self.values.insert(tag, value.into());
    }

    #[must_use]
    pub fn get(&self, tag: TemplateTag) -> Option<&str> {
        self.values.get(&tag).map(String::as_str)
    }

    /// Tag values for a real payment.
    ///
    /// `buyer_name` is passed in so the user lookup happens once per
    /// notification.
    pub fn for_payment<S>(store: &S, site: &SiteSettings, payment: &Payment, buyer_name: &str) -> Self
    where
        S: Storefront + ?Sized,
    {
        let full_name = checkout_full_name(&payment.user_info).unwrap_or_else(|| buyer_name.to_string());

        Self::new()
            .with(TemplateTag::Name, buyer_name)
            .with(TemplateTag::FullName, full_name)
            .with(
                TemplateTag::DownloadList,
                format_line_items(store, payment.id, &payment.downloads),
            )
            .with(TemplateTag::SiteName, site.name.as_str())
            .with(TemplateTag::Date, payment.date.format(DATE_FORMAT).to_string())
            .with(TemplateTag::Price, store.format_currency(payment.amount))
            .with(TemplateTag::PaymentId, payment.id.to_string())
            .with(
                TemplateTag::ReceiptId,
                payment.purchase_key.clone().unwrap_or_default(),
            )
            .with(TemplateTag::PaymentMethod, store.gateway_label(&payment.gateway))
    }

    /// Example values for previewing a template without a real payment.
    #[must_use]
    pub fn preview(site: &SiteSettings, price: String, now: DateTime<Utc>) -> Self {
        Self::new()
            .with(TemplateTag::Name, "John Doe")
            .with(TemplateTag::FullName, "John Doe")
            .with(
                TemplateTag::DownloadList,
                "Sample Product Title\nSample Product Title - Sample Price Option",
            )
            .with(TemplateTag::SiteName, site.name.as_str())
            .with(TemplateTag::Date, now.format(DATE_FORMAT).to_string())
            .with(TemplateTag::Price, price)
            .with(TemplateTag::PaymentId, "1234")
            .with(TemplateTag::ReceiptId, "preview-receipt")
            .with(TemplateTag::PaymentMethod, "Test Gateway")
    }
}

/// Replace every recognized `{tag}` in `template` with its value.
///
/// Single left-to-right pass: substituted values are never scanned for
/// tags. Unknown tags, tags without a value, and unbalanced braces are
/// copied through unchanged.
#[must_use]
pub fn render(template: &str, ctx: &TemplateContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let (literal, from_open) = rest.split_at(open);
        out.push_str(literal);
        let after_open = from_open.strip_prefix('{').unwrap_or(from_open);

        let closed = after_open
            .find(['{', '}'])
            .map(|end| after_open.split_at(end))
            .and_then(|(name, tail)| tail.strip_prefix('}').map(|tail| (name, tail)));

        match closed {
            Some((name, tail)) => {
                match TemplateTag::from_name(name).and_then(|tag| ctx.get(tag)) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = tail;
            }
            None => {
                out.push('{');
                rest = after_open;
            }
        }
    }

    out.push_str(rest);
    out
}
