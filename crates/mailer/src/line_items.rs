//! Plain-text purchase lists.

use downpour_core::{LineItem, PaymentId};

use crate::store::Storefront;

/// One line per purchased item, in purchase order.
///
/// Items with a selected price option read `"{title} - {option}"`. An empty
/// purchase yields an empty string.
pub fn format_line_items<S>(store: &S, payment_id: PaymentId, items: &[LineItem]) -> String
where
    S: Storefront + ?Sized,
{
    items
        .iter()
        .map(|item| {
            let title = store.download_title(item.id);
            match item.price_id {
                Some(price_id) => {
                    let option = store.price_option_name(item.id, price_id, payment_id);
                    format!("{title} - {option}")
                }
                None => title,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
