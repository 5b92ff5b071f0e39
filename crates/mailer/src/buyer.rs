//! Buyer display name resolution.

use downpour_core::{BuyerIdentity, UserInfo};

use crate::store::Storefront;

/// Name used to address the buyer.
///
/// A registered account's display name wins, then `"{first} {last}"` from
/// checkout, then the checkout email verbatim.
pub fn resolve_buyer_name<S>(store: &S, user_info: &UserInfo) -> String
where
    S: Storefront + ?Sized,
{
    match user_info.identity() {
        BuyerIdentity::Registered(user_id) => store.user_display_name(user_id),
        BuyerIdentity::NameParts { first, last } => format!("{first} {last}"),
        BuyerIdentity::EmailOnly(email) => email.to_string(),
    }
}

/// Checkout first and last name, when both were captured.
#[must_use]
pub fn checkout_full_name(user_info: &UserInfo) -> Option<String> {
    match (&user_info.first_name, &user_info.last_name) {
        (Some(first), Some(last)) => Some(format!("{first} {last}")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use downpour_core::UserId;

    use super::*;
    use crate::store::fake::FakeStore;

    fn user_info(id: Option<i32>, first: Option<&str>, last: Option<&str>, email: &str) -> UserInfo {
        UserInfo {
            id: id.map(UserId::new),
            first_name: first.map(String::from),
            last_name: last.map(String::from),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_registered_user_display_name_wins() {
        let store = FakeStore::default().with_user(7, "jdoe");
        let info = user_info(Some(7), Some("Jane"), Some("Doe"), "jane@x.com");

        assert_eq!(resolve_buyer_name(&store, &info), "jdoe");
    }

    #[test]
    fn test_guest_with_both_names() {
        let store = FakeStore::default();
        let info = user_info(None, Some("Jane"), Some("Doe"), "jane@x.com");

        assert_eq!(resolve_buyer_name(&store, &info), "Jane Doe");
    }

    #[test]
    fn test_zero_user_id_uses_names() {
        let store = FakeStore::default().with_user(0, "should not be used");
        let info = user_info(Some(0), Some("Jane"), Some("Doe"), "jane@x.com");

        assert_eq!(resolve_buyer_name(&store, &info), "Jane Doe");
    }

    #[test]
    fn test_empty_names_are_not_trimmed() {
        let store = FakeStore::default();
        let info = user_info(None, Some(""), Some("Doe"), "jane@x.com");

        assert_eq!(resolve_buyer_name(&store, &info), " Doe");
    }

    #[test]
    fn test_email_fallback() {
        let store = FakeStore::default();
        let info = user_info(None, None, Some("Doe"), "Jane.Doe@X.com");

        assert_eq!(resolve_buyer_name(&store, &info), "Jane.Doe@X.com");
    }

    #[test]
    fn test_missing_user_record_passes_through_blank() {
        let store = FakeStore::default();
        let info = user_info(Some(3), None, None, "jane@x.com");

        assert_eq!(resolve_buyer_name(&store, &info), "");
    }

    #[test]
    fn test_checkout_full_name() {
        let info = user_info(Some(3), Some("Jane"), Some("Doe"), "jane@x.com");
        assert_eq!(checkout_full_name(&info).as_deref(), Some("Jane Doe"));

        let info = user_info(None, Some("Jane"), None, "jane@x.com");
        assert_eq!(checkout_full_name(&info), None);
    }
}
