//! Administrator recipient resolution.

use crate::config::MailSettings;
use crate::hooks::{HookContext, Hooks};

/// Sale notice recipients after the `admin_notice_emails` hook.
#[must_use]
pub fn resolve_admin_recipients(settings: &MailSettings, hooks: &Hooks) -> Vec<String> {
    let emails = configured_admin_emails(
        settings.notifications.admin_notice_emails.as_deref(),
        &settings.site.admin_email,
    );
    let emails = hooks.admin_notice_emails.apply(emails, &HookContext::none());
    tracing::debug!(recipients = ?emails, "Resolved admin notice recipients");
    emails
}

/// Split a configured recipient list, or fall back to the site address.
///
/// Entries are trimmed and kept in line order. Duplicates and malformed
/// addresses pass through untouched.
#[must_use]
pub fn configured_admin_emails(configured: Option<&str>, site_admin_email: &str) -> Vec<String> {
    match configured {
        Some(raw) if !raw.trim().is_empty() => {
            raw.split('\n').map(|line| line.trim().to_string()).collect()
        }
        _ => vec![site_admin_email.to_string()],
    }
}
