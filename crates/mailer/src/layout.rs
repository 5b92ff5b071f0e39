//! HTML boilerplate wrapped around receipt content.

use askama::Template;
use chrono::{Datelike, Utc};

/// Opening boilerplate for receipt emails.
#[derive(Template)]
#[template(path = "email/receipt_header.html")]
struct ReceiptHeader<'a> {
    site_name: &'a str,
}

/// Closing boilerplate for receipt emails.
#[derive(Template)]
#[template(path = "email/receipt_footer.html")]
struct ReceiptFooter<'a> {
    site_name: &'a str,
    year: i32,
}

/// Wrap rendered receipt content in the header and footer.
///
/// `content` is inserted as-is; only the site name is escaped.
///
/// # Errors
///
/// Returns error if either template fails to render.
pub fn wrap_receipt(site_name: &str, content: &str) -> Result<String, askama::Error> {
    let header = ReceiptHeader { site_name }.render()?;
    let footer = ReceiptFooter {
        site_name,
        year: Utc::now().year(),
    }
    .render()?;

    let mut body = String::with_capacity(header.len() + content.len() + footer.len());
    body.push_str(&header);
    body.push_str(content);
    body.push_str(&footer);
    Ok(body)
}
