//! Plain-text cleanup for values that end up outside HTML.

use std::borrow::Cow;

const ENTITIES: [(&str, &str); 6] = [
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#039;", "'"),
    ("&#39;", "'"),
    // Last, so `&amp;lt;` decodes to `&lt;` rather than `<`
    ("&amp;", "&"),
];

/// Decode the HTML entities stores commonly write into titles and names.
#[must_use]
pub fn decode_entities(value: &str) -> Cow<'_, str> {
    if !value.contains('&') {
        return Cow::Borrowed(value);
    }
    let mut decoded = value.to_string();
    for (entity, plain) in ENTITIES {
        if decoded.contains(entity) {
            decoded = decoded.replace(entity, plain);
        }
    }
    Cow::Owned(decoded)
}

/// Remove escaping backslashes (`\'` becomes `'`, `\\` becomes `\`).
#[must_use]
pub fn strip_slashes(value: &str) -> Cow<'_, str> {
    if !value.contains('\\') {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}
