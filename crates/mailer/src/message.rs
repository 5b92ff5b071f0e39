//! Composed messages handed to a transport.
//!
//! A message is built once per notification, passed through hooks, sent,
//! and dropped. Nothing here is persisted.

use std::fmt;
use std::path::{Path, PathBuf};

/// A fully composed email, ready for a [`crate::MailTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    /// Recipient addresses, in send order.
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    pub headers: MailHeaders,
    pub attachments: Vec<Attachment>,
}

/// Ordered header list. Names compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailHeaders(Vec<(String, String)>);

impl MailHeaders {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a header, keeping any existing header with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.push((name.into(), value.into()));
        self
    }

    /// Set a header, replacing the first existing one with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            Some(existing) => existing.1 = value,
            None => self.0.push((name, value)),
        }
        self
    }

    /// First value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Remove every header named `name`.
    pub fn remove(&mut self, name: &str) {
        self.0.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Raw header block, one `Name: value` line per header, CRLF terminated.
impl fmt::Display for MailHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.0 {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

/// A file on disk to attach to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    path: PathBuf,
}

impl Attachment {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name shown to the recipient.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| "attachment".to_string(), |n| n.to_string_lossy().into_owned())
    }
}
