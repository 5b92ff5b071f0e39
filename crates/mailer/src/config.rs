//! Mailer configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DOWNPOUR_SITE_NAME` - Store name, used for `{sitename}` and as the default sender name
//! - `DOWNPOUR_ADMIN_EMAIL` - Site administrator address, the fallback for every admin notice
//!
//! ## Optional
//! - `DOWNPOUR_LABEL_PLURAL` - Plural product label (default: Downloads)
//! - `DOWNPOUR_FROM_NAME` - Receipt sender name (default: site name)
//! - `DOWNPOUR_FROM_EMAIL` - Receipt sender address (default: admin email)
//! - `DOWNPOUR_PURCHASE_SUBJECT` - Receipt subject template (default: Purchase Receipt)
//! - `DOWNPOUR_PURCHASE_RECEIPT` - Receipt body template
//! - `DOWNPOUR_ADMIN_NOTICE_EMAILS` - Sale notice recipients, one per line (`\n` escapes accepted)
//!
//! ## Optional (SMTP - all of host, username, password, and from are needed together)
//! - `SMTP_HOST` - SMTP server hostname
//! - `SMTP_PORT` - SMTP port (default: 587)
//! - `SMTP_USERNAME` - SMTP authentication username
//! - `SMTP_PASSWORD` - SMTP authentication password
//! - `SMTP_FROM` - Envelope sender used when a message carries no From header
//! - `SMTP_STARTTLS` - Set to `false` for local mail catchers (default: true)

use secrecy::SecretString;
use thiserror::Error;

/// Subject used when no purchase subject is configured.
pub const DEFAULT_PURCHASE_SUBJECT: &str = "Purchase Receipt";

/// Receipt body used when no template is configured.
pub const DEFAULT_PURCHASE_RECEIPT: &str = "Dear {name},\n\n\
Thank you for your purchase. Please click on the link(s) below to download your files.\n\n\
{download_list}\n\n\
{sitename}";

const DEFAULT_LABEL_PLURAL: &str = "Downloads";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Full mailer configuration.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Settings consulted while composing messages
    pub settings: MailSettings,
    /// SMTP delivery configuration (absent for dry runs)
    pub smtp: Option<SmtpConfig>,
}

/// Immutable settings threaded through the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub site: SiteSettings,
    pub notifications: NotificationSettings,
}

/// Site-wide defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSettings {
    /// Store name
    pub name: String,
    /// Site administrator address
    pub admin_email: String,
    /// Plural label for products, e.g. "Downloads"
    pub label_plural: String,
}

/// Notification options. Every field is optional and has a documented default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationSettings {
    pub from_name: Option<String>,
    pub from_email: Option<String>,
    pub purchase_subject: Option<String>,
    pub purchase_receipt: Option<String>,
    /// Raw newline-separated recipient list
    pub admin_notice_emails: Option<String>,
}

/// Email (SMTP) configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTP server hostname
    pub host: String,
    /// SMTP server port
    pub port: u16,
    /// SMTP authentication username
    pub username: String,
    /// SMTP authentication password
    pub password: SecretString,
    /// Sender used when a message has no From header
    pub from_address: String,
    /// Upgrade the connection with STARTTLS
    pub starttls: bool,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .field("starttls", &self.starttls)
            .finish()
    }
}

impl MailSettings {
    /// Settings with every notification option left at its default.
    pub fn new(site_name: impl Into<String>, admin_email: impl Into<String>) -> Self {
        Self {
            site: SiteSettings {
                name: site_name.into(),
                admin_email: admin_email.into(),
                label_plural: DEFAULT_LABEL_PLURAL.to_string(),
            },
            notifications: NotificationSettings::default(),
        }
    }

    #[must_use]
    pub fn with_label_plural(mut self, label: impl Into<String>) -> Self {
        self.site.label_plural = label.into();
        self
    }

    #[must_use]
    pub fn with_from_name(mut self, name: impl Into<String>) -> Self {
        self.notifications.from_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_from_email(mut self, email: impl Into<String>) -> Self {
        self.notifications.from_email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_purchase_subject(mut self, subject: impl Into<String>) -> Self {
        self.notifications.purchase_subject = Some(subject.into());
        self
    }

    #[must_use]
    pub fn with_purchase_receipt(mut self, template: impl Into<String>) -> Self {
        self.notifications.purchase_receipt = Some(template.into());
        self
    }

    #[must_use]
    pub fn with_admin_notice_emails(mut self, emails: impl Into<String>) -> Self {
        self.notifications.admin_notice_emails = Some(emails.into());
        self
    }

    /// Sender name, falling back to the site name.
    #[must_use]
    pub fn from_name(&self) -> &str {
        self.notifications
            .from_name
            .as_deref()
            .unwrap_or(&self.site.name)
    }

    /// Sender address, falling back to the site administrator address.
    #[must_use]
    pub fn from_email(&self) -> &str {
        self.notifications
            .from_email
            .as_deref()
            .unwrap_or(&self.site.admin_email)
    }

    /// Configured subject (trimmed) or the default.
    #[must_use]
    pub fn purchase_subject(&self) -> String {
        self.notifications
            .purchase_subject
            .as_deref()
            .map_or_else(|| DEFAULT_PURCHASE_SUBJECT.to_string(), |s| s.trim().to_string())
    }

    /// Configured receipt template or the default.
    #[must_use]
    pub fn purchase_receipt(&self) -> &str {
        self.notifications
            .purchase_receipt
            .as_deref()
            .unwrap_or(DEFAULT_PURCHASE_RECEIPT)
    }
}

impl MailerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let mut settings = MailSettings::new(
            vars.required("DOWNPOUR_SITE_NAME")?,
            vars.required("DOWNPOUR_ADMIN_EMAIL")?,
        );
        if let Some(label) = vars.optional("DOWNPOUR_LABEL_PLURAL") {
            settings.site.label_plural = label;
        }
        settings.notifications = NotificationSettings {
            from_name: vars.optional("DOWNPOUR_FROM_NAME"),
            from_email: vars.optional("DOWNPOUR_FROM_EMAIL"),
            purchase_subject: vars.optional("DOWNPOUR_PURCHASE_SUBJECT"),
            purchase_receipt: vars.optional("DOWNPOUR_PURCHASE_RECEIPT").map(unescape_newlines),
            admin_notice_emails: vars
                .optional("DOWNPOUR_ADMIN_NOTICE_EMAILS")
                .map(unescape_newlines),
        };

        let smtp = SmtpConfig::from_vars(&vars)?;

        Ok(Self { settings, smtp })
    }
}

impl SmtpConfig {
    fn from_vars<F>(vars: &Vars<F>) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(host) = vars.optional("SMTP_HOST") else {
            return Ok(None);
        };

        let port = vars
            .optional("SMTP_PORT")
            .unwrap_or_else(|| "587".to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SMTP_PORT".to_string(), e.to_string()))?;

        let starttls = vars
            .optional("SMTP_STARTTLS")
            .map_or(Ok(true), |value| match value.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                _ => Err(ConfigError::InvalidEnvVar(
                    "SMTP_STARTTLS".to_string(),
                    format!("expected true or false, got {value}"),
                )),
            })?;

        Ok(Some(Self {
            host,
            port,
            username: vars.required("SMTP_USERNAME")?,
            password: SecretString::from(vars.required("SMTP_PASSWORD")?),
            from_address: vars.required("SMTP_FROM")?,
            starttls,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable, treating empty values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }
}

/// Env files cannot hold raw newlines on one line, so `\n` is accepted.
fn unescape_newlines(value: String) -> String {
    if value.contains("\\n") {
        value.replace("\\n", "\n")
    } else {
        value
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<MailerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        MailerConfig::from_vars(|key| vars.get(key).cloned())
    }

    const SITE: [(&str, &str); 2] = [
        ("DOWNPOUR_SITE_NAME", "Downpour"),
        ("DOWNPOUR_ADMIN_EMAIL", "owner@downpour.test"),
    ];

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = load(&SITE).unwrap();
        let settings = &config.settings;

        assert_eq!(settings.site.label_plural, "Downloads");
        assert_eq!(settings.from_name(), "Downpour");
        assert_eq!(settings.from_email(), "owner@downpour.test");
        assert_eq!(settings.purchase_subject(), "Purchase Receipt");
        assert_eq!(settings.purchase_receipt(), DEFAULT_PURCHASE_RECEIPT);
        assert!(config.smtp.is_none());
    }

    #[test]
    fn test_missing_site_name() {
        let err = load(&[("DOWNPOUR_ADMIN_EMAIL", "owner@downpour.test")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "DOWNPOUR_SITE_NAME"));
    }

    #[test]
    fn test_admin_emails_unescape_newlines() {
        let mut pairs = SITE.to_vec();
        pairs.push(("DOWNPOUR_ADMIN_NOTICE_EMAILS", "a@x.com\\nb@x.com"));
        let config = load(&pairs).unwrap();

        assert_eq!(
            config.settings.notifications.admin_notice_emails.as_deref(),
            Some("a@x.com\nb@x.com")
        );
    }

    #[test]
    fn test_empty_values_are_unset() {
        let mut pairs = SITE.to_vec();
        pairs.push(("DOWNPOUR_FROM_NAME", ""));
        let config = load(&pairs).unwrap();

        assert_eq!(config.settings.notifications.from_name, None);
    }

    #[test]
    fn test_purchase_subject_is_trimmed() {
        let settings = MailSettings::new("Downpour", "owner@downpour.test")
            .with_purchase_subject("  Your {sitename} order  ");
        assert_eq!(settings.purchase_subject(), "Your {sitename} order");
    }

    #[test]
    fn test_smtp_config() {
        let mut pairs = SITE.to_vec();
        pairs.extend([
            ("SMTP_HOST", "smtp.downpour.test"),
            ("SMTP_PORT", "2525"),
            ("SMTP_USERNAME", "mailer"),
            ("SMTP_PASSWORD", "hunter2hunter2"),
            ("SMTP_FROM", "receipts@downpour.test"),
        ]);
        let smtp = load(&pairs).unwrap().smtp.unwrap();

        assert_eq!(smtp.port, 2525);
        assert!(smtp.starttls);
        assert_eq!(smtp.password.expose_secret(), "hunter2hunter2");
        assert!(!format!("{smtp:?}").contains("hunter2"));
    }

    #[test]
    fn test_smtp_requires_credentials_with_host() {
        let mut pairs = SITE.to_vec();
        pairs.push(("SMTP_HOST", "smtp.downpour.test"));
        let err = load(&pairs).unwrap_err();

        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "SMTP_USERNAME"));
    }

    #[test]
    fn test_smtp_starttls_flag() {
        let mut pairs = SITE.to_vec();
        pairs.extend([
            ("SMTP_HOST", "localhost"),
            ("SMTP_USERNAME", "mailer"),
            ("SMTP_PASSWORD", "password"),
            ("SMTP_FROM", "receipts@downpour.test"),
            ("SMTP_STARTTLS", "false"),
        ]);
        assert!(!load(&pairs).unwrap().smtp.unwrap().starttls);

        pairs.pop();
        pairs.push(("SMTP_STARTTLS", "maybe"));
        assert!(matches!(
            load(&pairs).unwrap_err(),
            ConfigError::InvalidEnvVar(key, _) if key == "SMTP_STARTTLS"
        ));
    }

    #[test]
    fn test_invalid_smtp_port() {
        let mut pairs = SITE.to_vec();
        pairs.extend([("SMTP_HOST", "smtp.downpour.test"), ("SMTP_PORT", "mail")]);
        let err = load(&pairs).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "SMTP_PORT"));
    }
}
