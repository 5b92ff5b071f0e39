//! SMTP delivery via lettre.

use lettre::{
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment as AttachmentPart, Mailbox, Mailboxes, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use secrecy::ExposeSecret;

use super::MailTransport;
use crate::config::SmtpConfig;
use crate::error::TransportError;
use crate::message::{Attachment, ComposedMessage, MailHeaders};

/// Headers lettre writes itself.
const GENERATED_HEADERS: [&str; 2] = ["MIME-Version", "Content-Transfer-Encoding"];

/// Async SMTP transport (STARTTLS relay, or plain SMTP for local catchers).
#[derive(Clone)]
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Create a new SMTP transport from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay cannot be configured.
    pub fn new(config: &SmtpConfig) -> Result<Self, TransportError> {
        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );

        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        } else {
            tracing::warn!(host = %config.host, "SMTP STARTTLS disabled, sending in plain text");
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };
        let mailer = builder.port(config.port).credentials(credentials).build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Translate a composed message into a lettre message.
    ///
    /// `From`, `Reply-To`, `Cc`, `Bcc`, and `Content-Type` are mapped onto
    /// the builder. Any other header is dropped with a debug log. Recipients
    /// that do not parse are skipped; the message fails only when none are
    /// left.
    async fn build_message(&self, message: &ComposedMessage) -> Result<Message, TransportError> {
        let headers = &message.headers;
        let from = headers.get("From").unwrap_or(self.from_address.as_str());

        let mut builder = Message::builder()
            .from(parse_mailbox(from)?)
            .subject(message.subject.as_str());

        let mut recipients = 0;
        for to in &message.to {
            match parse_mailbox(to) {
                Ok(mailbox) => {
                    builder = builder.to(mailbox);
                    recipients += 1;
                }
                Err(e) => tracing::warn!(recipient = %to, error = %e, "Skipping unusable recipient"),
            }
        }
        if recipients == 0 {
            return Err(TransportError::InvalidAddress(message.to.join(", ")));
        }
        if let Some(reply_to) = headers.get("Reply-To") {
            builder = builder.reply_to(parse_mailbox(reply_to)?);
        }
        if let Some(cc) = headers.get("Cc") {
            for mailbox in parse_mailboxes(cc)? {
                builder = builder.cc(mailbox);
            }
        }
        if let Some(bcc) = headers.get("Bcc") {
            for mailbox in parse_mailboxes(bcc)? {
                builder = builder.bcc(mailbox);
            }
        }
        log_dropped_headers(headers);

        let body = SinglePart::builder()
            .header(body_content_type(headers))
            .body(message.body.clone());

        if message.attachments.is_empty() {
            return Ok(builder.singlepart(body)?);
        }

        let mut parts = MultiPart::mixed().singlepart(body);
        for attachment in &message.attachments {
            parts = parts.singlepart(read_attachment(attachment).await?);
        }
        Ok(builder.multipart(parts)?)
    }
}

impl MailTransport for SmtpMailer {
    async fn send(&self, message: ComposedMessage) -> Result<(), TransportError> {
        let email = self.build_message(&message).await?;
        self.mailer.send(email).await?;

        tracing::info!(
            to = ?message.to,
            subject = %message.subject,
            attachments = message.attachments.len(),
            "Email sent successfully"
        );
        Ok(())
    }
}

/// Parse `Name <addr>` or a bare address.
///
/// Display names lettre refuses unquoted (commas, dots) are split off by
/// hand and kept as-is.
fn parse_mailbox(value: &str) -> Result<Mailbox, TransportError> {
    if let Ok(mailbox) = value.trim().parse::<Mailbox>() {
        return Ok(mailbox);
    }

    let invalid = || TransportError::InvalidAddress(value.to_string());
    let (name, rest) = value.rsplit_once('<').ok_or_else(invalid)?;
    let address = rest
        .trim_end()
        .strip_suffix('>')
        .ok_or_else(invalid)?
        .trim()
        .parse::<Address>()
        .map_err(|_| invalid())?;
    let name = name.trim().trim_matches('"');

    Ok(Mailbox::new(
        (!name.is_empty()).then(|| name.to_string()),
        address,
    ))
}

fn parse_mailboxes(value: &str) -> Result<Mailboxes, TransportError> {
    value
        .parse::<Mailboxes>()
        .map_err(|_| TransportError::InvalidAddress(value.to_string()))
}

fn body_content_type(headers: &MailHeaders) -> ContentType {
    let is_html = headers
        .get("Content-Type")
        .is_some_and(|value| value.to_ascii_lowercase().contains("text/html"));
    if is_html {
        ContentType::TEXT_HTML
    } else {
        ContentType::TEXT_PLAIN
    }
}

fn log_dropped_headers(headers: &MailHeaders) {
    const MAPPED: [&str; 5] = ["From", "Reply-To", "Cc", "Bcc", "Content-Type"];

    for (name, value) in headers.iter() {
        let known = MAPPED
            .iter()
            .chain(GENERATED_HEADERS.iter())
            .any(|h| h.eq_ignore_ascii_case(name));
        if !known {
            tracing::debug!(header = %name, value = %value, "Dropping unsupported header");
        }
    }
}

async fn read_attachment(attachment: &Attachment) -> Result<SinglePart, TransportError> {
    let bytes = tokio::fs::read(attachment.path())
        .await
        .map_err(|source| TransportError::Attachment {
            path: attachment.path().to_path_buf(),
            source,
        })?;
    let content_type = ContentType::parse("application/octet-stream")
        .map_err(|e| TransportError::ContentType(e.to_string()))?;

    Ok(AttachmentPart::new(attachment.file_name()).body(bytes, content_type))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn mailer() -> SmtpMailer {
        SmtpMailer::new(&SmtpConfig {
            host: "smtp.downpour.test".to_string(),
            port: 587,
            username: "mailer".to_string(),
            password: SecretString::from("password".to_string()),
            from_address: "receipts@downpour.test".to_string(),
            starttls: false,
        })
        .unwrap()
    }

    fn message(headers: MailHeaders) -> ComposedMessage {
        ComposedMessage {
            to: vec!["jane@x.com".to_string(), "ops@x.com".to_string()],
            subject: "Purchase Receipt".to_string(),
            body: "<p>Dear Jane Doe,</p>".to_string(),
            headers,
            attachments: Vec::new(),
        }
    }

    fn formatted(message: &Message) -> String {
        String::from_utf8(message.formatted()).unwrap()
    }

    #[test]
    fn test_parse_mailbox_forms() {
        let bare = parse_mailbox("jane@x.com").unwrap();
        assert_eq!(bare.email.to_string(), "jane@x.com");
        assert_eq!(bare.name, None);

        let named = parse_mailbox("Downpour <owner@downpour.test>").unwrap();
        assert_eq!(named.name.as_deref(), Some("Downpour"));

        let punctuated = parse_mailbox("Pat's Shop, Inc. <owner@downpour.test>").unwrap();
        assert_eq!(punctuated.email.to_string(), "owner@downpour.test");

        assert!(matches!(
            parse_mailbox("not an address"),
            Err(TransportError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_build_html_message_from_headers() {
        let mut headers = MailHeaders::new();
        headers
            .append("From", "Downpour <owner@downpour.test>")
            .append("Reply-To", "owner@downpour.test")
            .append("MIME-Version", "1.0")
            .append("Content-Type", "text/html; charset=utf-8");

        let built = mailer().build_message(&message(headers)).await.unwrap();
        let raw = formatted(&built);

        assert!(raw.contains("From: Downpour <owner@downpour.test>"));
        assert!(raw.contains("Reply-To: owner@downpour.test"));
        assert!(raw.contains("Content-Type: text/html"));
        assert!(raw.contains("ops@x.com"));
    }

    #[tokio::test]
    async fn test_build_falls_back_to_configured_sender_and_plain_text() {
        let built = mailer()
            .build_message(&message(MailHeaders::new()))
            .await
            .unwrap();
        let raw = formatted(&built);

        assert!(raw.contains("From: receipts@downpour.test"));
        assert!(raw.contains("Content-Type: text/plain"));
    }

    #[tokio::test]
    async fn test_missing_attachment_is_reported() {
        let mut msg = message(MailHeaders::new());
        msg.attachments
            .push(Attachment::new("/nonexistent/downpour/license.pdf"));

        let err = mailer().build_message(&msg).await.unwrap_err();
        assert!(matches!(err, TransportError::Attachment { .. }));
    }

    #[tokio::test]
    async fn test_no_recipients_fails_to_build() {
        let mut msg = message(MailHeaders::new());
        msg.to.clear();

        let err = mailer().build_message(&msg).await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn test_blank_recipient_is_skipped() {
        let mut msg = message(MailHeaders::new());
        msg.to = vec!["a@x.com".to_string(), String::new(), "b@x.com".to_string()];

        let built = mailer().build_message(&msg).await.unwrap();
        let raw = formatted(&built);

        assert!(raw.contains("a@x.com"));
        assert!(raw.contains("b@x.com"));
        assert_eq!(built.envelope().to().len(), 2);
    }

    #[tokio::test]
    async fn test_only_unusable_recipients_fails() {
        let mut msg = message(MailHeaders::new());
        msg.to = vec![String::new(), "not an address".to_string()];

        let err = mailer().build_message(&msg).await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidAddress(_)));
    }
}
