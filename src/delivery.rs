//! Mail delivery of an encoded composite.
//!
//! Builds one message per send: fixed subject, a one-line plain-text body, and
//! the image as a single attachment named `<stem>.<ext>`. Sending goes through
//! any `lettre::Transport`; production uses a STARTTLS [`SmtpTransport`] with
//! a bounded timeout, tests use `lettre`'s stub transport.

use crate::config::MailConfig;
use crate::imaging::EncodedImage;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;
use tracing::{debug, info};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("invalid {role} address '{address}': {source}")]
    Address {
        role: &'static str,
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("cannot build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("mail is not configured: {0}")]
    NotConfigured(String),
    #[error("SMTP password missing: set the {0} environment variable")]
    MissingPassword(String),
    #[error("delivery to {recipient} failed: {source}")]
    Transport {
        recipient: String,
        #[source]
        source: BoxError,
    },
}

/// Plain-text body sent with every attachment.
pub const BODY_TEXT: &str = "Your captioned image is attached.";

fn parse_mailbox(role: &'static str, address: &str) -> Result<Mailbox, DeliveryError> {
    address.trim().parse().map_err(|source| DeliveryError::Address {
        role,
        address: address.to_string(),
        source,
    })
}

/// Assemble the message for `image`, attached as `<stem>.<ext>`.
pub fn build_message(
    from: &str,
    to: &str,
    subject: &str,
    image: &EncodedImage,
    stem: &str,
) -> Result<Message, DeliveryError> {
    let from = parse_mailbox("sender", from)?;
    let to = parse_mailbox("recipient", to)?;
    let content_type = ContentType::parse(image.format.mime_type())
        .map_err(|e| DeliveryError::NotConfigured(format!("bad MIME type: {e}")))?;
    let attachment =
        Attachment::new(image.format.file_name(stem)).body(image.bytes.clone(), content_type);

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(BODY_TEXT.to_string()))
                .singlepart(attachment),
        )?;
    Ok(message)
}

/// SMTP credentials from config, with the password looked up by `lookup`.
fn credentials(
    config: &MailConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Credentials, DeliveryError> {
    if config.username.trim().is_empty() {
        return Err(DeliveryError::NotConfigured("mail.username is empty".into()));
    }
    let password = lookup(&config.password_env)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| DeliveryError::MissingPassword(config.password_env.clone()))?;
    Ok(Credentials::new(config.username.clone(), password))
}

/// Sends encoded images as mail attachments.
pub struct Mailer<T = SmtpTransport> {
    transport: T,
    from: String,
    subject: String,
}

impl Mailer<SmtpTransport> {
    /// STARTTLS relay from config. The password comes from the environment.
    pub fn from_config(config: &MailConfig) -> Result<Self, DeliveryError> {
        Self::from_config_with(config, |var| std::env::var(var).ok())
    }

    fn from_config_with(
        config: &MailConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, DeliveryError> {
        if config.host.trim().is_empty() {
            return Err(DeliveryError::NotConfigured("mail.host is empty".into()));
        }
        let credentials = credentials(config, lookup)?;
        let transport = SmtpTransport::starttls_relay(&config.host)
            .map_err(|e| DeliveryError::NotConfigured(format!("relay {}: {e}", config.host)))?
            .port(config.port)
            .credentials(credentials)
            .timeout(Some(config.timeout()))
            .build();
        debug!(host = %config.host, port = config.port, "SMTP transport ready");
        Ok(Self::with_transport(transport, config.sender(), &config.subject))
    }
}

impl<T> Mailer<T>
where
    T: Transport,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    pub fn with_transport(transport: T, from: &str, subject: &str) -> Self {
        Self {
            transport,
            from: from.to_string(),
            subject: subject.to_string(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `image` to `recipient` as `<stem>.<ext>`.
    pub fn send(
        &self,
        recipient: &str,
        image: &EncodedImage,
        stem: &str,
    ) -> Result<(), DeliveryError> {
        let message = build_message(&self.from, recipient, &self.subject, image, stem)?;
        self.transport
            .send(&message)
            .map_err(|e| DeliveryError::Transport {
                recipient: recipient.to_string(),
                source: Box::new(e),
            })?;
        info!(
            recipient,
            attachment = %image.format.file_name(stem),
            bytes = image.bytes.len(),
            "mail sent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{OutputFormat, Quality, encode};
    use crate::test_helpers::opaque_gradient;
    use lettre::transport::stub::StubTransport;

    fn png() -> EncodedImage {
        encode(&opaque_gradient(8, 8), OutputFormat::Png, Quality::default()).unwrap()
    }

    fn formatted(message: &Message) -> String {
        String::from_utf8_lossy(&message.formatted()).to_string()
    }

    #[test]
    fn message_has_subject_recipient_and_attachment() {
        let message = build_message(
            "bot@example.com",
            "friend@example.org",
            "Image Attachment",
            &png(),
            "cat",
        )
        .unwrap();
        let raw = formatted(&message);
        assert!(raw.contains("Subject: Image Attachment"));
        assert!(raw.contains("To: friend@example.org"));
        assert!(raw.contains("From: bot@example.com"));
        assert!(raw.contains("Content-Type: image/png"));
        assert!(raw.contains("filename=\"cat.png\""));
        assert!(raw.contains(BODY_TEXT));
    }

    #[test]
    fn attachment_name_uses_canonical_extension() {
        let jpeg = encode(&opaque_gradient(8, 8), OutputFormat::Jpeg, Quality::default()).unwrap();
        let message =
            build_message("bot@example.com", "friend@example.org", "s", &jpeg, "cat").unwrap();
        let raw = formatted(&message);
        assert!(raw.contains("filename=\"cat.jpeg\""));
        assert!(raw.contains("Content-Type: image/jpeg"));
    }

    #[test]
    fn bad_recipient_is_rejected() {
        let result = build_message("bot@example.com", "not an address", "s", &png(), "cat");
        assert!(matches!(
            result,
            Err(DeliveryError::Address { role: "recipient", .. })
        ));
    }

    #[test]
    fn send_goes_through_transport() {
        let mailer = Mailer::with_transport(
            StubTransport::new_ok(),
            "bot@example.com",
            "Image Attachment",
        );
        mailer.send("friend@example.org", &png(), "cat").unwrap();

        let sent = mailer.transport().messages();
        assert_eq!(sent.len(), 1);
        let (envelope, raw) = &sent[0];
        assert_eq!(envelope.to().len(), 1);
        assert_eq!(envelope.to()[0].to_string(), "friend@example.org");
        assert!(raw.contains("filename=\"cat.png\""));
    }

    #[test]
    fn transport_failure_is_reported() {
        let mailer = Mailer::with_transport(StubTransport::new_error(), "bot@example.com", "s");
        let result = mailer.send("friend@example.org", &png(), "cat");
        assert!(matches!(result, Err(DeliveryError::Transport { .. })));
    }

    #[test]
    fn credentials_need_username_and_password() {
        let mut config = MailConfig::default();
        assert!(matches!(
            credentials(&config, |_| Some("secret".into())),
            Err(DeliveryError::NotConfigured(_))
        ));

        config.username = "me@example.com".into();
        assert!(matches!(
            credentials(&config, |_| None),
            Err(DeliveryError::MissingPassword(var)) if var == "CAPTION_PRESS_SMTP_PASSWORD"
        ));
        assert!(credentials(&config, |_| Some(String::new())).is_err());
        assert!(credentials(&config, |_| Some("secret".into())).is_ok());
    }

    #[test]
    fn from_config_reads_named_variable() {
        let config = MailConfig {
            username: "me@example.com".into(),
            password_env: "MY_SMTP_PW".into(),
            ..MailConfig::default()
        };
        let mailer = Mailer::from_config_with(&config, |var| {
            (var == "MY_SMTP_PW").then(|| "secret".to_string())
        })
        .unwrap();
        assert_eq!(mailer.from, "me@example.com");
        assert_eq!(mailer.subject, "Image Attachment");
    }
}
