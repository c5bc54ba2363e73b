//! Outbound mail: message composition and the delivery seam.
//!
//! Delivery goes through the [`MessageSink`] trait so the dispatch pipeline
//! runs unchanged against live SMTP, an `.eml` directory for dry runs, or a
//! recording stub in tests.

use std::fs;
use std::path::{Path, PathBuf};

use lettre::address::AddressError;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::error::{Result, WorkflowError};

/// STARTTLS relay used for live sends.
pub const SMTP_HOST: &str = "smtp.gmail.com";
pub const SMTP_PORT: u16 = 587;
/// Provider domain the sender address must belong to.
pub const PROVIDER_DOMAIN: &str = "gmail.com";

pub const SUBJECT: &str = "Photoshoot takeout";
const ATTACHMENT_MIME: &str = "image/jpeg";
const BODY: &str = "Thanks again for participating! Attached to this e-mail you will find the pictures you have selected.\n\nDon't hesitate to contact me at [email] or [phone] if there's any issue or simply if you have some ideas for any future activity regarding photography :)\n";

/// One file ready to attach: its on-disk base name and contents.
pub struct FrameAttachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Where a composed message ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Stored(PathBuf),
}

/// Outbound mail capability.
pub trait MessageSink {
    fn deliver(&self, email: &str, message: &Message) -> Result<Delivery>;
}

/// Check the sender is a well-formed bare address on the required provider.
///
/// The string doubles as the SMTP login, so display-name forms are rejected
/// along with foreign domains.
pub fn validate_sender(address: &str, domain: &str) -> Result<Mailbox> {
    let mailbox: Mailbox = address.parse().map_err(|err: AddressError| {
        WorkflowError::InvalidSender {
            address: address.to_string(),
            reason: err.to_string(),
        }
    })?;
    let suffix = format!("@{}", domain.to_ascii_lowercase());
    if !address.trim().to_ascii_lowercase().ends_with(&suffix) {
        return Err(WorkflowError::InvalidSender {
            address: address.to_string(),
            reason: format!("expected an @{domain} address"),
        });
    }
    Ok(mailbox)
}

/// Parse a recipient address taken from a roster row.
pub fn recipient_mailbox(email: &str) -> Result<Mailbox> {
    email.parse().map_err(|err: AddressError| {
        WorkflowError::BadRecipient {
            email: email.to_string(),
            reason: err.to_string(),
        }
    })
}

/// Compose the fixed takeout message with one image attachment per frame.
pub fn compose(from: &Mailbox, to: &Mailbox, frames: Vec<FrameAttachment>) -> Result<Message> {
    let content_type = ContentType::parse(ATTACHMENT_MIME).map_err(WorkflowError::mail)?;
    let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(BODY.to_string()));
    for frame in frames {
        parts = parts.singlepart(
            Attachment::new(frame.file_name).body(frame.bytes, content_type.clone()),
        );
    }
    Message::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(SUBJECT)
        .multipart(parts)
        .map_err(WorkflowError::mail)
}

/// Live delivery through the provider's STARTTLS relay.
pub struct SmtpMailer {
    transport: SmtpTransport,
}

impl SmtpMailer {
    pub fn new(username: &str, password: String) -> Result<Self> {
        let transport = SmtpTransport::starttls_relay(SMTP_HOST)
            .map_err(WorkflowError::mail)?
            .port(SMTP_PORT)
            .credentials(Credentials::new(username.to_string(), password))
            .build();
        Ok(Self { transport })
    }
}

impl MessageSink for SmtpMailer {
    fn deliver(&self, email: &str, message: &Message) -> Result<Delivery> {
        self.transport.send(message).map_err(|err| WorkflowError::Mail {
            reason: format!("delivery to {email} failed: {err}"),
        })?;
        Ok(Delivery::Sent)
    }
}

/// Dry-run delivery: serialize each message into a directory.
pub struct EmlWriter {
    dir: PathBuf,
}

impl EmlWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl MessageSink for EmlWriter {
    fn deliver(&self, email: &str, message: &Message) -> Result<Delivery> {
        let path = next_free_path(&self.dir, email);
        fs::write(&path, message.formatted())
            .map_err(|err| WorkflowError::io(format!("write {}", path.display()), err))?;
        Ok(Delivery::Stored(path))
    }
}

/// `.eml` file name for a recipient: `@` becomes `_at_`.
pub fn eml_file_name(email: &str) -> String {
    format!("{}.eml", email.replace('@', "_at_"))
}

// The output directory starts empty, so a collision means the same address
// appears on several roster rows; suffix instead of overwriting.
fn next_free_path(dir: &Path, email: &str) -> PathBuf {
    let base = eml_file_name(email);
    let first = dir.join(&base);
    if !first.exists() {
        return first;
    }
    let stem = base.trim_end_matches(".eml").to_string();
    let mut n = 2;
    loop {
        let candidate = dir.join(format!("{stem}-{n}.eml"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailbox(addr: &str) -> Mailbox {
        addr.parse().expect("mailbox")
    }

    #[test]
    fn sender_must_be_on_the_provider_domain() {
        assert!(validate_sender("shooter@gmail.com", PROVIDER_DOMAIN).is_ok());
        assert!(validate_sender("Shooter@GMAIL.com", PROVIDER_DOMAIN).is_ok());

        let err = validate_sender("shooter@example.com", PROVIDER_DOMAIN).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidSender { .. }));
    }

    #[test]
    fn sender_must_be_a_bare_parseable_address() {
        for bad in ["not-an-address", "", "Shooter <shooter@gmail.com>"] {
            let err = validate_sender(bad, PROVIDER_DOMAIN).unwrap_err();
            assert!(
                matches!(err, WorkflowError::InvalidSender { .. }),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn recipient_parse_failures_name_the_address() {
        let err = recipient_mailbox("no-at-sign").unwrap_err();
        assert!(matches!(err, WorkflowError::BadRecipient { email, .. } if email == "no-at-sign"));
    }

    #[test]
    fn composed_message_carries_subject_body_and_attachments() {
        let message = compose(
            &mailbox("shooter@gmail.com"),
            &mailbox("alice@example.com"),
            vec![
                FrameAttachment {
                    file_name: "IMG_0001.JPG".to_string(),
                    bytes: b"jpeg-one".to_vec(),
                },
                FrameAttachment {
                    file_name: "IMG_0002.JPG".to_string(),
                    bytes: b"jpeg-two".to_vec(),
                },
            ],
        )
        .expect("compose");

        let rendered = String::from_utf8_lossy(&message.formatted()).into_owned();
        assert!(rendered.contains("Subject: Photoshoot takeout"));
        assert!(rendered.contains("alice@example.com"));
        assert!(rendered.contains("Thanks again for participating!"));
        assert!(rendered.contains("filename=\"IMG_0001.JPG\""));
        assert!(rendered.contains("filename=\"IMG_0002.JPG\""));
        assert!(rendered.contains("Content-Type: image/jpeg"));
    }

    #[test]
    fn eml_names_replace_the_at_sign() {
        assert_eq!(eml_file_name("alice@example.com"), "alice_at_example.com.eml");
    }

    #[test]
    fn repeated_recipients_get_suffixed_eml_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = EmlWriter::new(dir.path());
        let message = compose(
            &mailbox("shooter@gmail.com"),
            &mailbox("alice@example.com"),
            Vec::new(),
        )
        .expect("compose");

        let first = writer.deliver("alice@example.com", &message).expect("first");
        let second = writer.deliver("alice@example.com", &message).expect("second");

        assert_eq!(first, Delivery::Stored(dir.path().join("alice_at_example.com.eml")));
        assert_eq!(
            second,
            Delivery::Stored(dir.path().join("alice_at_example.com-2.eml"))
        );
        assert!(dir.path().join("alice_at_example.com.eml").is_file());
        assert!(dir.path().join("alice_at_example.com-2.eml").is_file());
    }
}
