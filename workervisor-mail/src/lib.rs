//! SMTP delivery for failure notifications.

use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::{SmtpTransport, Transport};
use tracing::debug;
use workervisor_core::{Email, MailError, Mailer, MailerConfig};

pub struct SmtpMailer {
    transport: SmtpTransport,
}

impl SmtpMailer {
    /// Connects lazily; `dsn` is only parsed here.
    pub fn from_dsn(dsn: &str) -> Result<Self, MailError> {
        let transport = SmtpTransport::from_url(dsn)
            .map_err(|e| MailError::Delivery(format!("invalid dsn {}: {}", dsn, e)))?
            .build();
        Ok(Self { transport })
    }

    pub fn from_config(config: &MailerConfig) -> Result<Self, MailError> {
        Self::from_dsn(&config.dsn)
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, email: &Email) -> Result<(), MailError> {
        let message = build_message(email)?;
        debug!("Sending \"{}\" to {}", email.subject, email.to.join(", "));
        self.transport
            .send(&message)
            .map_err(|e| MailError::Delivery(e.to_string()))?;
        Ok(())
    }
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse()
        .map_err(|_| MailError::Address(address.to_string()))
}

pub fn build_message(email: &Email) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(mailbox(&email.from)?)
        .subject(email.subject.as_str())
        .header(ContentType::TEXT_HTML);
    for to in &email.to {
        builder = builder.to(mailbox(to)?);
    }

    builder
        .body(email.html_body.clone())
        .map_err(|e| MailError::Message(e.to_string()))
}
