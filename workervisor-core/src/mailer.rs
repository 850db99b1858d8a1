use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use tera::Tera;

use crate::config::MailerConfig;
use crate::error::MailError;
use crate::failure::{FailureEvent, ThrowableMessage};
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html_body: String,
}

/// Delivers notification emails.
pub trait Mailer: Send + Sync {
    fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// Everything a builder may render about one failure.
#[derive(Debug, Clone)]
pub struct EmailContext<'a> {
    pub event: &'a FailureEvent,
    pub transport: &'a Transport,
    pub program: &'a str,
    pub stop_program: bool,
    pub throwable_messages: Vec<ThrowableMessage>,
    pub server: String,
    pub date: DateTime<Local>,
    pub subject_template: &'a str,
    pub additional_data: BTreeMap<String, String>,
}

/// Turns a failure into an email subject and body. Replace it on the
/// listener to change the notification layout.
pub trait ErrorEmailBuilder: Send + Sync {
    fn context<'a>(
        &self,
        event: &'a FailureEvent,
        transport: &'a Transport,
        mailer_config: &'a MailerConfig,
        stop_program: bool,
    ) -> EmailContext<'a> {
        EmailContext {
            event,
            transport,
            program: &transport.program,
            stop_program,
            throwable_messages: event.error.flatten(),
            server: server_name(),
            date: Local::now(),
            subject_template: &mailer_config.subject,
            additional_data: BTreeMap::new(),
        }
    }

    fn subject(&self, context: &EmailContext<'_>) -> String {
        context
            .subject_template
            .replace("<program>", context.program)
            .replace("<server>", &context.server)
    }

    fn body(&self, context: &EmailContext<'_>) -> Result<String, MailError>;
}

const ERROR_EMAIL_TEMPLATE: &str = include_str!("../templates/error_email.html");

/// Renders `templates/error_email.html` with every value HTML-escaped.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlErrorEmailBuilder;

impl ErrorEmailBuilder for HtmlErrorEmailBuilder {
    fn body(&self, context: &EmailContext<'_>) -> Result<String, MailError> {
        let mut values = tera::Context::new();
        values.insert("program", context.program);
        values.insert("transport", &context.transport.name);
        values.insert("server", &context.server);
        values.insert(
            "date",
            &context.date.format("%Y-%m-%d %H:%M:%S %z").to_string(),
        );
        values.insert("will_retry", yes_no(context.event.will_retry));
        values.insert("stop_program", yes_no(context.stop_program));
        values.insert(
            "payload",
            &context.event.payload.as_ref().map(|p| p.to_string()),
        );
        values.insert("throwables", &context.throwable_messages);
        values.insert("additional_data", &context.additional_data);

        Tera::one_off(ERROR_EMAIL_TEMPLATE, &values, true)
            .map_err(|e| MailError::Message(format!("failed to render email body: {}", e)))
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

/// Host name used for the `<server>` placeholder.
#[cfg(unix)]
pub fn server_name() -> String {
    nix::unistd::gethostname()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "localhost".to_string())
}

#[cfg(not(unix))]
pub fn server_name() -> String {
    std::env::var("COMPUTERNAME").unwrap_or_else(|_| "localhost".to_string())
}
