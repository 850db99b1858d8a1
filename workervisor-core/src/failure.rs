use serde::{Deserialize, Serialize};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::MailerConfig;
use crate::error::MailError;
use crate::mailer::{Email, ErrorEmailBuilder, HtmlErrorEmailBuilder, Mailer};
use crate::supervisor::Supervisor;
use crate::transport::Transport;

/// When a failure should trigger a side effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[default]
    #[serde(rename = "always")]
    Always,
    #[serde(rename = "will-not-retry")]
    WillNotRetry,
    #[serde(rename = "never")]
    Never,
}

impl Action {
    pub fn decide(self, will_retry: bool) -> bool {
        match self {
            Self::Never => false,
            Self::WillNotRetry => !will_retry,
            Self::Always => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailurePolicy {
    pub stop_program: Action,
    pub send_mail: Action,
}

/// Error raised by a job handler, possibly wrapping several nested errors.
#[derive(Debug, Clone)]
pub struct HandlerError {
    kind: String,
    message: String,
    file: String,
    line: u32,
    trace: Option<String>,
    nested: Vec<HandlerError>,
}

impl HandlerError {
    #[track_caller]
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        let location = Location::caller();
        Self {
            kind: kind.into(),
            message: message.into(),
            file: location.file().to_string(),
            line: location.line(),
            trace: None,
            nested: Vec::new(),
        }
    }

    /// Captures an arbitrary error together with a backtrace when
    /// `RUST_BACKTRACE` enables one.
    #[track_caller]
    pub fn from_error<E: std::error::Error>(err: &E) -> Self {
        let backtrace = Backtrace::capture();
        let mut handler_error = Self::new(std::any::type_name::<E>(), err.to_string());
        if backtrace.status() == BacktraceStatus::Captured {
            handler_error.trace = Some(backtrace.to_string());
        }
        handler_error
    }

    /// The composite error a dispatcher reports when one or more handlers failed.
    #[track_caller]
    pub fn handler_failed(message_type: &str, nested: Vec<HandlerError>) -> Self {
        let messages: Vec<&str> = nested.iter().map(|e| e.message.as_str()).collect();
        Self::new(
            "HandlerFailedError",
            format!("Handling \"{}\" failed: {}", message_type, messages.join("\n\n")),
        )
        .with_nested(nested)
    }

    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    pub fn with_nested(mut self, nested: Vec<HandlerError>) -> Self {
        self.nested = nested;
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn nested(&self) -> &[HandlerError] {
        &self.nested
    }

    /// `<kind>: <message> at <file> line <line>`
    pub fn summary(&self) -> String {
        format!(
            "{}: {} at {} line {}",
            self.kind, self.message, self.file, self.line
        )
    }

    /// This error followed by its nested errors, depth first.
    pub fn flatten(&self) -> Vec<ThrowableMessage> {
        let mut messages = Vec::new();
        self.collect(&mut messages);
        messages
    }

    fn collect(&self, messages: &mut Vec<ThrowableMessage>) {
        messages.push(ThrowableMessage {
            message: self.summary(),
            trace: self.trace.clone(),
        });
        for nested in &self.nested {
            nested.collect(messages);
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.nested
            .first()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThrowableMessage {
    pub message: String,
    pub trace: Option<String>,
}

/// Emitted by the worker framework when a handler failed.
#[derive(Debug, Clone)]
pub struct FailureEvent {
    pub transport_name: String,
    pub will_retry: bool,
    pub error: HandlerError,
    pub payload: Option<serde_json::Value>,
}

impl FailureEvent {
    pub fn new(transport_name: impl Into<String>, error: HandlerError) -> Self {
        Self {
            transport_name: transport_name.into(),
            will_retry: false,
            error,
            payload: None,
        }
    }

    pub fn with_retry(mut self, will_retry: bool) -> Self {
        self.will_retry = will_retry;
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// What the listener did for one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureOutcome {
    pub stopped: bool,
    pub mailed: bool,
}

pub const DEFAULT_FAILURE_EVENT_PRIORITY: i32 = 10;

/// Stops the program behind a failing transport and notifies operators,
/// according to the transport's failure policy.
pub struct FailureListener {
    supervisor: Arc<Supervisor>,
    email_builder: Box<dyn ErrorEmailBuilder>,
    mailer: Box<dyn Mailer>,
    mailer_config: MailerConfig,
    priority: i32,
}

impl FailureListener {
    pub fn new(
        supervisor: Arc<Supervisor>,
        mailer: impl Mailer + 'static,
        mailer_config: MailerConfig,
    ) -> Self {
        Self {
            supervisor,
            email_builder: Box::new(HtmlErrorEmailBuilder),
            mailer: Box::new(mailer),
            mailer_config,
            priority: DEFAULT_FAILURE_EVENT_PRIORITY,
        }
    }

    pub fn with_email_builder(mut self, email_builder: impl ErrorEmailBuilder + 'static) -> Self {
        self.email_builder = Box::new(email_builder);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Position of this listener among the host's failure hooks.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Never fails: errors while stopping or mailing are logged and swallowed.
    pub fn on_failure(&self, event: &FailureEvent) -> FailureOutcome {
        let Ok(transport) = self.supervisor.get_transport(&event.transport_name) else {
            return FailureOutcome::default();
        };

        let stopped = self.stop_program(event, transport);
        let mailed = self.send_mail(event, transport, stopped);

        FailureOutcome { stopped, mailed }
    }

    fn stop_program(&self, event: &FailureEvent, transport: &Transport) -> bool {
        if !transport.failure.stop_program.decide(event.will_retry) {
            return false;
        }

        info!("Stopping {} program", transport.program);
        match self.supervisor.stop_program(&transport.program, false) {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "Error during stopping program: {}", e);
                false
            }
        }
    }

    fn send_mail(&self, event: &FailureEvent, transport: &Transport, stopped: bool) -> bool {
        if !transport.failure.send_mail.decide(event.will_retry) {
            return false;
        }

        info!("Sending email");
        let result = self
            .build_email(event, transport, stopped)
            .and_then(|email| self.mailer.send(&email));

        match result {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Error during sending email: {}", e);
                false
            }
        }
    }

    fn build_email(
        &self,
        event: &FailureEvent,
        transport: &Transport,
        stopped: bool,
    ) -> Result<Email, MailError> {
        let from = self
            .mailer_config
            .from
            .clone()
            .ok_or_else(|| MailError::Address("no sender configured".to_string()))?;
        if self.mailer_config.to.is_empty() {
            return Err(MailError::Address("no recipient configured".to_string()));
        }

        let context = self
            .email_builder
            .context(event, transport, &self.mailer_config, stopped);

        Ok(Email {
            from,
            to: self.mailer_config.to.clone(),
            subject: self.email_builder.subject(&context),
            html_body: self.email_builder.body(&context)?,
        })
    }
}
