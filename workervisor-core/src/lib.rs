pub mod config;
pub mod error;
pub mod failure;
pub mod mailer;
pub mod process;
pub mod supervisor;
pub mod transport;

pub use config::{Config, ConfigLoader, MailerConfig, SupervisorConfig};
pub use error::{Error, MailError, Result, RpcError};
pub use failure::{
    Action, FailureEvent, FailureListener, FailureOutcome, FailurePolicy, HandlerError,
    ThrowableMessage,
};
pub use mailer::{Email, EmailContext, ErrorEmailBuilder, HtmlErrorEmailBuilder, Mailer};
pub use process::{GroupActionResult, ProcessInfo, ProcessState, ProgramStatus};
pub use supervisor::{Supervisor, SupervisorApi};
pub use transport::{Transport, TransportRegistry};
