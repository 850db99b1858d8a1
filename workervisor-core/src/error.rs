use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport not found: {0}")]
    TransportNotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Supervisor error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),
}

/// Failure talking to the supervision daemon.
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("fault {code}: {message}")]
    Fault { code: i32, message: String },

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

/// Failure building or delivering a notification.
#[derive(Error, Debug)]
pub enum MailError {
    #[error("invalid address `{0}`")]
    Address(String),

    #[error("failed to build message: {0}")]
    Message(String),

    #[error("delivery failed: {0}")]
    Delivery(String),
}

pub type Result<T> = std::result::Result<T, Error>;
