pub mod manage;
pub mod start;
pub mod status;
pub mod stop;

pub use manage::{CommandStatus, execute};
