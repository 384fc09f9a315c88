pub mod dispatcher;
pub mod error;
pub mod wire;

pub use dispatcher::{Dispatcher, SessionSummary};
pub use error::ProtocolError;
pub use wire::{Command, Request, Response};
