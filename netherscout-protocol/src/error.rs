use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Unknown command byte {0:#04x}")]
    UnknownCommand(u8),

    #[error("Generator failed: {0:#}")]
    Oracle(anyhow::Error),

    #[error("Host pipe I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Process exit status for this failure. 1 is left for startup errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            ProtocolError::UnknownCommand(_) => 2,
            ProtocolError::Oracle(_) => 3,
            ProtocolError::Io(_) => 4,
        }
    }
}
