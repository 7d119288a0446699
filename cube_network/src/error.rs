use cube_types::ValueError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetworkError {
    /// The request failed, but the connection is still in a known state.
    #[error("Recoverable request error: {0}")]
    Recoverable(String),

    /// The stream can no longer be interpreted.
    #[error("Unrecoverable network error: {0}")]
    Unrecoverable(String),

    #[error("Value codec error: {0}")]
    Value(#[from] ValueError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T, E = NetworkError> = std::result::Result<T, E>;

impl NetworkError {
    pub fn recoverable<S: Into<String>>(msg: S) -> Self {
        Self::Recoverable(msg.into())
    }

    pub fn unrecoverable<S: Into<String>>(msg: S) -> Self {
        Self::Unrecoverable(msg.into())
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable(_))
    }

    /// True when the peer closed the stream.
    pub fn is_disconnect(&self) -> bool {
        let io_err = match self {
            Self::Io(e) => e,
            Self::Value(ValueError::Io(e)) => e,
            _ => return false,
        };
        matches!(
            io_err.kind(),
            io::ErrorKind::UnexpectedEof
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::BrokenPipe
        )
    }
}
