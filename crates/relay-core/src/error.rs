//! Core error types

use relay_client::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to create client: {0}")]
    Connect(ClientError),

    #[error("{0}")]
    Upstream(#[from] ClientError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Coarse classification of a failure, used to pick a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unreachable,
    NotFound,
    InvalidRequest,
    Internal,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Connect(ClientError::InvalidTarget(_))
            | CoreError::Upstream(ClientError::InvalidTarget(_)) => ErrorKind::InvalidRequest,
            CoreError::Connect(_) => ErrorKind::Unreachable,
            CoreError::Upstream(e) => match e {
                ClientError::Unreachable(_) | ClientError::Http(_) => ErrorKind::Unreachable,
                ClientError::NotFound(_) => ErrorKind::NotFound,
                _ => ErrorKind::Internal,
            },
            CoreError::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }
}
