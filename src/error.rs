//! Error taxonomy shared by the pipeline and the listener.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::http::parser::ParseError;
use crate::http::response::StatusCode;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("malformed request: {0}")]
    MalformedRequest(#[from] ParseError),

    #[error("resource not found: {}", .0.display())]
    ResourceNotFound(PathBuf),

    #[error("path escapes the virtual host directory: {0}")]
    Forbidden(String),

    #[error("invalid host: {0:?}")]
    InvalidHost(String),

    #[error("method not implemented: {0}")]
    UnsupportedMethod(String),

    #[error("i/o failure: {0}")]
    Io(#[from] io::Error),

    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("cannot bind {addr}: {source}")]
    PortUnavailable {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("listener is not bound, call bind() before run()")]
    NotBound,
}

impl ServerError {
    /// Status code sent to the client when this error ends a request.
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::MalformedRequest(_) | ServerError::InvalidHost(_) => StatusCode::BadRequest,
            ServerError::Forbidden(_) => StatusCode::Forbidden,
            ServerError::ResourceNotFound(_) => StatusCode::NotFound,
            ServerError::UnsupportedMethod(_) => StatusCode::NotImplemented,
            ServerError::Io(_)
            | ServerError::Timeout(_)
            | ServerError::PortUnavailable { .. }
            | ServerError::NotBound => StatusCode::InternalServerError,
        }
    }
}
