//! Crate-level error type.

use thiserror::Error;

use crate::http::transport::TransportError;
use crate::query::translate::TranslateError;
use crate::resilience::executor::RequestError;

/// Any failure surfaced by the client: a query that cannot be translated,
/// or a request that terminally failed. The two halves stay
/// distinguishable so callers can tell a query composition mistake from a
/// service problem.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Translate(#[from] TranslateError),
    #[error(transparent)]
    Request(#[from] RequestError),
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Error::Request(RequestError::Network(err))
    }
}
