use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use strum_macros::AsRefStr;

use super::routes::{LookupError, SubscribeError};

pub type WebResult<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("subscribe error: {0}")]
    Subscribe(#[from] SubscribeError),
    #[error("lookup error: {0}")]
    Lookup(#[from] LookupError),
}

impl Error {
    /// The only place where handler errors are mapped to what the client gets to see.
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::Subscribe(SubscribeError::DataParsing(_)) => {
                (StatusCode::BAD_REQUEST, InvalidEmail)
            }
            Error::Lookup(LookupError::DataParsing(_)) => {
                (StatusCode::BAD_REQUEST, EmailParamRequired)
            }
            Error::Subscribe(SubscribeError::Store(_)) | Error::Lookup(LookupError::Store(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ServiceError)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();

        // Insert the Error into response so that it can be retrieved later.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

#[derive(Debug, AsRefStr, derive_more::Display)]
pub enum ClientError {
    #[display("Invalid email address")]
    InvalidEmail,
    #[display("Email parameter is required")]
    EmailParamRequired,
    #[display("Internal server error")]
    ServiceError,
}
