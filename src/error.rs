//! Request-time error type and its JSON envelope.
//!
//! Every failure that reaches the client is rendered as
//! `{"error": "<reason phrase>"}` with a fixed status code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::backtrace::Backtrace;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No route matched the request.
    #[error("Not Found")]
    NotFound,
    /// A handler failed; the source and the stack trace at the point of
    /// failure are logged, never sent to the client.
    #[error("Internal Server Error")]
    Internal {
        #[source]
        source: anyhow::Error,
        trace: Box<Backtrace>,
    },
}

impl AppError {
    /// Wraps `source`, capturing the stack trace regardless of `RUST_BACKTRACE`.
    pub fn internal(source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            source: source.into(),
            trace: Box::new(Backtrace::force_capture()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::NotFound => "Not Found",
            AppError::Internal { source, trace } => {
                tracing::error!("Unhandled error: {source:?}\n{trace}");
                "Internal Server Error"
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
