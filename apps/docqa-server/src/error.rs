//! HTTP mapping for pipeline failures.
//!
//! Every failure leaves the process as the uniform envelope
//! `{code, message, displayMessage}`; the HTTP status mirrors `code`, so
//! clients never have to parse a 200 to discover an error. The internal
//! `message` is logged here and blanked before serialization; clients
//! only ever see `displayMessage`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docqa_core::error::{Error, SystemMessage};

#[derive(Debug)]
pub struct ApiError(SystemMessage);

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(SystemMessage::new(400, message))
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(SystemMessage::from(&err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        tracing::error!(code = self.0.code, message = %self.0.message, "request failed");
        let body = SystemMessage { message: String::new(), ..self.0 };
        (status, Json(body)).into_response()
    }
}
