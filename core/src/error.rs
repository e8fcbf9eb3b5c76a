//! Error types for the dispatcher.
//!
//! # Design
//! The dispatcher manufactures exactly one HTTP-level error, `Status`, and
//! only for responses in the error-status table when the caller asked for
//! errors to be raised. Transport failures are the fetcher's own error value,
//! boxed but otherwise untouched. The remaining variants are request-building
//! and typed-decoding failures that never reach the network.

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::response::Response;

/// Errors returned by `Dispatcher` and `Client`.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The fetcher failed before producing a response.
    #[error(transparent)]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// The response status is in the error table.
    #[error(transparent)]
    Status(Box<StatusError>),

    /// A path placeholder had no value and strict resolution was enabled.
    #[error("missing path parameter `{name}` in `{template}`")]
    MissingPathParam { name: String, template: String },

    /// Query parameters did not serialize to a JSON object.
    #[error("query parameters must serialize to an object, got {kind}")]
    InvalidQuery { kind: &'static str },

    /// The request body or query could not be serialized.
    #[error("failed to serialize request data")]
    Serialization(#[source] serde_json::Error),

    /// The decoded body did not match the requested type.
    #[error("failed to deserialize response data")]
    Deserialization(#[source] serde_json::Error),

    #[error("unsupported HTTP method: {method}")]
    UnsupportedMethod { method: String },
}

impl DispatchError {
    pub fn transport<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DispatchError::Transport(Box::new(error))
    }

    /// HTTP status for `Status` errors.
    pub fn status(&self) -> Option<u16> {
        self.as_status_error().map(|err| err.status)
    }

    pub fn as_status_error(&self) -> Option<&StatusError> {
        match self {
            DispatchError::Status(err) => Some(err),
            _ => None,
        }
    }

    /// The fetcher's error, if this is a transport failure of type `E`.
    pub fn downcast_transport_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            DispatchError::Transport(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}

impl From<StatusError> for DispatchError {
    fn from(err: StatusError) -> Self {
        DispatchError::Status(Box::new(err))
    }
}

/// A response whose status is in the error table, raised as an error.
#[derive(Debug, Error)]
#[error("HTTP {status} error response")]
pub struct StatusError {
    pub status: u16,
    pub response: Response,
}

impl StatusError {
    pub fn new(response: Response) -> Self {
        Self {
            status: response.status,
            response,
        }
    }

    /// Deserialize the decoded error body.
    pub fn body<E: DeserializeOwned>(&self) -> Result<E, DispatchError> {
        self.response.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::ResponseData;
    use serde_json::json;

    fn not_found() -> StatusError {
        StatusError::new(Response {
            ok: false,
            status: 404,
            headers: Vec::new(),
            data: ResponseData::Json(json!({"detail": "Not found."})),
        })
    }

    #[test]
    fn status_error_exposes_status_and_body() {
        let err: DispatchError = not_found().into();
        assert_eq!(err.status(), Some(404));
        let body: serde_json::Value = err.as_status_error().unwrap().body().unwrap();
        assert_eq!(body["detail"], "Not found.");
        assert_eq!(err.to_string(), "HTTP 404 error response");
    }

    #[test]
    fn transport_error_is_recoverable_by_type() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = DispatchError::transport(io);
        assert_eq!(err.to_string(), "refused");
        assert_eq!(err.status(), None);
        let inner = err.downcast_transport_ref::<std::io::Error>().unwrap();
        assert_eq!(inner.kind(), std::io::ErrorKind::ConnectionRefused);
    }

    #[test]
    fn missing_path_param_message() {
        let err = DispatchError::MissingPathParam {
            name: "uuid".to_string(),
            template: "/api/users/{uuid}/".to_string(),
        };
        assert_eq!(err.to_string(), "missing path parameter `uuid` in `/api/users/{uuid}/`");
    }
}
