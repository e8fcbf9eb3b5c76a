//! Content-type driven response decoding.
//!
//! The strategy is a heuristic over the raw `content-type` header, not a
//! media-type parser. Servers that label a non-JSON body as JSON get
//! [`ResponseData::Empty`] rather than an error.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http::HttpResponse;

/// A decoded response body.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseData {
    /// No body was read, or a JSON body failed to parse.
    #[default]
    Empty,
    Text(String),
    Bytes(Bytes),
    Json(Value),
}

impl ResponseData {
    pub fn is_empty(&self) -> bool {
        matches!(self, ResponseData::Empty)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseData::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            ResponseData::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Deserialize into `T`. `Empty` behaves like JSON `null`, text like a
    /// JSON string and bytes like an array of numbers.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match self {
            ResponseData::Json(value) => T::deserialize(value),
            ResponseData::Empty => T::deserialize(Value::Null),
            ResponseData::Text(text) => T::deserialize(Value::String(text.clone())),
            ResponseData::Bytes(bytes) => {
                T::deserialize(Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()))
            }
        }
    }
}

/// How a body is read for a given content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStrategy {
    Text,
    Bytes,
    Json,
    Skip,
}

/// Pick the decoding strategy for a raw `content-type` value.
pub fn strategy_for(content_type: &str) -> DecodeStrategy {
    if content_type.starts_with("text/") {
        DecodeStrategy::Text
    } else if content_type == "application/octet-stream" {
        DecodeStrategy::Bytes
    } else if content_type.contains("json") || content_type == "*/*" {
        DecodeStrategy::Json
    } else {
        DecodeStrategy::Skip
    }
}

/// Decode the body of `response` according to its `content-type`.
pub fn decode_response(response: &HttpResponse) -> ResponseData {
    let content_type = response.content_type();
    match strategy_for(content_type) {
        DecodeStrategy::Text => {
            ResponseData::Text(String::from_utf8_lossy(&response.body).into_owned())
        }
        DecodeStrategy::Bytes => ResponseData::Bytes(response.body.clone()),
        DecodeStrategy::Json => match serde_json::from_slice(&response.body) {
            Ok(value) => ResponseData::Json(value),
            Err(error) => {
                tracing::debug!(%error, content_type, "discarding unparseable JSON body");
                ResponseData::Empty
            }
        },
        DecodeStrategy::Skip => ResponseData::Empty,
    }
}
