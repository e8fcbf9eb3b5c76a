//! Per-call request parameters.

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::error::DispatchError;
use crate::path::PathParams;
use crate::query::QueryParams;

/// A request body and the content type it is sent with by default.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Text(String),
    Bytes(Bytes),
}

impl RequestBody {
    pub fn content_type(&self) -> &'static str {
        match self {
            RequestBody::Json(_) => "application/json",
            RequestBody::Text(_) => "text/plain; charset=utf-8",
            RequestBody::Bytes(_) => "application/octet-stream",
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        match self {
            RequestBody::Json(value) => Bytes::from(value.to_string()),
            RequestBody::Text(text) => Bytes::from(text.clone()),
            RequestBody::Bytes(bytes) => bytes.clone(),
        }
    }
}

/// Values for one call: body, query, headers and path parameters, plus the
/// status-error flag and transport overrides handed to the fetcher as-is.
///
/// `O` is the fetcher's override type (timeouts, extra headers, ...).
#[derive(Debug, Clone)]
pub struct RequestParams<O = ()> {
    pub body: Option<RequestBody>,
    pub query: Option<QueryParams>,
    pub headers: Vec<(String, String)>,
    pub path: PathParams,
    pub overrides: Option<O>,
    /// Raise `StatusError` for error statuses. Unset means "raise unless the
    /// caller asked for the full response".
    pub throw_on_status_error: Option<bool>,
}

impl<O> Default for RequestParams<O> {
    fn default() -> Self {
        Self {
            body: None,
            query: None,
            headers: Vec::new(),
            path: PathParams::new(),
            overrides: None,
            throw_on_status_error: None,
        }
    }
}

impl<O> RequestParams<O> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.path.insert(name.into(), value.to_string());
        self
    }

    /// Set a single query parameter. Arrays repeat the key; `null` omits it.
    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query
            .get_or_insert_with(QueryParams::new)
            .insert(name.into(), value.into());
        self
    }

    /// Replace the query with the fields of `query`, which must serialize to
    /// a JSON object.
    pub fn query<Q: Serialize>(mut self, query: &Q) -> Result<Self, DispatchError> {
        match serde_json::to_value(query).map_err(DispatchError::Serialization)? {
            Value::Object(map) => {
                self.query = Some(map);
                Ok(self)
            }
            other => Err(DispatchError::InvalidQuery {
                kind: json_kind(&other),
            }),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, DispatchError> {
        let value = serde_json::to_value(body).map_err(DispatchError::Serialization)?;
        self.body = Some(RequestBody::Json(value));
        Ok(self)
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }

    pub fn bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(RequestBody::Bytes(body.into()));
        self
    }

    pub fn overrides(mut self, overrides: O) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn throw_on_status_error(mut self, throw: bool) -> Self {
        self.throw_on_status_error = Some(throw);
        self
    }

    /// The throw flag in effect: explicit value, else `!with_response`.
    pub fn effective_throw(&self, with_response: bool) -> bool {
        self.throw_on_status_error.unwrap_or(!with_response)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
