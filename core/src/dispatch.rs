//! Stateless request builder and response classifier.
//!
//! # Design
//! `Dispatcher` holds only an immutable [`ClientConfig`]. A call is split
//! into [`Dispatcher::build`], which produces an [`HttpRequest`], and
//! [`Dispatcher::finish`], which turns the [`HttpResponse`] into a
//! [`Response`] envelope or a [`StatusError`]. Whatever sits between the two
//! executes the round-trip: the async [`Client`](crate::Client) through a
//! `Fetcher`, or a foreign host through the FFI crate.

use crate::config::ClientConfig;
use crate::decode::decode_response;
use crate::error::{DispatchError, StatusError};
use crate::http::{find_header, HttpMethod, HttpRequest, HttpResponse};
use crate::params::RequestParams;
use crate::path::{resolve_path, resolve_path_strict};
use crate::query::encode_query;
use crate::response::Response;
use crate::status::{classify, StatusClass};

#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: ClientConfig,
}

impl Dispatcher {
    pub fn new(base_url: &str) -> Self {
        Self::with_config(ClientConfig::new(base_url))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Prefix the base URL to `template`, resolve the placeholders of the
    /// combined URL against `params`, then render query, headers and body.
    pub fn build<O>(
        &self,
        method: HttpMethod,
        template: &str,
        params: &RequestParams<O>,
    ) -> Result<HttpRequest, DispatchError> {
        let unresolved = self.config.join(template);
        let mut url = if self.config.strict_path_params {
            resolve_path_strict(&unresolved, &params.path)?
        } else {
            resolve_path(&unresolved, &params.path)
        };

        let query = encode_query(params.query.as_ref());
        if let Some(query) = query.as_deref().filter(|q| !q.is_empty()) {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(query);
        }

        let mut headers = params.headers.clone();
        let body = params.body.as_ref().map(|body| {
            if find_header(&headers, "content-type").is_none() {
                headers.push(("content-type".to_string(), body.content_type().to_string()));
            }
            body.to_bytes()
        });

        Ok(HttpRequest {
            method,
            url,
            query,
            headers,
            body,
        })
    }

    /// Decode and classify `response`.
    ///
    /// With `throw_on_status_error` set, statuses in the error table (and
    /// unclassified statuses when configured) come back as
    /// [`DispatchError::Status`]; everything else is returned as an envelope.
    pub fn finish(
        &self,
        response: HttpResponse,
        throw_on_status_error: bool,
    ) -> Result<Response, DispatchError> {
        let data = decode_response(&response);
        let class = classify(response.status);
        let envelope = Response {
            ok: class == StatusClass::Success,
            status: response.status,
            headers: response.headers,
            data,
        };
        tracing::debug!(status = envelope.status, ok = envelope.ok, "response classified");

        let raise = match class {
            StatusClass::Error => throw_on_status_error,
            StatusClass::Unclassified => {
                throw_on_status_error && self.config.unclassified_status_is_error
            }
            StatusClass::Success => false,
        };
        if raise {
            return Err(StatusError::new(envelope).into());
        }
        Ok(envelope)
    }
}
