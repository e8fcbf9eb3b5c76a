//! The transport boundary.
//!
//! A [`Fetcher`] performs the network call for a built request. It owns
//! authentication, header injection, retries and cancellation; the client
//! only awaits the response it produces. Dropping the future returned by a
//! client call cancels it, provided the fetcher's future is cancel-safe.

use std::future::Future;

use crate::http::{HttpRequest, HttpResponse};
use crate::params::RequestParams;

/// Everything the fetcher gets for one call.
#[derive(Debug)]
pub struct FetchRequest<'a, O> {
    /// The fully resolved request, query string included.
    pub request: HttpRequest,
    /// The endpoint path template before resolution.
    pub path: &'a str,
    /// The caller's parameters, untouched.
    pub parameters: &'a RequestParams<O>,
    /// Whether error statuses will be raised once the response is back.
    pub throw_on_status_error: bool,
}

impl<'a, O> FetchRequest<'a, O> {
    pub fn overrides(&self) -> Option<&'a O> {
        self.parameters.overrides.as_ref()
    }

    pub fn url_search_params(&self) -> Option<&str> {
        self.request.query.as_deref()
    }
}

/// Pluggable transport.
///
/// `Overrides` is the per-call transport configuration callers attach with
/// [`RequestParams::overrides`]. `Error` is surfaced to callers unchanged,
/// boxed inside `DispatchError::Transport`.
pub trait Fetcher: Send + Sync {
    type Overrides: Send + Sync;
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch(
        &self,
        request: FetchRequest<'_, Self::Overrides>,
    ) -> impl Future<Output = Result<HttpResponse, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
pub use self::reqwest_fetcher::{ReqwestFetcher, ReqwestOverrides};

#[cfg(feature = "reqwest")]
mod reqwest_fetcher {
    use std::time::Duration;

    use super::{FetchRequest, Fetcher};
    use crate::http::{HttpMethod, HttpResponse};

    /// Per-call options for [`ReqwestFetcher`].
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestOverrides {
        pub headers: Vec<(String, String)>,
        pub timeout: Option<Duration>,
    }

    /// A [`Fetcher`] backed by a shared `reqwest::Client`.
    ///
    /// Default headers (authentication, user agent) belong on the
    /// `reqwest::Client` passed to [`ReqwestFetcher::new`].
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestFetcher {
        client: reqwest::Client,
    }

    impl ReqwestFetcher {
        pub fn new(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    fn method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Options => reqwest::Method::OPTIONS,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Trace => reqwest::Method::TRACE,
        }
    }

    impl Fetcher for ReqwestFetcher {
        type Overrides = ReqwestOverrides;
        type Error = reqwest::Error;

        async fn fetch(
            &self,
            request: FetchRequest<'_, ReqwestOverrides>,
        ) -> Result<HttpResponse, reqwest::Error> {
            let overrides = request.overrides();
            let request = request.request;

            let mut builder = self.client.request(method(request.method), &request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(overrides) = overrides {
                for (name, value) in &overrides.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                if let Some(timeout) = overrides.timeout {
                    builder = builder.timeout(timeout);
                }
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let body = response.bytes().await?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}
