//! Async client over a pluggable fetcher.
//!
//! # Design
//! `Client` pairs a [`Dispatcher`] with a shared [`Fetcher`]. Each call builds
//! the request, awaits the fetcher once, then decodes and classifies the
//! response. Calls are independent: there is no queue, cache or retry, and
//! concurrent calls complete in whatever order their transports finish.
//!
//! The base URL is fixed per client. [`Client::with_base_url`] returns a new
//! client that shares the fetcher, so in-flight calls keep the URL they were
//! built with.
//!
//! Two calling conventions are offered:
//! - `send` / `call` return the decoded data and raise error statuses by
//!   default;
//! - `send_with_response` / `call_with_response` return the whole envelope
//!   and leave error statuses for the caller to inspect via `ok`.
//!
//! Both honour an explicit [`RequestParams::throw_on_status_error`].

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::decode::ResponseData;
use crate::dispatch::Dispatcher;
use crate::endpoint::Endpoint;
use crate::error::DispatchError;
use crate::fetch::{FetchRequest, Fetcher};
use crate::http::HttpMethod;
use crate::params::RequestParams;
use crate::response::{Response, TypedResponse};

#[derive(Debug)]
pub struct Client<F> {
    dispatcher: Dispatcher,
    fetcher: Arc<F>,
}

impl<F> Clone for Client<F> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}

impl<F: Fetcher> Client<F> {
    pub fn new(fetcher: F, base_url: &str) -> Self {
        Self::with_config(fetcher, ClientConfig::new(base_url))
    }

    pub fn with_config(fetcher: F, config: ClientConfig) -> Self {
        Self {
            dispatcher: Dispatcher::with_config(config),
            fetcher: Arc::new(fetcher),
        }
    }

    /// A client for another base URL sharing this client's fetcher.
    pub fn with_base_url(&self, base_url: &str) -> Self {
        let config = ClientConfig {
            base_url: base_url.to_string(),
            ..self.dispatcher.config().clone()
        };
        Self {
            dispatcher: Dispatcher::with_config(config),
            fetcher: Arc::clone(&self.fetcher),
        }
    }

    pub fn base_url(&self) -> &str {
        self.dispatcher.base_url()
    }

    pub fn config(&self) -> &ClientConfig {
        self.dispatcher.config()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Issue a request and return the decoded body.
    pub async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        params: RequestParams<F::Overrides>,
    ) -> Result<ResponseData, DispatchError> {
        self.dispatch(method, path, params, false)
            .await
            .map(Response::into_data)
    }

    /// Issue a request and return the full envelope.
    pub async fn send_with_response(
        &self,
        method: HttpMethod,
        path: &str,
        params: RequestParams<F::Overrides>,
    ) -> Result<Response, DispatchError> {
        self.dispatch(method, path, params, true).await
    }

    /// Call `endpoint` and deserialize the body as its success shape.
    pub async fn call<T, E>(
        &self,
        endpoint: &Endpoint<T, E>,
        params: RequestParams<F::Overrides>,
    ) -> Result<T, DispatchError>
    where
        T: DeserializeOwned,
    {
        let data = self.send(endpoint.method(), endpoint.path(), params).await?;
        data.deserialize().map_err(DispatchError::Deserialization)
    }

    /// Call `endpoint` and deserialize the body per status class.
    pub async fn call_with_response<T, E>(
        &self,
        endpoint: &Endpoint<T, E>,
        params: RequestParams<F::Overrides>,
    ) -> Result<TypedResponse<T, E>, DispatchError>
    where
        T: DeserializeOwned,
        E: DeserializeOwned,
    {
        self.send_with_response(endpoint.method(), endpoint.path(), params)
            .await?
            .into_typed()
    }

    async fn dispatch(
        &self,
        method: HttpMethod,
        path: &str,
        params: RequestParams<F::Overrides>,
        with_response: bool,
    ) -> Result<Response, DispatchError> {
        let throw_on_status_error = params.effective_throw(with_response);
        let request = self.dispatcher.build(method, path, &params)?;
        tracing::debug!(%method, url = %request.url, "dispatching request");

        let response = self
            .fetcher
            .fetch(FetchRequest {
                request,
                path,
                parameters: &params,
                throw_on_status_error,
            })
            .await
            .map_err(DispatchError::transport)?;

        self.dispatcher.finish(response, throw_on_status_error)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::http::{HttpRequest, HttpResponse};

    /// Answers every call with a canned response and records what it saw.
    struct CannedFetcher {
        response: HttpResponse,
        seen: Mutex<Vec<(HttpRequest, String, bool, Option<u32>)>>,
    }

    impl CannedFetcher {
        fn new(response: HttpResponse) -> Self {
            Self {
                response,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last(&self) -> (HttpRequest, String, bool, Option<u32>) {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Fetcher for CannedFetcher {
        type Overrides = u32;
        type Error = std::io::Error;

        async fn fetch(&self, request: FetchRequest<'_, u32>) -> Result<HttpResponse, std::io::Error> {
            self.seen.lock().unwrap().push((
                request.request.clone(),
                request.path.to_string(),
                request.throw_on_status_error,
                request.overrides().copied(),
            ));
            Ok(self.response.clone())
        }
    }

    struct Unreachable;

    impl Fetcher for Unreachable {
        type Overrides = ();
        type Error = std::io::Error;

        async fn fetch(&self, _request: FetchRequest<'_, ()>) -> Result<HttpResponse, std::io::Error> {
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"))
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        uuid: String,
        username: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Problem {
        detail: String,
    }

    const GET_USER: Endpoint<User, Problem> = Endpoint::get("/api/users/{uuid}/");

    fn json_response(status: u16, body: &'static str) -> HttpResponse {
        HttpResponse::new(status)
            .with_header("content-type", "application/json")
            .with_body(body)
    }

    fn user_client() -> Client<CannedFetcher> {
        Client::new(
            CannedFetcher::new(json_response(200, r#"{"uuid":"me","username":"ada"}"#)),
            "https://x.test",
        )
    }

    fn not_found_client() -> Client<CannedFetcher> {
        Client::new(
            CannedFetcher::new(json_response(404, r#"{"detail":"Not found."}"#)),
            "https://x.test",
        )
    }

    #[tokio::test]
    async fn call_resolves_url_and_unwraps_data() {
        let client = user_client();
        let user = client
            .call(&GET_USER, RequestParams::new().path("uuid", "me"))
            .await
            .unwrap();
        assert_eq!(user.username, "ada");

        let (request, path, throw, _) = client.fetcher().last();
        assert_eq!(request.url, "https://x.test/api/users/me/");
        assert_eq!(path, "/api/users/{uuid}/");
        assert!(throw);
    }

    #[tokio::test]
    async fn unwrap_mode_raises_status_error() {
        let err = not_found_client()
            .send(HttpMethod::Get, "/api/users/{uuid}/", RequestParams::new().path("uuid", "ghost"))
            .await
            .unwrap_err();
        let status_err = err.as_status_error().unwrap();
        assert_eq!(status_err.status, 404);
        assert_eq!(status_err.response.data, ResponseData::Json(json!({"detail": "Not found."})));
        let problem: Problem = status_err.body().unwrap();
        assert_eq!(problem.detail, "Not found.");
    }

    #[tokio::test]
    async fn envelope_mode_returns_error_status() {
        let client = not_found_client();
        let resp = client
            .send_with_response(HttpMethod::Get, "/api/users/{uuid}/", RequestParams::new().path("uuid", "ghost"))
            .await
            .unwrap();
        assert!(!resp.ok);
        assert_eq!(resp.status, 404);
        assert!(!client.fetcher().last().2);
    }

    #[tokio::test]
    async fn explicit_flag_overrides_default() {
        let client = not_found_client();
        let err = client
            .send_with_response(HttpMethod::Get, "/x", RequestParams::new().throw_on_status_error(true))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));

        let data = client
            .send(HttpMethod::Get, "/x", RequestParams::new().throw_on_status_error(false))
            .await
            .unwrap();
        assert_eq!(data, ResponseData::Json(json!({"detail": "Not found."})));
    }

    #[tokio::test]
    async fn typed_envelope_carries_error_shape() {
        let resp = not_found_client()
            .call_with_response(&GET_USER, RequestParams::new().path("uuid", "ghost"))
            .await
            .unwrap();
        assert_eq!(resp.status, 404);
        assert_eq!(resp.failure(), Some(&Problem { detail: "Not found.".to_string() }));
    }

    #[tokio::test]
    async fn overrides_reach_the_fetcher() {
        let client = user_client();
        client
            .send(HttpMethod::Get, "/api/users/me/", RequestParams::new().overrides(30))
            .await
            .unwrap();
        assert_eq!(client.fetcher().last().3, Some(30));
    }

    #[tokio::test]
    async fn transport_error_is_propagated_unchanged() {
        let client = Client::new(Unreachable, "https://x.test");
        let err = client
            .send(HttpMethod::Get, "/api/tasks/", RequestParams::new())
            .await
            .unwrap_err();
        let io = err.downcast_transport_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::ConnectionRefused);
    }

    #[tokio::test]
    async fn strict_mode_never_reaches_the_fetcher() {
        let config = ClientConfig::new("https://x.test").strict_path_params(true);
        let client = Client::with_config(CannedFetcher::new(HttpResponse::new(200)), config);
        let err = client
            .send(HttpMethod::Get, "/api/users/{uuid}/", RequestParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::MissingPathParam { .. }));
        assert!(client.fetcher().seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn with_base_url_shares_fetcher_and_keeps_config() {
        let config = ClientConfig::new("https://x.test").strict_path_params(true);
        let client = Client::with_config(CannedFetcher::new(HttpResponse::new(204)), config);
        let staging = client.with_base_url("https://staging.x.test/");
        assert_eq!(client.base_url(), "https://x.test");
        assert_eq!(staging.base_url(), "https://staging.x.test/");
        assert!(staging.config().strict_path_params);

        staging
            .send(HttpMethod::Delete, "/api/tasks/{id}/", RequestParams::new().path("id", 7))
            .await
            .unwrap();
        assert_eq!(client.fetcher().last().0.url, "https://staging.x.test/api/tasks/7/");
    }

    #[tokio::test]
    async fn concurrent_calls_are_independent() {
        let client = Client::new(CannedFetcher::new(HttpResponse::new(204)), "https://x.test");
        let (tasks, users) = tokio::join!(
            client.send(HttpMethod::Get, "/api/tasks/", RequestParams::new().overrides(1)),
            client.send(HttpMethod::Get, "/api/users/{uuid}/", RequestParams::new().path("uuid", "me")),
        );
        assert_eq!(tasks.unwrap(), ResponseData::Empty);
        assert_eq!(users.unwrap(), ResponseData::Empty);

        let seen = client.fetcher().seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        let mut urls: Vec<&str> = seen.iter().map(|(req, ..)| req.url.as_str()).collect();
        urls.sort();
        assert_eq!(urls, ["https://x.test/api/tasks/", "https://x.test/api/users/me/"]);
        let overrides: Vec<Option<u32>> = seen.iter().map(|(.., o)| *o).collect();
        assert!(overrides.contains(&Some(1)) && overrides.contains(&None));
    }

    #[tokio::test]
    async fn unwrap_of_empty_body_deserializes_to_unit() {
        let client = Client::new(CannedFetcher::new(HttpResponse::new(204)), "https://x.test");
        let endpoint: Endpoint<()> = Endpoint::delete("/api/tasks/{id}/");
        client
            .call(&endpoint, RequestParams::new().path("id", 1))
            .await
            .unwrap();
    }
}
