//! Statically-typed HTTP dispatcher over a pluggable transport.
//!
//! # Overview
//! Turns endpoint descriptors (verb, path template, response shapes) and
//! per-call parameters into requests, hands them to a [`Fetcher`], and turns
//! the responses back into decoded data or a typed status error.
//!
//! # Design
//! - [`Dispatcher`] is sans-IO: `build` produces an [`HttpRequest`], `finish`
//!   consumes an [`HttpResponse`]. Hosts that do their own I/O (the FFI
//!   crate) use it directly.
//! - [`Client`] adds the async round-trip through a [`Fetcher`] and exposes
//!   the two calling conventions: unwrapped data, or the full [`Response`].
//! - Path resolution, query encoding, body decoding and status
//!   classification are free functions in their own modules so they can be
//!   tested and reused on their own.
//! - Enable the `reqwest` feature for a ready-made [`Fetcher`].

pub mod client;
pub mod config;
pub mod decode;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod fetch;
pub mod http;
pub mod params;
pub mod path;
pub mod query;
pub mod response;
pub mod status;

pub use client::Client;
pub use config::ClientConfig;
pub use decode::{decode_response, ResponseData};
pub use dispatch::Dispatcher;
pub use endpoint::Endpoint;
pub use error::{DispatchError, StatusError};
#[cfg(feature = "reqwest")]
pub use fetch::{ReqwestFetcher, ReqwestOverrides};
pub use fetch::{FetchRequest, Fetcher};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use params::{RequestBody, RequestParams};
pub use path::{resolve_path, resolve_path_strict, PathParams};
pub use query::{encode_query, QueryParams};
pub use response::{Response, TypedData, TypedResponse};
pub use status::{classify, StatusClass};
