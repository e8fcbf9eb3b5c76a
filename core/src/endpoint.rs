//! Static endpoint descriptors.
//!
//! An [`Endpoint`] pairs a verb and a path template with the body shapes the
//! endpoint answers with: `T` for statuses in the success table and `E` for
//! statuses in the error table. Descriptors are `const`-constructible so a
//! generated or hand-written registry can keep them in `static` items.
//!
//! ```rust,ignore
//! pub const GET_USER: Endpoint<User, Problem> = Endpoint::get("/api/users/{uuid}/");
//!
//! let me = client.call(&GET_USER, RequestParams::new().path("uuid", "me")).await?;
//! ```

use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;

use crate::http::HttpMethod;
use crate::path::placeholders;

pub struct Endpoint<T, E = Value> {
    method: HttpMethod,
    path: &'static str,
    _shape: PhantomData<fn() -> (T, E)>,
}

impl<T, E> Endpoint<T, E> {
    pub const fn new(method: HttpMethod, path: &'static str) -> Self {
        Self {
            method,
            path,
            _shape: PhantomData,
        }
    }

    pub const fn get(path: &'static str) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub const fn post(path: &'static str) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub const fn put(path: &'static str) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub const fn patch(path: &'static str) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub const fn delete(path: &'static str) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    /// Path parameter names in template order.
    pub fn placeholders(&self) -> Vec<&'static str> {
        placeholders(self.path)
    }
}

// Manual impls: the shape parameters carry no data.
impl<T, E> Clone for Endpoint<T, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, E> Copy for Endpoint<T, E> {}

impl<T, E> fmt::Debug for Endpoint<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish()
    }
}
