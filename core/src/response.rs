//! The per-call response envelope.

use serde::de::DeserializeOwned;

use crate::decode::ResponseData;
use crate::error::DispatchError;
use crate::http::find_header;
use crate::status::{classify, StatusClass};

/// Status, headers and decoded body of one call.
///
/// `ok` is true only for statuses in the success table; unclassified
/// statuses are not ok.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub ok: bool,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub data: ResponseData,
}

impl Response {
    pub fn class(&self) -> StatusClass {
        classify(self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Deserialize the decoded body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, DispatchError> {
        self.data.deserialize().map_err(DispatchError::Deserialization)
    }

    pub fn into_data(self) -> ResponseData {
        self.data
    }

    /// Deserialize the body with the shape matching the status class:
    /// `T` for success statuses, `E` for error statuses. Unclassified
    /// statuses keep the untyped body.
    pub fn into_typed<T, E>(self) -> Result<TypedResponse<T, E>, DispatchError>
    where
        T: DeserializeOwned,
        E: DeserializeOwned,
    {
        let data = match self.class() {
            StatusClass::Success => TypedData::Success(self.json()?),
            StatusClass::Error => TypedData::Failure(self.json()?),
            StatusClass::Unclassified => TypedData::Unclassified(self.data),
        };
        Ok(TypedResponse {
            ok: self.ok,
            status: self.status,
            headers: self.headers,
            data,
        })
    }
}

/// Body of a [`TypedResponse`], keyed by status class.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedData<T, E> {
    Success(T),
    Failure(E),
    Unclassified(ResponseData),
}

/// A [`Response`] whose body was deserialized per status class.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedResponse<T, E> {
    pub ok: bool,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub data: TypedData<T, E>,
}

impl<T, E> TypedResponse<T, E> {
    pub fn success(&self) -> Option<&T> {
        match &self.data {
            TypedData::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&E> {
        match &self.data {
            TypedData::Failure(value) => Some(value),
            _ => None,
        }
    }

    /// Convert into a `Result`, treating anything but a success body as `Err`
    /// carrying the original status.
    pub fn into_result(self) -> Result<T, (u16, TypedData<T, E>)> {
        match self.data {
            TypedData::Success(value) => Ok(value),
            other => Err((self.status, other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        username: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Problem {
        detail: String,
    }

    fn response(status: u16, ok: bool, data: ResponseData) -> Response {
        Response {
            ok,
            status,
            headers: vec![("X-Request-Id".to_string(), "abc".to_string())],
            data,
        }
    }

    #[test]
    fn success_body_is_typed() {
        let resp = response(200, true, ResponseData::Json(json!({"username": "ada"})));
        let typed = resp.into_typed::<User, Problem>().unwrap();
        assert_eq!(typed.success(), Some(&User { username: "ada".to_string() }));
        assert!(typed.ok);
    }

    #[test]
    fn error_body_uses_error_shape() {
        let resp = response(404, false, ResponseData::Json(json!({"detail": "Not found."})));
        let typed = resp.into_typed::<User, Problem>().unwrap();
        assert_eq!(typed.failure().map(|p| p.detail.as_str()), Some("Not found."));
        assert_eq!(typed.into_result().unwrap_err().0, 404);
    }

    #[test]
    fn unclassified_body_stays_untyped() {
        let resp = response(418, false, ResponseData::Text("teapot".to_string()));
        let typed = resp.into_typed::<User, Problem>().unwrap();
        assert_eq!(typed.data, TypedData::Unclassified(ResponseData::Text("teapot".to_string())));
    }

    #[test]
    fn shape_mismatch_is_a_deserialization_error() {
        let resp = response(200, true, ResponseData::Json(json!({"id": 1})));
        let err = resp.into_typed::<User, Problem>().unwrap_err();
        assert!(matches!(err, DispatchError::Deserialization(_)));
    }

    #[test]
    fn header_lookup_ignores_case() {
        let resp = response(204, true, ResponseData::Empty);
        assert_eq!(resp.header("x-request-id"), Some("abc"));
    }
}
