//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` for strings, pointer plus length for byte buffers, and
//! tagged enums with explicit discriminants. Conversions live here so that
//! `lib.rs` only holds the `extern "C"` surface.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use typed_fetch_core::decode::ResponseData;
use typed_fetch_core::{
    DispatchError, Dispatcher, HttpMethod, HttpRequest, HttpResponse, RequestParams, Response,
    StatusClass,
};

/// Opaque handle to a `Dispatcher`.
pub struct FfiDispatcher {
    pub(crate) inner: Dispatcher,
}

/// Opaque handle to the parameters of one call.
pub struct FfiParams {
    pub(crate) inner: RequestParams,
}

/// Copy a C string into an owned `String`. Null or non-UTF-8 gives `None`.
pub(crate) fn read_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .ok()
        .map(str::to_string)
}

/// Hand an owned C string to the caller. Interior NULs are dropped.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    let bytes: Vec<u8> = s.into_bytes().into_iter().filter(|b| *b != 0).collect();
    CString::new(bytes).unwrap_or_default().into_raw()
}

/// Hand an owned byte buffer to the caller. Empty buffers are null.
pub(crate) fn into_c_bytes(bytes: Vec<u8>) -> (*mut u8, usize) {
    if bytes.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let len = bytes.len();
    (Box::into_raw(bytes.into_boxed_slice()) as *mut u8, len)
}

/// Reclaim a buffer produced by [`into_c_bytes`].
pub(crate) fn free_c_bytes(ptr: *mut u8, len: usize) {
    if !ptr.is_null() && len > 0 {
        drop(unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len)) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Put = 1,
    Post = 2,
    Delete = 3,
    Options = 4,
    Head = 5,
    Patch = 6,
    Trace = 7,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Delete => FfiHttpMethod::Delete,
            HttpMethod::Options => FfiHttpMethod::Options,
            HttpMethod::Head => FfiHttpMethod::Head,
            HttpMethod::Patch => FfiHttpMethod::Patch,
            HttpMethod::Trace => FfiHttpMethod::Trace,
        }
    }
}

/// A single HTTP header owned by this library.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `tf_build_request`. The caller executes the request and passes
/// the response back through `tf_finish`. `url` already carries the encoded
/// query string. `body` is null when there is no body.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut u8,
    pub body_len: usize,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let url = into_c_string(req.url);
        let (body, body_len) = into_c_bytes(req.body.map(|b| b.to_vec()).unwrap_or_default());

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: into_c_string(k),
                    value: into_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
            body_len,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// A header borrowed from the caller.
#[repr(C)]
pub struct FfiHeaderView {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// An HTTP response described as C-compatible plain data.
///
/// The caller builds this after executing a request and passes a pointer to
/// `tf_finish`. The FFI layer copies but never frees these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub headers: *const FfiHeaderView,
    pub headers_len: u32,
    pub body: *const u8,
    pub body_len: usize,
}

impl FfiHttpResponse {
    /// Copy into a core `HttpResponse`. Headers with a null or non-UTF-8
    /// name or value are skipped.
    pub(crate) fn to_core(&self) -> HttpResponse {
        let headers = if self.headers.is_null() || self.headers_len == 0 {
            Vec::new()
        } else {
            unsafe { std::slice::from_raw_parts(self.headers, self.headers_len as usize) }
                .iter()
                .filter_map(|h| Some((read_str(h.key)?, read_str(h.value)?)))
                .collect()
        };
        let body = if self.body.is_null() || self.body_len == 0 {
            Vec::new()
        } else {
            unsafe { std::slice::from_raw_parts(self.body, self.body_len) }.to_vec()
        };
        HttpResponse {
            status: self.status,
            headers,
            body: body.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned by `tf_build_request` and in `FfiDispatchResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Status = 1,
    MissingPathParam = 2,
    Serialization = 3,
    Deserialization = 4,
    InvalidArgument = 5,
    Transport = 6,
    Panic = 7,
    NullArg = 8,
}

impl From<&DispatchError> for FfiErrorCode {
    fn from(err: &DispatchError) -> Self {
        match err {
            DispatchError::Status(_) => FfiErrorCode::Status,
            DispatchError::MissingPathParam { .. } => FfiErrorCode::MissingPathParam,
            DispatchError::Serialization(_) => FfiErrorCode::Serialization,
            DispatchError::Deserialization(_) => FfiErrorCode::Deserialization,
            DispatchError::InvalidQuery { .. } | DispatchError::UnsupportedMethod { .. } => {
                FfiErrorCode::InvalidArgument
            }
            DispatchError::Transport(_) => FfiErrorCode::Transport,
        }
    }
}

/// What `FfiDispatchResult::data` holds.
///
/// `Json` data is the compact JSON text of the decoded value.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Text = 1,
    Bytes = 2,
    Json = 3,
}

/// Status classification as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiStatusClass {
    Success = 0,
    Error = 1,
    Unclassified = 2,
}

impl From<StatusClass> for FfiStatusClass {
    fn from(class: StatusClass) -> Self {
        match class {
            StatusClass::Success => FfiStatusClass::Success,
            StatusClass::Error => FfiStatusClass::Error,
            StatusClass::Unclassified => FfiStatusClass::Unclassified,
        }
    }
}

/// Result envelope for `tf_finish`.
///
/// On success `error_code` is `Ok` and `error_message` is null. A raised
/// status error has `error_code = Status` and still carries the decoded
/// error body in `data`. Other failures leave `data` null.
#[repr(C)]
pub struct FfiDispatchResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub ok: bool,
    pub data_tag: FfiDataTag,
    pub data: *mut u8,
    pub data_len: usize,
}

impl FfiDispatchResult {
    fn alloc(self) -> *mut Self {
        Box::into_raw(Box::new(self))
    }

    fn with_data(error_code: FfiErrorCode, error_message: *mut c_char, response: Response) -> Self {
        let (data_tag, bytes) = match response.data {
            ResponseData::Empty => (FfiDataTag::None, Vec::new()),
            ResponseData::Text(text) => (FfiDataTag::Text, text.into_bytes()),
            ResponseData::Bytes(bytes) => (FfiDataTag::Bytes, bytes.to_vec()),
            ResponseData::Json(value) => (FfiDataTag::Json, value.to_string().into_bytes()),
        };
        let (data, data_len) = into_c_bytes(bytes);
        FfiDispatchResult {
            error_code,
            error_message,
            http_status: response.status,
            ok: response.ok,
            data_tag,
            data,
            data_len,
        }
    }

    /// Build a result from a classified response.
    pub(crate) fn from_response(response: Response) -> *mut Self {
        Self::with_data(FfiErrorCode::Ok, std::ptr::null_mut(), response).alloc()
    }

    /// Build an error result from a `DispatchError`.
    pub(crate) fn from_error(err: DispatchError) -> *mut Self {
        let error_code = FfiErrorCode::from(&err);
        let message = into_c_string(err.to_string());
        match err {
            DispatchError::Status(status) => {
                Self::with_data(error_code, message, status.response).alloc()
            }
            _ => Self::failure(error_code, message).alloc(),
        }
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, into_c_string(format!("null argument: {name}"))).alloc()
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, into_c_string(msg.to_string())).alloc()
    }

    fn failure(error_code: FfiErrorCode, error_message: *mut c_char) -> Self {
        FfiDispatchResult {
            error_code,
            error_message,
            http_status: 0,
            ok: false,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
            data_len: 0,
        }
    }
}
