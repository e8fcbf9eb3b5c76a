//! C-ABI wrapper around `typed-fetch-core`.
//!
//! # Overview
//! Exposes the sans-IO dispatcher through `extern "C"` functions so any
//! language with a C FFI can resolve, encode, decode and classify HTTP calls
//! while doing the network I/O itself.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - A call is `tf_params_*` to describe it, `tf_build_request` to get the
//!   request, then `tf_finish` with the host's response.
//! - A single `FfiDispatchResult` envelope with `FfiDataTag` + byte buffer
//!   conveys decoded bodies and errors uniformly.
//! - The caller owns all returned pointers and must call the matching
//!   `tf_*_free` / `tf_free_*` function to release them.

pub mod types;

use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::Value;
use typed_fetch_core::{classify, ClientConfig, Dispatcher, HttpMethod, RequestBody, RequestParams};

use types::*;

// ---------------------------------------------------------------------------
// Dispatcher lifecycle
// ---------------------------------------------------------------------------

/// Create a new `Dispatcher` bound to `base_url`.
///
/// Returns null if `base_url` is null or not UTF-8.
/// The caller must free the returned pointer with `tf_dispatcher_free`.
#[unsafe(no_mangle)]
pub extern "C" fn tf_dispatcher_new(
    base_url: *const c_char,
    strict_path_params: bool,
    unclassified_status_is_error: bool,
) -> *mut FfiDispatcher {
    catch_unwind(|| {
        let Some(url) = read_str(base_url) else {
            return std::ptr::null_mut();
        };
        let config = ClientConfig::new(&url)
            .strict_path_params(strict_path_params)
            .unclassified_status_is_error(unclassified_status_is_error);
        let inner = Dispatcher::with_config(config);
        Box::into_raw(Box::new(FfiDispatcher { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a `Dispatcher` created by `tf_dispatcher_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn tf_dispatcher_free(dispatcher: *mut FfiDispatcher) {
    if !dispatcher.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(dispatcher) });
        });
    }
}

// ---------------------------------------------------------------------------
// Request parameters
// ---------------------------------------------------------------------------

/// Create an empty parameter set. Free with `tf_params_free`.
#[unsafe(no_mangle)]
pub extern "C" fn tf_params_new() -> *mut FfiParams {
    catch_unwind(|| {
        Box::into_raw(Box::new(FfiParams {
            inner: RequestParams::new(),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a parameter set created by `tf_params_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn tf_params_free(params: *mut FfiParams) {
    if !params.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(params) });
        });
    }
}

/// Run `f` on the parameters behind `params`. Returns false on a null
/// handle, a panic, or when `f` rejects its input.
fn with_params(params: *mut FfiParams, f: impl FnOnce(&mut RequestParams) -> bool) -> bool {
    if params.is_null() {
        return false;
    }
    catch_unwind(AssertUnwindSafe(|| {
        let params = unsafe { &mut *params };
        f(&mut params.inner)
    }))
    .unwrap_or(false)
}

/// Set the value for path placeholder `name`, replacing any previous value.
#[unsafe(no_mangle)]
pub extern "C" fn tf_params_set_path(
    params: *mut FfiParams,
    name: *const c_char,
    value: *const c_char,
) -> bool {
    with_params(params, |p| match (read_str(name), read_str(value)) {
        (Some(name), Some(value)) => {
            p.path.insert(name, value);
            true
        }
        _ => false,
    })
}

/// Add a query value under `name`.
///
/// Adding the same name twice sends the key once per value, in order. A null
/// `value` records a null that the encoder omits.
#[unsafe(no_mangle)]
pub extern "C" fn tf_params_add_query(
    params: *mut FfiParams,
    name: *const c_char,
    value: *const c_char,
) -> bool {
    with_params(params, |p| {
        let Some(name) = read_str(name) else {
            return false;
        };
        let value = if value.is_null() {
            Value::Null
        } else {
            match read_str(value) {
                Some(value) => Value::String(value),
                None => return false,
            }
        };

        let query = p.query.get_or_insert_with(Default::default);
        match query.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                query.insert(name, value);
            }
        }
        true
    })
}

/// Set header `name`, replacing a previous value under any letter case.
#[unsafe(no_mangle)]
pub extern "C" fn tf_params_set_header(
    params: *mut FfiParams,
    name: *const c_char,
    value: *const c_char,
) -> bool {
    with_params(params, |p| {
        let (Some(name), Some(value)) = (read_str(name), read_str(value)) else {
            return false;
        };
        p.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(&name));
        p.headers.push((name, value));
        true
    })
}

/// Use the JSON document `json` as the request body.
///
/// Returns false if `json` is null or does not parse.
#[unsafe(no_mangle)]
pub extern "C" fn tf_params_set_json_body(params: *mut FfiParams, json: *const c_char) -> bool {
    with_params(params, |p| {
        let Some(value) = read_str(json).and_then(|s| serde_json::from_str::<Value>(&s).ok())
        else {
            return false;
        };
        p.body = Some(RequestBody::Json(value));
        true
    })
}

/// Use `text` as a plain-text request body.
#[unsafe(no_mangle)]
pub extern "C" fn tf_params_set_text_body(params: *mut FfiParams, text: *const c_char) -> bool {
    with_params(params, |p| match read_str(text) {
        Some(text) => {
            p.body = Some(RequestBody::Text(text));
            true
        }
        None => false,
    })
}

// ---------------------------------------------------------------------------
// Build / finish
// ---------------------------------------------------------------------------

/// Build the request for `method` on `template`.
///
/// `method` is a verb name in any letter case. Returns null on failure and,
/// when `error_out` is not null, stores the reason there. `params` may be
/// null for a call without parameters.
/// The caller must free the returned pointer with `tf_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn tf_build_request(
    dispatcher: *const FfiDispatcher,
    method: *const c_char,
    template: *const c_char,
    params: *const FfiParams,
    error_out: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    let (request, code) = catch_unwind(AssertUnwindSafe(|| {
        if dispatcher.is_null() {
            return (std::ptr::null_mut(), FfiErrorCode::NullArg);
        }
        let (Some(method), Some(template)) = (read_str(method), read_str(template)) else {
            return (std::ptr::null_mut(), FfiErrorCode::NullArg);
        };
        let method: HttpMethod = match method.parse() {
            Ok(m) => m,
            Err(err) => return (std::ptr::null_mut(), FfiErrorCode::from(&err)),
        };

        let dispatcher = unsafe { &*dispatcher };
        let empty = RequestParams::new();
        let params = if params.is_null() {
            &empty
        } else {
            unsafe { &(*params).inner }
        };

        match dispatcher.inner.build(method, &template, params) {
            Ok(req) => (FfiHttpRequest::from_core(req), FfiErrorCode::Ok),
            Err(err) => (std::ptr::null_mut(), FfiErrorCode::from(&err)),
        }
    }))
    .unwrap_or((std::ptr::null_mut(), FfiErrorCode::Panic));

    if !error_out.is_null() {
        unsafe { *error_out = code };
    }
    request
}

/// Decode and classify the host's response to a built request.
///
/// `throw_on_status_error` uses tri-state: -1 = default (raise),
/// 0 = never raise, 1 = raise. Either way the result carries `ok`,
/// `http_status` and the decoded body.
/// The caller must free the returned pointer with `tf_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn tf_finish(
    dispatcher: *const FfiDispatcher,
    response: *const FfiHttpResponse,
    throw_on_status_error: i32,
) -> *mut FfiDispatchResult {
    catch_unwind(|| {
        if dispatcher.is_null() {
            return FfiDispatchResult::null_arg("dispatcher");
        }
        if response.is_null() {
            return FfiDispatchResult::null_arg("response");
        }
        let dispatcher = unsafe { &*dispatcher };
        let response = unsafe { &*response }.to_core();
        let throw = throw_on_status_error != 0;

        match dispatcher.inner.finish(response, throw) {
            Ok(envelope) => FfiDispatchResult::from_response(envelope),
            Err(err) => FfiDispatchResult::from_error(err),
        }
    })
    .unwrap_or_else(|_| FfiDispatchResult::panic("panic during tf_finish"))
}

/// Classify `status` without a dispatcher.
#[unsafe(no_mangle)]
pub extern "C" fn tf_classify_status(status: u16) -> FfiStatusClass {
    classify(status).into()
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by `tf_build_request`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn tf_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        tf_free_string(req.url);
        free_c_bytes(req.body, req.body_len);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                tf_free_string(h.key);
                tf_free_string(h.value);
            }
        }
    });
}

/// Free an `FfiDispatchResult` returned by `tf_finish`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn tf_free_result(result: *mut FfiDispatchResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        tf_free_string(result.error_message);
        free_c_bytes(result.data, result.data_len);
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn tf_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { std::ffi::CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
