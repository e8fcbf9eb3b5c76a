//! Fixed partition of HTTP status codes.
//!
//! Membership is an explicit table lookup. Several codes inside the 4xx and
//! 5xx ranges (418, 419, 420, 427, 430, ...) belong to neither set.

/// Statuses whose responses are reported with `ok == true`.
pub const SUCCESS_STATUSES: [u16; 19] = [
    200, 201, 202, 203, 204, 205, 206, 207, 208, 226, //
    300, 301, 302, 303, 304, 305, 306, 307, 308,
];

/// Statuses that raise a `StatusError` when the caller opted into throwing.
pub const ERROR_STATUSES: [u16; 40] = [
    400, 401, 402, 403, 404, 405, 406, 407, 408, 409, 410, 411, 412, 413, 414, 415, 416, 417, //
    421, 422, 423, 424, 425, 426, 428, 429, 431, 451, //
    500, 501, 502, 503, 504, 505, 506, 507, 508, 509, 510, 511,
];

/// Which of the two fixed sets a status belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    Success,
    Error,
    /// In neither table. Reported as not ok.
    Unclassified,
}

pub fn classify(status: u16) -> StatusClass {
    if is_success(status) {
        StatusClass::Success
    } else if is_error(status) {
        StatusClass::Error
    } else {
        StatusClass::Unclassified
    }
}

pub fn is_success(status: u16) -> bool {
    SUCCESS_STATUSES.binary_search(&status).is_ok()
}

pub fn is_error(status: u16) -> bool {
    ERROR_STATUSES.binary_search(&status).is_ok()
}
