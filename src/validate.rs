//! Status-code derivation for parsed requests.
//!
//! Rules, first match wins:
//!
//! | condition                                   | status |
//! |---------------------------------------------|--------|
//! | input larger than the buffer                | 413    |
//! | malformed request line or header block      | 400    |
//! | any other recorded error                    | 500    |
//! | method token not a known method             | 501    |
//! | version other than `HTTP/1.0` / `HTTP/1.1`  | 505    |
//! | `HTTP/1.1` without a `Host` field           | 400    |
//! | otherwise                                   | 200    |

use log::debug;

use crate::error::{RequestError, ValidateError};
use crate::request::Request;
use crate::types::{HttpVersion, RequestStatus};

pub const OK: u16 = 200;
pub const BAD_REQUEST: u16 = 400;
pub const PAYLOAD_TOO_LARGE: u16 = 413;
pub const INTERNAL_SERVER_ERROR: u16 = 500;
pub const NOT_IMPLEMENTED: u16 = 501;
pub const HTTP_VERSION_NOT_SUPPORTED: u16 = 505;

/// Derive the HTTP status code a server should answer `request` with.
///
/// A rejected request is still a successful call: the status code carries
/// the rejection.
///
/// # Errors
///
/// [`ValidateError::NotParsed`] if the request is not in
/// [`RequestStatus::Done`] or [`RequestStatus::Error`].
pub fn validate(request: &Request) -> Result<u16, ValidateError> {
    let status = request.status();
    if !matches!(status, RequestStatus::Done | RequestStatus::Error) {
        return Err(ValidateError::NotParsed(status));
    }

    let code = status_for(request);
    debug!("validate: {status} request -> {code}");
    Ok(code)
}

fn status_for(request: &Request) -> u16 {
    let error = request.error();
    if error.contains(RequestError::CAPACITY) {
        return PAYLOAD_TOO_LARGE;
    }
    if error.intersects(RequestError::REQUEST_LINE | RequestError::HEADERS) {
        return BAD_REQUEST;
    }
    if !error.is_empty() {
        return INTERNAL_SERVER_ERROR;
    }

    if request.method().is_none() {
        return NOT_IMPLEMENTED;
    }
    let Some(version) = request.version() else {
        return HTTP_VERSION_NOT_SUPPORTED;
    };
    if version == HttpVersion::Http11 && !has_host(request) {
        return BAD_REQUEST;
    }
    OK
}

fn has_host(request: &Request) -> bool {
    request
        .headers()
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case("host"))
}
