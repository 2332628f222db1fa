//! # lhttp
//!
//! A small, **allocation-conscious HTTP/1.x request parser** built from two
//! independent pieces:
//!
//! - a zero-copy request-line scanner that records byte spans for the
//!   method, target, and version inside a fixed-capacity buffer owned by a
//!   [`Request`];
//! - [`HeaderList`], an insertion-ordered key/value list that rejects
//!   duplicate keys, used to hold header fields.
//!
//! The request-line grammar is looser than RFC 7230 in one respect: runs of
//! spaces between tokens are accepted where the RFC requires exactly one.
//!
//! ```text
//! request-line = method SP+ request-target SP+ HTTP-version CRLF
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use lhttp::{HttpMethod, Request};
//!
//! let raw = b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n";
//! let mut request = Request::new(raw.len()).unwrap();
//! request.parse(raw).unwrap();
//!
//! assert_eq!(request.method(), Some(HttpMethod::GET));
//! assert_eq!(request.uri_bytes(), Some(&b"/hello"[..]));
//! assert_eq!(request.headers().get("Host"), Ok("example.com"));
//! assert_eq!(request.validate(), Ok(200));
//! ```
//!
//! ## Scanning without a `Request`
//!
//! ```rust
//! use lhttp::{RequestError, RequestLine, scan_request_line};
//!
//! let mut spans = RequestLine::default();
//! let err = scan_request_line(b"GET /\r\n", &mut spans).unwrap_err();
//!
//! assert_eq!(err, RequestError::VERSION);
//! assert!(spans.uri.is_some());
//! ```

mod error;
mod headers;
mod list;
mod output;
mod request;
mod scanner;
mod span;
mod types;
pub mod validate;

// Re-export public API.
pub use error::{ListError, RequestError, ValidateError};
pub use list::{HeaderIter, HeaderList, ListState};
pub use output::{format_debug, format_headers_only, format_json};
pub use request::{ParserConfig, Request};
pub use scanner::{RequestLine, scan_request_line};
pub use span::Span;
pub use types::{HttpMethod, HttpVersion, RequestStatus};
pub use validate::validate;

/// Parse a **complete** request in one call, sizing the buffer to `data`.
///
/// # Errors
///
/// Returns the [`RequestError`] of the failing stage.
pub fn parse_request(data: &[u8]) -> Result<Request, RequestError> {
    parse_request_with_config(
        data,
        ParserConfig {
            capacity: data.len(),
            ..ParserConfig::default()
        },
    )
}

/// Parse a **complete** request using custom [`ParserConfig`] limits.
///
/// # Errors
///
/// Returns the [`RequestError`] of the failing stage, including
/// [`RequestError::CAPACITY`] when `data` does not fit `config.capacity`.
pub fn parse_request_with_config(
    data: &[u8],
    config: ParserConfig,
) -> Result<Request, RequestError> {
    let mut request = Request::with_config(config)?;
    request.parse(data)?;
    Ok(request)
}
