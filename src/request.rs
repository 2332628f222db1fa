use log::{debug, warn};

use crate::error::{RequestError, ValidateError};
use crate::headers::parse_header_block;
use crate::list::HeaderList;
use crate::scanner::{CRLF, RequestLine, scan_request_line};
use crate::span::Span;
use crate::types::{HttpMethod, HttpVersion, RequestStatus};
use crate::validate;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Buffer size and header limits for a [`Request`].
///
/// All sizes are in bytes unless stated otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Capacity of the owned request buffer (default: 8 192).
    pub capacity: usize,
    /// Maximum number of header fields (default: 128).
    pub max_headers_count: usize,
    /// Maximum length of a single header field name (default: 256).
    pub max_header_name_len: usize,
    /// Maximum length of a single header field value, after unfolding
    /// (default: 8 192).
    pub max_header_value_len: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            capacity: 8_192,
            max_headers_count: 128,
            max_header_name_len: 256,
            max_header_value_len: 8_192,
        }
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// An HTTP/1.x request held in a fixed-capacity buffer it owns.
///
/// Parsing copies the input into the buffer and records byte spans for each
/// part of the message. Accessors resolve those spans against the buffer, so
/// the returned slices borrow the `Request` and cannot outlive it.
///
/// ```rust
/// use lhttp::{Request, RequestStatus};
///
/// let mut req = Request::new(64).unwrap();
/// req.parse(b"GET / HTTP/1.1\r\nHost: localhost:8080\r\n\r\n").unwrap();
///
/// assert_eq!(req.status(), RequestStatus::Done);
/// assert_eq!(req.method_bytes(), Some(&b"GET"[..]));
/// assert_eq!(req.request_line_span().map(|s| s.len()), Some(14));
/// assert_eq!(req.headers().get("Host"), Ok("localhost:8080"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: Option<HttpMethod>,
    version: Option<HttpVersion>,
    uri: Option<String>,
    status: RequestStatus,
    error: RequestError,
    config: ParserConfig,

    buf: Vec<u8>,
    len: usize,

    line: RequestLine,
    headers_span: Option<Span>,
    body_span: Option<Span>,
    headers: HeaderList,
}

impl Request {
    /// Create a request whose buffer holds exactly `capacity` bytes, with
    /// default header limits.
    ///
    /// # Errors
    ///
    /// [`RequestError::MEMORY_ALLOCATION`] if the buffer cannot be allocated.
    pub fn new(capacity: usize) -> Result<Self, RequestError> {
        Self::with_config(ParserConfig {
            capacity,
            ..ParserConfig::default()
        })
    }

    /// Create a request from a full [`ParserConfig`].
    ///
    /// # Errors
    ///
    /// [`RequestError::MEMORY_ALLOCATION`] if the buffer cannot be allocated.
    pub fn with_config(config: ParserConfig) -> Result<Self, RequestError> {
        let capacity = config.capacity;
        let mut request = Self {
            config,
            ..Self::default()
        };
        request.init(capacity)?;
        Ok(request)
    }

    /// (Re)initialize with a zero-filled buffer of `capacity` bytes. Every
    /// span, resolved field, and stored header is cleared.
    ///
    /// # Errors
    ///
    /// [`RequestError::MEMORY_ALLOCATION`] if the buffer cannot be
    /// allocated; the request is then left in [`RequestStatus::Error`] with
    /// no buffer, no headers, and its previous configured capacity.
    pub fn init(&mut self, capacity: usize) -> Result<(), RequestError> {
        self.clear_parse_state();
        self.headers.free();
        self.buf = Vec::new();

        let mut buf = Vec::new();
        if buf.try_reserve_exact(capacity).is_err() {
            warn!("request: cannot allocate a {capacity}-byte buffer");
            return self.fail(RequestError::MEMORY_ALLOCATION);
        }
        buf.resize(capacity, 0);
        self.buf = buf;
        self.config.capacity = capacity;

        if self.headers.init().is_err() {
            return self.fail(RequestError::MEMORY_ALLOCATION);
        }
        self.status = RequestStatus::Initialized;
        Ok(())
    }

    /// Copy `data` into the owned buffer and parse it.
    ///
    /// The request line is scanned first; on success the method and version
    /// are resolved, the target is copied out, and the header block is parsed
    /// into [`headers`](Self::headers). Any previous parse result is
    /// discarded before the new one starts.
    ///
    /// # Errors
    ///
    /// - [`RequestError::UNKNOWN`] if the request was never initialized.
    ///   Nothing is modified in that case.
    /// - [`RequestError::CAPACITY`] if `data` is longer than the buffer.
    ///   Nothing is copied.
    /// - A request-line error (see [`scan_request_line`]).
    /// - [`RequestError::HEADERS`] if the header block is malformed.
    ///
    /// Every error except the first is also recorded in
    /// [`error`](Self::error) and moves the request to
    /// [`RequestStatus::Error`].
    ///
    /// [`scan_request_line`]: crate::scan_request_line
    pub fn parse(&mut self, data: &[u8]) -> Result<(), RequestError> {
        if self.status == RequestStatus::Unset {
            warn!("request: parse called before init");
            return Err(RequestError::UNKNOWN);
        }

        self.clear_parse_state();
        if self.headers.init().is_err() {
            return self.fail(RequestError::MEMORY_ALLOCATION);
        }
        self.status = RequestStatus::ParsingOngoing;

        if data.len() > self.buf.len() {
            warn!(
                "request: {} bytes of input exceed the {}-byte buffer",
                data.len(),
                self.buf.len()
            );
            return self.fail(RequestError::CAPACITY);
        }
        self.buf[..data.len()].copy_from_slice(data);
        self.buf[data.len()..].fill(0);
        self.len = data.len();

        if let Err(err) = scan_request_line(&self.buf[..self.len], &mut self.line) {
            warn!("request: malformed request line ({err})");
            return self.fail(err);
        }
        self.resolve_request_line();

        let headers_start = self.line.line.map_or(0, |line| line.end + CRLF.len());
        match parse_header_block(
            &self.buf[..self.len],
            headers_start,
            &self.config,
            &mut self.headers,
        ) {
            Ok(block) => {
                self.headers_span = Some(block.headers);
                self.body_span = block.body;
            }
            Err(err) => return self.fail(err),
        }

        self.status = RequestStatus::Done;
        debug!(
            "request: parsed {} bytes, {} header field(s), {} body byte(s)",
            self.len,
            self.headers.len(),
            self.body_span.map_or(0, |s| s.len())
        );
        Ok(())
    }

    /// Derive an HTTP status code for this request. See
    /// [`validate`](crate::validate()).
    ///
    /// # Errors
    ///
    /// [`ValidateError::NotParsed`] if `parse` has not run yet.
    pub fn validate(&self) -> Result<u16, ValidateError> {
        validate::validate(self)
    }

    /// Release the buffer and every span into it, returning to
    /// [`RequestStatus::Unset`]. The header limits are kept.
    pub fn free(&mut self) {
        let config = ParserConfig {
            capacity: 0,
            ..std::mem::take(&mut self.config)
        };
        *self = Self {
            config,
            ..Self::default()
        };
    }

    // ----- helpers --------------------------------------------------------

    fn clear_parse_state(&mut self) {
        self.method = None;
        self.version = None;
        self.uri = None;
        self.error = RequestError::NONE;
        self.len = 0;
        self.line = RequestLine::default();
        self.headers_span = None;
        self.body_span = None;
    }

    fn resolve_request_line(&mut self) {
        let method = self.method_bytes().and_then(HttpMethod::from_bytes);
        let version = self.version_bytes().and_then(HttpVersion::from_bytes);
        let uri = self
            .uri_bytes()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned());
        self.method = method;
        self.version = version;
        self.uri = uri;
    }

    fn fail(&mut self, err: RequestError) -> Result<(), RequestError> {
        self.error |= err;
        self.status = RequestStatus::Error;
        Err(err)
    }

    fn resolve(&self, span: Option<Span>) -> Option<&[u8]> {
        span.and_then(|s| s.get(self.data()))
    }

    // ----- public queries -------------------------------------------------

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    /// Every error category recorded by the last `init` or `parse`.
    pub fn error(&self) -> RequestError {
        self.error
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Size of the owned buffer.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// The bytes copied in by the last `parse`.
    pub fn data(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Resolved method, if the token is a known one.
    pub fn method(&self) -> Option<HttpMethod> {
        self.method
    }

    /// Resolved version, if the token is `HTTP/1.0` or `HTTP/1.1`.
    pub fn version(&self) -> Option<HttpVersion> {
        self.version
    }

    /// Owned copy of the request target (lossy UTF-8).
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Header fields parsed from the header block.
    pub fn headers(&self) -> &HeaderList {
        &self.headers
    }

    pub fn request_line_span(&self) -> Option<Span> {
        self.line.line
    }

    pub fn method_span(&self) -> Option<Span> {
        self.line.method
    }

    pub fn uri_span(&self) -> Option<Span> {
        self.line.uri
    }

    pub fn version_span(&self) -> Option<Span> {
        self.line.version
    }

    pub fn headers_span(&self) -> Option<Span> {
        self.headers_span
    }

    pub fn body_span(&self) -> Option<Span> {
        self.body_span
    }

    pub fn request_line_bytes(&self) -> Option<&[u8]> {
        self.resolve(self.line.line)
    }

    pub fn method_bytes(&self) -> Option<&[u8]> {
        self.resolve(self.line.method)
    }

    pub fn uri_bytes(&self) -> Option<&[u8]> {
        self.resolve(self.line.uri)
    }

    pub fn version_bytes(&self) -> Option<&[u8]> {
        self.resolve(self.line.version)
    }

    pub fn headers_bytes(&self) -> Option<&[u8]> {
        self.resolve(self.headers_span)
    }

    /// Raw body bytes following the empty line, if the header block was
    /// terminated.
    pub fn body(&self) -> Option<&[u8]> {
        self.resolve(self.body_span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_is_zeroed_and_unparsed() {
        let req = Request::new(32).unwrap();
        assert_eq!(req.status(), RequestStatus::Initialized);
        assert_eq!(req.error(), RequestError::NONE);
        assert_eq!(req.capacity(), 32);
        assert!(req.buf.iter().all(|&b| b == 0));
        assert!(req.request_line_span().is_none());
        assert!(req.method_span().is_none());
        assert!(req.headers_span().is_none());
        assert!(req.body_span().is_none());
    }

    #[test]
    fn reparse_clears_stale_tail_and_spans() {
        let mut req = Request::new(64).unwrap();
        req.parse(b"OPTIONS /very/long/path HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.parse(b"GET\r\n"), Err(RequestError::METHOD));
        assert_eq!(req.data(), b"GET\r\n");
        assert!(req.buf[5..].iter().all(|&b| b == 0));
        assert!(req.uri_span().is_none());
        assert!(req.uri().is_none());
    }

    #[test]
    fn unset_request_rejects_parse_untouched() {
        let mut req = Request::default();
        assert_eq!(req.parse(b"GET / HTTP/1.1\r\n"), Err(RequestError::UNKNOWN));
        assert_eq!(req.status(), RequestStatus::Unset);
        assert_eq!(req.error(), RequestError::NONE);
    }

    #[test]
    fn failed_init_drops_previous_parse() {
        let mut req = Request::new(64).unwrap();
        req.parse(b"GET / HTTP/1.1\r\nHost: h\r\n\r\n").unwrap();
        assert_eq!(req.init(usize::MAX), Err(RequestError::MEMORY_ALLOCATION));
        assert_eq!(req.status(), RequestStatus::Error);
        assert_eq!(req.error(), RequestError::MEMORY_ALLOCATION);
        assert_eq!(req.capacity(), 0);
        assert_eq!(req.config().capacity, 64);
        assert!(req.headers().is_empty());
        assert!(req.headers().get("Host").is_err());
        assert!(req.method().is_none());
        assert!(req.data().is_empty());
    }

    #[test]
    fn free_returns_to_unset() {
        let mut req = Request::new(64).unwrap();
        req.parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();
        req.free();
        assert_eq!(req.status(), RequestStatus::Unset);
        assert_eq!(req.capacity(), 0);
        assert!(req.method_bytes().is_none());
        assert!(req.headers().is_empty());
    }
}
