//! Request-line scanner.
//!
//! Locates the method, request target, and version of the first line of an
//! HTTP/1.x message without copying anything:
//!
//! ```text
//! request-line = method SP+ request-target SP+ HTTP-version CRLF
//! ```
//!
//! RFC 7230 mandates exactly one SP between tokens; runs of spaces are
//! accepted here. Every delimiter search takes the *first* match inside the
//! request line, so an unencoded space in the target splits it.

use log::trace;

use crate::error::RequestError;
use crate::span::Span;

pub(crate) const CRLF: &[u8] = b"\r\n";
const SP: u8 = b' ';

/// Spans produced by [`scan_request_line`]. A field stays `None` until its
/// stage succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestLine {
    /// The whole line, excluding the terminating CRLF.
    pub line: Option<Span>,
    pub method: Option<Span>,
    pub uri: Option<Span>,
    pub version: Option<Span>,
}

/// Scan the request line at the start of `buf`, recording spans into `out`
/// as each stage completes.
///
/// # Errors
///
/// - [`RequestError::REQUEST_LINE`] when `buf` contains no CRLF.
/// - [`RequestError::METHOD`] when no space follows the method inside the
///   line, or the method is empty.
/// - [`RequestError::URI`] when the target is empty.
/// - [`RequestError::VERSION`] when the version is empty. This includes a
///   line such as `GET /` where nothing follows the target.
///
/// Spans recorded before the failing stage stay valid.
pub fn scan_request_line(buf: &[u8], out: &mut RequestLine) -> Result<(), RequestError> {
    *out = RequestLine::default();

    let line_end = find(buf, CRLF).ok_or(RequestError::REQUEST_LINE)?;
    let line = &buf[..line_end];
    out.line = Some(Span::new(0, line_end));

    let method_end = match line.iter().position(|&b| b == SP) {
        Some(0) | None => return Err(RequestError::METHOD),
        Some(end) => end,
    };
    out.method = Some(Span::new(0, method_end));

    let uri_start = skip_spaces(line, method_end + 1);
    let uri_end = line[uri_start..]
        .iter()
        .position(|&b| b == SP)
        .map_or(line_end, |i| uri_start + i);
    if uri_end == uri_start {
        return Err(RequestError::URI);
    }
    out.uri = Some(Span::new(uri_start, uri_end));

    let version_start = skip_spaces(line, uri_end + 1);
    if version_start == line_end {
        return Err(RequestError::VERSION);
    }
    out.version = Some(Span::new(version_start, line_end));

    trace!(
        "request line [0, {line_end}): method={:?} uri={:?} version={:?}",
        out.method, out.uri, out.version
    );
    Ok(())
}

/// Offset of the first occurrence of `needle` in `haystack`.
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// First index at or after `from` that is not a space, clamped to the line.
#[inline]
fn skip_spaces(line: &[u8], from: usize) -> usize {
    let mut i = from.min(line.len());
    while i < line.len() && line[i] == SP {
        i += 1;
    }
    i
}
