//! Header-block parser.
//!
//! Walks the lines that follow the request line and feeds each field into a
//! [`HeaderList`]. The block ends at the first empty line; whatever follows
//! it is the body.
//!
//! ```text
//! header-field = field-name ":" OWS field-value OWS CRLF
//! obs-fold     = CRLF 1*( SP / HTAB )
//! ```
//!
//! Folded continuation lines (RFC 7230 §3.2.4) are joined onto the previous
//! value with a single SP.

use log::{debug, warn};

use crate::error::RequestError;
use crate::list::HeaderList;
use crate::request::ParserConfig;
use crate::scanner::{CRLF, find};
use crate::span::Span;

/// Bounds located by [`parse_header_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HeaderBlock {
    /// Header lines, excluding the terminating empty line.
    pub headers: Span,
    /// Bytes after the empty line. `None` if the block was not terminated.
    pub body: Option<Span>,
}

/// A field whose value may still grow through obs-fold lines.
struct PendingField {
    name: String,
    value: Vec<u8>,
}

/// Parse the header block of `buf` starting at `start` (just past the
/// request-line CRLF), inserting every field into `list`.
///
/// # Errors
///
/// [`RequestError::HEADERS`] for a malformed or unterminated line, a fold
/// with nothing to continue, a duplicate field name, or a breached limit.
pub(crate) fn parse_header_block(
    buf: &[u8],
    start: usize,
    config: &ParserConfig,
    list: &mut HeaderList,
) -> Result<HeaderBlock, RequestError> {
    let mut pos = start;
    let mut pending: Option<PendingField> = None;

    loop {
        let rest = &buf[pos..];
        let line_len = match find(rest, CRLF) {
            Some(0) => {
                commit(pending.take(), config, list)?;
                debug!("header block [{start}, {pos}) holds {} field(s)", list.len());
                return Ok(HeaderBlock {
                    headers: Span::new(start, pos),
                    body: Some(Span::new(pos + CRLF.len(), buf.len())),
                });
            }
            Some(len) => len,
            None if rest.is_empty() => {
                commit(pending.take(), config, list)?;
                debug!("header block [{start}, {pos}) has no terminating empty line");
                return Ok(HeaderBlock {
                    headers: Span::new(start, pos),
                    body: None,
                });
            }
            None => {
                warn!("header block: unterminated line at offset {pos}");
                return Err(RequestError::HEADERS);
            }
        };

        let line = &rest[..line_len];
        if is_ows(line[0]) {
            let field = pending.as_mut().ok_or_else(|| {
                warn!("header block: continuation line with no field at offset {pos}");
                RequestError::HEADERS
            })?;
            fold_into(field, line, config)?;
        } else {
            commit(pending.take(), config, list)?;
            pending = Some(parse_field(line, config)?);
        }
        pos += line_len + CRLF.len();
    }
}

fn parse_field(line: &[u8], config: &ParserConfig) -> Result<PendingField, RequestError> {
    let colon = line
        .iter()
        .position(|&b| b == b':')
        .ok_or(RequestError::HEADERS)?;
    let name = &line[..colon];

    if name.is_empty() || !name.iter().all(|&b| is_tchar(b)) {
        warn!("header block: invalid field name {:?}", String::from_utf8_lossy(name));
        return Err(RequestError::HEADERS);
    }
    if name.len() > config.max_header_name_len {
        return Err(RequestError::HEADERS);
    }

    let value = trim_ows(&line[colon + 1..]);
    check_value(value, config)?;

    Ok(PendingField {
        // tchar is ASCII, so the name is always valid UTF-8.
        name: String::from_utf8_lossy(name).into_owned(),
        value: value.to_vec(),
    })
}

fn fold_into(
    field: &mut PendingField,
    line: &[u8],
    config: &ParserConfig,
) -> Result<(), RequestError> {
    let extra = trim_ows(line);
    if extra.is_empty() {
        return Ok(());
    }
    if !field.value.is_empty() {
        field.value.push(b' ');
    }
    field.value.extend_from_slice(extra);
    check_value(&field.value, config)
}

fn check_value(value: &[u8], config: &ParserConfig) -> Result<(), RequestError> {
    if value.len() > config.max_header_value_len {
        warn!("header block: field value exceeds {} bytes", config.max_header_value_len);
        return Err(RequestError::HEADERS);
    }
    if !value.iter().all(|&b| is_field_content_byte(b)) {
        return Err(RequestError::HEADERS);
    }
    Ok(())
}

fn commit(
    field: Option<PendingField>,
    config: &ParserConfig,
    list: &mut HeaderList,
) -> Result<(), RequestError> {
    let Some(field) = field else {
        return Ok(());
    };
    if list.len() >= config.max_headers_count {
        warn!("header block: more than {} fields", config.max_headers_count);
        return Err(RequestError::HEADERS);
    }
    let value = String::from_utf8_lossy(&field.value);
    list.add(&field.name, &value).map_err(|err| {
        warn!("header block: cannot store {:?}: {err}", field.name);
        RequestError::HEADERS
    })
}

fn trim_ows(mut bytes: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = bytes {
        if !is_ows(*first) {
            break;
        }
        bytes = rest;
    }
    while let [rest @ .., last] = bytes {
        if !is_ows(*last) {
            break;
        }
        bytes = rest;
    }
    bytes
}

#[inline]
fn is_ows(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

// ---------------------------------------------------------------------------
// Character classification helpers (RFC 7230)
// ---------------------------------------------------------------------------

/// `tchar` – characters allowed in field names.
///
/// ```text
/// tchar = "!" / "#" / "$" / "%" / "&" / "'" / "*" / "+" / "-" / "." /
///         "^" / "_" / "`" / "|" / "~" / DIGIT / ALPHA
/// ```
#[inline]
fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// Bytes permitted inside a field value: `SP / HTAB / VCHAR / obs-text`.
#[inline]
fn is_field_content_byte(b: u8) -> bool {
    is_ows(b) || (0x21..=0x7E).contains(&b) || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ListError;

    fn run(block: &[u8]) -> (Result<HeaderBlock, RequestError>, HeaderList) {
        let mut list = HeaderList::new();
        list.init().unwrap();
        let res = parse_header_block(block, 0, &ParserConfig::default(), &mut list);
        (res, list)
    }

    #[test]
    fn tchar_classification() {
        for &b in b"abcXYZ019!#$%&'*+-.^_`|~" {
            assert!(is_tchar(b), "expected tchar for byte 0x{b:02X}");
        }
        for &b in b" \t\r\n@[]{}:" {
            assert!(!is_tchar(b), "expected non-tchar for byte 0x{b:02X}");
        }
    }

    #[test]
    fn field_content_rejects_ctl() {
        assert!(is_field_content_byte(b'\t'));
        assert!(is_field_content_byte(0xFF));
        assert!(!is_field_content_byte(0x00));
        assert!(!is_field_content_byte(0x7F));
    }

    #[test]
    fn fields_and_body() {
        let input = b"Host: example.com\r\nAccept:  */* \r\n\r\nhello";
        let (res, list) = run(input);
        let block = res.unwrap();
        assert_eq!(list.get("Host"), Ok("example.com"));
        assert_eq!(list.get("Accept"), Ok("*/*"));
        assert_eq!(block.headers, Span::new(0, 34));
        assert_eq!(block.body.and_then(|s| s.get(input)), Some(&b"hello"[..]));
    }

    #[test]
    fn obs_fold_joins_with_single_space() {
        let (res, list) = run(b"X-Long: first\r\n   second\r\n\tthird\r\n\r\n");
        assert!(res.is_ok());
        assert_eq!(list.get("X-Long"), Ok("first second third"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn fold_without_field_is_rejected() {
        let (res, _) = run(b" orphan\r\n\r\n");
        assert_eq!(res, Err(RequestError::HEADERS));
    }

    #[test]
    fn unterminated_line_is_rejected() {
        let (res, _) = run(b"Host: a\r\nAccept");
        assert_eq!(res, Err(RequestError::HEADERS));
    }

    #[test]
    fn missing_empty_line_leaves_body_unset() {
        let (res, list) = run(b"Host: a\r\n");
        let block = res.unwrap();
        assert_eq!(block.body, None);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let (res, list) = run(b"Host: a\r\nHost: b\r\n\r\n");
        assert_eq!(res, Err(RequestError::HEADERS));
        assert_eq!(list.error(), ListError::KeyExists);
    }

    #[test]
    fn missing_colon_and_bad_name() {
        assert_eq!(run(b"Host a\r\n\r\n").0, Err(RequestError::HEADERS));
        assert_eq!(run(b"Bad Name: a\r\n\r\n").0, Err(RequestError::HEADERS));
        assert_eq!(run(b": a\r\n\r\n").0, Err(RequestError::HEADERS));
    }

    #[test]
    fn header_count_limit() {
        let config = ParserConfig {
            max_headers_count: 1,
            ..ParserConfig::default()
        };
        let mut list = HeaderList::new();
        list.init().unwrap();
        let res = parse_header_block(b"A: 1\r\nB: 2\r\n\r\n", 0, &config, &mut list);
        assert_eq!(res, Err(RequestError::HEADERS));
    }

    fn run_tight(block: &[u8]) -> Result<HeaderBlock, RequestError> {
        let config = ParserConfig {
            max_header_name_len: 3,
            max_header_value_len: 3,
            ..ParserConfig::default()
        };
        let mut list = HeaderList::new();
        list.init().unwrap();
        parse_header_block(block, 0, &config, &mut list)
    }

    #[test]
    fn header_name_too_long() {
        assert!(run_tight(b"Abc: a\r\n\r\n").is_ok());
        assert_eq!(run_tight(b"Host: a\r\n\r\n"), Err(RequestError::HEADERS));
    }

    #[test]
    fn header_value_too_long() {
        assert!(run_tight(b"H: abc\r\n\r\n").is_ok());
        assert_eq!(run_tight(b"H: abcd\r\n\r\n"), Err(RequestError::HEADERS));
    }

    #[test]
    fn folded_value_exceeds_limit() {
        assert!(run_tight(b"H: ab\r\n \r\n\r\n").is_ok());
        assert_eq!(run_tight(b"H: ab\r\n cd\r\n\r\n"), Err(RequestError::HEADERS));
    }
}
