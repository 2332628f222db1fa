use serde::Serialize;

use crate::error::RequestError;
use crate::list::HeaderList;
use crate::request::Request;
use crate::span::Span;
use crate::types::{HttpMethod, HttpVersion, RequestStatus};

/// Borrowed, serializable view of a [`Request`].
#[derive(Serialize)]
struct RequestView<'a> {
    status: RequestStatus,
    error: RequestError,
    method: Option<String>,
    known_method: Option<HttpMethod>,
    uri: Option<&'a str>,
    version: Option<String>,
    known_version: Option<HttpVersion>,
    spans: SpansView,
    headers: &'a HeaderList,
    #[serde(serialize_with = "serialize_body")]
    body: Option<&'a [u8]>,
}

#[derive(Serialize)]
struct SpansView {
    request_line: Option<Span>,
    method: Option<Span>,
    uri: Option<Span>,
    version: Option<Span>,
    headers: Option<Span>,
    body: Option<Span>,
}

/// Serialize body bytes as a UTF-8 string (lossy) for JSON output.
fn serialize_body<S: serde::Serializer>(body: &Option<&[u8]>, s: S) -> Result<S::Ok, S::Error> {
    match body {
        None => s.serialize_none(),
        Some(bytes) => s.serialize_str(&String::from_utf8_lossy(bytes)),
    }
}

fn lossy(bytes: Option<&[u8]>) -> Option<String> {
    bytes.map(|b| String::from_utf8_lossy(b).into_owned())
}

impl<'a> RequestView<'a> {
    fn new(request: &'a Request) -> Self {
        Self {
            status: request.status(),
            error: request.error(),
            method: lossy(request.method_bytes()),
            known_method: request.method(),
            uri: request.uri(),
            version: lossy(request.version_bytes()),
            known_version: request.version(),
            spans: SpansView {
                request_line: request.request_line_span(),
                method: request.method_span(),
                uri: request.uri_span(),
                version: request.version_span(),
                headers: request.headers_span(),
                body: request.body_span(),
            },
            headers: request.headers(),
            body: request.body(),
        }
    }
}

/// Serialize a [`Request`] (spans, resolved fields, headers, body) to a
/// JSON string.
///
/// When `pretty` is `true` the output is indented for readability.
pub fn format_json(request: &Request, pretty: bool) -> String {
    let view = RequestView::new(request);
    let out = if pretty {
        serde_json::to_string_pretty(&view)
    } else {
        serde_json::to_string(&view)
    };
    out.unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

/// Render a [`Request`] in a human-readable debug format.
pub fn format_debug(request: &Request) -> String {
    let mut out = String::with_capacity(256);
    let show = |bytes: Option<&[u8]>| lossy(bytes).unwrap_or_else(|| "<unset>".to_owned());
    let show_span = |span: Option<Span>| match span {
        Some(s) => format!("[{}, {})", s.start, s.end),
        None => "-".to_owned(),
    };

    out.push_str("=== HTTP Request ===\n");
    out.push_str(&format!("Status:  {} (error: {})\n", request.status(), request.error()));
    out.push_str(&format!(
        "Method:  {} {}\n",
        show(request.method_bytes()),
        show_span(request.method_span())
    ));
    out.push_str(&format!(
        "URI:     {} {}\n",
        show(request.uri_bytes()),
        show_span(request.uri_span())
    ));
    out.push_str(&format!(
        "Version: {} {}\n",
        show(request.version_bytes()),
        show_span(request.version_span())
    ));

    let headers = request.headers();
    out.push_str(&format!("\n--- Headers ({}) ---\n", headers.len()));
    for (name, value) in headers {
        out.push_str(&format!("  {name}: {value}\n"));
    }

    match request.body() {
        Some(body) if !body.is_empty() => {
            out.push_str(&format!("\n--- Body ({} bytes) ---\n", body.len()));
            match std::str::from_utf8(body) {
                Ok(s) => out.push_str(s),
                Err(_) => {
                    out.push_str(&format!("<binary data: {} bytes>", body.len()));
                }
            }
            out.push('\n');
        }
        _ => {
            out.push_str("\n--- No Body ---\n");
        }
    }

    out.push_str("====================\n");
    out
}

/// Render only the request line and headers (no body).
pub fn format_headers_only(request: &Request) -> String {
    let headers = request.headers();
    let mut out = String::with_capacity(64 + headers.len() * 40);

    if let Some(line) = request.request_line_bytes() {
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }

    for (name, value) in headers {
        out.push_str(&format!("{name}: {value}\n"));
    }

    out
}
