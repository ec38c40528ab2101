use bytes::Bytes;
use compact_str::CompactString;
use derive_more::Deref;
use std::fmt::Write;

/// Fixed `Server` header, pinned so client tests can assert exact values.
pub const SERVER_NAME: &str = "Test HTTP Server";

/// Fixed `Date` header; a fabricated instant, never the real clock.
pub const SERVER_DATE: &str = "Sun, 09 Feb 2020 19:32:42 GMT";

#[derive(Debug)]
pub struct Response {
    pub status_code: i32,
    pub reason: CompactString,
    pub extra_headers: Vec<(&'static str, CompactString)>,
    pub content_encoding: Option<&'static str>,
    pub body: Option<Vec<u8>>,
    /// HEAD semantics: headers are computed against the full body but the
    /// body bytes never reach the wire.
    pub head_only: bool,
}

impl Response {
    pub fn from_status_code(status_code: i32, body: impl Into<Option<Vec<u8>>>) -> Self {
        Self {
            status_code,
            reason: reason_phrase(status_code).into(),
            extra_headers: Vec::new(),
            content_encoding: None,
            body: body.into(),
            head_only: false,
        }
    }

    /// The bodyless challenge sent when the auth gate rejects a request.
    pub fn unauthorized() -> Self {
        let mut response = Self::from_status_code(401, None);
        response.reason = "Not authorized".into();
        response
    }

    /// Serializes the response into wire bytes.
    ///
    /// `Server` and `Date` go out on every response, the auth challenge
    /// included. `Content-Type`, `Content-Encoding` and `Content-Length`
    /// only appear when there is a body to describe.
    pub fn into_http(self) -> Bytes {
        let mut buf = String::with_capacity(128);

        write!(
            buf,
            "HTTP/1.1 {} {}\r\n\
             Server: {SERVER_NAME}\r\n\
             Date: {SERVER_DATE}\r\n",
            self.status_code, self.reason
        )
        .expect("No reason to fail.");

        for (name, value) in &self.extra_headers {
            write!(buf, "{name}: {value}\r\n").expect("No reason to fail.");
        }

        let Some(body) = self.body else {
            buf.push_str("\r\n");
            return buf.into();
        };

        buf.push_str("Content-Type: text/plain\r\n");
        if let Some(encoding) = self.content_encoding {
            write!(buf, "Content-Encoding: {encoding}\r\n").expect("No reason to fail.");
        }
        write!(buf, "Content-Length: {}\r\n\r\n", body.len()).expect("No reason to fail.");

        let mut wire = buf.into_bytes();
        if !self.head_only {
            wire.extend_from_slice(&body);
        }
        wire.into()
    }
}

/// Reason phrase for the status line. Codes outside the table get an empty
/// phrase; the status line keeps its separating space either way, matching
/// what clients under test already expect.
fn reason_phrase(status_code: i32) -> &'static str {
    match status_code {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "",
    }
}

/// Plain-text response wrapper for the fixed rejection bodies.
#[derive(Debug, Deref)]
pub struct TextResponse(pub Response);

impl TextResponse {
    pub fn new(status_code: i32, text: impl Into<String>) -> Self {
        let response = Response::from_status_code(status_code, text.into().into_bytes());
        Self(response)
    }
}
