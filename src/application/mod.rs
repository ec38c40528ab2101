//! Canonical echo-body construction.
//!
//! The envelope reproduces the request exactly as the client sent it, so a
//! client test can compare the response against the bytes it produced. The
//! only rewriting is the multipart boundary substitution, which removes the
//! one per-request random value from the output.

use std::borrow::Cow;

use crate::domain::boundary::BoundaryRule;
use crate::infrastructure::encoding::Encoding;
use crate::infrastructure::server_impl::request::Request;
use crate::AnyResult;

/// Builds the response body for an echoed request: the canonical envelope,
/// boundary-normalized, pushed through the negotiated compression sink.
pub fn build_echo_body(request: &Request<'_>, encoding: Encoding) -> AnyResult<Vec<u8>> {
    let rule = BoundaryRule::detect(request.header("Content-Type"));
    let mut sink = encoding.into_sink();

    sink.write_all(format!("Path: {}\r\n\r\n", request.resource).as_bytes())?;
    sink.write_all(b"Headers:\r\n--------\r\n")?;

    for (name, value) in &request.headers {
        let value = match &rule {
            Some(rule) => rule.apply_str(value),
            None => Cow::Borrowed(*value),
        };
        sink.write_all(format!("{name}: {value}\r\n").as_bytes())?;
    }

    if let Some(body) = request.body.filter(|b| !b.is_empty()) {
        sink.write_all(b"\r\nRequest body:\r\n-------------\r\n")?;
        let body = match &rule {
            Some(rule) => rule.apply_bytes(body),
            None => Cow::Borrowed(body),
        };
        sink.write_all(&body)?;
        sink.write_all(b"\r\n")?;
    }

    Ok(sink.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::server_impl::server::Method;
    use std::io::Read;

    fn request<'a>(
        resource: &'a str,
        headers: Vec<(&'a str, &'a str)>,
        body: Option<&'a [u8]>,
    ) -> Request<'a> {
        Request {
            method: Method::GET,
            resource,
            headers,
            body,
        }
    }

    #[test]
    fn envelope_without_body() {
        let req = request("/foo/404", vec![("Accept", "text/plain")], None);
        let body = build_echo_body(&req, Encoding::Identity).unwrap();

        assert_eq!(
            body,
            b"Path: /foo/404\r\n\r\n\
              Headers:\r\n\
              --------\r\n\
              Accept: text/plain\r\n"
        );
    }

    #[test]
    fn envelope_with_body_section() {
        let req = request(
            "/post",
            vec![("Content-Length", "9")],
            Some(b"some data"),
        );
        let body = build_echo_body(&req, Encoding::Identity).unwrap();

        assert_eq!(
            body,
            b"Path: /post\r\n\r\n\
              Headers:\r\n\
              --------\r\n\
              Content-Length: 9\r\n\
              \r\n\
              Request body:\r\n\
              -------------\r\n\
              some data\r\n"
        );
    }

    #[test]
    fn duplicate_headers_are_emitted_in_arrival_order() {
        let req = request(
            "/",
            vec![("X-Multi", "one"), ("Accept", "*/*"), ("X-Multi", "two")],
            None,
        );
        let body = build_echo_body(&req, Encoding::Identity).unwrap();
        let text = std::str::from_utf8(&body).unwrap();

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[4], "X-Multi: one");
        assert_eq!(lines[5], "Accept: */*");
        assert_eq!(lines[6], "X-Multi: two");
    }

    #[test]
    fn boundary_is_normalized_in_headers_and_body() {
        let token = "----------------------------9051914041544843365972754266";
        let content_type = format!("multipart/form-data; boundary={token}");
        let multipart_body = format!("--{token}\r\ndata\r\n--{token}--\r\n");

        let req = request(
            "/upload",
            vec![("Content-Type", &content_type)],
            Some(multipart_body.as_bytes()),
        );
        let body = build_echo_body(&req, Encoding::Identity).unwrap();
        let text = std::str::from_utf8(&body).unwrap();

        assert!(!text.contains(token));
        // once in the echoed header, twice in the echoed body
        assert_eq!(text.matches("<<BOUNDARY-ID>>").count(), 3);
        assert!(text.contains("Content-Type: multipart/form-data; boundary=<<BOUNDARY-ID>>\r\n"));
    }

    #[test]
    fn compressed_bodies_decode_to_the_identity_envelope() {
        let req = request(
            "/compress",
            vec![("Accept", "*/*"), ("Content-Length", "4")],
            Some(b"data"),
        );
        let identity = build_echo_body(&req, Encoding::Identity).unwrap();

        let gzipped = build_echo_body(&req, Encoding::Gzip).unwrap();
        let mut decoded = Vec::new();
        flate2::read::GzDecoder::new(&gzipped[..])
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, identity);

        let deflated = build_echo_body(&req, Encoding::Deflate).unwrap();
        let mut decoded = Vec::new();
        flate2::read::ZlibDecoder::new(&deflated[..])
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, identity);
    }
}
