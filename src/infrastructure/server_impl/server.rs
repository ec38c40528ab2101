use std::str::FromStr;

use either::Either;
use eyre::{bail, OptionExt};
use httparse::{ParserConfig, Status};
use memchr::memmem;
use strum::{EnumString, IntoStaticStr};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::api::{echo_route, not_supported};
use crate::infrastructure::server_impl::request::Request;
use crate::infrastructure::server_impl::response::Response;
use crate::AnyResult;

const MAX_HEADERS: usize = 32;

#[allow(clippy::upper_case_acronyms, non_camel_case_types)]
#[derive(Debug, Copy, Clone, PartialEq, EnumString, IntoStaticStr)]
pub enum Method {
    GET,
    HEAD,
    POST,
    DELETE,
    PATCH,
    OPTIONS,
}

/// Accepts connections until the listener is torn down, one spawned task per
/// connection. Requests never share state, so a failing or slow client only
/// affects its own task.
pub async fn serve(listener: TcpListener) -> AnyResult<()> {
    loop {
        let (socket, peer) = listener.accept().await?;

        tokio::spawn(async move {
            if let Err(report) = handle_connection(socket).await {
                tracing::warn!(%peer, "connection failed: {report:#}");
            }
        });
    }
}

/// One request, one response, then the socket is shut down.
async fn handle_connection(mut socket: TcpStream) -> AnyResult<()> {
    let buffer = read_request(&mut socket).await?;
    let request = parse_http(&buffer)?;
    tracing::debug!(method = ?request.method, path = request.resource, "request");

    let routed = match_routes(&request)?;
    let response = either::for_both!(routed, r => r);
    let status = response.status_code;

    socket.write_all(&response.into_http()).await?;
    socket.shutdown().await?;
    tracing::debug!(status, "response sent");
    Ok(())
}

/// Reads until the request head and the declared `Content-Length` worth of
/// body bytes have arrived. A peer closing early is a hard error; guessing
/// at body content would only hide bugs in the client under test.
async fn read_request(socket: &mut TcpStream) -> AnyResult<Vec<u8>> {
    let mut buffer = Vec::with_capacity(2048);
    let mut chunk = [0; 2048];

    loop {
        if let Some((header_end, content_length)) = request_frame(&buffer)? {
            let total = header_end + content_length;
            if buffer.len() >= total {
                buffer.truncate(total);
                return Ok(buffer);
            }
        }

        let read = socket.read(&mut chunk).await?;
        if read == 0 {
            bail!(
                "connection closed before the request was complete ({} bytes buffered)",
                buffer.len()
            );
        }
        buffer.extend_from_slice(&chunk[..read]);
    }
}

/// Once the head is complete, returns its length and the declared body size.
fn request_frame(buffer: &[u8]) -> AnyResult<Option<(usize, usize)>> {
    if memmem::find(buffer, b"\r\n\r\n").is_none() {
        return Ok(None);
    }

    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut headers);
    let parsed = ParserConfig::default()
        .parse_request(&mut req, buffer)
        .map_err(|e| eyre::eyre!("malformed request head: {e}"))?;

    let Status::Complete(header_end) = parsed else {
        return Ok(None);
    };

    let content_length = req
        .headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case("Content-Length"))
        .map(|h| std::str::from_utf8(h.value).unwrap_or("").trim().parse())
        .transpose()
        .map_err(|e| eyre::eyre!("invalid Content-Length: {e}"))?
        .unwrap_or(0);

    Ok(Some((header_end, content_length)))
}

/// Parses a complete request buffer into a [Request].
///
/// Header order, name casing and duplicate names all survive parsing; the
/// echo body reproduces them verbatim.
pub fn parse_http(buffer: &[u8]) -> AnyResult<Request<'_>> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut headers);
    let parsed = ParserConfig::default()
        .parse_request(&mut req, buffer)
        .map_err(|e| eyre::eyre!("malformed request head: {e}"))?;

    let Status::Complete(body_start) = parsed else {
        bail!("truncated request head");
    };

    let method = req.method.ok_or_eyre("request line without method")?;
    let method =
        Method::from_str(method).map_err(|_| eyre::eyre!("unsupported method {method}"))?;
    let resource = req.path.ok_or_eyre("request line without path")?;

    let headers = req
        .headers
        .iter()
        .map(|h| {
            std::str::from_utf8(h.value)
                .map(|value| (h.name, value))
                .map_err(|_| eyre::eyre!("header {} is not valid UTF-8", h.name))
        })
        .collect::<AnyResult<Vec<_>>>()?;

    let request = Request {
        method,
        resource,
        headers,
        body: None,
    };

    let content_length: usize = request
        .header("Content-Length")
        .map(|v| v.trim().parse())
        .transpose()
        .map_err(|e| eyre::eyre!("invalid Content-Length: {e}"))?
        .unwrap_or(0);

    let body = match content_length {
        0 => None,
        len => {
            let Some(body) = buffer.get(body_start..body_start + len) else {
                bail!(
                    "body shorter than declared Content-Length ({} of {len} bytes)",
                    buffer.len() - body_start
                );
            };
            Some(body)
        }
    };

    Ok(Request { body, ..request })
}

/// Routes a request by verb. `Left` is the echo pipeline, `Right` the fixed
/// rejection for verbs the fixture refuses to serve.
pub fn match_routes(request: &Request<'_>) -> AnyResult<Either<Response, Response>> {
    let response = match request.method {
        Method::GET | Method::HEAD | Method::POST => echo_route(request)?,
        method @ (Method::DELETE | Method::PATCH | Method::OPTIONS) => {
            return Ok(Either::Right(not_supported(method)));
        }
    };

    Ok(Either::Left(response))
}
