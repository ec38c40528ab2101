//! Request handlers for the echo fixture.

use compact_str::format_compact;

use crate::application::build_echo_body;
use crate::domain::auth::{authorize, Gate};
use crate::domain::status::extract_status_code;
use crate::infrastructure::encoding::Encoding;
use crate::infrastructure::server_impl::request::Request;
use crate::infrastructure::server_impl::response::{Response, TextResponse};
use crate::infrastructure::server_impl::server::Method;
use crate::AnyResult;

/// GET/HEAD/POST pipeline: auth gate, then echo the request back.
///
/// The status code comes from the path's final segment, the body from the
/// canonical envelope, the compression from `Accept-Encoding`. HEAD runs the
/// full pipeline so `Content-Length` reflects the body a GET would carry;
/// only the final body write is suppressed.
pub fn echo_route(request: &Request<'_>) -> AnyResult<Response> {
    let gate = authorize(request.resource, request.header("Authorization"))?;
    let Gate::Allowed { extra_headers } = gate else {
        return Ok(Response::unauthorized());
    };

    let encoding = Encoding::negotiate(request.header("Accept-Encoding"));
    let body = build_echo_body(request, encoding)?;

    let mut response = Response::from_status_code(extract_status_code(request.resource, 200), body);
    response.extra_headers = extra_headers;
    response.content_encoding = encoding.header_value();
    response.head_only = request.method == Method::HEAD;
    Ok(response)
}

/// Fixed rejection for DELETE/PATCH/OPTIONS. Never consults the auth gate
/// or the body builder.
pub fn not_supported(method: Method) -> Response {
    let name: &'static str = method.into();
    let mut response = TextResponse::new(405, format!("{name} not supported\r\n")).0;
    response.reason = format_compact!("{name} not supported");
    response
}
