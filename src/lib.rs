#![deny(
    missing_copy_implementations,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts
)]

//! HTTP echo server used for integration testing of HTTP clients.
//!
//! Every GET/HEAD/POST request is echoed back in a canonical plaintext body,
//! so a client test can assert on the exact bytes it sent. The path and
//! headers double as a control channel: a numeric final path segment selects
//! the response status code, `/auth/...` paths trigger Basic auth
//! challenges, and `Accept-Encoding` negotiates gzip/deflate compression of
//! the echoed body. `Server` and `Date` are fixed strings so responses are
//! reproducible across runs.

pub mod api;
pub mod domain;

pub mod application;
pub mod infrastructure;

pub type AnyResult<T> = eyre::Result<T>;
