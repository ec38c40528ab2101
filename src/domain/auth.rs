//! Path-driven authorization for the echo routes.
//!
//! A path of the form `/auth/<strategy>/<username>/<password>` embeds the
//! credentials the client is expected to present. The gate never writes to
//! the socket itself; it reports an outcome and the dispatcher turns a
//! rejection into the 401 wire response.

use std::str::FromStr;
use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD as BASE64_STD;
use base64::Engine;
use compact_str::CompactString;
use eyre::bail;
use regex_lite::Regex;
use strum::EnumString;

use crate::AnyResult;

static AUTH_PATH_RE: OnceLock<Regex> = OnceLock::new();

fn auth_path_regex() -> &'static Regex {
    AUTH_PATH_RE.get_or_init(|| {
        Regex::new(r"(?i)^/auth/(basic|digest)/([a-z0-9]+)/([a-z0-9]+)")
            .expect("auth path pattern is valid")
    })
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
enum Strategy {
    Basic,
    Digest,
}

/// Gate decision for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Request may proceed; `extra_headers` go onto the success response.
    Allowed {
        extra_headers: Vec<(&'static str, CompactString)>,
    },
    /// Credentials missing or wrong; the caller must answer with a bodyless
    /// 401 and stop handling the request.
    Rejected,
}

impl Gate {
    fn allowed() -> Self {
        Gate::Allowed {
            extra_headers: Vec::new(),
        }
    }
}

/// Checks `path` against the auth grammar and validates the request's
/// `Authorization` header accordingly.
///
/// The `digest` strategy is accepted but never validated; the fixture only
/// needs to exercise the client's challenge handling, not real digest auth.
/// An unknown strategy can only appear if the path grammar is relaxed, and
/// must fail the request loudly rather than fall through to "allow".
pub fn authorize(path: &str, authorization: Option<&str>) -> AnyResult<Gate> {
    let Some(captures) = auth_path_regex().captures(path) else {
        return Ok(Gate::allowed());
    };

    let strategy = captures.get(1).map(|c| c.as_str()).unwrap();
    let expected_username = captures.get(2).map(|c| c.as_str()).unwrap();
    let expected_password = captures.get(3).map(|c| c.as_str()).unwrap();

    let Ok(strategy) = Strategy::from_str(strategy) else {
        bail!("unimplemented authorization strategy {strategy}");
    };

    match strategy {
        Strategy::Basic => {
            let Some(authorization) = authorization else {
                return Ok(Gate::Rejected);
            };

            if !credentials_match(authorization, expected_username, expected_password) {
                return Ok(Gate::Rejected);
            }

            Ok(Gate::Allowed {
                extra_headers: vec![("WWW-Authenticate", "Basic realm=\"Fake realm\"".into())],
            })
        }
        Strategy::Digest => Ok(Gate::allowed()),
    }
}

/// Decodes a `Basic` authorization value and compares it against the
/// path-embedded credentials. Any decode failure counts as a mismatch.
fn credentials_match(authorization: &str, username: &str, password: &str) -> bool {
    let encoded = authorization
        .strip_prefix("Basic ")
        .unwrap_or(authorization);

    let Ok(decoded) = BASE64_STD.decode(encoded.trim()) else {
        return false;
    };
    let Ok(decoded) = String::from_utf8(decoded) else {
        return false;
    };
    let Some((user, pass)) = decoded.split_once(':') else {
        return false;
    };

    user == username && pass == password
}
