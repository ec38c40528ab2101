//! Multipart boundary normalization.
//!
//! Clients generate a random boundary token per multipart/form-data request,
//! which would leak into both the echoed `Content-Type` header and the
//! echoed body and break exact-match assertions on the client side. The
//! rule below rewrites that token to a fixed sentinel everywhere it occurs.

use std::borrow::Cow;
use std::sync::OnceLock;

use compact_str::CompactString;
use memchr::memmem;
use regex_lite::Regex;

/// Fixed replacement for the randomly generated boundary token.
pub const BOUNDARY_SENTINEL: &str = "<<BOUNDARY-ID>>";

static BOUNDARY_RE: OnceLock<Regex> = OnceLock::new();

fn boundary_regex() -> &'static Regex {
    BOUNDARY_RE.get_or_init(|| {
        Regex::new(r"^multipart/form-data; boundary=(----------------------------\d+)$")
            .expect("boundary pattern is valid")
    })
}

/// Substitution rule for one request's boundary token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryRule {
    token: CompactString,
}

impl BoundaryRule {
    /// Builds a rule from the request's `Content-Type` header, if its value
    /// matches the multipart grammar exactly. No match means no rule, and
    /// callers must pass values through untouched.
    pub fn detect(content_type: Option<&str>) -> Option<Self> {
        let value = content_type?;
        let captures = boundary_regex().captures(value)?;
        Some(Self {
            token: captures.get(1)?.as_str().into(),
        })
    }

    /// Replaces every occurrence of the token in a header value.
    pub fn apply_str<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if value.contains(self.token.as_str()) {
            Cow::Owned(value.replace(self.token.as_str(), BOUNDARY_SENTINEL))
        } else {
            Cow::Borrowed(value)
        }
    }

    /// Replaces every occurrence of the token in the raw request body.
    pub fn apply_bytes<'a>(&self, body: &'a [u8]) -> Cow<'a, [u8]> {
        let token = self.token.as_bytes();
        let mut matches = memmem::find_iter(body, token).peekable();
        if matches.peek().is_none() {
            return Cow::Borrowed(body);
        }

        let mut out = Vec::with_capacity(body.len());
        let mut last = 0;
        for start in matches {
            out.extend_from_slice(&body[last..start]);
            out.extend_from_slice(BOUNDARY_SENTINEL.as_bytes());
            last = start + token.len();
        }
        out.extend_from_slice(&body[last..]);
        Cow::Owned(out)
    }
}
