//! Desired-status extraction from the request path.

/// Returns the status code a response should carry for `path`.
///
/// When the final `/`-delimited segment parses as an integer, that value is
/// used verbatim; the caller gets whatever the test asked for, including
/// codes outside the valid HTTP range. Anything else falls back to
/// `default`.
pub fn extract_status_code(path: &str, default: i32) -> i32 {
    path.rsplit('/')
        .next()
        .and_then(|segment| segment.parse::<i32>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_final_segment_wins() {
        assert_eq!(extract_status_code("/404", 200), 404);
        assert_eq!(extract_status_code("/foo/500", 200), 500);
        assert_eq!(extract_status_code("/a/b/c/302", 200), 302);
    }

    #[test]
    fn non_numeric_falls_back_to_default() {
        assert_eq!(extract_status_code("/", 200), 200);
        assert_eq!(extract_status_code("/foo", 200), 200);
        assert_eq!(extract_status_code("/500/foo", 200), 200);
        assert_eq!(extract_status_code("/auth/basic/user/pass", 200), 200);
        assert_eq!(extract_status_code("", 204), 204);
    }

    #[test]
    fn no_range_validation() {
        assert_eq!(extract_status_code("/9999", 200), 9999);
        assert_eq!(extract_status_code("/-1", 200), -1);
    }
}
