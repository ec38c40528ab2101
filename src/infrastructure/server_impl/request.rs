use crate::infrastructure::server_impl::server::Method;

/// One parsed inbound request, borrowing from the connection's read buffer.
///
/// Headers keep their arrival order, their original name casing and any
/// duplicates, since all of that is echoed back verbatim.
#[derive(Debug)]
pub struct Request<'a> {
    pub method: Method,
    pub resource: &'a str,
    pub headers: Vec<(&'a str, &'a str)>,
    pub body: Option<&'a [u8]>,
}

impl Request<'_> {
    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| unicase::eq(*header, name))
            .map(|(_, value)| *value)
    }
}
