//! HTTP request representation and request-head parsing.

use std::collections::HashMap;
use std::str::FromStr;

use crate::http::error::Error;
use crate::http::method::Method;

/// The request attributes the router and dispatcher read.
///
/// The router only looks at `method`, `path`, `host` and `scheme`; headers,
/// query parameters and the body are carried through to handlers and filters.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request path, without the query string
    pub path: String,
    /// The authority the request was sent to, as given by the `Host` header
    pub host: String,
    /// The URI scheme the request arrived on (`http`, `https`)
    pub scheme: String,
    /// The HTTP headers
    pub headers: HashMap<String, String>,
    /// Query parameters parsed from the request target
    pub query_params: HashMap<String, String>,
    /// The request body
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Create a request for `target`, which may carry a query string.
    ///
    /// The scheme defaults to `http` and the host is empty until set.
    pub fn new(method: Method, target: impl AsRef<str>) -> Self {
        let (path, query) = match target.as_ref().split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target.as_ref(), None),
        };

        let query_params = query
            .map(|query| {
                query
                    .split('&')
                    .filter(|s| !s.is_empty())
                    .map(|pair| match pair.split_once('=') {
                        Some((k, v)) => (k.to_string(), v.to_string()),
                        None => (pair.to_string(), String::new()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            method,
            path: path.to_string(),
            host: String::new(),
            scheme: "http".to_string(),
            headers: HashMap::new(),
            query_params,
            body: Vec::new(),
        }
    }

    /// Set the host the request was addressed to.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the scheme the request arrived on.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Add a header. A `Host` header also sets the request host.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        if name.eq_ignore_ascii_case("Host") {
            self.host = value.clone();
        }
        self.headers.insert(name, value);
        self
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// The host without any `:port` suffix.
    pub fn host_name(&self) -> &str {
        match self.host.rsplit_once(':') {
            // IPv6 literals keep their colons inside brackets
            Some((name, port)) if !port.contains(']') && port.chars().all(|c| c.is_ascii_digit()) => name,
            _ => self.host.as_str(),
        }
    }

    /// Get a header value, ignoring the case of the name.
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers
            .iter()
            .find_map(|(k, v)| k.eq_ignore_ascii_case(name).then_some(v))
    }

    /// Get a query parameter value.
    pub fn get_query_param(&self, name: &str) -> Option<&String> {
        self.query_params.get(name)
    }
}

/// Parse an HTTP/1.x request head (and any body bytes that followed it) from a byte slice.
///
/// `scheme` is the scheme of the listener the bytes were read from; it is not
/// part of the wire format.
pub fn parse_request(input: &[u8], scheme: &str) -> Result<HttpRequest, Error> {
    let (head, body) = match find_head_end(input) {
        Some(end) => (&input[..end], &input[end + 4..]),
        None => (input, &[][..]),
    };

    let head = std::str::from_utf8(head)
        .map_err(|_| Error::MalformedRequestLine("Invalid UTF-8".to_string()))?;
    let mut lines = head.lines();

    let request_line = match lines.next() {
        Some(line) if !line.trim().is_empty() => line,
        _ => return Err(Error::EmptyRequest),
    };

    let parts: Vec<&str> = request_line.split_whitespace().collect();
    let [method, target, version] = parts[..] else {
        return Err(Error::MalformedRequestLine(request_line.to_string()));
    };

    let method = Method::from_str(method)?;
    if !target.starts_with('/') {
        return Err(Error::InvalidPath(target.to_string()));
    }
    if !matches!(version, "HTTP/1.0" | "HTTP/1.1") {
        return Err(Error::InvalidVersion(version.to_string()));
    }

    let mut request = HttpRequest::new(method, target).with_scheme(scheme);
    for line in lines {
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| Error::InvalidHeaderFormat(line.to_string()))?;
        request = request.with_header(name.trim(), value.trim());
    }

    Ok(request.with_body(body))
}

fn find_head_end(input: &[u8]) -> Option<usize> {
    input.windows(4).position(|window| window == b"\r\n\r\n")
}
