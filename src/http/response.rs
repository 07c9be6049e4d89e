//! The immutable outcome of one HTTP exchange.

use std::collections::BTreeMap;

use crate::http::request::HttpRequest;

/// A response paired 1:1 with the request that produced it.
///
/// `headers` is the full header text (status line included), `body` the
/// response body, and `info` the transport metadata recorded during the
/// exchange (status code, request headers actually sent, timing, effective
/// URL).
///
/// The public constructor exists so host applications can fabricate
/// responses when testing their own result handling.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    headers: String,
    body: String,
    info: BTreeMap<String, String>,
    request: HttpRequest,
}

impl HttpResponse {
    /// Creates a response from its parts.
    #[must_use]
    pub const fn new(
        headers: String,
        body: String,
        info: BTreeMap<String, String>,
        request: HttpRequest,
    ) -> Self {
        Self {
            headers,
            body,
            info,
            request,
        }
    }

    /// Returns the header text, status line first.
    #[must_use]
    pub fn headers(&self) -> &str {
        &self.headers
    }

    /// Returns the response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the transport metadata recorded during the exchange.
    #[must_use]
    pub const fn info(&self) -> &BTreeMap<String, String> {
        &self.info
    }

    /// Returns the request that produced this response.
    #[must_use]
    pub const fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Returns the HTTP status code, when the metadata carries one.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.info.get("http_code").and_then(|code| code.parse().ok())
    }
}
