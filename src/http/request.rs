//! A single HTTP exchange, driven as a small state machine.
//!
//! A request starts *unconfigured*, becomes *configured* through
//! [`HttpRequest::get`] or [`HttpRequest::post`], and reaches the terminal
//! *executed* state through [`HttpRequest::execute`]. Executing an
//! unconfigured request, or executing twice, is an error: one request, one
//! socket round trip.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use reqwest::header::HeaderMap;

use crate::http::connection::ConnectionPool;
use crate::http::errors::HttpError;
use crate::http::response::HttpResponse;

/// HTTP methods used by the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST with `multipart/form-data` fields.
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// One HTTP request: method, URI, optional POST fields, and whether it has
/// been executed.
///
/// # Example
///
/// ```rust,no_run
/// use std::collections::BTreeMap;
/// use acumulus_api::http::{ConnectionPool, HttpRequest};
///
/// let mut pool = ConnectionPool::new();
/// let mut fields = BTreeMap::new();
/// fields.insert("xmlstring".to_string(), "<myxml/>".to_string());
///
/// let mut request = HttpRequest::new();
/// request.post("https://api.sielsystems.nl/acumulus/stable/accounts.php", fields);
/// let response = request.execute(&mut pool)?;
/// println!("{}", response.body());
/// # Ok::<(), acumulus_api::http::HttpError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct HttpRequest {
    method: Option<HttpMethod>,
    uri: Option<String>,
    post_fields: Option<BTreeMap<String, String>>,
    executed: bool,
}

impl HttpRequest {
    /// Creates an unconfigured request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures this request as a GET of `uri`.
    pub fn get(&mut self, uri: impl Into<String>) {
        self.method = Some(HttpMethod::Get);
        self.uri = Some(uri.into());
        self.post_fields = None;
    }

    /// Configures this request as a POST of `fields` to `uri`.
    ///
    /// The fields are sent as `multipart/form-data`.
    pub fn post(&mut self, uri: impl Into<String>, fields: BTreeMap<String, String>) {
        self.method = Some(HttpMethod::Post);
        self.uri = Some(uri.into());
        self.post_fields = Some(fields);
    }

    /// Returns the configured method, if any.
    #[must_use]
    pub const fn method(&self) -> Option<HttpMethod> {
        self.method
    }

    /// Returns the configured URI, if any.
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Returns the configured POST fields, if any.
    #[must_use]
    pub const fn post_fields(&self) -> Option<&BTreeMap<String, String>> {
        self.post_fields.as_ref()
    }

    /// Returns `true` once this request has been executed.
    #[must_use]
    pub const fn executed(&self) -> bool {
        self.executed
    }

    /// Performs the exchange over a pooled connection.
    ///
    /// On success the response carries the header text, the body, and an
    /// `info` map with the transport metadata. On a transport failure the
    /// pooled handle for this host is evicted before the error is returned,
    /// since the connection may be poisoned.
    ///
    /// # Errors
    ///
    /// [`HttpError::NotConfigured`] before [`get`](Self::get) or
    /// [`post`](Self::post); [`HttpError::AlreadyExecuted`] on a second
    /// call; [`HttpError::InvalidUri`] for an unusable URI;
    /// [`HttpError::Transport`] when the exchange fails below the
    /// application level.
    pub fn execute(&mut self, pool: &mut ConnectionPool) -> Result<HttpResponse, HttpError> {
        if self.executed {
            return Err(HttpError::AlreadyExecuted);
        }
        let (method, uri) = match (self.method, self.uri.as_deref()) {
            (Some(method), Some(uri)) => (method, uri.to_string()),
            _ => return Err(HttpError::NotConfigured),
        };
        self.executed = true;

        let started = Instant::now();
        let exchange = {
            let handle = pool.get(&uri)?;
            let builder = match method {
                HttpMethod::Get => handle.client().get(&uri),
                HttpMethod::Post => {
                    let mut form = reqwest::blocking::multipart::Form::new();
                    if let Some(fields) = &self.post_fields {
                        for (name, value) in fields {
                            form = form.text(name.clone(), value.clone());
                        }
                    }
                    handle.client().post(&uri).multipart(form)
                }
            };
            builder.build().and_then(|request| {
                let sent_headers = format_header_map(request.headers());
                handle
                    .client()
                    .execute(request)
                    .map(|response| (sent_headers, response))
            })
        };

        let (sent_headers, response) = match exchange {
            Ok(pair) => pair,
            Err(error) => {
                let _ = pool.close(&uri);
                return Err(HttpError::transport(&uri, error));
            }
        };

        let status = response.status();
        let version = response.version();
        let effective_url = response.url().to_string();
        let header_text = response_header_text(version, status, response.headers());
        let body = match response.text() {
            Ok(body) => body,
            Err(error) => {
                let _ = pool.close(&uri);
                return Err(HttpError::transport(&uri, error));
            }
        };

        let mut info = BTreeMap::new();
        info.insert("method".to_string(), method.to_string());
        info.insert("url".to_string(), effective_url);
        info.insert("http_code".to_string(), status.as_str().to_string());
        info.insert("http_version".to_string(), format!("{version:?}"));
        info.insert("request_headers".to_string(), sent_headers);
        info.insert("content_length".to_string(), body.len().to_string());
        info.insert(
            "total_time_ms".to_string(),
            started.elapsed().as_millis().to_string(),
        );

        Ok(HttpResponse::new(header_text, body, info, self.clone()))
    }
}

/// Renders a header map as `name: value` lines.
fn format_header_map(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| {
            format!("{name}: {}", String::from_utf8_lossy(value.as_bytes()))
        })
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// Reconstructs the header text: status line, then one line per header.
fn response_header_text(
    version: reqwest::Version,
    status: reqwest::StatusCode,
    headers: &HeaderMap,
) -> String {
    let mut text = format!("{version:?} {status}\r\n");
    text.push_str(&format_header_map(headers));
    text.push_str("\r\n\r\n");
    text
}
