//! The outcome of one API call: decoded response plus diagnostics.
//!
//! An [`ApiResult`] owns the message collection for its call and merges two
//! sources of trouble into one severity-ranked view: local conditions
//! (transport failures, undecodable or empty bodies) and the remote
//! verdict (`status` field plus `errors`/`warnings` blocks). Callers branch
//! on [`ApiResult::status`] or [`MessageCollection::has_error`]; expected
//! failure modes never surface as panics or `Err` returns.

use std::ops::{Deref, DerefMut};

use serde_json::{Map, Value};

use crate::api::codes::{ApiStatus, LocalCode};
use crate::codec::{self, CodecError};
use crate::config::OutputFormat;
use crate::http::HttpResponse;
use crate::message::Message;
use crate::messages::MessageCollection;
use crate::severity::Severity;

/// The result of one API call.
///
/// Dereferences to its [`MessageCollection`], so collection methods
/// (`has_error`, `by_code`, `format_messages`, ...) are available directly.
///
/// # Example
///
/// ```rust
/// use acumulus_api::ApiResult;
///
/// let result = ApiResult::new();
/// assert!(result.is_empty()); // no messages yet, via Deref
/// assert!(result.api_status().is_none());
/// ```
#[derive(Debug, Default)]
pub struct ApiResult {
    messages: MessageCollection,
    api_status: Option<ApiStatus>,
    response: Value,
    main_response_key: Option<String>,
    is_list: bool,
    simplified: bool,
    expected_format: OutputFormat,
    request_function: Option<String>,
    request_uri: Option<String>,
    raw_request: Option<String>,
    http_response: Option<HttpResponse>,
}

impl ApiResult {
    /// Creates an empty result.
    ///
    /// Pre-existing local messages can be added before the call executes;
    /// they are preserved alongside whatever the response decodes to.
    #[must_use]
    pub fn new() -> Self {
        Self {
            response: Value::Object(Map::new()),
            ..Self::default()
        }
    }

    /// Records which call this result belongs to and which response format
    /// that call requested.
    ///
    /// The request driver attaches this before executing the exchange; it
    /// is public so host applications can fabricate results in their own
    /// tests.
    pub fn set_request_context(
        &mut self,
        api_function: &str,
        uri: &str,
        expected_format: OutputFormat,
    ) {
        self.request_function = Some(api_function.to_string());
        self.request_uri = Some(uri.to_string());
        self.expected_format = expected_format;
    }

    /// Records the serialized request body for diagnostic output.
    pub fn set_raw_request(&mut self, body: String) {
        self.raw_request = Some(body);
    }

    /// Decodes and classifies the HTTP response of this call.
    ///
    /// The decode pipeline, in order:
    ///
    /// 1. empty body: one Error with [`LocalCode::EmptyResponseBody`];
    /// 2. HTML body (an error page in front of the endpoint): its text
    ///    content as an Error with [`LocalCode::HtmlResponseBody`];
    /// 3. decode in the requested format. A JSON request may still be
    ///    answered with an XML error envelope when the service rejects the
    ///    message before format negotiation, so a failed JSON decode falls
    ///    back to XML; if both fail the JSON error is surfaced since JSON
    ///    was the caller's expectation;
    /// 4. from the decoded map: `status` (absent or unrecognized adds an
    ///    Error with [`LocalCode::StatusMissing`]), then `errors.error` and
    ///    `warnings.warning` blocks (single item or list) as Error/Warning
    ///    messages; the remainder is the raw main response.
    ///
    /// # Panics
    ///
    /// Calling this twice, or before
    /// [`set_request_context`](Self::set_request_context) attached the
    /// originating request, is a programming error and panics.
    pub fn set_http_response(&mut self, http_response: HttpResponse) {
        assert!(
            self.request_uri.is_some(),
            "request context must be attached before the response"
        );
        assert!(
            self.http_response.is_none(),
            "a result decodes exactly one response"
        );

        let body = http_response.body().trim().to_string();
        self.http_response = Some(http_response);

        if body.is_empty() {
            self.messages.add(Message::new(
                Severity::Error,
                LocalCode::EmptyResponseBody,
                LocalCode::EmptyResponseBody.tag(),
                "Empty response body",
            ));
            return;
        }

        if codec::is_html_response(&body) {
            tracing::warn!("received an HTML page instead of an API response");
            self.messages.add(Message::new(
                Severity::Error,
                LocalCode::HtmlResponseBody,
                LocalCode::HtmlResponseBody.tag(),
                codec::html_to_plain_text(&body),
            ));
            return;
        }

        match self.decode_body(&body) {
            Err((local_code, error)) => {
                self.messages.add(Message::from_error(
                    Severity::Error,
                    local_code,
                    local_code.tag(),
                    error,
                ));
            }
            Ok(mut map) => {
                self.extract_status(&mut map);
                self.extract_entries(&mut map, "errors", "error", Severity::Error);
                self.extract_entries(&mut map, "warnings", "warning", Severity::Warning);
                self.response = Value::Object(map);
            }
        }
    }

    /// Try-ordered decode: requested format first, then the XML fallback
    /// for JSON requests answered with an XML error envelope.
    fn decode_body(&self, body: &str) -> Result<Map<String, Value>, (LocalCode, CodecError)> {
        match self.expected_format {
            OutputFormat::Xml => {
                codec::xml_to_value(body).map_err(|error| (LocalCode::InvalidXml, error))
            }
            OutputFormat::Json => match codec::json_to_value(body) {
                Ok(map) => Ok(map),
                Err(json_error) => match codec::xml_to_value(body) {
                    Ok(map) => {
                        tracing::warn!(
                            "JSON response requested but body decoded as XML; \
                             the service fell back to its XML error envelope"
                        );
                        Ok(map)
                    }
                    Err(_) => Err((LocalCode::InvalidJson, json_error)),
                },
            },
        }
    }

    fn extract_status(&mut self, map: &mut Map<String, Value>) {
        match map.remove("status") {
            Some(value) => match ApiStatus::from_value(&value) {
                Some(status) => self.api_status = Some(status),
                None => self.messages.add(Message::new(
                    Severity::Error,
                    LocalCode::StatusMissing,
                    LocalCode::StatusMissing.tag(),
                    format!("Unexpected response: unrecognized status '{value}'"),
                )),
            },
            None => self.messages.add(Message::new(
                Severity::Error,
                LocalCode::StatusMissing,
                LocalCode::StatusMissing.tag(),
                "Unexpected response: status is missing",
            )),
        }
    }

    /// Normalizes an `errors.error` / `warnings.warning` block into
    /// messages. Both the single-item and the list-of-items shapes occur
    /// on the wire.
    fn extract_entries(
        &mut self,
        map: &mut Map<String, Value>,
        plural: &str,
        singular: &str,
        severity: Severity,
    ) {
        let Some(block) = map.remove(plural) else {
            return;
        };
        let entries = match block.get(singular) {
            None => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(single) => vec![single.clone()],
        };
        for entry in entries {
            self.messages.add(Message::from_api_entry(severity, &entry));
        }
    }

    /// Strips the documented top-level key from the raw response.
    ///
    /// With `is_list` the API wraps lists one level deeper, as
    /// `{plural: {singular: [...]}}`; that indirection is removed and the
    /// single-item-not-wrapped-in-a-list shape is normalized into a
    /// one-element list. An absent key (an error occurred, no payload came
    /// back) yields an empty list, or leaves the response untouched for
    /// non-list calls. Simplification happens at most once.
    pub fn set_main_response_key(&mut self, key: &str, is_list: bool) {
        self.main_response_key = Some(key.to_string());
        self.is_list = is_list;
        if self.simplified {
            return;
        }
        self.simplified = true;

        let main = match &mut self.response {
            Value::Object(map) => map.remove(key),
            _ => None,
        };
        if is_list {
            let items = main.map_or_else(Vec::new, |value| match value {
                Value::Object(wrapper) => match wrapper.into_iter().next() {
                    Some((_singular, Value::Array(items))) => items,
                    Some((_singular, single)) => vec![single],
                    None => Vec::new(),
                },
                Value::Array(items) => items,
                single => vec![single],
            });
            self.response = Value::Array(items);
        } else if let Some(value) = main {
            self.response = value;
        }
    }

    /// Returns the overall severity of this call.
    ///
    /// The maximum of the remote status severity and the aggregate message
    /// severity, where messages below [`Severity::Info`] never escalate:
    /// a log-only trace keeps a successful status successful.
    #[must_use]
    pub fn status(&self) -> Severity {
        let status_severity = self.api_status.map_or(Severity::Unknown, ApiStatus::severity);
        status_severity.max(self.messages.real_severity())
    }

    /// Returns `true` if this call failed: [`Severity::Error`] or worse.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.status() >= Severity::Error
    }

    /// Returns the status the remote API reported, if the response carried
    /// one.
    #[must_use]
    pub const fn api_status(&self) -> Option<ApiStatus> {
        self.api_status
    }

    /// Returns the main response: the raw remainder after decoding, or the
    /// simplified payload once
    /// [`set_main_response_key`](Self::set_main_response_key) ran.
    #[must_use]
    pub const fn main_response(&self) -> &Value {
        &self.response
    }

    /// Returns the simplified main response as a list of items.
    ///
    /// `None` before list simplification; used for picklist calls.
    #[must_use]
    pub fn main_response_as_list(&self) -> Option<&[Value]> {
        match &self.response {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the API function this result belongs to, once attached.
    #[must_use]
    pub fn api_function(&self) -> Option<&str> {
        self.request_function.as_deref()
    }

    /// Returns the main response key, once assigned.
    #[must_use]
    pub fn main_response_key(&self) -> Option<&str> {
        self.main_response_key.as_deref()
    }

    /// Returns `true` if the main response is treated as a list (picklist).
    #[must_use]
    pub const fn is_list(&self) -> bool {
        self.is_list
    }

    /// Returns the raw HTTP response, once received.
    #[must_use]
    pub const fn http_response(&self) -> Option<&HttpResponse> {
        self.http_response.as_ref()
    }

    /// Consumes this result and returns its message collection.
    ///
    /// Used to merge the diagnostics of a secondary call into a primary
    /// result, typically with a severity cap (see
    /// [`MessageCollection::add_messages`]).
    #[must_use]
    pub fn into_messages(self) -> MessageCollection {
        self.messages
    }

    /// Renders the exchange for logging, with credentials masked.
    ///
    /// One line for the request, one for its body, one for the response;
    /// whatever is not (yet) known is omitted.
    #[must_use]
    pub fn to_log_messages(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let (Some(function), Some(uri)) = (&self.request_function, &self.request_uri) {
            lines.push(format!("Request: {function} {uri}"));
        }
        if let Some(raw) = &self.raw_request {
            lines.push(format!("Request body: {}", codec::mask_passwords(raw)));
        }
        if let Some(response) = &self.http_response {
            lines.push(format!(
                "Response: code={}, body={}",
                response.status_code().unwrap_or_default(),
                codec::mask_passwords(response.body())
            ));
        }
        lines
    }
}

impl Deref for ApiResult {
    type Target = MessageCollection;

    fn deref(&self) -> &Self::Target {
        &self.messages
    }
}

impl DerefMut for ApiResult {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.messages
    }
}
