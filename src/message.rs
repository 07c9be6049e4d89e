//! A single diagnostic message.
//!
//! Messages are created from one of three origins: a caught local error
//! (transport or codec failure), a decoded remote API error/warning entry,
//! or a locally raised condition (e.g. an empty response body). They are
//! immutable after construction.

use std::error::Error;
use std::fmt;

use serde_json::Value;

use crate::severity::Severity;

/// The code attached to a [`Message`].
///
/// Remote API entries carry numeric codes; local conditions may use either a
/// numeric code or none at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Code {
    /// No code.
    None,
    /// A numeric code, local or remote.
    Int(i64),
    /// A non-numeric code as received from the remote API.
    Text(String),
}

impl Code {
    /// Returns `true` if no code is attached.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Int(code) => write!(f, "{code}"),
            Self::Text(code) => f.write_str(code),
        }
    }
}

impl From<i64> for Code {
    fn from(code: i64) -> Self {
        Self::Int(code)
    }
}

impl From<&str> for Code {
    fn from(code: &str) -> Self {
        Self::Text(code.to_string())
    }
}

impl From<String> for Code {
    fn from(code: String) -> Self {
        Self::Text(code)
    }
}

/// Formatting options for rendering a [`Message`] as text or HTML.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MessageFormat {
    /// Render as HTML (escaped) instead of plain text.
    pub html: bool,
    /// Render as a list item (`<li>` in HTML, `- ` prefixed in text).
    pub list_item: bool,
    /// Prefix the rendered message with the severity label.
    pub with_severity: bool,
}

/// One diagnostic unit: severity, code, code tag, text, and optionally the
/// error that caused it.
///
/// # Example
///
/// ```rust
/// use acumulus_api::{Code, Message, Severity};
///
/// let message = Message::new(Severity::Warning, Code::Int(553), "N1", "incomplete vat");
/// assert_eq!(message.severity(), Severity::Warning);
/// assert_eq!(message.text(), "incomplete vat");
/// ```
#[derive(Debug)]
pub struct Message {
    severity: Severity,
    code: Code,
    code_tag: String,
    text: String,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl Message {
    /// Creates a message for a locally raised condition.
    #[must_use]
    pub fn new(
        severity: Severity,
        code: impl Into<Code>,
        code_tag: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code: code.into(),
            code_tag: code_tag.into(),
            text: text.into(),
            source: None,
        }
    }

    /// Creates a message from a caught error, keeping the error as source.
    ///
    /// The message text is the error's display representation.
    #[must_use]
    pub fn from_error(
        severity: Severity,
        code: impl Into<Code>,
        code_tag: impl Into<String>,
        error: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            severity,
            code: code.into(),
            code_tag: code_tag.into(),
            text: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    /// Creates a message from a decoded remote API error or warning entry.
    ///
    /// An entry is an object of the shape `{code, codetag, message}`. Missing
    /// or unexpectedly typed fields degrade to empty values rather than
    /// failing: a malformed entry must still be reported.
    #[must_use]
    pub fn from_api_entry(severity: Severity, entry: &Value) -> Self {
        let code = match entry.get("code") {
            Some(Value::Number(n)) => n.as_i64().map_or(Code::None, Code::Int),
            Some(Value::String(s)) => s
                .parse::<i64>()
                .map_or_else(|_| Code::Text(s.clone()), Code::Int),
            _ => Code::None,
        };
        let code_tag = entry
            .get("codetag")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let text = entry
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self {
            severity,
            code,
            code_tag,
            text,
            source: None,
        }
    }

    /// Returns the severity of this message.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the code of this message.
    #[must_use]
    pub const fn code(&self) -> &Code {
        &self.code
    }

    /// Returns the code tag, an alphanumeric reference from the remote API
    /// documentation, or an internal tag for locally raised conditions.
    #[must_use]
    pub fn code_tag(&self) -> &str {
        &self.code_tag
    }

    /// Returns the message text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the error this message was created from, if any.
    #[must_use]
    pub fn source(&self) -> Option<&(dyn Error + Send + Sync)> {
        self.source.as_deref()
    }

    /// Returns this message with its severity replaced.
    ///
    /// Used when merging messages from a secondary call whose errors must
    /// not fail the primary operation.
    pub(crate) fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Renders this message according to `format`.
    ///
    /// The rendering is `[severity: ][code[, code_tag]: ]text`, optionally
    /// HTML-escaped and wrapped as a list item.
    #[must_use]
    pub fn format(&self, format: MessageFormat) -> String {
        let mut out = String::new();
        if format.with_severity {
            out.push_str(self.severity.label());
            out.push_str(": ");
        }
        let reference = match (&self.code, self.code_tag.is_empty()) {
            (Code::None, true) => String::new(),
            (Code::None, false) => self.code_tag.clone(),
            (code, true) => code.to_string(),
            (code, false) => format!("{code}, {}", self.code_tag),
        };
        if !reference.is_empty() {
            out.push_str(&reference);
            out.push_str(": ");
        }
        out.push_str(&self.text);

        if format.html {
            let escaped = escape_html(&out);
            if format.list_item {
                format!("<li>{escaped}</li>")
            } else {
                escaped
            }
        } else if format.list_item {
            format!("- {out}")
        } else {
            out
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_message_fields() {
        let message = Message::new(Severity::Error, Code::Int(403), "AA4EF7", "Forbidden");
        assert_eq!(message.severity(), Severity::Error);
        assert_eq!(message.code(), &Code::Int(403));
        assert_eq!(message.code_tag(), "AA4EF7");
        assert_eq!(message.text(), "Forbidden");
        assert!(message.source().is_none());
    }

    #[test]
    fn test_from_error_keeps_source() {
        let io_error = std::io::Error::new(std::io::ErrorKind::TimedOut, "connection timed out");
        let message = Message::from_error(Severity::Error, Code::None, "timeout", io_error);
        assert_eq!(message.text(), "connection timed out");
        assert!(message.source().is_some());
    }

    #[test]
    fn test_from_api_entry_numeric_code() {
        let entry = json!({"code": 403, "codetag": "AA4EF7", "message": "Invalid contract"});
        let message = Message::from_api_entry(Severity::Error, &entry);
        assert_eq!(message.code(), &Code::Int(403));
        assert_eq!(message.code_tag(), "AA4EF7");
        assert_eq!(message.text(), "Invalid contract");
    }

    #[test]
    fn test_from_api_entry_string_code_parses_to_int() {
        let entry = json!({"code": "553", "codetag": "N1", "message": "warning"});
        let message = Message::from_api_entry(Severity::Warning, &entry);
        assert_eq!(message.code(), &Code::Int(553));
    }

    #[test]
    fn test_from_api_entry_tolerates_missing_fields() {
        let entry = json!({"message": "bare"});
        let message = Message::from_api_entry(Severity::Warning, &entry);
        assert!(message.code().is_none());
        assert_eq!(message.code_tag(), "");
        assert_eq!(message.text(), "bare");
    }

    #[test]
    fn test_format_plain() {
        let message = Message::new(Severity::Error, Code::Int(701), "local", "Empty body");
        assert_eq!(
            message.format(MessageFormat::default()),
            "701, local: Empty body"
        );
    }

    #[test]
    fn test_format_with_severity_and_list_item() {
        let message = Message::new(Severity::Warning, Code::None, "", "check this");
        let format = MessageFormat {
            with_severity: true,
            list_item: true,
            ..MessageFormat::default()
        };
        assert_eq!(message.format(format), "- Warning: check this");
    }

    #[test]
    fn test_format_html_escapes_and_wraps() {
        let message = Message::new(Severity::Error, Code::None, "", "a < b & c");
        let format = MessageFormat {
            html: true,
            list_item: true,
            ..MessageFormat::default()
        };
        assert_eq!(message.format(format), "<li>a &lt; b &amp; c</li>");
    }

    #[test]
    fn test_format_code_tag_only() {
        let message = Message::new(Severity::Notice, Code::None, "N21", "see manual");
        assert_eq!(message.format(MessageFormat::default()), "N21: see manual");
    }
}
