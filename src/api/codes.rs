//! Status and diagnostic code enumerations.

use serde_json::Value;

use crate::message::Code;
use crate::severity::Severity;

/// The overall status the remote API reports in every response.
///
/// This is an application-level verdict: even an `Errors` or `Exception`
/// status arrives as a valid HTTP 200 response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiStatus {
    /// The request was processed successfully (wire value 0).
    Success,
    /// The request failed with errors (wire value 1).
    Errors,
    /// The request was processed but produced warnings (wire value 2).
    Warnings,
    /// The service failed on an exception (wire value 3).
    Exception,
}

impl ApiStatus {
    /// Decodes the wire `status` field, which arrives as a number or a
    /// numeric string depending on the response format.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let code = match value {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        }?;
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::Errors),
            2 => Some(Self::Warnings),
            3 => Some(Self::Exception),
            _ => None,
        }
    }

    /// Maps this status onto the severity scale.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::Success => Severity::Success,
            Self::Warnings => Severity::Warning,
            Self::Errors => Severity::Error,
            Self::Exception => Severity::Exception,
        }
    }
}

/// Diagnostic codes for conditions raised by this client rather than
/// received from the remote API.
///
/// A closed enumeration instead of bare integers; the numeric values are
/// kept stable so log tooling keyed on them keeps working.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocalCode {
    /// The response body was empty.
    EmptyResponseBody,
    /// The response body was an HTML page instead of an API payload.
    HtmlResponseBody,
    /// The decoded response carries no recognizable `status` field.
    StatusMissing,
    /// The response could not be decoded as XML.
    InvalidXml,
    /// The response could not be decoded as JSON (nor as XML fallback).
    InvalidJson,
    /// The request envelope could not be serialized.
    EnvelopeSerialization,
    /// The HTTP exchange failed at the transport level.
    Transport,
}

impl LocalCode {
    /// Returns the stable numeric code.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::EmptyResponseBody => 701,
            Self::HtmlResponseBody => 702,
            Self::StatusMissing => 703,
            Self::InvalidXml => 704,
            Self::InvalidJson => 705,
            Self::EnvelopeSerialization => 706,
            Self::Transport => 707,
        }
    }

    /// Returns the stable code tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::EmptyResponseBody => "empty_body",
            Self::HtmlResponseBody => "html_body",
            Self::StatusMissing => "status_missing",
            Self::InvalidXml => "invalid_xml",
            Self::InvalidJson => "invalid_json",
            Self::EnvelopeSerialization => "envelope",
            Self::Transport => "transport",
        }
    }
}

impl From<LocalCode> for Code {
    fn from(local: LocalCode) -> Self {
        Self::Int(local.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_from_number_and_string() {
        assert_eq!(ApiStatus::from_value(&json!(0)), Some(ApiStatus::Success));
        assert_eq!(ApiStatus::from_value(&json!("2")), Some(ApiStatus::Warnings));
        assert_eq!(ApiStatus::from_value(&json!("3")), Some(ApiStatus::Exception));
        assert_eq!(ApiStatus::from_value(&json!("ok")), None);
        assert_eq!(ApiStatus::from_value(&json!(9)), None);
        assert_eq!(ApiStatus::from_value(&json!(null)), None);
    }

    #[test]
    fn test_status_severity_mapping() {
        assert_eq!(ApiStatus::Success.severity(), Severity::Success);
        assert_eq!(ApiStatus::Warnings.severity(), Severity::Warning);
        assert_eq!(ApiStatus::Errors.severity(), Severity::Error);
        assert_eq!(ApiStatus::Exception.severity(), Severity::Exception);
    }

    #[test]
    fn test_local_codes_are_distinct() {
        let codes = [
            LocalCode::EmptyResponseBody,
            LocalCode::HtmlResponseBody,
            LocalCode::StatusMissing,
            LocalCode::InvalidXml,
            LocalCode::InvalidJson,
            LocalCode::EnvelopeSerialization,
            LocalCode::Transport,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a.code(), b.code());
                assert_ne!(a.tag(), b.tag());
            }
        }
    }

    #[test]
    fn test_local_code_converts_to_message_code() {
        assert_eq!(Code::from(LocalCode::EmptyResponseBody), Code::Int(701));
    }
}
