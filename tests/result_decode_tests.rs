//! Integration tests for response decoding and status classification,
//! using fabricated HTTP responses through the public API.

use std::collections::BTreeMap;

use serde_json::json;

use acumulus_api::{
    ApiResult, ApiStatus, Code, HttpRequest, HttpResponse, LocalCode, Message, OutputFormat,
    Severity,
};

fn response_with_body(body: &str) -> HttpResponse {
    let mut info = BTreeMap::new();
    info.insert("http_code".to_string(), "200".to_string());
    HttpResponse::new(
        "HTTP/1.1 200 OK\r\n\r\n".to_string(),
        body.to_string(),
        info,
        HttpRequest::new(),
    )
}

fn decoded_result(format: OutputFormat, body: &str) -> ApiResult {
    let mut result = ApiResult::new();
    result.set_request_context(
        "accounts",
        "https://api.example.com/acumulus/stable/accounts.php",
        format,
    );
    result.set_http_response(response_with_body(body));
    result
}

// ============================================================================
// Status classification
// ============================================================================

#[test]
fn test_status_is_max_of_api_status_and_messages() {
    // Success status, but a local warning was collected.
    let mut result = ApiResult::new();
    result.set_request_context("accounts", "https://api.example.com/a.php", OutputFormat::Json);
    result.add(Message::new(Severity::Warning, Code::Int(900), "", "heads up"));
    result.set_http_response(response_with_body(r#"{"status": 0}"#));

    assert_eq!(result.api_status(), Some(ApiStatus::Success));
    assert_eq!(result.status(), Severity::Warning);
}

#[test]
fn test_log_only_messages_never_raise_the_status() {
    let mut result = ApiResult::new();
    result.set_request_context("accounts", "https://api.example.com/a.php", OutputFormat::Json);
    result.add(Message::new(Severity::Log, Code::None, "", "request sent"));
    result.set_http_response(response_with_body(r#"{"status": 0}"#));

    assert_eq!(result.status(), Severity::Success);
}

#[test]
fn test_remote_warnings_classify_as_warning_severity() {
    let result = decoded_result(
        OutputFormat::Json,
        r#"{"status": 2, "warnings": {"warning": [
            {"code": 553, "codetag": "N1", "message": "first"},
            {"code": 554, "codetag": "N2", "message": "second"}
        ]}}"#,
    );

    assert_eq!(result.status(), Severity::Warning);
    assert_eq!(result.len(), 2);
    assert!(result.by_code(553).is_some());
    assert!(result.by_code(554).is_some());
}

#[test]
fn test_remote_exception_status() {
    let result = decoded_result(OutputFormat::Json, r#"{"status": 3}"#);
    assert_eq!(result.api_status(), Some(ApiStatus::Exception));
    assert_eq!(result.status(), Severity::Exception);
    assert!(result.has_error());
}

// ============================================================================
// Format fallback
// ============================================================================

#[test]
fn test_xml_fallback_when_json_was_declared() {
    let result = decoded_result(
        OutputFormat::Json,
        "<myxml><status>1</status><errors><error><code>403</code>\
         <codetag>AA4EF7</codetag><message>denied</message></error></errors></myxml>",
    );

    assert_eq!(result.api_status(), Some(ApiStatus::Errors));
    assert!(result.has_error());
}

#[test]
fn test_xml_declared_decodes_xml_directly() {
    let result = decoded_result(
        OutputFormat::Xml,
        "<myxml><status>0</status><vatinfo><vattype>normal</vattype></vatinfo></myxml>",
    );
    assert_eq!(result.api_status(), Some(ApiStatus::Success));
    assert_eq!(result.main_response()["vatinfo"]["vattype"], json!("normal"));
}

#[test]
fn test_garbage_body_reports_the_declared_format() {
    let json_result = decoded_result(OutputFormat::Json, "garbage");
    assert!(json_result.by_code(LocalCode::InvalidJson.code()).is_some());

    let xml_result = decoded_result(OutputFormat::Xml, "garbage");
    assert!(xml_result.by_code(LocalCode::InvalidXml.code()).is_some());
}

#[test]
fn test_non_object_json_falls_through_to_json_error() {
    // Valid JSON, but not a map; also not XML, so the JSON-specific
    // diagnostic is surfaced.
    let result = decoded_result(OutputFormat::Json, "[1, 2, 3]");
    assert!(result.by_code(LocalCode::InvalidJson.code()).is_some());
}

// ============================================================================
// Main response simplification
// ============================================================================

#[test]
fn test_picklist_with_two_items() {
    let mut result = decoded_result(
        OutputFormat::Json,
        r#"{"status": 0, "accounts": {"account": [{"accountid": "1"}, {"accountid": "2"}]}}"#,
    );
    result.set_main_response_key("accounts", true);
    assert_eq!(result.main_response_as_list().unwrap().len(), 2);
}

#[test]
fn test_picklist_with_single_unwrapped_item() {
    let mut result = decoded_result(
        OutputFormat::Json,
        r#"{"status": 0, "accounts": {"account": {"accountid": "1"}}}"#,
    );
    result.set_main_response_key("accounts", true);

    let items = result.main_response_as_list().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0], json!({"accountid": "1"}));
}

#[test]
fn test_picklist_after_error_is_empty() {
    let mut result = decoded_result(
        OutputFormat::Json,
        r#"{"status": 1, "errors": {"error": {"code": 500, "codetag": "X", "message": "failed"}}}"#,
    );
    result.set_main_response_key("accounts", true);

    assert!(result.has_error());
    assert_eq!(result.main_response_as_list(), Some(&[][..]));
}

// ============================================================================
// Merging secondary results
// ============================================================================

#[test]
fn test_secondary_call_errors_downgrade_to_warnings() {
    // A failed lookup must not fail the primary operation.
    let secondary = decoded_result(
        OutputFormat::Json,
        r#"{"status": 1, "errors": {"error": {"code": 404, "codetag": "L1", "message": "no such entry"}}}"#,
    );
    assert!(secondary.has_error());

    let mut primary = ApiResult::new();
    primary.add_messages(secondary.into_messages(), Some(Severity::Warning));

    assert!(!primary.has_error());
    assert_eq!(primary.severity(), Severity::Warning);
}
