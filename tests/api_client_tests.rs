//! End-to-end tests for the API client against a local mock server.
//!
//! The client is blocking, so the mock server runs on a manually driven
//! Tokio runtime that stays alive for the duration of each test.

use serde_json::{json, Map, Value};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use acumulus_api::{
    AcumulusClient, AcumulusConfig, ApiStatus, BaseUri, ContractCode, LocalCode, OutputFormat,
    Password, Severity, Username,
};

/// Starts a mock server; the returned runtime must outlive the server.
fn start_server() -> (tokio::runtime::Runtime, MockServer) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime starts");
    let server = runtime.block_on(MockServer::start());
    (runtime, server)
}

fn client_for(server_uri: &str) -> AcumulusClient {
    let config = AcumulusConfig::builder()
        .contract_code(ContractCode::new("288252").unwrap())
        .username(Username::new("apiuser").unwrap())
        .password(Password::new("s3cret").unwrap())
        .base_uri(BaseUri::new(server_uri).unwrap())
        .test_mode(true)
        .build()
        .unwrap();
    AcumulusClient::new(config)
}

fn payload(entries: &[(&str, Value)]) -> Map<String, Value> {
    entries
        .iter()
        .map(|(key, value)| ((*key).to_string(), value.clone()))
        .collect()
}

// ============================================================================
// Successful calls
// ============================================================================

#[test]
fn test_successful_picklist_call() {
    let (runtime, server) = start_server();
    runtime.block_on(
        Mock::given(method("POST"))
            .and(path("/stable/accounts.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"status": 0, "accounts": {"account": [{"accountid": "1"}, {"accountid": "2"}]}}"#,
            ))
            .mount(&server),
    );

    let mut client = client_for(&server.uri());
    let mut result = client.call("accounts", Map::new(), true);
    result.set_main_response_key("accounts", true);

    assert_eq!(result.api_status(), Some(ApiStatus::Success));
    assert_eq!(result.status(), Severity::Success);
    assert!(!result.has_error());
    assert_eq!(result.main_response_as_list().unwrap().len(), 2);
}

#[test]
fn test_request_carries_envelope_and_payload() {
    let (runtime, server) = start_server();
    runtime.block_on(
        Mock::given(method("POST"))
            .and(path("/stable/invoice_add.php"))
            .and(body_string_contains("<contractcode>288252</contractcode>"))
            .and(body_string_contains("<username>apiuser</username>"))
            .and(body_string_contains("<password>s3cret</password>"))
            .and(body_string_contains("<testmode>1</testmode>"))
            .and(body_string_contains("<format>json</format>"))
            .and(body_string_contains("<lang>nl</lang>"))
            .and(body_string_contains("<sourceuri>"))
            .and(body_string_contains("<email>customer@example.com</email>"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"status": 0, "invoice": {"invoicenumber": "2024001"}}"#),
            )
            .mount(&server),
    );

    let mut client = client_for(&server.uri());
    let mut result = client.call(
        "invoice_add",
        payload(&[("customer", json!({"email": "customer@example.com"}))]),
        true,
    );
    result.set_main_response_key("invoice", false);

    // The mock only matches when every envelope part was present.
    assert!(!result.has_error());
    assert_eq!(
        result.main_response(),
        &json!({"invoicenumber": "2024001"})
    );
}

#[test]
fn test_connection_is_reused_across_calls() {
    let (runtime, server) = start_server();
    runtime.block_on(
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status": 0}"#))
            .mount(&server),
    );

    let mut client = client_for(&server.uri());
    let first = client.call("accounts", Map::new(), true);
    let second = client.call("costcenters", Map::new(), true);
    assert!(!first.has_error());
    assert!(!second.has_error());

    let requests = runtime
        .block_on(server.received_requests())
        .expect("requests recorded");
    assert_eq!(requests.len(), 2);
}

// ============================================================================
// Degraded responses
// ============================================================================

#[test]
fn test_xml_error_envelope_when_json_was_requested() {
    let (runtime, server) = start_server();
    runtime.block_on(
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string(
                "<myxml><status>1</status><errors><error><code>403 Forbidden</code>\
                 <codetag>AA4EF7</codetag><message>Access denied</message></error>\
                 </errors></myxml>",
            ))
            .mount(&server),
    );

    let mut client = client_for(&server.uri());
    assert_eq!(client.config().output_format(), OutputFormat::Json);
    let result = client.call("accounts", Map::new(), true);

    // The service rejected the message before format negotiation and fell
    // back to its XML error envelope; decoding must still succeed.
    assert_eq!(result.api_status(), Some(ApiStatus::Errors));
    assert!(result.has_error());
    assert_eq!(
        result.by_code_tag("AA4EF7").map(|m| m.text()),
        Some("Access denied")
    );
}

#[test]
fn test_empty_body_is_one_error_with_fixed_code() {
    let (runtime, server) = start_server();
    runtime.block_on(
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&server),
    );

    let mut client = client_for(&server.uri());
    let mut result = client.call("accounts", Map::new(), true);
    result.set_main_response_key("accounts", true);

    assert!(result.has_error());
    assert_eq!(result.len(), 1);
    assert!(result.by_code(LocalCode::EmptyResponseBody.code()).is_some());
    assert_eq!(result.main_response_as_list(), Some(&[][..]));
}

#[test]
fn test_html_error_page_is_reported_as_text() {
    let (runtime, server) = start_server();
    runtime.block_on(
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_string("<html><body><h1>Server Error</h1></body></html>"),
            )
            .mount(&server),
    );

    let mut client = client_for(&server.uri());
    let result = client.call("accounts", Map::new(), true);

    assert!(result.has_error());
    let message = result.by_code(LocalCode::HtmlResponseBody.code()).unwrap();
    assert!(message.text().contains("Server Error"));
    assert!(!message.text().contains("<h1>"));
}

// ============================================================================
// Transport failures
// ============================================================================

#[test]
fn test_transport_failure_lands_on_result() {
    // Nothing listens on port 1; the connection is refused.
    let mut client = client_for("http://127.0.0.1:1");
    let result = client.call("accounts", Map::new(), true);

    assert!(result.has_error());
    let message = result.by_code(LocalCode::Transport.code()).unwrap();
    assert_eq!(message.severity(), Severity::Error);
    assert!(message.source().is_some());
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn test_log_messages_mask_the_password() {
    let (runtime, server) = start_server();
    runtime.block_on(
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status": 0}"#))
            .mount(&server),
    );

    let mut client = client_for(&server.uri());
    let result = client.call("accounts", Map::new(), true);

    let log = result.to_log_messages().join("\n");
    assert!(log.contains("accounts"));
    assert!(log.contains("REMOVED FOR SECURITY"));
    assert!(!log.contains("s3cret"));
}
