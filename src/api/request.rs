//! Building and executing one API call.
//!
//! An [`ApiRequest`] wraps the caller's payload in the service envelope
//! (credentials, format, test mode, language, connector identification),
//! serializes it to the XML wire format and drives the HTTP exchange over a
//! pooled connection. Serialization and transport failures are converted
//! into messages on the returned [`ApiResult`]; the caller always receives
//! a result, never an unhandled failure, for errors up to and including
//! transport failures.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::api::codes::LocalCode;
use crate::api::result::ApiResult;
use crate::codec;
use crate::config::AcumulusConfig;
use crate::http::{ConnectionPool, HttpRequest};
use crate::message::Message;
use crate::severity::Severity;

/// The single POST field carrying the serialized request document.
const POST_FIELD: &str = "xmlstring";

/// One API call in the making.
///
/// An instance is consumed by [`execute`](Self::execute), so a request can
/// never be reused across calls.
///
/// # Example
///
/// ```rust,no_run
/// use serde_json::Map;
/// use acumulus_api::http::ConnectionPool;
/// use acumulus_api::{AcumulusConfig, ApiRequest, ContractCode, Password, Username};
///
/// let config = AcumulusConfig::builder()
///     .contract_code(ContractCode::new("288252").unwrap())
///     .username(Username::new("apiuser").unwrap())
///     .password(Password::new("s3cret").unwrap())
///     .build()
///     .unwrap();
/// let mut pool = ConnectionPool::new();
///
/// let mut result = ApiRequest::new(&config)
///     .execute(&mut pool, "accounts", Map::new(), true, None);
/// result.set_main_response_key("accounts", true);
/// if !result.has_error() {
///     for account in result.main_response_as_list().unwrap_or_default() {
///         println!("{account}");
///     }
/// }
/// ```
#[derive(Debug)]
pub struct ApiRequest<'a> {
    config: &'a AcumulusConfig,
}

impl<'a> ApiRequest<'a> {
    /// Creates a request against the given configuration.
    #[must_use]
    pub const fn new(config: &'a AcumulusConfig) -> Self {
        Self { config }
    }

    /// Executes the call and returns its result.
    ///
    /// Builds the envelope around `payload` (with the credential block only
    /// when `needs_auth`), serializes it, POSTs it as the single
    /// `xmlstring` form field over a pooled connection and hands the
    /// response to the result for decoding. Passing `existing_result`
    /// preserves local messages collected before the call (e.g. from a
    /// failed secondary lookup).
    ///
    /// Every failure that can be attributed to this call lands on the
    /// returned result as a message; nothing is propagated.
    pub fn execute(
        self,
        pool: &mut ConnectionPool,
        api_function: &str,
        payload: Map<String, Value>,
        needs_auth: bool,
        existing_result: Option<ApiResult>,
    ) -> ApiResult {
        let mut result = existing_result.unwrap_or_else(ApiResult::new);
        let uri = self.config.endpoint(api_function);
        result.set_request_context(api_function, &uri, self.config.output_format());

        let submit_message = self.build_submit_message(payload, needs_auth);
        let document = match codec::value_to_xml(&submit_message) {
            Ok(document) => document,
            Err(error) => {
                tracing::warn!(function = api_function, error = %error, "envelope serialization failed");
                result.add(Message::from_error(
                    Severity::Error,
                    LocalCode::EnvelopeSerialization,
                    LocalCode::EnvelopeSerialization.tag(),
                    error,
                ));
                return result;
            }
        };
        result.set_raw_request(document.clone());
        tracing::debug!(
            function = api_function,
            uri = %uri,
            body = %codec::mask_passwords(&document),
            "sending API request"
        );

        let mut fields = BTreeMap::new();
        fields.insert(POST_FIELD.to_string(), document);
        let mut http_request = HttpRequest::new();
        http_request.post(&uri, fields);

        match http_request.execute(pool) {
            Ok(response) => {
                tracing::debug!(
                    function = api_function,
                    code = response.status_code().unwrap_or_default(),
                    "received API response"
                );
                result.set_http_response(response);
            }
            Err(error) => {
                tracing::warn!(function = api_function, error = %error, "transport failure");
                result.add(Message::from_error(
                    Severity::Error,
                    LocalCode::Transport,
                    LocalCode::Transport.tag(),
                    error,
                ));
            }
        }
        result
    }

    /// Builds the full submit message: envelope merged with the payload.
    ///
    /// Payload entries win on key collision; the envelope never overrides
    /// what the caller supplied.
    fn build_submit_message(
        &self,
        payload: Map<String, Value>,
        needs_auth: bool,
    ) -> Map<String, Value> {
        let config = self.config;
        let mut message = Map::new();
        if needs_auth {
            message.insert(
                "contract".to_string(),
                json!({
                    "contractcode": config.contract_code().as_ref(),
                    "username": config.username().as_ref(),
                    "password": config.password().as_ref(),
                }),
            );
        }
        message.insert(
            "format".to_string(),
            json!(config.output_format().as_str()),
        );
        message.insert(
            "testmode".to_string(),
            json!(if config.test_mode() { "1" } else { "0" }),
        );
        message.insert("lang".to_string(), json!(config.language()));
        message.insert(
            "connector".to_string(),
            serde_json::to_value(config.connector()).unwrap_or(Value::Null),
        );
        for (key, value) in payload {
            message.insert(key, value);
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContractCode, OutputFormat, Password, Username};

    fn test_config(test_mode: bool) -> AcumulusConfig {
        AcumulusConfig::builder()
            .contract_code(ContractCode::new("288252").unwrap())
            .username(Username::new("apiuser").unwrap())
            .password(Password::new("s3cret").unwrap())
            .test_mode(test_mode)
            .build()
            .unwrap()
    }

    fn payload(entries: &[(&str, Value)]) -> Map<String, Value> {
        entries
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_submit_message_with_auth() {
        let config = test_config(false);
        let request = ApiRequest::new(&config);
        let message = request.build_submit_message(Map::new(), true);

        let contract = message.get("contract").unwrap();
        assert_eq!(contract["contractcode"], json!("288252"));
        assert_eq!(contract["username"], json!("apiuser"));
        assert_eq!(contract["password"], json!("s3cret"));
        assert_eq!(message.get("format"), Some(&json!("json")));
        assert_eq!(message.get("testmode"), Some(&json!("0")));
        assert_eq!(message.get("lang"), Some(&json!("nl")));
        assert!(message.get("connector").is_some());
    }

    #[test]
    fn test_submit_message_without_auth_has_no_contract() {
        let config = test_config(false);
        let message = ApiRequest::new(&config).build_submit_message(Map::new(), false);
        assert!(message.get("contract").is_none());
    }

    #[test]
    fn test_submit_message_test_mode_flag() {
        let config = test_config(true);
        let message = ApiRequest::new(&config).build_submit_message(Map::new(), false);
        assert_eq!(message.get("testmode"), Some(&json!("1")));
    }

    #[test]
    fn test_payload_overrides_envelope() {
        let config = test_config(false);
        let message = ApiRequest::new(&config)
            .build_submit_message(payload(&[("lang", json!("en"))]), false);
        assert_eq!(message.get("lang"), Some(&json!("en")));
    }

    #[test]
    fn test_payload_entries_are_kept() {
        let config = test_config(false);
        let message = ApiRequest::new(&config).build_submit_message(
            payload(&[("customer", json!({"email": "a@b.c"}))]),
            true,
        );
        assert_eq!(message["customer"]["email"], json!("a@b.c"));
    }

    #[test]
    fn test_envelope_serializes_to_wire_format() {
        let config = test_config(true);
        let message = ApiRequest::new(&config).build_submit_message(Map::new(), true);
        let xml = codec::value_to_xml(&message).unwrap();
        assert!(xml.contains("<contract><contractcode>288252</contractcode>"));
        assert!(xml.contains("<format>json</format>"));
        assert!(xml.contains("<testmode>1</testmode>"));
        assert!(xml.contains("<sourceuri>"));
    }

    #[test]
    fn test_serialization_failure_lands_on_result() {
        let config = test_config(false);
        let mut pool = ConnectionPool::new();
        // A key that is not a valid element name cannot be serialized.
        let result = ApiRequest::new(&config).execute(
            &mut pool,
            "accounts",
            payload(&[("1bad", json!("x"))]),
            false,
            None,
        );
        assert!(result.has_error());
        assert!(result
            .by_code(LocalCode::EnvelopeSerialization.code())
            .is_some());
    }

    #[test]
    fn test_config_format_is_recorded_on_result() {
        let config = test_config(false);
        assert_eq!(config.output_format(), OutputFormat::Json);
    }
}
