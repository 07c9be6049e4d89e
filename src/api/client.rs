//! The stateful client: configuration plus the persistent connection pool.

use serde_json::{Map, Value};

use crate::api::request::ApiRequest;
use crate::api::result::ApiResult;
use crate::config::AcumulusConfig;
use crate::http::ConnectionPool;

/// A client for the remote API.
///
/// Owns the configuration and the connection pool; everything else is
/// created fresh per call. The client serializes its own calls: one
/// exchange at a time, in submit → send → receive → decode order.
///
/// # Example
///
/// ```rust,no_run
/// use serde_json::Map;
/// use acumulus_api::{AcumulusClient, AcumulusConfig, ContractCode, Password, Username};
///
/// let config = AcumulusConfig::builder()
///     .contract_code(ContractCode::new("288252").unwrap())
///     .username(Username::new("apiuser").unwrap())
///     .password(Password::new("s3cret").unwrap())
///     .build()
///     .unwrap();
///
/// let mut client = AcumulusClient::new(config);
/// let mut result = client.call("accounts", Map::new(), true);
/// result.set_main_response_key("accounts", true);
/// for line in result.to_log_messages() {
///     tracing::debug!("{line}");
/// }
/// ```
#[derive(Debug)]
pub struct AcumulusClient {
    config: AcumulusConfig,
    pool: ConnectionPool,
}

impl AcumulusClient {
    /// Creates a client with an empty connection pool.
    #[must_use]
    pub fn new(config: AcumulusConfig) -> Self {
        Self {
            config,
            pool: ConnectionPool::new(),
        }
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &AcumulusConfig {
        &self.config
    }

    /// Executes one API call and returns a fresh result.
    ///
    /// See [`ApiRequest::execute`]; expected failures land on the result as
    /// messages, never as panics or `Err` returns.
    pub fn call(
        &mut self,
        api_function: &str,
        payload: Map<String, Value>,
        needs_auth: bool,
    ) -> ApiResult {
        self.call_with_result(api_function, payload, needs_auth, ApiResult::new())
    }

    /// Executes one API call, merging into a caller-supplied result so
    /// pre-existing local messages are preserved.
    pub fn call_with_result(
        &mut self,
        api_function: &str,
        payload: Map<String, Value>,
        needs_auth: bool,
        result: ApiResult,
    ) -> ApiResult {
        let config = &self.config;
        let pool = &mut self.pool;
        ApiRequest::new(config).execute(pool, api_function, payload, needs_auth, Some(result))
    }
}
