//! Configuration types for the API client.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`AcumulusConfig`]: all settings for API communication
//! - [`AcumulusConfigBuilder`]: builder for constructing configurations
//! - [`ContractCode`], [`Username`], [`Password`]: validated credential
//!   newtypes (the password masks its debug output)
//! - [`BaseUri`]: validated service base URI
//! - [`OutputFormat`]: the response format requested from the service
//! - [`ConnectorInfo`]: the client-identification block sent in every
//!   request envelope
//!
//! Configuration is instance-based and passed explicitly; there is no
//! ambient or global state.
//!
//! # Example
//!
//! ```rust
//! use acumulus_api::{AcumulusConfig, ContractCode, Password, Username};
//!
//! let config = AcumulusConfig::builder()
//!     .contract_code(ContractCode::new("288252").unwrap())
//!     .username(Username::new("apiuser").unwrap())
//!     .password(Password::new("s3cret").unwrap())
//!     .test_mode(true)
//!     .build()
//!     .unwrap();
//!
//! assert!(config.test_mode());
//! assert_eq!(
//!     config.endpoint("accounts"),
//!     "https://api.sielsystems.nl/acumulus/stable/accounts.php"
//! );
//! ```

mod newtypes;

pub use newtypes::{BaseUri, ContractCode, Password, Username};

use std::fmt;

use serde::Serialize;

use crate::error::ConfigError;

/// Default service base URI.
pub const DEFAULT_BASE_URI: &str = "https://api.sielsystems.nl/acumulus";

/// Default API version path segment.
pub const DEFAULT_API_VERSION: &str = "stable";

/// Default response language.
pub const DEFAULT_LANGUAGE: &str = "nl";

/// The response format requested from the service.
///
/// Errors raised before format negotiation may come back as XML regardless;
/// the result layer handles that fallback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON responses (the default).
    #[default]
    Json,
    /// XML responses.
    Xml,
}

impl OutputFormat {
    /// Returns the wire value of this format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The client-identification block sent in every request envelope.
///
/// Identifies the host application and this library to the remote service,
/// mainly for support purposes. The defaults identify the library; a host
/// application should at least set `application` to its own name and
/// version.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ConnectorInfo {
    /// Host application name and version.
    pub application: String,
    /// Name of the integration as registered with the service.
    pub webkoppel: String,
    /// The party that developed the integration.
    pub development: String,
    /// Free-form remark; defaults to the library version.
    pub remark: String,
    /// Where the integration can be obtained.
    #[serde(rename = "sourceuri")]
    pub source_uri: String,
}

impl Default for ConnectorInfo {
    fn default() -> Self {
        Self {
            application: format!("acumulus-api-rust {}", crate::LIBRARY_VERSION),
            webkoppel: "Acumulus".to_string(),
            development: "SIEL - Buro RaDer".to_string(),
            remark: format!("Library v{}", crate::LIBRARY_VERSION),
            source_uri: "https://github.com/siel/acumulus-api-rust".to_string(),
        }
    }
}

/// Configuration for the API client.
///
/// Holds the account credentials, service location, requested output
/// format, test-mode flag, response language and connector identification.
///
/// # Example
///
/// ```rust
/// use acumulus_api::{AcumulusConfig, ContractCode, Password, Username};
///
/// let config = AcumulusConfig::builder()
///     .contract_code(ContractCode::new("288252").unwrap())
///     .username(Username::new("apiuser").unwrap())
///     .password(Password::new("s3cret").unwrap())
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct AcumulusConfig {
    contract_code: ContractCode,
    username: Username,
    password: Password,
    base_uri: BaseUri,
    api_version: String,
    output_format: OutputFormat,
    test_mode: bool,
    language: String,
    connector: ConnectorInfo,
}

impl AcumulusConfig {
    /// Creates a new builder for constructing an `AcumulusConfig`.
    #[must_use]
    pub fn builder() -> AcumulusConfigBuilder {
        AcumulusConfigBuilder::new()
    }

    /// Returns the contract code.
    #[must_use]
    pub const fn contract_code(&self) -> &ContractCode {
        &self.contract_code
    }

    /// Returns the API user name.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Returns the API password.
    #[must_use]
    pub const fn password(&self) -> &Password {
        &self.password
    }

    /// Returns the service base URI.
    #[must_use]
    pub const fn base_uri(&self) -> &BaseUri {
        &self.base_uri
    }

    /// Returns the API version path segment.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Returns the requested response format.
    #[must_use]
    pub const fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// Returns `true` when requests instruct the service to validate but
    /// not persist the submitted data.
    #[must_use]
    pub const fn test_mode(&self) -> bool {
        self.test_mode
    }

    /// Returns the response language.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the connector identification block.
    #[must_use]
    pub const fn connector(&self) -> &ConnectorInfo {
        &self.connector
    }

    /// Returns the full endpoint URI for an API function.
    #[must_use]
    pub fn endpoint(&self, api_function: &str) -> String {
        format!(
            "{}/{}/{api_function}.php",
            self.base_uri.as_ref(),
            self.api_version
        )
    }
}

/// Builder for [`AcumulusConfig`].
///
/// Contract code, user name and password are required; everything else has
/// defaults.
#[derive(Debug, Default)]
pub struct AcumulusConfigBuilder {
    contract_code: Option<ContractCode>,
    username: Option<Username>,
    password: Option<Password>,
    base_uri: Option<BaseUri>,
    api_version: Option<String>,
    output_format: OutputFormat,
    test_mode: bool,
    language: Option<String>,
    connector: Option<ConnectorInfo>,
}

impl AcumulusConfigBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Sets the contract code (required).
    #[must_use]
    pub fn contract_code(mut self, contract_code: ContractCode) -> Self {
        self.contract_code = Some(contract_code);
        self
    }

    /// Sets the API user name (required).
    #[must_use]
    pub fn username(mut self, username: Username) -> Self {
        self.username = Some(username);
        self
    }

    /// Sets the API password (required).
    #[must_use]
    pub fn password(mut self, password: Password) -> Self {
        self.password = Some(password);
        self
    }

    /// Overrides the service base URI.
    #[must_use]
    pub fn base_uri(mut self, base_uri: BaseUri) -> Self {
        self.base_uri = Some(base_uri);
        self
    }

    /// Overrides the API version path segment.
    #[must_use]
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Sets the requested response format.
    #[must_use]
    pub const fn output_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = output_format;
        self
    }

    /// Sets the test-mode flag.
    #[must_use]
    pub const fn test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Sets the response language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Overrides the connector identification block.
    #[must_use]
    pub fn connector(mut self, connector: ConnectorInfo) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Builds the configuration, applying defaults for unset options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] when a required field
    /// was not set, or a validation error from a defaulted value.
    pub fn build(self) -> Result<AcumulusConfig, ConfigError> {
        let contract_code = self.contract_code.ok_or(ConfigError::MissingRequiredField {
            field: "contract_code",
        })?;
        let username = self
            .username
            .ok_or(ConfigError::MissingRequiredField { field: "username" })?;
        let password = self
            .password
            .ok_or(ConfigError::MissingRequiredField { field: "password" })?;
        let base_uri = match self.base_uri {
            Some(base_uri) => base_uri,
            None => BaseUri::new(DEFAULT_BASE_URI)?,
        };
        Ok(AcumulusConfig {
            contract_code,
            username,
            password,
            base_uri,
            api_version: self
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            output_format: self.output_format,
            test_mode: self.test_mode,
            language: self.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            connector: self.connector.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_builder() -> AcumulusConfigBuilder {
        AcumulusConfig::builder()
            .contract_code(ContractCode::new("288252").unwrap())
            .username(Username::new("apiuser").unwrap())
            .password(Password::new("s3cret").unwrap())
    }

    #[test]
    fn test_build_applies_defaults() {
        let config = minimal_builder().build().unwrap();
        assert_eq!(config.base_uri().as_ref(), DEFAULT_BASE_URI);
        assert_eq!(config.api_version(), "stable");
        assert_eq!(config.output_format(), OutputFormat::Json);
        assert!(!config.test_mode());
        assert_eq!(config.language(), "nl");
    }

    #[test]
    fn test_build_requires_credentials() {
        let result = AcumulusConfig::builder().build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField {
                field: "contract_code"
            })
        ));
    }

    #[test]
    fn test_endpoint_joins_base_version_and_function() {
        let config = minimal_builder()
            .base_uri(BaseUri::new("https://api.example.com/acumulus").unwrap())
            .api_version("stable")
            .build()
            .unwrap();
        assert_eq!(
            config.endpoint("invoice_add"),
            "https://api.example.com/acumulus/stable/invoice_add.php"
        );
    }

    #[test]
    fn test_connector_defaults_identify_the_library() {
        let config = minimal_builder().build().unwrap();
        assert!(config.connector().remark.contains("Library v"));
        assert_eq!(config.connector().webkoppel, "Acumulus");
    }

    #[test]
    fn test_output_format_wire_values() {
        assert_eq!(OutputFormat::Json.as_str(), "json");
        assert_eq!(OutputFormat::Xml.to_string(), "xml");
    }

    #[test]
    fn test_debug_output_masks_password() {
        let config = minimal_builder().build().unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("Password(*****)"));
    }
}
