//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that
//! validate their contents on construction. Invalid values are rejected
//! with clear error messages.

use std::fmt;

use url::Url;

use crate::error::ConfigError;

/// A validated contract code, the account identifier of the remote service.
///
/// # Example
///
/// ```rust
/// use acumulus_api::ContractCode;
///
/// let code = ContractCode::new("288252").unwrap();
/// assert_eq!(code.as_ref(), "288252");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractCode(String);

impl ContractCode {
    /// Creates a new validated contract code.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyContractCode`] if the code is empty.
    pub fn new(code: impl Into<String>) -> Result<Self, ConfigError> {
        let code = code.into();
        if code.is_empty() {
            return Err(ConfigError::EmptyContractCode);
        }
        Ok(Self(code))
    }
}

impl AsRef<str> for ContractCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated API user name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    /// Creates a new validated user name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyUsername`] if the name is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigError::EmptyUsername);
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated API password.
///
/// # Security
///
/// The `Debug` implementation masks the value, displaying `Password(*****)`
/// instead of the actual password. The raw value leaves the crate only
/// inside the request envelope; every logged rendering goes through
/// [`mask_passwords`](crate::codec::mask_passwords).
///
/// # Example
///
/// ```rust
/// use acumulus_api::Password;
///
/// let password = Password::new("s3cret").unwrap();
/// assert_eq!(format!("{:?}", password), "Password(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Creates a new validated password.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyPassword`] if the password is empty.
    pub fn new(password: impl Into<String>) -> Result<Self, ConfigError> {
        let password = password.into();
        if password.is_empty() {
            return Err(ConfigError::EmptyPassword);
        }
        Ok(Self(password))
    }
}

impl AsRef<str> for Password {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(*****)")
    }
}

/// A validated absolute http(s) base URI for the remote service.
///
/// A trailing slash is stripped so endpoint paths can be appended
/// uniformly.
///
/// # Example
///
/// ```rust
/// use acumulus_api::BaseUri;
///
/// let uri = BaseUri::new("https://api.sielsystems.nl/acumulus/").unwrap();
/// assert_eq!(uri.as_ref(), "https://api.sielsystems.nl/acumulus");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUri(String);

impl BaseUri {
    /// Creates a new validated base URI.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUri`] if `uri` is not an absolute
    /// http(s) URI with a host.
    pub fn new(uri: impl Into<String>) -> Result<Self, ConfigError> {
        let uri = uri.into();
        let invalid = || ConfigError::InvalidBaseUri { uri: uri.clone() };
        let parsed = Url::parse(&uri).map_err(|_| invalid())?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(invalid());
        }
        Ok(Self(uri.trim_end_matches('/').to_string()))
    }
}

impl AsRef<str> for BaseUri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
