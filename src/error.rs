//! Error types for client configuration.
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and
//! actionable.
//!
//! # Example
//!
//! ```rust
//! use acumulus_api::{ConfigError, ContractCode};
//!
//! let result = ContractCode::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyContractCode)));
//! ```

use thiserror::Error;

/// Errors that can occur when building or validating the configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Contract code cannot be empty.
    #[error("Contract code cannot be empty. Please provide the contract code of your account.")]
    EmptyContractCode,

    /// API user name cannot be empty.
    #[error("Username cannot be empty. Please provide the API user name of your account.")]
    EmptyUsername,

    /// API password cannot be empty.
    #[error("Password cannot be empty. Please provide the API password of your account.")]
    EmptyPassword,

    /// The base URI is not an absolute http(s) URI.
    #[error("Invalid base URI '{uri}'. Please provide an absolute http(s) URI, e.g. 'https://api.sielsystems.nl/acumulus'.")]
    InvalidBaseUri {
        /// The invalid URI that was provided.
        uri: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_contract_code_message() {
        let message = ConfigError::EmptyContractCode.to_string();
        assert!(message.contains("Contract code cannot be empty"));
    }

    #[test]
    fn test_invalid_base_uri_names_the_uri() {
        let error = ConfigError::InvalidBaseUri {
            uri: "not a uri".to_string(),
        };
        assert!(error.to_string().contains("not a uri"));
    }

    #[test]
    fn test_missing_required_field_names_the_field() {
        let error = ConfigError::MissingRequiredField { field: "username" };
        let message = error.to_string();
        assert!(message.contains("username"));
        assert!(message.contains("must be set"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error: &dyn std::error::Error = &ConfigError::EmptyContractCode;
        let _ = error;
    }
}
