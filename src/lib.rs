//! # Acumulus API Rust client
//!
//! A Rust client for the Acumulus web API, covering the protocol layer:
//! envelope building, XML/JSON wire codecs, blocking HTTP transport with
//! per-host connection reuse, and severity-ranked result decoding.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`AcumulusConfig`] and
//!   [`AcumulusConfigBuilder`], with validated credential newtypes
//! - A diagnostic model ([`Severity`], [`Message`], [`MessageCollection`])
//!   that merges local failures and remote API errors into one ranked view
//! - Wire codecs ([`codec`]): payload map ↔ XML, JSON wrappers, HTML error
//!   page detection, and password masking for safe logging
//! - A blocking HTTP layer ([`http`]) with a keyed connection pool and a
//!   strict one-exchange-per-request state machine
//! - The call driver ([`AcumulusClient`] / [`ApiRequest`]) and the decoded
//!   outcome ([`ApiResult`])
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use serde_json::Map;
//! use acumulus_api::{AcumulusClient, AcumulusConfig, ContractCode, Password, Username};
//!
//! let config = AcumulusConfig::builder()
//!     .contract_code(ContractCode::new("288252").unwrap())
//!     .username(Username::new("apiuser").unwrap())
//!     .password(Password::new("s3cret").unwrap())
//!     .test_mode(true)
//!     .build()
//!     .unwrap();
//!
//! let mut client = AcumulusClient::new(config);
//!
//! // Fetch the picklist of accounts.
//! let mut result = client.call("accounts", Map::new(), true);
//! result.set_main_response_key("accounts", true);
//!
//! if result.has_error() {
//!     eprintln!("call failed: {:?}", result.status());
//! } else {
//!     for account in result.main_response_as_list().unwrap_or_default() {
//!         println!("{account}");
//!     }
//! }
//! ```
//!
//! ## Error handling
//!
//! Every failure that can be attributed to a call — transport errors,
//! undecodable or empty bodies, HTML error pages, remote error statuses —
//! lands on that call's [`ApiResult`] as a [`Message`]; callers branch on
//! [`ApiResult::status`] or [`ApiResult::has_error`]. Only programmer
//! misuse (executing an unconfigured request, executing twice, an invalid
//! URI) surfaces as an error or panic at the API boundary.
//!
//! ## Design principles
//!
//! - **No global state**: configuration, logger access and the connection
//!   pool are passed explicitly
//! - **Fail-fast validation**: all newtypes validate on construction
//! - **Blocking by design**: one call is one socket round trip; the only
//!   blocking point is the HTTP exchange with fixed timeouts
//! - **Immutable diagnostics**: messages never change after construction,
//!   collections never remove entries

pub mod api;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod message;
pub mod messages;
pub mod severity;

/// This library's version, sent in the connector identification block.
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export public types at crate root for convenience
pub use api::{AcumulusClient, ApiRequest, ApiResult, ApiStatus, LocalCode};
pub use config::{
    AcumulusConfig, AcumulusConfigBuilder, BaseUri, ConnectorInfo, ContractCode, OutputFormat,
    Password, Username,
};
pub use error::ConfigError;
pub use message::{Code, Message, MessageFormat};
pub use messages::MessageCollection;
pub use severity::{Severity, SeverityMask};

// Re-export HTTP transport types
pub use http::{ConnectionHandle, ConnectionPool, HttpError, HttpMethod, HttpRequest, HttpResponse};
