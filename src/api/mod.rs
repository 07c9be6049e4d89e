//! The API protocol layer: envelope building, call execution and result
//! decoding.
//!
//! The main types in this module are:
//!
//! - [`AcumulusClient`]: configuration + connection pool, one call at a time
//! - [`ApiRequest`]: builds and executes a single call
//! - [`ApiResult`]: decoded response merged with local diagnostics
//! - [`ApiStatus`]: the remote verdict carried in every response
//! - [`LocalCode`]: diagnostic codes for conditions raised by this client
//!
//! Control flow for one call: build the envelope, serialize to the XML wire
//! format, POST over a pooled connection, decode and classify the response.
//! Callers read the returned [`ApiResult`]; there is no guaranteed-success
//! return path, and no expected failure mode surfaces as a panic.

mod client;
mod codes;
mod request;
mod result;

pub use client::AcumulusClient;
pub use codes::{ApiStatus, LocalCode};
pub use request::ApiRequest;
pub use result::ApiResult;
