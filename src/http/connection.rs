//! Per-host connection handles and the pool that owns them.
//!
//! A handle carries one configured blocking client per
//! `scheme://host[:port]` key, so repeated calls to the same host reuse the
//! underlying connection. Handle options (timeouts, TLS floor, redirect cap)
//! are fixed at construction; a handle is evicted after a transport failure
//! so a poisoned connection is never reused.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Duration;

use url::Url;

use crate::http::errors::HttpError;

/// Connect timeout applied to every handle.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Overall per-exchange timeout applied to every handle.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Maximum number of redirects followed per exchange.
pub const MAX_REDIRECTS: usize = 5;

/// One persistent connection to a single `scheme://host[:port]`.
///
/// Wraps a blocking client configured with the fixed timeouts, a TLS 1.2
/// floor and a bounded redirect policy.
#[derive(Debug)]
pub struct ConnectionHandle {
    key: String,
    client: reqwest::blocking::Client,
}

impl ConnectionHandle {
    fn open(key: String) -> Result<Self, HttpError> {
        let client = reqwest::blocking::Client::builder()
            .use_rustls_tls()
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|error| HttpError::transport(&key, error))?;
        Ok(Self { key, client })
    }

    /// Returns the `scheme://host[:port]` key this handle serves.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) const fn client(&self) -> &reqwest::blocking::Client {
        &self.client
    }
}

/// A keyed map of live [`ConnectionHandle`]s.
///
/// The pool persists across calls; everything else in a client exchange is
/// created fresh per call. Dropping the pool releases every handle still
/// open. It is not designed for concurrent access: each logical client
/// serializes its own calls.
///
/// # Example
///
/// ```rust
/// use acumulus_api::http::ConnectionPool;
///
/// let mut pool = ConnectionPool::new();
/// pool.get("https://api.sielsystems.nl/acumulus/stable/accounts.php").unwrap();
/// pool.get("https://api.sielsystems.nl/acumulus/stable/invoices.php").unwrap();
/// assert_eq!(pool.len(), 1); // same host, same handle
/// ```
#[derive(Debug, Default)]
pub struct ConnectionPool {
    handles: HashMap<String, ConnectionHandle>,
}

impl ConnectionPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `uri`'s host, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUri`] if `uri` lacks a scheme or host and
    /// [`HttpError::Transport`] if a new handle cannot be opened.
    pub fn get(&mut self, uri: &str) -> Result<&ConnectionHandle, HttpError> {
        let key = pool_key(uri)?;
        match self.handles.entry(key) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let handle = ConnectionHandle::open(entry.key().clone())?;
                Ok(entry.insert(handle))
            }
        }
    }

    /// Evicts and releases the handle for `uri`'s host, if present.
    ///
    /// Called after a transport failure: the connection may be poisoned and
    /// must not be reused. Returns `true` if a handle was evicted.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUri`] if `uri` cannot be keyed.
    pub fn close(&mut self, uri: &str) -> Result<bool, HttpError> {
        let key = pool_key(uri)?;
        Ok(self.handles.remove(&key).is_some())
    }

    /// Returns the number of live handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` if no handles are open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Derives the pool key `scheme://host[:port]` from a request URI.
fn pool_key(uri: &str) -> Result<String, HttpError> {
    let url = Url::parse(uri).map_err(|error| HttpError::InvalidUri {
        uri: uri.to_string(),
        reason: error.to_string(),
    })?;
    let host = url.host_str().ok_or_else(|| HttpError::InvalidUri {
        uri: uri.to_string(),
        reason: "missing host".to_string(),
    })?;
    let scheme = url.scheme();
    Ok(url.port().map_or_else(
        || format!("{scheme}://{host}"),
        |port| format!("{scheme}://{host}:{port}"),
    ))
}
