//! Transport layer for node RPC communication
//!
//! The Tezos node speaks plain REST: resources are addressed by path and
//! answered with JSON. A transport only moves JSON in and out; everything
//! protocol specific lives in [`TezosClient`](crate::TezosClient).

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::SdkError;

/// HTTP verb of an RPC request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Read a resource
    Get,
    /// Submit a JSON body
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

/// Transport trait for RPC communication (object-safe)
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request to `path` and get the JSON response
    async fn request_json(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, SdkError>;
}

/// Helper to deserialize response
pub fn deserialize_response<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, SdkError> {
    serde_json::from_value(value).map_err(|e| SdkError::Serialization(e.to_string()))
}

type ResponseMap = HashMap<(HttpMethod, String), Value>;

/// Mock transport for testing
///
/// Answers from a table keyed by method and path. Paths without a canned
/// response behave like a node that does not know the resource.
pub struct MockTransport {
    responses: Arc<Mutex<ResponseMap>>,
    default_responses: Arc<Mutex<ResponseMap>>,
}

impl MockTransport {
    /// Chain id reported by default
    pub const CHAIN_ID: &'static str = "NetXUdfLh6Gm88t";
    /// Head block hash reported by default
    pub const HEAD_HASH: &'static str = "BLockGenesisGenesisGenesisGenesisGenesisf79b5d1CoW2";
    /// Head level reported by default
    pub const HEAD_LEVEL: i64 = 256;

    /// Create a new mock transport
    pub fn new() -> Self {
        let mut defaults = HashMap::new();
        let get = |path: &str| (HttpMethod::Get, path.to_string());

        defaults.insert(get("/chains/main/chain_id"), Value::String(Self::CHAIN_ID.to_string()));
        defaults.insert(
            get("/chains/main/blocks/head/hash"),
            Value::String(Self::HEAD_HASH.to_string()),
        );
        defaults.insert(
            get("/chains/main/blocks/head/header"),
            serde_json::json!({
                "hash": Self::HEAD_HASH,
                "level": Self::HEAD_LEVEL,
                "protocol": "PsBabyM1eUXZseaJdmXFApDSBqj8YBfwELoxZHHW77EMcAbbwAS",
                "chain_id": Self::CHAIN_ID,
                "timestamp": "2019-10-18T12:00:00Z",
            }),
        );
        defaults.insert(
            get("/chains/main/blocks/head/context/constants"),
            serde_json::json!({
                "hard_gas_limit_per_operation": "1040000",
                "hard_storage_limit_per_operation": "60000",
            }),
        );

        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            default_responses: Arc::new(Mutex::new(defaults)),
        }
    }

    /// Set a mock response for a GET of `path`
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned (only possible if another thread panicked while holding the lock).
    pub fn set_response(&self, path: &str, response: Value) {
        self.set_method_response(HttpMethod::Get, path, response);
    }

    /// Set a mock response for a specific method and path
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn set_method_response(&self, method: HttpMethod, path: &str, response: Value) {
        self.responses
            .lock()
            .expect("MockTransport mutex poisoned")
            .insert((method, path.to_string()), response);
    }

    /// Clear custom responses
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn clear_responses(&self) {
        self.responses
            .lock()
            .expect("MockTransport mutex poisoned")
            .clear();
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request_json(
        &self,
        method: HttpMethod,
        path: &str,
        _body: Option<Value>,
    ) -> Result<Value, SdkError> {
        let key = (method, path.to_string());

        let custom_response = self
            .responses
            .lock()
            .map_err(|_| SdkError::Transport("MockTransport mutex poisoned".to_string()))?
            .get(&key)
            .cloned();

        if let Some(response) = custom_response {
            return Ok(response);
        }

        let default_response = self
            .default_responses
            .lock()
            .map_err(|_| SdkError::Transport("MockTransport mutex poisoned".to_string()))?
            .get(&key)
            .cloned();

        default_response.ok_or_else(|| SdkError::NotFound(path.to_string()))
    }
}

/// HTTP transport for real RPC communication
#[cfg(feature = "http")]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

#[cfg(feature = "http")]
impl HttpTransport {
    /// Create a new HTTP transport for a node base URL
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: url.trim_end_matches('/').to_string(),
        }
    }

    /// Node base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl Transport for HttpTransport {
    async fn request_json(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, SdkError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "rpc request");

        let request = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url).json(&body.unwrap_or(Value::Null)),
        };

        let response = request
            .send()
            .await
            .map_err(|e| SdkError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SdkError::NotFound(path.to_string()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| SdkError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), body = %text, "rpc error");
            return Err(SdkError::Rpc {
                status: status.as_u16(),
                message: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| SdkError::Serialization(e.to_string()))
    }
}
