use bytes::Bytes;
use http::HeaderMap;

use crate::{HyperResponse, JsonRpcParams, MyOdooRpcError};

/// The two call primitives of an Odoo RPC client that perform network I/O.
///
/// Network failures must be returned as [`MyOdooRpcError::Transport`]. Any other
/// variant is treated as a caller or protocol fault and is not reported as a request event.
#[async_trait::async_trait]
pub trait RpcTransport {
    /// Sends a JSON-RPC `call` and returns the decoded response envelope.
    async fn json(&self, path: &str, params: &JsonRpcParams) -> Result<serde_json::Value, MyOdooRpcError>;

    /// Sends a raw HTTP request. `GET` without data, `POST` with data. The body is left unread.
    ///
    /// Redirects are not followed: a 3xx response is returned as-is and counts as a success.
    async fn http(
        &self,
        path: &str,
        data: Option<Bytes>,
        headers: Option<HeaderMap>,
    ) -> Result<HyperResponse, MyOdooRpcError>;
}
