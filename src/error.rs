use std::time::Duration;

use http::StatusCode;

/// Failure raised by the network layer of a transport.
///
/// These are the only errors that are measured and reported as failed request events.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP Error {status}: {reason}")]
    HttpStatus { status: StatusCode, reason: String },
    #[error("{0}")]
    CanNotConnectToRemoteHost(String),
    #[error("Request timeout: {0:?}")]
    RequestTimeout(Duration),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Can not read response body: {0}")]
    ResponseBody(String),
}

impl TransportError {
    pub fn from_status(status: StatusCode) -> Self {
        Self::HttpStatus {
            status,
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }

    pub fn is_http_status(&self) -> bool {
        match self {
            TransportError::HttpStatus { .. } => true,
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::RequestTimeout(_) => true,
            _ => false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MyOdooRpcError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Unexpected JSON-RPC payload shape: {0}")]
    ProtocolShape(String),
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("Can not build request: {0}")]
    InvalidRequest(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("RPC error: {message}")]
    Rpc {
        message: String,
        data: serde_json::Value,
    },
    #[error("Not logged in")]
    NotLoggedIn,
}

impl MyOdooRpcError {
    pub fn is_transport(&self) -> bool {
        match self {
            MyOdooRpcError::Transport(_) => true,
            _ => false,
        }
    }

    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            MyOdooRpcError::Transport(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_configuration(&self) -> bool {
        match self {
            MyOdooRpcError::Configuration(_) => true,
            _ => false,
        }
    }

    pub fn is_protocol_shape(&self) -> bool {
        match self {
            MyOdooRpcError::ProtocolShape(_) => true,
            _ => false,
        }
    }
}
