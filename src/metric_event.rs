use std::fmt;

use crate::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    JsonRpc,
    Http,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::JsonRpc => "jsonrpc",
            RequestKind::Http => "http",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    Success { response_size: usize },
    Failure(TransportError),
}

/// One observation per intercepted transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricEvent {
    pub request_kind: RequestKind,
    pub name: String,
    pub elapsed_ms: u64,
    pub outcome: RequestOutcome,
}

impl MetricEvent {
    pub fn is_success(&self) -> bool {
        match self.outcome {
            RequestOutcome::Success { .. } => true,
            RequestOutcome::Failure(_) => false,
        }
    }

    pub fn response_size(&self) -> Option<usize> {
        match &self.outcome {
            RequestOutcome::Success { response_size } => Some(*response_size),
            RequestOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&TransportError> {
        match &self.outcome {
            RequestOutcome::Success { .. } => None,
            RequestOutcome::Failure(err) => Some(err),
        }
    }
}
