use std::time::{Duration, Instant};

use bytes::Bytes;
use http_body_util::Full;
use hyper::client::conn::http1::SendRequest;
use tokio::sync::Mutex;

use crate::{HyperResponse, TransportError};

pub enum HyperConnectionState {
    Disconnected,

    Connected {
        current_connection_id: u64,
        connected: Instant,
        send_request: SendRequest<Full<Bytes>>,
    },
}

impl HyperConnectionState {
    pub fn is_connected(&self) -> bool {
        match self {
            Self::Connected { .. } => true,
            _ => false,
        }
    }
}

pub enum SendPayloadError {
    /// Nothing was sent. The request is handed back so it can go out on a fresh connection.
    Disconnected(hyper::Request<Full<Bytes>>),
    Transport(TransportError),
}

pub struct HyperRpcTransportInner {
    pub state: Mutex<HyperConnectionState>,
    pub name: String,
}

impl HyperRpcTransportInner {
    pub fn new(name: String) -> Self {
        Self {
            state: Mutex::new(HyperConnectionState::Disconnected),
            name,
        }
    }

    pub async fn send_payload(
        &self,
        req: hyper::Request<Full<Bytes>>,
        request_timeout: Duration,
    ) -> Result<HyperResponse, SendPayloadError> {
        let mut state = self.state.lock().await;

        let HyperConnectionState::Connected {
            current_connection_id,
            send_request,
            ..
        } = &mut *state
        else {
            return Err(SendPayloadError::Disconnected(req));
        };

        let connection_id = *current_connection_id;

        match tokio::time::timeout(request_timeout, send_request.ready()).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::debug!(
                    name = self.name.as_str(),
                    connection_id,
                    "Connection is not usable anymore: {}",
                    err
                );
                *state = HyperConnectionState::Disconnected;
                return Err(SendPayloadError::Disconnected(req));
            }
            Err(_) => {
                return Err(SendPayloadError::Transport(TransportError::RequestTimeout(
                    request_timeout,
                )));
            }
        }

        let send_request_feature = send_request.send_request(req);
        drop(state);

        let result = tokio::time::timeout(request_timeout, send_request_feature).await;

        match result {
            Ok(Ok(response)) => Ok(crate::utils::from_incoming_body(response)),
            Ok(Err(err)) => {
                self.disconnect(connection_id).await;
                Err(SendPayloadError::Transport(TransportError::ConnectionFailed(
                    err.to_string(),
                )))
            }
            Err(_) => {
                self.disconnect(connection_id).await;
                Err(SendPayloadError::Transport(TransportError::RequestTimeout(
                    request_timeout,
                )))
            }
        }
    }

    pub async fn disconnect(&self, connection_id: u64) {
        let mut state = self.state.lock().await;

        match &*state {
            HyperConnectionState::Connected {
                current_connection_id,
                connected,
                ..
            } => {
                if *current_connection_id != connection_id {
                    return;
                }

                tracing::debug!(
                    name = self.name.as_str(),
                    connection_id,
                    "Disconnected after {:?}",
                    connected.elapsed()
                );
            }
            HyperConnectionState::Disconnected => {
                return;
            }
        }

        *state = HyperConnectionState::Disconnected;
    }
}
