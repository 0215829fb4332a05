use std::{
    marker::PhantomData,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use bytes::Bytes;
use http::{
    header::{CONTENT_TYPE, COOKIE, HOST, SET_COOKIE},
    HeaderMap, Method,
};
use http_body_util::{BodyExt, Full};
use tokio::sync::Mutex;

use crate::{
    json_rpc::{check_rpc_fault, JsonRpcRequestEnvelope},
    HyperResponse, JsonRpcParams, MyOdooRpcError, RpcTransport, TransportError,
};

use super::{
    wrap_http1_endpoint::wrap_http1_endpoint, HyperConnectionState, HyperRpcTransportInner,
    MyOdooRpcConnector, SendPayloadError,
};

const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const SESSION_COOKIE_NAME: &str = "session_id";
const MAX_CONNECT_ATTEMPTS: usize = 3;

/// HTTP/1.1 transport for an Odoo server, one keep-alive connection per instance.
pub struct HyperRpcTransport<
    TStream: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
    TConnector: MyOdooRpcConnector<TStream> + Send + Sync + 'static,
> {
    connector: TConnector,
    stream: PhantomData<fn() -> TStream>,
    inner: Arc<HyperRpcTransportInner>,
    connect_timeout: Duration,
    request_timeout: Duration,
    connection_id: AtomicU64,
    request_id: AtomicU64,
    session_cookie: Mutex<Option<String>>,
}

impl<
        TStream: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
        TConnector: MyOdooRpcConnector<TStream> + Send + Sync + 'static,
    > HyperRpcTransport<TStream, TConnector>
{
    pub fn new(connector: TConnector, request_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(HyperRpcTransportInner::new(connector.get_remote_host())),
            connector,
            stream: PhantomData,
            connect_timeout: Duration::from_secs(5),
            request_timeout,
            connection_id: AtomicU64::new(0),
            request_id: AtomicU64::new(0),
            session_cookie: Mutex::new(None),
        }
    }

    pub fn get_request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub async fn get_session_cookie(&self) -> Option<String> {
        self.session_cookie.lock().await.clone()
    }

    async fn connect(&self) -> Result<(), TransportError> {
        let connection_id = self.connection_id.fetch_add(1, Ordering::SeqCst);
        let mut state = self.inner.state.lock().await;

        if state.is_connected() {
            return Ok(());
        }

        let remote_host = self.connector.get_remote_host();

        let stream =
            match tokio::time::timeout(self.connect_timeout, self.connector.connect()).await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(TransportError::CanNotConnectToRemoteHost(format!(
                        "Can not connect to remote endpoint: '{}' Timeout: {:?}",
                        remote_host, self.connect_timeout
                    )));
                }
            };

        let send_request =
            wrap_http1_endpoint(stream, remote_host.as_str(), self.inner.clone(), connection_id)
                .await?;

        *state = HyperConnectionState::Connected {
            current_connection_id: connection_id,
            connected: Instant::now(),
            send_request,
        };

        tracing::debug!(remote_host = remote_host.as_str(), connection_id, "Connected");

        Ok(())
    }

    async fn do_request(
        &self,
        req: hyper::Request<Full<Bytes>>,
    ) -> Result<HyperResponse, TransportError> {
        let mut req = req;
        let mut connect_attempts = 0;

        loop {
            match self.inner.send_payload(req, self.request_timeout).await {
                Ok(response) => return Ok(response),
                Err(SendPayloadError::Transport(err)) => return Err(err),
                Err(SendPayloadError::Disconnected(returned)) => {
                    if connect_attempts == MAX_CONNECT_ATTEMPTS {
                        return Err(TransportError::CanNotConnectToRemoteHost(format!(
                            "Can not keep Http connection to '{}' open",
                            self.connector.get_remote_host()
                        )));
                    }

                    connect_attempts += 1;
                    req = returned;
                    self.connect().await?;
                }
            }
        }
    }

    async fn build_request(
        &self,
        method: Method,
        path: &str,
        content_type: Option<&str>,
        headers: Option<HeaderMap>,
        body: Bytes,
    ) -> Result<hyper::Request<Full<Bytes>>, MyOdooRpcError> {
        let mut builder = hyper::Request::builder()
            .method(method)
            .uri(path)
            .header(HOST, self.connector.get_remote_host());

        let has_content_type = headers
            .as_ref()
            .map(|headers| headers.contains_key(CONTENT_TYPE))
            .unwrap_or(false);

        if let Some(content_type) = content_type {
            if !has_content_type {
                builder = builder.header(CONTENT_TYPE, content_type);
            }
        }

        if let Some(cookie) = self.session_cookie.lock().await.as_ref() {
            builder = builder.header(COOKIE, cookie.as_str());
        }

        if let Some(headers) = headers {
            for (name, value) in headers.iter() {
                builder = builder.header(name, value);
            }
        }

        builder.body(Full::new(body)).map_err(|err| {
            MyOdooRpcError::InvalidRequest(format!("Can not build request to '{}': {}", path, err))
        })
    }

    async fn remember_session(&self, headers: &HeaderMap) {
        for value in headers.get_all(SET_COOKIE) {
            let Ok(value) = value.to_str() else {
                continue;
            };

            let cookie = value.split(';').next().unwrap_or_default().trim();

            if let Some((name, _)) = cookie.split_once('=') {
                if name.trim() == SESSION_COOKIE_NAME {
                    *self.session_cookie.lock().await = Some(cookie.to_string());
                }
            }
        }
    }

    async fn send(&self, req: hyper::Request<Full<Bytes>>) -> Result<HyperResponse, MyOdooRpcError> {
        let response = self.do_request(req).await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(TransportError::from_status(status).into());
        }

        self.remember_session(response.headers()).await;

        Ok(response)
    }
}

#[async_trait::async_trait]
impl<
        TStream: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
        TConnector: MyOdooRpcConnector<TStream> + Send + Sync + 'static,
    > RpcTransport for HyperRpcTransport<TStream, TConnector>
{
    async fn json(
        &self,
        path: &str,
        params: &JsonRpcParams,
    ) -> Result<serde_json::Value, MyOdooRpcError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let body = JsonRpcRequestEnvelope::new(params, id).to_bytes()?;

        let req = self
            .build_request(Method::POST, path, Some(JSON_CONTENT_TYPE), None, body.into())
            .await?;

        let response = self.send(req).await?;

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(TransportError::ResponseBody)?
            .to_bytes();

        let response: serde_json::Value = serde_json::from_slice(&body).map_err(|err| {
            MyOdooRpcError::InvalidResponse(format!(
                "Response of '{}' is not a JSON-RPC envelope: {}",
                path, err
            ))
        })?;

        check_rpc_fault(response)
    }

    async fn http(
        &self,
        path: &str,
        data: Option<Bytes>,
        headers: Option<HeaderMap>,
    ) -> Result<HyperResponse, MyOdooRpcError> {
        let req = match data {
            Some(data) => {
                self.build_request(Method::POST, path, Some(FORM_CONTENT_TYPE), headers, data)
                    .await?
            }
            None => {
                self.build_request(Method::GET, path, None, headers, Bytes::new())
                    .await?
            }
        };

        self.send(req).await
    }
}
