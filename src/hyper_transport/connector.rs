use std::sync::Arc;

use rustls::pki_types::ServerName;
use tokio::net::TcpStream;

use crate::{ConnectionParams, MyOdooRpcError, TransportError};

#[async_trait::async_trait]
pub trait MyOdooRpcConnector<TStream: tokio::io::AsyncRead + tokio::io::AsyncWrite> {
    async fn connect(&self) -> Result<TStream, TransportError>;
    /// `host:port`, also used as the `Host` header.
    fn get_remote_host(&self) -> String;
}

pub trait RpcStream: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send {}

impl<T: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send> RpcStream for T {}

/// Plain TCP for `jsonrpc`, TLS over TCP for `jsonrpc+ssl`.
pub struct EndpointConnector {
    host_port: String,
    tls: Option<(tokio_rustls::TlsConnector, ServerName<'static>)>,
}

impl EndpointConnector {
    pub fn new(
        params: &ConnectionParams,
        tls_config: Option<Arc<rustls::ClientConfig>>,
    ) -> Result<Self, MyOdooRpcError> {
        let tls = if params.protocol.is_ssl() {
            let tls_config = tls_config.unwrap_or_else(super::default_client_config);

            let server_name = ServerName::try_from(params.host.clone()).map_err(|err| {
                MyOdooRpcError::Configuration(format!(
                    "'{}' is not a valid TLS server name: {}",
                    params.host, err
                ))
            })?;

            Some((tokio_rustls::TlsConnector::from(tls_config), server_name))
        } else {
            None
        };

        Ok(Self {
            host_port: params.get_host_port(),
            tls,
        })
    }

    pub fn is_tls(&self) -> bool {
        self.tls.is_some()
    }
}

#[async_trait::async_trait]
impl MyOdooRpcConnector<Box<dyn RpcStream>> for EndpointConnector {
    async fn connect(&self) -> Result<Box<dyn RpcStream>, TransportError> {
        let tcp_stream = TcpStream::connect(self.host_port.as_str())
            .await
            .map_err(|err| {
                TransportError::CanNotConnectToRemoteHost(format!(
                    "Can not connect to remote endpoint: '{}'. Err: {}",
                    self.host_port, err
                ))
            })?;

        if let Err(err) = tcp_stream.set_nodelay(true) {
            tracing::debug!(remote_host = self.host_port.as_str(), "Can not set TCP_NODELAY: {}", err);
        }

        let Some((tls_connector, server_name)) = self.tls.as_ref() else {
            return Ok(Box::new(tcp_stream));
        };

        let tls_stream = tls_connector
            .connect(server_name.clone(), tcp_stream)
            .await
            .map_err(|err| {
                TransportError::CanNotConnectToRemoteHost(format!(
                    "TLS handshake with '{}' failed: {}",
                    self.host_port, err
                ))
            })?;

        Ok(Box::new(tls_stream))
    }

    fn get_remote_host(&self) -> String {
        self.host_port.clone()
    }
}
