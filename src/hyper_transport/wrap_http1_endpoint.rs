use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::client::conn::http1::SendRequest;
use hyper_util::rt::TokioIo;

use crate::TransportError;

use super::HyperRpcTransportInner;

pub async fn wrap_http1_endpoint<
    TStream: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
>(
    stream: TStream,
    remote_host: &str,
    inner: Arc<HyperRpcTransportInner>,
    connection_id: u64,
) -> Result<SendRequest<Full<Bytes>>, TransportError> {
    let io = TokioIo::new(stream);
    let handshake_result = hyper::client::conn::http1::handshake(io).await;
    match handshake_result {
        Ok((mut sender, conn)) => {
            let remote_host_spawned = remote_host.to_string();
            tokio::task::spawn(async move {
                if let Err(err) = conn.await {
                    tracing::warn!(
                        remote_host = remote_host_spawned.as_str(),
                        connection_id,
                        "Http connection is failed: {:?}",
                        err
                    );
                }

                inner.disconnect(connection_id).await;
            });

            if let Err(err) = sender.ready().await {
                return Err(TransportError::CanNotConnectToRemoteHost(format!(
                    "Can not establish Http connection to '{remote_host}'. Http handshake Error: {}",
                    err
                )));
            }

            Ok(sender)
        }
        Err(err) => Err(TransportError::CanNotConnectToRemoteHost(format!(
            "Can not establish Http connection to '{remote_host}'. Http handshake Error: {}",
            err
        ))),
    }
}
