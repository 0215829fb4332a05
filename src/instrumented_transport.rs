use std::{sync::Arc, time::Instant};

use bytes::Bytes;
use http::HeaderMap;
use http_body_util::BodyExt;

use crate::{
    json_rpc::{http_event_name, json_rpc_event_name},
    JsonRpcParams, MetricEvent, MetricEventSink, MyOdooRpcError, RequestKind, RequestOutcome,
    RpcTransport, TransportError,
};

struct CallContext {
    request_kind: RequestKind,
    name: String,
    started: Instant,
}

impl CallContext {
    fn start(request_kind: RequestKind, name: String) -> Self {
        Self {
            request_kind,
            name,
            started: Instant::now(),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn into_event(self, elapsed_ms: u64, outcome: RequestOutcome) -> MetricEvent {
        MetricEvent {
            request_kind: self.request_kind,
            name: self.name,
            elapsed_ms,
            outcome,
        }
    }
}

/// Wraps an [`RpcTransport`] and reports every `json` and `http` call to a [`MetricEventSink`].
///
/// Return values and errors are handed back exactly as the wrapped transport produced
/// them, except for `http`, whose body is read completely before it is returned.
pub struct InstrumentedTransport<TTransport: RpcTransport> {
    transport: TTransport,
    sink: Arc<dyn MetricEventSink + Send + Sync + 'static>,
}

impl<TTransport: RpcTransport> InstrumentedTransport<TTransport> {
    pub fn new(transport: TTransport, sink: Arc<dyn MetricEventSink + Send + Sync + 'static>) -> Self {
        Self { transport, sink }
    }

    pub fn get_transport(&self) -> &TTransport {
        &self.transport
    }

    pub async fn json(
        &self,
        path: &str,
        params: &JsonRpcParams,
    ) -> Result<serde_json::Value, MyOdooRpcError> {
        let ctx = CallContext::start(RequestKind::JsonRpc, json_rpc_event_name(path, params)?);

        let result = self.transport.json(path, params).await;
        let elapsed_ms = ctx.elapsed_ms();

        match result {
            Ok(response) => {
                let response_size = response.to_string().len();
                self.report(ctx, elapsed_ms, RequestOutcome::Success { response_size });
                Ok(response)
            }
            Err(MyOdooRpcError::Transport(err)) => {
                self.report(ctx, elapsed_ms, RequestOutcome::Failure(err.clone()));
                Err(MyOdooRpcError::Transport(err))
            }
            Err(err) => Err(err),
        }
    }

    pub async fn http(
        &self,
        path: &str,
        data: Option<Bytes>,
        headers: Option<HeaderMap>,
    ) -> Result<http::Response<Bytes>, MyOdooRpcError> {
        let ctx = CallContext::start(RequestKind::Http, http_event_name(path));

        let result = self.transport.http(path, data, headers).await;
        let elapsed_ms = ctx.elapsed_ms();

        let response = match result {
            Ok(response) => response,
            Err(MyOdooRpcError::Transport(err)) => {
                self.report(ctx, elapsed_ms, RequestOutcome::Failure(err.clone()));
                return Err(MyOdooRpcError::Transport(err));
            }
            Err(err) => return Err(err),
        };

        let (parts, body) = response.into_parts();

        match body.collect().await {
            Ok(collected) => {
                let body = collected.to_bytes();
                self.report(
                    ctx,
                    elapsed_ms,
                    RequestOutcome::Success {
                        response_size: body.len(),
                    },
                );
                Ok(http::Response::from_parts(parts, body))
            }
            Err(err) => {
                let err = TransportError::ResponseBody(err);
                let elapsed_ms = ctx.elapsed_ms();
                self.report(ctx, elapsed_ms, RequestOutcome::Failure(err.clone()));
                Err(MyOdooRpcError::Transport(err))
            }
        }
    }

    fn report(&self, ctx: CallContext, elapsed_ms: u64, outcome: RequestOutcome) {
        self.sink.report_request(ctx.into_event(elapsed_ms, outcome));
    }
}
