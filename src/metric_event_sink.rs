use crate::{MetricEvent, RequestOutcome};

/// Receiver of request events, usually the statistics pipeline of a load-testing harness.
///
/// Called synchronously on the caller's task right after every transport call resolves.
pub trait MetricEventSink {
    fn report_request(&self, event: MetricEvent);
}

/// Writes every request event to the `tracing` pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMetricEventSink;

impl MetricEventSink for TracingMetricEventSink {
    fn report_request(&self, event: MetricEvent) {
        match &event.outcome {
            RequestOutcome::Success { response_size } => {
                tracing::info!(
                    request_type = event.request_kind.as_str(),
                    name = event.name.as_str(),
                    response_time = event.elapsed_ms,
                    response_length = *response_size,
                    "Request succeeded"
                );
            }
            RequestOutcome::Failure(err) => {
                tracing::warn!(
                    request_type = event.request_kind.as_str(),
                    name = event.name.as_str(),
                    response_time = event.elapsed_ms,
                    exception = %err,
                    "Request failed"
                );
            }
        }
    }
}
