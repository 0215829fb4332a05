use serde_json::Value;

use crate::MyOdooRpcError;

use super::{JsonRpcParams, JSON_RPC_ENDPOINT};

const MODEL_ARG_INDEX: usize = 3;
const OPERATION_ARG_INDEX: usize = 4;

/// Name under which a JSON-RPC call is reported.
///
/// `execute*` calls through `/jsonrpc` become `"/jsonrpc | <model>: <operation>"`
/// so that model level traffic stays apart in the statistics. Everything else is
/// reported under its path.
pub fn json_rpc_event_name(path: &str, params: &JsonRpcParams) -> Result<String, MyOdooRpcError> {
    if path != JSON_RPC_ENDPOINT || !params.is_execute() {
        return Ok(path.to_string());
    }

    let args = params.positional_args().unwrap_or(&[]);

    match (args.get(MODEL_ARG_INDEX), args.get(OPERATION_ARG_INDEX)) {
        (Some(model), Some(operation)) => Ok(format!(
            "{} | {}: {}",
            path,
            render_arg(model),
            render_arg(operation)
        )),
        _ => Err(MyOdooRpcError::ProtocolShape(format!(
            "'{}' call to {} must carry at least {} positional args [db, uid, password, model, operation]. Got: {}",
            params.method().unwrap_or_default(),
            path,
            OPERATION_ARG_INDEX + 1,
            args.len()
        ))),
    }
}

pub fn http_event_name(path: &str) -> String {
    path.to_string()
}

fn render_arg(value: &Value) -> String {
    match value {
        Value::String(value) => value.clone(),
        other => other.to_string(),
    }
}
