use serde::Serialize;
use serde_json::Value;

use crate::MyOdooRpcError;

use super::JsonRpcParams;

#[derive(Debug, Serialize)]
pub struct JsonRpcRequestEnvelope<'s> {
    jsonrpc: &'static str,
    method: &'static str,
    params: &'s JsonRpcParams,
    id: u64,
}

impl<'s> JsonRpcRequestEnvelope<'s> {
    pub fn new(params: &'s JsonRpcParams, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method: "call",
            params,
            id,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, MyOdooRpcError> {
        serde_json::to_vec(self).map_err(|err| {
            MyOdooRpcError::InvalidRequest(format!("Can not serialize JSON-RPC request: {}", err))
        })
    }
}

/// Turns a response envelope carrying an `error` member into [`MyOdooRpcError::Rpc`].
pub fn check_rpc_fault(response: Value) -> Result<Value, MyOdooRpcError> {
    let error = match response.get("error") {
        Some(error) if !error.is_null() => error,
        _ => return Ok(response),
    };

    let message = error
        .get("data")
        .and_then(|data| data.get("message"))
        .or_else(|| error.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("Unknown RPC error")
        .to_string();

    Err(MyOdooRpcError::Rpc {
        message,
        data: error.clone(),
    })
}

pub fn take_result(response: Value) -> Value {
    match response {
        Value::Object(mut map) => map.remove("result").unwrap_or(Value::Null),
        _ => Value::Null,
    }
}
