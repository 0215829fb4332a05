use serde::Serialize;
use serde_json::{Map, Value};

use crate::MyOdooRpcError;

const EXECUTE_METHOD_PREFIX: &str = "execute";

/// `params` member of a JSON-RPC call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JsonRpcParams {
    Service(ServiceCall),
    Named(Map<String, Value>),
}

impl JsonRpcParams {
    pub fn named(value: Value) -> Result<Self, MyOdooRpcError> {
        match value {
            Value::Object(map) => Ok(Self::Named(map)),
            other => Err(MyOdooRpcError::InvalidRequest(format!(
                "JSON-RPC params must be an object. Got: {}",
                other
            ))),
        }
    }

    pub fn empty() -> Self {
        Self::Named(Map::new())
    }

    pub fn method(&self) -> Option<&str> {
        match self {
            JsonRpcParams::Service(call) => Some(call.method.as_str()),
            JsonRpcParams::Named(map) => map.get("method").and_then(Value::as_str),
        }
    }

    pub fn positional_args(&self) -> Option<&[Value]> {
        match self {
            JsonRpcParams::Service(call) => Some(call.args.as_slice()),
            JsonRpcParams::Named(map) => map
                .get("args")
                .and_then(Value::as_array)
                .map(|args| args.as_slice()),
        }
    }

    pub fn is_execute(&self) -> bool {
        match self.method() {
            Some(method) => method.starts_with(EXECUTE_METHOD_PREFIX),
            None => false,
        }
    }
}

impl From<ServiceCall> for JsonRpcParams {
    fn from(call: ServiceCall) -> Self {
        Self::Service(call)
    }
}

/// Call of a server-side service (`object`, `common`, `db`) through the `/jsonrpc` endpoint.
///
/// For `execute` and `execute_kw` the positional arguments are
/// `[db, uid, password, model, operation, ...]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceCall {
    pub service: String,
    pub method: String,
    pub args: Vec<Value>,
}

impl ServiceCall {
    pub fn new(service: impl Into<String>, method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            service: service.into(),
            method: method.into(),
            args,
        }
    }

    pub fn execute(
        db: &str,
        uid: i64,
        password: &str,
        model: &str,
        operation: &str,
        args: Vec<Value>,
    ) -> Self {
        let mut all_args = vec![
            Value::from(db),
            Value::from(uid),
            Value::from(password),
            Value::from(model),
            Value::from(operation),
        ];
        all_args.extend(args);
        Self::new("object", "execute", all_args)
    }

    pub fn execute_kw(
        db: &str,
        uid: i64,
        password: &str,
        model: &str,
        operation: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Self {
        Self::new(
            "object",
            "execute_kw",
            vec![
                Value::from(db),
                Value::from(uid),
                Value::from(password),
                Value::from(model),
                Value::from(operation),
                Value::Array(args),
                Value::Object(kwargs),
            ],
        )
    }
}
