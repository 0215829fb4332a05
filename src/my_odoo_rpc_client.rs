use std::sync::Arc;

use bytes::Bytes;
use http::HeaderMap;
use serde_json::{json, Map, Value};

use crate::{
    json_rpc::{take_result, AUTHENTICATE_ENDPOINT, JSON_RPC_ENDPOINT, VERSION_INFO_ENDPOINT},
    ConnectionParams, InstrumentedTransport, JsonRpcParams, MetricEventSink, MyOdooRpcError,
    RpcTransport, ServiceCall,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OdooSession {
    pub db: String,
    pub uid: i64,
    pub login: String,
    password: String,
}

/// Odoo RPC client whose every network call is reported as a request event.
pub struct MyOdooRpcClient<TTransport: RpcTransport> {
    params: ConnectionParams,
    transport: InstrumentedTransport<TTransport>,
    server_version: Option<String>,
    session: Option<OdooSession>,
}

impl<TTransport: RpcTransport> MyOdooRpcClient<TTransport> {
    pub fn new(
        params: ConnectionParams,
        transport: TTransport,
        sink: Arc<dyn MetricEventSink + Send + Sync + 'static>,
    ) -> Self {
        Self {
            server_version: params.version.clone(),
            params,
            transport: InstrumentedTransport::new(transport, sink),
            session: None,
        }
    }

    pub fn connection_params(&self) -> &ConnectionParams {
        &self.params
    }

    pub fn get_transport(&self) -> &TTransport {
        self.transport.get_transport()
    }

    pub fn session(&self) -> Option<&OdooSession> {
        self.session.as_ref()
    }

    pub async fn json(
        &self,
        path: &str,
        params: &JsonRpcParams,
    ) -> Result<Value, MyOdooRpcError> {
        self.transport.json(path, params).await
    }

    pub async fn http(
        &self,
        path: &str,
        data: Option<Bytes>,
        headers: Option<HeaderMap>,
    ) -> Result<http::Response<Bytes>, MyOdooRpcError> {
        self.transport.http(path, data, headers).await
    }

    /// Configured version, or the one reported by the server on first use.
    pub async fn version(&mut self) -> Result<String, MyOdooRpcError> {
        if let Some(version) = self.server_version.as_ref() {
            return Ok(version.clone());
        }

        let response = self
            .json(VERSION_INFO_ENDPOINT, &JsonRpcParams::empty())
            .await?;

        let version = take_result(response)
            .get("server_version")
            .and_then(Value::as_str)
            .map(|version| version.to_string())
            .ok_or_else(|| {
                MyOdooRpcError::InvalidResponse(format!(
                    "{} did not return a server_version",
                    VERSION_INFO_ENDPOINT
                ))
            })?;

        self.server_version = Some(version.clone());
        Ok(version)
    }

    pub async fn login(&mut self, db: &str, login: &str, password: &str) -> Result<i64, MyOdooRpcError> {
        let params = JsonRpcParams::named(json!({
            "db": db,
            "login": login,
            "password": password,
        }))?;

        let response = self.json(AUTHENTICATE_ENDPOINT, &params).await?;

        let uid = take_result(response)
            .get("uid")
            .and_then(Value::as_i64)
            .ok_or_else(|| MyOdooRpcError::Rpc {
                message: format!("Wrong login ID or password for '{}' on '{}'", login, db),
                data: Value::Null,
            })?;

        self.session = Some(OdooSession {
            db: db.to_string(),
            uid,
            login: login.to_string(),
            password: password.to_string(),
        });

        Ok(uid)
    }

    pub async fn execute(&self, model: &str, method: &str, args: Vec<Value>) -> Result<Value, MyOdooRpcError> {
        let session = self.session.as_ref().ok_or(MyOdooRpcError::NotLoggedIn)?;

        let call = ServiceCall::execute(
            session.db.as_str(),
            session.uid,
            session.password.as_str(),
            model,
            method,
            args,
        );

        let params: JsonRpcParams = call.into();
        let response = self.json(JSON_RPC_ENDPOINT, &params).await?;
        Ok(take_result(response))
    }

    pub async fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Option<Map<String, Value>>,
    ) -> Result<Value, MyOdooRpcError> {
        let session = self.session.as_ref().ok_or(MyOdooRpcError::NotLoggedIn)?;

        let call = ServiceCall::execute_kw(
            session.db.as_str(),
            session.uid,
            session.password.as_str(),
            model,
            method,
            args,
            kwargs.unwrap_or_default(),
        );

        let params: JsonRpcParams = call.into();
        let response = self.json(JSON_RPC_ENDPOINT, &params).await?;
        Ok(take_result(response))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{HyperResponse, MetricEvent};

    #[derive(Default)]
    struct CollectingSink {
        events: Mutex<Vec<MetricEvent>>,
    }

    impl MetricEventSink for CollectingSink {
        fn report_request(&self, event: MetricEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[derive(Default)]
    struct ScriptedTransport {
        calls: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait::async_trait]
    impl RpcTransport for ScriptedTransport {
        async fn json(&self, path: &str, params: &JsonRpcParams) -> Result<Value, MyOdooRpcError> {
            self.calls
                .lock()
                .unwrap()
                .push((path.to_string(), serde_json::to_value(params).unwrap()));

            let result = match path {
                AUTHENTICATE_ENDPOINT if params.method().is_none() => {
                    match serde_json::to_value(params).unwrap()["password"].as_str() {
                        Some("admin") => json!({"uid": 2, "db": "odoo"}),
                        _ => json!({"uid": false}),
                    }
                }
                VERSION_INFO_ENDPOINT => json!({"server_version": "16.0", "server_serie": "16.0"}),
                _ => json!([7, 8]),
            };

            Ok(json!({"jsonrpc": "2.0", "id": 0, "result": result}))
        }

        async fn http(
            &self,
            _path: &str,
            _data: Option<Bytes>,
            _headers: Option<HeaderMap>,
        ) -> Result<HyperResponse, MyOdooRpcError> {
            Ok(crate::utils::into_full_body_response(http::Response::new(
                Bytes::from_static(b"ok"),
            )))
        }
    }

    fn client(version: Option<&str>) -> (MyOdooRpcClient<ScriptedTransport>, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::default());
        let params = ConnectionParams::from_base_url("http://localhost:8069", version).unwrap();
        (
            MyOdooRpcClient::new(params, ScriptedTransport::default(), sink.clone()),
            sink,
        )
    }

    #[tokio::test]
    async fn test_execute_kw_requires_login() {
        let (client, sink) = client(None);

        let err = client.execute_kw("res.partner", "search", vec![], None).await.unwrap_err();

        assert!(matches!(err, MyOdooRpcError::NotLoggedIn));
        assert!(sink.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_then_execute_kw() {
        let (mut client, sink) = client(None);

        let uid = client.login("odoo", "admin", "admin").await.unwrap();
        let result = client
            .execute_kw("res.partner", "search", vec![json!([])], None)
            .await
            .unwrap();

        assert_eq!(uid, 2);
        assert_eq!(result, json!([7, 8]));

        let calls = client.get_transport().calls.lock().unwrap().clone();
        assert_eq!(calls[1].0, "/jsonrpc");
        assert_eq!(
            calls[1].1["args"],
            json!(["odoo", 2, "admin", "res.partner", "search", [[]], {}])
        );

        let names: Vec<String> = sink
            .events
            .lock()
            .unwrap()
            .iter()
            .map(|event| event.name.clone())
            .collect();
        assert_eq!(
            names,
            vec![
                "/web/session/authenticate".to_string(),
                "/jsonrpc | res.partner: search".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_wrong_password_is_rpc_error() {
        let (mut client, _sink) = client(None);

        let err = client.login("odoo", "admin", "nope").await.unwrap_err();

        assert!(matches!(err, MyOdooRpcError::Rpc { .. }));
        assert!(client.session().is_none());
    }

    #[tokio::test]
    async fn test_configured_version_skips_server() {
        let (mut client, sink) = client(Some("15.0"));

        assert_eq!(client.version().await.unwrap(), "15.0");
        assert!(sink.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_version_is_fetched_once() {
        let (mut client, sink) = client(None);

        assert_eq!(client.version().await.unwrap(), "16.0");
        assert_eq!(client.version().await.unwrap(), "16.0");

        assert_eq!(sink.events.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_execute_names_model_and_operation() {
        let (mut client, sink) = client(None);
        client.login("odoo", "admin", "admin").await.unwrap();

        client
            .execute("sale.order", "write", vec![json!([1]), json!({"note": "x"})])
            .await
            .unwrap();

        let events = sink.events.lock().unwrap();
        assert_eq!(events.last().unwrap().name, "/jsonrpc | sale.order: write");
    }
}
