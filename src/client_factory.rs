use std::{sync::Arc, time::Duration};

use crate::{
    hyper_transport::{client_config_from_ca_file, EndpointConnector, OdooHyperTransport},
    ConnectionParams, MetricEventSink, MyOdooRpcClient, MyOdooRpcError, MyOdooRpcSettings,
    RpcTransport,
};

/// Builds instrumented clients, one per virtual actor.
pub struct MyOdooRpcClientFactory {
    sink: Arc<dyn MetricEventSink + Send + Sync + 'static>,
    tls_config: Option<Arc<rustls::ClientConfig>>,
    request_timeout: Duration,
}

impl MyOdooRpcClientFactory {
    pub fn new(sink: Arc<dyn MetricEventSink + Send + Sync + 'static>) -> Self {
        Self {
            sink,
            tls_config: None,
            request_timeout: Duration::from_secs(crate::DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn from_settings(
        settings: &MyOdooRpcSettings,
        sink: Arc<dyn MetricEventSink + Send + Sync + 'static>,
    ) -> Result<Self, MyOdooRpcError> {
        if settings.request_timeout_secs == 0 {
            return Err(MyOdooRpcError::Configuration(
                "request timeout must be at least one second".to_string(),
            ));
        }

        let mut result = Self::new(sink).with_request_timeout(settings.request_timeout());

        if let Some(ca_file) = settings.ca_file.as_ref() {
            result = result.with_tls_config(client_config_from_ca_file(ca_file)?);
        }

        Ok(result)
    }

    pub fn with_tls_config(mut self, tls_config: Arc<rustls::ClientConfig>) -> Self {
        self.tls_config = Some(tls_config);
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn create_client(
        &self,
        base_url: &str,
        version: Option<&str>,
    ) -> Result<MyOdooRpcClient<OdooHyperTransport>, MyOdooRpcError> {
        let params = ConnectionParams::from_base_url(base_url, version)?;
        let connector = EndpointConnector::new(&params, self.tls_config.clone())?;

        tracing::debug!(
            host = params.host.as_str(),
            port = params.port,
            protocol = params.protocol.as_str(),
            version = params.version.as_deref().unwrap_or(""),
            "Creating Odoo RPC client"
        );

        let transport = OdooHyperTransport::new(connector, self.request_timeout);
        Ok(MyOdooRpcClient::new(params, transport, self.sink.clone()))
    }

    pub fn create_client_with_transport<TTransport: RpcTransport>(
        &self,
        base_url: &str,
        version: Option<&str>,
        transport: TTransport,
    ) -> Result<MyOdooRpcClient<TTransport>, MyOdooRpcError> {
        let params = ConnectionParams::from_base_url(base_url, version)?;
        Ok(MyOdooRpcClient::new(params, transport, self.sink.clone()))
    }
}

/// Client and credentials owned by one simulated user.
pub struct OdooRpcUser<TTransport: RpcTransport> {
    pub client: MyOdooRpcClient<TTransport>,
    pub db_name: String,
    pub login: String,
    pub password: String,
}

impl OdooRpcUser<OdooHyperTransport> {
    pub fn from_settings(
        settings: &MyOdooRpcSettings,
        factory: &MyOdooRpcClientFactory,
    ) -> Result<Self, MyOdooRpcError> {
        let client = factory.create_client(settings.host.as_str(), settings.version_override())?;
        Ok(Self::new(client, settings))
    }
}

impl<TTransport: RpcTransport> OdooRpcUser<TTransport> {
    pub fn new(client: MyOdooRpcClient<TTransport>, settings: &MyOdooRpcSettings) -> Self {
        Self {
            client,
            db_name: settings.db_name.clone(),
            login: settings.login.clone(),
            password: settings.password.clone(),
        }
    }

    pub async fn login(&mut self) -> Result<i64, MyOdooRpcError> {
        self.client
            .login(
                self.db_name.as_str(),
                self.login.as_str(),
                self.password.as_str(),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Protocol, TracingMetricEventSink};

    fn factory() -> MyOdooRpcClientFactory {
        MyOdooRpcClientFactory::new(Arc::new(TracingMetricEventSink))
    }

    #[tokio::test]
    async fn test_create_plain_client() {
        let client = factory()
            .create_client("http://odoo.example.com:8069", Some("16.0"))
            .unwrap();

        let params = client.connection_params();
        assert_eq!(params.host, "odoo.example.com");
        assert_eq!(params.port, 8069);
        assert_eq!(params.protocol, Protocol::JsonRpc);
        assert_eq!(params.version.as_deref(), Some("16.0"));
    }

    #[tokio::test]
    async fn test_create_client_with_custom_transport() {
        let params = ConnectionParams::from_base_url("http://127.0.0.1:8069", None).unwrap();
        let transport = OdooHyperTransport::new(
            EndpointConnector::new(&params, None).unwrap(),
            Duration::from_secs(10),
        );

        let client = factory()
            .create_client_with_transport("http://127.0.0.1:8069", None, transport)
            .unwrap();

        assert_eq!(client.connection_params(), &params);
        assert_eq!(client.get_transport().get_request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_malformed_url_fails_at_construction() {
        let err = factory().create_client("not a url", None).err().unwrap();

        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_https_without_ca_file_uses_default_roots() {
        let client = factory()
            .create_client("https://odoo.example.com", None)
            .unwrap();

        let params = client.connection_params();
        assert_eq!(params.host, "odoo.example.com");
        assert_eq!(params.port, 443);
        assert_eq!(params.protocol, Protocol::JsonRpcSsl);
    }

    #[test]
    fn test_from_settings_with_missing_ca_file_fails() {
        let settings = MyOdooRpcSettings {
            ca_file: Some("/nonexistent/ca.pem".into()),
            ..Default::default()
        };

        let err = MyOdooRpcClientFactory::from_settings(&settings, Arc::new(TracingMetricEventSink))
            .err()
            .unwrap();

        assert!(err.is_configuration());
    }

    #[test]
    fn test_from_settings_with_zero_timeout_fails() {
        let settings = MyOdooRpcSettings {
            request_timeout_secs: 0,
            ..Default::default()
        };

        let err = MyOdooRpcClientFactory::from_settings(&settings, Arc::new(TracingMetricEventSink))
            .err()
            .unwrap();

        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_user_keeps_credentials_from_settings() {
        let settings = MyOdooRpcSettings {
            host: "http://localhost:8069".to_string(),
            db_name: "bench".to_string(),
            login: "loadtest".to_string(),
            password: "secret".to_string(),
            ..Default::default()
        };

        let user = OdooRpcUser::from_settings(&settings, &factory()).unwrap();

        assert_eq!(user.db_name, "bench");
        assert_eq!(user.login, "loadtest");
        assert_eq!(user.password, "secret");
        assert_eq!(user.client.connection_params().port, 8069);
        assert_eq!(user.client.connection_params().version, None);
    }
}
