use std::fmt;

use http::Uri;

use crate::MyOdooRpcError;

const SECURE_SCHEME: &str = "https";
const DEFAULT_HTTP_PORT: u16 = 80;
const DEFAULT_HTTPS_PORT: u16 = 443;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    JsonRpc,
    JsonRpcSsl,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::JsonRpc => "jsonrpc",
            Protocol::JsonRpcSsl => "jsonrpc+ssl",
        }
    }

    pub fn is_ssl(&self) -> bool {
        match self {
            Protocol::JsonRpcSsl => true,
            Protocol::JsonRpc => false,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and how an RPC client talks to the server. Derived once from the base url.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
    pub version: Option<String>,
}

impl ConnectionParams {
    pub fn from_base_url(base_url: &str, version: Option<&str>) -> Result<Self, MyOdooRpcError> {
        let uri: Uri = base_url.parse().map_err(|err| {
            MyOdooRpcError::Configuration(format!("Can not parse base url '{}': {}", base_url, err))
        })?;

        let scheme = uri.scheme_str().ok_or_else(|| {
            MyOdooRpcError::Configuration(format!("Base url '{}' has no scheme", base_url))
        })?;

        let host = match uri.host() {
            Some(host) if !host.is_empty() => host.trim_start_matches('[').trim_end_matches(']'),
            _ => {
                return Err(MyOdooRpcError::Configuration(format!(
                    "Base url '{}' has no host",
                    base_url
                )))
            }
        };

        let secure = scheme.eq_ignore_ascii_case(SECURE_SCHEME);

        let port = match uri.port_u16() {
            Some(0) => {
                return Err(MyOdooRpcError::Configuration(format!(
                    "Base url '{}' has port 0",
                    base_url
                )))
            }
            Some(port) => port,
            None if secure => DEFAULT_HTTPS_PORT,
            None => DEFAULT_HTTP_PORT,
        };

        Ok(Self {
            host: host.to_string(),
            port,
            protocol: if secure {
                Protocol::JsonRpcSsl
            } else {
                Protocol::JsonRpc
            },
            version: version
                .filter(|version| !version.is_empty())
                .map(|version| version.to_string()),
        })
    }

    pub fn get_host_port(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_https_without_port_defaults_to_443() {
        let params = ConnectionParams::from_base_url("https://odoo.example.com", None).unwrap();

        assert_eq!(
            params,
            ConnectionParams {
                host: "odoo.example.com".to_string(),
                port: 443,
                protocol: Protocol::JsonRpcSsl,
                version: None,
            }
        );
    }

    #[test]
    fn test_http_with_explicit_port() {
        let params = ConnectionParams::from_base_url("http://odoo.example.com:8069", None).unwrap();

        assert_eq!(params.host, "odoo.example.com");
        assert_eq!(params.port, 8069);
        assert_eq!(params.protocol, Protocol::JsonRpc);
        assert_eq!(params.protocol.as_str(), "jsonrpc");
    }

    #[test]
    fn test_http_without_port_defaults_to_80() {
        let params = ConnectionParams::from_base_url("http://odoo.example.com/", None).unwrap();

        assert_eq!(params.port, 80);
    }

    #[test]
    fn test_https_with_explicit_port_keeps_it() {
        let params = ConnectionParams::from_base_url("https://odoo.example.com:8443", None).unwrap();

        assert_eq!(params.port, 8443);
        assert_eq!(params.protocol.to_string(), "jsonrpc+ssl");
    }

    #[test]
    fn test_version_only_when_not_empty() {
        let with_version =
            ConnectionParams::from_base_url("http://localhost:8069", Some("16.0")).unwrap();
        let empty_version = ConnectionParams::from_base_url("http://localhost:8069", Some("")).unwrap();

        assert_eq!(with_version.version.as_deref(), Some("16.0"));
        assert_eq!(empty_version.version, None);
    }

    #[test]
    fn test_ipv6_host_is_unbracketed() {
        let params = ConnectionParams::from_base_url("http://[::1]:8069", None).unwrap();

        assert_eq!(params.host, "::1");
        assert_eq!(params.get_host_port(), "[::1]:8069");
    }

    #[test]
    fn test_malformed_urls_are_configuration_errors() {
        for url in ["", "odoo.example.com", "http://", "http://odoo example.com", "http://odoo:0"] {
            let err = ConnectionParams::from_base_url(url, None).unwrap_err();
            assert!(err.is_configuration(), "{} -> {:?}", url, err);
        }
    }
}
