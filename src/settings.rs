use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

use crate::MyOdooRpcError;

pub const HOST_ENV_VAR: &str = "ODOO_HOST";
pub const DB_NAME_ENV_VAR: &str = "ODOO_DB_NAME";
pub const LOGIN_ENV_VAR: &str = "ODOO_LOGIN";
pub const PASSWORD_ENV_VAR: &str = "ODOO_PASSWORD";
pub const VERSION_ENV_VAR: &str = "ODOO_VERSION";
pub const REQUEST_TIMEOUT_ENV_VAR: &str = "ODOO_REQUEST_TIMEOUT_SECS";
pub const CA_FILE_ENV_VAR: &str = "ODOO_CA_FILE";

pub const DEFAULT_HOST: &str = "http://localhost:8069";
pub const DEFAULT_DB_NAME: &str = "odoo";
pub const DEFAULT_LOGIN: &str = "admin";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Options supplied by the load-testing harness for one target server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MyOdooRpcSettings {
    pub host: String,
    pub db_name: String,
    pub login: String,
    pub password: String,
    /// Empty lets the client ask the server.
    pub version: String,
    pub request_timeout_secs: u64,
    pub ca_file: Option<PathBuf>,
}

impl Default for MyOdooRpcSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            db_name: DEFAULT_DB_NAME.to_string(),
            login: DEFAULT_LOGIN.to_string(),
            password: String::new(),
            version: String::new(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            ca_file: None,
        }
    }
}

impl MyOdooRpcSettings {
    pub fn from_env() -> Result<Self, MyOdooRpcError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MyOdooRpcError> {
        let mut result = Self::default();

        if let Some(host) = lookup(HOST_ENV_VAR) {
            result.host = host;
        }

        if let Some(db_name) = lookup(DB_NAME_ENV_VAR) {
            result.db_name = db_name;
        }

        if let Some(login) = lookup(LOGIN_ENV_VAR) {
            result.login = login;
        }

        if let Some(password) = lookup(PASSWORD_ENV_VAR) {
            result.password = password;
        }

        if let Some(version) = lookup(VERSION_ENV_VAR) {
            result.version = version;
        }

        if let Some(timeout) = lookup(REQUEST_TIMEOUT_ENV_VAR) {
            let request_timeout_secs = match timeout.trim().parse::<u64>() {
                Ok(value) if value > 0 => value,
                _ => {
                    return Err(MyOdooRpcError::Configuration(format!(
                        "{} must be a positive number of seconds. Got: '{}'",
                        REQUEST_TIMEOUT_ENV_VAR, timeout
                    )));
                }
            };
            result.request_timeout_secs = request_timeout_secs;
        }

        if let Some(ca_file) = lookup(CA_FILE_ENV_VAR) {
            if !ca_file.is_empty() {
                result.ca_file = Some(PathBuf::from(ca_file));
            }
        }

        Ok(result)
    }

    pub fn version_override(&self) -> Option<&str> {
        if self.version.is_empty() {
            None
        } else {
            Some(self.version.as_str())
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = MyOdooRpcSettings::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(settings.db_name, "odoo");
        assert_eq!(settings.login, "admin");
        assert_eq!(settings.password, "");
        assert_eq!(settings.version_override(), None);
        assert_eq!(settings.request_timeout(), Duration::from_secs(120));
        assert_eq!(settings.ca_file, None);
    }

    #[test]
    fn test_values_from_lookup() {
        let settings = MyOdooRpcSettings::from_lookup(lookup_from(&[
            (HOST_ENV_VAR, "https://odoo.example.com"),
            (DB_NAME_ENV_VAR, "prod"),
            (LOGIN_ENV_VAR, "loadtest"),
            (PASSWORD_ENV_VAR, "secret"),
            (VERSION_ENV_VAR, "17.0"),
            (REQUEST_TIMEOUT_ENV_VAR, "30"),
            (CA_FILE_ENV_VAR, "/etc/ssl/odoo.pem"),
        ]))
        .unwrap();

        assert_eq!(settings.host, "https://odoo.example.com");
        assert_eq!(settings.db_name, "prod");
        assert_eq!(settings.login, "loadtest");
        assert_eq!(settings.password, "secret");
        assert_eq!(settings.version_override(), Some("17.0"));
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert_eq!(settings.ca_file, Some(PathBuf::from("/etc/ssl/odoo.pem")));
    }

    #[test]
    fn test_bad_timeout_is_configuration_error() {
        let err = MyOdooRpcSettings::from_lookup(lookup_from(&[(REQUEST_TIMEOUT_ENV_VAR, "soon")]))
            .unwrap_err();

        assert!(err.is_configuration());
    }

    #[test]
    fn test_zero_timeout_is_configuration_error() {
        let err = MyOdooRpcSettings::from_lookup(lookup_from(&[(REQUEST_TIMEOUT_ENV_VAR, "0")]))
            .unwrap_err();

        assert!(err.is_configuration());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let settings: MyOdooRpcSettings =
            serde_json::from_str(r#"{"host": "http://odoo:8069", "db_name": "bench"}"#).unwrap();

        assert_eq!(settings.host, "http://odoo:8069");
        assert_eq!(settings.db_name, "bench");
        assert_eq!(settings.login, "admin");
        assert_eq!(settings.request_timeout_secs, 120);
    }
}
