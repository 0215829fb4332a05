use std::{fs::File, io::BufReader, path::Path, sync::Arc};

use rustls::{pki_types::CertificateDer, ClientConfig, RootCertStore};

use crate::MyOdooRpcError;

/// Trusts the Mozilla root program shipped with `webpki-roots`.
pub fn default_client_config() -> Arc<ClientConfig> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();

    Arc::new(config)
}

pub fn client_config_from_ca_file(path: &Path) -> Result<Arc<ClientConfig>, MyOdooRpcError> {
    let roots = load_root_store(path)?;

    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(Arc::new(config))
}

pub fn load_root_store(path: &Path) -> Result<RootCertStore, MyOdooRpcError> {
    let certificates = load_certificates(path)?;
    let mut roots = RootCertStore::empty();
    let (added, _ignored) = roots.add_parsable_certificates(certificates);
    if added == 0 {
        return Err(MyOdooRpcError::Configuration(format!(
            "no valid CA certificates found in {}",
            path.display()
        )));
    }
    Ok(roots)
}

fn load_certificates(path: &Path) -> Result<Vec<CertificateDer<'static>>, MyOdooRpcError> {
    let file = File::open(path).map_err(|err| {
        MyOdooRpcError::Configuration(format!("can not open {}: {}", path.display(), err))
    })?;
    let mut reader = BufReader::new(file);
    let certificates = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| {
            MyOdooRpcError::Configuration(format!(
                "failed to parse PEM certs from {}: {}",
                path.display(),
                err
            ))
        })?;
    if certificates.is_empty() {
        return Err(MyOdooRpcError::Configuration(format!(
            "no certificates found in {}",
            path.display()
        )));
    }
    Ok(certificates)
}
