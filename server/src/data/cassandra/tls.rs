//! TLS context construction for cluster connections

use openssl::pkey::PKey;
use openssl::ssl::{SslContext, SslContextBuilder, SslFiletype, SslMethod, SslVerifyMode};
use openssl::x509::X509;

use crate::core::config::TlsConfig;
use crate::data::error::DataError;
use crate::utils::path::expand_path;

/// Build an OpenSSL context from file paths or inline PEM content.
///
/// Client certificate and key are only loaded when both are present.
pub fn build_ssl_context(config: &TlsConfig) -> Result<SslContext, DataError> {
    let mut builder = SslContext::builder(SslMethod::tls())?;
    builder.set_verify(if config.allow_insecure {
        SslVerifyMode::NONE
    } else {
        SslVerifyMode::PEER
    });

    if config.use_cert_content {
        load_inline(&mut builder, config)?;
    } else {
        load_files(&mut builder, config)?;
    }

    Ok(builder.build())
}

fn load_files(builder: &mut SslContextBuilder, config: &TlsConfig) -> Result<(), DataError> {
    if let (Some(cert), Some(key)) = (&config.cert_path, &config.key_path) {
        let cert = expand_path(cert);
        let key = expand_path(key);
        tracing::debug!(cert = %cert.display(), key = %key.display(), "Loading client certificate");
        builder.set_certificate_chain_file(&cert)?;
        builder.set_private_key_file(&key, SslFiletype::PEM)?;
    }
    if let Some(ca) = &config.ca_path {
        let ca = expand_path(ca);
        let pem = std::fs::read(&ca)?;
        add_root_certificates(builder, &pem)?;
    }
    Ok(())
}

fn load_inline(builder: &mut SslContextBuilder, config: &TlsConfig) -> Result<(), DataError> {
    if let (Some(cert), Some(key)) = (&config.cert_content, &config.key_content) {
        let cert = X509::from_pem(cert.as_bytes())?;
        let key = PKey::private_key_from_pem(key.as_bytes())?;
        builder.set_certificate(&cert)?;
        builder.set_private_key(&key)?;
    }
    if let Some(ca) = &config.ca_content {
        add_root_certificates(builder, ca.as_bytes())?;
    }
    Ok(())
}

fn add_root_certificates(builder: &mut SslContextBuilder, pem: &[u8]) -> Result<(), DataError> {
    let certs = X509::stack_from_pem(pem)?;
    if certs.is_empty() {
        return Err(DataError::Tls("failed to parse root certificate".to_string()));
    }
    for cert in certs {
        builder.cert_store_mut().add_cert(cert)?;
    }
    Ok(())
}
