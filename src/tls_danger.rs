//! TLS configuration shared by the HTTP fetcher (4.C) and the TLS-SNI
//! prober (4.D): both deliberately connect to an applicant-controlled,
//! not-yet-trusted endpoint, so peer certificate verification is
//! disabled (§1 Non-goals, §4.C "Transport policy").
//!
//! `NoCertVerifier` mirrors the `NoServerVerifier` idiom used by
//! ecosystem servers that must accept self-signed ACME challenge
//! certificates.

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::ring::default_provider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};

#[derive(Debug)]
pub struct NoCertVerifier {
    supported: Vec<SignatureScheme>,
}

impl NoCertVerifier {
    fn new() -> Self {
        NoCertVerifier {
            supported: default_provider().signature_verification_algorithms.supported_schemes(),
        }
    }
}

impl ServerCertVerifier for NoCertVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.supported.clone()
    }
}

/// Builds a `rustls::ClientConfig` that accepts any server certificate.
/// Used for both outbound probing paths; never for anything that
/// handles a subscriber's real traffic.
pub fn dangerous_client_config() -> Arc<ClientConfig> {
    let mut config = ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(NoCertVerifier::new()))
        .with_no_client_auth();
    config.enable_sni = true;
    Arc::new(config)
}
