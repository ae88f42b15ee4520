//! TLS-SNI prober (4.D): dials TLS to a pinned address with a specific
//! SNI name and checks the peer certificate's SAN list for that same
//! name, under constant-time comparison.

use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::ServerName;
use tokio_rustls::TlsConnector;
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::GeneralName;
use x509_parser::prelude::FromDer;

use crate::dialer::connect_pinned;
use crate::keyauth::constant_time_eq;
use crate::problem::{classify_io_error, ProblemDetails};
use crate::record::ValidationRecord;
use crate::resolver::{resolve_preferred, DnsResolver};
use crate::tls_danger::dangerous_client_config;

pub struct ProbeOutcome {
    pub record: ValidationRecord,
}

pub struct ProbeFailure {
    pub problem: ProblemDetails,
    pub record: ValidationRecord,
}

/// Dials `hostname:tls_port`, presenting `z_name` as SNI, and checks
/// the peer's first certificate for a `dNSName` SAN equal to `z_name`.
pub async fn probe(
    resolver: &dyn DnsResolver,
    hostname: &str,
    tls_port: u16,
    z_name: &str,
    timeout: Duration,
) -> Result<ProbeOutcome, ProbeFailure> {
    let mut record = ValidationRecord::pending(hostname.to_string(), tls_port);

    let (addr, resolved) = match resolve_preferred(resolver, hostname).await {
        Ok(pair) => pair,
        Err(problem) => return Err(ProbeFailure { problem, record }),
    };
    record.fill_resolved(resolved, addr);

    let fut = async {
        let stream = connect_pinned(addr, tls_port, timeout)
            .await
            .map_err(|e| classify_io_error(&e))?;

        let server_name = ServerName::try_from(z_name.to_string())
            .map_err(|e| ProblemDetails::malformed(format!("invalid sni name {z_name}: {e}")))?;

        let connector = TlsConnector::from(dangerous_client_config());
        let tls_stream = connector
            .connect(server_name, stream)
            .await
            .map_err(|e| classify_io_error(&e))?;

        let (_, session) = tls_stream.get_ref();
        let certs = session
            .peer_certificates()
            .ok_or_else(|| ProblemDetails::unauthorized(format!("no peer certificate from {addr}")))?;
        let leaf = certs
            .first()
            .ok_or_else(|| ProblemDetails::unauthorized(format!("empty certificate chain from {addr}")))?;

        let (_, cert) = X509Certificate::from_der(leaf.as_ref())
            .map_err(|e| ProblemDetails::tls(format!("parsing peer certificate: {e}")))?;

        let san_names = dns_names(&cert);
        if san_names.iter().any(|san| constant_time_eq(san.as_bytes(), z_name.as_bytes())) {
            Ok(())
        } else {
            Err(ProblemDetails::unauthorized(format!(
                "expected SAN {z_name}, found {san_names:?}"
            )))
        }
    };

    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(())) => Ok(ProbeOutcome { record }),
        Ok(Err(problem)) => Err(ProbeFailure { problem, record }),
        Err(_) => Err(ProbeFailure {
            problem: ProblemDetails::connection(format!("tls-sni probe of {hostname} timed out")),
            record,
        }),
    }
}

fn dns_names(cert: &X509Certificate<'_>) -> Vec<String> {
    let Ok(Some(ext)) = cert.subject_alternative_name() else {
        return Vec::new();
    };
    ext.value
        .general_names
        .iter()
        .filter_map(|name| match name {
            GeneralName::DNSName(dns) => Some(dns.to_string()),
            _ => None,
        })
        .collect()
}

/// Computes the `zName` the tls-sni-01 challenge presents as SNI:
/// `hex(sha256(keyAuthorization))` split into two 32-hex-char halves
/// joined by the configured suffix.
pub fn z_name(key_authorization: &str, tls_sni_suffix: &str) -> String {
    let digest = crate::keyauth::sha256_hex(key_authorization);
    let (first, second) = digest.split_at(32);
    format!("{first}.{second}.{tls_sni_suffix}")
}
