use std::net::Ipv4Addr;

use async_trait::async_trait;
use thiserror::Error;

use crate::caa::CaaRecord;
use crate::problem::ProblemDetails;

/// A CAA, A, or TXT record lookup service, injected into the VA at
/// construction. The VA never performs DNS resolution of its own
/// accord outside of this trait — see 4.A/4.E/4.G.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn lookup_host(&self, name: &str) -> Result<Vec<Ipv4Addr>, DnsError>;
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, DnsError>;
    async fn lookup_caa(&self, name: &str) -> Result<Vec<CaaRecord>, DnsError>;
}

/// A resolver failure, pre-classified into the taxonomy-relevant
/// buckets the VA needs to distinguish: a permanent "this name does not
/// exist" answer versus everything else (timeouts, SERVFAIL, transport
/// failure).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnsError {
    #[error("host not found: {0}")]
    NxDomain(String),
    #[error("dns query timed out")]
    Timeout,
    #[error("dns resolution failed: {0}")]
    Other(String),
}

/// Address resolver (4.A). Returns the preferred address (first in the
/// resolver's ordering) alongside the full set, or a classified problem.
pub async fn resolve_preferred(
    resolver: &dyn DnsResolver,
    hostname: &str,
) -> Result<(Ipv4Addr, Vec<Ipv4Addr>), ProblemDetails> {
    let addresses = resolver
        .lookup_host(hostname)
        .await
        .map_err(|err| classify_dns_error(hostname, &err))?;
    match addresses.first() {
        Some(preferred) => Ok((*preferred, addresses)),
        None => Err(ProblemDetails::unknown_host(format!(
            "no A records found for {hostname}"
        ))),
    }
}

pub fn classify_dns_error(hostname: &str, err: &DnsError) -> ProblemDetails {
    match err {
        DnsError::NxDomain(_) => {
            ProblemDetails::unknown_host(format!("{hostname}: no such host"))
        }
        DnsError::Timeout => ProblemDetails::connection(format!("{hostname}: dns timed out")),
        DnsError::Other(detail) => {
            ProblemDetails::connection(format!("{hostname}: dns lookup failed: {detail}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolvers::test::StaticResolver;

    #[tokio::test]
    async fn resolve_preferred_picks_first_address() {
        let resolver = StaticResolver::new()
            .with_a("example.com", vec!["10.0.0.2".parse().unwrap(), "10.0.0.1".parse().unwrap()]);
        let (preferred, all) = resolve_preferred(&resolver, "example.com").await.unwrap();
        assert_eq!(preferred, "10.0.0.2".parse::<Ipv4Addr>().unwrap());
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn resolve_preferred_classifies_nxdomain() {
        let resolver = StaticResolver::new();
        let problem = resolve_preferred(&resolver, "missing.example").await.unwrap_err();
        assert_eq!(problem.problem_type, crate::problem::ProblemType::UnknownHost);
    }
}
