//! Default `DnsResolver` backed by `hickory-resolver`, the same crate
//! `ferron` and `rama-dns` use for ACME-adjacent DNS work.

use std::net::Ipv4Addr;

use async_trait::async_trait;
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::rr::rdata::caa::{Property, Value as CaaValue};
use hickory_resolver::proto::rr::rdata::A;
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::{Name, ResolveError, TokioResolver};

use crate::caa::CaaRecord;
use crate::resolver::{DnsError, DnsResolver};

#[derive(Clone)]
pub struct HickoryResolver {
    inner: TokioResolver,
}

impl HickoryResolver {
    /// Builds a resolver from the host's system configuration
    /// (`/etc/resolv.conf` on Unix), falling back to Cloudflare's public
    /// resolvers when the system configuration cannot be read.
    pub fn new() -> Self {
        let inner = TokioResolver::builder_tokio()
            .unwrap_or_else(|_| {
                TokioResolver::builder_with_config(
                    ResolverConfig::cloudflare(),
                    TokioConnectionProvider::default(),
                )
            })
            .build();
        HickoryResolver { inner }
    }

    pub fn with_config(config: ResolverConfig) -> Self {
        let inner =
            TokioResolver::builder_with_config(config, TokioConnectionProvider::default())
                .build();
        HickoryResolver { inner }
    }

    fn name(hostname: &str) -> Result<Name, DnsError> {
        Name::from_utf8(hostname)
            .map_err(|e| DnsError::Other(format!("invalid dns name {hostname}: {e}")))
    }
}

impl Default for HickoryResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DnsResolver for HickoryResolver {
    async fn lookup_host(&self, name: &str) -> Result<Vec<Ipv4Addr>, DnsError> {
        let name = Self::name(name)?;
        let lookup = self
            .inner
            .ipv4_lookup(name)
            .await
            .map_err(classify_resolve_error)?;
        Ok(lookup.into_iter().map(|A(ip)| ip).collect())
    }

    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, DnsError> {
        let name = Self::name(name)?;
        let lookup = self
            .inner
            .txt_lookup(name)
            .await
            .map_err(classify_resolve_error)?;
        Ok(lookup
            .into_iter()
            .map(|txt| {
                txt.txt_data()
                    .iter()
                    .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .collect())
    }

    async fn lookup_caa(&self, name: &str) -> Result<Vec<CaaRecord>, DnsError> {
        let dns_name = Self::name(name)?;
        let lookup = match self.inner.lookup(dns_name, RecordType::CAA).await {
            Ok(lookup) => lookup,
            Err(err) if is_no_records(&err) => return Ok(Vec::new()),
            Err(err) => return Err(classify_resolve_error(err)),
        };
        Ok(lookup
            .record_iter()
            .filter_map(|record| match record.data() {
                RData::CAA(caa) => Some(CaaRecord {
                    tag: property_to_tag(caa.tag()),
                    flag: if caa.issuer_critical() { 128 } else { 0 },
                    value: caa_value_to_string(caa.value()),
                }),
                _ => None,
            })
            .collect())
    }
}

fn property_to_tag(property: &Property) -> String {
    match property {
        Property::Issue => "issue".to_string(),
        Property::IssueWild => "issuewild".to_string(),
        Property::Iodef => "iodef".to_string(),
        Property::Unknown(tag) => tag.clone(),
    }
}

fn caa_value_to_string(value: &CaaValue) -> String {
    match value {
        CaaValue::Issuer(name, _params) => {
            name.as_ref().map(|n| n.to_string()).unwrap_or_default()
        }
        CaaValue::Url(url) => url.to_string(),
        CaaValue::Unknown(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn is_no_records(err: &ResolveError) -> bool {
    err.to_string().to_lowercase().contains("no record")
}

/// Classifies a hickory `ResolveError` into the taxonomy `DnsError`
/// needs. hickory distinguishes NXDOMAIN from other negative answers via
/// the response code on a `NoRecordsFound` error; everything else that
/// looks like a timeout is reported as such, the rest as a generic
/// failure.
fn classify_resolve_error(err: ResolveError) -> DnsError {
    let message = err.to_string();
    if message.to_lowercase().contains("nxdomain") {
        DnsError::NxDomain(message)
    } else if message.to_lowercase().contains("timed out")
        || message.to_lowercase().contains("timeout")
    {
        DnsError::Timeout
    } else {
        DnsError::Other(message)
    }
}
