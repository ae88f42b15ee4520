use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Audit artifact describing one network hop the VA performed.
///
/// The first record for a validation attempt is always created before
/// any I/O, so DNS failures remain visible in the audit trail (§3
/// invariant). Each HTTP redirect appends a further record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub hostname: String,
    pub port: u16,
    #[serde(rename = "addressesResolved")]
    pub addresses_resolved: Vec<Ipv4Addr>,
    #[serde(rename = "addressUsed", skip_serializing_if = "Option::is_none")]
    pub address_used: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ValidationRecord {
    /// Creates a record before DNS resolution has happened; `address_used`
    /// and `addresses_resolved` are filled in once the lookup completes.
    pub fn pending(hostname: impl Into<String>, port: u16) -> Self {
        ValidationRecord {
            hostname: hostname.into(),
            port,
            addresses_resolved: Vec::new(),
            address_used: None,
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn fill_resolved(&mut self, addresses: Vec<Ipv4Addr>, used: Ipv4Addr) {
        self.addresses_resolved = addresses;
        self.address_used = Some(used);
    }

    /// A record is sane when, if an address was used at all, it is a
    /// member of the addresses that were resolved (§3 invariant:
    /// `addressUsed` is always present in `addressesResolved`).
    pub fn is_sane(&self) -> bool {
        match self.address_used {
            None => true,
            Some(used) => self.addresses_resolved.contains(&used),
        }
    }
}

/// §3: "A challenge whose returned records are not sane is marked
/// invalid regardless of protocol outcome." Checks the whole chain.
pub fn records_are_sane(records: &[ValidationRecord]) -> bool {
    records.iter().all(ValidationRecord::is_sane)
}
