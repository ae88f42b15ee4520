//! CAA (RFC 6844) policy evaluation (4.G).
//!
//! The ancestor walk and tag/flag interpretation here are pure logic
//! over the `DnsResolver` / `PublicSuffix` traits — no knowledge of
//! `hickory` or `psl` leaks in, which keeps this module unit-testable
//! without a network.

use serde::{Deserialize, Serialize};

use crate::resolver::DnsResolver;
use crate::suffix::PublicSuffix;

/// A single CAA resource record, resolver-agnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaaRecord {
    pub tag: String,
    pub flag: u8,
    pub value: String,
}

/// The CAA records for one name, filtered by tag (§3).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CaaSet {
    pub issue: Vec<CaaRecord>,
    pub issuewild: Vec<CaaRecord>,
    pub iodef: Vec<CaaRecord>,
    pub unknown: Vec<CaaRecord>,
}

impl CaaSet {
    pub fn from_records(records: Vec<CaaRecord>) -> Self {
        let mut set = CaaSet::default();
        for record in records {
            match record.tag.as_str() {
                "issue" => set.issue.push(record),
                "issuewild" => set.issuewild.push(record),
                "iodef" => set.iodef.push(record),
                _ => set.unknown.push(record),
            }
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.issue.is_empty()
            && self.issuewild.is_empty()
            && self.iodef.is_empty()
            && self.unknown.is_empty()
    }

    /// §4.G: "if any unknown-tag record has flag != 0, issuance must be
    /// refused" — RFC 6844 conservatism, every non-zero flag is treated
    /// as critical.
    pub fn has_critical_unknown(&self) -> bool {
        self.unknown.iter().any(|r| r.flag != 0)
    }
}

/// Outcome of evaluating CAA policy for a specific issuer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CaaDecision {
    pub present: bool,
    pub valid: bool,
}

impl CaaDecision {
    const fn allow(present: bool) -> Self {
        CaaDecision {
            present,
            valid: true,
        }
    }

    const fn deny() -> Self {
        CaaDecision {
            present: true,
            valid: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CaaError {
    #[error("dns error while walking CAA ancestors: {0}")]
    Dns(#[from] crate::resolver::DnsError),
}

/// Walks the label hierarchy of `hostname` from the full name toward the
/// root, stopping at the first ancestor with a non-empty CAA response or
/// at the ICANN TLD boundary (whichever comes first), per §4.G.
///
/// Per Open Question 1 (SPEC_FULL.md §9): an error from the public
/// suffix oracle terminates the walk the same way reaching a TLD would
/// — fail-open on oracle error, fail-closed on an actual CAA record.
pub async fn find_caa_set(
    resolver: &dyn DnsResolver,
    suffix: &dyn PublicSuffix,
    hostname: &str,
) -> Result<Option<CaaSet>, CaaError> {
    for ancestor in ancestors(hostname) {
        match suffix.icann_tld(&ancestor) {
            Ok(true) => break,
            Err(_) => break,
            Ok(false) => {}
        }
        let records = resolver.lookup_caa(&ancestor).await?;
        if !records.is_empty() {
            return Ok(Some(CaaSet::from_records(records)));
        }
    }
    Ok(None)
}

/// Yields `hostname`, then each ancestor label-by-label, e.g. for
/// `"a.b.example.com"`: `a.b.example.com`, `b.example.com`,
/// `example.com`, `com`.
fn ancestors(hostname: &str) -> impl Iterator<Item = String> + '_ {
    let labels: Vec<&str> = hostname.split('.').collect();
    (0..labels.len()).map(move |i| labels[i..].join("."))
}

/// The issuance decision for a specific `issuer_domain`, per the table
/// in §4.G.
pub fn evaluate(caa_set: Option<&CaaSet>, is_wildcard: bool, issuer_domain: &str) -> CaaDecision {
    let set = match caa_set {
        None => return CaaDecision::allow(false),
        Some(set) => set,
    };

    if set.has_critical_unknown() {
        return CaaDecision::deny();
    }

    if set.issue.is_empty() && set.issuewild.is_empty() {
        // Only iodef (or nothing restrictive) present: no restriction.
        return CaaDecision::allow(true);
    }

    let inspected = if is_wildcard && !set.issuewild.is_empty() {
        &set.issuewild
    } else if is_wildcard {
        // Wildcard name, issuewild empty: RFC 6844 falls back to `issue`.
        &set.issue
    } else {
        &set.issue
    };

    // First match wins: an explicit allow for us always wins, even if a
    // critical record for another CA was iterated first; conversely a
    // critical record for another CA encountered before any match for us
    // blocks issuance (§4.G rationale, Open Question 4).
    for record in inspected {
        if record.value == issuer_domain {
            return CaaDecision {
                present: true,
                valid: true,
            };
        }
    }
    for record in inspected {
        if record.flag > 0 {
            return CaaDecision::deny();
        }
    }
    CaaDecision {
        present: true,
        valid: false,
    }
}
