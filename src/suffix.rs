//! Public-suffix boundary oracle (4.G collaborator).
//!
//! The CAA ancestor walk must not query CAA on an ICANN TLD, which could
//! implicate an unrelated registry. `spec.md` names this collaborator as
//! out of scope (injected); this module adds the default adapter the
//! crate ships so the evaluator is usable out of the box, grounded on
//! the `psl` crate the way `rama-net`'s `Domain::suffix()` uses it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublicSuffixError {
    #[error("{0} is not a syntactically valid domain")]
    InvalidDomain(String),
}

/// Reports whether a candidate ancestor name is itself an ICANN TLD.
pub trait PublicSuffix: Send + Sync {
    fn icann_tld(&self, name: &str) -> Result<bool, PublicSuffixError>;
}

/// Default `PublicSuffix` backed by the Mozilla Public Suffix List via
/// the `psl` crate.
#[derive(Debug, Default)]
pub struct PslPublicSuffix;

impl PslPublicSuffix {
    pub fn new() -> Self {
        PslPublicSuffix
    }
}

impl PublicSuffix for PslPublicSuffix {
    fn icann_tld(&self, name: &str) -> Result<bool, PublicSuffixError> {
        let suffix = psl::suffix_str(name)
            .ok_or_else(|| PublicSuffixError::InvalidDomain(name.to_string()))?;
        Ok(suffix.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tld_itself_is_reported_as_tld() {
        let suffix = PslPublicSuffix::new();
        assert_eq!(suffix.icann_tld("com").unwrap(), true);
    }

    #[test]
    fn non_tld_is_not_reported_as_tld() {
        let suffix = PslPublicSuffix::new();
        assert_eq!(suffix.icann_tld("example.com").unwrap(), false);
    }
}
