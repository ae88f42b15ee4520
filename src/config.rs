//! VA configuration (§6 "added" collaborator), built the way the
//! teacher's own `AcmeConfig` is: a `new()` constructor with sane
//! defaults followed by chained setters.

use std::time::Duration;

pub const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// Port overrides for outbound probes, so test environments can redirect
/// validation traffic without touching the well-known 80/443 defaults
/// (§3 `portConfig`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PortConfig {
    pub http_port: u16,
    pub https_port: u16,
    pub tls_port: u16,
}

impl Default for PortConfig {
    fn default() -> Self {
        PortConfig {
            http_port: 80,
            https_port: 443,
            tls_port: 443,
        }
    }
}

/// Everything the VA needs to know that isn't an injected collaborator:
/// the CA's own issuer domain, naming conventions for the DNS-01 and
/// tls-sni-01 challenges, and the bounds the orchestrator enforces.
#[derive(Clone, Debug)]
pub struct VaConfig {
    pub(crate) port_config: PortConfig,
    pub(crate) issuer_domain: String,
    pub(crate) user_agent: Option<String>,
    pub(crate) tls_sni_suffix: String,
    pub(crate) dns_prefix: String,
    pub(crate) validation_timeout: Duration,
    pub(crate) max_redirects: u32,
}

impl VaConfig {
    /// `issuer_domain` is the CAA `issue`/`issuewild` value this CA
    /// expects to find naming itself.
    pub fn new(issuer_domain: impl Into<String>) -> Self {
        VaConfig {
            port_config: PortConfig::default(),
            issuer_domain: issuer_domain.into(),
            user_agent: None,
            tls_sni_suffix: "acme.invalid".to_string(),
            dns_prefix: "_acme-challenge".to_string(),
            validation_timeout: DEFAULT_VALIDATION_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }

    pub fn port_config(mut self, port_config: PortConfig) -> Self {
        self.port_config = port_config;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn tls_sni_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.tls_sni_suffix = suffix.into();
        self
    }

    pub fn dns_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.dns_prefix = prefix.into();
        self
    }

    pub fn validation_timeout(mut self, timeout: Duration) -> Self {
        self.validation_timeout = timeout;
        self
    }

    pub fn max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn issuer_domain(&self) -> &str {
        &self.issuer_domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_ports() {
        let config = VaConfig::new("ca.example");
        assert_eq!(config.port_config.http_port, 80);
        assert_eq!(config.port_config.https_port, 443);
        assert_eq!(config.port_config.tls_port, 443);
        assert_eq!(config.max_redirects, DEFAULT_MAX_REDIRECTS);
    }

    #[test]
    fn builder_overrides_apply() {
        let config = VaConfig::new("ca.example")
            .dns_prefix("_acme-challenge-test")
            .max_redirects(3);
        assert_eq!(config.dns_prefix, "_acme-challenge-test");
        assert_eq!(config.max_redirects, 3);
    }
}
