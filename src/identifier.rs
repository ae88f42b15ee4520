use serde::{Deserialize, Serialize};

/// A target for validation.
///
/// Only the `dns` type is accepted by this core; any other `type` value
/// is rejected by the challenge dispatcher (4.F) with a `malformed`
/// problem before any network I/O happens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcmeIdentifier {
    #[serde(rename = "type")]
    pub identifier_type: String,
    pub value: String,
}

impl AcmeIdentifier {
    pub fn dns(value: impl Into<String>) -> Self {
        AcmeIdentifier {
            identifier_type: "dns".to_string(),
            value: value.into(),
        }
    }

    pub fn is_dns(&self) -> bool {
        self.identifier_type == "dns"
    }

    /// `true` iff `value` starts with the wildcard label `*.`.
    pub fn is_wildcard(&self) -> bool {
        self.value.starts_with("*.")
    }

    /// The hostname with a leading `*.` stripped, if any.
    pub fn base_domain(&self) -> &str {
        self.value.strip_prefix("*.").unwrap_or(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dns_constructor_is_sane() {
        let id = AcmeIdentifier::dns("example.com");
        assert!(id.is_dns());
        assert!(!id.is_wildcard());
        assert_eq!(id.base_domain(), "example.com");
    }

    #[test]
    fn wildcard_detection() {
        let id = AcmeIdentifier::dns("*.example.com");
        assert!(id.is_wildcard());
        assert_eq!(id.base_domain(), "example.com");
    }

    #[test]
    fn non_dns_identifier_is_not_dns() {
        let id = AcmeIdentifier {
            identifier_type: "ip".to_string(),
            value: "10.0.0.1".to_string(),
        };
        assert!(!id.is_dns());
    }
}
