//! DNS TXT prober (4.E): looks up a TXT record at a well-known
//! subdomain and compares it against the expected digest.

use crate::keyauth::{constant_time_eq, sha256_hex};
use crate::problem::ProblemDetails;
use crate::resolver::{classify_dns_error, DnsResolver};

/// Computes the expected TXT value for dns-01:
/// `hex(sha256(keyAuthorization))`.
pub fn expected_digest(key_authorization: &str) -> String {
    sha256_hex(key_authorization)
}

/// Queries TXT records at `<dns_prefix>.<name>` and succeeds if any
/// value equals `expected` under constant-time comparison.
pub async fn probe(
    resolver: &dyn DnsResolver,
    name: &str,
    dns_prefix: &str,
    expected: &str,
) -> Result<(), ProblemDetails> {
    let query_name = format!("{dns_prefix}.{name}");
    let values = resolver
        .lookup_txt(&query_name)
        .await
        .map_err(|err| classify_dns_error(&query_name, &err))?;

    if values
        .iter()
        .any(|value| constant_time_eq(value.as_bytes(), expected.as_bytes()))
    {
        Ok(())
    } else {
        Err(ProblemDetails::unauthorized(format!(
            "no TXT record at {query_name} matched the expected key authorization digest"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolvers::test::StaticResolver;

    #[test]
    fn expected_digest_is_hex_sha256() {
        let digest = expected_digest("tok.thumb");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn probe_succeeds_on_matching_txt() {
        let expected = expected_digest("tok.thumb");
        let resolver = StaticResolver::new()
            .with_txt("_acme-challenge.example.com", vec![expected.clone()]);
        assert!(probe(&resolver, "example.com", "_acme-challenge", &expected)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn probe_fails_when_no_txt_matches() {
        let expected = expected_digest("tok.thumb");
        let resolver = StaticResolver::new()
            .with_txt("_acme-challenge.example.com", vec!["wrong".to_string()]);
        let err = probe(&resolver, "example.com", "_acme-challenge", &expected)
            .await
            .unwrap_err();
        assert_eq!(err.problem_type, crate::problem::ProblemType::Unauthorized);
    }
}
