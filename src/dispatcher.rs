//! Challenge dispatcher (4.F): rejects malformed input up front, then
//! routes to the matching prober and folds its outcome back into the
//! challenge's validation records.

use crate::challenge::{Challenge, ChallengeType};
use crate::config::VaConfig;
use crate::dns_txt_prober;
use crate::http_fetcher::{self, http01_path};
use crate::identifier::AcmeIdentifier;
use crate::keyauth::KeyAuthorization;
use crate::problem::ProblemDetails;
use crate::record::ValidationRecord;
use crate::resolver::DnsResolver;
use crate::tls_sni_prober::{self, z_name};

pub struct DispatchOutcome {
    pub problem: Option<ProblemDetails>,
    pub records: Vec<ValidationRecord>,
}

/// Validates one challenge against one identifier. Never panics on
/// adversarial input: malformed identifiers or challenges are rejected
/// with a `malformed` problem before any I/O happens.
pub async fn dispatch(
    resolver: &dyn DnsResolver,
    identifier: &AcmeIdentifier,
    challenge: &Challenge,
    config: &VaConfig,
) -> DispatchOutcome {
    if !identifier.is_dns() {
        return malformed(format!(
            "identifier type {} is not supported",
            identifier.identifier_type
        ));
    }
    if !challenge.is_sane() {
        return malformed("challenge failed sanity check before validation");
    }

    match challenge.challenge_type {
        ChallengeType::Http01 => dispatch_http01(resolver, identifier, challenge, config).await,
        ChallengeType::TlsSni01 => dispatch_tls_sni01(resolver, identifier, challenge, config).await,
        ChallengeType::Dns01 => dispatch_dns01(resolver, identifier, challenge, config).await,
    }
}

fn malformed(detail: impl Into<String>) -> DispatchOutcome {
    DispatchOutcome {
        problem: Some(ProblemDetails::malformed(detail.into())),
        records: Vec::new(),
    }
}

async fn dispatch_http01(
    resolver: &dyn DnsResolver,
    identifier: &AcmeIdentifier,
    challenge: &Challenge,
    config: &VaConfig,
) -> DispatchOutcome {
    let path = http01_path(&challenge.token);
    let outcome = http_fetcher::fetch(
        resolver,
        &identifier.value,
        Some(config.port_config.http_port),
        false,
        &path,
        config.user_agent.as_deref(),
        config.max_redirects,
        config.validation_timeout,
    )
    .await;

    let fetched = match outcome {
        Ok(outcome) => outcome,
        Err(failure) => {
            return DispatchOutcome {
                problem: Some(failure.problem),
                records: failure.records,
            }
        }
    };

    // §8 testable property 5: trim exactly the cutset {'\n', '\t', ' '},
    // nothing else — `str::trim()` would also eat other Unicode
    // whitespace the spec doesn't name.
    let trimmed = fetched.body.trim_matches(['\n', '\t', ' ']);
    let problem = match KeyAuthorization::parse(trimmed) {
        Ok(parsed) if parsed.matches(&challenge.token, &challenge.account_key) => None,
        Ok(_) => Some(ProblemDetails::unauthorized(format!(
            "expected key authorization {}, received {trimmed}",
            challenge.key_authorization
        ))),
        Err(err) => Some(ProblemDetails::unauthorized(format!(
            "body from {} did not parse as a key authorization: {err}",
            fetched.final_url
        ))),
    };

    DispatchOutcome {
        problem,
        records: fetched.records,
    }
}

async fn dispatch_tls_sni01(
    resolver: &dyn DnsResolver,
    identifier: &AcmeIdentifier,
    challenge: &Challenge,
    config: &VaConfig,
) -> DispatchOutcome {
    let name = z_name(&challenge.key_authorization, &config.tls_sni_suffix);
    match tls_sni_prober::probe(
        resolver,
        &identifier.value,
        config.port_config.tls_port,
        &name,
        config.validation_timeout,
    )
    .await
    {
        Ok(outcome) => DispatchOutcome {
            problem: None,
            records: vec![outcome.record],
        },
        Err(failure) => DispatchOutcome {
            problem: Some(failure.problem),
            records: vec![failure.record],
        },
    }
}

async fn dispatch_dns01(
    resolver: &dyn DnsResolver,
    identifier: &AcmeIdentifier,
    challenge: &Challenge,
    config: &VaConfig,
) -> DispatchOutcome {
    let expected = dns_txt_prober::expected_digest(&challenge.key_authorization);
    let problem = dns_txt_prober::probe(resolver, &identifier.value, &config.dns_prefix, &expected)
        .await
        .err();
    // Unlike HTTP-01/TLS-SNI-01 there is no pinned TCP dial here, so no
    // hop to audit on success (§8 scenario 4: "empty records"). A
    // failure still needs *something* in the trail, so record the
    // lookup name with no address (DNS-01 never pins an address).
    let records = if problem.is_some() {
        vec![ValidationRecord::pending(
            format!("{}.{}", config.dns_prefix, identifier.value),
            0,
        )]
    } else {
        Vec::new()
    };
    DispatchOutcome { problem, records }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyauth::AccountKey;
    use crate::resolvers::test::StaticResolver;

    fn key() -> AccountKey {
        AccountKey::Ec {
            crv: "P-256".to_string(),
            x: "f83OJ3D2xF1Bg8vub9tLe1gHMzV76e8Tus9uPHvRVEU".to_string(),
            y: "x_FEzRu9m36HLN_tue659LNpXW6pCyStikYjKIWI5a0".to_string(),
        }
    }

    #[tokio::test]
    async fn non_dns_identifier_is_rejected_before_any_io() {
        let identifier = AcmeIdentifier {
            identifier_type: "ip".to_string(),
            value: "10.0.0.1".to_string(),
        };
        let challenge = Challenge::new(ChallengeType::Dns01, "tok", key());
        let config = VaConfig::new("ca.example");
        let resolver = StaticResolver::new();
        let outcome = dispatch(&resolver, &identifier, &challenge, &config).await;
        assert_eq!(
            outcome.problem.unwrap().problem_type,
            crate::problem::ProblemType::Malformed
        );
        assert!(outcome.records.is_empty());
    }

    #[tokio::test]
    async fn dns01_success_round_trip() {
        let identifier = AcmeIdentifier::dns("example.com");
        let challenge = Challenge::new(ChallengeType::Dns01, "tok", key());
        let config = VaConfig::new("ca.example");
        let digest = dns_txt_prober::expected_digest(&challenge.key_authorization);
        let resolver = StaticResolver::new()
            .with_txt("_acme-challenge.example.com", vec![digest]);
        let outcome = dispatch(&resolver, &identifier, &challenge, &config).await;
        assert!(outcome.problem.is_none());
        assert!(outcome.records.is_empty());
    }

    #[tokio::test]
    async fn dns01_failure_reports_unauthorized() {
        let identifier = AcmeIdentifier::dns("example.com");
        let challenge = Challenge::new(ChallengeType::Dns01, "tok", key());
        let config = VaConfig::new("ca.example");
        let resolver = StaticResolver::new();
        let outcome = dispatch(&resolver, &identifier, &challenge, &config).await;
        assert_eq!(
            outcome.problem.unwrap().problem_type,
            crate::problem::ProblemType::Unauthorized
        );
        assert_eq!(outcome.records.len(), 1);
    }
}
