use serde::{Deserialize, Serialize};

use crate::problem::ProblemDetails;
use crate::record::{records_are_sane, ValidationRecord};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChallengeType {
    Http01,
    TlsSni01,
    Dns01,
}

impl ChallengeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeType::Http01 => "http-01",
            ChallengeType::TlsSni01 => "tls-sni-01",
            ChallengeType::Dns01 => "dns-01",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChallengeStatus {
    Pending,
    Valid,
    Invalid,
}

/// A specific mechanism by which the applicant proves control of an
/// identifier (§3). Only `challenges[challengeIndex]` is ever mutated by
/// the VA; everything else on the owning `Authorization` is immutable to
/// it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Challenge {
    #[serde(rename = "type")]
    pub challenge_type: ChallengeType,
    pub token: String,
    #[serde(rename = "accountKey")]
    pub account_key: crate::keyauth::AccountKey,
    #[serde(rename = "keyAuthorization")]
    pub key_authorization: String,
    pub status: ChallengeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ProblemDetails>,
    #[serde(rename = "validationRecord", default)]
    pub validation_record: Vec<ValidationRecord>,
}

impl Challenge {
    pub fn new(
        challenge_type: ChallengeType,
        token: impl Into<String>,
        account_key: crate::keyauth::AccountKey,
    ) -> Self {
        let token = token.into();
        let key_authorization = account_key.key_authorization(&token);
        Challenge {
            challenge_type,
            token,
            account_key,
            key_authorization,
            status: ChallengeStatus::Pending,
            error: None,
            validation_record: Vec::new(),
        }
    }

    /// A challenge is "sane" (§3) when its token is non-empty and
    /// URL-safe, and any records it already carries are well-formed.
    /// Type recognition is implicit in `ChallengeType` being a closed
    /// enum — an unrecognized wire value fails to deserialize before
    /// this is ever called.
    pub fn is_sane(&self) -> bool {
        !self.token.is_empty()
            && self.token.chars().all(is_url_safe_char)
            && records_are_sane(&self.validation_record)
    }
}

fn is_url_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyauth::AccountKey;

    fn ec_key() -> AccountKey {
        AccountKey::Ec {
            crv: "P-256".to_string(),
            x: "x".to_string(),
            y: "y".to_string(),
        }
    }

    #[test]
    fn fresh_challenge_is_sane() {
        let challenge = Challenge::new(ChallengeType::Http01, "tok-en_123", ec_key());
        assert!(challenge.is_sane());
    }

    #[test]
    fn empty_token_is_not_sane() {
        let challenge = Challenge::new(ChallengeType::Http01, "", ec_key());
        assert!(!challenge.is_sane());
    }

    #[test]
    fn token_with_unsafe_characters_is_not_sane() {
        let challenge = Challenge::new(ChallengeType::Http01, "tok/en", ec_key());
        assert!(!challenge.is_sane());
    }

    #[test]
    fn key_authorization_is_token_dot_thumbprint() {
        let challenge = Challenge::new(ChallengeType::Dns01, "tok", ec_key());
        assert!(challenge.key_authorization.starts_with("tok."));
    }
}
