//! Account key / key authorization handling.
//!
//! The core depends on `AccountKey` only to the degree needed to compute
//! and check a key authorization (§3); it does not implement JWS
//! signing, account creation, or key generation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ring::digest::{digest, SHA256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A minimal JSON Web Key, sufficient to compute an RFC 7638 thumbprint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kty", rename_all = "UPPERCASE")]
pub enum AccountKey {
    Ec { crv: String, x: String, y: String },
    Rsa { n: String, e: String },
}

#[derive(Serialize)]
struct EcThumbprintInput<'a> {
    crv: &'a str,
    kty: &'a str,
    x: &'a str,
    y: &'a str,
}

#[derive(Serialize)]
struct RsaThumbprintInput<'a> {
    e: &'a str,
    kty: &'a str,
    n: &'a str,
}

impl AccountKey {
    /// RFC 7638 thumbprint: base64url(sha256(canonical JSON)).
    ///
    /// Field order in the canonical form matters (lexicographic by JWK
    /// member name); `serde_json` preserves struct field order as
    /// written, so the literal field order in `EcThumbprintInput` /
    /// `RsaThumbprintInput` above is load-bearing.
    pub fn thumbprint(&self) -> String {
        let canonical = match self {
            AccountKey::Ec { crv, x, y } => serde_json::to_string(&EcThumbprintInput {
                crv,
                kty: "EC",
                x,
                y,
            }),
            AccountKey::Rsa { n, e } => {
                serde_json::to_string(&RsaThumbprintInput { e, kty: "RSA", n })
            }
        }
        .expect("JWK member strings are valid JSON string content");
        let hash = digest(&SHA256, canonical.as_bytes());
        URL_SAFE_NO_PAD.encode(hash.as_ref())
    }

    /// The canonical key authorization string for a given challenge token.
    pub fn key_authorization(&self, token: &str) -> String {
        format!("{token}.{}", self.thumbprint())
    }
}

/// A parsed `token.thumbprint` key authorization string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyAuthorization {
    token: String,
    thumbprint: String,
}

#[derive(Error, Debug)]
pub enum KeyAuthorizationError {
    #[error("key authorization is missing the \".\" separator")]
    MissingSeparator,
    #[error("key authorization token is empty")]
    EmptyToken,
    #[error("key authorization thumbprint is empty")]
    EmptyThumbprint,
}

impl KeyAuthorization {
    /// Parses a candidate string of the form `token.thumbprint`.
    pub fn parse(raw: &str) -> Result<Self, KeyAuthorizationError> {
        let (token, thumbprint) = raw
            .split_once('.')
            .ok_or(KeyAuthorizationError::MissingSeparator)?;
        if token.is_empty() {
            return Err(KeyAuthorizationError::EmptyToken);
        }
        if thumbprint.is_empty() {
            return Err(KeyAuthorizationError::EmptyThumbprint);
        }
        Ok(KeyAuthorization {
            token: token.to_string(),
            thumbprint: thumbprint.to_string(),
        })
    }

    /// `true` iff both the token and the thumbprint embedded in this
    /// value match what the CA expects for `(token, account_key)`.
    ///
    /// Uses a constant-time comparison so a probing adversary cannot
    /// learn anything from partial matches (§9 "Constant-time
    /// comparison").
    pub fn matches(&self, token: &str, account_key: &AccountKey) -> bool {
        let expected_thumbprint = account_key.thumbprint();
        constant_time_eq(self.token.as_bytes(), token.as_bytes())
            && constant_time_eq(self.thumbprint.as_bytes(), expected_thumbprint.as_bytes())
    }
}

impl std::fmt::Display for KeyAuthorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.token, self.thumbprint)
    }
}

/// Timing-safe byte comparison, shared by every secret comparison in
/// this crate (key authorization match, DNS-01 digest match, TLS-SNI
/// SAN match — §9).
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    ring::constant_time::verify_slices_are_equal(a, b).is_ok()
}

/// `hex(sha256(input))`, lowercase. Used by the DNS-01 and TLS-SNI-01
/// challenge computations (§4.E, §4.F).
pub fn sha256_hex(input: &str) -> String {
    let hash = digest(&SHA256, input.as_bytes());
    hex::encode(hash.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> AccountKey {
        AccountKey::Ec {
            crv: "P-256".to_string(),
            x: "f83OJ3D2xF1Bg8vub9tLe1gHMzV76e8Tus9uPHvRVEU".to_string(),
            y: "x_FEzRu9m36HLN_tue659LNpXW6pCyStikYjKIWI5a0".to_string(),
        }
    }

    #[test]
    fn thumbprint_matches_rfc7638_rsa_example() {
        // RFC 7638 §3.1 worked example (RSA key).
        let key = AccountKey::Rsa {
            n: "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw".to_string(),
            e: "AQAB".to_string(),
        };
        assert_eq!(key.thumbprint(), "NzbLsXh8uDCcd-6MNwXF4W_7noWXFZAfHkxZsRGC9Xs");
    }

    #[test]
    fn key_authorization_round_trips() {
        let key = test_key();
        let token = "evaGxfADs6pSRb2LAv9IZf17Dt3juxGJ-PCt92wr-oA";
        let ka = key.key_authorization(token);
        let parsed = KeyAuthorization::parse(&ka).unwrap();
        assert!(parsed.matches(token, &key));
    }

    #[test]
    fn mismatched_token_does_not_match() {
        let key = test_key();
        let ka = key.key_authorization("token-a");
        let parsed = KeyAuthorization::parse(&ka).unwrap();
        assert!(!parsed.matches("token-b", &key));
    }

    #[test]
    fn parse_rejects_missing_separator() {
        assert!(matches!(
            KeyAuthorization::parse("no-dot-here"),
            Err(KeyAuthorizationError::MissingSeparator)
        ));
    }

    #[test]
    fn sha256_hex_is_lowercase_and_64_chars() {
        let digest = sha256_hex("k");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn constant_time_eq_rejects_different_lengths() {
        assert!(!constant_time_eq(b"abc", b"ab"));
    }
}
