use serde::{Deserialize, Serialize};

use crate::challenge::Challenge;
use crate::identifier::AcmeIdentifier;

/// An authorization binds an identifier to a set of challenges the
/// applicant may complete to prove control. Only the challenge selected
/// by `challengeIndex` is ever mutated by the VA (§3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Authorization {
    pub id: String,
    #[serde(rename = "registrationID")]
    pub registration_id: u64,
    pub identifier: AcmeIdentifier,
    pub challenges: Vec<Challenge>,
}

impl Authorization {
    pub fn challenge(&self, index: usize) -> Option<&Challenge> {
        self.challenges.get(index)
    }

    pub fn challenge_mut(&mut self, index: usize) -> Option<&mut Challenge> {
        self.challenges.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::ChallengeType;
    use crate::keyauth::AccountKey;

    fn sample() -> Authorization {
        let key = AccountKey::Ec {
            crv: "P-256".to_string(),
            x: "x".to_string(),
            y: "y".to_string(),
        };
        Authorization {
            id: "authz-1".to_string(),
            registration_id: 7,
            identifier: AcmeIdentifier::dns("example.com"),
            challenges: vec![Challenge::new(ChallengeType::Http01, "tok", key)],
        }
    }

    #[test]
    fn only_selected_challenge_is_mutated() {
        let mut authz = sample();
        let before = authz.challenges[0].status;
        if let Some(challenge) = authz.challenge_mut(0) {
            challenge.status = crate::challenge::ChallengeStatus::Valid;
        }
        assert_ne!(before, authz.challenges[0].status);
        assert_eq!(authz.challenges.len(), 1);
    }

    #[test]
    fn out_of_range_index_yields_none() {
        let authz = sample();
        assert!(authz.challenge(5).is_none());
    }
}
