//! Audit logging (§6): `VerificationRequestEvent` plus the
//! `auditObject(label, value)` sink it's reported through.
//!
//! This is deliberately distinct from ordinary leveled logging
//! (`log::debug!`/`info!`/`warn!`, used elsewhere in this crate): an
//! audit record must never be silently dropped by a verbosity filter,
//! so it goes through its own trait.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::challenge::Challenge;
use crate::problem::ProblemDetails;

/// The audit record emitted once per `updateValidations` call (§4.H
/// step 7), independent of whether the validation succeeded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationRequestEvent {
    pub id: String,
    pub requester: u64,
    pub challenge: Challenge,
    #[serde(rename = "requestTime")]
    pub request_time: DateTime<Utc>,
    #[serde(rename = "responseTime")]
    pub response_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ProblemDetails>,
}

pub trait AuditLogger: Send + Sync {
    fn audit_object(&self, label: &str, value: &VerificationRequestEvent);
}

/// Serializes the event and emits it through `log`, at a fixed target
/// so operators can route it separately from ordinary log lines even
/// though it shares the same backend.
#[derive(Debug, Default)]
pub struct JsonLineAuditLogger;

impl AuditLogger for JsonLineAuditLogger {
    fn audit_object(&self, label: &str, value: &VerificationRequestEvent) {
        match serde_json::to_string(value) {
            Ok(json) => log::info!(target: "acme_va::audit", "{label}: {json}"),
            Err(err) => log::warn!(target: "acme_va::audit", "failed to serialize {label}: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::ChallengeType;
    use crate::keyauth::AccountKey;

    fn sample_event() -> VerificationRequestEvent {
        let key = AccountKey::Ec {
            crv: "P-256".to_string(),
            x: "x".to_string(),
            y: "y".to_string(),
        };
        let now = Utc::now();
        VerificationRequestEvent {
            id: "authz-1".to_string(),
            requester: 7,
            challenge: Challenge::new(ChallengeType::Http01, "tok", key),
            request_time: now,
            response_time: now,
            error: None,
        }
    }

    #[test]
    fn event_with_no_error_omits_error_field() {
        let event = sample_event();
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn json_audit_logger_does_not_panic_on_serializable_event() {
        let logger = JsonLineAuditLogger;
        logger.audit_object("validation", &sample_event());
    }
}
