//! Orchestrator (4.H): the public entry point. Runs the challenge
//! dispatch and the CAA lookup concurrently, joins both, stamps the
//! challenge's final state, and reports it to the Registration
//! Authority.

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::audit::{AuditLogger, VerificationRequestEvent};
use crate::authorization::Authorization;
use crate::caa::{self, CaaDecision};
use crate::clock::Clock;
use crate::config::VaConfig;
use crate::dispatcher;
use crate::metrics::Metrics;
use crate::problem::ProblemDetails;
use crate::ra::RegistrationAuthority;
use crate::resolver::DnsResolver;
use crate::safebrowsing::{NoopSafeBrowsing, SafeBrowsing};
use crate::suffix::PublicSuffix;

/// The Validation Authority. Holds only the injected collaborators and
/// static configuration; all request-scoped state lives on the call
/// stack of each `update_validations` task (§5 "shared-resource
/// policy").
pub struct Va {
    resolver: Arc<dyn DnsResolver>,
    public_suffix: Arc<dyn PublicSuffix>,
    registration_authority: Arc<dyn RegistrationAuthority>,
    audit_logger: Arc<dyn AuditLogger>,
    metrics: Arc<dyn Metrics>,
    clock: Arc<dyn Clock>,
    // Accepted at construction per §6 but not consulted by this core
    // (reserved for a future pre-validation safe-browsing gate).
    #[allow(dead_code)]
    safe_browsing: Arc<dyn SafeBrowsing>,
    config: VaConfig,
}

impl Va {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        resolver: Arc<dyn DnsResolver>,
        public_suffix: Arc<dyn PublicSuffix>,
        registration_authority: Arc<dyn RegistrationAuthority>,
        audit_logger: Arc<dyn AuditLogger>,
        metrics: Arc<dyn Metrics>,
        clock: Arc<dyn Clock>,
        config: VaConfig,
    ) -> Self {
        Va {
            resolver,
            public_suffix,
            registration_authority,
            audit_logger,
            metrics,
            clock,
            safe_browsing: Arc::new(NoopSafeBrowsing),
            config,
        }
    }

    /// Overrides the default no-op safe-browsing collaborator with a real
    /// implementation. Still never consulted by this core (§6); kept for
    /// callers that want the field populated ahead of a future revision.
    pub fn with_safe_browsing(mut self, safe_browsing: Arc<dyn SafeBrowsing>) -> Self {
        self.safe_browsing = safe_browsing;
        self
    }

    /// Fire-and-forget entry point (§4.H): spawns an independent task
    /// per call and returns immediately. The result is delivered later
    /// by calling back into the Registration Authority.
    pub fn update_validations(self: &Arc<Self>, authz: Authorization, challenge_index: usize) {
        let va = Arc::clone(self);
        tokio::spawn(async move {
            va.run_validation(authz, challenge_index).await;
        });
    }

    /// Synchronous core of `update_validations`, exposed separately so
    /// tests can await completion directly instead of racing the
    /// spawned task.
    pub async fn run_validation(&self, mut authz: Authorization, challenge_index: usize) {
        let request_time = self.clock.now();

        let Some(challenge) = authz.challenge(challenge_index).cloned() else {
            log::warn!("challenge index {challenge_index} out of range for authz {}", authz.id);
            return;
        };
        let identifier = authz.identifier.clone();
        let registration_id = authz.registration_id;

        let (challenge_tx, challenge_rx) = oneshot::channel();
        let (caa_tx, caa_rx) = oneshot::channel();

        let challenge_resolver = Arc::clone(&self.resolver);
        let challenge_identifier = identifier.clone();
        let challenge_config = self.config.clone();
        let challenge_value = challenge.clone();
        tokio::spawn(async move {
            let outcome = dispatcher::dispatch(
                challenge_resolver.as_ref(),
                &challenge_identifier,
                &challenge_value,
                &challenge_config,
            )
            .await;
            let _ = challenge_tx.send(outcome);
        });

        let caa_resolver = Arc::clone(&self.resolver);
        let caa_suffix = Arc::clone(&self.public_suffix);
        let caa_hostname = identifier.base_domain().to_string();
        tokio::spawn(async move {
            let result = caa::find_caa_set(caa_resolver.as_ref(), caa_suffix.as_ref(), &caa_hostname).await;
            let _ = caa_tx.send((registration_id, result));
        });

        // Await the challenge result first; the CAA background task is
        // always drained afterward regardless, per §5's "always drains
        // both before returning".
        let challenge_outcome = challenge_rx.await.unwrap_or_else(|_| dispatcher::DispatchOutcome {
            problem: Some(ProblemDetails::server_internal("challenge task was dropped")),
            records: Vec::new(),
        });
        let (_audit_registration_id, caa_result) = caa_rx.await.unwrap_or_else(|_| {
            (
                registration_id,
                Err(caa::CaaError::Dns(crate::resolver::DnsError::Other(
                    "caa task was dropped".to_string(),
                ))),
            )
        });

        let records_sane = crate::record::records_are_sane(&challenge_outcome.records);

        // CAA failure overrides success but never an existing challenge
        // failure (§4.H step 3).
        let final_problem = if let Some(problem) = challenge_outcome.problem {
            Some(problem)
        } else {
            match caa_result {
                Ok(caa_set) => {
                    let decision = caa::evaluate(
                        caa_set.as_ref(),
                        identifier.is_wildcard(),
                        self.config.issuer_domain(),
                    );
                    caa_problem(decision)
                }
                Err(err) => Some(ProblemDetails::connection(err.to_string())),
            }
        };

        let (final_problem, records) = if !records_sane {
            (
                Some(ProblemDetails::server_internal(
                    "validation records failed the sanity check",
                )),
                challenge_outcome.records,
            )
        } else {
            (final_problem, challenge_outcome.records)
        };

        let status = if final_problem.is_none() {
            crate::challenge::ChallengeStatus::Valid
        } else {
            crate::challenge::ChallengeStatus::Invalid
        };

        let response_time = self.clock.now();

        if let Some(updated) = authz.challenge_mut(challenge_index) {
            updated.status = status;
            updated.error = final_problem.clone();
            updated.validation_record = records;
        }

        let timing_key = format!(
            "va.validation.{}.{}",
            challenge.challenge_type.as_str(),
            status_label(status)
        );
        let duration = (response_time - request_time)
            .to_std()
            .unwrap_or_default();
        self.metrics.timing_duration(&timing_key, duration, 1.0);

        let event = VerificationRequestEvent {
            id: authz.id.clone(),
            requester: registration_id,
            challenge: authz
                .challenge(challenge_index)
                .cloned()
                .unwrap_or(challenge),
            request_time,
            response_time,
            error: final_problem,
        };
        self.audit_logger.audit_object("verification-request", &event);

        self.registration_authority.on_validation_update(authz).await;
    }
}

fn status_label(status: crate::challenge::ChallengeStatus) -> &'static str {
    match status {
        crate::challenge::ChallengeStatus::Pending => "pending",
        crate::challenge::ChallengeStatus::Valid => "valid",
        crate::challenge::ChallengeStatus::Invalid => "invalid",
    }
}

fn caa_problem(decision: CaaDecision) -> Option<ProblemDetails> {
    if decision.valid {
        None
    } else {
        Some(ProblemDetails::unauthorized(
            "CAA policy does not permit this issuer",
        ))
    }
}
