//! A [Validation Authority] core for an [ACME]-style certificate authority:
//! given an [`Authorization`] carrying a [`Challenge`] and an account key,
//! decides whether the applicant actually controls the identified DNS name.
//!
//! The VA performs one of three network-level proofs of control —
//! `http-01`, `tls-sni-01`, `dns-01` — and, concurrently, consults the
//! name's [CAA] records to confirm the operating CA is permitted to
//! issue. Both outcomes feed a single verdict, attached to the challenge
//! alongside a [`ValidationRecord`] audit trail of every network hop
//! attempted.
//!
//! This crate does not implement certificate signing, account/nonce
//! state, a retry queue, or persistence — it is the validation core only.
//! The Registration Authority, DNS resolver, public-suffix oracle and
//! safe-browsing check are injected collaborators, expressed as traits so
//! a caller can wire in its own implementations; default adapters are
//! provided for the DNS resolver ([`resolvers::HickoryResolver`]) and the
//! public-suffix oracle ([`suffix::PslPublicSuffix`]).
//!
//! ## Wiring up a [`Va`]
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use acme_va::{
//!     audit::JsonLineAuditLogger, clock::SystemClock, config::VaConfig,
//!     metrics::NoopMetrics, ra::RegistrationAuthority, resolvers::HickoryResolver,
//!     suffix::PslPublicSuffix, Authorization, Va,
//! };
//!
//! struct LoggingRa;
//! #[async_trait::async_trait]
//! impl RegistrationAuthority for LoggingRa {
//!     async fn on_validation_update(&self, authz: Authorization) {
//!         log::info!("validation update for {}", authz.id);
//!     }
//! }
//!
//! # async fn wiring() {
//! let va = Arc::new(Va::new(
//!     Arc::new(HickoryResolver::new()),
//!     Arc::new(PslPublicSuffix::new()),
//!     Arc::new(LoggingRa),
//!     Arc::new(JsonLineAuditLogger),
//!     Arc::new(NoopMetrics),
//!     Arc::new(SystemClock),
//!     VaConfig::new("ca.example"),
//! ));
//! # }
//! ```
//!
//! Calling [`Va::update_validations`] spawns an independent task per
//! authorization and returns immediately; the result is delivered later
//! through the injected [`ra::RegistrationAuthority`].
//!
//! [Validation Authority]: https://datatracker.ietf.org/doc/html/rfc8555
//! [ACME]: https://en.wikipedia.org/wiki/Automatic_Certificate_Management_Environment
//! [CAA]: https://www.rfc-editor.org/rfc/rfc6844

pub mod audit;
pub mod authorization;
pub mod caa;
pub mod challenge;
pub mod clock;
pub mod config;
mod dialer;
mod dispatcher;
mod dns_txt_prober;
mod http_fetcher;
pub mod identifier;
pub mod keyauth;
pub mod metrics;
mod orchestrator;
pub mod problem;
pub mod ra;
pub mod record;
pub mod resolver;
pub mod resolvers;
pub mod safebrowsing;
pub mod suffix;
mod tls_danger;
mod tls_sni_prober;

pub use authorization::Authorization;
pub use challenge::{Challenge, ChallengeStatus, ChallengeType};
pub use identifier::AcmeIdentifier;
pub use orchestrator::Va;
pub use problem::{ProblemDetails, ProblemType};
pub use record::ValidationRecord;
