use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;

/// The error taxonomy surfaced to clients, per §7.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProblemType {
    Connection,
    UnknownHost,
    Tls,
    Malformed,
    Unauthorized,
    ServerInternal,
}

impl ProblemType {
    fn as_str(&self) -> &'static str {
        match self {
            ProblemType::Connection => "connection",
            ProblemType::UnknownHost => "unknownHost",
            ProblemType::Tls => "tls",
            ProblemType::Malformed => "malformed",
            ProblemType::Unauthorized => "unauthorized",
            ProblemType::ServerInternal => "serverInternal",
        }
    }
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured problem report, attached to a `Challenge` on failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: ProblemType,
    pub detail: String,
}

impl ProblemDetails {
    pub fn new(problem_type: ProblemType, detail: impl Into<String>) -> Self {
        ProblemDetails {
            problem_type,
            detail: detail.into(),
        }
    }

    pub fn connection(detail: impl Into<String>) -> Self {
        Self::new(ProblemType::Connection, detail)
    }

    pub fn unknown_host(detail: impl Into<String>) -> Self {
        Self::new(ProblemType::UnknownHost, detail)
    }

    pub fn tls(detail: impl Into<String>) -> Self {
        Self::new(ProblemType::Tls, detail)
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::new(ProblemType::Malformed, detail)
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(ProblemType::Unauthorized, detail)
    }

    pub fn server_internal(detail: impl Into<String>) -> Self {
        Self::new(ProblemType::ServerInternal, detail)
    }
}

impl fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.problem_type, self.detail)
    }
}

impl std::error::Error for ProblemDetails {}

/// Classifies a raw I/O / TLS error into the shared taxonomy. Used by
/// both the HTTP fetcher (4.C) and the TLS-SNI prober (4.D), per §7's
/// "classifier is shared between HTTP and TLS-SNI paths".
///
/// Matches on the concrete error type rather than a stringified type
/// name (see Open Question 3 in SPEC_FULL.md).
pub fn classify_io_error(err: &io::Error) -> ProblemDetails {
    if let Some(rustls_err) = err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<rustls::Error>())
    {
        return classify_tls_error(rustls_err);
    }
    match err.kind() {
        io::ErrorKind::TimedOut => ProblemDetails::connection(format!("timed out: {err}")),
        _ => ProblemDetails::connection(err.to_string()),
    }
}

pub fn classify_tls_error(err: &rustls::Error) -> ProblemDetails {
    match err {
        rustls::Error::AlertReceived(alert) => {
            ProblemDetails::tls(format!("received fatal alert: {alert:?}"))
        }
        rustls::Error::InvalidCertificate(reason) => {
            ProblemDetails::tls(format!("invalid certificate: {reason:?}"))
        }
        other => ProblemDetails::tls(other.to_string()),
    }
}

/// Unwraps one layer of a reqwest error (its "URL-layer wrapper", §7)
/// and classifies the underlying cause.
pub fn classify_reqwest_error(err: &reqwest::Error) -> ProblemDetails {
    if err.is_timeout() {
        return ProblemDetails::connection(format!("request timed out: {err}"));
    }
    if let Some(source) = err.source() {
        if let Some(io_err) = source.downcast_ref::<io::Error>() {
            return classify_io_error(io_err);
        }
        if let Some(tls_err) = source.downcast_ref::<rustls::Error>() {
            return classify_tls_error(tls_err);
        }
    }
    ProblemDetails::connection(err.to_string())
}

use std::error::Error as StdError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_type_display_matches_taxonomy() {
        assert_eq!(ProblemType::UnknownHost.to_string(), "unknownHost");
        assert_eq!(ProblemType::ServerInternal.to_string(), "serverInternal");
    }

    #[test]
    fn every_problem_has_nonempty_type_and_detail() {
        let p = ProblemDetails::unauthorized("bad body");
        assert!(!p.problem_type.to_string().is_empty());
        assert!(!p.detail.is_empty());
    }

    #[test]
    fn classify_timeout_is_connection() {
        let err = io::Error::new(io::ErrorKind::TimedOut, "deadline exceeded");
        let problem = classify_io_error(&err);
        assert_eq!(problem.problem_type, ProblemType::Connection);
    }

    #[test]
    fn classify_alert_is_tls() {
        let err = rustls::Error::AlertReceived(rustls::AlertDescription::HandshakeFailure);
        let problem = classify_tls_error(&err);
        assert_eq!(problem.problem_type, ProblemType::Tls);
    }
}
