//! HTTP fetcher (4.C): retrieves a well-known path over HTTP or HTTPS
//! using pinned dials, enforcing the redirect policy and header
//! fixups `spec.md` §4.C describes.
//!
//! One `reqwest::Client` is built per hop because a `resolve()`
//! override is baked in at client-construction time; `redirect::Policy::none()`
//! keeps the redirect loop under our control so a `ValidationRecord` can
//! be appended before every hop is taken, including a hop that fails.

use std::net::Ipv4Addr;
use std::time::Duration;

use reqwest::redirect::Policy;

use crate::dialer::pin_resolve;
use crate::problem::{classify_reqwest_error, ProblemDetails};
use crate::record::ValidationRecord;
use crate::resolver::{resolve_preferred, DnsResolver};
use crate::tls_danger::dangerous_client_config;

const WELL_KNOWN_HTTP01_PREFIX: &str = ".well-known/acme-challenge";

pub struct FetchOutcome {
    pub body: String,
    pub final_url: String,
    pub address_used: Ipv4Addr,
    pub records: Vec<ValidationRecord>,
}

pub struct FetchFailure {
    pub problem: ProblemDetails,
    pub records: Vec<ValidationRecord>,
}

pub fn http01_path(token: &str) -> String {
    format!("{WELL_KNOWN_HTTP01_PREFIX}/{token}")
}

struct Target {
    host: String,
    port: u16,
    use_tls: bool,
    path: String,
}

/// Fetches `path` from `hostname`, following redirects (up to
/// `max_redirects`) within a single `timeout` budget that spans the
/// entire operation, including every hop.
///
/// `records` is accumulated in a vec owned by this function, not by the
/// timed-out future, so a timeout elapsing mid-hop still returns
/// whatever hops were appended before the deadline (§3: "the list
/// returned on a failure always contains at least one entry if DNS
/// resolution was attempted"). `fetch_inner` only ever borrows it.
pub async fn fetch(
    resolver: &dyn DnsResolver,
    hostname: &str,
    port: Option<u16>,
    use_tls: bool,
    path: &str,
    user_agent: Option<&str>,
    max_redirects: u32,
    timeout: Duration,
) -> Result<FetchOutcome, FetchFailure> {
    let mut records = Vec::new();
    let result = tokio::time::timeout(
        timeout,
        fetch_inner(
            resolver,
            hostname,
            port,
            use_tls,
            path,
            user_agent,
            max_redirects,
            &mut records,
        ),
    )
    .await;

    match result {
        Ok(Ok(outcome)) => Ok(outcome),
        Ok(Err(problem)) => Err(FetchFailure { problem, records }),
        Err(_) => Err(FetchFailure {
            problem: ProblemDetails::connection(format!(
                "validation of {hostname} timed out"
            )),
            records,
        }),
    }
}

async fn fetch_inner(
    resolver: &dyn DnsResolver,
    hostname: &str,
    port: Option<u16>,
    use_tls: bool,
    path: &str,
    user_agent: Option<&str>,
    max_redirects: u32,
    records: &mut Vec<ValidationRecord>,
) -> Result<FetchOutcome, ProblemDetails> {
    let mut target = Target {
        host: hostname.to_string(),
        port: port.unwrap_or(if use_tls { 443 } else { 80 }),
        use_tls,
        path: path.to_string(),
    };

    for hop in 0..=max_redirects {
        let record = ValidationRecord::pending(target.host.clone(), target.port);
        records.push(record);

        let (addr, resolved) = resolve_preferred(resolver, &target.host).await?;
        let last = records.last_mut().expect("just pushed");
        last.fill_resolved(resolved, addr);

        let url = build_url(target.use_tls, &target.host, target.port, &target.path);
        records.last_mut().expect("just pushed").url = Some(url.clone());

        let client = build_client(&target.host, addr, target.port, target.use_tls)?;

        let mut request = client.get(&url).header("Accept", "*/*");
        if let Some(ua) = user_agent {
            request = request.header("User-Agent", ua);
        }

        let response = request.send().await.map_err(|err| classify_fetch_error(&err))?;

        if response.status().is_redirection() {
            if hop == max_redirects {
                return Err(ProblemDetails::connection(format!(
                    "too many redirects fetching {url}"
                )));
            }
            let location = match response.headers().get(reqwest::header::LOCATION) {
                Some(value) => value.to_str().unwrap_or_default().to_string(),
                None => {
                    return Err(ProblemDetails::unauthorized(format!(
                        "redirect from {url} carried no Location header"
                    )))
                }
            };
            target = parse_redirect_target(&target, &location)?;
            continue;
        }

        if response.status().as_u16() != 200 {
            let status = response.status().as_u16();
            return Err(ProblemDetails::unauthorized(format!(
                "fetching {url} from {addr} returned status {status}"
            )));
        }

        let body = response.text().await.map_err(|err| {
            ProblemDetails::unauthorized(format!("reading body from {url} failed: {err}"))
        })?;

        return Ok(FetchOutcome {
            body,
            final_url: url,
            address_used: addr,
            records: std::mem::take(records),
        });
    }

    unreachable!("loop always returns before exhausting max_redirects + 1 iterations")
}

/// Builds `scheme://host[:port]/path`, omitting the port when it matches
/// the scheme default (§4.C).
fn build_url(use_tls: bool, host: &str, port: u16, path: &str) -> String {
    let scheme = if use_tls { "https" } else { "http" };
    let default_port = if use_tls { 443 } else { 80 };
    let path = path.trim_start_matches('/');
    if port == default_port {
        format!("{scheme}://{host}/{path}")
    } else {
        format!("{scheme}://{host}:{port}/{path}")
    }
}

fn build_client(
    host: &str,
    addr: Ipv4Addr,
    port: u16,
    use_tls: bool,
) -> Result<reqwest::Client, ProblemDetails> {
    let (resolve_host, resolve_addr) = pin_resolve(host, addr, port);
    let mut builder = reqwest::ClientBuilder::new()
        .redirect(Policy::none())
        .resolve(&resolve_host, resolve_addr);
    if use_tls {
        builder = builder
            .use_preconfigured_tls((*dangerous_client_config()).clone());
    }
    builder
        .build()
        .map_err(|e| ProblemDetails::server_internal(format!("building http client: {e}")))
}

fn classify_fetch_error(err: &reqwest::Error) -> ProblemDetails {
    classify_reqwest_error(err)
}

/// Parses a `Location` header value into the next fetch target. Accepts
/// both absolute URLs and host-relative paths; only `http`/`https`
/// absolute URLs are supported, matching §4.C's "parses the new
/// `Host[:port]`" wording (it does not say anything about resolving
/// arbitrary relative paths against the prior URL's directory).
fn parse_redirect_target(current: &Target, location: &str) -> Result<Target, ProblemDetails> {
    if let Some(rest) = location.strip_prefix("https://") {
        parse_authority_and_path(rest, true)
    } else if let Some(rest) = location.strip_prefix("http://") {
        parse_authority_and_path(rest, false)
    } else if location.starts_with('/') {
        Ok(Target {
            host: current.host.clone(),
            port: current.port,
            use_tls: current.use_tls,
            path: location.trim_start_matches('/').to_string(),
        })
    } else {
        Err(ProblemDetails::malformed(format!(
            "unsupported redirect location {location}"
        )))
    }
}

fn parse_authority_and_path(rest: &str, use_tls: bool) -> Result<Target, ProblemDetails> {
    let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
    let (host, port) = match authority.split_once(':') {
        Some((host, port_str)) => {
            let port: u16 = port_str
                .parse()
                .map_err(|_| ProblemDetails::malformed(format!("invalid port in {authority}")))?;
            if port == 0 {
                return Err(ProblemDetails::malformed(format!(
                    "port out of range in {authority}"
                )));
            }
            (host.to_string(), port)
        }
        None => (authority.to_string(), if use_tls { 443 } else { 80 }),
    };
    Ok(Target {
        host,
        port,
        use_tls,
        path: path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http01_path_matches_well_known_layout() {
        assert_eq!(
            http01_path("tok"),
            ".well-known/acme-challenge/tok"
        );
    }

    #[test]
    fn parse_redirect_target_handles_absolute_https() {
        let current = Target {
            host: "example.com".to_string(),
            port: 80,
            use_tls: false,
            path: "x".to_string(),
        };
        let next = parse_redirect_target(&current, "https://other.example:8443/foo").unwrap();
        assert_eq!(next.host, "other.example");
        assert_eq!(next.port, 8443);
        assert!(next.use_tls);
        assert_eq!(next.path, "foo");
    }

    #[test]
    fn parse_redirect_target_defaults_port_by_scheme() {
        let current = Target {
            host: "example.com".to_string(),
            port: 80,
            use_tls: false,
            path: "x".to_string(),
        };
        let next = parse_redirect_target(&current, "https://other.example/foo").unwrap();
        assert_eq!(next.port, 443);
    }

    #[test]
    fn build_url_omits_default_port() {
        assert_eq!(
            build_url(false, "example.com", 80, "/.well-known/acme-challenge/tok"),
            "http://example.com/.well-known/acme-challenge/tok"
        );
        assert_eq!(
            build_url(true, "example.com", 443, "/x"),
            "https://example.com/x"
        );
    }

    #[test]
    fn build_url_keeps_nondefault_port() {
        assert_eq!(
            build_url(false, "example.com", 8080, "/x"),
            "http://example.com:8080/x"
        );
    }

    #[test]
    fn parse_redirect_target_rejects_unsupported_scheme() {
        let current = Target {
            host: "example.com".to_string(),
            port: 80,
            use_tls: false,
            path: "x".to_string(),
        };
        assert!(parse_redirect_target(&current, "ftp://other.example/foo").is_err());
    }
}
