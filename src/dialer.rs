//! Pinned dialer (4.B).
//!
//! All name-to-address mapping happens inside the VA so the audit trail
//! captures exactly which IP answered, and so a redirect cannot silently
//! switch to a different host. Nothing here ever consults the caller's
//! own resolver.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use tokio::net::TcpStream;

/// Dials TCP straight to `(addr, port)`, bounded by `timeout`. The
/// hostname that led here is irrelevant by this point — it only ever
/// existed to select `addr` via the address resolver (4.A).
pub async fn connect_pinned(
    addr: Ipv4Addr,
    port: u16,
    timeout: Duration,
) -> std::io::Result<TcpStream> {
    let socket_addr = SocketAddr::V4(SocketAddrV4::new(addr, port));
    match tokio::time::timeout(timeout, TcpStream::connect(socket_addr)).await {
        Ok(result) => result,
        Err(_) => Err(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!("connect to {socket_addr} timed out"),
        )),
    }
}

/// Produces the `(hostname, resolved socket address)` pair fed into
/// `reqwest::ClientBuilder::resolve` by `http_fetcher::build_client`, so
/// reqwest's own DNS resolution of the request's host is bypassed
/// entirely in favor of the address this VA already resolved and
/// recorded.
pub fn pin_resolve(hostname: &str, addr: Ipv4Addr, port: u16) -> (String, SocketAddr) {
    (
        hostname.to_string(),
        SocketAddr::V4(SocketAddrV4::new(addr, port)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_to_closed_port_fails_quickly() {
        // Port 0 is never listening; this exercises the timeout/error
        // path without depending on network access.
        let result = connect_pinned(
            "127.0.0.1".parse().unwrap(),
            0,
            Duration::from_millis(200),
        )
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn pin_resolve_preserves_hostname_and_builds_socket_addr() {
        let (host, addr) = pin_resolve("example.com", "10.0.0.1".parse().unwrap(), 443);
        assert_eq!(host, "example.com");
        assert_eq!(addr.port(), 443);
    }
}
