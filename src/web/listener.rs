//! Resilient listener startup.
//!
//! Binds the HTTP listener on a preferred port and, when that port is already
//! taken, falls back across a bounded window of successively higher ports. The
//! bound port travels in the returned handle; callers inject it wherever it is
//! needed instead of reading shared mutable state.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;

/// Default number of bind attempts
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Fixed pause between bind attempts
pub const RETRY_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Error)]
pub enum BindError {
    /// Every port in the attempt window was in use (or the port range ran out)
    #[error("no available port after {attempts} attempts starting at port {start_port}")]
    Exhausted { start_port: u16, attempts: u32 },

    /// A bind failure other than address-in-use; never retried
    #[error("failed to bind {addr}: {source}")]
    Io {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}

/// A successfully bound listener and the port it actually landed on.
#[derive(Debug)]
pub struct BoundListener {
    listener: TcpListener,
    port: u16,
}

impl BoundListener {
    /// Port the listener is accepting on.
    ///
    /// Differs from the preferred port after fallback, and reports the
    /// OS-assigned port when the preferred port was 0.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Hand the raw listener to the serve loop.
    #[must_use]
    pub fn into_inner(self) -> TcpListener {
        self.listener
    }
}

/// Bind a TCP listener, retrying on successively higher ports.
///
/// The preferred port is tried first. An address-in-use failure consumes one
/// attempt and, while attempts remain, the next port up is tried after a fixed
/// [`RETRY_DELAY`]. The increment is linear with no jitter and no backoff.
/// Any other bind failure returns immediately without retrying.
///
/// # Errors
///
/// Returns `BindError::Exhausted` once `max_attempts` address-in-use failures
/// have occurred, and `BindError::Io` for any other bind failure. A
/// `max_attempts` of 0 is immediate exhaustion.
pub async fn bind_with_retry(
    host: IpAddr,
    preferred_port: u16,
    max_attempts: u32,
) -> Result<BoundListener, BindError> {
    let exhausted = || BindError::Exhausted {
        start_port: preferred_port,
        attempts: max_attempts,
    };

    if max_attempts == 0 {
        return Err(exhausted());
    }

    let mut remaining = max_attempts;
    let mut port = preferred_port;

    loop {
        let addr = SocketAddr::new(host, port);
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                let port = listener
                    .local_addr()
                    .map_err(|source| BindError::Io { addr, source })?
                    .port();
                return Ok(BoundListener { listener, port });
            }
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                remaining -= 1;
                if remaining == 0 {
                    return Err(exhausted());
                }
                // Running off the end of the port range counts as exhaustion.
                let Some(next) = port.checked_add(1) else {
                    return Err(exhausted());
                };
                tracing::warn!("port {port} in use, {remaining} attempts left, trying port {next}");
                tokio::time::sleep(RETRY_DELAY).await;
                port = next;
            }
            Err(source) => return Err(BindError::Io { addr, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[tokio::test]
    async fn test_zero_attempts_is_immediate_exhaustion() {
        let err = bind_with_retry(IpAddr::V4(Ipv4Addr::LOCALHOST), 0, 0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BindError::Exhausted {
                start_port: 0,
                attempts: 0
            }
        ));
    }

    #[tokio::test]
    async fn test_os_assigned_port_is_reported() {
        let bound = bind_with_retry(IpAddr::V4(Ipv4Addr::LOCALHOST), 0, 1)
            .await
            .unwrap();
        let port = bound.port();
        assert_ne!(port, 0);
        // The handle and the underlying socket agree on the port.
        assert_eq!(bound.into_inner().local_addr().unwrap().port(), port);
    }
}
