//! TCP listener binding.
//!
//! # Responsibilities
//! - Resolve the configured host (`*` = all interfaces) and port
//! - Bind the listening socket; failure is fatal to startup

use std::io;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },
    /// Bound, but the local address could not be read back.
    #[error("failed to read local address: {0}")]
    LocalAddr(#[source] io::Error),
}

/// Bind the listener described by `config`.
pub async fn bind(config: &ListenerConfig) -> Result<(TcpListener, SocketAddr), ListenerError> {
    let host = config.host.as_socket_host();
    let listener = TcpListener::bind((host, config.port))
        .await
        .map_err(|source| ListenerError::Bind {
            address: config.display_address(),
            source,
        })?;
    let local_addr = listener.local_addr().map_err(ListenerError::LocalAddr)?;

    tracing::debug!(address = %local_addr, "Listener bound");
    Ok((listener, local_addr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BindHost;

    #[tokio::test]
    async fn binds_ephemeral_port() {
        let config = ListenerConfig {
            host: BindHost::parse("127.0.0.1"),
            port: 0,
        };
        let (_listener, addr) = bind(&config).await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn port_in_use_is_a_bind_error() {
        let config = ListenerConfig {
            host: BindHost::parse("127.0.0.1"),
            port: 0,
        };
        let (_held, addr) = bind(&config).await.unwrap();

        let taken = ListenerConfig {
            host: BindHost::parse("127.0.0.1"),
            port: addr.port(),
        };
        let err = bind(&taken).await.unwrap_err();
        assert!(matches!(err, ListenerError::Bind { .. }));
        assert!(err.to_string().starts_with(&format!("failed to bind 127.0.0.1:{}", addr.port())));
    }
}
