use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, Instrument};

use crate::config::{Config, VirtualHosts};
use crate::http::connection::{Connection, IDLE_TIMEOUT};

/// Validates the configuration, binds the listen address and serves forever.
pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    cfg.validate()?;

    let listener = TcpListener::bind(&cfg.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.server.listen_addr))?;
    info!("Listening on {}", listener.local_addr()?);

    for (host, root) in cfg.virtual_hosts.iter() {
        info!(host, root = %root.display(), "Serving virtual host");
    }

    serve(listener, Arc::new(cfg.virtual_hosts.clone()), IDLE_TIMEOUT).await;
    Ok(())
}

/// Accepts connections on `listener`, one task per connection.
///
/// Accept failures are logged and skipped.
pub async fn serve(listener: TcpListener, hosts: Arc<VirtualHosts>, idle_timeout: Duration) {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to accept connection");
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let hosts = Arc::clone(&hosts);
        tokio::spawn(
            async move {
                let mut conn = Connection::new(socket, hosts).with_idle_timeout(idle_timeout);
                if let Err(e) = conn.run().await {
                    tracing::error!("Connection error from {}: {:#}", peer, e);
                }
            }
            .instrument(tracing::debug_span!("conn", %peer)),
        );
    }
}
