use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use carbon_client::RpcTransport;

use crate::error::DashboardError;
use crate::routes::router;
use crate::state::DashboardState;

/// Bind `addr` and serve the dashboard until the task is cancelled or the
/// process receives Ctrl-C.
pub async fn serve<T: RpcTransport + 'static>(
    addr: SocketAddr,
    state: Arc<DashboardState<T>>,
) -> Result<(), DashboardError> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| DashboardError::Bind {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
    let local = listener
        .local_addr()
        .map_err(|e| DashboardError::Serve(e.to_string()))?;
    info!(%local, "dashboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DashboardError::Serve(e.to_string()))?;
    info!("dashboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
