use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("server error: {0}")]
    Serve(String),
}
