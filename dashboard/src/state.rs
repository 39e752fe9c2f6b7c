use tokio::sync::{Mutex, MutexGuard};

use carbon_client::{LedgerClient, OperatorSession, RpcTransport};

/// What a request handler works with while it holds the lock.
pub struct Desk<T> {
    pub client: LedgerClient<T>,
    /// At most one signed-in operator.
    pub session: Option<OperatorSession>,
}

/// Shared dashboard state: one client and one optional session behind a
/// single async lock.
pub struct DashboardState<T> {
    desk: Mutex<Desk<T>>,
}

impl<T: RpcTransport> DashboardState<T> {
    pub fn new(client: LedgerClient<T>) -> Self {
        Self {
            desk: Mutex::new(Desk {
                client,
                session: None,
            }),
        }
    }

    /// Wait for exclusive use of the client and session.
    pub async fn lock(&self) -> MutexGuard<'_, Desk<T>> {
        self.desk.lock().await
    }
}
