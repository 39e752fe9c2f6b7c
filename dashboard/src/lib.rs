//! Operator dashboard: HTML forms over HTTP for every ledger action.
//!
//! All pages are rendered server-side. Each request takes the single state
//! lock for its whole duration, so actions reach the node one at a time.

pub mod error;
pub mod forms;
pub mod html;
pub mod routes;
pub mod server;
pub mod state;

pub use error::DashboardError;
pub use forms::Action;
pub use routes::router;
pub use server::serve;
pub use state::DashboardState;
