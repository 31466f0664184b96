// Multi-tenant identity HTTP layer
// Exposes the router and middleware so host applications can mount their
// own tenant-owned routes behind the same checks.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::Config;
pub use state::AppState;
