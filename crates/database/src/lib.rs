pub mod connection;
pub mod error;
pub mod memory;
pub mod repositories;
pub mod scope;

pub use connection::{Database, DatabaseConfig};
pub use error::{DatabaseError, Result};
pub use memory::InMemoryStore;
pub use repositories::{
    resources::PgResourceCounter, roles::PgRoleStore, subscriptions::PgSubscriptionStore,
    tenants::PgTenantDirectory, ResourceCounter, RoleStore, SubscriptionStore, TenantDirectory,
    TenantStatusWriter,
};
pub use scope::TenantScope;
