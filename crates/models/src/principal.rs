use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

/// Identity proven by a verified access token.
///
/// `tenant_id` is `None` for platform-level principals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedPrincipal {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub tenant_id: Option<Uuid>,
}

impl AuthenticatedPrincipal {
    pub fn is_platform_super_admin(&self) -> bool {
        self.role.is_platform_super_admin()
    }
}
