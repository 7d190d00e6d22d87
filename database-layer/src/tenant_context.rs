use uuid::Uuid;

use crate::models::UserRole;

/// Resolved tenant/user binding threaded explicitly through every repository
/// call (§4.6, §9). Repository methods take `&TenantContext` and inject
/// `tenant_id = $1` into their queries; nothing reads tenant identity from
/// anywhere else (no thread-local, no global).
#[derive(Debug, Clone, Copy)]
pub struct TenantContext {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub role: UserRole,
    pub is_super_admin: bool,
}

impl TenantContext {
    pub fn new(tenant_id: Uuid, user_id: Uuid, role: UserRole, is_super_admin: bool) -> Self {
        Self {
            tenant_id,
            user_id,
            role,
            is_super_admin,
        }
    }
}
