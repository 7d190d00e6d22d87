use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request-scoped identity carried alongside a call so logs and audit
/// entries can be correlated without threading extra parameters everywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            tenant_id: None,
            user_id: None,
        }
    }

    pub fn with_tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
