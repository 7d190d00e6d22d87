use serde::{Deserialize, Serialize};

/// Static engine issuer asserted in every token's `iss` claim and checked by
/// every validator (§4.6).
pub const ISSUER: &str = "vitalconnect-engine";

/// bcrypt work factor mandated for password storage (§4.6). bcrypt truncates
/// its input at 72 bytes; `PasswordHasher` enforces the 8-72 byte window
/// before hashing rather than let bcrypt silently ignore the tail.
pub const BCRYPT_COST: u32 = 12;
pub const PASSWORD_MIN_BYTES: usize = 8;
pub const PASSWORD_MAX_BYTES: usize = 72;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    pub login_rate_limit_per_minute: u32,
}

impl From<&config_engine::Settings> for IdentityConfig {
    fn from(settings: &config_engine::Settings) -> Self {
        Self {
            access_secret: settings.jwt.access_secret.clone(),
            refresh_secret: settings.jwt.refresh_secret.clone(),
            access_ttl_secs: settings.jwt.access_ttl_secs,
            refresh_ttl_secs: settings.jwt.refresh_ttl_secs,
            login_rate_limit_per_minute: settings.engine.login_rate_limit_per_minute,
        }
    }
}
