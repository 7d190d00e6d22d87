use std::collections::HashMap;

use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ConfigError, Result};

/// Top-level configuration loaded once at process start and shared
/// read-only across every worker via `Arc<Settings>`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub redis: RedisSettings,
    pub jwt: JwtSettings,
    pub smtp: SmtpSettings,
    pub sms_gateway: SmsGatewaySettings,
    pub engine: EngineSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_max_lifetime_secs")]
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: i64,
    #[serde(default = "default_refresh_ttl_secs")]
    pub refresh_ttl_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: Option<String>,
}

impl SmtpSettings {
    /// Emails fall back to a log-only channel when SMTP isn't configured,
    /// which keeps local development and CI from requiring a mail server.
    pub fn is_configured(&self) -> bool {
        self.host.is_some() && self.from_address.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmsGatewaySettings {
    pub api_base_url: Option<String>,
    pub api_key: Option<String>,
    pub sender_id: Option<String>,
}

impl SmsGatewaySettings {
    pub fn is_configured(&self) -> bool {
        self.api_base_url.is_some() && self.api_key.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_window_hours")]
    pub window_hours: i64,
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
    #[serde(default = "default_alert_cooldown_minutes")]
    pub alert_cooldown_minutes: i64,
    #[serde(default = "default_login_rate_limit")]
    pub login_rate_limit_per_minute: u32,
    pub admin_alert_email: Option<String>,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// Base URL used to build the per-occurrence dashboard link carried in
    /// notification payloads (§4.4).
    #[serde(default = "default_dashboard_base_url")]
    pub dashboard_base_url: String,
    /// PEP ingest's "API key mapped to hospital id in a static table" (§6),
    /// as a JSON object string keyed by API key, e.g.
    /// `{"key": {"tenant_id": "...", "hospital_id": "..."}}`; parsed by
    /// [`EngineSettings::pep_api_keys`] rather than deserialized directly,
    /// since a `HashMap` doesn't round-trip through the environment-variable
    /// source cleanly. Carries `tenant_id` alongside `hospital_id` because
    /// PEP ingest authenticates before any tenant context exists, and every
    /// repository write still needs one.
    #[serde(default = "default_pep_api_keys_json")]
    pub pep_api_keys_json: String,
}

/// One static PEP credential: which tenant and hospital an API key ingests
/// death events for.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PepCredential {
    pub tenant_id: Uuid,
    pub hospital_id: Uuid,
}

impl EngineSettings {
    /// Parses [`Self::pep_api_keys_json`] into the API-key -> credential
    /// table PEP ingest authenticates against.
    pub fn pep_api_keys(&self) -> Result<HashMap<String, PepCredential>> {
        serde_json::from_str(&self.pep_api_keys_json).map_err(|e| ConfigError::InvalidValue {
            field: "engine.pep_api_keys_json".to_string(),
            message: e.to_string(),
        })
    }
}

fn default_max_connections() -> u32 {
    25
}
fn default_min_connections() -> u32 {
    5
}
fn default_max_lifetime_secs() -> u64 {
    300
}
fn default_access_ttl_secs() -> i64 {
    900
}
fn default_refresh_ttl_secs() -> i64 {
    60 * 60 * 24 * 7
}
fn default_poll_interval_secs() -> u64 {
    3
}
fn default_window_hours() -> i64 {
    6
}
fn default_check_interval_secs() -> u64 {
    10
}
fn default_alert_cooldown_minutes() -> i64 {
    5
}
fn default_login_rate_limit() -> u32 {
    5
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_dashboard_base_url() -> String {
    "http://localhost:8080".to_string()
}
fn default_pep_api_keys_json() -> String {
    "{}".to_string()
}

impl Settings {
    /// Loads configuration from the process environment, with `.env` (if
    /// present) applied first via `dotenvy` so local development doesn't
    /// need real shell exports. Every `VITALCONNECT_`-prefixed variable maps
    /// onto a field by double-underscore-separated path, e.g.
    /// `VITALCONNECT_DATABASE__URL`, `VITALCONNECT_JWT__ACCESS_SECRET`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let raw = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("VITALCONNECT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = raw.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.jwt.access_secret == self.jwt.refresh_secret {
            return Err(ConfigError::InvalidValue {
                field: "jwt".to_string(),
                message: "access_secret and refresh_secret must differ".to_string(),
            });
        }
        if self.engine.window_hours <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.window_hours".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
