//! Environment-driven configuration loading for the VitalConnect engine.
//!
//! `Settings::from_env` is the single entry point; every binary calls it
//! once at startup and shares the result behind an `Arc`.

pub mod error;
pub mod settings;

pub use error::{ConfigError, Result};
pub use settings::{
    DatabaseSettings, EngineSettings, JwtSettings, PepCredential, RedisSettings, Settings,
    SmsGatewaySettings, SmtpSettings,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_matching_jwt_secrets() {
        std::env::set_var("VITALCONNECT_DATABASE__URL", "postgres://localhost/test");
        std::env::set_var("VITALCONNECT_REDIS__URL", "redis://localhost");
        std::env::set_var("VITALCONNECT_JWT__ACCESS_SECRET", "same-secret");
        std::env::set_var("VITALCONNECT_JWT__REFRESH_SECRET", "same-secret");
        std::env::set_var("VITALCONNECT_SMTP__HOST", "");
        std::env::set_var("VITALCONNECT_SMS_GATEWAY__API_BASE_URL", "");

        let result = Settings::from_env();
        assert!(result.is_err());

        for var in [
            "VITALCONNECT_DATABASE__URL",
            "VITALCONNECT_REDIS__URL",
            "VITALCONNECT_JWT__ACCESS_SECRET",
            "VITALCONNECT_JWT__REFRESH_SECRET",
            "VITALCONNECT_SMTP__HOST",
            "VITALCONNECT_SMS_GATEWAY__API_BASE_URL",
        ] {
            std::env::remove_var(var);
        }
    }
}
