use serde::{Deserialize, Serialize};

/// Controls for the tracing subscriber every VitalConnect binary installs at
/// startup via [`crate::init_tracing`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Run the redaction layer over every formatted log line.
    pub redaction_enabled: bool,
    /// Emit newline-delimited JSON instead of the pretty console format.
    pub json_output: bool,
    /// `RUST_LOG`-style directive, e.g. `"info"` or `"vitalconnect=debug,tower_http=info"`.
    pub log_level: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            redaction_enabled: true,
            json_output: false,
            log_level: "info".to_string(),
        }
    }
}
