//! Structured logging with automatic PII/PHI redaction for the VitalConnect
//! engine.
//!
//! Every crate logs through `tracing`'s macros for structured fields and,
//! wherever a message might interpolate patient contact data, through
//! [`redacted_info`]/[`redacted_warn`]/[`redacted_error`]/[`redacted_debug`]
//! so the text passes through a [`PiiRedactor`] before it reaches any sink.
//! [`init_tracing`] installs the subscriber every binary in the workspace
//! starts with: an `EnvFilter` driven by `RUST_LOG` (falling back to the
//! configured level) plus either a pretty console layer or a JSON layer for
//! production log shipping.

pub mod config;
pub mod macros;
pub mod redactor;

pub use config::LoggerConfig;
pub use redactor::{mask_phone, PiiRedactor, RedactionConfig};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global `tracing` subscriber. Call once, at process start.
///
/// `verbose` forces `debug` level for the current crate's target regardless
/// of `cfg.log_level`; it exists so CLI `-v` flags don't have to round-trip
/// through `RUST_LOG`.
pub fn init_tracing(service_name: &str, cfg: &LoggerConfig, verbose: bool) {
    let default_directive = if verbose {
        format!("{service_name}=debug,info")
    } else {
        cfg.log_level.clone()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let registry = tracing_subscriber::registry().with(filter);

    if cfg.json_output {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true).compact()).init();
    }
}
