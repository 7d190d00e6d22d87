use crate::types::EngineError;

/// Sink for fatal/critical errors worth escalating beyond a log line.
/// `vitalconnect-server` wires this to `audit-engine`; tests use the no-op.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &EngineError);
}

pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, error: &EngineError) {
        tracing::error!(code = %error.code, error_id = %error.error_id, "{}", error.message);
    }
}
