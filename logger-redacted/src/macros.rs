/// Formats its arguments, redacts the result through `$redactor`, and logs
/// at `info` level. Prefer this over `tracing::info!` anywhere the message
/// might embed an email, phone number, or patient identifier.
#[macro_export]
macro_rules! redacted_info {
    ($redactor:expr, $($arg:tt)*) => {
        tracing::info!("{}", $redactor.redact(&format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! redacted_warn {
    ($redactor:expr, $($arg:tt)*) => {
        tracing::warn!("{}", $redactor.redact(&format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! redacted_error {
    ($redactor:expr, $($arg:tt)*) => {
        tracing::error!("{}", $redactor.redact(&format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! redacted_debug {
    ($redactor:expr, $($arg:tt)*) => {
        tracing::debug!("{}", $redactor.redact(&format!($($arg)*)))
    };
}
