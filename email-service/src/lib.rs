//! SMTP delivery channel for the shared notification queue (§4.4). Renders
//! the hospital/sector/death-time/priority/dashboard-link template via
//! `handlebars` and sends over SMTP via `mail-send`; a missing SMTP
//! configuration degrades to a logged no-op rather than an error.

pub mod error;
pub mod service;

pub use error::{EmailError, EmailResult};
pub use service::EmailChannel;
