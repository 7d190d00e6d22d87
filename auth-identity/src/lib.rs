//! Bearer-token authentication and tenant-context resolution for the
//! VitalConnect engine (§4.6).
//!
//! Two HMAC-SHA256-signed tokens per session — access (short-lived) and
//! refresh — each keyed with its own secret so a leak of one never forges
//! the other. Passwords are hashed with bcrypt at cost 12. Login attempts
//! are rate-limited per client IP through a fixed-window KV counter.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod password;
pub mod rate_limit;
pub mod service;
pub mod token;

pub use config::{IdentityConfig, BCRYPT_COST, ISSUER};
pub use error::{IdentityError, Result};
pub use models::{Claims, EffectiveTenant, LoginRequest, LoginResponse, RefreshRequest, TokenKind, TokenPair};
pub use password::PasswordHasher;
pub use rate_limit::{RateLimit, RedisRateLimiter};
pub use service::AuthService;
pub use token::TokenIssuer;
