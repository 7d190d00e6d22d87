//! Cached on-duty responder resolution with mandatory fallback (§4.3).
//!
//! [`router::ShiftRouter`] implements the cache → DB → fallback chain:
//! a 5-minute Redis cache keyed per hospital, falling back to a direct
//! shift query (with the night-shift prior-weekday wraparound), and
//! finally to the hospital's active `gestor`s. [`coverage::weekly_gaps`]
//! is the offline counterpart, reporting uncovered intervals per weekday.

pub mod cache;
pub mod coverage;
pub mod error;
pub mod router;

pub use cache::ShiftCache;
pub use coverage::{weekly_gaps, Gap, WeekdayGaps};
pub use error::{Result, ShiftRoutingError};
pub use router::{Resolution, ShiftRouter};
