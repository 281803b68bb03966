//! Locale-keyed, time-expiring cache of sample query lists.

pub mod clock;
pub mod samples_cache;

pub use clock::{Clock, ManualClock, SystemClock};
pub use samples_cache::{SampleQueriesCache, SamplesCacheConfig};
