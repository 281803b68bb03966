//! Sample query records: pure list operations, the en-us ordering pass, and
//! the request-level service that ties cache, policies and records together.

pub mod ordering;
pub mod records;
pub mod service;

pub use service::{ListOutcome, SamplesService};
