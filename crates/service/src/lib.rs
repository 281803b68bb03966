//! Service layer for the sample queries API.
//! - `storage`: blob access behind the `BlobStore` trait
//! - `samples`: pure record operations and the request-level service
//! - `policy`: category authorization and the policy document loader
//! - `cache`: locale-keyed, expiring cache of loaded documents

pub mod errors;
pub mod storage;
pub mod samples;
pub mod policy;
pub mod cache;
pub mod observability;
