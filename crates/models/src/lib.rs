//! Data types shared by the service and HTTP layers.
//! - `sample_query`: the sample query record and the localized list document
//! - `policy`: per-category authorization policies for mutating actions

pub mod errors;
pub mod sample_query;
pub mod policy;
