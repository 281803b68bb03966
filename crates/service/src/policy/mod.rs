//! Category policies for mutating actions: the pure decision function and the
//! read-through loader that bootstraps a default document.

pub mod evaluator;
pub mod loader;

pub use evaluator::{authorize, is_authorized};
pub use loader::PolicyLoader;
