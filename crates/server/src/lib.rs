pub mod routes;
pub mod startup;
pub mod errors;
pub mod openapi;
pub mod locale;

pub use startup::run;
