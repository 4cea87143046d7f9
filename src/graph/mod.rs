pub mod attributes;
pub mod builder;
pub mod config;
pub mod cooccurrence;
pub mod filters;
pub mod metadata;
pub mod scoring;
pub mod statistics;
pub mod tracks;

#[cfg(test)]
pub(crate) mod test_support;

pub use builder::*;
pub use config::*;
pub use metadata::*;
