pub mod config;
pub mod pending;
pub mod serve;
pub mod usage;
