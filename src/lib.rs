pub mod client;
pub mod config;
pub mod globe;
pub mod positions;
pub mod roster;
pub mod web;

pub use config::Config;
pub use roster::{Roster, SatelliteDescriptor};
