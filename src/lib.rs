pub mod config;
pub mod core;
pub mod distributions;
pub mod io;
pub mod metropolis;
pub mod random;
pub mod stats;
