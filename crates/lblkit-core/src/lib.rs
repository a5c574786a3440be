pub mod config;
pub mod spectral;
