pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod session;
pub mod telemetry;
pub mod transport;
