//! Application lifecycle: building the shared state and serving HTTP.

pub mod server;
pub mod startup;

pub use server::run_server;
pub use startup::{StartupContext, prepare_server_startup, prepare_server_startup_with};
