//! Application lifecycle: startup wiring, server mode, shutdown.

pub mod lifetime;
pub mod modes;

pub use lifetime::startup::{StartupContext, build_app_state, prepare_server_startup, warm_cache};
pub use modes::run_server;
