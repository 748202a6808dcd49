//! System-level modules
//!
//! Process plumbing that is not specific to link handling.

pub mod logging;

pub use logging::init_logging;
