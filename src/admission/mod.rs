//! Admission control
//!
//! Per-key request windows composed into per-route policies. A rejected
//! request is answered with 429 and never reaches the cache or origin store.

pub mod controller;
pub mod limiter;
pub mod window;

pub use controller::{AdmissionController, Route, RoutePolicy};
pub use limiter::KeyedLimiter;
pub use window::{Decision, RateLimitWindow};
