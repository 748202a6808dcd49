//! snaplink - a URL shortener service
//!
//! Redirect lookups go through per-route admission control, then a sharded
//! LRU resolution cache with single-flight origin reads. Creates validate,
//! persist and pre-populate the cache.
//!
//! # Architecture
//! - `admission`: per-key rate-limit windows composed per route
//! - `cache`: sharded LRU, single-flight, negative cache
//! - `storage`: `OriginStore` trait, in-memory and SeaORM backends
//! - `services`: redirect resolver, create handler, code generator
//! - `api`: HTTP routes and middleware
//! - `config`: TOML + environment configuration
//! - `runtime`: startup wiring, server mode, shutdown
//! - `system`: logging

pub mod admission;
pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
