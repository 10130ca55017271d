//! tinylinker - a small per-user URL shortener
//!
//! Logged-in users create short codes for long URLs and manage their own
//! links; anyone can follow `/u/{code}`. Deleted links are kept as tombstones,
//! so a deleted code answers 410 rather than 404 and is never handed out again.
//!
//! # Architecture
//! - `storage`: record types and the JSON snapshot store
//! - `services`: URL registry, user store, session identity, access control
//! - `api`: HTTP handlers, routing, session tokens and middleware
//! - `config`: static configuration (TOML + environment)
//! - `runtime`: startup wiring and the server loop
//! - `system`: logging setup

pub mod api;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
