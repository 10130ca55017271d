//! HTTP surface: handlers, routing, session tokens and middleware.

pub mod constants;
pub mod jwt;
pub mod middleware;
pub mod services;
