//! HTTP API: configuration, request context, routing and response mapping.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
