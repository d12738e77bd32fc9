//! HTTP API: routing, role resolution, the protected-resource gate and
//! request/response mapping.

pub mod app;
pub mod context;
pub mod middleware;
