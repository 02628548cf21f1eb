//! REST surface of the HR suite: router, request authentication and the
//! employee/identity handlers.

pub mod config;
mod handlers;
pub mod http;
pub mod positions;
mod session;

pub use http::{AppState, ServeConfig, build_router, serve};
