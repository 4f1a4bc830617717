//! qrscan Gateway HTTP API Server
//!
//! REST endpoints over the shared scan pipeline.

pub mod error;
pub mod health_api;
pub mod scan_api;
pub mod server;

pub use error::ApiError;
pub use server::{GatewayState, build_router, serve, start_server};
