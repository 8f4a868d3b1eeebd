//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, route shapes, middleware)
//!     → request.rs (request ID)
//!     → [routing resolves the upstream target]
//!     → [cache policy decides hit / miss / bypass]
//!     → response.rs (assemble, cache-control policy, diagnostic header)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
