//! Upstream fetch subsystem.
//!
//! # Data Flow
//! ```text
//! UpstreamTarget + inbound method/headers
//!     → client.rs (allow-listed header copy, GET/HEAD mapping)
//!     → reqwest (TLS, timeouts, redirect following)
//!     → upstream response handed to the assembler
//! ```
//!
//! # Design Decisions
//! - Exactly one outbound request per inbound request; no retries
//! - Only accept, accept-language, user-agent and (when present)
//!   authorization are forwarded; everything else is dropped
//! - Redirects follow the transport default

pub mod client;

pub use client::{UpstreamClient, UpstreamError};
