//! Upstream target resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request path + query
//!     → target.rs (split `/{protocol}/{host}/{rest...}`)
//!     → Protocol allow-list check (http | https only)
//!     → UpstreamTarget (typed, validated)
//!     → upstream fetcher builds the outbound URL from it
//! ```
//!
//! # Design Decisions
//! - Typed extraction instead of stringly route params
//! - Protocol tokens match case-sensitively; anything else is a 400
//! - Path and query pass through exactly as the transport delivered them

pub mod target;

pub use target::{InvalidProtocol, Protocol, UpstreamTarget};
