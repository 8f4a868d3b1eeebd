//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//!
//! On reload signal:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of the active cache settings
//!     → in-flight requests keep the config they started with
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an empty config file is valid
//! - Validation separates syntactic (serde) from semantic checks
//! - A failed reload keeps the current configuration

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::CacheConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::ProxyConfig;
pub use schema::UpstreamConfig;
