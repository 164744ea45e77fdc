//! # idremap
//!
//! Client-side identifier remapping and message synthesis for a Discord-like
//! chat client:
//! - Rewrites snowflake ids in message events, copied text and built links
//! - Synthesizes messages that appear locally as if sent by another user
//! - Shows the exact display time next to synthesized messages
//!
//! The host client is reached only through the port traits in
//! [`domain::ports`]; [`infrastructure::memory::MemoryHost`] implements them
//! all in memory.
//!
//! ## Architecture
//!
//! - **Domain Layer**: Message records, dispatch actions, host ports
//! - **Application Layer**: Remap, rewrite, overlay and synthesis services
//! - **Infrastructure Layer**: Module discovery and the in-memory host
//! - **Presentation Layer**: Interceptors installed on host surfaces
//!
//! ## Module Structure
//!
//! ```text
//! idremap/
//! +-- config/         Settings loading and validation
//! +-- domain/         Records, value objects and host ports
//! +-- application/    Services and DTOs
//! +-- infrastructure/ Discovery and the in-memory host
//! +-- presentation/   Interceptors
//! +-- shared/         Errors, interceptor chains, time, validation helpers
//! ```

// Configuration module
pub mod config;

// Domain layer - Records and host contracts
pub mod domain;

// Application layer - Rewriting and synthesis
pub mod application;

// Infrastructure layer - Host discovery and in-memory host
pub mod infrastructure;

// Presentation layer - Interceptors
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and lifecycle
pub mod startup;

// Telemetry and observability
pub mod telemetry;
