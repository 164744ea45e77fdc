//! # Domain Layer
//!
//! The records that flow through the host client and the contracts of the
//! host surfaces this crate hooks into.
//!
//! ## Structure
//!
//! - **entities**: Message records, dispatch actions, render output
//! - **value_objects**: Immutable value types (Snowflake)
//! - **ports**: Traits for every host surface, plus the module locator
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Host surfaces are reached only through the port traits

pub mod entities;
pub mod ports;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use value_objects::*;
