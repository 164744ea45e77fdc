//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! ## Value Objects
//!
//! - **Snowflake**: Discord-style unique ID with embedded timestamp

mod snowflake;

pub use snowflake::*;
