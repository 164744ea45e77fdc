//! Infrastructure Layer
//!
//! Reaching the host:
//! - Module discovery (polling probes with a timeout)
//! - An in-memory implementation of every host port

pub mod discovery;
pub mod memory;

pub use discovery::{wait_for, DiscoveryPolicy};
pub use memory::{MemoryHost, Surface};
