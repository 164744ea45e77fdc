//! Presentation Layer
//!
//! Interceptors installed on the host's hookable surfaces.

pub mod interceptors;
