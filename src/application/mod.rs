//! Application Layer
//!
//! Rewriting and synthesis services plus the request and report types they
//! exchange. This layer sits between the host ports of the domain layer and
//! the interceptors of the presentation layer.

pub mod dto;
pub mod services;
