//! Data Transfer Objects
//!
//! Requests accepted by the synthesis operations and the reports they return.

pub mod request;
pub mod response;

pub use request::{FakeMessageRequest, MessageTarget};
pub use response::{AutoDispatchReport, QuickOutcome};
