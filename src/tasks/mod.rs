//! Background tasks module
//!
//! This module contains the coordinator loop that runs alongside the HTTP server.

pub mod coordinator;

// Re-export main types
pub use coordinator::{coordinator_task, Coordinator, Flow};
