//! Backend worker: owns the tokio runtime and the HTTP client, and turns
//! queued commands into UI events.

pub mod commands;
pub mod runtime;
