//! Infrastructure layer: I/O implementations and DI container
//!
//! This layer implements I/O boundary traits, drives the external content
//! engine and wires up services.

pub mod di;
pub mod engine;
pub mod error;
pub mod traits;

pub use error::{InfraError, InfraResult};
