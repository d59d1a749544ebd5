//! esmcp-core - Core types and traits for es-mcp
//!
//! This crate provides the domain types, the `Cluster` trait and the error
//! taxonomy shared by every other crate in the workspace.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::{EsMcpError, Result};
pub use traits::*;
pub use types::*;
