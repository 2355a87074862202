//! Common types, traits, and utilities for CloudGate
//!
//! This crate holds the pieces every other CloudGate crate needs: the shared
//! error taxonomy with severity classification, and the process-wide
//! collaborator cache.

pub mod cache;
pub mod error;

pub use cache::ResourceCache;
pub use error::{CloudGateError, ErrorSeverity, Result, Severity};
