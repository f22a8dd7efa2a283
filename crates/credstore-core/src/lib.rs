//! Framework-agnostic credential-store domain records and helpers.
//!
//! This crate is intended to be reused by storage backends and the
//! engine-facing adapter without pulling in any I/O dependencies.

pub mod models;

pub use models::*;
