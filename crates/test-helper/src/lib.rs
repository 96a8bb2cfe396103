//! Shared setup for the workspace integration tests.
//!

#![allow(missing_docs)]

pub mod fixtures;
pub mod logger;
