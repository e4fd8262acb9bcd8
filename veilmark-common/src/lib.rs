//! Veilmark Common
//!
//! Shared utilities for the Veilmark serialization stack.
//!
//! This crate provides:
//! - Component-based structured logging with scope context

pub mod logging;

pub use logging::{Component, Logger};
