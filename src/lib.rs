//! notifwd library crate.
//!
//! Polls the macOS Notification Center store, detects notifications that
//! appeared since the last poll, and forwards them to a push provider.
//! Exposed as a library for integration testing.

pub mod builder;
pub mod cli;
pub mod config;
pub mod detector;
pub mod dispatch;
pub mod error;
pub mod payload;
pub mod providers;
pub mod resolver;
pub mod scheduler;
pub mod store;

pub use error::{Error, Result};
