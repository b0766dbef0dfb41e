//! Library exports for wslpaste.
//!
//! Exposes the capture pipeline, hotkey handling and configuration so the
//! binary and integration tests share one implementation.

pub mod capture;
pub mod config;
pub mod hotkey;

pub use config::Config;
