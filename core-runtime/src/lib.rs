//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the music session core:
//! - Logging and tracing infrastructure
//! - Configuration management and host bridge injection
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the domain crates and the
//! service façade depend on. It establishes the logging conventions, the
//! fail-fast configuration builder and the event broadcasting used
//! throughout the system.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
