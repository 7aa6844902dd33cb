//! # Core Runtime Module
//!
//! Provides the ambient runtime infrastructure for the AAC decoder plugin:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the decoder core depends on. It
//! establishes the logging conventions and the configuration the plugin is
//! loaded with; it never participates in the per-frame decode path.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
