//! # ExportReady CLI Library
//!
//! This crate provides the core functionality for the ExportReady CLI,
//! a tool that assesses export readiness for Indian SME products.
//!
//! ## Modules
//!
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration management
//! - [`exit_codes`] - Standard exit codes
//! - [`output`] - Report rendering for the terminal
//! - [`store`] - Knowledge index wiring

pub mod commands;
pub mod config;
pub mod exit_codes;
pub mod output;
pub mod store;

// Re-export commonly used types
pub use config::Config;
