//! # CLI Command Implementations
//!
//! This module contains the implementation of all CLI commands.
//! Each submodule represents a top-level command or command group.
//!
//! ## Available Commands
//!
//! - [`assess`] - Generate an export readiness report for a product
//! - [`config`] - Manage CLI configuration (backend, embeddings, data directory)
//! - [`ingest`] - Ingest regulatory documents into the knowledge index

pub mod assess;
pub mod config;
pub mod ingest;
