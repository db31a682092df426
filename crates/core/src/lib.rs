//! Cartwise Core - Shared types library.
//!
//! This crate provides common types used across all Cartwise components:
//! - `server` - Shopping-assistant HTTP API (chatbot, search suggestions, chat history)
//! - `cli` - Command-line tools for migrations and operator tasks
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and validated chat input

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
