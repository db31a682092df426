//! Core types for Cartwise.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod message;

pub use email::{Email, EmailError};
pub use id::*;
pub use message::{MessageError, UserMessage};
