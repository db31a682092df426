//! Business logic services.
//!
//! - `auth` - Shopper registration and password login

pub mod auth;
