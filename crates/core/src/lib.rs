//! Luxe Scent Core - Shared domain types.
//!
//! This crate provides the common types used by the Luxe Scent API server:
//! type-safe IDs, validated email addresses, one-time codes, and the
//! catalog/order vocabulary enums.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. The optional `postgres` feature adds sqlx trait impls so the ID
//! and email newtypes can be bound directly in queries.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
