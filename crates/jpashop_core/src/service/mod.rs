//! Use-case services built on the persistence context.
//!
//! # Responsibility
//! - Own the unit-of-work lifecycle: open manager, transact, release.
//! - Keep callers free of transaction and connection handling.

pub mod catalog_service;
pub mod order_service;
