//! Domain model for the product catalog.
//!
//! # Responsibility
//! - Define the canonical product record and its validation rules.
//! - Own the key-value transport mapping used by outer layers.
//!
//! # Invariants
//! - Persistent identity lives in a store-assigned `ProductId`.
//! - The category set is closed; unknown names are rejected, not defaulted.

pub mod product;
