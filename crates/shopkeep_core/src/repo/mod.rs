//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the product persistence gateway contract.
//! - Isolate SQLite query details from callers.
//!
//! # Invariants
//! - Caller-misuse failures surface as validation errors before any SQL.
//! - Store errors propagate unchanged; they are never masked or retried.

pub mod product_repo;
