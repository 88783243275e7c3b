//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies (no SeaORM entities, no Axum).
//! Only value types, trait definitions and domain error types.

pub mod errors;
pub mod inventory;
pub mod lending;
pub mod repositories;

pub use errors::DomainError;
pub use inventory::*;
pub use lending::*;
pub use repositories::*;
