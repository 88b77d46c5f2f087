//! # Storage Module
//!
//! Handles persistence for the household service.
//!
//! Bills and their per-member shares live in SQLite, accessed through SQLx.
//! The domain layer only sees the [`BillStorage`] trait, so the backend can
//! be swapped without touching services.
//!
//! ## Design Principles
//!
//! - **Repository Pattern**: Clean separation between domain and data access
//! - **Dependency Inversion**: Domain depends on storage abstractions, not implementations
//! - **Testability**: Every test gets its own in-memory database

pub mod connection;
pub mod repositories;
pub mod traits;

// Re-export the main types that other modules need
pub use connection::DbConnection;
pub use repositories::BillRepository;
pub use traits::BillStorage;
