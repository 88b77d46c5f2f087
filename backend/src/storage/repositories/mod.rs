// Repository modules
pub mod bill_repository;

// Re-export repository types
pub use bill_repository::BillRepository;
