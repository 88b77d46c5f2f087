//! # REST API Interface Layer
//!
//! One module per resource, each exposing a `router()` that `create_router`
//! nests under `/api`. Handlers log the request, build a domain command,
//! call the service and map the outcome through `ApiError`.

pub mod balance_apis;
pub mod bill_apis;
pub mod error;
pub mod mappers;
pub mod session;
pub mod split_apis;
pub mod task_apis;

pub use error::ApiError;
