//! # IO Module
//!
//! Interface layer between HTTP clients and the domain logic.
//!
//! Translates JSON requests into domain commands, attaches the caller's
//! session, and turns domain results and errors into HTTP responses. No
//! business rule lives here.
//!
//! ## Supported Operations
//!
//! - **POST /api/splits/preview**: Compute a split without saving it
//! - **GET/POST /api/bills**: List and create bills
//! - **GET /api/bills/:bill_id**: Fetch one bill
//! - **POST /api/bills/:bill_id/shares/:member_id/settle**: Mark a share paid
//! - **GET /api/balances**: Outstanding balances per member
//! - **POST /api/tasks/assign**: Random round-robin chore assignment

pub mod rest;
