//! Shared types and models for the Bakery Back Office
//!
//! This crate contains the request models, validation rules and the pure
//! recipe costing engine shared between the backend and the WASM module.

pub mod costing;
pub mod models;
pub mod types;
pub mod validation;

pub use costing::*;
pub use models::*;
pub use types::*;
pub use validation::*;
