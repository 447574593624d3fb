//! Business logic for each defect operation.
//!
//! Commands take the collection plus plain Rust arguments and return plain
//! Rust types. They know nothing about HTTP; status codes are derived from
//! the returned [`crate::error::DefectError`] at the boundary.

pub mod create;
pub mod get;
pub mod list;
pub mod update;
