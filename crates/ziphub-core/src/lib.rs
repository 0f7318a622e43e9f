//! # ziphub-core
//!
//! Core crate for ZipHub. Contains the `ObjectStore` trait, configuration
//! schemas, the bucket key-space conventions, the batch manifest type, and
//! the unified error system.
//!
//! This crate has **no** internal dependencies on other ZipHub crates.

pub mod config;
pub mod error;
pub mod keyspace;
pub mod manifest;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
