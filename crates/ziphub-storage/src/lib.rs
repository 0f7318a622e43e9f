//! # ziphub-storage
//!
//! Object-store backends for ZipHub: an S3-compatible client (AWS S3,
//! Cloudflare R2, MinIO) and an in-memory store for tests.

pub mod memory;
pub mod mime;
pub mod s3;

pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;
