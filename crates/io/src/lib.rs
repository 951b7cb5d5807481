//! Read-only file access for large binary documents.
pub mod mmap;
