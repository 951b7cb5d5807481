//! Virtualized, page-addressable access to byte sequences.
//!
//! A [`source::PageSource`] adapts one backing representation (a byte buffer,
//! a mapped file, a numeric array, a debugger value rendered as text, ...) to
//! a fixed-size page contract. [`paged::PagedBinaryData`] sits on top of one
//! source and turns page requests into arbitrary byte-range reads.
pub mod cache;
pub mod errors;
pub mod paged;
pub mod source;

pub use errors::{MathError, PageError, PageResult};
pub use paged::PagedBinaryData;
pub use source::{PAGE_SIZE, PageSource};
