//! One open binary document.
//!
//! - [`document::Document`] binds a page source to an undo history and turns
//!   edit intents (typing, deleting, overwriting, moving a selection) into
//!   history commands.
//! - [`config::SessionConfig`] carries the page and history limits a
//!   document is opened with.
pub mod config;
pub mod document;
pub mod errors;

pub use config::SessionConfig;
pub use document::{ContentChange, Document};
pub use errors::{DocumentError, DocumentResult};
