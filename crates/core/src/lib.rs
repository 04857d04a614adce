//! Domain layer for the annotation table editor.
//!
//! Holds the in-memory CSV table, the payload validation for edits, and
//! the owned [`store::TableStore`] that the HTTP layer shares between
//! requests. Nothing in here knows about HTTP.

pub mod annotation;
pub mod error;
pub mod persist;
pub mod store;
pub mod table;
pub mod types;
pub mod upload;
