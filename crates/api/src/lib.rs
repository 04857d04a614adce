//! Annotation editor API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes and
//! the assembled application) so integration tests and the binary
//! entrypoint share one router.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;
