//! Vidcourse API Library
//!
//! This crate provides the HTTP front end of the streaming service: handlers,
//! middleware, error rendering and application setup.

mod api_doc;
pub mod constants;
mod handlers;
mod middleware;
pub mod setup;
mod telemetry;

pub mod error;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
