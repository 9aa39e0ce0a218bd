#![deny(missing_docs)]

//! Core library for the Student Directory HTTP service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Student records, validation, and the in-memory store.
pub mod directory;
/// Structured logging and tracing setup.
pub mod logging;
/// Generated OpenAPI description.
pub mod openapi;
