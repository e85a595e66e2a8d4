// Domain-driven module structure for the log analyzer.

// Core infrastructure
pub mod config;
pub mod error;
pub mod parser;

// Domain modules
pub mod correlate;
pub mod api;
