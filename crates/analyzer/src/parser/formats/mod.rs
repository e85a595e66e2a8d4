//! Format-specific parsers.
//!
//! Each parser owns one wire shape. Anything a parser does not claim falls
//! through to [`GenericParser`], which never rejects a non-empty line.

pub mod container;
pub mod generic;
pub mod jsonl;
pub mod orchestrator;
pub mod runtime;
pub(crate) mod scan;
pub mod syslog;
pub mod web;

pub use container::DockerParser;
pub use generic::GenericParser;
pub use jsonl::JsonlParser;
pub use orchestrator::KubernetesParser;
pub use runtime::{JavaParser, PythonParser};
pub use syslog::SyslogParser;
pub use web::{ApacheAccessParser, ApacheErrorParser};
