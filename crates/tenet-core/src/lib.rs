//! Core library for tenet: compliance artifacts in, queryable graph out.
//!
//! One invocation runs loader → validator → graph builder, producing an
//! immutable [`graph::Snapshot`] plus accumulated diagnostics. The integrity
//! checker, report engine, and document generator are independent read-only
//! consumers of that snapshot.

pub mod config;
pub mod diagnostic;
pub mod document;
pub mod errors;
pub mod graph;
pub mod integrity;
pub mod loader;
pub mod model;
pub mod report;
pub mod validate;

pub use diagnostic::{Diagnostic, Severity};
pub use graph::{Build, Snapshot};
