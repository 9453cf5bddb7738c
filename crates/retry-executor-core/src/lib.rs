//! Core infrastructure for retry-executor.
//!
//! This crate holds the observability plumbing the executor reports through:
//! - [`ExecutionEvent`], the trait every emitted event implements
//! - [`EventListener`] and the [`EventListeners`] fan-out collection
//! - [`FnListener`] for closure-based sinks
//! - [`RecordingListener`] for capturing events in tests and diagnostics

pub mod events;

pub use events::{EventListener, EventListeners, ExecutionEvent, FnListener, RecordingListener};
