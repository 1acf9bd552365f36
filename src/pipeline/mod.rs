// Request progress monitoring
// Tracks and optionally persists progress of separation requests

pub mod trace;

pub use trace::{read_trace_file, ProgressTracker, TraceEntry, TraceError, TraceWriter};
