// THEORY:
// This file is the main entry point for the `sign_vision` library crate.
// It exposes the `GesturePipeline` and its associated data structures
// (`PipelineConfig`, `Report`, `StabilizedGestureEvent`, etc.) as the high-level
// interface for hosts that feed hand-landmark frames from a tracker.
//
// The rule cascade, finger-state extraction, and stabilizer live under
// `core_modules` and stay usable on their own for callers that want just one
// layer. `session` wraps the pipeline in a tokio task for asynchronous hosts, and
// `poses` builds synthetic hands for demos and tests.

pub mod core_modules;
pub mod pipeline;
pub mod poses;
pub mod session;
