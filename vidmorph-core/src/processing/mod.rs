//! Variant generation and batch orchestration.
//!
//! This module organizes the processing steps above the transform catalog
//! into submodules and exposes the primary functions for running them.

/// Batch driver: numbering, per-input preparation and fallbacks
pub mod batch;

/// Pipeline orchestrator for a single randomised variant
pub mod pipeline;

/// Job status state machine and the terminal result contract
pub mod status;

pub use batch::{BatchJob, BatchReport, NumberedOutputs, run_batch};
pub use pipeline::{PipelinePlan, execute_plan, generate_unique_variant, plan_variant};
pub use status::{JobResult, JobStatus, JobTracker};
