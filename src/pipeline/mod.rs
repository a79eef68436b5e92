//! Pipeline components: per-run context, discovery, worker pool, writer, shutdown.
//!
//! discovery → Task Queue (bounded) → W workers → Result Queue (bounded) → one writer

pub mod context;
pub mod error_handler;
pub mod orchestrator;
pub mod walk;
pub mod worker;
pub mod writer;

pub use context::{
    PipelineChannels, PipelineContext, PipelineHandles, PipelineTuning, SharedPathErrors,
    create_pipeline_channels,
};
pub use error_handler::check_for_initial_error_or_failures;
pub use orchestrator::{PipelineOutcome, run_pipeline, shutdown_pipeline};
pub use walk::{WalkOutcome, run_walk_loop, spawn_walk_thread, to_outcome_jwalk, to_outcome_walkdir};
pub use worker::spawn_workers;
pub use writer::{WriteStats, spawn_writer, write_results};
