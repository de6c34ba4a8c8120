//! KubeVC Engine - orchestration layer
//!
//! Coordinates the renderer and the blob store:
//! - `pipeline`: one webhook delivery in, one stored snapshot (or a reason why not) out
//! - `dashboard`: rebuilds the snapshot history purely from store listings

pub mod dashboard;
pub mod pipeline;

pub use dashboard::{EntryOrdering, StateReconstructor};
pub use pipeline::{PipelineOutcome, PipelineResult, SnapshotPipeline, StoredSnapshot};
