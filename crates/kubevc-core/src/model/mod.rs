pub mod change_set;
pub mod dashboard;
pub mod event;
pub mod keys;
pub mod metadata;

pub use change_set::ManifestChangeSet;
pub use dashboard::DashboardEntry;
pub use event::CommitEvent;
pub use keys::{SnapshotIdentity, SnapshotKeys};
pub use metadata::SnapshotMetadata;
