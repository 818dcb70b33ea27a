pub mod environment;
pub mod persister;
pub mod reducer;
pub mod replay;
pub mod seed;
pub mod snapshot_service;
pub mod store;
pub mod views;

pub use environment::{Environment, SequentialEnvironment, SystemEnvironment};
pub use persister::SnapshotPersister;
pub use reducer::{apply, try_apply};
pub use replay::{ReplaySession, ReplayStats};
pub use snapshot_service::{SnapshotService, SnapshotSummary};
pub use store::ProjectStore;
