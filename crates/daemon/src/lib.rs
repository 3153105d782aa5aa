pub mod config;
pub mod daemon;
pub mod poller;
pub mod reconcile;
pub mod rescan;
pub mod resolver;
pub mod show_updater;
pub mod storage;

pub use config::{ConfigError, DaemonConfig};
pub use daemon::{Daemon, feeds_from_config};
pub use reconcile::{Blackholes, Outcome, ReconcileError, Reconciler};
pub use resolver::{ResolveError, Resolution, ShowResolver};
pub use storage::{FsStorage, Storage, StorageError};
