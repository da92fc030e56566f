pub mod config;
pub mod context;
pub mod update_action;
pub mod update_manager;
pub mod updater;

// Re-export commonly used types
pub use config::{ConcurrencyMode, ErrorPolicy, WorkspaceConfig};
pub use context::UpdateContext;
pub use update_action::{ActionBody, ActionKind, UpdateAction};
pub use update_manager::UpdateManager;
pub use updater::{FinishedCallback, StepPredicate, Updater, UpdaterState};
