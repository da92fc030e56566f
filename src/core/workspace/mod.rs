pub(crate) mod shared;
pub mod workspace;

pub use workspace::{Workspace, WorkspaceState};
