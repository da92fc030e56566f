pub mod instance;
pub mod naming;
pub mod traits;

pub use instance::{share, ComponentInstance, SharedComponent};
pub use naming::default_name;
pub use traits::WorkspaceComponent;
