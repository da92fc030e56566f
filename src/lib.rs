pub mod core;

// Re-export commonly used types
pub use crate::core::attributes::{
    Attribute, AttributeContainer, AttributeKind, AttributeSpec, Consumer, Producer,
    VariableContainer,
};
pub use crate::core::components::{share, ComponentInstance, SharedComponent, WorkspaceComponent};
pub use crate::core::couplings::{ArchivedCoupling, Coupling, CouplingEvent, CouplingManager};
pub use crate::core::error::{ComponentError, CouplingError, WorkspaceError, WorkspaceResult};
pub use crate::core::events::{UpdaterEvent, WorkspaceEvent};
pub use crate::core::execution::{
    ConcurrencyMode, ErrorPolicy, UpdateAction, UpdateContext, UpdateManager, UpdaterState,
    WorkspaceConfig,
};
pub use crate::core::types::{AttributeRef, ComponentId, ContainerKey};
pub use crate::core::values::{TypedValue, ValueType};
pub use crate::core::workspace::{Workspace, WorkspaceState};
