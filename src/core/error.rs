//! Error types for coupling, component and workspace operations.

use thiserror::Error;

/// Errors raised by the attribute and coupling layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CouplingError {
    /// Producer and consumer value types differ
    #[error("cannot couple {producer} ({producer_type}) to {consumer} ({consumer_type}): mismatched types")]
    MismatchedType {
        producer: String,
        consumer: String,
        producer_type: &'static str,
        consumer_type: &'static str,
    },

    /// A named producer/consumer lookup failed on a container
    #[error("no such attribute '{attribute}' on container '{container}'; available: {available:?}")]
    NoSuchAttribute {
        container: String,
        attribute: String,
        available: Vec<String>,
    },

    /// Auto-coupling found no type-matched pair between two containers
    #[error("no compatible attributes between '{producer}' and '{consumer}'")]
    NoCompatibleAttributes { producer: String, consumer: String },

    /// The endpoint's owning component is not part of the workspace
    #[error("component '{0}' is not part of the workspace")]
    ComponentNotFound(String),

    /// A value did not carry the type its attribute declares
    #[error("value type mismatch: expected {expected}, found {found}")]
    ValueTypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The container failed to read or write the member
    #[error("attribute access failed: {0}")]
    Access(String),
}

impl CouplingError {
    /// Creates a lookup failure without a list of alternatives.
    #[must_use]
    pub fn no_such_attribute<C: Into<String>, A: Into<String>>(container: C, attribute: A) -> Self {
        Self::NoSuchAttribute {
            container: container.into(),
            attribute: attribute.into(),
            available: Vec::new(),
        }
    }

    /// Creates an access error.
    #[must_use]
    pub fn access<S: Into<String>>(msg: S) -> Self {
        Self::Access(msg.into())
    }
}

/// Errors reported by a component's own update.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    #[error("update failed: {0}")]
    Update(String),

    #[error(transparent)]
    Coupling(#[from] CouplingError),
}

impl ComponentError {
    #[must_use]
    pub fn update<S: Into<String>>(msg: S) -> Self {
        Self::Update(msg.into())
    }
}

/// Main error type for workspace operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error(transparent)]
    Coupling(#[from] CouplingError),

    #[error("component '{component}' failed: {source}")]
    Component {
        component: String,
        #[source]
        source: ComponentError,
    },

    #[error("update action '{action}' failed: {source}")]
    Action {
        action: String,
        #[source]
        source: Box<WorkspaceError>,
    },

    #[error("component '{0}' not found")]
    ComponentNotFound(String),

    #[error("a component named '{0}' already exists")]
    DuplicateComponent(String),

    #[error("no update action named '{0}'")]
    NoSuchAction(String),

    #[error("update action '{0}' cannot be removed")]
    ActionNotRemovable(String),

    /// The updater is already running or iterating
    #[error("workspace updater is busy")]
    Busy,

    #[error("scheduler error: {0}")]
    Scheduler(String),
}

/// Result type alias for workspace operations.
pub type WorkspaceResult<T> = std::result::Result<T, WorkspaceError>;

impl WorkspaceError {
    /// Wraps a component failure with the component's name.
    #[must_use]
    pub fn component<S: Into<String>>(component: S, source: ComponentError) -> Self {
        Self::Component {
            component: component.into(),
            source,
        }
    }

    /// Wraps a failure with the name of the update action it happened in.
    #[must_use]
    pub fn in_action<S: Into<String>>(self, action: S) -> Self {
        Self::Action {
            action: action.into(),
            source: Box::new(self),
        }
    }

    #[must_use]
    pub fn scheduler<S: Into<String>>(msg: S) -> Self {
        Self::Scheduler(msg.into())
    }
}
