pub mod attribute;
pub mod container;
pub mod spec;
pub mod variables;

// Re-export commonly used types
pub use attribute::{Attribute, AttributeHandle, Consumer, Producer};
pub use container::AttributeContainer;
pub use spec::{AttributeKind, AttributeSpec};
pub use variables::VariableContainer;
