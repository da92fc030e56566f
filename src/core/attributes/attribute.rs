use crate::core::attributes::container::AttributeContainer;
use crate::core::attributes::spec::{AttributeKind, AttributeSpec};
use crate::core::error::CouplingError;
use crate::core::types::{AttributeRef, ComponentId, ContainerKey};
use crate::core::values::{TypedValue, ValueType};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A bound reference to one member of an attribute container
#[derive(Clone)]
pub struct AttributeHandle {
    key: AttributeRef,
    container: Arc<dyn AttributeContainer>,
    spec: AttributeSpec,
    visible: bool,
}

impl AttributeHandle {
    pub(crate) fn new(
        container_key: ContainerKey,
        container: Arc<dyn AttributeContainer>,
        spec: AttributeSpec,
    ) -> Self {
        let key = AttributeRef::new(container_key, spec.name(), spec.kind());
        let visible = spec.is_visible();
        Self {
            key,
            container,
            spec,
            visible,
        }
    }
}

impl std::fmt::Debug for AttributeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeHandle")
            .field("key", &self.key)
            .field("value_type", &self.spec.value_type().name())
            .field("visible", &self.visible)
            .finish()
    }
}

/// Accessors shared by [`Producer`] and [`Consumer`]
pub trait Attribute {
    fn handle(&self) -> &AttributeHandle;

    /// Structural identity of this endpoint
    fn id(&self) -> &AttributeRef {
        &self.handle().key
    }

    fn name(&self) -> &str {
        self.handle().spec.name()
    }

    fn kind(&self) -> AttributeKind {
        self.handle().spec.kind()
    }

    fn value_type(&self) -> ValueType {
        self.handle().spec.value_type()
    }

    fn description(&self) -> &str {
        self.handle().spec.description()
    }

    fn is_visible(&self) -> bool {
        self.handle().visible
    }

    fn preference(&self) -> i32 {
        self.handle().spec.preference()
    }

    fn component_id(&self) -> &ComponentId {
        self.handle().key.component()
    }

    fn container_key(&self) -> &ContainerKey {
        self.handle().key.container()
    }

    fn container(&self) -> &Arc<dyn AttributeContainer> {
        &self.handle().container
    }
}

macro_rules! endpoint_identity {
    ($endpoint:ident) => {
        impl Attribute for $endpoint {
            fn handle(&self) -> &AttributeHandle {
                &self.handle
            }
        }

        impl PartialEq for $endpoint {
            fn eq(&self, other: &Self) -> bool {
                self.handle.key == other.handle.key
            }
        }

        impl Eq for $endpoint {}

        impl Hash for $endpoint {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.handle.key.hash(state);
            }
        }

        impl std::fmt::Display for $endpoint {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{} ({})", self.handle.key, self.handle.spec.value_type())
            }
        }

        impl $endpoint {
            pub(crate) fn new(handle: AttributeHandle) -> Self {
                Self { handle }
            }

            pub(crate) fn with_visibility(mut self, visible: bool) -> Self {
                self.handle.visible = visible;
                self
            }
        }
    };
}

/// Handle that reads one member of a container
#[derive(Clone, Debug)]
pub struct Producer {
    handle: AttributeHandle,
}

endpoint_identity!(Producer);

impl Producer {
    /// Read the member's current value
    pub fn value(&self) -> Result<TypedValue, CouplingError> {
        let value = self.handle.container.produce(self.name())?;
        if value.value_type() != self.value_type() {
            return Err(CouplingError::ValueTypeMismatch {
                expected: self.value_type().name(),
                found: value.type_name(),
            });
        }
        Ok(value)
    }
}

/// Handle that writes one member of a container
#[derive(Clone, Debug)]
pub struct Consumer {
    handle: AttributeHandle,
}

endpoint_identity!(Consumer);

impl Consumer {
    /// Hand an owned value to the member
    pub fn set_value(&self, value: TypedValue) -> Result<(), CouplingError> {
        if value.value_type() != self.value_type() {
            return Err(CouplingError::ValueTypeMismatch {
                expected: self.value_type().name(),
                found: value.type_name(),
            });
        }
        self.handle.container.consume(self.name(), value)
    }
}
