use crate::core::attributes::AttributeKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Component identifier: the component's workspace name plus its kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId {
    pub(crate) id: String,
    pub(crate) module_type: String,
}

impl ComponentId {
    /// Create a new component ID
    pub fn new(id: impl Into<String>, module_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            module_type: module_type.into(),
        }
    }

    /// Get the component name
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the component kind
    pub fn module_type(&self) -> &str {
        &self.module_type
    }

    /// Key for one of this component's attribute containers
    pub fn container(&self, container_id: &str) -> ContainerKey {
        ContainerKey {
            component: self.clone(),
            container_id: container_id.to_string(),
        }
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Identity of an attribute container: owning component plus the container's own id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerKey {
    pub(crate) component: ComponentId,
    pub(crate) container_id: String,
}

impl ContainerKey {
    pub fn new(component: ComponentId, container_id: impl Into<String>) -> Self {
        Self {
            component,
            container_id: container_id.into(),
        }
    }

    pub fn component(&self) -> &ComponentId {
        &self.component
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// Reference to a producer on this container
    pub fn producer(&self, attribute: &str) -> AttributeRef {
        AttributeRef::new(self.clone(), attribute, AttributeKind::Producer)
    }

    /// Reference to a consumer on this container
    pub fn consumer(&self, attribute: &str) -> AttributeRef {
        AttributeRef::new(self.clone(), attribute, AttributeKind::Consumer)
    }
}

impl std::fmt::Display for ContainerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.component, self.container_id)
    }
}

/// Structural identity of a producer or consumer.
///
/// A producer and a consumer on the same container may share a name; the kind
/// keeps them apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeRef {
    pub(crate) container: ContainerKey,
    pub(crate) attribute: String,
    pub(crate) kind: AttributeKind,
}

impl AttributeRef {
    pub fn new(container: ContainerKey, attribute: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            container,
            attribute: attribute.into(),
            kind,
        }
    }

    pub fn container(&self) -> &ContainerKey {
        &self.container
    }

    pub fn component(&self) -> &ComponentId {
        &self.container.component
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn kind(&self) -> AttributeKind {
        self.kind
    }
}

impl std::fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.container, self.attribute)
    }
}

/// Generate a fresh container id such as `neuron_9f3c...`
pub fn generate_container_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_ref_display() {
        let component = ComponentId::new("Network 1", "Network");
        let key = component.container("neuron_1");
        assert_eq!(key.producer("activation").to_string(), "Network 1/neuron_1.activation");
    }

    #[test]
    fn test_producer_and_consumer_refs_differ() {
        let key = ComponentId::new("Network 1", "Network").container("neuron_1");
        assert_ne!(key.producer("activation"), key.consumer("activation"));
    }

    #[test]
    fn test_generated_container_ids_are_unique() {
        let a = generate_container_id("sensor");
        let b = generate_container_id("sensor");
        assert!(a.starts_with("sensor_"));
        assert_ne!(a, b);
    }
}
