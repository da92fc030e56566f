use crate::core::attributes::{
    Attribute, AttributeContainer, AttributeHandle, AttributeKind, Consumer, Producer,
};
use crate::core::error::CouplingError;
use crate::core::types::{AttributeRef, ComponentId, ContainerKey};
use crate::core::values::ValueType;
use log::trace;
use std::collections::HashMap;
use std::sync::Arc;

struct ContainerEntry {
    container: Arc<dyn AttributeContainer>,
    producers: Vec<Producer>,
    consumers: Vec<Consumer>,
}

impl ContainerEntry {
    fn discover(key: &ContainerKey, container: Arc<dyn AttributeContainer>) -> Self {
        let mut producers = Vec::new();
        let mut consumers = Vec::new();
        for spec in container.attributes() {
            let handle = AttributeHandle::new(key.clone(), Arc::clone(&container), spec.clone());
            match spec.kind() {
                AttributeKind::Producer => producers.push(Producer::new(handle)),
                AttributeKind::Consumer => consumers.push(Consumer::new(handle)),
            }
        }
        Self {
            container,
            producers,
            consumers,
        }
    }
}

/// Index of discovered producers and consumers.
///
/// Containers are discovered once, the first time they are registered, and
/// their endpoints are served from the index afterwards. Everything here is
/// derived from live components and can be rebuilt from scratch.
#[derive(Default)]
pub struct CouplingCache {
    containers: HashMap<ContainerKey, ContainerEntry>,
    // Registration order, used by every listing
    order: Vec<ContainerKey>,
    producers_by_type: HashMap<ValueType, Vec<AttributeRef>>,
    consumers_by_type: HashMap<ValueType, Vec<AttributeRef>>,
}

impl CouplingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a container, discovering its endpoints if it is new
    pub fn register_container(
        &mut self,
        component: &ComponentId,
        container: Arc<dyn AttributeContainer>,
    ) -> ContainerKey {
        let key = component.container(container.container_id());
        if self.containers.contains_key(&key) {
            return key;
        }

        let entry = ContainerEntry::discover(&key, container);
        for producer in &entry.producers {
            self.producers_by_type
                .entry(producer.value_type())
                .or_default()
                .push(producer.id().clone());
        }
        for consumer in &entry.consumers {
            self.consumers_by_type
                .entry(consumer.value_type())
                .or_default()
                .push(consumer.id().clone());
        }
        trace!(
            "Discovered {} producers and {} consumers on {}",
            entry.producers.len(),
            entry.consumers.len(),
            key
        );
        self.containers.insert(key.clone(), entry);
        self.order.push(key.clone());
        key
    }

    pub fn contains_container(&self, key: &ContainerKey) -> bool {
        self.containers.contains_key(key)
    }

    /// Drop a container and all of its endpoints. Returns false if unknown.
    pub fn remove_container(&mut self, key: &ContainerKey) -> bool {
        if self.containers.remove(key).is_none() {
            return false;
        }
        self.order.retain(|k| k != key);
        for refs in self
            .producers_by_type
            .values_mut()
            .chain(self.consumers_by_type.values_mut())
        {
            refs.retain(|r| r.container() != key);
        }
        self.producers_by_type.retain(|_, refs| !refs.is_empty());
        self.consumers_by_type.retain(|_, refs| !refs.is_empty());
        true
    }

    /// Drop every container of a component, returning the removed keys
    pub fn remove_component(&mut self, component: &ComponentId) -> Vec<ContainerKey> {
        let keys = self.container_keys(component);
        for key in &keys {
            self.remove_container(key);
        }
        keys
    }

    /// Keys of a component's registered containers, in registration order
    pub fn container_keys(&self, component: &ComponentId) -> Vec<ContainerKey> {
        self.order
            .iter()
            .filter(|key| key.component() == component)
            .cloned()
            .collect()
    }

    pub fn container(&self, key: &ContainerKey) -> Option<&Arc<dyn AttributeContainer>> {
        self.containers.get(key).map(|entry| &entry.container)
    }

    pub fn producers_in(&self, key: &ContainerKey) -> Vec<Producer> {
        self.containers
            .get(key)
            .map(|entry| entry.producers.clone())
            .unwrap_or_default()
    }

    pub fn consumers_in(&self, key: &ContainerKey) -> Vec<Consumer> {
        self.containers
            .get(key)
            .map(|entry| entry.consumers.clone())
            .unwrap_or_default()
    }

    pub fn producers(&self, component: &ComponentId) -> Vec<Producer> {
        self.entries_of(component)
            .flat_map(|entry| entry.producers.iter().cloned())
            .collect()
    }

    pub fn consumers(&self, component: &ComponentId) -> Vec<Consumer> {
        self.entries_of(component)
            .flat_map(|entry| entry.consumers.iter().cloned())
            .collect()
    }

    pub fn all_producers(&self) -> Vec<Producer> {
        self.entries()
            .flat_map(|entry| entry.producers.iter().cloned())
            .collect()
    }

    pub fn all_consumers(&self) -> Vec<Consumer> {
        self.entries()
            .flat_map(|entry| entry.consumers.iter().cloned())
            .collect()
    }

    pub fn producer(&self, id: &AttributeRef) -> Option<Producer> {
        let entry = self.containers.get(id.container())?;
        entry
            .producers
            .iter()
            .find(|p| p.name() == id.attribute())
            .cloned()
    }

    pub fn consumer(&self, id: &AttributeRef) -> Option<Consumer> {
        let entry = self.containers.get(id.container())?;
        entry
            .consumers
            .iter()
            .find(|c| c.name() == id.attribute())
            .cloned()
    }

    pub fn producer_by_name(&self, key: &ContainerKey, name: &str) -> Result<Producer, CouplingError> {
        let entry = self
            .containers
            .get(key)
            .ok_or_else(|| CouplingError::no_such_attribute(key.to_string(), name))?;
        entry
            .producers
            .iter()
            .find(|p| p.name() == name)
            .cloned()
            .ok_or_else(|| CouplingError::NoSuchAttribute {
                container: key.to_string(),
                attribute: name.to_string(),
                available: entry.producers.iter().map(|p| p.name().to_string()).collect(),
            })
    }

    pub fn consumer_by_name(&self, key: &ContainerKey, name: &str) -> Result<Consumer, CouplingError> {
        let entry = self
            .containers
            .get(key)
            .ok_or_else(|| CouplingError::no_such_attribute(key.to_string(), name))?;
        entry
            .consumers
            .iter()
            .find(|c| c.name() == name)
            .cloned()
            .ok_or_else(|| CouplingError::NoSuchAttribute {
                container: key.to_string(),
                attribute: name.to_string(),
                available: entry.consumers.iter().map(|c| c.name().to_string()).collect(),
            })
    }

    /// Producers whose value type is `value_type`
    pub fn producers_of_type(&self, value_type: ValueType) -> Vec<Producer> {
        self.producers_by_type
            .get(&value_type)
            .map(|refs| refs.iter().filter_map(|r| self.producer(r)).collect())
            .unwrap_or_default()
    }

    /// Consumers whose value type is `value_type`
    pub fn consumers_of_type(&self, value_type: ValueType) -> Vec<Consumer> {
        self.consumers_by_type
            .get(&value_type)
            .map(|refs| refs.iter().filter_map(|r| self.consumer(r)).collect())
            .unwrap_or_default()
    }

    /// Override an endpoint's visibility
    pub fn set_visible(&mut self, id: &AttributeRef, visible: bool) -> Result<(), CouplingError> {
        let entry = self
            .containers
            .get_mut(id.container())
            .ok_or_else(|| CouplingError::no_such_attribute(id.container().to_string(), id.attribute()))?;

        let found = match id.kind() {
            AttributeKind::Producer => entry
                .producers
                .iter_mut()
                .find(|p| p.name() == id.attribute())
                .map(|slot| *slot = slot.clone().with_visibility(visible)),
            AttributeKind::Consumer => entry
                .consumers
                .iter_mut()
                .find(|c| c.name() == id.attribute())
                .map(|slot| *slot = slot.clone().with_visibility(visible)),
        };
        found.ok_or_else(|| CouplingError::no_such_attribute(id.container().to_string(), id.attribute()))
    }

    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    pub fn clear(&mut self) {
        self.containers.clear();
        self.order.clear();
        self.producers_by_type.clear();
        self.consumers_by_type.clear();
    }

    fn entries(&self) -> impl Iterator<Item = &ContainerEntry> {
        self.order
            .iter()
            .filter_map(move |key| self.containers.get(key))
    }

    fn entries_of<'a>(
        &'a self,
        component: &'a ComponentId,
    ) -> impl Iterator<Item = &'a ContainerEntry> + 'a {
        self.order
            .iter()
            .filter(move |key| key.component() == component)
            .filter_map(move |key| self.containers.get(key))
    }
}

impl std::fmt::Debug for CouplingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CouplingCache")
            .field("containers", &self.order)
            .finish()
    }
}
