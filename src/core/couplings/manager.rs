use crate::core::attributes::{Attribute, Consumer, Producer};
use crate::core::components::ComponentInstance;
use crate::core::couplings::cache::CouplingCache;
use crate::core::couplings::coupling::{ArchivedCoupling, Coupling};
use crate::core::couplings::events::CouplingEvent;
use crate::core::couplings::validator::CouplingValidator;
use crate::core::error::CouplingError;
use crate::core::events::Listeners;
use crate::core::types::{AttributeRef, ComponentId, ContainerKey};
use log::debug;

/// Owns every coupling in a workspace and the endpoint index behind them.
///
/// Only components that have been tracked may take part in couplings, and
/// untracking a component purges everything that referenced it.
#[derive(Default)]
pub struct CouplingManager {
    // Insertion order is update order
    couplings: Vec<Coupling>,
    cache: CouplingCache,
    components: Vec<ComponentInstance>,
    listeners: Listeners<CouplingEvent>,
}

impl CouplingManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a component and discover its containers
    pub fn track_component(&mut self, instance: ComponentInstance) {
        let id = instance.id.clone();
        if !self.is_tracked(&id) {
            self.components.push(instance);
        }
        self.refresh(&id);
    }

    /// Stop tracking a component, purging its couplings and cache entries
    pub fn untrack_component(&mut self, component: &ComponentId) -> Vec<Coupling> {
        let removed = self.take_couplings(|c| c.involves_component(component));
        self.cache.remove_component(component);
        self.components.retain(|instance| &instance.id != component);
        debug!(
            "Untracked {}, removing {} couplings",
            component,
            removed.len()
        );
        self.fire_removed(&removed);
        removed
    }

    pub fn is_tracked(&self, component: &ComponentId) -> bool {
        self.components.iter().any(|instance| &instance.id == component)
    }

    pub fn tracked_components(&self) -> Vec<ComponentId> {
        self.components.iter().map(|instance| instance.id.clone()).collect()
    }

    /// Re-read a component's containers: discover new ones, purge vanished ones
    pub fn refresh(&mut self, component: &ComponentId) {
        let Some(instance) = self
            .components
            .iter()
            .find(|instance| &instance.id == component)
            .cloned()
        else {
            return;
        };

        let containers = instance.lock().attribute_containers();
        let mut live = Vec::with_capacity(containers.len());
        for container in containers {
            live.push(self.cache.register_container(component, container));
        }

        for key in self.cache.container_keys(component) {
            if !live.contains(&key) {
                self.remove_attribute_container(&key);
            }
        }
    }

    pub fn refresh_all(&mut self) {
        for id in self.tracked_components() {
            self.refresh(&id);
        }
    }

    /// Read-only view of the endpoint index
    pub fn cache(&self) -> &CouplingCache {
        &self.cache
    }

    pub fn producers(&mut self, component: &ComponentId) -> Vec<Producer> {
        self.refresh(component);
        self.cache.producers(component)
    }

    pub fn consumers(&mut self, component: &ComponentId) -> Vec<Consumer> {
        self.refresh(component);
        self.cache.consumers(component)
    }

    pub fn producer(&self, id: &AttributeRef) -> Option<Producer> {
        self.cache.producer(id)
    }

    pub fn consumer(&self, id: &AttributeRef) -> Option<Consumer> {
        self.cache.consumer(id)
    }

    pub fn producer_by_name(
        &mut self,
        container: &ContainerKey,
        name: &str,
    ) -> Result<Producer, CouplingError> {
        self.refresh(container.component());
        self.cache.producer_by_name(container, name)
    }

    pub fn consumer_by_name(
        &mut self,
        container: &ContainerKey,
        name: &str,
    ) -> Result<Consumer, CouplingError> {
        self.refresh(container.component());
        self.cache.consumer_by_name(container, name)
    }

    /// Every producer that could feed `consumer`
    pub fn compatible_producers(&self, consumer: &Consumer) -> Vec<Producer> {
        self.cache.producers_of_type(consumer.value_type())
    }

    /// Every consumer that `producer` could feed
    pub fn compatible_consumers(&self, producer: &Producer) -> Vec<Consumer> {
        self.cache.consumers_of_type(producer.value_type())
    }

    /// Visible producers of one component that could feed `consumer`
    pub fn compatible_producers_in(
        &mut self,
        consumer: &Consumer,
        component: &ComponentId,
    ) -> Vec<Producer> {
        self.producers(component)
            .into_iter()
            .filter(|p| p.is_visible() && p.value_type() == consumer.value_type())
            .collect()
    }

    /// Visible consumers of one component that `producer` could feed
    pub fn compatible_consumers_in(
        &mut self,
        producer: &Producer,
        component: &ComponentId,
    ) -> Vec<Consumer> {
        self.consumers(component)
            .into_iter()
            .filter(|c| c.is_visible() && c.value_type() == producer.value_type())
            .collect()
    }

    pub fn visible_producers(&mut self) -> Vec<Producer> {
        self.refresh_all();
        self.cache
            .all_producers()
            .into_iter()
            .filter(|p| p.is_visible())
            .collect()
    }

    pub fn visible_consumers(&mut self) -> Vec<Consumer> {
        self.refresh_all();
        self.cache
            .all_consumers()
            .into_iter()
            .filter(|c| c.is_visible())
            .collect()
    }

    pub fn visible_producers_of(&mut self, component: &ComponentId) -> Vec<Producer> {
        self.producers(component)
            .into_iter()
            .filter(|p| p.is_visible())
            .collect()
    }

    pub fn visible_consumers_of(&mut self, component: &ComponentId) -> Vec<Consumer> {
        self.consumers(component)
            .into_iter()
            .filter(|c| c.is_visible())
            .collect()
    }

    /// Show or hide an endpoint in visible views
    pub fn set_visible(&mut self, attribute: &AttributeRef, visible: bool) -> Result<(), CouplingError> {
        self.cache.set_visible(attribute, visible)?;
        self.listeners.fire(&CouplingEvent::VisibilityChanged {
            attribute: attribute.clone(),
            visible,
        });
        Ok(())
    }

    /// Couple a producer to a consumer.
    ///
    /// Creating a coupling equal to an existing one returns the existing one.
    ///
    /// # Arguments
    /// * `producer` - Source endpoint, as handed out by this manager
    /// * `consumer` - Target endpoint, as handed out by this manager
    ///
    /// # Returns
    /// The new or existing coupling
    ///
    /// # Errors
    /// * `MismatchedType` if the value types differ
    /// * `ComponentNotFound` if either owning component is not tracked
    /// * `NoSuchAttribute` if an endpoint is stale: its container was retired,
    ///   or its component was removed and the name reused
    pub fn create_coupling(
        &mut self,
        producer: Producer,
        consumer: Consumer,
    ) -> Result<Coupling, CouplingError> {
        let coupling = Coupling::new(producer, consumer)?;
        self.validate_live(&coupling)?;
        Ok(self.insert(coupling))
    }

    /// Couple every producer to every consumer.
    ///
    /// All pairs are checked before any coupling is created, so a mismatch
    /// leaves the manager unchanged.
    ///
    /// # Returns
    /// One coupling per (producer, consumer) pair, producers outermost
    pub fn create_one_to_many_couplings(
        &mut self,
        producers: &[Producer],
        consumers: &[Consumer],
    ) -> Result<Vec<Coupling>, CouplingError> {
        CouplingValidator::validate_cross_product(producers, consumers)?;
        let mut pending = Vec::with_capacity(producers.len() * consumers.len());
        for producer in producers {
            for consumer in consumers {
                pending.push(Coupling::new(producer.clone(), consumer.clone())?);
            }
        }
        self.insert_all(pending)
    }

    /// Couple producers and consumers pairwise by position.
    ///
    /// Stops at the shorter list; leftovers stay unpaired.
    pub fn create_one_to_one_couplings(
        &mut self,
        producers: &[Producer],
        consumers: &[Consumer],
    ) -> Result<Vec<Coupling>, CouplingError> {
        CouplingValidator::validate_positional(producers, consumers)?;
        let pending = producers
            .iter()
            .zip(consumers)
            .map(|(p, c)| Coupling::new(p.clone(), c.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        self.insert_all(pending)
    }

    /// Couple the best type-matched pair between two containers.
    ///
    /// The pair with the highest combined preference wins; ties go to the
    /// earliest declared producer, then consumer.
    ///
    /// # Arguments
    /// * `producing` - Container to take the producer from
    /// * `consuming` - Container to take the consumer from
    ///
    /// # Errors
    /// `NoCompatibleAttributes` if no producer and consumer share a type
    pub fn couple_containers(
        &mut self,
        producing: &ContainerKey,
        consuming: &ContainerKey,
    ) -> Result<Coupling, CouplingError> {
        let coupling = self.best_pair(producing, consuming)?;
        self.validate_live(&coupling)?;
        Ok(self.insert(coupling))
    }

    /// Auto-couple containers pairwise by position
    pub fn couple_containers_one_to_one(
        &mut self,
        producing: &[ContainerKey],
        consuming: &[ContainerKey],
    ) -> Result<Vec<Coupling>, CouplingError> {
        let pending = producing
            .iter()
            .zip(consuming)
            .map(|(p, c)| self.best_pair(p, c))
            .collect::<Result<Vec<_>, _>>()?;
        self.insert_all(pending)
    }

    /// Remove one coupling. Returns false if it was not present.
    pub fn remove_coupling(&mut self, coupling: &Coupling) -> bool {
        let Some(index) = self.couplings.iter().position(|c| c == coupling) else {
            return false;
        };
        let removed = self.couplings.remove(index);
        debug!("Removed coupling {}", removed.id());
        self.listeners.fire(&CouplingEvent::CouplingRemoved(removed));
        true
    }

    /// Remove several couplings with a single notification
    pub fn remove_couplings(&mut self, couplings: &[Coupling]) -> Vec<Coupling> {
        let removed = self.take_couplings(|c| couplings.contains(c));
        self.fire_removed(&removed);
        removed
    }

    /// Purge a retired container's endpoints and couplings
    pub fn remove_attribute_container(&mut self, container: &ContainerKey) -> Vec<Coupling> {
        let removed = self.take_couplings(|c| c.involves_container(container));
        if self.cache.remove_container(container) {
            debug!("Retired container {}", container);
        }
        self.fire_removed(&removed);
        removed
    }

    /// Propagate every coupling in insertion order, stopping at the first failure
    pub fn update_couplings(&self) -> Result<(), CouplingError> {
        for coupling in &self.couplings {
            coupling.update()?;
        }
        Ok(())
    }

    /// Propagate only the given couplings, in the given order
    pub fn update_coupling_subset(&self, couplings: &[Coupling]) -> Result<(), CouplingError> {
        for coupling in couplings {
            coupling.update()?;
        }
        Ok(())
    }

    /// Find a coupling by id, ignoring case
    pub fn coupling(&self, id: &str) -> Option<&Coupling> {
        self.couplings
            .iter()
            .find(|c| c.id().eq_ignore_ascii_case(id))
    }

    pub fn couplings(&self) -> &[Coupling] {
        &self.couplings
    }

    /// Couplings with an endpoint on `component`
    pub fn couplings_of(&self, component: &ComponentId) -> Vec<Coupling> {
        self.couplings
            .iter()
            .filter(|c| c.involves_component(component))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.couplings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.couplings.is_empty()
    }

    /// Endpoint ids of every coupling, in update order
    pub fn archive(&self) -> Vec<ArchivedCoupling> {
        self.couplings.iter().map(Coupling::archive).collect()
    }

    /// Re-create archived couplings against the tracked components
    ///
    /// # Errors
    /// `NoSuchAttribute` for the first endpoint that no longer exists;
    /// couplings restored before it stay in place
    pub fn restore(&mut self, archived: &[ArchivedCoupling]) -> Result<Vec<Coupling>, CouplingError> {
        self.refresh_all();
        let mut restored = Vec::with_capacity(archived.len());
        for entry in archived {
            let producer = self
                .cache
                .producer_by_name(entry.producer.container(), entry.producer.attribute())?;
            let consumer = self
                .cache
                .consumer_by_name(entry.consumer.container(), entry.consumer.attribute())?;
            restored.push(self.create_coupling(producer, consumer)?);
        }
        Ok(restored)
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&CouplingEvent) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener);
    }

    fn best_pair(
        &mut self,
        producing: &ContainerKey,
        consuming: &ContainerKey,
    ) -> Result<Coupling, CouplingError> {
        self.refresh(producing.component());
        self.refresh(consuming.component());

        let producers = self.cache.producers_in(producing);
        let consumers = self.cache.consumers_in(consuming);
        let mut best: Option<(i32, &Producer, &Consumer)> = None;
        for producer in &producers {
            for consumer in &consumers {
                if producer.value_type() != consumer.value_type() {
                    continue;
                }
                let score = producer.preference() + consumer.preference();
                if best.map_or(true, |(top, _, _)| score > top) {
                    best = Some((score, producer, consumer));
                }
            }
        }

        match best {
            Some((_, producer, consumer)) => Coupling::new(producer.clone(), consumer.clone()),
            None => Err(CouplingError::NoCompatibleAttributes {
                producer: producing.to_string(),
                consumer: consuming.to_string(),
            }),
        }
    }

    fn validate_live(&self, coupling: &Coupling) -> Result<(), CouplingError> {
        let producer = coupling.producer();
        CouplingValidator::validate_live(
            producer,
            self.is_tracked(producer.component_id()),
            self.cache.producer(producer.id()).as_ref(),
        )?;
        let consumer = coupling.consumer();
        CouplingValidator::validate_live(
            consumer,
            self.is_tracked(consumer.component_id()),
            self.cache.consumer(consumer.id()).as_ref(),
        )
    }

    fn insert(&mut self, coupling: Coupling) -> Coupling {
        if let Some(existing) = self.couplings.iter().find(|c| **c == coupling) {
            return existing.clone();
        }
        debug!("Added coupling {}", coupling.id());
        self.couplings.push(coupling.clone());
        self.listeners
            .fire(&CouplingEvent::CouplingAdded(coupling.clone()));
        coupling
    }

    fn insert_all(&mut self, pending: Vec<Coupling>) -> Result<Vec<Coupling>, CouplingError> {
        for coupling in &pending {
            self.validate_live(coupling)?;
        }
        Ok(pending.into_iter().map(|c| self.insert(c)).collect())
    }

    fn take_couplings(&mut self, predicate: impl Fn(&Coupling) -> bool) -> Vec<Coupling> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.couplings)
            .into_iter()
            .partition(|c| predicate(c));
        self.couplings = kept;
        removed
    }

    fn fire_removed(&self, removed: &[Coupling]) {
        if !removed.is_empty() {
            self.listeners
                .fire(&CouplingEvent::CouplingsRemoved(removed.to_vec()));
        }
    }
}

impl std::fmt::Debug for CouplingManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CouplingManager")
            .field("couplings", &self.couplings.len())
            .field("components", &self.components.len())
            .field("cache", &self.cache)
            .finish()
    }
}
