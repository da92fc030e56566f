use crate::core::attributes::{Attribute, Consumer, Producer};
use crate::core::couplings::validator::CouplingValidator;
use crate::core::error::CouplingError;
use crate::core::types::{AttributeRef, ComponentId, ContainerKey};
use crate::core::values::ValueType;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Typed, directional data-flow edge from one producer to one consumer.
///
/// Immutable once built. Equality is structural: two couplings are equal when
/// both endpoints are equal.
#[derive(Clone, Debug)]
pub struct Coupling {
    producer: Producer,
    consumer: Consumer,
}

impl Coupling {
    /// Couple a producer to a consumer of the same value type
    pub fn new(producer: Producer, consumer: Consumer) -> Result<Self, CouplingError> {
        CouplingValidator::validate_types(&producer, &consumer)?;
        Ok(Self { producer, consumer })
    }

    /// Id of the form `<producer ref> > <consumer ref>`
    pub fn id(&self) -> String {
        format!("{} > {}", self.producer.id(), self.consumer.id())
    }

    pub fn producer(&self) -> &Producer {
        &self.producer
    }

    pub fn consumer(&self) -> &Consumer {
        &self.consumer
    }

    pub fn value_type(&self) -> ValueType {
        self.producer.value_type()
    }

    /// Read the producer and hand the owned value to the consumer
    pub fn update(&self) -> Result<(), CouplingError> {
        let value = self.producer.value()?;
        self.consumer.set_value(value)
    }

    pub fn involves_component(&self, component: &ComponentId) -> bool {
        self.producer.component_id() == component || self.consumer.component_id() == component
    }

    pub fn involves_container(&self, container: &ContainerKey) -> bool {
        self.producer.container_key() == container || self.consumer.container_key() == container
    }

    /// Endpoint ids for persistence
    pub fn archive(&self) -> ArchivedCoupling {
        ArchivedCoupling {
            producer: self.producer.id().clone(),
            consumer: self.consumer.id().clone(),
        }
    }
}

impl PartialEq for Coupling {
    fn eq(&self, other: &Self) -> bool {
        self.producer == other.producer && self.consumer == other.consumer
    }
}

impl Eq for Coupling {}

impl Hash for Coupling {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.producer.hash(state);
        self.consumer.hash(state);
    }
}

impl std::fmt::Display for Coupling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.producer, self.consumer)
    }
}

/// Serializable endpoint ids of a coupling
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArchivedCoupling {
    pub producer: AttributeRef,
    pub consumer: AttributeRef,
}
