use crate::core::attributes::{Attribute, Consumer, Producer};
use crate::core::error::CouplingError;
use std::sync::Arc;

/// Centralized coupling validation logic
pub struct CouplingValidator;

impl CouplingValidator {
    /// Validate that a producer and consumer carry the same value type
    pub fn validate_types(producer: &Producer, consumer: &Consumer) -> Result<(), CouplingError> {
        if producer.value_type() != consumer.value_type() {
            return Err(CouplingError::MismatchedType {
                producer: producer.id().to_string(),
                consumer: consumer.id().to_string(),
                producer_type: producer.value_type().name(),
                consumer_type: consumer.value_type().name(),
            });
        }
        Ok(())
    }

    /// Validate every producer against every consumer, reporting the first mismatch
    pub fn validate_cross_product(
        producers: &[Producer],
        consumers: &[Consumer],
    ) -> Result<(), CouplingError> {
        for producer in producers {
            for consumer in consumers {
                Self::validate_types(producer, consumer)?;
            }
        }
        Ok(())
    }

    /// Validate positional pairs up to the shorter list, reporting the first mismatch
    pub fn validate_positional(
        producers: &[Producer],
        consumers: &[Consumer],
    ) -> Result<(), CouplingError> {
        for (producer, consumer) in producers.iter().zip(consumers) {
            Self::validate_types(producer, consumer)?;
        }
        Ok(())
    }

    /// Check that an endpoint belongs to a tracked component and is the one
    /// the index currently holds under its id.
    ///
    /// Names are reused once a component is removed, so an endpoint kept
    /// from a removed component (or a retired container) can carry the id of
    /// a live one. Comparing the container handle tells the two apart.
    pub fn validate_live<A: Attribute>(
        endpoint: &A,
        tracked: bool,
        live: Option<&A>,
    ) -> Result<(), CouplingError> {
        if !tracked {
            return Err(CouplingError::ComponentNotFound(
                endpoint.component_id().id().to_string(),
            ));
        }
        match live {
            Some(current) if Arc::ptr_eq(current.container(), endpoint.container()) => Ok(()),
            _ => Err(CouplingError::no_such_attribute(
                endpoint.container_key().to_string(),
                endpoint.name(),
            )),
        }
    }
}
