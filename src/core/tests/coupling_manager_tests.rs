use super::fixtures::{init_logging, Holder, Rejecting, Sink, Source};
use crate::core::attributes::{Attribute, AttributeContainer, AttributeSpec, VariableContainer};
use crate::core::components::{share, ComponentInstance, WorkspaceComponent};
use crate::core::couplings::{ArchivedCoupling, CouplingEvent, CouplingManager};
use crate::core::error::CouplingError;
use crate::core::types::ComponentId;
use std::sync::{Arc, Mutex};

fn track<C: WorkspaceComponent + 'static>(
    manager: &mut CouplingManager,
    name: &str,
    component: C,
) -> ComponentId {
    let id = ComponentId::new(name, component.kind());
    manager.track_component(ComponentInstance::new(id.clone(), share(component)));
    id
}

fn holder(kind: &str, container: VariableContainer) -> Holder {
    Holder::new(kind, vec![Arc::new(container) as Arc<dyn AttributeContainer>])
}

fn record_events(manager: &mut CouplingManager) -> Arc<Mutex<Vec<CouplingEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    manager.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    events
}

#[test]
fn test_create_coupling_requires_matching_types() {
    init_logging();
    let mut manager = CouplingManager::new();
    let source = track(&mut manager, "Source 1", Source::new());
    let text = track(
        &mut manager,
        "Text 1",
        holder("Text", VariableContainer::new("text").with_consumer("line", String::new())),
    );

    let producer = manager.producers(&source).remove(0);
    let consumer = manager.consumers(&text).remove(0);
    let result = manager.create_coupling(producer, consumer);

    assert!(matches!(result, Err(CouplingError::MismatchedType { .. })));
    assert!(manager.is_empty());
}

#[test]
fn test_duplicate_coupling_is_returned_not_added() {
    let mut manager = CouplingManager::new();
    let source = track(&mut manager, "Source 1", Source::new());
    let sink = track(&mut manager, "Sink 1", Sink::new());
    let producer = manager.producers(&source).remove(0);
    let consumer = manager.consumers(&sink).remove(0);

    let first = manager
        .create_coupling(producer.clone(), consumer.clone())
        .unwrap();
    let second = manager.create_coupling(producer, consumer).unwrap();

    assert_eq!(first, second);
    assert_eq!(manager.len(), 1);
    assert_eq!(
        first.id(),
        "Source 1/source.value > Sink 1/sink.input"
    );
}

#[test]
fn test_untracked_endpoint_is_rejected() {
    let mut manager = CouplingManager::new();
    let source = track(&mut manager, "Source 1", Source::new());
    let sink = track(&mut manager, "Sink 1", Sink::new());
    let producer = manager.producers(&source).remove(0);
    let consumer = manager.consumers(&sink).remove(0);

    manager.untrack_component(&sink);
    let result = manager.create_coupling(producer, consumer);
    assert_eq!(
        result,
        Err(CouplingError::ComponentNotFound("Sink 1".to_string()))
    );
}

#[test]
fn test_one_to_many_creates_cross_product() {
    let mut manager = CouplingManager::new();
    let a = track(&mut manager, "Source 1", Source::new());
    let b = track(&mut manager, "Source 2", Source::new());
    let c = track(&mut manager, "Sink 1", Sink::new());
    let d = track(&mut manager, "Sink 2", Sink::new());

    let producers = [manager.producers(&a), manager.producers(&b)].concat();
    let consumers = [manager.consumers(&c), manager.consumers(&d)].concat();
    let created = manager
        .create_one_to_many_couplings(&producers, &consumers)
        .unwrap();

    assert_eq!(created.len(), 4);
    assert_eq!(manager.len(), 4);
}

#[test]
fn test_one_to_one_stops_at_shorter_list() {
    let mut manager = CouplingManager::new();
    let sources: Vec<ComponentId> = (1..=3)
        .map(|n| track(&mut manager, &format!("Source {}", n), Source::new()))
        .collect();
    let sinks: Vec<ComponentId> = (1..=2)
        .map(|n| track(&mut manager, &format!("Sink {}", n), Sink::new()))
        .collect();

    let producers: Vec<_> = sources
        .iter()
        .flat_map(|id| manager.producers(id))
        .collect();
    let consumers: Vec<_> = sinks.iter().flat_map(|id| manager.consumers(id)).collect();
    let created = manager
        .create_one_to_one_couplings(&producers, &consumers)
        .unwrap();

    assert_eq!(created.len(), 2);
    assert_eq!(created[1].producer().component_id(), &sources[1]);
    assert_eq!(created[1].consumer().component_id(), &sinks[1]);
}

#[test]
fn test_bulk_creation_is_all_or_nothing() {
    let mut manager = CouplingManager::new();
    let source = track(&mut manager, "Source 1", Source::new());
    let sink = track(&mut manager, "Sink 1", Sink::new());
    let text = track(
        &mut manager,
        "Text 1",
        holder("Text", VariableContainer::new("text").with_consumer("line", String::new())),
    );

    let producers = manager.producers(&source);
    let consumers = [manager.consumers(&sink), manager.consumers(&text)].concat();
    let result = manager.create_one_to_many_couplings(&producers, &consumers);

    assert!(matches!(result, Err(CouplingError::MismatchedType { .. })));
    assert!(manager.is_empty());
}

#[test]
fn test_couple_containers_prefers_highest_preference() {
    let mut manager = CouplingManager::new();
    let network = track(
        &mut manager,
        "Network 1",
        holder(
            "Network",
            VariableContainer::new("neuron")
                .with_producer("bias", 0.0_f64)
                .with_attribute(
                    AttributeSpec::producer::<f64>("activation").with_preference(10),
                    0.0_f64,
                ),
        ),
    );
    let world = track(
        &mut manager,
        "World 1",
        holder(
            "World",
            VariableContainer::new("effector")
                .with_consumer("amount", 0.0_f64)
                .with_consumer("label", String::new()),
        ),
    );

    let coupling = manager
        .couple_containers(&network.container("neuron"), &world.container("effector"))
        .unwrap();
    assert_eq!(coupling.producer().name(), "activation");
    assert_eq!(coupling.consumer().name(), "amount");
}

#[test]
fn test_couple_containers_without_match_fails() {
    let mut manager = CouplingManager::new();
    let source = track(&mut manager, "Source 1", Source::new());
    let text = track(
        &mut manager,
        "Text 1",
        holder("Text", VariableContainer::new("text").with_consumer("line", String::new())),
    );

    let result = manager.couple_containers(&source.container("source"), &text.container("text"));
    assert!(matches!(
        result,
        Err(CouplingError::NoCompatibleAttributes { .. })
    ));
}

#[test]
fn test_untrack_purges_couplings_and_views() {
    let mut manager = CouplingManager::new();
    let source = track(&mut manager, "Source 1", Source::new());
    let sink = track(&mut manager, "Sink 1", Sink::new());
    manager
        .couple_containers(&source.container("source"), &sink.container("sink"))
        .unwrap();
    let events = record_events(&mut manager);

    let removed = manager.untrack_component(&source);

    assert_eq!(removed.len(), 1);
    assert!(manager.is_empty());
    assert!(manager.couplings_of(&source).is_empty());
    assert!(manager
        .visible_producers()
        .iter()
        .all(|p| p.component_id() != &source));
    assert!(manager.cache().producers(&source).is_empty());

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], CouplingEvent::CouplingsRemoved(list) if list.len() == 1));
}

#[test]
fn test_remove_couplings_fires_once() {
    let mut manager = CouplingManager::new();
    let a = track(&mut manager, "Source 1", Source::new());
    let b = track(&mut manager, "Sink 1", Sink::new());
    let c = track(&mut manager, "Sink 2", Sink::new());
    let producers = manager.producers(&a);
    let consumers = [manager.consumers(&b), manager.consumers(&c)].concat();
    let created = manager
        .create_one_to_many_couplings(&producers, &consumers)
        .unwrap();
    let events = record_events(&mut manager);

    let removed = manager.remove_couplings(&created);

    assert_eq!(removed.len(), 2);
    assert_eq!(events.lock().unwrap().len(), 1);
    assert!(!manager.remove_coupling(&created[0]));
}

#[test]
fn test_vanished_container_is_purged_on_refresh() {
    let mut manager = CouplingManager::new();
    let network = Holder::new(
        "Network",
        vec![
            Arc::new(VariableContainer::new("n1").with_producer("activation", 0.0_f64))
                as Arc<dyn AttributeContainer>,
            Arc::new(VariableContainer::new("n2").with_producer("activation", 0.0_f64)),
        ],
    );
    let containers = Arc::clone(&network.containers);
    let network = track(&mut manager, "Network 1", network);
    let sink = track(&mut manager, "Sink 1", Sink::new());
    manager
        .couple_containers(&network.container("n2"), &sink.container("sink"))
        .unwrap();

    containers.lock().unwrap().pop();
    let producers = manager.producers(&network);

    assert_eq!(producers.len(), 1);
    assert!(manager.is_empty());
    assert!(!manager.cache().contains_container(&network.container("n2")));
}

#[test]
fn test_retired_container_is_purged() {
    let mut manager = CouplingManager::new();
    let source = track(&mut manager, "Source 1", Source::new());
    let sink = track(&mut manager, "Sink 1", Sink::new());
    manager
        .couple_containers(&source.container("source"), &sink.container("sink"))
        .unwrap();

    let removed = manager.remove_attribute_container(&sink.container("sink"));
    assert_eq!(removed.len(), 1);
    assert!(manager.cache().consumers(&sink).is_empty());
}

#[test]
fn test_visibility_filters_views() {
    let mut manager = CouplingManager::new();
    let source = track(&mut manager, "Source 1", Source::new());
    let sink = track(&mut manager, "Sink 1", Sink::new());
    let events = record_events(&mut manager);
    let value = source.container("source").producer("value");

    manager.set_visible(&value, false).unwrap();

    let consumer = manager.consumers(&sink).remove(0);
    assert!(manager.visible_producers_of(&source).is_empty());
    assert!(manager.compatible_producers_in(&consumer, &source).is_empty());
    // Hidden endpoints remain couplable
    assert_eq!(manager.compatible_producers(&consumer).len(), 1);
    assert_eq!(
        events.lock().unwrap().as_slice(),
        &[CouplingEvent::VisibilityChanged {
            attribute: value,
            visible: false
        }]
    );
}

#[test]
fn test_compatible_endpoints_follow_type() {
    let mut manager = CouplingManager::new();
    let source = track(&mut manager, "Source 1", Source::new());
    track(&mut manager, "Sink 1", Sink::new());
    track(
        &mut manager,
        "Text 1",
        holder("Text", VariableContainer::new("text").with_consumer("line", String::new())),
    );

    let producer = manager.producers(&source).remove(0);
    let consumers = manager.compatible_consumers(&producer);
    assert_eq!(consumers.len(), 1);
    assert_eq!(consumers[0].name(), "input");
}

#[test]
fn test_lookup_by_name_reports_alternatives() {
    let mut manager = CouplingManager::new();
    let source = track(&mut manager, "Source 1", Source::new());

    match manager.producer_by_name(&source.container("source"), "missing") {
        Err(CouplingError::NoSuchAttribute { available, .. }) => {
            assert_eq!(available, vec!["value".to_string()]);
        }
        other => panic!("expected NoSuchAttribute, got {:?}", other),
    }
}

#[test]
fn test_coupling_lookup_ignores_case() {
    let mut manager = CouplingManager::new();
    let source = track(&mut manager, "Source 1", Source::new());
    let sink = track(&mut manager, "Sink 1", Sink::new());
    let coupling = manager
        .couple_containers(&source.container("source"), &sink.container("sink"))
        .unwrap();

    let found = manager.coupling("source 1/SOURCE.value > sink 1/sink.INPUT");
    assert_eq!(found, Some(&coupling));
}

#[test]
fn test_update_couplings_propagates_owned_values() {
    let mut manager = CouplingManager::new();
    let source = Source::new();
    let source_container = source.container();
    let sink = Sink::new();
    let sink_container = sink.container();
    let source = track(&mut manager, "Source 1", source);
    let sink = track(&mut manager, "Sink 1", sink);
    manager
        .couple_containers(&source.container("source"), &sink.container("sink"))
        .unwrap();

    source_container.set("value", 4.5_f64).unwrap();
    manager.update_couplings().unwrap();
    assert_eq!(sink_container.get::<f64>("input").unwrap(), 4.5);

    // Later producer writes do not leak into the consumer
    source_container.set("value", 9.0_f64).unwrap();
    assert_eq!(sink_container.get::<f64>("input").unwrap(), 4.5);
}

#[test]
fn test_update_couplings_stops_at_first_failure() {
    let mut manager = CouplingManager::new();
    let source = Source::new();
    let source_container = source.container();
    let source = track(&mut manager, "Source 1", source);
    let rejecting = track(
        &mut manager,
        "Rejecting 1",
        Holder::new("Rejecting", vec![Arc::new(Rejecting) as Arc<dyn AttributeContainer>]),
    );
    let sink = Sink::new();
    let sink_container = sink.container();
    let sink = track(&mut manager, "Sink 1", sink);
    let producers = manager.producers(&source);
    let consumers = [manager.consumers(&rejecting), manager.consumers(&sink)].concat();
    manager
        .create_one_to_many_couplings(&producers, &consumers)
        .unwrap();

    source_container.set("value", 3.0_f64).unwrap();
    let result = manager.update_couplings();

    assert_eq!(result, Err(CouplingError::access("write refused")));
    assert_eq!(sink_container.get::<f64>("input").unwrap(), 0.0);

    // The healthy coupling still works on its own
    let healthy = manager.couplings_of(&sink);
    manager.update_coupling_subset(&healthy).unwrap();
    assert_eq!(sink_container.get::<f64>("input").unwrap(), 3.0);
}

#[test]
fn test_archive_and_restore() {
    let source = Source::new();
    let sink = Sink::new();
    let source_shared = share(source);
    let sink_shared = share(sink);
    let source_id = ComponentId::new("Source 1", "Source");
    let sink_id = ComponentId::new("Sink 1", "Sink");

    let mut original = CouplingManager::new();
    original.track_component(ComponentInstance::new(source_id.clone(), source_shared.clone()));
    original.track_component(ComponentInstance::new(sink_id.clone(), sink_shared.clone()));
    original
        .couple_containers(&source_id.container("source"), &sink_id.container("sink"))
        .unwrap();

    let json = serde_json::to_string(&original.archive()).unwrap();
    let archived: Vec<ArchivedCoupling> = serde_json::from_str(&json).unwrap();

    let mut restored = CouplingManager::new();
    restored.track_component(ComponentInstance::new(source_id, source_shared));
    restored.track_component(ComponentInstance::new(sink_id, sink_shared));
    let couplings = restored.restore(&archived).unwrap();

    assert_eq!(couplings, original.couplings());
    assert_eq!(restored.archive(), archived);
}

#[test]
fn test_endpoint_of_removed_component_is_rejected_after_name_reuse() {
    let mut manager = CouplingManager::new();
    let receiver = Sink::new();
    let input = receiver.container();
    let sink = track(&mut manager, "Sink 1", receiver);
    let first = track(
        &mut manager,
        "Network 2",
        holder("Network", VariableContainer::new("neuron").with_producer("out", 111.0_f64)),
    );
    let stale = manager.producers(&first).remove(0);
    manager.untrack_component(&first);

    let second = track(
        &mut manager,
        "Network 2",
        holder("Network", VariableContainer::new("neuron").with_producer("out", 222.0_f64)),
    );
    assert_eq!(first, second);
    let consumer = manager.consumers(&sink).remove(0);

    let result = manager.create_coupling(stale, consumer.clone());
    assert!(matches!(result, Err(CouplingError::NoSuchAttribute { .. })));
    assert!(manager.is_empty());

    let live = manager.producers(&second).remove(0);
    manager.create_coupling(live, consumer).unwrap();
    manager.update_couplings().unwrap();
    assert_eq!(input.get::<f64>("input").unwrap(), 222.0);
}

#[test]
fn test_endpoint_of_retired_container_is_rejected() {
    let mut manager = CouplingManager::new();
    let source = track(&mut manager, "Source 1", Source::new());
    let sink = track(&mut manager, "Sink 1", Sink::new());
    let producer = manager.producers(&source).remove(0);
    let consumer = manager.consumers(&sink).remove(0);

    manager.remove_attribute_container(&sink.container("sink"));
    let result = manager.create_coupling(producer, consumer);

    assert!(matches!(result, Err(CouplingError::NoSuchAttribute { .. })));
    assert!(manager.is_empty());
}
