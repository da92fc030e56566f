//! A 1D sensor world and a two-neuron network driving each other through couplings

use log::info;
use simweave::{
    AttributeContainer, AttributeSpec, ComponentError, UpdaterEvent, VariableContainer, Workspace,
    WorkspaceComponent,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// An agent on a line that smells a food source at the origin
struct SensorWorld {
    agent: Arc<VariableContainer>,
    position: f64,
}

impl SensorWorld {
    fn new(position: f64) -> Self {
        let agent = VariableContainer::new("agent")
            .with_attribute(
                AttributeSpec::producer::<f64>("smell")
                    .with_description("Odor intensity at the agent")
                    .with_preference(1),
                0.0_f64,
            )
            .with_consumer("velocity", 0.0_f64);
        Self {
            agent: Arc::new(agent),
            position,
        }
    }
}

impl WorkspaceComponent for SensorWorld {
    fn kind(&self) -> &str {
        "World"
    }

    fn attribute_containers(&self) -> Vec<Arc<dyn AttributeContainer>> {
        vec![self.agent.clone() as Arc<dyn AttributeContainer>]
    }

    fn update(&mut self) -> Result<(), ComponentError> {
        let velocity: f64 = self.agent.get("velocity")?;
        self.position += velocity;
        self.agent.set("smell", 1.0 / (1.0 + self.position.abs()))?;
        Ok(())
    }
}

/// Sensor neuron feeding a motor neuron through one weight
struct Network {
    sensor: Arc<VariableContainer>,
    motor: Arc<VariableContainer>,
    weight: f64,
}

impl Network {
    fn new(weight: f64) -> Self {
        Self {
            sensor: Arc::new(VariableContainer::new("sensor_neuron").with_consumer("input", 0.0_f64)),
            motor: Arc::new(VariableContainer::new("motor_neuron").with_producer("activation", 0.0_f64)),
            weight,
        }
    }
}

impl WorkspaceComponent for Network {
    fn kind(&self) -> &str {
        "Network"
    }

    fn attribute_containers(&self) -> Vec<Arc<dyn AttributeContainer>> {
        vec![
            self.sensor.clone() as Arc<dyn AttributeContainer>,
            self.motor.clone() as Arc<dyn AttributeContainer>,
        ]
    }

    fn update(&mut self) -> Result<(), ComponentError> {
        let input: f64 = self.sensor.get("input")?;
        // Move toward stronger smell, slower as it saturates
        self.motor.set("activation", -self.weight * (1.0 - input))?;
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let workspace = Workspace::new();
    let world = workspace.add_component(SensorWorld::new(8.0))?;
    let network = workspace.add_component(Network::new(0.5))?;

    {
        let mut couplings = workspace.coupling_manager();
        couplings.couple_containers(&world.container("agent"), &network.container("sensor_neuron"))?;
        couplings.couple_containers(&network.container("motor_neuron"), &world.container("agent"))?;
        for coupling in couplings.couplings() {
            info!("Coupled {}", coupling);
        }
    }

    workspace.subscribe_updater(|event| {
        if let UpdaterEvent::StepCompleted { time } = event {
            if time % 10 == 0 {
                info!("Completed step {}", time);
            }
        }
    });

    let time = workspace.iterate_n(20)?;
    println!("Iterated to time {}", time);

    workspace.run()?;
    thread::sleep(Duration::from_millis(50));
    workspace.stop()?;
    println!("Ran and stopped at time {}", workspace.time());

    let agent = workspace
        .coupling_manager()
        .producer(&world.container("agent").producer("smell"))
        .ok_or("agent smell producer missing")?;
    println!("Final smell: {:?}", agent.value()?.get::<f64>()?);

    workspace.clear_workspace()?;
    Ok(())
}
