//! Reusable recipes for building systems by type name.

mod registry;

pub use registry::BlueprintRegistry;

use crate::{
    components::{Circuit, Device, DeviceLogic, Endpoint, System, SystemData},
    configuration::RuntimeConfig,
    errors::SimResult,
};

/// An internal system of a circuit blueprint: the type to build and the
/// local name to add it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalReference {
    pub ty: String,
    pub alias: String,
}

impl InternalReference {
    pub fn new<T: Into<String>, A: Into<String>>(ty: T, alias: A) -> Self {
        Self {
            ty: ty.into(),
            alias: alias.into(),
        }
    }
}

/// One connection to replay when building a circuit blueprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEntry {
    pub source: Endpoint,
    pub source_bus: usize,
    pub target: Endpoint,
    pub target_bus: usize,
}

impl ConnectionEntry {
    pub fn new(
        source: Endpoint,
        source_bus: usize,
        target: Endpoint,
        target_bus: usize,
    ) -> Self {
        Self {
            source,
            source_bus,
            target,
            target_bus,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceBlueprint {
    data: SystemData,
    logic: DeviceLogic,
}

impl DeviceBlueprint {
    pub fn new(data: SystemData, logic: DeviceLogic) -> Self {
        Self { data, logic }
    }

    pub fn data(&self) -> &SystemData {
        &self.data
    }

    pub fn logic(&self) -> DeviceLogic {
        self.logic
    }

    fn build(&self) -> SimResult<Device> {
        Device::new(&self.data, self.logic)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBlueprint {
    data: SystemData,
    internals: Vec<InternalReference>,
    connections: Vec<ConnectionEntry>,
}

impl CircuitBlueprint {
    pub fn new(
        data: SystemData,
        internals: Vec<InternalReference>,
        connections: Vec<ConnectionEntry>,
    ) -> Self {
        Self {
            data,
            internals,
            connections,
        }
    }

    pub fn data(&self) -> &SystemData {
        &self.data
    }

    pub fn internals(&self) -> &[InternalReference] {
        &self.internals
    }

    pub fn connections(&self) -> &[ConnectionEntry] {
        &self.connections
    }

    /// An empty circuit with this blueprint's boundary. Internal systems are
    /// added by the registry.
    fn shell(&self, config: RuntimeConfig) -> SimResult<Circuit> {
        Circuit::new(&self.data, config)
    }
}

/// A named recipe for a system type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Blueprint {
    Device(DeviceBlueprint),
    Circuit(CircuitBlueprint),
}

impl Blueprint {
    pub fn type_name(&self) -> &str {
        &self.data().type_name
    }

    /// Capture a wired prototype. Internal systems of a circuit are recorded
    /// by type, so building the result needs those types registered too.
    pub fn from_system(system: &System) -> Self {
        match system {
            System::Device(device) => Blueprint::Device(DeviceBlueprint::new(
                SystemData::describe(device.io()),
                device.logic(),
            )),
            System::Circuit(circuit) => {
                let internals = circuit
                    .internal_systems()
                    .map(|(alias, internal)| {
                        InternalReference::new(internal.type_name(), alias)
                    })
                    .collect();
                let connections = circuit
                    .connections()
                    .map(|(source, source_bus, target, target_bus)| {
                        ConnectionEntry::new(
                            source.clone(),
                            source_bus,
                            target.clone(),
                            target_bus,
                        )
                    })
                    .collect();
                Blueprint::Circuit(CircuitBlueprint::new(
                    SystemData::describe(circuit.io()),
                    internals,
                    connections,
                ))
            }
        }
    }

    pub fn data(&self) -> &SystemData {
        match self {
            Blueprint::Device(device) => &device.data,
            Blueprint::Circuit(circuit) => &circuit.data,
        }
    }

    /// Whether both blueprints build systems which differ only in identity.
    /// Omitted construction data counts as its default.
    pub fn same_recipe(&self, other: &Blueprint) -> bool {
        let same_shape = match (self, other) {
            (Blueprint::Device(a), Blueprint::Device(b)) => a.logic == b.logic,
            (Blueprint::Circuit(a), Blueprint::Circuit(b)) => {
                a.internals == b.internals && a.connections == b.connections
            }
            _ => false,
        };
        same_shape && self.data().normalized() == other.data().normalized()
    }

    /// The types this blueprint builds directly.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        let internals: &[InternalReference] = match self {
            Blueprint::Device(_) => &[],
            Blueprint::Circuit(circuit) => &circuit.internals,
        };
        internals.iter().map(|reference| reference.ty.as_str())
    }
}

impl From<DeviceBlueprint> for Blueprint {
    fn from(value: DeviceBlueprint) -> Self {
        Self::Device(value)
    }
}

impl From<CircuitBlueprint> for Blueprint {
    fn from(value: CircuitBlueprint) -> Self {
        Self::Circuit(value)
    }
}
