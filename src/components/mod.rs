//! The systems a simulation is built from.
//!
//! Every system is either a [`Device`], an atomic leaf, or a [`Circuit`]
//! which owns further systems. Both share a [`BusIo`] block, so everything
//! about addressing, wiring, and reading outputs goes through one code path
//! and only the update step differs.

mod bus_io;
mod circuit;
mod device;
mod gates;
pub mod single_output;

pub use bus_io::{BusIo, BusValues};
pub use circuit::{Circuit, Endpoint};
pub use device::{Device, DeviceLogic, SWITCH_TYPE};
pub use gates::{Gate, GateKind};

use bon::Builder;

use crate::{
    errors::{SimError, SimResult},
    identity::SystemId,
    structures::{alias::default_alias, connection::OutputPointer},
};

/// Whether committing an update changed a system's outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    Unchanged,
    Changed,
}

impl From<bool> for UpdateStatus {
    fn from(value: bool) -> Self {
        if value {
            Self::Changed
        } else {
            Self::Unchanged
        }
    }
}

impl UpdateStatus {
    /// Returns `true` if the update status is [`Changed`][].
    ///
    /// [`Changed`]: UpdateStatus::Changed
    #[must_use]
    pub fn as_bool(&self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Construction data for a single system as produced by a design front-end.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct SystemData {
    #[builder(into)]
    pub type_name: String,
    pub num_inputs: usize,
    pub num_outputs: usize,
    /// Output values before the first update. All low when omitted.
    pub initial_state: Option<Vec<bool>>,
    /// One alias per input bus. Defaults to `"1"` through `"n"`.
    pub input_aliases: Option<Vec<String>>,
    /// One alias per output bus. Defaults to `"1"` through `"n"`.
    pub output_aliases: Option<Vec<String>>,
}

impl SystemData {
    /// The same data with every omitted field replaced by its default, so
    /// that two descriptions of one system compare equal.
    pub fn normalized(&self) -> Self {
        let defaults = |count: usize| -> Vec<String> {
            (0..count).map(default_alias).collect()
        };
        Self {
            type_name: self.type_name.clone(),
            num_inputs: self.num_inputs,
            num_outputs: self.num_outputs,
            initial_state: Some(
                self.initial_state
                    .clone()
                    .unwrap_or_else(|| vec![false; self.num_outputs]),
            ),
            input_aliases: Some(
                self.input_aliases
                    .clone()
                    .unwrap_or_else(|| defaults(self.num_inputs)),
            ),
            output_aliases: Some(
                self.output_aliases
                    .clone()
                    .unwrap_or_else(|| defaults(self.num_outputs)),
            ),
        }
    }

    /// Capture the construction data `io` corresponds to, with every alias
    /// spelled out.
    pub fn describe(io: &BusIo) -> Self {
        Self {
            type_name: io.type_name().to_string(),
            num_inputs: io.num_inputs(),
            num_outputs: io.num_outputs(),
            initial_state: Some(io.initial_state().to_vec()),
            input_aliases: Some(io.inputs().aliases()),
            output_aliases: Some(io.outputs().aliases()),
        }
    }
}

/// A connectable, updatable simulation unit.
#[derive(Debug)]
pub enum System {
    Device(Device),
    Circuit(Box<Circuit>),
}

impl From<Device> for System {
    fn from(value: Device) -> Self {
        Self::Device(value)
    }
}

impl From<Circuit> for System {
    fn from(value: Circuit) -> Self {
        Self::Circuit(Box::new(value))
    }
}

impl System {
    pub fn io(&self) -> &BusIo {
        match self {
            System::Device(device) => device.io(),
            System::Circuit(circuit) => circuit.io(),
        }
    }

    fn io_mut(&mut self) -> &mut BusIo {
        match self {
            System::Device(device) => device.io_mut(),
            System::Circuit(circuit) => circuit.io_mut(),
        }
    }

    pub fn id(&self) -> SystemId {
        self.io().id()
    }

    pub fn type_name(&self) -> &str {
        self.io().type_name()
    }

    /// Whether both systems are instances of the same type and so compute the
    /// same function.
    pub fn same_type(&self, other: &System) -> bool {
        self.type_name() == other.type_name()
    }

    pub fn num_inputs(&self) -> usize {
        self.io().num_inputs()
    }

    pub fn num_outputs(&self) -> usize {
        self.io().num_outputs()
    }

    pub fn in_alias_to_index(&self, alias: &str) -> SimResult<usize> {
        self.io().inputs().index_of(alias)
    }

    pub fn in_index_to_alias(&self, index: usize) -> SimResult<&str> {
        self.io().inputs().alias_of(index)
    }

    pub fn out_alias_to_index(&self, alias: &str) -> SimResult<usize> {
        self.io().outputs().index_of(alias)
    }

    pub fn out_index_to_alias(&self, index: usize) -> SimResult<&str> {
        self.io().outputs().alias_of(index)
    }

    /// The connection on each input bus, in bus order.
    pub fn input_bus(&self) -> &[Option<OutputPointer>] {
        self.io().input_bus()
    }

    /// The cached output values. Never triggers recomputation.
    pub fn get_out(&self) -> &[bool] {
        self.io().values()
    }

    pub fn get_out_bus(&self, alias: &str) -> SimResult<bool> {
        self.get_out_at(self.out_alias_to_index(alias)?)
    }

    pub fn get_out_at(&self, index: usize) -> SimResult<bool> {
        self.io().value_at(index)
    }

    pub fn is_loaded(&self) -> bool {
        self.io().is_loaded()
    }

    pub fn as_device(&self) -> Option<&Device> {
        match self {
            System::Device(device) => Some(device),
            System::Circuit(_) => None,
        }
    }

    pub fn as_circuit(&self) -> Option<&Circuit> {
        match self {
            System::Device(_) => None,
            System::Circuit(circuit) => Some(circuit.as_ref()),
        }
    }

    /// Latch a new switch value. Only switch devices accept this.
    pub fn set_switch(&mut self, value: bool) -> SimResult<()> {
        match self {
            System::Device(device) => device.set_switch(value),
            System::Circuit(circuit) => Err(SimError::unsupported(
                circuit.io().type_name(),
                "switching",
            )),
        }
    }

    pub(crate) fn attach_input(
        &mut self,
        bus: usize,
        source: OutputPointer,
    ) -> SimResult<()> {
        self.io_mut().attach(bus, source)
    }

    pub(crate) fn missing_connection(&self, bus: usize) -> SimError {
        self.io().missing_connection(bus)
    }

    pub(crate) fn store_input_buffer(&mut self, buffer: BusValues) {
        self.io_mut().store_buffer(buffer)
    }

    /// Consume the snapshot buffer and recompute the outputs.
    pub(crate) fn update(&mut self) -> SimResult<UpdateStatus> {
        match self {
            System::Device(device) => device.update(),
            System::Circuit(circuit) => circuit.update(),
        }
    }
}
