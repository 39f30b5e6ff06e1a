use smallvec::smallvec;

use crate::{
    errors::{SimError, SimResult},
    structures::alias::{AliasIndex, BusKind},
};

use super::{
    SystemData, UpdateStatus,
    bus_io::{BusIo, initial_state},
    gates::{Gate, GateKind},
    single_output,
};

pub const SWITCH_TYPE: &str = "Switch";

/// What a device computes from its snapshot buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceLogic {
    Gate(Gate),
    /// A stimulus source with no inputs which publishes its latched value
    Switch(bool),
}

impl DeviceLogic {
    /// The type name every device with this logic carries.
    pub fn type_name(&self) -> String {
        match self {
            DeviceLogic::Gate(gate) => gate.type_name(),
            DeviceLogic::Switch(_) => SWITCH_TYPE.to_string(),
        }
    }

    /// The (input, output) bus counts the logic requires.
    pub fn bus_counts(&self) -> (usize, usize) {
        match self {
            DeviceLogic::Gate(gate) => (gate.arity(), 1),
            DeviceLogic::Switch(_) => (0, 1),
        }
    }
}

/// An atomic system: one bus-I/O block driven by a fixed combinational
/// function.
#[derive(Debug)]
pub struct Device {
    io: BusIo,
    logic: DeviceLogic,
}

impl Device {
    /// Build a device from front-end construction data. The type name must
    /// be the one the logic implies, so equal names always mean equal
    /// functions.
    pub fn new(data: &SystemData, logic: DeviceLogic) -> SimResult<Self> {
        let expected = logic.type_name();
        if data.type_name != expected {
            return Err(SimError::MismatchedTypeName {
                given: data.type_name.clone(),
                expected,
            });
        }
        let (num_inputs, num_outputs) = logic.bus_counts();
        if data.num_inputs != num_inputs {
            return Err(SimError::InconsistentBusCount {
                what: "input buses",
                expected: num_inputs,
                given: data.num_inputs,
            });
        }
        if data.num_outputs != num_outputs {
            return Err(SimError::InconsistentBusCount {
                what: "output buses",
                expected: num_outputs,
                given: data.num_outputs,
            });
        }

        let inputs = AliasIndex::from_aliases(
            BusKind::Input,
            num_inputs,
            data.input_aliases.as_deref(),
        )?;
        let outputs = AliasIndex::from_aliases(
            BusKind::Output,
            num_outputs,
            data.output_aliases.as_deref(),
        )?;
        let state =
            initial_state(num_outputs, data.initial_state.as_deref())?;

        Ok(Self {
            io: BusIo::new(data.type_name.clone(), inputs, outputs, state),
            logic,
        })
    }

    /// A gate with inputs `"1"` through `"n"` and a single `OUT` bus, named
    /// after its function.
    pub fn gate(gate: Gate) -> Self {
        Self {
            io: BusIo::new(
                gate.type_name(),
                AliasIndex::with_defaults(BusKind::Input, gate.arity()),
                single_output::output_aliases(),
                smallvec![false],
            ),
            logic: DeviceLogic::Gate(gate),
        }
    }

    pub fn and(arity: usize) -> SimResult<Self> {
        Gate::new(GateKind::And, arity).map(Self::gate)
    }

    pub fn or(arity: usize) -> SimResult<Self> {
        Gate::new(GateKind::Or, arity).map(Self::gate)
    }

    pub fn xor(arity: usize) -> SimResult<Self> {
        Gate::new(GateKind::Xor, arity).map(Self::gate)
    }

    pub fn nand(arity: usize) -> SimResult<Self> {
        Gate::new(GateKind::And, arity).map(|g| Self::gate(g.inverted()))
    }

    pub fn nor(arity: usize) -> SimResult<Self> {
        Gate::new(GateKind::Or, arity).map(|g| Self::gate(g.inverted()))
    }

    pub fn xnor(arity: usize) -> SimResult<Self> {
        Gate::new(GateKind::Xor, arity).map(|g| Self::gate(g.inverted()))
    }

    pub fn buffer() -> Self {
        Self::gate(Gate::buffer())
    }

    pub fn not() -> Self {
        Self::gate(Gate::buffer().inverted())
    }

    /// A stimulus source initially publishing `value`.
    pub fn switch(value: bool) -> Self {
        Self {
            io: BusIo::new(
                SWITCH_TYPE.to_string(),
                AliasIndex::new(BusKind::Input),
                single_output::output_aliases(),
                smallvec![value],
            ),
            logic: DeviceLogic::Switch(value),
        }
    }

    /// A buffer whose input bus carries `alias`. Circuits use these as the
    /// indirection points on their boundary.
    pub(crate) fn relay(alias: &str, initial: bool) -> SimResult<Self> {
        let mut inputs = AliasIndex::new(BusKind::Input);
        inputs.insert(0, alias)?;
        Ok(Self {
            io: BusIo::new(
                Gate::buffer().type_name(),
                inputs,
                single_output::output_aliases(),
                smallvec![initial],
            ),
            logic: DeviceLogic::Gate(Gate::buffer()),
        })
    }

    /// An inverted copy of this gate. The copy takes over the aliases and the
    /// current output values but none of the connections, and gets its own
    /// identity.
    pub fn inverted(&self) -> SimResult<Self> {
        let DeviceLogic::Gate(gate) = self.logic else {
            return Err(SimError::unsupported(self.io.type_name(), "inversion"));
        };
        let gate = gate.inverted();
        Ok(Self {
            io: BusIo::new(
                gate.type_name(),
                self.io.inputs().clone(),
                self.io.outputs().clone(),
                self.io.values().into(),
            ),
            logic: DeviceLogic::Gate(gate),
        })
    }

    /// Latch a new value into a switch. It is published by the next update.
    pub fn set_switch(&mut self, value: bool) -> SimResult<()> {
        match &mut self.logic {
            DeviceLogic::Switch(latched) => {
                *latched = value;
                Ok(())
            }
            DeviceLogic::Gate(_) => {
                Err(SimError::unsupported(self.io.type_name(), "switching"))
            }
        }
    }

    pub fn logic(&self) -> DeviceLogic {
        self.logic
    }

    pub fn io(&self) -> &BusIo {
        &self.io
    }

    pub(crate) fn io_mut(&mut self) -> &mut BusIo {
        &mut self.io
    }

    /// Apply the logic to the snapshot buffer and consume it.
    pub(crate) fn update(&mut self) -> SimResult<UpdateStatus> {
        let buffer = self.io.take_buffer()?;
        let next = match self.logic {
            DeviceLogic::Gate(gate) => {
                smallvec![gate.eval(buffer.iter().filter(|v| **v).count())]
            }
            DeviceLogic::Switch(value) => smallvec![value],
        };
        Ok(self.io.publish(next))
    }
}
