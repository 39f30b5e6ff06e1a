use smallvec::SmallVec;

use crate::{
    errors::{SimError, SimResult},
    identity::SystemId,
    structures::{
        alias::{AliasIndex, BusKind, default_alias},
        connection::OutputPointer,
    },
};

use super::UpdateStatus;

/// Bit values carried by a system's buses, one entry per bus.
pub type BusValues = SmallVec<[bool; 4]>;

/// The state every system carries regardless of what it computes: identity,
/// bus aliases, incoming connections, the snapshot buffer, and the current
/// output values.
#[derive(Debug)]
pub struct BusIo {
    id: SystemId,
    type_name: String,
    inputs: AliasIndex,
    outputs: AliasIndex,
    input_bus: SmallVec<[Option<OutputPointer>; 4]>,
    /// Either holds exactly one value per input bus or is `None`
    input_buffer: Option<BusValues>,
    values: BusValues,
    initial_state: BusValues,
}

/// Validate the initial output values from construction data. When absent
/// every output starts low.
pub(crate) fn initial_state(
    num_outputs: usize,
    given: Option<&[bool]>,
) -> SimResult<BusValues> {
    match given {
        Some(state) if state.len() != num_outputs => {
            Err(SimError::InconsistentBusCount {
                what: "initial state",
                expected: num_outputs,
                given: state.len(),
            })
        }
        Some(state) => Ok(state.iter().copied().collect()),
        None => Ok(SmallVec::from_elem(false, num_outputs)),
    }
}

impl BusIo {
    /// Build the block with a freshly issued identity and every input slot
    /// unset.
    pub(crate) fn new(
        type_name: String,
        inputs: AliasIndex,
        outputs: AliasIndex,
        initial_state: BusValues,
    ) -> Self {
        debug_assert_eq!(initial_state.len(), outputs.len());
        Self {
            id: SystemId::issue(),
            type_name,
            input_bus: SmallVec::from_elem(None, inputs.len()),
            inputs,
            outputs,
            input_buffer: None,
            values: initial_state.clone(),
            initial_state,
        }
    }

    pub fn id(&self) -> SystemId {
        self.id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn inputs(&self) -> &AliasIndex {
        &self.inputs
    }

    pub fn outputs(&self) -> &AliasIndex {
        &self.outputs
    }

    pub fn num_inputs(&self) -> usize {
        self.input_bus.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.values.len()
    }

    pub fn input_bus(&self) -> &[Option<OutputPointer>] {
        &self.input_bus
    }

    pub fn values(&self) -> &[bool] {
        &self.values
    }

    pub fn initial_state(&self) -> &[bool] {
        &self.initial_state
    }

    pub fn value_at(&self, bus: usize) -> SimResult<bool> {
        self.values
            .get(bus)
            .copied()
            .ok_or(SimError::UnknownIndex {
                kind: BusKind::Output,
                index: bus,
            })
    }

    /// A system without inputs never needs a snapshot.
    pub fn is_loaded(&self) -> bool {
        self.input_bus.is_empty() || self.input_buffer.is_some()
    }

    /// Point input `bus` at `source`. An occupied slot is left untouched.
    pub(crate) fn attach(
        &mut self,
        bus: usize,
        source: OutputPointer,
    ) -> SimResult<()> {
        let alias = self.inputs.alias_of(bus)?;
        let slot = &mut self.input_bus[bus];
        if slot.is_some() {
            return Err(SimError::AlreadyConnected {
                alias: alias.to_string(),
            });
        }
        *slot = Some(source);
        Ok(())
    }

    pub(crate) fn store_buffer(&mut self, buffer: BusValues) {
        debug_assert_eq!(buffer.len(), self.num_inputs());
        self.input_buffer = Some(buffer);
    }

    /// Consume the snapshot, leaving the block unloaded.
    pub(crate) fn take_buffer(&mut self) -> SimResult<BusValues> {
        match self.input_buffer.take() {
            Some(buffer) => Ok(buffer),
            None if self.input_bus.is_empty() => Ok(BusValues::new()),
            None => Err(self.missing_connection(0)),
        }
    }

    /// Replace the outputs, reporting whether any of them changed.
    pub(crate) fn publish(&mut self, values: BusValues) -> UpdateStatus {
        debug_assert_eq!(values.len(), self.num_outputs());
        let status = UpdateStatus::from(values != self.values);
        self.values = values;
        status
    }

    pub(crate) fn missing_connection(&self, bus: usize) -> SimError {
        SimError::MissingConnection {
            id: self.id,
            ty: self.type_name.clone(),
            alias: self
                .inputs
                .alias_of(bus)
                .map(str::to_string)
                .unwrap_or_else(|_| default_alias(bus)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BusIo, initial_state};
    use crate::{
        errors::SimError,
        structures::{
            alias::{AliasIndex, BusKind},
            connection::{OutputPointer, SystemIdx},
        },
    };
    use smallvec::smallvec;

    fn block(inputs: usize, outputs: usize) -> BusIo {
        BusIo::new(
            "Test".into(),
            AliasIndex::with_defaults(BusKind::Input, inputs),
            AliasIndex::with_defaults(BusKind::Output, outputs),
            smallvec![false; outputs],
        )
    }

    #[test]
    fn occupied_slot_keeps_first_connection() {
        let mut io = block(2, 1);
        let first = OutputPointer::new(SystemIdx::from(0_u32), 0);
        let second = OutputPointer::new(SystemIdx::from(1_u32), 0);

        io.attach(1, first).unwrap();
        assert_eq!(
            io.attach(1, second),
            Err(SimError::AlreadyConnected { alias: "2".into() })
        );
        assert_eq!(io.input_bus(), &[None, Some(first)]);
    }

    #[test]
    fn buffer_is_single_use() {
        let mut io = block(1, 1);
        assert!(!io.is_loaded());
        io.store_buffer(smallvec![true]);
        assert!(io.is_loaded());
        assert_eq!(io.take_buffer().unwrap().as_slice(), &[true]);
        assert!(matches!(
            io.take_buffer(),
            Err(SimError::MissingConnection { .. })
        ));
        assert!(block(0, 1).is_loaded());
    }

    #[test]
    fn initial_state_must_cover_outputs() {
        assert_eq!(initial_state(2, None).unwrap().as_slice(), &[false; 2]);
        assert_eq!(
            initial_state(2, Some(&[true][..])).unwrap_err(),
            SimError::InconsistentBusCount {
                what: "initial state",
                expected: 2,
                given: 1
            }
        );
    }
}
