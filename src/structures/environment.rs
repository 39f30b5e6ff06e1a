use std::{collections::BTreeSet, ops::Index};

use gatesim_idx::{
    IndexRef,
    maps::{IndexedMap, SecondaryMap},
};
use smallvec::SmallVec;

use crate::{
    components::{BusValues, System, UpdateStatus},
    configuration::RuntimeConfig,
    errors::{SimError, SimResult},
};

use super::connection::{OutputPointer, SystemIdx};

/// The systems which read from a given producer.
pub type Fanout = SmallVec<[SystemIdx; 4]>;

/// How a run of scheduler rounds ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Propagation {
    /// The frontier emptied after this many rounds
    Converged { rounds: usize },
    /// The round bound was reached while `unstable` was still changing
    Exceeded { rounds: usize, unstable: SystemIdx },
}

/// An arena of systems wired to one another through [`OutputPointer`]s.
///
/// The environment owns every system in it and is the only place connections
/// are made, so it also keeps the reverse (fan-out) edges the scheduler
/// follows.
#[derive(Debug, Default)]
pub struct Environment {
    systems: IndexedMap<SystemIdx, System>,
    fanout: SecondaryMap<SystemIdx, Fanout>,
}

impl Index<SystemIdx> for Environment {
    type Output = System;

    fn index(&self, index: SystemIdx) -> &Self::Output {
        &self.systems[index]
    }
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `system`, returning its index in this environment.
    pub fn add<S: Into<System>>(&mut self, system: S) -> SystemIdx {
        self.systems.push(system.into())
    }

    pub fn get(&self, index: SystemIdx) -> Option<&System> {
        self.systems.get(index)
    }

    pub fn system_mut(&mut self, index: SystemIdx) -> SimResult<&mut System> {
        self.systems
            .get_mut(index)
            .ok_or(SimError::UnknownSystemIndex(index.index()))
    }

    fn system(&self, index: SystemIdx) -> SimResult<&System> {
        self.get(index)
            .ok_or(SimError::UnknownSystemIndex(index.index()))
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SystemIdx, &System)> {
        self.systems.iter()
    }

    /// The systems with at least one input connected to `index`, in the
    /// order they were connected.
    pub fn consumers(&self, index: SystemIdx) -> &[SystemIdx] {
        &self.fanout[index]
    }

    /// Latch a value into the switch at `index`.
    pub fn set_switch(
        &mut self,
        index: SystemIdx,
        value: bool,
    ) -> SimResult<()> {
        self.system_mut(index)?.set_switch(value)
    }

    /// Connect output `from_alias` of `from` to input `to_alias` of `to`.
    ///
    /// Both aliases are resolved before anything is changed, and an occupied
    /// input is never overwritten.
    pub fn connect_input(
        &mut self,
        from: SystemIdx,
        from_alias: &str,
        to: SystemIdx,
        to_alias: &str,
    ) -> SimResult<()> {
        let to_bus = self.system(to)?.in_alias_to_index(to_alias)?;
        let from_bus = self.system(from)?.out_alias_to_index(from_alias)?;
        self.link(OutputPointer::new(from, from_bus), to, to_bus)
    }

    /// As [`Environment::connect_input`] but addressing the buses by index.
    pub fn connect_index(
        &mut self,
        from: SystemIdx,
        from_bus: usize,
        to: SystemIdx,
        to_bus: usize,
    ) -> SimResult<()> {
        self.system(to)?.in_index_to_alias(to_bus)?;
        self.system(from)?.out_index_to_alias(from_bus)?;
        self.link(OutputPointer::new(from, from_bus), to, to_bus)
    }

    /// Both ends have been checked by the caller.
    fn link(
        &mut self,
        source: OutputPointer,
        to: SystemIdx,
        to_bus: usize,
    ) -> SimResult<()> {
        self.systems[to].attach_input(to_bus, source)?;
        let consumers = self.fanout.get_mut_or_default(source.system);
        if !consumers.contains(&to) {
            consumers.push(to);
        }
        Ok(())
    }

    /// The current value behind a connection pointer.
    pub fn read(&self, pointer: OutputPointer) -> SimResult<bool> {
        self.system(pointer.system)?.get_out_at(pointer.bus)
    }

    /// Pull the value of every input connection of `index`. Fails if any
    /// input is unconnected.
    fn sample_inputs(&self, index: SystemIdx) -> SimResult<BusValues> {
        let system = self.system(index)?;
        system
            .input_bus()
            .iter()
            .enumerate()
            .map(|(bus, slot)| match slot {
                Some(pointer) => self.read(*pointer),
                None => Err(system.missing_connection(bus)),
            })
            .collect()
    }

    /// Snapshot the inputs of `index` into its buffer. Nothing is stored if
    /// any input is missing.
    pub fn load_input_buffer(&mut self, index: SystemIdx) -> SimResult<()> {
        let buffer = self.sample_inputs(index)?;
        self.systems[index].store_input_buffer(buffer);
        Ok(())
    }

    /// Update the system at `index`, loading its buffer first if needed.
    /// Returns the stability flag, which holds whenever the update succeeds.
    pub fn update(&mut self, index: SystemIdx) -> SimResult<bool> {
        self.step(index)?;
        Ok(true)
    }

    pub(crate) fn step(&mut self, index: SystemIdx) -> SimResult<UpdateStatus> {
        if !self.system(index)?.is_loaded() {
            self.load_input_buffer(index)?;
        }
        self.systems[index].update()
    }

    /// Update `index` from `buffer` instead of its own connections.
    pub(crate) fn drive(
        &mut self,
        index: SystemIdx,
        buffer: BusValues,
    ) -> SimResult<UpdateStatus> {
        self.systems[index].store_input_buffer(buffer);
        self.systems[index].update()
    }

    /// Run scheduler rounds starting from `frontier` until nothing changes or
    /// `limit` rounds have run.
    ///
    /// Within a round every member samples its inputs before any member
    /// commits, so the result does not depend on evaluation order. Members of
    /// `passive` are never scheduled.
    pub(crate) fn propagate(
        &mut self,
        mut frontier: BTreeSet<SystemIdx>,
        limit: usize,
        passive: &[SystemIdx],
    ) -> SimResult<Propagation> {
        frontier.retain(|idx| !passive.contains(idx));
        let mut rounds = 0;

        while let Some(&unstable) = frontier.first() {
            if rounds == limit {
                return Ok(Propagation::Exceeded { rounds, unstable });
            }
            rounds += 1;

            let snapshot = frontier
                .iter()
                .map(|idx| self.sample_inputs(*idx).map(|buf| (*idx, buf)))
                .collect::<SimResult<Vec<_>>>()?;

            let mut next = BTreeSet::new();
            for (idx, buffer) in snapshot {
                if self.drive(idx, buffer)?.as_bool() {
                    next.extend(
                        self.fanout[idx]
                            .iter()
                            .copied()
                            .filter(|consumer| !passive.contains(consumer)),
                    );
                }
            }
            frontier = next;
        }

        Ok(Propagation::Converged { rounds })
    }

    /// Bring every system in the environment to a fixpoint, returning the
    /// number of rounds taken.
    ///
    /// Every system must have all of its inputs connected.
    pub fn settle(&mut self, config: &RuntimeConfig) -> SimResult<usize> {
        let limit = config.round_limit(self.len());
        let everything = self.systems.keys().collect();
        match self.propagate(everything, limit, &[])? {
            Propagation::Converged { rounds } => Ok(rounds),
            Propagation::Exceeded { rounds, unstable } => {
                let system = &self.systems[unstable];
                Err(SimError::Oscillation {
                    id: system.id(),
                    ty: system.type_name().to_string(),
                    rounds,
                })
            }
        }
    }
}
