use std::collections::BTreeSet;

use linked_hash_map::LinkedHashMap;
use smallvec::smallvec;

use crate::{
    configuration::RuntimeConfig,
    errors::{SimError, SimResult},
    logging::{self, Logger, debug, warn},
    structures::{
        alias::{AliasIndex, BusKind},
        connection::SystemIdx,
        environment::{Environment, Propagation},
    },
};

use super::{
    Device, System, SystemData, UpdateStatus,
    bus_io::{BusIo, BusValues, initial_state},
};

/// One side of a connection made inside a circuit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// The circuit's own boundary. As a source this is one of the circuit's
    /// inputs, as a target one of its outputs.
    Boundary,
    /// An internal system, by its local alias
    Internal(String),
}

impl Endpoint {
    pub fn internal<S: Into<String>>(alias: S) -> Self {
        Self::Internal(alias.into())
    }
}

/// A composite system. Its internal systems and boundary relays live in a
/// private [`Environment`] which is brought to a fixpoint on every update.
#[derive(Debug)]
pub struct Circuit {
    io: BusIo,
    env: Environment,
    /// A buffer per input bus, driven from the snapshot of the outer inputs
    input_relays: Vec<SystemIdx>,
    /// A buffer per output bus, read back once the interior settles
    output_relays: Vec<SystemIdx>,
    internal: LinkedHashMap<String, SystemIdx>,
    /// (target, target bus) -> (source, source bus)
    connections: LinkedHashMap<(Endpoint, usize), (Endpoint, usize)>,
    /// Set until the interior has settled once, and again after any failed
    /// update. While set the next update evaluates every internal system.
    reseed: bool,
    config: RuntimeConfig,
    logger: Logger,
}

impl Circuit {
    pub fn new(data: &SystemData, config: RuntimeConfig) -> SimResult<Self> {
        let inputs = AliasIndex::from_aliases(
            BusKind::Input,
            data.num_inputs,
            data.input_aliases.as_deref(),
        )?;
        let outputs = AliasIndex::from_aliases(
            BusKind::Output,
            data.num_outputs,
            data.output_aliases.as_deref(),
        )?;
        let state =
            initial_state(data.num_outputs, data.initial_state.as_deref())?;

        let mut env = Environment::new();
        let input_relays = inputs
            .aliases()
            .iter()
            .map(|alias| Ok(env.add(Device::relay(alias, false)?)))
            .collect::<SimResult<Vec<_>>>()?;
        let output_relays = outputs
            .aliases()
            .iter()
            .zip(state.iter())
            .map(|(alias, value)| Ok(env.add(Device::relay(alias, *value)?)))
            .collect::<SimResult<Vec<_>>>()?;

        let io = BusIo::new(data.type_name.clone(), inputs, outputs, state);
        let logger = logging::new_sublogger(format!(
            "{}{}",
            io.type_name(),
            io.id()
        ));

        Ok(Self {
            io,
            env,
            input_relays,
            output_relays,
            internal: LinkedHashMap::new(),
            connections: LinkedHashMap::new(),
            reseed: true,
            config,
            logger,
        })
    }

    pub fn io(&self) -> &BusIo {
        &self.io
    }

    pub(crate) fn io_mut(&mut self) -> &mut BusIo {
        &mut self.io
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Take ownership of `system` under the local name `alias`.
    pub fn add_system<S: Into<System>>(
        &mut self,
        alias: &str,
        system: S,
    ) -> SimResult<()> {
        if self.internal.contains_key(alias) {
            return Err(SimError::DuplicateSystemAlias(alias.to_string()));
        }
        let idx = self.env.add(system);
        self.internal.insert(alias.to_string(), idx);
        Ok(())
    }

    fn lookup(&self, alias: &str) -> SimResult<SystemIdx> {
        self.internal
            .get(alias)
            .copied()
            .ok_or_else(|| SimError::UnknownSystem(alias.to_string()))
    }

    pub fn internal_system(&self, alias: &str) -> SimResult<&System> {
        self.lookup(alias).map(|idx| &self.env[idx])
    }

    /// The internal systems and their local names, in insertion order.
    pub fn internal_systems(&self) -> impl Iterator<Item = (&str, &System)> {
        self.internal
            .iter()
            .map(|(alias, idx)| (alias.as_str(), &self.env[*idx]))
    }

    /// Every connection made inside the circuit as
    /// `(source, source bus, target, target bus)`, in the order they were
    /// made.
    pub fn connections(
        &self,
    ) -> impl Iterator<Item = (&Endpoint, usize, &Endpoint, usize)> {
        self.connections
            .iter()
            .map(|((target, tb), (source, sb))| (source, *sb, target, *tb))
    }

    /// Wire two endpoints by bus index, dispatching on which of them is the
    /// boundary.
    pub fn connect(
        &mut self,
        source: Endpoint,
        source_bus: usize,
        target: Endpoint,
        target_bus: usize,
    ) -> SimResult<()> {
        match (&source, &target) {
            (Endpoint::Internal(from), Endpoint::Internal(to)) => {
                let (from, to) = (self.lookup(from)?, self.lookup(to)?);
                self.env.connect_index(from, source_bus, to, target_bus)?;
            }
            (Endpoint::Boundary, Endpoint::Internal(to)) => {
                let relay = *self.input_relays.get(source_bus).ok_or(
                    SimError::UnknownIndex {
                        kind: BusKind::Input,
                        index: source_bus,
                    },
                )?;
                let to = self.lookup(to)?;
                self.env.connect_index(relay, 0, to, target_bus)?;
            }
            (Endpoint::Internal(from), Endpoint::Boundary) => {
                let from = self.lookup(from)?;
                let relay = *self.output_relays.get(target_bus).ok_or(
                    SimError::UnknownIndex {
                        kind: BusKind::Output,
                        index: target_bus,
                    },
                )?;
                self.env.connect_index(from, source_bus, relay, 0)?;
            }
            (Endpoint::Boundary, Endpoint::Boundary) => {
                return Err(SimError::InvalidBoundaryConnection);
            }
        }
        self.connections
            .insert((target, target_bus), (source, source_bus));
        Ok(())
    }

    /// Connect the circuit boundary to an internal system. Exactly one of
    /// `source` and `target` must be [`Endpoint::Boundary`].
    pub fn connect_boundary(
        &mut self,
        source: Endpoint,
        source_bus: usize,
        target: Endpoint,
        target_bus: usize,
    ) -> SimResult<()> {
        match (&source, &target) {
            (Endpoint::Boundary, Endpoint::Internal(_))
            | (Endpoint::Internal(_), Endpoint::Boundary) => {
                self.connect(source, source_bus, target, target_bus)
            }
            _ => Err(SimError::InvalidBoundaryConnection),
        }
    }

    /// Connect two internal systems by their local names.
    pub fn connect_internal(
        &mut self,
        source: &str,
        source_bus: usize,
        target: &str,
        target_bus: usize,
    ) -> SimResult<()> {
        self.connect(
            Endpoint::internal(source),
            source_bus,
            Endpoint::internal(target),
            target_bus,
        )
    }

    /// As [`Circuit::connect`] but naming the buses by alias. Boundary
    /// aliases are the circuit's own input or output aliases.
    pub fn connect_aliases(
        &mut self,
        source: Endpoint,
        source_alias: &str,
        target: Endpoint,
        target_alias: &str,
    ) -> SimResult<()> {
        let source_bus = match &source {
            Endpoint::Boundary => self.io.inputs().index_of(source_alias)?,
            Endpoint::Internal(alias) => self
                .internal_system(alias)?
                .out_alias_to_index(source_alias)?,
        };
        let target_bus = match &target {
            Endpoint::Boundary => self.io.outputs().index_of(target_alias)?,
            Endpoint::Internal(alias) => self
                .internal_system(alias)?
                .in_alias_to_index(target_alias)?,
        };
        self.connect(source, source_bus, target, target_bus)
    }

    /// Drive the interior from the snapshot buffer and iterate it to a
    /// fixpoint, then refresh the outputs from the output relays.
    ///
    /// A failure can leave the interior part way through a round, so the
    /// following update starts over from every internal system.
    pub(crate) fn update(&mut self) -> SimResult<UpdateStatus> {
        let buffer = self.io.take_buffer()?;
        let status = self.settle_interior(buffer);
        self.reseed = status.is_err();
        status
    }

    fn settle_interior(
        &mut self,
        buffer: BusValues,
    ) -> SimResult<UpdateStatus> {
        let mut frontier = BTreeSet::new();
        for (relay, value) in self.input_relays.iter().zip(buffer) {
            let status = self.env.drive(*relay, smallvec![value])?;
            if status.as_bool() {
                frontier.extend(self.env.consumers(*relay).iter().copied());
            }
        }
        if self.reseed {
            frontier.extend(self.internal.values().copied());
        }

        let limit = self.config.round_limit(self.internal.len());
        match self.env.propagate(frontier, limit, &self.output_relays)? {
            Propagation::Converged { rounds } => {
                debug!(self.logger, "settled"; "rounds" => rounds);
            }
            Propagation::Exceeded { rounds, .. } => {
                warn!(self.logger, "failed to settle"; "rounds" => rounds);
                return Err(SimError::Oscillation {
                    id: self.io.id(),
                    ty: self.io.type_name().to_string(),
                    rounds,
                });
            }
        }

        let mut outputs = BusValues::with_capacity(self.output_relays.len());
        for relay in self.output_relays.iter() {
            self.env.step(*relay)?;
            outputs.push(self.env[*relay].get_out_at(0)?);
        }
        Ok(self.io.publish(outputs))
    }
}
