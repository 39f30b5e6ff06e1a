use std::collections::VecDeque;

use ahash::AHashMap;
use linked_hash_map::LinkedHashMap;
use petgraph::{algo::toposort, graphmap::DiGraphMap};

use crate::{
    components::System,
    configuration::RuntimeConfig,
    errors::{SimError, SimResult},
    logging::{self, Logger, trace},
};

use super::Blueprint;

/// The catalogue of buildable system types, keyed by type name.
///
/// Circuits built by the registry are given its [`RuntimeConfig`].
#[derive(Debug)]
pub struct BlueprintRegistry {
    blueprints: LinkedHashMap<String, Blueprint>,
    config: RuntimeConfig,
    logger: Logger,
}

impl Default for BlueprintRegistry {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl BlueprintRegistry {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            blueprints: LinkedHashMap::new(),
            config,
            logger: logging::new_sublogger("blueprints"),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn register<B: Into<Blueprint>>(
        &mut self,
        blueprint: B,
    ) -> SimResult<()> {
        let blueprint = blueprint.into();
        let ty = blueprint.type_name().to_string();
        if self.blueprints.contains_key(&ty) {
            return Err(SimError::DuplicateType(ty));
        }
        self.blueprints.insert(ty, blueprint);
        Ok(())
    }

    /// Register `system` as a blueprint along with every type inside it that
    /// is not registered yet.
    ///
    /// Every internal system whose type is already known, whether registered
    /// earlier or met elsewhere in the tree, must capture to the same
    /// blueprint, otherwise building the result would not reproduce
    /// `system`. Nothing is registered unless the whole tree is consistent.
    pub fn register_tree(&mut self, system: &System) -> SimResult<()> {
        if self.has_type(system.type_name()) {
            return Err(SimError::DuplicateType(system.type_name().to_string()));
        }
        let mut captured = LinkedHashMap::new();
        self.capture_tree(system, &mut captured)?;
        for (_, blueprint) in captured {
            self.register(blueprint)?;
        }
        Ok(())
    }

    fn capture_tree(
        &self,
        system: &System,
        captured: &mut LinkedHashMap<String, Blueprint>,
    ) -> SimResult<()> {
        if let Some(circuit) = system.as_circuit() {
            for (_, internal) in circuit.internal_systems() {
                self.capture_tree(internal, captured)?;
            }
        }

        let blueprint = Blueprint::from_system(system);
        let ty = blueprint.type_name();
        match self.get(ty).or_else(|| captured.get(ty)) {
            Some(known) if !known.same_recipe(&blueprint) => {
                trace!(self.logger, "conflicting capture"; "type" => ty);
                Err(SimError::DuplicateType(ty.to_string()))
            }
            Some(_) => Ok(()),
            None => {
                captured.insert(ty.to_string(), blueprint);
                Ok(())
            }
        }
    }

    pub fn has_type(&self, ty: &str) -> bool {
        self.blueprints.contains_key(ty)
    }

    pub fn get(&self, ty: &str) -> Option<&Blueprint> {
        self.blueprints.get(ty)
    }

    /// The registered type names in registration order.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.blueprints.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }

    /// Build a fresh instance of `ty`. Every system created, at every level of
    /// nesting, gets a new identity.
    pub fn build(&self, ty: &str) -> SimResult<System> {
        let mut in_progress = Vec::new();
        self.build_nested(ty, &mut in_progress)
    }

    fn build_nested(
        &self,
        ty: &str,
        in_progress: &mut Vec<String>,
    ) -> SimResult<System> {
        if let Some(start) = in_progress.iter().position(|t| t == ty) {
            let mut chain = in_progress[start..].to_vec();
            chain.push(ty.to_string());
            return Err(SimError::RecursiveBlueprint { chain });
        }

        let blueprint = self
            .get(ty)
            .ok_or_else(|| SimError::UnknownType(ty.to_string()))?;
        trace!(self.logger, "building";
            "type" => ty,
            "depth" => in_progress.len());

        match blueprint {
            Blueprint::Device(device) => Ok(device.build()?.into()),
            Blueprint::Circuit(recipe) => {
                in_progress.push(ty.to_string());
                let mut circuit = recipe.shell(self.config)?;
                for reference in recipe.internals() {
                    let system =
                        self.build_nested(&reference.ty, in_progress)?;
                    circuit.add_system(&reference.alias, system)?;
                }
                for entry in recipe.connections() {
                    circuit.connect(
                        entry.source.clone(),
                        entry.source_bus,
                        entry.target.clone(),
                        entry.target_bus,
                    )?;
                }
                in_progress.pop();
                Ok(circuit.into())
            }
        }
    }

    /// Check that every referenced type is registered and that no type
    /// contains itself, without building anything.
    pub fn validate(&self) -> SimResult<()> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for (ty, blueprint) in self.blueprints.iter() {
            graph.add_node(ty.as_str());
            for reference in blueprint.references() {
                if !self.has_type(reference) {
                    return Err(SimError::UnknownType(reference.to_string()));
                }
                graph.add_edge(ty.as_str(), reference, ());
            }
        }

        toposort(&graph, None).map(|_| ()).map_err(|cycle| {
            SimError::RecursiveBlueprint {
                chain: cycle_through(&graph, cycle.node_id()),
            }
        })
    }
}

/// A path from `start` back to itself, found breadth first so it is one of
/// the shortest.
fn cycle_through<'a>(
    graph: &DiGraphMap<&'a str, ()>,
    start: &'a str,
) -> Vec<String> {
    let mut parent: AHashMap<&str, &str> = AHashMap::new();
    let mut queue = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        for next in graph.neighbors(node) {
            if next == start {
                let mut chain = vec![start.to_string()];
                let mut cursor = node;
                while cursor != start {
                    chain.push(cursor.to_string());
                    cursor = parent[cursor];
                }
                chain[1..].reverse();
                chain.push(start.to_string());
                return chain;
            }
            if !parent.contains_key(next) {
                parent.insert(next, node);
                queue.push_back(next);
            }
        }
    }
    vec![start.to_string()]
}
