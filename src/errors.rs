use crate::{
    components::GateKind, identity::SystemId, structures::alias::BusKind,
};
use itertools::Itertools;
use thiserror::Error;

/// A type alias for a result with a [SimError] as the error type
pub type SimResult<T> = Result<T, SimError>;

/// Every way a build, connection, or update step can fail. All of these are
/// contract violations at the call site and abort the triggering operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// The alias does not name a bus of the given kind
    #[error("unknown {kind} bus alias \"{alias}\"")]
    UnknownAlias { kind: BusKind, alias: String },

    /// The index is out of range for buses of the given kind
    #[error("unknown {kind} bus index {index}")]
    UnknownIndex { kind: BusKind, index: usize },

    /// The target input bus already holds a connection
    #[error("input bus \"{alias}\" is already connected")]
    AlreadyConnected { alias: String },

    /// A read or update reached an input bus with no connection
    #[error(
        "system {id} of type <{ty}> has no connection on input bus \"{alias}\""
    )]
    MissingConnection {
        id: SystemId,
        ty: String,
        alias: String,
    },

    #[error("a blueprint for type <{0}> is already registered")]
    DuplicateType(String),

    #[error("no blueprint is registered for type <{0}>")]
    UnknownType(String),

    /// Building the first type in the chain eventually requires building it
    /// again
    #[error("blueprint references itself: {}", chain.iter().join(" -> "))]
    RecursiveBlueprint { chain: Vec<String> },

    #[error("{kind} gate cannot have {given} input buses")]
    InvalidArity { kind: GateKind, given: usize },

    /// Construction data disagrees with the declared number of buses
    #[error("expected {expected} entries for the {what} but received {given}")]
    InconsistentBusCount {
        what: &'static str,
        expected: usize,
        given: usize,
    },

    /// A device type name which does not describe the device's logic
    #[error("type <{given}> does not name a device computing <{expected}>")]
    MismatchedTypeName { given: String, expected: String },

    #[error("{kind} bus alias \"{alias}\" is used more than once")]
    DuplicateAlias { kind: BusKind, alias: String },

    /// The circuit did not reach a fixpoint within the round bound
    #[error(
        "circuit {id} of type <{ty}> failed to stabilize after {rounds} rounds"
    )]
    Oscillation {
        id: SystemId,
        ty: String,
        rounds: usize,
    },

    /// No internal system is registered under this local alias
    #[error("no internal system named \"{0}\"")]
    UnknownSystem(String),

    /// The index was not issued by the environment it was used with
    #[error("no system at index {0} in this environment")]
    UnknownSystemIndex(usize),

    #[error("internal system name \"{0}\" is already in use")]
    DuplicateSystemAlias(String),

    #[error(
        "a boundary connection must have the circuit itself as exactly one of its source or target"
    )]
    InvalidBoundaryConnection,

    #[error("systems of type <{ty}> do not support {operation}")]
    UnsupportedOperation { ty: String, operation: &'static str },
}

impl SimError {
    /// The numeric status code reported to external tooling for this error.
    pub fn code(&self) -> u32 {
        match self {
            SimError::InconsistentBusCount { .. } => 223,
            SimError::InvalidArity { .. } => 224,
            SimError::MismatchedTypeName { .. } => 225,
            SimError::UnknownAlias {
                kind: BusKind::Input,
                ..
            } => 310,
            SimError::UnknownIndex {
                kind: BusKind::Input,
                ..
            } => 311,
            SimError::DuplicateAlias {
                kind: BusKind::Input,
                ..
            } => 312,
            SimError::UnknownAlias {
                kind: BusKind::Output,
                ..
            } => 320,
            SimError::UnknownIndex {
                kind: BusKind::Output,
                ..
            } => 321,
            SimError::DuplicateAlias {
                kind: BusKind::Output,
                ..
            } => 322,
            SimError::AlreadyConnected { .. } => 330,
            SimError::MissingConnection { .. } => 331,
            SimError::DuplicateType(_) => 332,
            SimError::UnknownType(_) => 334,
            SimError::RecursiveBlueprint { .. } => 336,
            SimError::UnknownSystem(_) => 340,
            SimError::UnknownSystemIndex(_) => 344,
            SimError::DuplicateSystemAlias(_) => 341,
            SimError::InvalidBoundaryConnection => 342,
            SimError::UnsupportedOperation { .. } => 343,
            SimError::Oscillation { .. } => 350,
        }
    }

    pub(crate) fn unsupported(ty: &str, operation: &'static str) -> Self {
        SimError::UnsupportedOperation {
            ty: ty.to_string(),
            operation,
        }
    }
}
