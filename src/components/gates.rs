//! The combinational gate primitives.

use std::fmt::Display;

use crate::errors::{SimError, SimResult};

/// The closed set of combinational functions a gate can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    And,
    Or,
    Xor,
    Buffer,
}

impl Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateKind::And => write!(f, "AND"),
            GateKind::Or => write!(f, "OR"),
            GateKind::Xor => write!(f, "XOR"),
            GateKind::Buffer => write!(f, "BUFFER"),
        }
    }
}

impl GateKind {
    fn accepts_arity(&self, arity: usize) -> bool {
        match self {
            GateKind::And | GateKind::Or | GateKind::Xor => arity >= 2,
            GateKind::Buffer => arity == 1,
        }
    }
}

/// A gate's logic: which function it computes, over how many inputs, and
/// whether the result is negated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gate {
    kind: GateKind,
    arity: usize,
    inverted: bool,
}

impl Gate {
    pub fn new(kind: GateKind, arity: usize) -> SimResult<Self> {
        if kind.accepts_arity(arity) {
            Ok(Self {
                kind,
                arity,
                inverted: false,
            })
        } else {
            Err(SimError::InvalidArity { kind, given: arity })
        }
    }

    pub fn buffer() -> Self {
        Self {
            kind: GateKind::Buffer,
            arity: 1,
            inverted: false,
        }
    }

    pub fn kind(&self) -> GateKind {
        self.kind
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// The same gate with its output negated. Applying this twice gives back
    /// the original gate.
    #[must_use]
    pub fn inverted(self) -> Self {
        Self {
            inverted: !self.inverted,
            ..self
        }
    }

    /// Evaluate the gate given how many of its inputs are high.
    pub fn eval(&self, true_count: usize) -> bool {
        let out = match self.kind {
            GateKind::And => true_count == self.arity,
            GateKind::Or => true_count >= 1,
            GateKind::Xor => true_count % 2 == 1,
            GateKind::Buffer => true_count == 1,
        };
        out ^ self.inverted
    }

    pub fn type_name(&self) -> String {
        let n = self.arity;
        match (self.kind, self.inverted) {
            (GateKind::And, false) => format!("And-Gate({n})"),
            (GateKind::And, true) => format!("Nand-Gate({n})"),
            (GateKind::Or, false) => format!("Or-Gate({n})"),
            (GateKind::Or, true) => format!("Nor-Gate({n})"),
            (GateKind::Xor, false) => format!("Xor-Gate({n})"),
            (GateKind::Xor, true) => format!("Xnor-Gate({n})"),
            (GateKind::Buffer, false) => "Buffer-Gate".to_string(),
            (GateKind::Buffer, true) => "Not-Gate".to_string(),
        }
    }
}
