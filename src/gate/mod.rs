mod ports;
mod truth_table;
pub use ports::*;
pub use truth_table::*;

use smallvec::{smallvec, SmallVec};
use std::fmt::{self, Display, Formatter};

/// Stable index of a gate in a [Circuit](crate::Circuit) arena.
///
/// Indexes are handed out by the `add_*` constructors and stay valid for the
/// lifetime of the circuit, gates are never removed.
#[repr(transparent)]
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct GateIndex {
    pub(crate) idx: usize,
}

impl GateIndex {
    pub(crate) const fn new(idx: usize) -> GateIndex {
        GateIndex { idx }
    }
}

impl Display for GateIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.idx)
    }
}

/// A directed wire leaving one output port: the gate it feeds and the
/// 1-based input port it lands on. The source side is implicit, a
/// connection lives in the fan-out list of the output port it leaves.
///
/// Connections are created during circuit assembly and never mutated.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct Connection {
    pub target: GateIndex,
    pub port: usize,
}

/// The boolean operator of an N-ary combinational gate.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum NaryOp {
    And,
    Or,
    Xor,
    Xnor,
    Nand,
    Nor,
}

impl NaryOp {
    /// Left-folds the operator over the latched input values. The negated
    /// kinds fold with their plain counterpart and negate the result.
    ///
    /// # Panics
    ///
    /// Panics if `inputs` is empty, gates are built with at least one input.
    pub(crate) fn fold(self, inputs: &[bool]) -> bool {
        use NaryOp::*;
        let mut acc = inputs[0];
        for &b in &inputs[1..] {
            acc = match self {
                And | Nand => acc && b,
                Or | Nor => acc || b,
                Xor | Xnor => acc ^ b,
            };
        }
        if self.is_negated() {
            !acc
        } else {
            acc
        }
    }

    /// Returns true for the kinds that negate their folded result.
    pub fn is_negated(self) -> bool {
        matches!(self, NaryOp::Nand | NaryOp::Nor | NaryOp::Xnor)
    }
}

/// The behavior of a single-input, single-output gate.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum UnaryKind {
    /// Copies its input.
    Identity,
    /// Inverts its input.
    Not,
    /// Ignores its input and emits true. Pre-filled at construction.
    True,
    /// Ignores its input and emits false. Pre-filled at construction.
    False,
    /// Source probe: holds a value that external drivers set and fire.
    Input,
    /// Sink probe: propagates nothing, raises a dirty signal for the
    /// display collaborator instead.
    Output,
}

/// Which flip-flop state machine a clocked gate runs.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum FlipFlopKind {
    /// Q follows the latched D on every tick, nothing is stored.
    D,
    /// Toggles the stored state when the latched T is true.
    T,
    /// `Q' = K'Q + JQ'` over the latched J and K.
    Jk,
}

/// Closed set of gate behaviors. Every kind evaluates through
/// [Gate::evaluate] except the flip-flops, which only change on tick.
#[derive(Debug, Clone)]
pub(crate) enum GateKind {
    Nary(NaryOp),
    Unary(UnaryKind),
    Custom { tables: Vec<TruthTable> },
    /// N inputs asserting exactly one of 2^N outputs,
    /// [minterm_lsb_first] encoding.
    Decoder,
    /// `controls` control ports followed by 2^controls data ports,
    /// [minterm_lsb_first] encoding on the controls.
    Multiplexer { controls: usize },
    FlipFlop { kind: FlipFlopKind, state: bool },
}

impl Display for GateKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            GateKind::Nary(NaryOp::And) => "and",
            GateKind::Nary(NaryOp::Or) => "or",
            GateKind::Nary(NaryOp::Xor) => "xor",
            GateKind::Nary(NaryOp::Xnor) => "xnor",
            GateKind::Nary(NaryOp::Nand) => "nand",
            GateKind::Nary(NaryOp::Nor) => "nor",
            GateKind::Unary(UnaryKind::Identity) => "identity",
            GateKind::Unary(UnaryKind::Not) => "not",
            GateKind::Unary(UnaryKind::True) => "true",
            GateKind::Unary(UnaryKind::False) => "false",
            GateKind::Unary(UnaryKind::Input) => "input",
            GateKind::Unary(UnaryKind::Output) => "output",
            GateKind::Custom { .. } => "custom",
            GateKind::Decoder => "decoder",
            GateKind::Multiplexer { .. } => "mux",
            GateKind::FlipFlop { kind: FlipFlopKind::D, .. } => "dff",
            GateKind::FlipFlop { kind: FlipFlopKind::T, .. } => "tff",
            GateKind::FlipFlop { kind: FlipFlopKind::Jk, .. } => "jkff",
        };
        write!(f, "{}", label)
    }
}

/// Amount of connections kept inline per output port before spilling to the
/// heap, most output ports feed one or two gates.
pub(crate) const FANOUT_INLINE: usize = 2;

/// One gate in the arena: identity, behavior, latched per-epoch state and
/// the fan-out lists of its output ports. All mutation goes through the
/// owning [Circuit](crate::Circuit).
#[derive(Debug, Clone)]
pub(crate) struct Gate {
    pub name: String,
    pub kind: GateKind,
    /// Latched input values, 0-based. Public ports are 1-based.
    pub inputs: Vec<bool>,
    /// Which ports have received a value since the last reset.
    pub seen: Vec<bool>,
    /// True once every port has been seen and output has been computed at
    /// least once. Reading output before this is the not-ready error.
    pub filled: bool,
    /// Last computed value per output port.
    pub outputs: SmallVec<[bool; 1]>,
    /// One ordered connection list per output port.
    pub fanout: Vec<SmallVec<[Connection; FANOUT_INLINE]>>,
    pub input_names: PortNames,
    pub output_names: PortNames,
}

impl Gate {
    pub(crate) fn new(
        name: String,
        kind: GateKind,
        input_count: usize,
        output_count: usize,
        input_names: PortNames,
        output_names: PortNames,
    ) -> Gate {
        Gate {
            name,
            kind,
            inputs: vec![false; input_count],
            seen: vec![false; input_count],
            filled: false,
            outputs: smallvec![false; output_count],
            fanout: vec![SmallVec::new(); output_count],
            input_names,
            output_names,
        }
    }

    /// Recomputes every output from the latched inputs.
    ///
    /// Only meaningful for the combinational kinds, flip-flop outputs are
    /// advanced by the tick path instead.
    pub(crate) fn evaluate(&mut self) {
        match &self.kind {
            GateKind::Nary(op) => {
                self.outputs[0] = op.fold(&self.inputs);
            }
            GateKind::Unary(kind) => {
                self.outputs[0] = match kind {
                    UnaryKind::Identity | UnaryKind::Input | UnaryKind::Output => self.inputs[0],
                    UnaryKind::Not => !self.inputs[0],
                    UnaryKind::True => true,
                    UnaryKind::False => false,
                };
            }
            GateKind::Custom { tables } => {
                let minterm = minterm_msb_first(&self.inputs);
                for (i, table) in tables.iter().enumerate() {
                    self.outputs[i] = table.value(minterm);
                }
            }
            GateKind::Decoder => {
                let minterm = minterm_lsb_first(&self.inputs);
                for (i, output) in self.outputs.iter_mut().enumerate() {
                    *output = i == minterm;
                }
            }
            GateKind::Multiplexer { controls } => {
                let minterm = minterm_lsb_first(&self.inputs[..*controls]);
                self.outputs[0] = self.inputs[controls + minterm];
            }
            GateKind::FlipFlop { .. } => {
                unreachable!("flip-flop outputs advance on tick, not on evaluation")
            }
        }
    }

    /// Clears latches, seen flags, fill flag and outputs for a fresh epoch.
    pub(crate) fn clear_epoch(&mut self) {
        for input in &mut self.inputs {
            *input = false;
        }
        for seen in &mut self.seen {
            *seen = false;
        }
        for output in &mut self.outputs {
            *output = false;
        }
        self.filled = false;
    }

    /// Returns true if every input port has been seen this epoch.
    pub(crate) fn saturated(&self) -> bool {
        self.seen.iter().all(|&seen| seen)
    }
}
