use thiserror::Error;

/// Everything that can go wrong while building or driving a [Circuit](crate::Circuit).
///
/// Only [CircuitError::NotReady] is expected during normal operation: it is
/// returned when an output is read before the gate has received a value on
/// every input port, and callers typically render it as "N/A". All other
/// variants indicate a defective circuit description and are reported at
/// construction or wiring time wherever possible.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum CircuitError {
    /// The gate has not been filled yet, its output is undefined.
    #[error("gate {gate} is not connected")]
    NotReady { gate: String },

    /// A truth table is missing an entry for a reachable input combination.
    #[error("no truth table entry for input combination {0}")]
    UndefinedEntry(usize),

    /// A truth table defines the same input combination twice.
    #[error("duplicate truth table entry for input combination {0}")]
    DuplicateEntry(usize),

    /// A truth table entry does not fit in the declared input count.
    #[error("input combination {minterm} is out of range for {inputs} inputs")]
    EntryOutOfRange { minterm: usize, inputs: usize },

    /// The input arity cannot be represented as a truth table or decoder.
    #[error("unsupported input arity {0}")]
    UnsupportedArity(usize),

    /// A port number outside the gate's declared range, caught at wiring or
    /// activation time.
    #[error("gate {gate} has no port {port}, it has {count}")]
    PortOutOfRange {
        gate: String,
        port: usize,
        count: usize,
    },

    /// The gate cannot be built with the requested number of inputs.
    #[error("gate {gate} cannot have {arity} inputs")]
    InvalidArity { gate: String, arity: usize },

    /// A port name list that is neither empty nor exactly one name per port.
    #[error("gate {gate} declares {got} port names for {expected} ports")]
    PortNameCount {
        gate: String,
        expected: usize,
        got: usize,
    },

    /// A custom gate was declared with no output truth tables.
    #[error("gate {gate} declares no outputs")]
    NoOutputs { gate: String },

    /// A custom gate was given a truth table over the wrong input count.
    #[error("truth table of gate {gate} covers {got} inputs, the gate has {expected}")]
    TableInputMismatch {
        gate: String,
        expected: usize,
        got: usize,
    },

    /// Propagation visited more levels than the circuit has gates, which is
    /// only possible when combinational gates feed back into themselves
    /// without a clocked break.
    #[error("combinational feedback cycle through gate {gate} with no clocked break")]
    FeedbackCycle { gate: String },

    /// Tick was requested on a gate that is not a flip-flop.
    #[error("gate {gate} is not clocked")]
    NotClockable { gate: String },

    /// Reset was requested on a constant or sequential gate.
    #[error("gate {gate} cannot be reset")]
    NotResettable { gate: String },

    /// An input-probe operation was requested on some other kind of gate.
    #[error("gate {gate} is not an input")]
    NotAnInput { gate: String },

    /// Fire was requested on a gate that is neither an input nor a constant.
    #[error("gate {gate} is not a source")]
    NotASource { gate: String },

    /// A test vector that does not line up with the circuit's input probes.
    #[error("test vector has {got} values, the circuit has {expected} inputs")]
    VectorWidth { expected: usize, got: usize },
}
