mod propagation;
pub(crate) use propagation::PortUpdate;

use crate::data_structures::DoubleStack;
use crate::error::CircuitError;
use crate::gate::*;
use indexmap::IndexSet;

/// A wired collection of gates and the engine that drives it.
///
/// Gates live in an arena addressed by [GateIndex]; all latched input,
/// fill and output state is owned here and mutated only through the
/// activation, tick and reset entry points, which keeps the single-threaded
/// determinism of the simulation explicit.
///
/// Assembly happens through the `add_*` constructors and [Circuit::connect],
/// normally invoked by an external circuit-description builder. Once wired,
/// the runtime surface is [activate](Circuit::activate),
/// [get_output](Circuit::get_output), [tick](Circuit::tick) and
/// [reset](Circuit::reset).
///
/// # Example
/// ```
/// use gatesim::{Circuit, NaryOp};
///
/// let mut c = Circuit::new();
/// let a = c.add_input("a", false);
/// let b = c.add_input("b", false);
/// let and = c.add_nary(NaryOp::And, "and", 2, &[]).unwrap();
/// let out = c.add_output("out");
///
/// c.connect(a, and, 1).unwrap();
/// c.connect(b, and, 2).unwrap();
/// c.connect(and, out, 1).unwrap();
///
/// c.set_input_and_fire(a, true).unwrap();
/// c.set_input_and_fire(b, true).unwrap();
/// assert_eq!(c.get_output(out).unwrap(), true);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    pub(crate) gates: Vec<Gate>,
    pub(crate) queue: DoubleStack<PortUpdate>,
    pub(crate) dirty_outputs: IndexSet<GateIndex>,
}

/// Validates an optional port-name list against the declared arity.
fn port_names(gate: &str, names: &[&str], expected: usize) -> Result<PortNames, CircuitError> {
    if names.is_empty() {
        return Ok(PortNames::default());
    }
    if names.len() != expected {
        return Err(CircuitError::PortNameCount {
            gate: gate.into(),
            expected,
            got: names.len(),
        });
    }
    Ok(PortNames::new(names))
}

impl Circuit {
    /// Returns an empty circuit.
    pub fn new() -> Circuit {
        Circuit::default()
    }

    fn push_gate(&mut self, gate: Gate) -> GateIndex {
        let idx = GateIndex::new(self.gates.len());
        self.gates.push(gate);
        idx
    }

    /// Adds an N-ary combinational gate computing `op` over `inputs` input
    /// ports. `input_names` is either empty or one name per port.
    pub fn add_nary<S: Into<String>>(
        &mut self,
        op: NaryOp,
        name: S,
        inputs: usize,
        input_names: &[&str],
    ) -> Result<GateIndex, CircuitError> {
        let name = name.into();
        if inputs == 0 {
            return Err(CircuitError::InvalidArity {
                gate: name,
                arity: inputs,
            });
        }
        let input_names = port_names(&name, input_names, inputs)?;
        Ok(self.push_gate(Gate::new(
            name,
            GateKind::Nary(op),
            inputs,
            1,
            input_names,
            PortNames::default(),
        )))
    }

    /// Adds a gate that copies its single input to its output.
    pub fn add_identity<S: Into<String>>(&mut self, name: S) -> GateIndex {
        self.add_unary(name.into(), UnaryKind::Identity)
    }

    /// Adds a gate that inverts its single input.
    pub fn add_not<S: Into<String>>(&mut self, name: S) -> GateIndex {
        self.add_unary(name.into(), UnaryKind::Not)
    }

    /// Adds a constant gate that always emits `value`. It is pre-filled at
    /// construction and needs no external input; drive downstream gates
    /// with [fire](Circuit::fire).
    pub fn add_constant<S: Into<String>>(&mut self, name: S, value: bool) -> GateIndex {
        let kind = if value { UnaryKind::True } else { UnaryKind::False };
        let idx = self.add_unary(name.into(), kind);
        let gate = &mut self.gates[idx.idx];
        gate.inputs[0] = value;
        gate.seen[0] = true;
        gate.outputs[0] = value;
        gate.filled = true;
        idx
    }

    /// Adds an input probe holding `initial`. The probe republishes its
    /// stored value through [set_input](Circuit::set_input),
    /// [fire](Circuit::fire) and
    /// [set_input_and_fire](Circuit::set_input_and_fire).
    pub fn add_input<S: Into<String>>(&mut self, name: S, initial: bool) -> GateIndex {
        let idx = self.add_unary(name.into(), UnaryKind::Input);
        let gate = &mut self.gates[idx.idx];
        gate.inputs[0] = initial;
        gate.seen[0] = true;
        gate.outputs[0] = initial;
        gate.filled = true;
        idx
    }

    /// Adds an output probe. It propagates nothing; every activation marks
    /// it dirty for [take_dirty_outputs](Circuit::take_dirty_outputs).
    pub fn add_output<S: Into<String>>(&mut self, name: S) -> GateIndex {
        self.add_unary(name.into(), UnaryKind::Output)
    }

    fn add_unary(&mut self, name: String, kind: UnaryKind) -> GateIndex {
        self.push_gate(Gate::new(
            name,
            GateKind::Unary(kind),
            1,
            1,
            PortNames::default(),
            PortNames::default(),
        ))
    }

    /// Adds a truth-table gate with one output per table. Tables encode the
    /// input vector with [minterm_msb_first] and must each cover exactly the
    /// declared input count.
    pub fn add_custom<S: Into<String>>(
        &mut self,
        name: S,
        inputs: usize,
        input_names: &[&str],
        output_names: &[&str],
        tables: Vec<TruthTable>,
    ) -> Result<GateIndex, CircuitError> {
        let name = name.into();
        if inputs == 0 || inputs > MAX_TABLE_INPUTS {
            return Err(CircuitError::UnsupportedArity(inputs));
        }
        if tables.is_empty() {
            return Err(CircuitError::NoOutputs { gate: name });
        }
        for table in &tables {
            if table.inputs() != inputs {
                return Err(CircuitError::TableInputMismatch {
                    gate: name,
                    expected: inputs,
                    got: table.inputs(),
                });
            }
        }
        let outputs = tables.len();
        let input_names = port_names(&name, input_names, inputs)?;
        let output_names = port_names(&name, output_names, outputs)?;
        Ok(self.push_gate(Gate::new(
            name,
            GateKind::Custom { tables },
            inputs,
            outputs,
            input_names,
            output_names,
        )))
    }

    /// Adds a decoder: `inputs` inputs one-hot asserting one of `2^inputs`
    /// outputs. Inputs contribute increasing powers of two in declaration
    /// order ([minterm_lsb_first]).
    pub fn add_decoder<S: Into<String>>(
        &mut self,
        name: S,
        inputs: usize,
        input_names: &[&str],
        output_names: &[&str],
    ) -> Result<GateIndex, CircuitError> {
        let name = name.into();
        if inputs == 0 || inputs > MAX_TABLE_INPUTS {
            return Err(CircuitError::UnsupportedArity(inputs));
        }
        let outputs = 1usize << inputs;
        let input_names = port_names(&name, input_names, inputs)?;
        let output_names = port_names(&name, output_names, outputs)?;
        Ok(self.push_gate(Gate::new(
            name,
            GateKind::Decoder,
            inputs,
            outputs,
            input_names,
            output_names,
        )))
    }

    /// Adds a multiplexer over `data_inputs` data ports (a power of two).
    /// The first `log2(data_inputs)` port numbers are the controls, data
    /// ports follow. The control minterm selects the data port with
    /// [minterm_lsb_first] encoding, kept exactly as the original routing
    /// even though the addressing convention is unverified.
    pub fn add_multiplexer<S: Into<String>>(
        &mut self,
        name: S,
        data_inputs: usize,
        input_names: &[&str],
    ) -> Result<GateIndex, CircuitError> {
        let name = name.into();
        if data_inputs < 2 || !data_inputs.is_power_of_two() {
            return Err(CircuitError::InvalidArity {
                gate: name,
                arity: data_inputs,
            });
        }
        let controls = data_inputs.trailing_zeros() as usize;
        let total = controls + data_inputs;
        let input_names = port_names(&name, input_names, total)?;
        Ok(self.push_gate(Gate::new(
            name,
            GateKind::Multiplexer { controls },
            total,
            1,
            input_names,
            PortNames::default(),
        )))
    }

    /// Adds a clocked flip-flop with outputs Q and Q'. D and T take one
    /// control input, JK takes two (port 1 is J, port 2 is K). Activation
    /// only latches the controls; state advances on [tick](Circuit::tick).
    pub fn add_flip_flop<S: Into<String>>(
        &mut self,
        kind: FlipFlopKind,
        name: S,
        input_names: &[&str],
        output_names: &[&str],
    ) -> Result<GateIndex, CircuitError> {
        let name = name.into();
        let inputs = match kind {
            FlipFlopKind::D | FlipFlopKind::T => 1,
            FlipFlopKind::Jk => 2,
        };
        let input_names = port_names(&name, input_names, inputs)?;
        let output_names = port_names(&name, output_names, 2)?;
        Ok(self.push_gate(Gate::new(
            name,
            GateKind::FlipFlop { kind, state: false },
            inputs,
            2,
            input_names,
            output_names,
        )))
    }

    /// Wires `source`'s primary output to `port` (1-based) on `target`.
    ///
    /// # Panics
    ///
    /// Panics if either index does not belong to this circuit.
    pub fn connect(
        &mut self,
        source: GateIndex,
        target: GateIndex,
        port: usize,
    ) -> Result<(), CircuitError> {
        self.connect_from(source, 1, target, port)
    }

    /// Wires output `output_port` (1-based) of `source` to input `port`
    /// (1-based) on `target`. Both port numbers are validated here, at
    /// wiring time, so a mis-addressed wire can never corrupt a running
    /// circuit.
    ///
    /// # Panics
    ///
    /// Panics if either index does not belong to this circuit.
    pub fn connect_from(
        &mut self,
        source: GateIndex,
        output_port: usize,
        target: GateIndex,
        port: usize,
    ) -> Result<(), CircuitError> {
        self.check_output_port(source, output_port)?;
        self.check_input_port(target, port)?;
        self.gates[source.idx].fanout[output_port - 1].push(Connection { target, port });
        Ok(())
    }

    pub(crate) fn check_input_port(
        &self,
        gate: GateIndex,
        port: usize,
    ) -> Result<(), CircuitError> {
        let g = &self.gates[gate.idx];
        if port == 0 || port > g.inputs.len() {
            return Err(CircuitError::PortOutOfRange {
                gate: g.name.clone(),
                port,
                count: g.inputs.len(),
            });
        }
        Ok(())
    }

    fn check_output_port(&self, gate: GateIndex, port: usize) -> Result<(), CircuitError> {
        let g = &self.gates[gate.idx];
        if port == 0 || port > g.fanout.len() {
            return Err(CircuitError::PortOutOfRange {
                gate: g.name.clone(),
                port,
                count: g.fanout.len(),
            });
        }
        Ok(())
    }

    /// Returns the name of `gate`.
    pub fn name(&self, gate: GateIndex) -> &str {
        &self.gates[gate.idx].name
    }

    /// Returns true once `gate` has computed output at least once this
    /// epoch.
    pub fn is_filled(&self, gate: GateIndex) -> bool {
        self.gates[gate.idx].filled
    }

    /// Reads the primary output of `gate`.
    ///
    /// Returns [CircuitError::NotReady] until the gate has been filled;
    /// callers that cannot guarantee upstream fill render that as "N/A".
    pub fn get_output(&self, gate: GateIndex) -> Result<bool, CircuitError> {
        self.get_output_at(gate, 1)
    }

    /// Reads output `port` (1-based) of `gate`.
    pub fn get_output_at(&self, gate: GateIndex, port: usize) -> Result<bool, CircuitError> {
        self.check_output_port(gate, port)?;
        let g = &self.gates[gate.idx];
        if !g.filled {
            return Err(CircuitError::NotReady {
                gate: g.name.clone(),
            });
        }
        Ok(g.outputs[port - 1])
    }

    /// Reads every output of `gate` in port order.
    pub fn get_outputs(&self, gate: GateIndex) -> Result<&[bool], CircuitError> {
        let g = &self.gates[gate.idx];
        if !g.filled {
            return Err(CircuitError::NotReady {
                gate: g.name.clone(),
            });
        }
        Ok(&g.outputs)
    }

    /// Resolves a declared input-port name on `gate` to its 1-based port
    /// number.
    pub fn input_port(&self, gate: GateIndex, name: &str) -> Option<usize> {
        self.gates[gate.idx].input_names.get(name)
    }

    /// Resolves a declared output-port name on `gate` to its 1-based port
    /// number.
    pub fn output_port(&self, gate: GateIndex, name: &str) -> Option<usize> {
        self.gates[gate.idx].output_names.get(name)
    }

    /// Returns the number of gates in the circuit.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Returns true if the circuit has no gates.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Returns every gate index in construction order.
    pub fn indices(&self) -> impl Iterator<Item = GateIndex> {
        (0..self.gates.len()).map(GateIndex::new)
    }

    /// Returns the input probes in construction order.
    pub fn input_probes(&self) -> Vec<GateIndex> {
        self.filter_kind(|kind| matches!(kind, GateKind::Unary(UnaryKind::Input)))
    }

    /// Returns the output probes in construction order.
    pub fn output_probes(&self) -> Vec<GateIndex> {
        self.filter_kind(|kind| matches!(kind, GateKind::Unary(UnaryKind::Output)))
    }

    /// Returns the constant true/false gates in construction order.
    pub fn constants(&self) -> Vec<GateIndex> {
        self.filter_kind(|kind| {
            matches!(
                kind,
                GateKind::Unary(UnaryKind::True) | GateKind::Unary(UnaryKind::False)
            )
        })
    }

    /// Returns the clockable gates (flip-flops) in construction order.
    pub fn clockables(&self) -> Vec<GateIndex> {
        self.filter_kind(|kind| matches!(kind, GateKind::FlipFlop { .. }))
    }

    fn filter_kind<F: Fn(&GateKind) -> bool>(&self, f: F) -> Vec<GateIndex> {
        self.gates
            .iter()
            .enumerate()
            .filter(|(_, gate)| f(&gate.kind))
            .map(|(i, _)| GateIndex::new(i))
            .collect()
    }

    /// Drains the output probes that have been activated since the last
    /// call, in activation order. The display collaborator polls this
    /// instead of hooking into the engine.
    pub fn take_dirty_outputs(&mut self) -> Vec<GateIndex> {
        let dirty: Vec<_> = self.dirty_outputs.iter().copied().collect();
        self.dirty_outputs.clear();
        dirty
    }

    /// Dumps the wired circuit in [dot](https://en.wikipedia.org/wiki/DOT_(graph_description_language))
    /// format to `path` for external visualization.
    pub fn dump_dot<P: AsRef<std::path::Path>>(&self, path: P) -> std::io::Result<()> {
        use petgraph::dot::{Config, Dot};
        use std::io::Write;
        let mut f = std::fs::File::create(path)?;
        let mut graph = petgraph::Graph::<String, ()>::new();
        let nodes: Vec<_> = self
            .gates
            .iter()
            .map(|gate| graph.add_node(format!("{}:{}", gate.kind, gate.name)))
            .collect();
        for (i, gate) in self.gates.iter().enumerate() {
            for connections in &gate.fanout {
                for connection in connections {
                    graph.add_edge(nodes[i], nodes[connection.target.idx], ());
                }
            }
        }
        write!(f, "{:?}", Dot::with_config(&graph, &[Config::EdgeNoLabel]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_arity_rejected() {
        let mut c = Circuit::new();
        assert_eq!(
            c.add_nary(NaryOp::And, "and", 0, &[]).unwrap_err(),
            CircuitError::InvalidArity {
                gate: "and".into(),
                arity: 0
            }
        );
    }

    #[test]
    fn test_port_name_count_must_match_arity() {
        let mut c = Circuit::new();
        let err = c.add_nary(NaryOp::Or, "or", 3, &["a", "b"]).unwrap_err();
        assert_eq!(
            err,
            CircuitError::PortNameCount {
                gate: "or".into(),
                expected: 3,
                got: 2
            }
        );

        // Empty lists mean positional ports.
        let or = c.add_nary(NaryOp::Or, "or", 3, &[]).unwrap();
        assert_eq!(c.input_port(or, "a"), None);
    }

    #[test]
    fn test_named_port_lookup() {
        let mut c = Circuit::new();
        let jk = c
            .add_flip_flop(FlipFlopKind::Jk, "jk", &["j", "k"], &["q", "nq"])
            .unwrap();
        assert_eq!(c.input_port(jk, "j"), Some(1));
        assert_eq!(c.input_port(jk, "k"), Some(2));
        assert_eq!(c.output_port(jk, "nq"), Some(2));
        assert_eq!(c.input_port(jk, "missing"), None);
    }

    #[test]
    fn test_connect_validates_ports_at_wiring_time() {
        let mut c = Circuit::new();
        let a = c.add_input("a", false);
        let and = c.add_nary(NaryOp::And, "and", 2, &[]).unwrap();

        assert_eq!(
            c.connect(a, and, 3).unwrap_err(),
            CircuitError::PortOutOfRange {
                gate: "and".into(),
                port: 3,
                count: 2
            }
        );
        assert_eq!(
            c.connect(a, and, 0).unwrap_err(),
            CircuitError::PortOutOfRange {
                gate: "and".into(),
                port: 0,
                count: 2
            }
        );
        assert_eq!(
            c.connect_from(and, 2, a, 1).unwrap_err(),
            CircuitError::PortOutOfRange {
                gate: "and".into(),
                port: 2,
                count: 1
            }
        );

        assert!(c.connect(a, and, 1).is_ok());
    }

    #[test]
    fn test_multiplexer_arity_must_be_power_of_two() {
        let mut c = Circuit::new();
        assert_eq!(
            c.add_multiplexer("mux", 3, &[]).unwrap_err(),
            CircuitError::InvalidArity {
                gate: "mux".into(),
                arity: 3
            }
        );
        assert_eq!(
            c.add_multiplexer("mux", 1, &[]).unwrap_err(),
            CircuitError::InvalidArity {
                gate: "mux".into(),
                arity: 1
            }
        );

        // 4 data inputs need 2 controls, 6 ports in total.
        let mux = c.add_multiplexer("mux", 4, &[]).unwrap();
        let i = c.add_input("i", false);
        assert!(c.connect_from(i, 1, mux, 6).is_ok());
        assert_eq!(
            c.check_input_port(mux, 7).unwrap_err(),
            CircuitError::PortOutOfRange {
                gate: "mux".into(),
                port: 7,
                count: 6
            }
        );
    }

    #[test]
    fn test_custom_table_must_match_input_count() {
        let mut c = Circuit::new();
        let table = TruthTable::from_fn(3, |m| m == 0).unwrap();
        assert_eq!(
            c.add_custom("custom", 2, &[], &[], vec![table]).unwrap_err(),
            CircuitError::TableInputMismatch {
                gate: "custom".into(),
                expected: 2,
                got: 3
            }
        );

        assert_eq!(
            c.add_custom("custom", 2, &[], &[], vec![]).unwrap_err(),
            CircuitError::NoOutputs {
                gate: "custom".into()
            }
        );
    }

    #[test]
    fn test_fresh_gate_output_is_not_ready() {
        let mut c = Circuit::new();
        let and = c.add_nary(NaryOp::And, "and", 2, &[]).unwrap();

        assert_eq!(
            c.get_output(and).unwrap_err(),
            CircuitError::NotReady { gate: "and".into() }
        );

        c.activate(and, 1, true).unwrap();
        assert_eq!(
            c.get_output(and).unwrap_err(),
            CircuitError::NotReady { gate: "and".into() }
        );

        c.activate(and, 2, true).unwrap();
        assert_eq!(c.get_output(and).unwrap(), true);
    }

    #[test]
    fn test_kind_queries() {
        let mut c = Circuit::new();
        let a = c.add_input("a", false);
        let t = c.add_constant("t", true);
        let not = c.add_not("not");
        let out = c.add_output("out");
        let ff = c.add_flip_flop(FlipFlopKind::D, "ff", &[], &[]).unwrap();

        assert_eq!(c.input_probes(), vec![a]);
        assert_eq!(c.constants(), vec![t]);
        assert_eq!(c.output_probes(), vec![out]);
        assert_eq!(c.clockables(), vec![ff]);
        assert_eq!(c.len(), 5);
        assert_eq!(c.name(not), "not");
    }

    #[test]
    fn test_constants_are_pre_filled() {
        let mut c = Circuit::new();
        let t = c.add_constant("t", true);
        let f = c.add_constant("f", false);

        assert!(c.is_filled(t));
        assert_eq!(c.get_output(t).unwrap(), true);
        assert_eq!(c.get_output(f).unwrap(), false);
    }
}
