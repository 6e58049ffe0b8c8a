use super::Circuit;
use crate::error::CircuitError;
use crate::gate::{FlipFlopKind, GateIndex, GateKind, UnaryKind};

/// One pending delivery of a value to an input port.
///
/// Propagation is a worklist of these instead of nested gate calls, deep
/// circuits cannot overflow the stack.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct PortUpdate {
    pub target: GateIndex,
    pub port: usize,
    pub value: bool,
}

impl Circuit {
    /// Delivers `value` to input `port` (1-based) of `gate` and propagates
    /// until the circuit quiesces.
    ///
    /// A combinational gate latches the value, fills once every port has
    /// been seen this epoch, and once filled re-evaluates and re-drives its
    /// whole fan-out on every activation. Flip-flops only latch, their
    /// outputs move on [tick](Circuit::tick).
    ///
    /// Returns [CircuitError::FeedbackCycle] if the updates never quiesce,
    /// which happens exactly when combinational gates feed back into
    /// themselves without a clocked break. The pass is abandoned; latched
    /// values written before the error stick.
    pub fn activate(&mut self, gate: GateIndex, port: usize, value: bool) -> Result<(), CircuitError> {
        self.check_input_port(gate, port)?;
        self.queue.push(PortUpdate {
            target: gate,
            port,
            value,
        });
        self.drain()
    }

    /// Drains the update queue level by level until it quiesces.
    ///
    /// Every level moves values one wire further, so an acyclic circuit
    /// quiesces within `gates.len()` levels (the longest possible path).
    /// Filled gates re-drive their fan-out unconditionally, a combinational
    /// cycle therefore never quiesces and overrunning the bound proves one.
    fn drain(&mut self) -> Result<(), CircuitError> {
        let max_levels = self.gates.len() + 1;
        let mut levels = 0;
        while !self.queue.is_empty() {
            self.queue.swap();
            levels += 1;
            if levels > max_levels {
                let gate = self
                    .queue
                    .pop()
                    .map(|update| self.gates[update.target.idx].name.clone())
                    .unwrap_or_default();
                self.queue.clear();
                return Err(CircuitError::FeedbackCycle { gate });
            }
            while let Some(update) = self.queue.pop() {
                self.apply(update);
            }
        }
        Ok(())
    }

    /// Applies one update to its target gate, queueing the downstream
    /// updates it causes. Port numbers are validated before queueing, so
    /// indexing here cannot fail.
    fn apply(&mut self, update: PortUpdate) {
        let PortUpdate {
            target,
            port,
            value,
        } = update;
        let slot = port - 1;
        let gate = &mut self.gates[target.idx];
        match &gate.kind {
            GateKind::FlipFlop { kind, .. } => {
                // Activation only latches the controls. Only the D variant
                // exposes its latch through the fill flag.
                let fills = matches!(kind, FlipFlopKind::D);
                gate.inputs[slot] = value;
                gate.seen[slot] = true;
                if fills {
                    gate.filled = true;
                }
            }
            GateKind::Unary(UnaryKind::Output) => {
                gate.inputs[0] = value;
                gate.seen[0] = true;
                gate.filled = true;
                gate.evaluate();
                self.dirty_outputs.insert(target);
            }
            _ => {
                gate.inputs[slot] = value;
                gate.seen[slot] = true;
                if gate.filled || gate.saturated() {
                    gate.filled = true;
                    gate.evaluate();
                    self.push_fanout(target);
                }
            }
        }
    }

    /// Queues the current value of every output port of `source` onto the
    /// fan-out wires, in wiring order.
    fn push_fanout(&mut self, source: GateIndex) {
        let gate = &self.gates[source.idx];
        for (port_index, connections) in gate.fanout.iter().enumerate() {
            let value = gate.outputs[port_index];
            for connection in connections {
                self.queue.push(PortUpdate {
                    target: connection.target,
                    port: connection.port,
                    value,
                });
            }
        }
    }

    /// Advances the flip-flop `gate` one clock edge: computes the next Q
    /// from the latched controls, drives Q and Q' downstream and propagates.
    ///
    /// Returns [CircuitError::NotClockable] for combinational gates.
    pub fn tick(&mut self, gate: GateIndex) -> Result<(), CircuitError> {
        let g = &mut self.gates[gate.idx];
        let q = match &mut g.kind {
            GateKind::FlipFlop { kind, state } => {
                let q = match kind {
                    FlipFlopKind::D => g.inputs[0],
                    FlipFlopKind::T => *state ^ g.inputs[0],
                    // Characteristic equation Q+ = JQ' + K'Q.
                    FlipFlopKind::Jk => (g.inputs[0] && !*state) || (!g.inputs[1] && *state),
                };
                // D has no memory of its own, Q simply follows the latch.
                if !matches!(kind, FlipFlopKind::D) {
                    *state = q;
                }
                q
            }
            _ => {
                return Err(CircuitError::NotClockable {
                    gate: g.name.clone(),
                })
            }
        };
        g.outputs[0] = q;
        g.outputs[1] = !q;
        self.push_fanout(gate);
        self.drain()
    }

    /// Ticks every flip-flop in construction order.
    pub fn tick_all(&mut self) -> Result<(), CircuitError> {
        for gate in self.clockables() {
            self.tick(gate)?;
        }
        Ok(())
    }

    /// Drives the stored value of an input probe or constant down its
    /// fan-out and propagates.
    pub fn fire(&mut self, gate: GateIndex) -> Result<(), CircuitError> {
        let g = &self.gates[gate.idx];
        match g.kind {
            GateKind::Unary(UnaryKind::Input)
            | GateKind::Unary(UnaryKind::True)
            | GateKind::Unary(UnaryKind::False) => {
                self.push_fanout(gate);
                self.drain()
            }
            _ => Err(CircuitError::NotASource {
                gate: g.name.clone(),
            }),
        }
    }

    /// Stores `value` on an input probe without propagating it.
    pub fn set_input(&mut self, gate: GateIndex, value: bool) -> Result<(), CircuitError> {
        let g = &mut self.gates[gate.idx];
        match g.kind {
            GateKind::Unary(UnaryKind::Input) => {
                g.inputs[0] = value;
                g.outputs[0] = value;
                g.seen[0] = true;
                g.filled = true;
                Ok(())
            }
            _ => Err(CircuitError::NotAnInput {
                gate: g.name.clone(),
            }),
        }
    }

    /// Stores `value` on an input probe and immediately drives it.
    pub fn set_input_and_fire(&mut self, gate: GateIndex, value: bool) -> Result<(), CircuitError> {
        self.set_input(gate, value)?;
        self.fire(gate)
    }

    /// Clears the latched inputs, seen flags, fill flag and outputs of
    /// `gate`, starting a fresh epoch for it.
    ///
    /// Constants and flip-flops are not resettable: constants are their
    /// value, and clearing a flip-flop would silently drop sequential state.
    pub fn reset(&mut self, gate: GateIndex) -> Result<(), CircuitError> {
        let g = &mut self.gates[gate.idx];
        if resettable(&g.kind) {
            g.clear_epoch();
            Ok(())
        } else {
            Err(CircuitError::NotResettable {
                gate: g.name.clone(),
            })
        }
    }

    /// Resets every resettable gate and drops pending dirty-output signals.
    pub fn reset_all(&mut self) {
        for gate in &mut self.gates {
            if resettable(&gate.kind) {
                gate.clear_epoch();
            }
        }
        self.dirty_outputs.clear();
    }
}

fn resettable(kind: &GateKind) -> bool {
    !matches!(
        kind,
        GateKind::Unary(UnaryKind::True)
            | GateKind::Unary(UnaryKind::False)
            | GateKind::FlipFlop { .. }
    )
}
