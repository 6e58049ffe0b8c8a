//! Activation-driven simulation of boolean gate circuits.
//!
//! A [Circuit] is an arena of gates wired port to port. Values are pushed
//! in through 1-based input ports with [Circuit::activate] (or through
//! input probes with [Circuit::set_input_and_fire]) and propagate through
//! an explicit worklist until the circuit quiesces. A gate computes its
//! output once every input port has received a value, and from then on
//! recomputes and re-drives its fan-out on every activation.
//!
//! Beyond the basic boolean operators the gate set covers truth-table
//! gates with multiple outputs, decoders, multiplexers and clocked D, T
//! and JK flip-flops that advance on [Circuit::tick].
//!
//! # Example
//! ```
//! use gatesim::{Circuit, NaryOp};
//!
//! // A half adder: s = a ^ b, c = a & b.
//! let mut circuit = Circuit::new();
//! let a = circuit.add_input("a", false);
//! let b = circuit.add_input("b", false);
//! let xor = circuit.add_nary(NaryOp::Xor, "xor", 2, &[]).unwrap();
//! let and = circuit.add_nary(NaryOp::And, "and", 2, &[]).unwrap();
//! let s = circuit.add_output("s");
//! let c = circuit.add_output("c");
//!
//! circuit.connect(a, xor, 1).unwrap();
//! circuit.connect(b, xor, 2).unwrap();
//! circuit.connect(a, and, 1).unwrap();
//! circuit.connect(b, and, 2).unwrap();
//! circuit.connect(xor, s, 1).unwrap();
//! circuit.connect(and, c, 1).unwrap();
//!
//! circuit.set_input_and_fire(a, true).unwrap();
//! circuit.set_input_and_fire(b, true).unwrap();
//!
//! assert_eq!(circuit.get_output(s).unwrap(), false);
//! assert_eq!(circuit.get_output(c).unwrap(), true);
//! ```
pub mod circuit;
pub mod data_structures;
pub mod error;
pub mod gate;
pub mod harness;

pub use circuit::Circuit;
pub use error::CircuitError;
pub use gate::{
    minterm_lsb_first, minterm_msb_first, FlipFlopKind, GateIndex, NaryOp, TruthTable,
    MAX_TABLE_INPUTS,
};
