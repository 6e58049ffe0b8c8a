//! Demo driver: wires a full adder with a carry-fed toggle bit, pounds it
//! with random input vectors and dumps the wiring as a dot file.

use gatesim::harness::{random_vectors, run_vectors};
use gatesim::{Circuit, FlipFlopKind, NaryOp, TruthTable};
use log::info;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut circuit = Circuit::new();
    let a = circuit.add_input("a", false);
    let b = circuit.add_input("b", false);
    let cin = circuit.add_input("cin", false);

    let sum = circuit.add_nary(NaryOp::Xor, "sum", 3, &[])?;
    let majority = TruthTable::from_fn(3, |minterm| minterm.count_ones() >= 2)?;
    let carry = circuit.add_custom("carry", 3, &[], &[], vec![majority])?;

    let s = circuit.add_output("s");
    let cout = circuit.add_output("cout");

    for (port, &probe) in [a, b, cin].iter().enumerate() {
        circuit.connect(probe, sum, port + 1)?;
        circuit.connect(probe, carry, port + 1)?;
    }
    circuit.connect(sum, s, 1)?;
    circuit.connect(carry, cout, 1)?;

    // Toggle bit clocked off the carry line, with both rails probed.
    let toggle = circuit.add_flip_flop(FlipFlopKind::T, "toggle", &["t"], &["q", "nq"])?;
    let q = circuit.add_output("q");
    let nq = circuit.add_output("nq");
    circuit.connect(carry, toggle, 1)?;
    circuit.connect_from(toggle, 1, q, 1)?;
    circuit.connect_from(toggle, 2, nq, 1)?;

    let vectors = random_vectors(&mut rand::thread_rng(), 3, 6);
    for vector in &vectors {
        run_vectors(&mut circuit, std::slice::from_ref(vector))?;
        circuit.tick_all()?;
    }

    for probe in circuit.take_dirty_outputs() {
        info!(
            "{} settled at {}",
            circuit.name(probe),
            circuit.get_output(probe)?
        );
    }

    circuit.dump_dot("adder.dot")?;
    info!("wrote adder.dot");
    Ok(())
}
