//! Smoke-test harness: drives a wired circuit with batches of input
//! vectors and reports what the output probes saw.

use crate::circuit::Circuit;
use crate::error::CircuitError;
use indexmap::IndexSet;
use log::{info, warn};
use rand::Rng;

/// Draws `count` distinct random input vectors of `width` bits.
///
/// The count is capped at `2^width`, the number of distinct vectors that
/// exist at that width.
pub fn random_vectors<R: Rng>(rng: &mut R, width: usize, count: usize) -> Vec<Vec<bool>> {
    let cap = if width >= usize::BITS as usize {
        usize::MAX
    } else {
        1usize << width
    };
    let count = count.min(cap);
    let mut vectors: IndexSet<Vec<bool>> = IndexSet::with_capacity(count);
    while vectors.len() < count {
        let vector: Vec<bool> = (0..width).map(|_| rng.gen()).collect();
        vectors.insert(vector);
    }
    vectors.into_iter().collect()
}

/// What one input vector produced: the value driven into each input probe
/// and the value each output probe ended up with, [None] where the probe
/// never filled.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VectorReport {
    pub inputs: Vec<(String, bool)>,
    pub outputs: Vec<(String, Option<bool>)>,
}

/// Runs every vector through the circuit: ticks each clockable gate once
/// up front, then per vector stores and fires each input probe in
/// construction order, re-fires the constants, and samples the output
/// probes.
///
/// Gates still unfilled after a vector are logged as warnings, they point
/// at inputs the circuit description forgot to wire.
pub fn run_vectors(
    circuit: &mut Circuit,
    vectors: &[Vec<bool>],
) -> Result<Vec<VectorReport>, CircuitError> {
    let inputs = circuit.input_probes();
    let outputs = circuit.output_probes();
    let constants = circuit.constants();
    circuit.tick_all()?;

    let mut reports = Vec::with_capacity(vectors.len());
    for vector in vectors {
        if vector.len() != inputs.len() {
            return Err(CircuitError::VectorWidth {
                expected: inputs.len(),
                got: vector.len(),
            });
        }
        for (&probe, &value) in inputs.iter().zip(vector) {
            circuit.set_input_and_fire(probe, value)?;
        }
        for &constant in &constants {
            circuit.fire(constant)?;
        }
        for idx in circuit.indices() {
            if !circuit.is_filled(idx) {
                warn!("gate {} is not connected", circuit.name(idx));
            }
        }

        let report = VectorReport {
            inputs: inputs
                .iter()
                .zip(vector)
                .map(|(&probe, &value)| (circuit.name(probe).to_string(), value))
                .collect(),
            outputs: outputs
                .iter()
                .map(|&probe| (circuit.name(probe).to_string(), circuit.get_output(probe).ok()))
                .collect(),
        };
        log_report(&report);
        reports.push(report);
    }
    Ok(reports)
}

fn log_report(report: &VectorReport) {
    info!("--Input--");
    for (name, value) in &report.inputs {
        info!("{} = {}", name, value);
    }
    info!("--Output--");
    for (name, value) in &report.outputs {
        match value {
            Some(value) => info!("{} = {}", name, value),
            None => info!("{} = N/A", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{FlipFlopKind, GateIndex, NaryOp, TruthTable};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn full_adder() -> (Circuit, [GateIndex; 3]) {
        let mut c = Circuit::new();
        let a = c.add_input("a", false);
        let b = c.add_input("b", false);
        let cin = c.add_input("cin", false);
        let sum = c.add_nary(NaryOp::Xor, "sum", 3, &[]).unwrap();
        let majority = TruthTable::from_fn(3, |m| m.count_ones() >= 2).unwrap();
        let carry = c.add_custom("carry", 3, &[], &[], vec![majority]).unwrap();
        let s = c.add_output("s");
        let cout = c.add_output("cout");

        for (port, &probe) in [a, b, cin].iter().enumerate() {
            c.connect(probe, sum, port + 1).unwrap();
            c.connect(probe, carry, port + 1).unwrap();
        }
        c.connect(sum, s, 1).unwrap();
        c.connect(carry, cout, 1).unwrap();
        (c, [a, b, cin])
    }

    #[test]
    fn test_full_adder_exhaustive() {
        let (mut circuit, _) = full_adder();
        let vectors: Vec<Vec<bool>> = (0..8usize)
            .map(|v| (0..3).map(|i| v >> i & 1 == 1).collect())
            .collect();

        let reports = run_vectors(&mut circuit, &vectors).unwrap();
        assert_eq!(reports.len(), 8);
        for (vector, report) in vectors.iter().zip(&reports) {
            let total = vector.iter().filter(|&&b| b).count();
            assert_eq!(report.outputs[0], ("s".to_string(), Some(total % 2 == 1)));
            assert_eq!(report.outputs[1], ("cout".to_string(), Some(total >= 2)));
        }
    }

    #[test]
    fn test_report_names_inputs_in_construction_order() {
        let (mut circuit, _) = full_adder();
        let reports = run_vectors(&mut circuit, &[vec![true, false, true]]).unwrap();
        assert_eq!(
            reports[0].inputs,
            vec![
                ("a".to_string(), true),
                ("b".to_string(), false),
                ("cin".to_string(), true)
            ]
        );
    }

    #[test]
    fn test_unwired_output_reports_none() {
        let mut c = Circuit::new();
        let a = c.add_input("a", false);
        let not = c.add_not("not");
        c.connect(a, not, 1).unwrap();
        c.add_output("floating");

        let reports = run_vectors(&mut c, &[vec![true]]).unwrap();
        assert_eq!(reports[0].outputs, vec![("floating".to_string(), None)]);
    }

    #[test]
    fn test_clockables_tick_once_before_vectors() {
        let mut c = Circuit::new();
        let a = c.add_input("a", true);
        let ff = c.add_flip_flop(FlipFlopKind::T, "ff", &[], &[]).unwrap();
        let q = c.add_output("q");
        c.connect(a, ff, 1).unwrap();
        c.connect_from(ff, 1, q, 1).unwrap();

        // The up-front tick fills the probe, so the first vector reports
        // the flip-flop's state instead of N/A.
        let reports = run_vectors(&mut c, &[vec![true]]).unwrap();
        assert_eq!(reports[0].outputs, vec![("q".to_string(), Some(false))]);

        // The vector above latched T=true, the next round's tick toggles.
        let reports = run_vectors(&mut c, &[vec![true]]).unwrap();
        assert_eq!(reports[0].outputs, vec![("q".to_string(), Some(true))]);
    }

    #[test]
    fn test_vector_width_is_checked() {
        let (mut circuit, _) = full_adder();
        assert_eq!(
            run_vectors(&mut circuit, &[vec![true, false]]).unwrap_err(),
            CircuitError::VectorWidth {
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn test_random_vectors_are_distinct_and_capped() {
        let mut rng = StdRng::seed_from_u64(7);
        let vectors = random_vectors(&mut rng, 2, 100);
        assert_eq!(vectors.len(), 4);
        for vector in &vectors {
            assert_eq!(vector.len(), 2);
        }
        let distinct: IndexSet<_> = vectors.iter().cloned().collect();
        assert_eq!(distinct.len(), vectors.len());
    }

    #[test]
    fn test_random_vectors_deterministic_per_seed() {
        let a = random_vectors(&mut StdRng::seed_from_u64(42), 5, 10);
        let b = random_vectors(&mut StdRng::seed_from_u64(42), 5, 10);
        assert_eq!(a, b);
    }
}
