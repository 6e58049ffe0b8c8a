use crate::error::CircuitError;

/// Truth tables (and the decoder) materialize one slot per input
/// combination, so the arity has to stay small enough for `1 << inputs`
/// to be a sane allocation.
pub const MAX_TABLE_INPUTS: usize = 16;

/// Encodes an input vector as a binary number, first bit most significant.
///
/// This is the convention custom gates use: for inputs `[a, b, c]` the
/// minterm is `a*4 + b*2 + c*1`.
///
/// # Example
/// ```
/// # use gatesim::gate::minterm_msb_first;
/// assert_eq!(minterm_msb_first(&[true, false]), 2);
/// assert_eq!(minterm_msb_first(&[false, true]), 1);
/// ```
pub fn minterm_msb_first(bits: &[bool]) -> usize {
    bits.iter().fold(0, |term, &b| (term << 1) | b as usize)
}

/// Encodes an input vector as a binary number, first bit least significant.
///
/// This is the convention the decoder and the multiplexer controls use:
/// for inputs `[a, b, c]` the minterm is `a*1 + b*2 + c*4`. It is
/// deliberately not unified with [minterm_msb_first], both orders are load
/// bearing for their gate kinds.
///
/// # Example
/// ```
/// # use gatesim::gate::minterm_lsb_first;
/// assert_eq!(minterm_lsb_first(&[true, false]), 1);
/// assert_eq!(minterm_lsb_first(&[false, true]), 2);
/// ```
pub fn minterm_lsb_first(bits: &[bool]) -> usize {
    bits.iter()
        .enumerate()
        .fold(0, |term, (i, &b)| term | ((b as usize) << i))
}

/// One output's behavior for a custom gate: a complete mapping from every
/// input combination (encoded with [minterm_msb_first]) to a boolean.
///
/// Completeness is checked at construction. A table with a missing,
/// duplicate or out-of-range entry is rejected up front, so evaluation can
/// never fall through to a silent default.
///
/// # Example
/// ```
/// # use gatesim::gate::TruthTable;
/// // Two-input XNOR as a table.
/// let table = TruthTable::new(2, &[(0, true), (1, false), (2, false), (3, true)]).unwrap();
/// assert_eq!(table.inputs(), 2);
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TruthTable {
    inputs: usize,
    values: Vec<bool>,
}

impl TruthTable {
    /// Builds a table over `inputs` inputs from `(minterm, output)` entries.
    ///
    /// There must be exactly one entry for each of the `2^inputs` reachable
    /// combinations.
    pub fn new(inputs: usize, entries: &[(usize, bool)]) -> Result<TruthTable, CircuitError> {
        if inputs == 0 || inputs > MAX_TABLE_INPUTS {
            return Err(CircuitError::UnsupportedArity(inputs));
        }
        let size = 1usize << inputs;

        let mut values = vec![None; size];
        for &(minterm, output) in entries {
            if minterm >= size {
                return Err(CircuitError::EntryOutOfRange { minterm, inputs });
            }
            if values[minterm].is_some() {
                return Err(CircuitError::DuplicateEntry(minterm));
            }
            values[minterm] = Some(output);
        }
        if let Some(minterm) = values.iter().position(Option::is_none) {
            return Err(CircuitError::UndefinedEntry(minterm));
        }

        Ok(TruthTable {
            inputs,
            values: values.into_iter().flatten().collect(),
        })
    }

    /// Builds a table over `inputs` inputs by evaluating `f` on every
    /// minterm.
    pub fn from_fn<F: Fn(usize) -> bool>(inputs: usize, f: F) -> Result<TruthTable, CircuitError> {
        if inputs == 0 || inputs > MAX_TABLE_INPUTS {
            return Err(CircuitError::UnsupportedArity(inputs));
        }
        Ok(TruthTable {
            inputs,
            values: (0..1usize << inputs).map(f).collect(),
        })
    }

    /// Returns the number of inputs the table covers.
    pub fn inputs(&self) -> usize {
        self.inputs
    }

    /// Looks up the output for a minterm. The table is complete by
    /// construction, every reachable minterm has a value.
    pub(crate) fn value(&self, minterm: usize) -> bool {
        self.values[minterm]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minterm_orders_disagree() {
        // First input is the high bit for custom gates and the low bit for
        // the decoder and multiplexer.
        let bits = [true, false, false];
        assert_eq!(minterm_msb_first(&bits), 4);
        assert_eq!(minterm_lsb_first(&bits), 1);

        let bits = [false, true, true];
        assert_eq!(minterm_msb_first(&bits), 3);
        assert_eq!(minterm_lsb_first(&bits), 6);
    }

    #[test]
    fn test_minterm_extremes() {
        assert_eq!(minterm_msb_first(&[false; 4]), 0);
        assert_eq!(minterm_lsb_first(&[false; 4]), 0);
        assert_eq!(minterm_msb_first(&[true; 4]), 15);
        assert_eq!(minterm_lsb_first(&[true; 4]), 15);
    }

    #[test]
    fn test_complete_table() {
        let table = TruthTable::new(2, &[(3, true), (0, true), (2, false), (1, false)]).unwrap();
        assert_eq!(table.value(0), true);
        assert_eq!(table.value(1), false);
        assert_eq!(table.value(2), false);
        assert_eq!(table.value(3), true);
    }

    #[test]
    fn test_missing_entry_rejected() {
        let err = TruthTable::new(2, &[(0, true), (1, false), (3, true)]).unwrap_err();
        assert_eq!(err, CircuitError::UndefinedEntry(2));
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let err = TruthTable::new(1, &[(0, true), (0, false)]).unwrap_err();
        assert_eq!(err, CircuitError::DuplicateEntry(0));
    }

    #[test]
    fn test_out_of_range_entry_rejected() {
        let err = TruthTable::new(1, &[(2, true)]).unwrap_err();
        assert_eq!(
            err,
            CircuitError::EntryOutOfRange {
                minterm: 2,
                inputs: 1
            }
        );
    }

    #[test]
    fn test_zero_inputs_rejected() {
        assert_eq!(
            TruthTable::new(0, &[]).unwrap_err(),
            CircuitError::UnsupportedArity(0)
        );
        assert_eq!(
            TruthTable::from_fn(17, |_| false).unwrap_err(),
            CircuitError::UnsupportedArity(17)
        );
    }

    #[test]
    fn test_from_fn() {
        let parity = TruthTable::from_fn(3, |m| m.count_ones() % 2 == 1).unwrap();
        assert_eq!(parity.value(0), false);
        assert_eq!(parity.value(3), false);
        assert_eq!(parity.value(7), true);
        assert_eq!(parity.value(4), true);
    }
}
