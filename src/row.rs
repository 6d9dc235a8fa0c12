//! Rows of a committed matrix.
//!
//! Arithmetization traces routinely contain rows holding a single repeated
//! value (empty columns, padding). Carrying those as a value plus a length
//! keeps them O(1) through Reed-Solomon encoding and lets the SIS batching
//! fold their contribution once instead of once per column.

use ark_ff::Field;

/// A single row of a committed matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Row<F: Field> {
    /// The same value in every column.
    Constant { value: F, len: usize },
    /// A dense vector of per-column values.
    Regular(Vec<F>),
}

impl<F: Field> Row<F> {
    pub fn constant(value: F, len: usize) -> Self {
        Row::Constant { value, len }
    }

    pub fn regular(values: Vec<F>) -> Self {
        Row::Regular(values)
    }

    pub fn len(&self) -> usize {
        match self {
            Row::Constant { len, .. } => *len,
            Row::Regular(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at column `col`. Panics when out of range, bounds are checked
    /// against the row length by the commitment entry points.
    pub fn get(&self, col: usize) -> F {
        match self {
            Row::Constant { value, len } => {
                assert!(col < *len, "column {col} out of range for row of length {len}");
                *value
            }
            Row::Regular(values) => values[col],
        }
    }

    /// Materializes the row as a dense vector.
    pub fn to_vec(&self) -> Vec<F> {
        match self {
            Row::Constant { value, len } => vec![*value; *len],
            Row::Regular(values) => values.clone(),
        }
    }
}

impl<F: Field> From<Vec<F>> for Row<F> {
    fn from(values: Vec<F>) -> Self {
        Row::Regular(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::fields::Field64 as F;

    #[test]
    fn test_constant_row_reads_like_a_dense_one() {
        let constant = Row::constant(F::from(5u64), 4);
        let dense = Row::from(vec![F::from(5u64); 4]);

        assert_eq!(constant.len(), dense.len());
        for col in 0..4 {
            assert_eq!(constant.get(col), dense.get(col));
        }
        assert_eq!(constant.to_vec(), dense.to_vec());
    }

    #[test]
    fn test_empty_rows() {
        assert!(Row::<F>::constant(F::from(1u64), 0).is_empty());
        assert!(Row::<F>::Regular(vec![]).is_empty());
        assert!(!Row::constant(F::from(1u64), 1).is_empty());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_constant_row_bounds() {
        Row::constant(F::from(3u64), 2).get(2);
    }
}
