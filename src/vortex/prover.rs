//! Prover side of the opening protocol.
//!
//! Opening happens in two steps, matching the outer protocol's message
//! order: first the linear combination of every committed row under the
//! verifier's challenge, then, once the entry list is known, the selected
//! columns and their Merkle paths.

use ark_ff::{FftField, PrimeField};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::errors::ConfigurationError;
use crate::merkle::MerkleProof;
use crate::row::Row;
use crate::vortex::committer::Commitment;
use crate::vortex::parameters::Params;

/// The opening payload sent to the verifier.
///
/// `columns[i][j]` is the codeword column of commitment `i` at position
/// `entry_list[j]`, one value per row; `merkle_proofs[i][j]` proves it
/// against commitment `i`'s root. Built incrementally: [`Params::open`]
/// fills the linear combination, [`OpeningProof::complete`] the rest.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct OpeningProof<F: FftField + PrimeField> {
    /// Codeword of `Σ_i challenge^i · row_i` over all commitments' rows.
    pub linear_combination: Vec<F>,
    pub columns: Vec<Vec<Vec<F>>>,
    pub merkle_proofs: Vec<Vec<MerkleProof<F>>>,
}

impl<F: FftField + PrimeField> Params<F> {
    /// Folds `rows` (the rows of every commitment, concatenated in
    /// commitment order) into one codeword under `challenge`.
    ///
    /// Constant rows fold in O(1): their values accumulate into a single
    /// running constant, broadcast once at the end.
    pub fn open(
        &self,
        rows: &[Row<F>],
        challenge: F,
    ) -> Result<OpeningProof<F>, ConfigurationError> {
        let combined = self.linear_combination(rows, self.nb_columns(), challenge)?;
        Ok(OpeningProof {
            linear_combination: self.code().encode_regular(&combined),
            columns: Vec::new(),
            merkle_proofs: Vec::new(),
        })
    }

    /// Variant of [`Self::open`] for callers that kept only the encoded
    /// matrices. A combination of codewords is itself a codeword, so no
    /// re-encoding happens.
    pub fn open_from_encoded(
        &self,
        encoded_rows: &[Row<F>],
        challenge: F,
    ) -> Result<OpeningProof<F>, ConfigurationError> {
        Ok(OpeningProof {
            linear_combination: self.linear_combination(
                encoded_rows,
                self.num_encoded_cols(),
                challenge,
            )?,
            columns: Vec::new(),
            merkle_proofs: Vec::new(),
        })
    }

    fn linear_combination(
        &self,
        rows: &[Row<F>],
        expected_len: usize,
        challenge: F,
    ) -> Result<Vec<F>, ConfigurationError> {
        if rows.is_empty() {
            return Err(ConfigurationError::EmptyMatrix);
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != expected_len {
                return Err(ConfigurationError::RowLengthMismatch {
                    row: i,
                    got: row.len(),
                    expected: expected_len,
                });
            }
        }

        let mut acc = vec![F::zero(); expected_len];
        let mut constant_acc = F::zero();
        let mut power = F::one();
        for row in rows {
            match row {
                Row::Constant { value, .. } => constant_acc += power * value,
                Row::Regular(values) => {
                    for (slot, value) in acc.iter_mut().zip(values) {
                        *slot += power * value;
                    }
                }
            }
            power *= challenge;
        }
        if !constant_acc.is_zero() {
            for slot in &mut acc {
                *slot += constant_acc;
            }
        }
        Ok(acc)
    }
}

impl<F: FftField + PrimeField> OpeningProof<F> {
    /// Fills in the opened columns and Merkle paths for `entry_list`, read
    /// out of the commitments the caller kept from the commit step.
    pub fn complete(
        &mut self,
        entry_list: &[usize],
        commitments: &[&Commitment<F>],
    ) -> Result<(), ConfigurationError> {
        if entry_list.is_empty() {
            return Err(ConfigurationError::EmptyEntryList);
        }
        if commitments.is_empty() {
            return Err(ConfigurationError::EmptyCommitmentList);
        }

        let size = self.linear_combination.len();
        if let Some(&entry) = entry_list.iter().find(|&&entry| entry >= size) {
            return Err(ConfigurationError::EntryOutOfRange { entry, size });
        }

        self.columns = commitments
            .iter()
            .map(|commitment| {
                entry_list
                    .iter()
                    .map(|&entry| commitment.column(entry))
                    .collect()
            })
            .collect();
        self.merkle_proofs = commitments
            .iter()
            .map(|commitment| {
                entry_list
                    .iter()
                    .map(|&entry| commitment.tree.prove(entry))
                    .collect()
            })
            .collect::<Result<_, _>>()?;
        Ok(())
    }
}
