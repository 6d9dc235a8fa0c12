//! Commitment orchestration: rows in, Merkle root out.
//!
//! A commitment encodes every row, compresses every codeword column into a
//! digest, hashes the digests into leaves and builds the tree. The encoded
//! matrix is handed back to the caller; the opening protocol reads it again
//! when columns are revealed.

use ark_ff::{FftField, PrimeField};
use derivative::Derivative;

use crate::crypto::poseidon2::{Octuplet, Sponge};
use crate::errors::ConfigurationError;
use crate::merkle::MerkleTree;
use crate::parallel::{execute, execute_with_scratch};
use crate::row::Row;
use crate::vortex::parameters::Params;

/// Columns hashed per unit of work in the leaf-hashing loops.
const LEAVES_PER_JOB: usize = 64;

/// How a column becomes a Merkle leaf. Recorded in the commitment and
/// restated to the verifier, which must replay the same mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafHashMode {
    /// Leaf = Poseidon2 of the ring-SIS digest of the column.
    SisDigest,
    /// Leaf = Poseidon2 of the column itself, for row counts too small to
    /// amortize the lattice hash.
    RawColumn,
}

/// One codeword per committed row, constants still tagged.
pub type EncodedMatrix<F> = Vec<Row<F>>;

/// Result of committing one matrix: everything the prover keeps around to
/// answer an opening.
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct Commitment<F: FftField + PrimeField> {
    pub encoded_matrix: EncodedMatrix<F>,
    pub tree: MerkleTree<F>,
    /// Per-column SIS digests, `degree` elements per column; empty in raw
    /// mode.
    pub column_digests: Vec<F>,
    pub mode: LeafHashMode,
}

impl<F: FftField + PrimeField> Commitment<F> {
    pub fn root(&self) -> Octuplet<F> {
        self.tree.root()
    }

    pub fn nb_rows(&self) -> usize {
        self.encoded_matrix.len()
    }

    /// The codeword column at `pos`, one value per committed row.
    pub fn column(&self, pos: usize) -> Vec<F> {
        self.encoded_matrix.iter().map(|row| row.get(pos)).collect()
    }
}

impl<F: FftField + PrimeField> Params<F> {
    /// Commits with the default leaf mode.
    pub fn commit(&self, rows: &[Row<F>]) -> Result<Commitment<F>, ConfigurationError> {
        match self.default_mode() {
            LeafHashMode::SisDigest => self.commit_with_sis(rows),
            LeafHashMode::RawColumn => self.commit_without_sis(rows),
        }
    }

    /// Encode, SIS-compress every column, hash digests into leaves, build
    /// the tree.
    pub fn commit_with_sis(&self, rows: &[Row<F>]) -> Result<Commitment<F>, ConfigurationError> {
        let encoded_matrix = self.encode_rows(rows)?;
        let column_digests = self.sis_key().transversal_hash(&encoded_matrix)?;

        let degree = self.sis_key().degree();
        let mut leaves = vec![[F::ZERO; 8]; self.num_encoded_cols()];
        execute_with_scratch(
            &mut leaves,
            LEAVES_PER_JOB,
            || Sponge::new(self.hasher()),
            |sponge, offset, chunk| {
                for (k, leaf) in chunk.iter_mut().enumerate() {
                    let col = offset + k;
                    sponge.reset();
                    sponge.write(&column_digests[col * degree..(col + 1) * degree]);
                    *leaf = sponge.sum();
                }
            },
        );

        Ok(Commitment {
            encoded_matrix,
            tree: MerkleTree::build_complete(self.hasher(), leaves)?,
            column_digests,
            mode: LeafHashMode::SisDigest,
        })
    }

    /// Same pipeline minus the lattice compression: leaves hash the raw
    /// columns, read transposed out of the encoded matrix.
    pub fn commit_without_sis(&self, rows: &[Row<F>]) -> Result<Commitment<F>, ConfigurationError> {
        let encoded_matrix = self.encode_rows(rows)?;

        let mut leaves = vec![[F::ZERO; 8]; self.num_encoded_cols()];
        execute_with_scratch(
            &mut leaves,
            LEAVES_PER_JOB,
            || Sponge::new(self.hasher()),
            |sponge, offset, chunk| {
                for (k, leaf) in chunk.iter_mut().enumerate() {
                    let col = offset + k;
                    sponge.reset();
                    for row in &encoded_matrix {
                        sponge.write(&[row.get(col)]);
                    }
                    *leaf = sponge.sum();
                }
            },
        );

        Ok(Commitment {
            encoded_matrix,
            tree: MerkleTree::build_complete(self.hasher(), leaves)?,
            column_digests: Vec::new(),
            mode: LeafHashMode::RawColumn,
        })
    }

    /// Recomputes the leaf for an opened column, as the verifier does.
    pub(crate) fn leaf_of_column(
        &self,
        column: &[F],
        mode: LeafHashMode,
    ) -> Result<Octuplet<F>, ConfigurationError> {
        match mode {
            LeafHashMode::SisDigest => {
                let digest = self.sis_key().hash(column)?;
                Ok(self.hasher().hash_elements(&digest))
            }
            LeafHashMode::RawColumn => Ok(self.hasher().hash_elements(column)),
        }
    }

    fn encode_rows(&self, rows: &[Row<F>]) -> Result<EncodedMatrix<F>, ConfigurationError> {
        if rows.is_empty() {
            return Err(ConfigurationError::EmptyMatrix);
        }
        if rows.len() > self.max_nb_rows() {
            return Err(ConfigurationError::TooManyRows {
                got: rows.len(),
                max: self.max_nb_rows(),
            });
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != self.nb_columns() {
                return Err(ConfigurationError::RowLengthMismatch {
                    row: i,
                    got: row.len(),
                    expected: self.nb_columns(),
                });
            }
        }

        let mut encoded = vec![Row::constant(F::ZERO, 0); rows.len()];
        execute(&mut encoded, |offset, chunk| {
            for (k, slot) in chunk.iter_mut().enumerate() {
                *slot = self.code().encode(&rows[offset + k]);
            }
        });
        Ok(encoded)
    }
}
