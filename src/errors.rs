//! Error types, split by origin.
//!
//! [`ConfigurationError`] reports caller misuse (bad sizes, ragged inputs,
//! exhausted capacities). It is returned eagerly from constructors and from
//! the commit/open entry points and always indicates a bug in the calling
//! layer, never an adversarial input.
//!
//! [`VerificationError`] is the typed rejection of an opening proof. The
//! outer protocol treats any variant as "reject"; the carried indices
//! localize the failing commitment/entry.
//!
//! Internal invariants (e.g. a Merkle index that must reach zero after all
//! levels are consumed) stay `assert!`s: they are unreachable from untrusted
//! data once the shape check has passed.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("{name} must be a power of two, got {value}")]
    NotPowerOfTwo { name: &'static str, value: usize },
    #[error("blow-up factor must be at least 2, got {0}")]
    BlowUpTooSmall(usize),
    #[error("max_nb_rows must be at least 1")]
    NoRowCapacity,
    #[error("no evaluation domain of size {size} in this field (2-adicity too small)")]
    UnsupportedDomainSize { size: usize },
    #[error("ring degree {degree} cannot fit the {limbs} limbs of one field element")]
    DegreeBelowLimbCount { degree: usize, limbs: usize },
    #[error("cannot commit to an empty list of rows")]
    EmptyMatrix,
    #[error("row {row} has length {got}, expected {expected}")]
    RowLengthMismatch {
        row: usize,
        got: usize,
        expected: usize,
    },
    #[error("committed {got} rows, key capacity is {max}")]
    TooManyRows { got: usize, max: usize },
    #[error("SIS hash over {got} elements exceeds the key capacity {max}")]
    SisCapacityExceeded { got: usize, max: usize },
    #[error("entry list is empty")]
    EmptyEntryList,
    #[error("no commitments supplied to complete the opening")]
    EmptyCommitmentList,
    #[error("entry {entry} is out of range, codeword has {size} positions")]
    EntryOutOfRange { entry: usize, size: usize },
    #[error("leaf index {pos} is out of range, tree has {num_leaves} leaves")]
    LeafOutOfRange { pos: usize, num_leaves: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("malformed verifier inputs: {reason}")]
    InvalidShape { reason: String },
    #[error("linear combination is not a codeword (nonzero coefficient at degree {index})")]
    NotACodeword { index: usize },
    #[error("opened columns disagree with the linear combination at entry #{entry} (position {position})")]
    InconsistentColumn { entry: usize, position: usize },
    #[error("claimed evaluations are inconsistent with the linear combination at x")]
    InconsistentStatement,
    #[error("Merkle inclusion failed for commitment #{commitment}, entry #{entry}")]
    MerkleRootMismatch { commitment: usize, entry: usize },
    #[error(
        "Merkle proof for commitment #{commitment}, entry #{entry} opens path {path}, expected {expected}"
    )]
    MerklePathMismatch {
        commitment: usize,
        entry: usize,
        path: usize,
        expected: usize,
    },
}

impl VerificationError {
    pub(crate) fn shape(reason: impl Into<String>) -> Self {
        Self::InvalidShape {
            reason: reason.into(),
        }
    }
}
