//! The Vortex commitment scheme: parameters, commitment orchestration and
//! the two-sided opening protocol over the codec, the ring-SIS hasher and
//! the Merkle tree.

pub mod committer;
pub mod parameters;
pub mod prover;
pub mod verifier;

pub use committer::{Commitment, EncodedMatrix, LeafHashMode};
pub use parameters::Params;
pub use prover::OpeningProof;
pub use verifier::{verify_opening, VerifierInputs};
