//! Verifier side of the opening protocol.
//!
//! Five independent checks, every one of which must pass: shape of the
//! public inputs and the proof, consistency of the opened columns with the
//! linear combination, consistency of the claimed evaluations with the
//! linear combination at `x`, Merkle inclusion of every opened column, and
//! the low-degree test on the linear combination. They run cheapest first;
//! the codeword transform is the most expensive single check and goes last.

use ark_ff::{FftField, PrimeField};
use derivative::Derivative;

use crate::crypto::poseidon2::Octuplet;
use crate::errors::VerificationError;
use crate::utils::horner_eval;
use crate::vortex::committer::LeafHashMode;
use crate::vortex::parameters::Params;
use crate::vortex::prover::OpeningProof;

/// The public statement plus the proof: everything the verifier sees.
///
/// `ys[i][r]` is the claimed evaluation of commitment `i`'s row `r` at `x`.
/// `roots` and `leaf_modes` restate, per commitment, what the commit step
/// published; the verifier trusts neither to the proof.
#[derive(Clone, Debug)]
pub struct VerifierInputs<'a, F: FftField + PrimeField> {
    pub params: &'a Params<F>,
    pub roots: Vec<Octuplet<F>>,
    pub leaf_modes: Vec<LeafHashMode>,
    pub x: F,
    pub ys: Vec<Vec<F>>,
    pub proof: OpeningProof<F>,
    pub random_coin: F,
    pub entry_list: Vec<usize>,
}

/// Accepts iff every check of the opening protocol passes. The error names
/// the first failing check and the commitment/entry it failed at.
pub fn verify_opening<F: FftField + PrimeField>(
    inputs: &VerifierInputs<'_, F>,
) -> Result<(), VerificationError> {
    check_shape(inputs)?;
    check_columns_against_lc(inputs)?;
    check_statement(inputs)?;
    check_merkle_inclusion(inputs)?;
    check_codeword(inputs)
}

fn check_shape<F: FftField + PrimeField>(
    inputs: &VerifierInputs<'_, F>,
) -> Result<(), VerificationError> {
    let params = inputs.params;
    let nb_commitments = inputs.roots.len();
    let proof = &inputs.proof;

    if nb_commitments == 0 {
        return Err(VerificationError::shape("no commitments"));
    }
    if inputs.ys.len() != nb_commitments
        || inputs.leaf_modes.len() != nb_commitments
        || proof.columns.len() != nb_commitments
        || proof.merkle_proofs.len() != nb_commitments
    {
        return Err(VerificationError::shape(
            "ys, leaf modes and proof must have one slice per root",
        ));
    }
    if inputs.entry_list.is_empty() {
        return Err(VerificationError::shape("empty entry list"));
    }
    if let Some(&entry) = inputs
        .entry_list
        .iter()
        .find(|&&entry| entry >= params.num_encoded_cols())
    {
        return Err(VerificationError::shape(format!(
            "entry {entry} is out of range, codeword has {} positions",
            params.num_encoded_cols()
        )));
    }
    if proof.linear_combination.len() != params.num_encoded_cols() {
        return Err(VerificationError::shape(format!(
            "linear combination has length {}, expected {}",
            proof.linear_combination.len(),
            params.num_encoded_cols()
        )));
    }

    for (i, ys) in inputs.ys.iter().enumerate() {
        if ys.is_empty() {
            return Err(VerificationError::shape(format!(
                "commitment #{i} claims no evaluations"
            )));
        }
        if ys.len() > params.max_nb_rows() {
            return Err(VerificationError::shape(format!(
                "commitment #{i} claims {} rows, capacity is {}",
                ys.len(),
                params.max_nb_rows()
            )));
        }
        if proof.columns[i].len() != inputs.entry_list.len()
            || proof.merkle_proofs[i].len() != inputs.entry_list.len()
        {
            return Err(VerificationError::shape(format!(
                "commitment #{i} must open every requested entry"
            )));
        }
        for (j, column) in proof.columns[i].iter().enumerate() {
            if column.len() != ys.len() {
                return Err(VerificationError::shape(format!(
                    "column #{j} of commitment #{i} has {} rows, expected {}",
                    column.len(),
                    ys.len()
                )));
            }
        }
        for (j, merkle_proof) in proof.merkle_proofs[i].iter().enumerate() {
            if merkle_proof.depth() != params.tree_depth() {
                return Err(VerificationError::shape(format!(
                    "Merkle proof #{j} of commitment #{i} has depth {}, expected {}",
                    merkle_proof.depth(),
                    params.tree_depth()
                )));
            }
        }
    }
    Ok(())
}

/// At every requested entry, the concatenation of the opened sub-columns
/// across commitments, folded by the challenge, must reproduce the linear
/// combination at that codeword position.
fn check_columns_against_lc<F: FftField + PrimeField>(
    inputs: &VerifierInputs<'_, F>,
) -> Result<(), VerificationError> {
    for (j, &position) in inputs.entry_list.iter().enumerate() {
        let full_column: Vec<F> = inputs
            .proof
            .columns
            .iter()
            .flat_map(|commitment| commitment[j].iter().copied())
            .collect();
        if horner_eval(&full_column, inputs.random_coin)
            != inputs.proof.linear_combination[position]
        {
            return Err(VerificationError::InconsistentColumn { entry: j, position });
        }
    }
    Ok(())
}

/// The linear combination, read as a polynomial over the codeword domain,
/// must evaluate at `x` to the same fold of the claimed `ys`. This is what
/// ties the commitment to the statement the outer protocol cares about.
fn check_statement<F: FftField + PrimeField>(
    inputs: &VerifierInputs<'_, F>,
) -> Result<(), VerificationError> {
    let lc_at_x = inputs
        .params
        .code()
        .interpolate(&inputs.proof.linear_combination, inputs.x);

    let all_ys: Vec<F> = inputs.ys.iter().flatten().copied().collect();
    if horner_eval(&all_ys, inputs.random_coin) != lc_at_x {
        return Err(VerificationError::InconsistentStatement);
    }
    Ok(())
}

fn check_merkle_inclusion<F: FftField + PrimeField>(
    inputs: &VerifierInputs<'_, F>,
) -> Result<(), VerificationError> {
    let params = inputs.params;
    for (i, root) in inputs.roots.iter().enumerate() {
        for (j, &entry) in inputs.entry_list.iter().enumerate() {
            let merkle_proof = &inputs.proof.merkle_proofs[i][j];
            if merkle_proof.path != entry {
                return Err(VerificationError::MerklePathMismatch {
                    commitment: i,
                    entry: j,
                    path: merkle_proof.path,
                    expected: entry,
                });
            }

            // the shape check bounds the column length by the key capacity
            let leaf = params
                .leaf_of_column(&inputs.proof.columns[i][j], inputs.leaf_modes[i])
                .map_err(|e| VerificationError::shape(e.to_string()))?;
            if !merkle_proof.verify(params.hasher(), leaf, root) {
                return Err(VerificationError::MerkleRootMismatch {
                    commitment: i,
                    entry: j,
                });
            }
        }
    }
    Ok(())
}

fn check_codeword<F: FftField + PrimeField>(
    inputs: &VerifierInputs<'_, F>,
) -> Result<(), VerificationError> {
    match inputs
        .params
        .code()
        .codeword_defect(&inputs.proof.linear_combination)
    {
        None => Ok(()),
        Some(index) => Err(VerificationError::NotACodeword { index }),
    }
}
