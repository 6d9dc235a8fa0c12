//! Scheme parameters, validated once at construction.

use ark_ff::{FftField, PrimeField};
use derivative::Derivative;

use crate::crypto::poseidon2::Poseidon2;
use crate::encoding::RsCode;
use crate::errors::ConfigurationError;
use crate::ringsis::{SisKey, SisParams};
use crate::vortex::committer::LeafHashMode;

/// Everything a commitment or an opening needs: the Reed-Solomon code, the
/// ring-SIS key sized for `max_nb_rows`, the Poseidon2 instance for leaves
/// and nodes, and the default leaf-hashing mode.
///
/// Immutable after construction. Prover and verifier must be built from the
/// same values or no proof will verify.
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct Params<F: FftField + PrimeField> {
    code: RsCode<F>,
    sis_key: SisKey<F>,
    hasher: Poseidon2<F>,
    max_nb_rows: usize,
    default_mode: LeafHashMode,
}

impl<F: FftField + PrimeField> Params<F> {
    pub fn new(
        blow_up_factor: usize,
        nb_columns: usize,
        max_nb_rows: usize,
        sis_params: SisParams,
    ) -> Result<Self, ConfigurationError> {
        if max_nb_rows == 0 {
            return Err(ConfigurationError::NoRowCapacity);
        }
        Ok(Self {
            code: RsCode::new(nb_columns, blow_up_factor)?,
            sis_key: SisKey::generate(sis_params, max_nb_rows)?,
            hasher: Poseidon2::new(),
            max_nb_rows,
            default_mode: LeafHashMode::SisDigest,
        })
    }

    /// Switches the default leaf mode to hashing raw columns, skipping the
    /// SIS compression. Worth it when the row count is small enough that the
    /// lattice hash costs more than it saves.
    #[must_use]
    pub fn with_raw_leaves(mut self) -> Self {
        self.default_mode = LeafHashMode::RawColumn;
        self
    }

    pub const fn code(&self) -> &RsCode<F> {
        &self.code
    }

    pub const fn sis_key(&self) -> &SisKey<F> {
        &self.sis_key
    }

    pub const fn hasher(&self) -> &Poseidon2<F> {
        &self.hasher
    }

    pub const fn max_nb_rows(&self) -> usize {
        self.max_nb_rows
    }

    pub const fn default_mode(&self) -> LeafHashMode {
        self.default_mode
    }

    pub fn nb_columns(&self) -> usize {
        self.code.nb_columns()
    }

    pub fn blow_up_factor(&self) -> usize {
        self.code.blow_up_factor()
    }

    pub fn num_encoded_cols(&self) -> usize {
        self.code.num_encoded_cols()
    }

    /// Depth of every commitment tree built under these parameters.
    pub fn tree_depth(&self) -> usize {
        crate::utils::log2_exact(self.num_encoded_cols())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::fields::Field64 as F;

    #[test]
    fn test_derived_quantities() {
        let params = Params::<F>::new(2, 16, 4, SisParams::STD).unwrap();
        assert_eq!(params.num_encoded_cols(), 32);
        assert_eq!(params.tree_depth(), 5);
        assert_eq!(params.default_mode(), LeafHashMode::SisDigest);
        assert_eq!(
            params.with_raw_leaves().default_mode(),
            LeafHashMode::RawColumn
        );
    }

    #[test]
    fn test_validation_is_eager() {
        assert_eq!(
            Params::<F>::new(2, 16, 0, SisParams::STD).unwrap_err(),
            ConfigurationError::NoRowCapacity
        );
        assert!(matches!(
            Params::<F>::new(3, 16, 4, SisParams::STD),
            Err(ConfigurationError::NotPowerOfTwo { .. })
        ));
        assert!(matches!(
            Params::<F>::new(2, 24, 4, SisParams::STD),
            Err(ConfigurationError::NotPowerOfTwo { .. })
        ));
    }
}
