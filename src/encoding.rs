//! Reed-Solomon encoding of matrix rows.
//!
//! A row of length `nb_columns` is read as the evaluations of a polynomial
//! of degree below `nb_columns` over the small radix-2 domain; its codeword
//! is the same polynomial evaluated over the domain enlarged by
//! `blow_up_factor`. The two domains are distinct subgroups of the field,
//! so the message values reappear inside the codeword interleaved at stride
//! `blow_up_factor`, not as a prefix. Everything downstream (SIS hashing,
//! Merkle leaves, opened columns) works on codeword positions.

use ark_ff::{FftField, Zero};
use ark_poly::{EvaluationDomain, Radix2EvaluationDomain};

use crate::errors::ConfigurationError;
use crate::row::Row;
use crate::utils::is_power_of_two;

/// The code: a pair of evaluation domains plus the rate between them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsCode<F: FftField> {
    msg_domain: Radix2EvaluationDomain<F>,
    code_domain: Radix2EvaluationDomain<F>,
    blow_up_factor: usize,
}

impl<F: FftField> RsCode<F> {
    pub fn new(nb_columns: usize, blow_up_factor: usize) -> Result<Self, ConfigurationError> {
        if !is_power_of_two(nb_columns) {
            return Err(ConfigurationError::NotPowerOfTwo {
                name: "nb_columns",
                value: nb_columns,
            });
        }
        if !is_power_of_two(blow_up_factor) {
            return Err(ConfigurationError::NotPowerOfTwo {
                name: "blow_up_factor",
                value: blow_up_factor,
            });
        }
        if blow_up_factor < 2 {
            return Err(ConfigurationError::BlowUpTooSmall(blow_up_factor));
        }

        let msg_domain = Radix2EvaluationDomain::new(nb_columns)
            .ok_or(ConfigurationError::UnsupportedDomainSize { size: nb_columns })?;
        let code_domain = Radix2EvaluationDomain::new(nb_columns * blow_up_factor).ok_or(
            ConfigurationError::UnsupportedDomainSize {
                size: nb_columns * blow_up_factor,
            },
        )?;

        Ok(Self {
            msg_domain,
            code_domain,
            blow_up_factor,
        })
    }

    pub fn nb_columns(&self) -> usize {
        self.msg_domain.size()
    }

    pub fn blow_up_factor(&self) -> usize {
        self.blow_up_factor
    }

    pub fn num_encoded_cols(&self) -> usize {
        self.code_domain.size()
    }

    /// Encodes one row. A constant row interpolates to a degree-zero
    /// polynomial, so its codeword is the same constant, still carried as
    /// [`Row::Constant`] so the transversal hash can broadcast it.
    pub fn encode(&self, row: &Row<F>) -> Row<F> {
        match row {
            Row::Constant { value, len } => {
                assert_eq!(*len, self.nb_columns(), "row length must match the code");
                Row::Constant {
                    value: *value,
                    len: self.num_encoded_cols(),
                }
            }
            Row::Regular(values) => Row::Regular(self.encode_regular(values)),
        }
    }

    pub fn encode_regular(&self, values: &[F]) -> Vec<F> {
        assert_eq!(
            values.len(),
            self.nb_columns(),
            "row length must match the code"
        );
        let mut coeffs = self.msg_domain.ifft(values);
        // fft_in_place zero-pads the coefficients up to the code domain size
        self.code_domain.fft_in_place(&mut coeffs);
        coeffs
    }

    /// Degree of the first interpolant coefficient that should vanish but
    /// does not, or `None` when `word` is a codeword. Coefficients from
    /// `nb_columns` upward must all be zero.
    pub fn codeword_defect(&self, word: &[F]) -> Option<usize> {
        assert_eq!(
            word.len(),
            self.num_encoded_cols(),
            "word length must match the code"
        );
        let coeffs = self.code_domain.ifft(word);
        coeffs[self.nb_columns()..]
            .iter()
            .position(|c| !c.is_zero())
            .map(|i| self.nb_columns() + i)
    }

    pub fn is_codeword(&self, word: &[F]) -> bool {
        self.codeword_defect(word).is_none()
    }

    /// Evaluates the interpolant of `codeword` (over the large domain) at
    /// `x`. `x` landing inside the domain is fine, the Lagrange kernel
    /// degenerates to an indicator there.
    pub fn interpolate(&self, codeword: &[F], x: F) -> F {
        Self::interpolate_over(&self.code_domain, codeword, x)
    }

    /// Message-side counterpart, interpolating over the small domain. The
    /// encoder preserves interpolants, so for any row
    /// `interpolate_message(row, x) == interpolate(encode(row), x)`.
    pub fn interpolate_message(&self, message: &[F], x: F) -> F {
        Self::interpolate_over(&self.msg_domain, message, x)
    }

    fn interpolate_over(domain: &Radix2EvaluationDomain<F>, evals: &[F], x: F) -> F {
        assert_eq!(
            evals.len(),
            domain.size(),
            "evaluation count must match the domain"
        );
        let lagrange = domain.evaluate_all_lagrange_coefficients(x);
        evals.iter().zip(lagrange).map(|(e, l)| *e * l).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::Field;
    use crate::crypto::fields::Field64 as F;
    use ark_std::UniformRand;

    fn random_row(rng: &mut impl rand::Rng, len: usize) -> Vec<F> {
        (0..len).map(|_| F::rand(rng)).collect()
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert_eq!(
            RsCode::<F>::new(24, 2),
            Err(ConfigurationError::NotPowerOfTwo {
                name: "nb_columns",
                value: 24
            })
        );
        assert_eq!(
            RsCode::<F>::new(16, 3),
            Err(ConfigurationError::NotPowerOfTwo {
                name: "blow_up_factor",
                value: 3
            })
        );
        assert_eq!(
            RsCode::<F>::new(16, 1),
            Err(ConfigurationError::BlowUpTooSmall(1))
        );
    }

    #[test]
    fn test_codeword_contains_message_at_stride() {
        let mut rng = ark_std::test_rng();
        let code = RsCode::<F>::new(16, 4).unwrap();
        let row = random_row(&mut rng, 16);
        let word = code.encode_regular(&row);

        assert_eq!(word.len(), 64);
        // both domains share the generator relation w_small = w_big^blow_up
        for (j, value) in row.iter().enumerate() {
            assert_eq!(word[j * 4], *value, "message value {j} not found in codeword");
        }
    }

    #[test]
    fn test_encoded_rows_are_codewords() {
        let mut rng = ark_std::test_rng();
        let code = RsCode::<F>::new(32, 2).unwrap();

        let word = code.encode_regular(&random_row(&mut rng, 32));
        assert_eq!(code.codeword_defect(&word), None);

        let constant = code.encode(&Row::constant(F::rand(&mut rng), 32));
        assert!(code.is_codeword(&constant.to_vec()));
    }

    #[test]
    fn test_constant_fast_path_matches_fft_path() {
        let code = RsCode::<F>::new(8, 2).unwrap();
        let value = F::from(1234567u64);

        let fast = code.encode(&Row::constant(value, 8));
        assert_eq!(fast, Row::constant(value, 16));
        assert_eq!(fast.to_vec(), code.encode_regular(&vec![value; 8]));
    }

    #[test]
    fn test_defect_localizes_the_offending_degree() {
        let code = RsCode::<F>::new(8, 2).unwrap();

        // evaluations of x^9 over the code domain: degree 9 >= 8 is illegal
        let g = code.code_domain.group_gen;
        let word: Vec<F> = (0..16).map(|i| g.pow([9 * i as u64])).collect();
        assert_eq!(code.codeword_defect(&word), Some(9));

        let mut corrupted = code.encode_regular(&vec![F::from(3u64); 8]);
        corrupted[5] += F::from(1u64);
        assert!(code.codeword_defect(&corrupted).is_some());
    }

    #[test]
    fn test_interpolation_is_preserved_by_encoding() {
        let mut rng = ark_std::test_rng();
        let code = RsCode::<F>::new(16, 2).unwrap();
        let row = random_row(&mut rng, 16);
        let word = code.encode_regular(&row);
        let x = F::rand(&mut rng);

        assert_eq!(code.interpolate_message(&row, x), code.interpolate(&word, x));
    }

    #[test]
    fn test_interpolation_at_domain_points() {
        let code = RsCode::<F>::new(8, 2).unwrap();
        let row: Vec<F> = (0..8u64).map(F::from).collect();
        let word = code.encode_regular(&row);

        let w = code.msg_domain.group_gen;
        assert_eq!(code.interpolate_message(&row, w.pow([3])), row[3]);
        assert_eq!(code.interpolate(&word, F::from(1u64)), row[0]);
    }
}
