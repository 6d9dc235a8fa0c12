//! Ring-SIS column compression.
//!
//! Every column of the encoded matrix is compressed through a structured
//! matrix-vector product over `R = F[X]/(X^d + 1)`: field elements are cut
//! into `log_two_bound`-bit limbs, the limb stream is read as coefficients of
//! ring elements, and the digest is `Σ a_i · m_i` for the public key
//! polynomials `a_i`. The digest is a single ring element of `d` field
//! elements, far shorter in bits than the column it compresses. Collision
//! resistance reduces to SIS hardness for the concrete `(bound, degree, key)`
//! triple, so the standard instance below is not a tunable.
//!
//! Negacyclic products run in the evaluation domain: the coset of the size-`d`
//! subgroup with offset ψ (a primitive `2d`-th root of unity) turns
//! multiplication mod `X^d + 1` into a pointwise product. The key is stored
//! pre-transformed, so one hash is a handful of forward transforms, a
//! multiply-accumulate, and a single inverse transform.

use ark_ff::{BigInteger, FftField, PrimeField, Zero};
use ark_poly::{EvaluationDomain, Radix2EvaluationDomain};

use crate::errors::ConfigurationError;
use crate::parallel::execute_chunky;
use crate::row::Row;

/// Columns per unit of work pulled by the transversal hashing workers.
const COLS_PER_JOB: usize = 16;

/// The `(bound, degree)` pair of a ring-SIS instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SisParams {
    /// Bit width of one limb.
    pub log_two_bound: usize,
    /// `d = 2^log_two_degree`, the ring degree.
    pub log_two_degree: usize,
}

impl SisParams {
    /// The standard instance: limbs of 8 bits, ring degree 64.
    pub const STD: Self = Self {
        log_two_bound: 8,
        log_two_degree: 6,
    };

    pub const fn degree(&self) -> usize {
        1 << self.log_two_degree
    }

    /// Limbs needed to carry one field element.
    pub fn num_limbs_per_element<F: PrimeField>(&self) -> usize {
        (F::MODULUS_BIT_SIZE as usize).div_ceil(self.log_two_bound)
    }

    /// Ring elements needed to carry the limbs of `n` field elements. No
    /// element straddles two ring elements; a partial trailing slot is
    /// zero-padded.
    pub fn num_polys_for<F: PrimeField>(&self, n: usize) -> usize {
        n.div_ceil(self.degree() / self.num_limbs_per_element::<F>())
    }
}

/// A ring-SIS key: the public polynomials `a_i`, kept in coset evaluation
/// form, plus the domain pair they live on.
///
/// The key holds no per-call state; [`SisKey::hash`] and
/// [`SisKey::transversal_hash`] allocate their scratch fresh, so one key can
/// serve any number of threads concurrently.
#[derive(Clone, Debug)]
pub struct SisKey<F: FftField + PrimeField> {
    params: SisParams,
    /// Evaluations of each `a_i` over `coset`.
    key_hat: Vec<Vec<F>>,
    /// Coset ψ·⟨ω⟩ of size `d`; evaluation there is reduction mod `X^d + 1`.
    coset: Radix2EvaluationDomain<F>,
    /// Maximum number of field elements hashable in one call.
    capacity: usize,
}

const KEY_CONTEXT: &str = "vortex ring-sis key v1";

impl<F: FftField + PrimeField> SisKey<F> {
    /// Key from the crate-wide fixed seed. All provers and verifiers of one
    /// deployment must end up with the same key, so this is the constructor
    /// to use unless a test needs key separation.
    pub fn generate(params: SisParams, capacity: usize) -> Result<Self, ConfigurationError> {
        Self::generate_from_seed(params, capacity, &[0u8; 32])
    }

    pub fn generate_from_seed(
        params: SisParams,
        capacity: usize,
        seed: &[u8],
    ) -> Result<Self, ConfigurationError> {
        let degree = params.degree();
        let num_limbs = params.num_limbs_per_element::<F>();
        if degree < num_limbs {
            return Err(ConfigurationError::DegreeBelowLimbCount {
                degree,
                limbs: num_limbs,
            });
        }
        if capacity == 0 {
            return Err(ConfigurationError::NoRowCapacity);
        }

        // ψ = generator of the 2d-th roots, so ψ^d = -1 and the coset
        // evaluations of a·b are the evaluations of a·b mod X^d + 1.
        let double = Radix2EvaluationDomain::<F>::new(2 * degree)
            .ok_or(ConfigurationError::UnsupportedDomainSize { size: 2 * degree })?;
        let coset = Radix2EvaluationDomain::<F>::new(degree)
            .and_then(|dom| dom.get_coset(double.group_gen))
            .ok_or(ConfigurationError::UnsupportedDomainSize { size: degree })?;

        let num_polys = params.num_polys_for::<F>(capacity);
        let mut stream = blake3::Hasher::new_derive_key(KEY_CONTEXT)
            .update(seed)
            .finalize_xof();
        let key_hat = (0..num_polys)
            .map(|_| {
                let coeffs: Vec<F> = (0..degree).map(|_| sample_field(&mut stream)).collect();
                coset.fft(&coeffs)
            })
            .collect();

        Ok(Self {
            params,
            key_hat,
            coset,
            capacity,
        })
    }

    pub const fn params(&self) -> SisParams {
        self.params
    }

    pub const fn degree(&self) -> usize {
        self.params.degree()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Digest of one vector of field elements, as a ring element of
    /// [`Self::degree`] field elements.
    pub fn hash(&self, input: &[F]) -> Result<Vec<F>, ConfigurationError> {
        if input.len() > self.capacity {
            return Err(ConfigurationError::SisCapacityExceeded {
                got: input.len(),
                max: self.capacity,
            });
        }

        let degree = self.degree();
        let num_limbs = self.params.num_limbs_per_element::<F>();
        let mut acc_hat = vec![F::zero(); degree];
        let mut limbs = vec![F::zero(); degree];

        for (chunk, a_hat) in input.chunks(self.elements_per_poly()).zip(&self.key_hat) {
            limbs.iter_mut().for_each(|l| *l = F::zero());
            for (k, element) in chunk.iter().enumerate() {
                decompose_into(&mut limbs[k * num_limbs..], *element, self.params.log_two_bound);
            }
            mul_acc(&mut acc_hat, &self.coset.fft(&limbs), a_hat);
        }

        Ok(self.coset.ifft(&acc_hat))
    }

    /// Elements carried by one ring polynomial.
    fn elements_per_poly(&self) -> usize {
        self.degree() / self.params.num_limbs_per_element::<F>()
    }

    /// Digests of every column of a row-major matrix, laid out contiguously:
    /// column `c` occupies `out[c*d..(c+1)*d]`.
    ///
    /// Bit-identical to [`Self::hash`] on each materialized column. Constant
    /// rows contribute one precomputed evaluation-domain summand broadcast to
    /// every column; regular rows go through the per-column limb pass. The
    /// split is sound because the transform and the key product are linear,
    /// and exact because field addition is associative whatever the grouping.
    pub fn transversal_hash(&self, matrix: &[Row<F>]) -> Result<Vec<F>, ConfigurationError> {
        if matrix.is_empty() {
            return Err(ConfigurationError::EmptyMatrix);
        }
        if matrix.len() > self.capacity {
            return Err(ConfigurationError::SisCapacityExceeded {
                got: matrix.len(),
                max: self.capacity,
            });
        }
        let num_cols = matrix[0].len();
        for (i, row) in matrix.iter().enumerate() {
            if row.len() != num_cols {
                return Err(ConfigurationError::RowLengthMismatch {
                    row: i,
                    got: row.len(),
                    expected: num_cols,
                });
            }
        }

        let degree = self.degree();
        let num_limbs = self.params.num_limbs_per_element::<F>();
        let per_poly = self.elements_per_poly();

        // Shared contribution of all constant rows, in the evaluation domain.
        let mut constant_hat = vec![F::zero(); degree];
        let mut limbs = vec![F::zero(); degree];
        for (chunk_idx, chunk) in matrix.chunks(per_poly).enumerate() {
            let mut any = false;
            limbs.iter_mut().for_each(|l| *l = F::zero());
            for (k, row) in chunk.iter().enumerate() {
                if let Row::Constant { value, .. } = row {
                    decompose_into(&mut limbs[k * num_limbs..], *value, self.params.log_two_bound);
                    any = true;
                }
            }
            if any {
                mul_acc(&mut constant_hat, &self.coset.fft(&limbs), &self.key_hat[chunk_idx]);
            }
        }

        let mut out = vec![F::zero(); num_cols * degree];
        execute_chunky(&mut out, COLS_PER_JOB * degree, |offset, slot| {
            let mut limbs = vec![F::zero(); degree];
            for (c, digest) in slot.chunks_exact_mut(degree).enumerate() {
                let col = offset / degree + c;
                let mut acc_hat = constant_hat.clone();
                for (chunk_idx, chunk) in matrix.chunks(per_poly).enumerate() {
                    let mut any = false;
                    limbs.iter_mut().for_each(|l| *l = F::zero());
                    for (k, row) in chunk.iter().enumerate() {
                        if let Row::Regular(values) = row {
                            decompose_into(
                                &mut limbs[k * num_limbs..],
                                values[col],
                                self.params.log_two_bound,
                            );
                            any = true;
                        }
                    }
                    if any {
                        mul_acc(&mut acc_hat, &self.coset.fft(&limbs), &self.key_hat[chunk_idx]);
                    }
                }
                digest.copy_from_slice(&self.coset.ifft(&acc_hat));
            }
        });

        Ok(out)
    }
}

fn mul_acc<F: FftField>(acc: &mut [F], lhs: &[F], rhs: &[F]) {
    for ((a, l), r) in acc.iter_mut().zip(lhs).zip(rhs) {
        *a += *l * r;
    }
}

/// Little-endian limbs of `element`, `width` bits each, written into `out`.
fn decompose_into<F: PrimeField>(out: &mut [F], element: F, width: usize) {
    let bytes = element.into_bigint().to_bytes_le();
    let num_limbs = (F::MODULUS_BIT_SIZE as usize).div_ceil(width);
    for (i, slot) in out.iter_mut().take(num_limbs).enumerate() {
        let mut limb = 0u64;
        for k in 0..width {
            let bit = i * width + k;
            let byte = bytes.get(bit / 8).copied().unwrap_or(0);
            limb |= u64::from((byte >> (bit % 8)) & 1) << k;
        }
        *slot = F::from(limb);
    }
}

/// Next field element off the key stream, by rejection.
fn sample_field<F: PrimeField>(stream: &mut blake3::OutputReader) -> F {
    let num_bytes = (F::MODULUS_BIT_SIZE as usize).div_ceil(8);
    let mut buf = vec![0u8; num_bytes];
    loop {
        stream.fill(&mut buf);
        if let Some(element) = F::from_random_bytes(&buf) {
            return element;
        }
    }
}
