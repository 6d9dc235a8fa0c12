//! Poseidon2 over the scalar field, used for Merkle leaves and nodes.
//!
//! The permutation is width 12 with S-box `x^7`, 8 external rounds around 22
//! internal rounds. Round constants and the internal diagonal are sampled
//! once from a ChaCha20 stream keyed through BLAKE3, so every instance over
//! the same field is identical. The sponge absorbs 8 lanes per block and
//! keeps a 4-lane capacity; digests are [`Octuplet`]s, one rate-wide squeeze.

use ark_ff::PrimeField;
use ark_std::UniformRand;
use lazy_static::lazy_static;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use super::fields::Field64;

pub const WIDTH: usize = 12;
pub const RATE: usize = 8;
pub const DIGEST_WIDTH: usize = 8;

const EXTERNAL_ROUNDS: usize = 8;
const INTERNAL_ROUNDS: usize = 22;

/// Fixed-width digest: leaf value, inner node, Merkle root, sponge output.
pub type Octuplet<F> = [F; DIGEST_WIDTH];

const CONSTANTS_CONTEXT: &str = "vortex poseidon2 round constants v1";

lazy_static! {
    /// Shared instance over [`Field64`]. Construction is deterministic, so
    /// any separately built instance produces the same digests.
    pub static ref POSEIDON2_64: Poseidon2<Field64> = Poseidon2::new();
}

/// The Poseidon2 permutation together with its derived hashing modes.
#[derive(Clone, Debug)]
pub struct Poseidon2<F: PrimeField> {
    external_rcs: [[F; WIDTH]; EXTERNAL_ROUNDS],
    internal_rcs: [F; INTERNAL_ROUNDS],
    internal_diag: [F; WIDTH],
}

impl<F: PrimeField> Default for Poseidon2<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: PrimeField> Poseidon2<F> {
    pub fn new() -> Self {
        let seed = blake3::derive_key(CONSTANTS_CONTEXT, &(WIDTH as u64).to_le_bytes());
        let mut rng = ChaCha20Rng::from_seed(seed);
        Self {
            external_rcs: std::array::from_fn(|_| std::array::from_fn(|_| F::rand(&mut rng))),
            internal_rcs: std::array::from_fn(|_| F::rand(&mut rng)),
            internal_diag: std::array::from_fn(|_| F::rand(&mut rng)),
        }
    }

    pub fn permute(&self, state: &mut [F; WIDTH]) {
        external_linear(state);
        for round in 0..EXTERNAL_ROUNDS / 2 {
            self.external_round(state, round);
        }
        for round in 0..INTERNAL_ROUNDS {
            self.internal_round(state, round);
        }
        for round in EXTERNAL_ROUNDS / 2..EXTERNAL_ROUNDS {
            self.external_round(state, round);
        }
    }

    fn external_round(&self, state: &mut [F; WIDTH], round: usize) {
        for (lane, rc) in state.iter_mut().zip(&self.external_rcs[round]) {
            *lane += rc;
        }
        for lane in state.iter_mut() {
            *lane = sbox(*lane);
        }
        external_linear(state);
    }

    fn internal_round(&self, state: &mut [F; WIDTH], round: usize) {
        state[0] += self.internal_rcs[round];
        state[0] = sbox(state[0]);
        // M_I = diag(mu) + 1·1^T
        let sum: F = state.iter().sum();
        for (lane, mu) in state.iter_mut().zip(&self.internal_diag) {
            *lane = *lane * mu + sum;
        }
    }

    /// One-shot sponge over `input`.
    pub fn hash_elements(&self, input: &[F]) -> Octuplet<F> {
        let mut sponge = Sponge::new(self);
        sponge.write(input);
        sponge.sum()
    }

    /// Two-to-one node compression. Identical to hashing the concatenation
    /// of both children, which is what the tree verifier replays.
    pub fn compress(&self, left: &Octuplet<F>, right: &Octuplet<F>) -> Octuplet<F> {
        let mut sponge = Sponge::new(self);
        sponge.write(left);
        sponge.write(right);
        sponge.sum()
    }
}

/// `x^7`; a permutation of the field whenever gcd(7, p - 1) = 1, which holds
/// for the 64-bit field this crate ships.
fn sbox<F: PrimeField>(x: F) -> F {
    let x2 = x.square();
    let x4 = x2.square();
    x * x2 * x4
}

/// External matrix circ(2·M4, M4, ..., M4) applied via the fused M4 kernel.
fn external_linear<F: PrimeField>(state: &mut [F; WIDTH]) {
    for chunk in state.chunks_exact_mut(4) {
        mat4(chunk);
    }
    let mut sums = [F::ZERO; 4];
    for (i, lane) in state.iter().enumerate() {
        sums[i % 4] += lane;
    }
    for (i, lane) in state.iter_mut().enumerate() {
        *lane += sums[i % 4];
    }
}

/// M4 = [[5,7,1,3],[4,6,1,1],[1,3,5,7],[1,1,4,6]].
fn mat4<F: PrimeField>(x: &mut [F]) {
    let t0 = x[0] + x[1];
    let t1 = x[2] + x[3];
    let t2 = x[1].double() + t1;
    let t3 = x[3].double() + t0;
    let t4 = t1.double().double() + t3;
    let t5 = t0.double().double() + t2;
    let t6 = t3 + t5;
    let t7 = t2 + t4;
    x[0] = t6;
    x[1] = t5;
    x[2] = t7;
    x[3] = t4;
}

/// Incremental sponge with the write/reset/sum surface the leaf hashing
/// loops drive. `sum` pads a copy of the state, so a sponge can keep
/// absorbing after producing a digest.
pub struct Sponge<'a, F: PrimeField> {
    permutation: &'a Poseidon2<F>,
    state: [F; WIDTH],
    buffered: usize,
}

impl<'a, F: PrimeField> Sponge<'a, F> {
    pub fn new(permutation: &'a Poseidon2<F>) -> Self {
        Self {
            permutation,
            state: [F::ZERO; WIDTH],
            buffered: 0,
        }
    }

    pub fn write(&mut self, input: &[F]) {
        for &value in input {
            self.state[self.buffered] += value;
            self.buffered += 1;
            if self.buffered == RATE {
                self.permutation.permute(&mut self.state);
                self.buffered = 0;
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = [F::ZERO; WIDTH];
        self.buffered = 0;
    }

    pub fn sum(&self) -> Octuplet<F> {
        // 10* padding in the field: a single 1 after the message marks the
        // length, `buffered < RATE` always holds here.
        let mut state = self.state;
        state[self.buffered] += F::ONE;
        self.permutation.permute(&mut state);
        std::array::from_fn(|i| state[i])
    }
}
