//! Binary Merkle tree over column digests.
//!
//! Leaves and inner nodes are [`Octuplet`]s compressed pairwise with
//! Poseidon2. The tree stores only its occupied prefix per level together
//! with the precomputed value of a fully empty subtree at that level, so a
//! sparsely populated incremental tree never materializes unused leaves. The
//! one-shot commitment path always builds complete trees, but [`update`]
//! shares the same node addressing.
//!
//! [`update`]: MerkleTree::update

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::crypto::poseidon2::{Octuplet, Poseidon2};
use crate::errors::ConfigurationError;
use crate::parallel::execute;
use ark_ff::PrimeField;

/// Membership proof for one leaf: the sibling on every level, leaf to root.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct MerkleProof<F: PrimeField> {
    /// Index of the proven leaf.
    pub path: usize,
    pub siblings: Vec<Octuplet<F>>,
}

impl<F: PrimeField> MerkleProof<F> {
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// Folds `leaf` with the siblings, the path bits choosing sides.
    pub fn recover_root(&self, hasher: &Poseidon2<F>, leaf: Octuplet<F>) -> Octuplet<F> {
        let mut current = leaf;
        let mut idx = self.path;
        for sibling in &self.siblings {
            current = if idx & 1 == 0 {
                hasher.compress(&current, sibling)
            } else {
                hasher.compress(sibling, &current)
            };
            idx >>= 1;
        }
        assert_eq!(idx, 0, "leaf index must be consumed by the path bits");
        current
    }

    pub fn verify(&self, hasher: &Poseidon2<F>, leaf: Octuplet<F>, root: &Octuplet<F>) -> bool {
        // a path with bits beyond the depth would fail the recovery assert
        self.path >> self.siblings.len() == 0 && self.recover_root(hasher, leaf) == *root
    }
}

/// A binary tree of `2^depth` leaf positions.
///
/// `nodes[l]` holds the occupied prefix of the level `l + 1` above the
/// leaves; any position past a prefix reads as `empty[level]`, the root of a
/// subtree of zero leaves.
#[derive(Clone, Debug)]
pub struct MerkleTree<F: PrimeField> {
    depth: usize,
    root: Octuplet<F>,
    leaves: Vec<Octuplet<F>>,
    nodes: Vec<Vec<Octuplet<F>>>,
    empty: Vec<Octuplet<F>>,
}

impl<F: PrimeField> MerkleTree<F> {
    /// Builds the complete tree over `leaves`; the leaf count must be a
    /// nonzero power of two. Each level is hashed in parallel.
    pub fn build_complete(
        hasher: &Poseidon2<F>,
        leaves: Vec<Octuplet<F>>,
    ) -> Result<Self, ConfigurationError> {
        if !crate::utils::is_power_of_two(leaves.len()) {
            return Err(ConfigurationError::NotPowerOfTwo {
                name: "number of leaves",
                value: leaves.len(),
            });
        }
        let depth = crate::utils::log2_exact(leaves.len());

        let mut nodes: Vec<Vec<Octuplet<F>>> = Vec::with_capacity(depth);
        for level in 0..depth {
            let previous: &[Octuplet<F>] = if level == 0 { &leaves } else { &nodes[level - 1] };
            let mut current = vec![[F::ZERO; 8]; previous.len() / 2];
            execute(&mut current, |offset, chunk| {
                for (k, node) in chunk.iter_mut().enumerate() {
                    let i = offset + k;
                    *node = hasher.compress(&previous[2 * i], &previous[2 * i + 1]);
                }
            });
            nodes.push(current);
        }
        let root = if depth == 0 { leaves[0] } else { nodes[depth - 1][0] };

        Ok(Self {
            depth,
            root,
            leaves,
            nodes,
            empty: empty_nodes(hasher, depth),
        })
    }

    /// An empty incremental tree of `2^depth` leaf positions. Leaves are set
    /// through [`Self::update`].
    pub fn new_empty(hasher: &Poseidon2<F>, depth: usize) -> Self {
        let empty = empty_nodes(hasher, depth);
        Self {
            depth,
            root: empty[depth],
            leaves: Vec::new(),
            nodes: vec![Vec::new(); depth],
            empty,
        }
    }

    pub const fn depth(&self) -> usize {
        self.depth
    }

    pub fn num_leaves(&self) -> usize {
        1 << self.depth
    }

    pub const fn root(&self) -> Octuplet<F> {
        self.root
    }

    pub fn leaf(&self, pos: usize) -> Octuplet<F> {
        self.leaves.get(pos).copied().unwrap_or(self.empty[0])
    }

    fn node(&self, level: usize, pos: usize) -> Octuplet<F> {
        if level == 0 {
            self.leaf(pos)
        } else {
            self.nodes[level - 1].get(pos).copied().unwrap_or(self.empty[level])
        }
    }

    /// Membership proof for the leaf at `pos`.
    pub fn prove(&self, pos: usize) -> Result<MerkleProof<F>, ConfigurationError> {
        if pos >= self.num_leaves() {
            return Err(ConfigurationError::LeafOutOfRange {
                pos,
                num_leaves: self.num_leaves(),
            });
        }
        let mut siblings = Vec::with_capacity(self.depth);
        let mut idx = pos;
        for level in 0..self.depth {
            siblings.push(self.node(level, idx ^ 1));
            idx >>= 1;
        }
        assert_eq!(idx, 0, "leaf index must be consumed by the path bits");
        Ok(MerkleProof { path: pos, siblings })
    }

    /// Writes `new_leaf` at `pos` and recomputes the path to the root.
    ///
    /// Levels grow on demand: positions between the old occupied prefix and
    /// `pos` keep reading as the level's empty value.
    pub fn update(
        &mut self,
        hasher: &Poseidon2<F>,
        pos: usize,
        new_leaf: Octuplet<F>,
    ) -> Result<(), ConfigurationError> {
        if pos >= self.num_leaves() {
            return Err(ConfigurationError::LeafOutOfRange {
                pos,
                num_leaves: self.num_leaves(),
            });
        }
        if self.leaves.len() <= pos {
            self.leaves.resize(pos + 1, self.empty[0]);
        }
        self.leaves[pos] = new_leaf;

        let mut idx = pos;
        for level in 0..self.depth {
            let parent =
                hasher.compress(&self.node(level, idx & !1), &self.node(level, idx | 1));
            idx >>= 1;
            if self.nodes[level].len() <= idx {
                self.nodes[level].resize(idx + 1, self.empty[level + 1]);
            }
            self.nodes[level][idx] = parent;
        }
        assert_eq!(idx, 0, "leaf index must be consumed by the path bits");
        self.root = self.node(self.depth, 0);
        Ok(())
    }
}

/// `empty[l]` is the root of a depth-`l` subtree whose leaves are all zero.
fn empty_nodes<F: PrimeField>(hasher: &Poseidon2<F>, depth: usize) -> Vec<Octuplet<F>> {
    let mut empty = Vec::with_capacity(depth + 1);
    empty.push([F::ZERO; 8]);
    for level in 0..depth {
        let child = empty[level];
        empty.push(hasher.compress(&child, &child));
    }
    empty
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::Field;
    use crate::crypto::fields::Field64 as F;
    use crate::crypto::poseidon2::POSEIDON2_64;

    fn leaves(n: usize) -> Vec<Octuplet<F>> {
        (0..n)
            .map(|i| std::array::from_fn(|k| F::from((i * 8 + k) as u64)))
            .collect()
    }

    #[test]
    fn test_prove_verify_roundtrip() {
        let tree = MerkleTree::build_complete(&POSEIDON2_64, leaves(16)).unwrap();
        assert_eq!(tree.depth(), 4);

        for pos in 0..16 {
            let proof = tree.prove(pos).unwrap();
            assert_eq!(proof.path, pos);
            assert_eq!(proof.depth(), 4);
            assert!(proof.verify(&POSEIDON2_64, tree.leaf(pos), &tree.root()));
        }
    }

    #[test]
    fn test_single_leaf_tree() {
        let all = leaves(1);
        let tree = MerkleTree::build_complete(&POSEIDON2_64, all.clone()).unwrap();
        assert_eq!(tree.root(), all[0]);
        let proof = tree.prove(0).unwrap();
        assert!(proof.siblings.is_empty());
        assert!(proof.verify(&POSEIDON2_64, all[0], &tree.root()));
    }

    #[test]
    fn test_rejects_bad_leaf_counts() {
        assert!(matches!(
            MerkleTree::build_complete(&POSEIDON2_64, leaves(0)),
            Err(ConfigurationError::NotPowerOfTwo { .. })
        ));
        assert!(matches!(
            MerkleTree::build_complete(&POSEIDON2_64, leaves(12)),
            Err(ConfigurationError::NotPowerOfTwo { .. })
        ));

        let tree = MerkleTree::build_complete(&POSEIDON2_64, leaves(8)).unwrap();
        assert_eq!(
            tree.prove(8),
            Err(ConfigurationError::LeafOutOfRange { pos: 8, num_leaves: 8 })
        );
    }

    #[test]
    fn test_mutations_break_verification() {
        let tree = MerkleTree::build_complete(&POSEIDON2_64, leaves(8)).unwrap();
        let pos = 5;
        let leaf = tree.leaf(pos);
        let proof = tree.prove(pos).unwrap();

        for level in 0..proof.depth() {
            let mut bad = proof.clone();
            bad.siblings[level][0] += F::ONE;
            assert!(!bad.verify(&POSEIDON2_64, leaf, &tree.root()), "sibling {level}");
        }

        let mut bad = proof.clone();
        bad.path ^= 1;
        assert!(!bad.verify(&POSEIDON2_64, leaf, &tree.root()));

        let mut bad = proof.clone();
        bad.path = pos + tree.num_leaves(); // extra bits above the depth
        assert!(!bad.verify(&POSEIDON2_64, leaf, &tree.root()));

        let mut wrong_leaf = leaf;
        wrong_leaf[3] += F::ONE;
        assert!(!proof.verify(&POSEIDON2_64, wrong_leaf, &tree.root()));
    }

    #[test]
    fn test_incremental_update_matches_complete_build() {
        let all = leaves(16);
        let complete = MerkleTree::build_complete(&POSEIDON2_64, all.clone()).unwrap();

        let mut incremental = MerkleTree::new_empty(&POSEIDON2_64, 4);
        // out of order on purpose
        for &pos in &[3, 0, 15, 7, 1, 2, 4, 5, 6, 8, 9, 10, 11, 12, 13, 14] {
            incremental.update(&POSEIDON2_64, pos, all[pos]).unwrap();
        }
        assert_eq!(incremental.root(), complete.root());

        let proof = incremental.prove(11).unwrap();
        assert!(proof.verify(&POSEIDON2_64, all[11], &complete.root()));
    }

    #[test]
    fn test_sparse_tree_reads_empty_nodes() {
        let mut tree = MerkleTree::new_empty(&POSEIDON2_64, 5);
        let empty_root = tree.root();

        tree.update(&POSEIDON2_64, 2, leaves(3)[2]).unwrap();
        assert_ne!(tree.root(), empty_root);

        // an untouched position proves as the zero leaf
        let proof = tree.prove(30).unwrap();
        assert!(proof.verify(&POSEIDON2_64, [F::ZERO; 8], &tree.root()));
    }

    #[test]
    fn test_update_out_of_range() {
        let mut tree = MerkleTree::new_empty(&POSEIDON2_64, 3);
        assert_eq!(
            tree.update(&POSEIDON2_64, 8, [F::ZERO; 8]),
            Err(ConfigurationError::LeafOutOfRange { pos: 8, num_leaves: 8 })
        );
    }
}
