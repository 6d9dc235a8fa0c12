pub mod crypto; // Field definitions and the Poseidon2 leaf hash
pub mod encoding; // Reed-Solomon codec over radix-2 domains
pub mod errors;
pub mod merkle; // Commitment tree over column digests
pub mod parallel; // Data-parallel execution strategies
pub mod ringsis; // Lattice column-compression hash
pub mod row; // Constant-or-regular row container
pub mod utils; // Power-of-two guards and challenge-power folds
pub mod vortex; // The commitment scheme itself
