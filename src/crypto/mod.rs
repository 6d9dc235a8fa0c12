pub mod fields;
pub mod poseidon2;
