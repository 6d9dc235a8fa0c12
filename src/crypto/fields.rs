use ark_ff::{Fp64, MontBackend, MontConfig};

/// The 64-bit prime field used throughout the tests and the default
/// parameter sets. Its 2-adicity of 32 covers every codeword domain and
/// every SIS coset domain this crate can be asked to build.
#[derive(MontConfig)]
#[modulus = "18446744069414584321"]
#[generator = "7"]
pub struct FConfig64;
pub type Field64 = Fp64<MontBackend<FConfig64, 1>>;
