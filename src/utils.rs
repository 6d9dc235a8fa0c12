use ark_ff::Field;

// checks whether the given number n is a power of two.
pub const fn is_power_of_two(n: usize) -> bool {
    n != 0 && n.is_power_of_two()
}

/// Base-2 logarithm of a power of two.
///
/// Callers must have validated `n` already; a non-power-of-two here is an
/// internal invariant violation, not a recoverable condition.
pub fn log2_exact(n: usize) -> usize {
    assert!(is_power_of_two(n), "log2_exact on non-power-of-two {n}");
    n.trailing_zeros() as usize
}

/// expand_randomness outputs the vector [1, base, base^2, base^3, ...] of length len.
pub fn expand_randomness<F: Field>(base: F, len: usize) -> Vec<F> {
    let mut res = Vec::with_capacity(len);
    let mut acc = F::ONE;
    for _ in 0..len {
        res.push(acc);
        acc *= base;
    }

    res
}

/// Evaluates sum_i coeffs[i] * x^i by Horner's rule.
pub fn horner_eval<F: Field>(coeffs: &[F], x: F) -> F {
    let mut acc = F::ZERO;
    for c in coeffs.iter().rev() {
        acc *= x;
        acc += c;
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::{expand_randomness, horner_eval, is_power_of_two, log2_exact};
    use crate::crypto::fields::Field64 as F;

    #[test]
    fn test_is_power_of_two() {
        assert!(!is_power_of_two(0));
        assert!(is_power_of_two(1));
        assert!(is_power_of_two(2));
        assert!(!is_power_of_two(3));
        assert!(!is_power_of_two(usize::MAX));
    }

    #[test]
    fn test_log2_exact() {
        assert_eq!(log2_exact(1), 0);
        assert_eq!(log2_exact(2), 1);
        assert_eq!(log2_exact(1024), 10);
    }

    #[test]
    fn test_expand_randomness() {
        let base = F::from(3u64);
        let powers = expand_randomness(base, 5);
        assert_eq!(powers, vec![
            F::from(1u64),
            F::from(3u64),
            F::from(9u64),
            F::from(27u64),
            F::from(81u64)
        ]);
    }

    #[test]
    fn test_horner_matches_power_expansion() {
        let coeffs: Vec<F> = (1..=7u64).map(F::from).collect();
        let x = F::from(11u64);

        let direct: F = expand_randomness(x, coeffs.len())
            .into_iter()
            .zip(coeffs.iter())
            .map(|(pow, c)| pow * c)
            .sum();

        assert_eq!(horner_eval(&coeffs, x), direct);
    }

    #[test]
    fn test_horner_empty_is_zero() {
        assert_eq!(horner_eval::<F>(&[], F::from(5u64)), F::from(0u64));
    }
}
