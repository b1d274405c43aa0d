//! Random token generation for `state` and `code_verifier`
//!
//! Tokens are drawn from the 62-character alphanumeric alphabet using the
//! thread-local CSPRNG. [`rand::distr::Alphanumeric`] samples by rejection,
//! so every character is equally likely.

use rand::distr::Alphanumeric;
use rand::Rng;

/// Generates a random alphanumeric string of exactly `length` characters.
///
/// # Examples
///
/// ```
/// use authflow::auth::random::generate;
///
/// let token = generate(40);
/// assert_eq!(token.len(), 40);
/// assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_exact_length() {
        for n in [1, 2, 16, 40, 128, 1000] {
            assert_eq!(generate(n).len(), n, "length {n}");
        }
    }

    #[test]
    fn test_generate_zero_is_empty() {
        assert!(generate(0).is_empty());
    }

    #[test]
    fn test_generate_uses_alphanumeric_alphabet_only() {
        let token = generate(4096);
        assert!(
            token.chars().all(|c| c.is_ascii_alphanumeric()),
            "unexpected character in {token}"
        );
    }

    #[test]
    fn test_successive_calls_differ() {
        let a = generate(16);
        let b = generate(16);
        assert_ne!(a, b, "successive tokens must not repeat");
    }

    #[test]
    fn test_generate_covers_alphabet() {
        // 62 symbols over 20k draws: missing one has negligible probability.
        let seen: HashSet<char> = generate(20_000).chars().collect();
        assert_eq!(seen.len(), 62);
    }
}
