//! Join code generation for rooms.
//!
//! Room codes are 10-character strings using Crockford's Base32 alphabet,
//! the opaque handle the out-of-scope lobby flow shares between players.

use rand::Rng;

const CROCKFORD: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ"; // no I, L, O, U

/// Generate a join code for a room.
///
/// Uniqueness is enforced by the rooms table; callers retry on collision.
pub fn generate_join_code() -> String {
    let mut rng = rand::rng();

    let mut s = String::with_capacity(10);
    for _ in 0..10 {
        let idx = rng.random_range(0..CROCKFORD.len());
        s.push(CROCKFORD[idx] as char);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_join_code_produces_different_results() {
        let code1 = generate_join_code();
        let code2 = generate_join_code();
        assert_ne!(code1, code2);
    }

    #[test]
    fn test_generate_join_code_has_correct_length_and_alphabet() {
        let code = generate_join_code();
        assert_eq!(code.len(), 10);
        assert!(code.bytes().all(|b| CROCKFORD.contains(&b)));
    }
}
