use crypto::Hash128;

/// Checks that a hash's hex rendering ends in at least `num_zeros` `'0'`
/// characters
///
/// This is the proof-of-work predicate: the difficulty value counts required
/// trailing zero characters of the 32-character lowercase hex digest
pub fn verify_trailing_zeros(hash: &Hash128, num_zeros: u8) -> bool {
    hash.to_string()
        .as_bytes()
        .iter()
        .rev()
        .take(num_zeros as usize)
        .all(|&c| c == b'0')
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use super::*;

    #[test]
    fn accepts_hashes_with_enough_zeros() {
        [
            ("00000000000000000000000000000000", 32),
            ("7a03d4485600699035f5032f199dec00", 2),
            ("7a03d4485600699035f5032f199dec00", 1),
            ("7a03d4485600699035f5032f199dec10", 1),
            ("7a03d4485600699035f5032f199dec21", 0),
        ]
        .iter()
        .for_each(|(hash, num_zeros)| {
            let hash = Hash128::try_from(*hash).unwrap();
            assert!(verify_trailing_zeros(&hash, *num_zeros));
        });
    }

    #[test]
    fn rejects_hashes_with_too_few_zeros() {
        [
            ("7a03d4485600699035f5032f199dec21", 1),
            ("7a03d4485600699035f5032f199dec10", 2),
            ("7a03d4485600699035f5032f199dec00", 3),
            ("00000000000000000000000000000001", 32),
        ]
        .iter()
        .for_each(|(hash, num_zeros)| {
            let hash = Hash128::try_from(*hash).unwrap();
            assert!(!verify_trailing_zeros(&hash, *num_zeros));
        });
    }
}
