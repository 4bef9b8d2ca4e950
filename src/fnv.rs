//! 32-bit FNV-1a string hash.

const OFFSET_BASIS: u32 = 2_166_136_261;
const PRIME: u32 = 16_777_619;

/// Hash `bytes` with 32-bit FNV-1a.
///
/// Deterministic across runs and platforms; not suitable where an
/// adversary chooses the keys.
pub const fn hash_bytes(bytes: &[u8]) -> u32 {
    let mut hash = OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(PRIME);
        i += 1;
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: Output matches the published FNV-1a 32-bit vectors.
    #[test]
    fn known_vectors() {
        assert_eq!(hash_bytes(b""), 0x811c_9dc5);
        assert_eq!(hash_bytes(b"a"), 0xe40c_292c);
        assert_eq!(hash_bytes(b"foobar"), 0xbf9c_f968);
    }

    #[test]
    fn usable_in_const_context() {
        const H: u32 = hash_bytes(b"a");
        assert_eq!(H, hash_bytes("a".as_bytes()));
    }
}
