use sha2::Digest;

const HASH_BLOCK_U64_COUNT: usize = 4;

pub type HashBlock = [u64; HASH_BLOCK_U64_COUNT];

pub const HASH_ZERO_BLOCK: HashBlock = [0; HASH_BLOCK_U64_COUNT];

/// SHA-256 of the little-endian bytes of `input`, read back as four little-endian words.
pub fn hash(input: &[u64]) -> HashBlock {
    let mut hasher = sha2::Sha256::new();
    for word in input {
        hasher.update(word.to_le_bytes());
    }
    let out = hasher.finalize();
    let mut destination = HASH_ZERO_BLOCK;
    for (word, chunk) in destination.iter_mut().zip(out.chunks_exact(8)) {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(chunk);
        *word = u64::from_le_bytes(bytes);
    }
    destination
}
