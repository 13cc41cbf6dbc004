use rand::{SeedableRng, RngCore};
use rand_chacha::ChaCha20Rng;
use crate::util::HE_PRNG_SEED_BYTES;

#[derive(Copy, Clone)]
pub struct PRNGSeed(pub [u8; HE_PRNG_SEED_BYTES]);

impl Default for PRNGSeed {
    fn default() -> Self {
        PRNGSeed([0; HE_PRNG_SEED_BYTES])
    }
}

impl AsMut<[u8]> for PRNGSeed {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl AsRef<[u8]> for PRNGSeed {
    fn as_ref(&self) -> &[u8] {&self.0}
}

/// Hands out [BlakeRNG]s, freshly seeded from OS entropy unless a fixed seed is set.
#[derive(Clone, Copy, Default)]
pub struct BlakeRNGFactory {
    seed: Option<PRNGSeed>,
}

impl BlakeRNGFactory {
    pub fn new() -> Self {
        Self { seed: None }
    }

    pub fn from_seed(seed: PRNGSeed) -> Self {
        Self { seed: Some(seed) }
    }

    pub fn get_rng(&self) -> BlakeRNG {
        match self.seed {
            Some(seed) => BlakeRNG::from_seed(seed),
            None => {
                let mut seed = PRNGSeed::default();
                ChaCha20Rng::from_entropy().fill_bytes(seed.as_mut());
                BlakeRNG::from_seed(seed)
            }
        }
    }
}

const BUFFER_SIZE: usize = 4096;

/// BLAKE3 in XOF mode over (seed, counter), consumed through a byte buffer.
pub struct BlakeRNG {
    buffer: Box<[u8; BUFFER_SIZE]>,
    seed: PRNGSeed,
    counter: u64,
    buffer_current: usize,
}

impl SeedableRng for BlakeRNG {
    type Seed = PRNGSeed;

    fn from_seed(seed: Self::Seed) -> Self {
        Self {
            seed,
            counter: 0,
            buffer: Box::new([0; BUFFER_SIZE]),
            buffer_current: BUFFER_SIZE,
        }
    }

}

impl BlakeRNG {

    fn refill_buffer(&mut self) {
        let mut hash = blake3::Hasher::new();
        hash.update(self.seed.as_ref());
        hash.update(&self.counter.to_le_bytes());
        hash.finalize_xof().fill(&mut self.buffer[..]);
        self.buffer_current = 0;
        self.counter = self.counter.wrapping_add(1);
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        if self.buffer_current + N > BUFFER_SIZE {
            self.refill_buffer();
        }
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.buffer[self.buffer_current..self.buffer_current + N]);
        self.buffer_current += N;
        bytes
    }

}

impl RngCore for BlakeRNG {

    fn next_u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take::<4>())
    }

    fn next_u64(&mut self) -> u64 {
        u64::from_le_bytes(self.take::<8>())
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut i = 0;
        while i < dest.len() {
            if self.buffer_current >= BUFFER_SIZE {
                self.refill_buffer();
            }
            let len = std::cmp::min(dest.len() - i, BUFFER_SIZE - self.buffer_current);
            dest[i..i+len].copy_from_slice(&self.buffer[self.buffer_current..self.buffer_current+len]);
            i += len;
            self.buffer_current += len;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }

}
