use std::hash::Hasher;

/// A deterministic FNV-1a 64-bit hasher.
///
/// `DefaultHasher` is randomized per process, so per-run seeds are mixed
/// with this instead.
#[derive(Debug)]
pub struct FnvHasher {
    state: u64,
}

impl FnvHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Default for FnvHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= byte as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Seed for the run evaluating candidate `candidate_index` of a sweep.
///
/// Depends only on its inputs, so a candidate gets the same random stream
/// whether the sweep runs sequentially or on the thread pool.
pub fn derive_run_seed(base_seed: u64, candidate_index: usize) -> u64 {
    let mut hasher = FnvHasher::new();
    hasher.write(&base_seed.to_le_bytes());
    hasher.write(&(candidate_index as u64).to_le_bytes());
    hasher.finish()
}
