//! Deterministic seeding for the environments.
//!
//! Every environment owns one `RngStream`, created from the configured seed
//! and replaced whenever `reset` receives `Some(seed)`.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Type alias for the default RNG stream used across the crate.
pub type RngStream = ChaCha8Rng;

/// Create a new RNG stream from a root seed.
pub fn rng_from_seed(seed: u64) -> RngStream {
    RngStream::seed_from_u64(seed)
}
