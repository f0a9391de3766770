//! Short code generation
//!
//! Generators are pure: they never look at the store. Collisions are
//! detected by [`LinkStore::create`](crate::store::LinkStore::create).

use parking_lot::Mutex;
use rand::{distr::Alphanumeric, rngs::StdRng, Rng, SeedableRng};

/// Length of every generated short code.
pub const CODE_LENGTH: usize = 6;

/// Produces candidate short codes.
///
/// Implementations do not have to guarantee uniqueness.
pub trait CodeGenerator: Send + Sync + 'static {
    fn generate(&self) -> String;
}

/// Uniform random codes over `[a-zA-Z0-9]`.
///
/// Each instance owns its RNG; two generators never share state.
#[derive(Debug)]
pub struct RandomCodeGenerator {
    rng: Mutex<StdRng>,
}

impl RandomCodeGenerator {
    /// Creates a generator seeded from the operating system, so sequences
    /// differ across process restarts.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Creates a generator with a fixed seed. Same seed, same sequence.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomCodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        let mut rng = self.rng.lock();
        (0..CODE_LENGTH)
            .map(|_| char::from(rng.sample(Alphanumeric)))
            .collect()
    }
}
