use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::CheckCode;

/// Supplies candidate check codes. Uniqueness is checked by the ledger.
pub trait CodeSource: Send + Sync {
    fn next_code(&self) -> CheckCode;
}

/// Uniform draws from the check alphabet.
pub struct RandomCodes {
    rng: Mutex<StdRng>,
}

impl RandomCodes {
    /// Seeded for reproducible runs, OS entropy otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl Default for RandomCodes {
    fn default() -> Self {
        Self::new(None)
    }
}

impl CodeSource for RandomCodes {
    fn next_code(&self) -> CheckCode {
        CheckCode::random(&mut *self.rng.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_sources_repeat() {
        let a = RandomCodes::new(Some(11));
        let b = RandomCodes::new(Some(11));
        for _ in 0..5 {
            assert_eq!(a.next_code(), b.next_code());
        }
    }
}
