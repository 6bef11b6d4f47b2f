use std::sync::{Mutex, PoisonError};

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{ResultProvider, SelectedFile};
use crate::DashboardError;

/// Exclusive upper bound of the simulated count.
pub const SIMULATED_COUNT_LIMIT: u32 = 100;

/// Stand-in for the analysis backend: answers with a random count in
/// `0..SIMULATED_COUNT_LIMIT` without looking at the file.
#[derive(Debug)]
pub struct SimulatedCount {
    rng: Mutex<StdRng>,
}

impl SimulatedCount {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence of counts.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for SimulatedCount {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultProvider for SimulatedCount {
    async fn people_count(
        &self,
        file: &SelectedFile,
    ) -> Result<u32, DashboardError> {
        let count = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_range(0..SIMULATED_COUNT_LIMIT);

        tracing::debug!(file = %file.name(), count, "simulated people count");

        Ok(count)
    }
}
