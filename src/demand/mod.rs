/*!
 * Demand Module
 * Pluggable sources for the resource demands of newly created processes
 */

use crate::core::errors::ConfigError;
use crate::core::limits;
use crate::core::types::Demand;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Supplies the demand attached to each process created without an
/// explicit one.
///
/// Sources are `Send + Sync` so the simulation owning one can sit behind
/// a shared lock and move onto the driver task.
pub trait DemandSource: Send + Sync {
    fn next_demand(&mut self) -> Demand;
}

/// Inclusive sampling bounds for randomly generated demands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DemandRange {
    pub min_cpu: f64,
    pub max_cpu: f64,
    pub min_memory_mb: u64,
    pub max_memory_mb: u64,
}

impl DemandRange {
    pub fn new(
        min_cpu: f64,
        max_cpu: f64,
        min_memory_mb: u64,
        max_memory_mb: u64,
    ) -> Result<Self, ConfigError> {
        if !min_cpu.is_finite() || !max_cpu.is_finite() || min_cpu < 0.0 || max_cpu < min_cpu {
            return Err(ConfigError::InvalidCpuRange {
                min: min_cpu,
                max: max_cpu,
            });
        }
        if max_memory_mb < min_memory_mb {
            return Err(ConfigError::InvalidMemoryRange {
                min: min_memory_mb,
                max: max_memory_mb,
            });
        }
        Ok(Self {
            min_cpu,
            max_cpu,
            min_memory_mb,
            max_memory_mb,
        })
    }

    /// Draw one demand uniformly from the configured bounds.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Demand {
        Demand::new(
            rng.gen_range(self.min_cpu..=self.max_cpu),
            rng.gen_range(self.min_memory_mb..=self.max_memory_mb),
        )
    }
}

impl Default for DemandRange {
    fn default() -> Self {
        Self {
            min_cpu: limits::MIN_CPU_DEMAND,
            max_cpu: limits::MAX_CPU_DEMAND,
            min_memory_mb: limits::MIN_MEMORY_DEMAND_MB,
            max_memory_mb: limits::MAX_MEMORY_DEMAND_MB,
        }
    }
}

/// Seedable random demand source backed by `StdRng`.
#[derive(Debug, Clone)]
pub struct RandomDemand {
    range: DemandRange,
    rng: StdRng,
}

impl RandomDemand {
    /// Source seeded from OS entropy over the default range.
    #[must_use]
    pub fn new() -> Self {
        Self {
            range: DemandRange::default(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic source: the same seed always yields the same
    /// demand sequence.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            range: DemandRange::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub fn with_range(mut self, range: DemandRange) -> Self {
        self.range = range;
        self
    }
}

impl Default for RandomDemand {
    fn default() -> Self {
        Self::new()
    }
}

impl DemandSource for RandomDemand {
    fn next_demand(&mut self) -> Demand {
        self.range.sample(&mut self.rng)
    }
}

/// Replays a fixed demand sequence, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedDemand {
    script: Vec<Demand>,
    cursor: usize,
}

impl ScriptedDemand {
    /// # Panics
    ///
    /// Panics if `script` is empty.
    #[must_use]
    pub fn new(script: Vec<Demand>) -> Self {
        assert!(!script.is_empty(), "demand script must not be empty");
        Self { script, cursor: 0 }
    }
}

impl DemandSource for ScriptedDemand {
    fn next_demand(&mut self) -> Demand {
        let demand = self.script[self.cursor % self.script.len()];
        self.cursor = self.cursor.wrapping_add(1);
        demand
    }
}
