//! Genetic pickup-sequencing configuration and result types.
//!
//! The sequencer evolves visiting orders of the pickup points, then realizes
//! the best order as a chain of obstacle-aware legs.

use serde::{Deserialize, Serialize};

use super::Solution;
use crate::compute::Point;

/// Top-level configuration for the genetic sequencer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneticConfig {
    /// Generation cap.
    #[serde(default = "default_max_generations")]
    pub max_generations: usize,
    /// Number of tournament winners kept as parents each generation.
    #[serde(default = "default_parent_pool_size")]
    pub parent_pool_size: usize,
    /// Chromosomes per generation.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Swap-mutation probability for chromosomes (below, at-or-above) the
    /// population's average fitness.
    #[serde(default = "default_mutation_probability")]
    pub mutation_probability: (f64, f64),
    /// Members drawn per tournament.
    #[serde(default = "default_tournament_size")]
    pub tournament_size: usize,
    /// Stop once average fitness moves less than this over `convergence_lag`
    /// generations.
    #[serde(default = "default_convergence_tolerance")]
    pub convergence_tolerance: f64,
    /// How many generations back the convergence test looks.
    #[serde(default = "default_convergence_lag")]
    pub convergence_lag: usize,
    /// Leg-stitching retry bounds.
    #[serde(default)]
    pub leg_retry: LegRetryConfig,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            max_generations: default_max_generations(),
            parent_pool_size: default_parent_pool_size(),
            population_size: default_population_size(),
            mutation_probability: default_mutation_probability(),
            tournament_size: default_tournament_size(),
            convergence_tolerance: default_convergence_tolerance(),
            convergence_lag: default_convergence_lag(),
            leg_retry: LegRetryConfig::default(),
            random_seed: None,
        }
    }
}

fn default_max_generations() -> usize {
    300
}
fn default_parent_pool_size() -> usize {
    200
}
fn default_population_size() -> usize {
    2000
}
fn default_mutation_probability() -> (f64, f64) {
    (0.8, 0.2)
}
fn default_tournament_size() -> usize {
    5
}
fn default_convergence_tolerance() -> f64 {
    1e-5
}
fn default_convergence_lag() -> usize {
    3
}

/// Bounds on re-solving a leg that comes back unreachable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegRetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    /// Wall-clock budget per leg across all attempts.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_max_attempts() -> usize {
    5
}
fn default_timeout_ms() -> u64 {
    5000
}

impl Default for LegRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// History of fitness values across generations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionHistory {
    /// Best fitness per generation.
    pub best_fitness: Vec<f64>,
    /// Average fitness per generation.
    pub avg_fitness: Vec<f64>,
}

impl EvolutionHistory {
    /// Average fitness `lag` generations before the latest one.
    pub fn lagged_average(&self, lag: usize) -> Option<f64> {
        let len = self.avg_fitness.len();
        (len > lag).then(|| self.avg_fitness[len - 1 - lag])
    }
}

/// Reason evolution stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Average fitness stopped moving.
    Converged,
    /// Reached the generation cap.
    MaxGenerations,
}

/// Statistics from one sequencer run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Generations evaluated.
    pub generations: usize,
    /// Fitness of the chosen order.
    pub best_fitness: f64,
    /// Average fitness of the last generation.
    pub final_avg_fitness: f64,
    /// Time spent evolving (milliseconds).
    pub evolution_ms: f64,
    pub stop_reason: StopReason,
}

/// Final result of a sequencer run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResult {
    /// Stitched route through every pickup.
    pub solution: Solution,
    /// Chosen visiting order.
    pub order: Vec<Point>,
    pub stats: EvolutionStats,
    pub history: EvolutionHistory,
}

// ============================================================================
// Validation
// ============================================================================

/// Genetic configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum GeneticConfigError {
    #[error("Population size must be at least 2")]
    PopulationTooSmall,
    #[error("Parent pool must hold at least two chromosomes")]
    ParentPoolTooSmall,
    #[error("Generation cap must be positive")]
    NoGenerations,
    #[error("Tournament size must be positive")]
    InvalidTournamentSize,
    #[error("Invalid mutation probability: {0}")]
    InvalidProbability(f64),
    #[error("Convergence lag must be positive")]
    InvalidConvergenceLag,
    #[error("Leg retry needs at least one attempt")]
    NoLegAttempts,
}

impl GeneticConfig {
    /// Validate genetic configuration.
    pub fn validate(&self) -> Result<(), GeneticConfigError> {
        if self.population_size < 2 {
            return Err(GeneticConfigError::PopulationTooSmall);
        }
        if self.parent_pool_size < 2 {
            return Err(GeneticConfigError::ParentPoolTooSmall);
        }
        if self.max_generations == 0 {
            return Err(GeneticConfigError::NoGenerations);
        }
        if self.tournament_size == 0 {
            return Err(GeneticConfigError::InvalidTournamentSize);
        }

        let (below, above) = self.mutation_probability;
        for p in [below, above] {
            if !(0.0..=1.0).contains(&p) {
                return Err(GeneticConfigError::InvalidProbability(p));
            }
        }

        if self.convergence_lag == 0 {
            return Err(GeneticConfigError::InvalidConvergenceLag);
        }
        if self.leg_retry.max_attempts == 0 {
            return Err(GeneticConfigError::NoLegAttempts);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = GeneticConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mutation_probability, (0.8, 0.2));
        assert_eq!(config.convergence_lag, 3);
    }

    #[test]
    fn test_partial_json_uses_fallbacks() {
        let config: GeneticConfig =
            serde_json::from_str(r#"{"population_size": 50, "max_generations": 10}"#).unwrap();
        assert_eq!(config.population_size, 50);
        assert_eq!(config.max_generations, 10);
        assert_eq!(config.parent_pool_size, 200);
        assert_eq!(config.leg_retry.max_attempts, 5);
    }

    #[test]
    fn test_invalid_probability() {
        let config = GeneticConfig {
            mutation_probability: (0.5, 1.5),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GeneticConfigError::InvalidProbability(p)) if p == 1.5
        ));
    }

    #[test]
    fn test_population_too_small() {
        let config = GeneticConfig {
            population_size: 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GeneticConfigError::PopulationTooSmall)
        ));
    }

    #[test]
    fn test_lagged_average() {
        let history = EvolutionHistory {
            best_fitness: vec![],
            avg_fitness: vec![1.0, 2.0, 3.0, 4.0],
        };
        assert_eq!(history.lagged_average(3), Some(1.0));
        assert_eq!(history.lagged_average(1), Some(3.0));
        assert_eq!(history.lagged_average(4), None);
    }
}
