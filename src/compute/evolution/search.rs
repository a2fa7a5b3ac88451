//! Genetic search over pickup orderings.

use std::time::Instant;

use log::{debug, info};

use crate::compute::{Environment, PlanError, Point, Solver};
use crate::schema::{
    EvolutionHistory, EvolutionStats, GeneticConfig, RouteResult, Solution, StopReason,
};

use super::chromosome::{Chromosome, ChromosomeRng};
use super::fitness::FitnessEvaluator;
use super::stitch::stitch_route;

/// Evolution engine that runs the search.
pub struct EvolutionEngine {
    config: GeneticConfig,
    rng: ChromosomeRng,
    evaluator: FitnessEvaluator,
    population: Vec<Chromosome>,
    fitness: Vec<f64>,
    history: EvolutionHistory,
    generation: usize,
}

impl EvolutionEngine {
    /// Create an engine ranking orders between `start` and `goal`.
    pub fn new(config: GeneticConfig, start: Point, goal: Point) -> Self {
        let seed = config.random_seed.unwrap_or_else(rand::random);

        Self {
            config,
            rng: ChromosomeRng::new(seed),
            evaluator: FitnessEvaluator::new(start, goal),
            population: Vec::new(),
            fitness: Vec::new(),
            history: EvolutionHistory::default(),
            generation: 0,
        }
    }

    pub fn history(&self) -> &EvolutionHistory {
        &self.history
    }

    /// Generations evaluated so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn population(&self) -> &[Chromosome] {
        &self.population
    }

    /// Fill the population with random orders of the environment's pickups.
    pub fn initialize(&mut self, env: &Environment) {
        self.population = (0..self.config.population_size)
            .map(|_| self.rng.random_chromosome(env))
            .collect();
        self.fitness.clear();
        self.history = EvolutionHistory::default();
        self.generation = 0;
    }

    /// Score the population and return its average fitness.
    fn evaluate_population(&mut self) -> f64 {
        self.fitness = self.evaluator.evaluate_population(&self.population);
        mean(&self.fitness)
    }

    /// Fittest of the given population indices; earlier entries win ties.
    fn best_of(&self, indices: &[usize]) -> Option<usize> {
        indices.iter().copied().reduce(|best, idx| {
            if self.fitness[idx] > self.fitness[best] {
                idx
            } else {
                best
            }
        })
    }

    fn tournament(&mut self) -> usize {
        let contenders = self
            .rng
            .sample(self.population.len(), self.config.tournament_size);
        self.best_of(&contenders).unwrap_or(0)
    }

    /// Parent pool as population indices; may repeat.
    fn select_parents(&mut self) -> Vec<usize> {
        (0..self.config.parent_pool_size)
            .map(|_| self.tournament())
            .collect()
    }

    /// Replace the population with crossover children of the pool.
    fn breed(&mut self, pool: &[usize]) -> Result<(), PlanError> {
        let size = self.config.population_size;
        let mut next = Vec::with_capacity(size + 1);

        while next.len() < size {
            let (a, b) = self.rng.distinct_pair(pool.len());
            let (first, second) = self
                .rng
                .crossover(&self.population[pool[a]], &self.population[pool[b]])?;
            next.push(first);
            next.push(second);
        }

        next.truncate(size);
        self.population = next;
        Ok(())
    }

    /// Swap-mutate, more eagerly below the average fitness.
    fn mutate_population(&mut self) {
        let fitness = self.evaluator.evaluate_population(&self.population);
        let average = mean(&fitness);
        let (below, at_or_above) = self.config.mutation_probability;

        for (chromosome, score) in self.population.iter_mut().zip(fitness) {
            let probability = if score < average { below } else { at_or_above };
            if self.rng.chance(probability) {
                self.rng.mutate(chromosome);
            }
        }
    }

    /// Check if evolution should stop.
    fn should_stop(&self) -> Option<StopReason> {
        if let Some(&current) = self.history.avg_fitness.last()
            && let Some(previous) = self.history.lagged_average(self.config.convergence_lag)
            && (current - previous).abs() < self.config.convergence_tolerance
        {
            return Some(StopReason::Converged);
        }

        if self.generation >= self.config.max_generations {
            return Some(StopReason::MaxGenerations);
        }

        None
    }

    /// Evolve until convergence or the generation cap and return the fittest
    /// order of the final parent pool.
    pub fn run(&mut self, env: &Environment) -> Result<(Chromosome, EvolutionStats), PlanError> {
        self.config.validate()?;
        let started = Instant::now();
        self.initialize(env);

        loop {
            let average = self.evaluate_population();
            let best = self.fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            self.generation += 1;
            self.history.best_fitness.push(best);
            self.history.avg_fitness.push(average);
            debug!(
                "generation {}: best {:.6}, average {:.6}",
                self.generation, best, average
            );

            let pool = self.select_parents();

            if let Some(stop_reason) = self.should_stop() {
                let winner = self.best_of(&pool).unwrap_or(0);
                let stats = EvolutionStats {
                    generations: self.generation,
                    best_fitness: self.fitness[winner],
                    final_avg_fitness: average,
                    evolution_ms: started.elapsed().as_secs_f64() * 1000.0,
                    stop_reason,
                };
                info!(
                    "evolution stopped after {} generations ({:?}), best fitness {:.6}",
                    stats.generations, stop_reason, stats.best_fitness
                );
                return Ok((self.population[winner].clone(), stats));
            }

            self.breed(&pool)?;
            self.mutate_population();
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Multi-destination solver: evolves a pickup order, then stitches A* legs.
#[derive(Debug, Clone, Default)]
pub struct GeneticSolver {
    config: GeneticConfig,
}

impl GeneticSolver {
    pub fn new(config: GeneticConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneticConfig {
        &self.config
    }

    /// Full run with the chosen order, statistics and fitness history.
    ///
    /// Holds the environment's planning session from the first fitness
    /// evaluation to the last leg, so the mover is paused throughout.
    pub fn run(&self, env: &Environment) -> Result<RouteResult, PlanError> {
        if !env.has_pickups() {
            return Err(PlanError::WrongProblemType {
                solver: self.name(),
                pickups: 0,
            });
        }

        let started = Instant::now();
        let session = env.begin_planning();

        let mut engine = EvolutionEngine::new(self.config.clone(), env.start(), env.goal());
        let (order, stats) = engine.run(env)?;
        if !session.validate_pickup_sequence(&order) {
            debug!("straight-line route of the chosen order meets an obstacle");
        }

        let mut solution = stitch_route(&session, &order, &self.config.leg_retry)?;
        session.end();
        solution.elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        info!(
            "route through {} pickups with cost {:.3} ({:.2} ms)",
            order.len(),
            solution.cost,
            solution.elapsed_ms
        );

        Ok(RouteResult {
            solution,
            order,
            stats,
            history: engine.history().clone(),
        })
    }
}

impl Solver for GeneticSolver {
    fn name(&self) -> &'static str {
        "Genetic"
    }

    fn solve(&self, env: &Environment) -> Result<Solution, PlanError> {
        self.run(env).map(|result| result.solution)
    }
}
