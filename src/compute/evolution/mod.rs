//! Genetic route sequencing for multi-destination problems.
//!
//! When an environment carries pickup points, the order in which they are
//! visited is found by evolving permutations, and the winning order is then
//! realized leg by leg with A*.
//!
//! # Overview
//!
//! - **Chromosomes** (`chromosome`): random orders, order-1 crossover, swap mutation
//! - **Fitness** (`fitness`): inverse straight-line length of an order
//! - **Engine** (`search`): tournament selection, breeding and the convergence test
//! - **Stitching** (`stitch`): bounded-retry A* legs joined into one route
//!
//! # Example
//!
//! ```rust,no_run
//! use obstacle_router::compute::{Environment, Point};
//! use obstacle_router::compute::evolution::GeneticSolver;
//! use obstacle_router::schema::GeneticConfig;
//!
//! let env = Environment::new(
//!     Point::new(1, 5),
//!     Point::new(15, 5),
//!     20,
//!     10,
//!     Vec::new(),
//!     0,
//!     vec![Point::new(10, 5), Point::new(5, 5)],
//! );
//!
//! let result = GeneticSolver::new(GeneticConfig::default()).run(&env).unwrap();
//! println!("Order: {:?}", result.order);
//! println!("Cost: {:.3} after {} generations", result.solution.cost, result.stats.generations);
//! ```

mod chromosome;
mod fitness;
mod search;
mod stitch;

pub use chromosome::{Chromosome, ChromosomeRng, order_crossover};
pub use fitness::{FITNESS_EPSILON, FitnessEvaluator, fitness, route_length};
pub use search::{EvolutionEngine, GeneticSolver};
pub use stitch::stitch_route;
