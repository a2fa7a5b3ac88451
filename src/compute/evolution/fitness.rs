//! Fitness of pickup orderings.
//!
//! Orders are ranked by the straight-line length of start → pickups → goal.
//! Obstacles are ignored here; they only matter once the chosen order is
//! stitched into legs.

use rayon::prelude::*;

use super::chromosome::Chromosome;
use crate::compute::Point;

/// Keeps fitness finite when every waypoint coincides.
pub const FITNESS_EPSILON: f64 = 1e-6;

/// Straight-line length of the polyline start → `order` → goal.
pub fn route_length(start: Point, order: &[Point], goal: Point) -> f64 {
    let mut length = 0.0;
    let mut previous = start;
    for &point in order.iter().chain(std::iter::once(&goal)) {
        length += previous.distance(&point);
        previous = point;
    }
    length
}

/// Higher is better.
#[inline]
pub fn fitness(start: Point, order: &[Point], goal: Point) -> f64 {
    1.0 / (route_length(start, order, goal) + FITNESS_EPSILON)
}

/// Evaluates orderings for one start/goal pair.
#[derive(Debug, Clone, Copy)]
pub struct FitnessEvaluator {
    start: Point,
    goal: Point,
}

impl FitnessEvaluator {
    pub fn new(start: Point, goal: Point) -> Self {
        Self { start, goal }
    }

    pub fn evaluate(&self, chromosome: &[Point]) -> f64 {
        fitness(self.start, chromosome, self.goal)
    }

    /// Fitness of every chromosome, in population order.
    pub fn evaluate_population(&self, population: &[Chromosome]) -> Vec<f64> {
        population
            .par_iter()
            .map(|chromosome| self.evaluate(chromosome))
            .collect()
    }
}
