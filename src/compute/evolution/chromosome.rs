//! Permutation chromosomes and their genetic operators.
//!
//! Provides random orderings, order-1 crossover and swap mutation. Every
//! operator maps permutations of the pickup set to permutations of the same
//! set.

use std::collections::HashSet;

use rand::prelude::*;

use crate::compute::{Environment, PlanError, Point};

/// A visiting order of the pickup points.
pub type Chromosome = Vec<Point>;

/// Random number generator wrapper for chromosome operations.
pub struct ChromosomeRng {
    rng: StdRng,
}

impl ChromosomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Uniformly shuffled pickup order.
    pub fn random_chromosome(&mut self, env: &Environment) -> Chromosome {
        env.random_pickup_sequence(&mut self.rng)
    }

    /// Uniform index in `0..len`.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Two distinct indices in `0..len`; `len` must be at least 2.
    pub fn distinct_pair(&mut self, len: usize) -> (usize, usize) {
        let first = self.index(len);
        let mut second = self.index(len);
        while second == first {
            second = self.index(len);
        }
        (first, second)
    }

    /// `k` distinct indices in `0..len`, in random order.
    pub fn sample(&mut self, len: usize, k: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut self.rng, len, k.min(len)).into_vec()
    }

    /// Bernoulli trial.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Cut range `start..end` over a chromosome of `len` genes, redrawn until
    /// `start < end`.
    pub fn cut_points(&mut self, len: usize) -> (usize, usize) {
        loop {
            let start = self.rng.gen_range(0..=len);
            let end = self.rng.gen_range(0..=len);
            if start < end {
                return (start, end);
            }
        }
    }

    /// Order-1 crossover producing two children.
    pub fn crossover(
        &mut self,
        parent1: &[Point],
        parent2: &[Point],
    ) -> Result<(Chromosome, Chromosome), PlanError> {
        if parent1.len() != parent2.len() {
            return Err(PlanError::MismatchedChromosomeLength {
                left: parent1.len(),
                right: parent2.len(),
            });
        }
        if parent1.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }

        let (start, end) = self.cut_points(parent1.len());
        Ok((
            order_crossover(parent1, parent2, start, end),
            order_crossover(parent2, parent1, start, end),
        ))
    }

    /// Swap two distinct genes in place.
    pub fn mutate(&mut self, chromosome: &mut [Point]) {
        if chromosome.len() < 2 {
            return;
        }
        let (i, j) = self.distinct_pair(chromosome.len());
        chromosome.swap(i, j);
    }
}

/// Order-1 crossover with a fixed cut range.
///
/// `keep[start..end]` is copied in place; the remaining slots are filled with
/// the genes of `fill` not already present, read from `end` onward with
/// wrap-around and written from `end` onward with wrap-around.
pub fn order_crossover(keep: &[Point], fill: &[Point], start: usize, end: usize) -> Chromosome {
    let n = keep.len();
    if n == 0 {
        return Vec::new();
    }

    let segment = &keep[start..end];
    let taken: HashSet<Point> = segment.iter().copied().collect();

    // child rotated so that index `start` comes first
    let mut child: Chromosome = Vec::with_capacity(n);
    child.extend_from_slice(segment);
    child.extend(
        (0..n)
            .map(|k| fill[(end + k) % n])
            .filter(|gene| !taken.contains(gene)),
    );
    child.rotate_right(start % n);
    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pts(xs: &[i32]) -> Vec<Point> {
        xs.iter().map(|&x| Point::new(x, 1)).collect()
    }

    fn sorted(mut v: Vec<Point>) -> Vec<Point> {
        v.sort();
        v
    }

    #[test]
    fn test_order_crossover_textbook() {
        // parents 1..=8 and a reversal-like ordering, cut 2..5
        let p1 = pts(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let p2 = pts(&[3, 7, 5, 1, 6, 8, 2, 4]);
        let child = order_crossover(&p1, &p2, 2, 5);
        assert_eq!(&child[2..5], &p1[2..5]);
        // p2 read from index 5 minus {3, 4, 5}: 8, 2, 7, 1, 6 into slots 5, 6, 7, 0, 1
        assert_eq!(child, pts(&[1, 6, 3, 4, 5, 8, 2, 7]));
    }

    #[test]
    fn test_full_cut_copies_parent() {
        let p1 = pts(&[1, 2, 3]);
        let p2 = pts(&[3, 1, 2]);
        assert_eq!(order_crossover(&p1, &p2, 0, 3), p1);
    }

    #[test]
    fn test_crossover_length_mismatch() {
        let mut rng = ChromosomeRng::new(1);
        let result = rng.crossover(&pts(&[1, 2, 3]), &pts(&[1, 2]));
        assert!(matches!(
            result,
            Err(PlanError::MismatchedChromosomeLength { left: 3, right: 2 })
        ));
    }

    #[test]
    fn test_cut_points_ordered() {
        let mut rng = ChromosomeRng::new(9);
        for len in 1..10 {
            let (start, end) = rng.cut_points(len);
            assert!(start < end);
            assert!(end <= len);
        }
    }

    #[test]
    fn test_mutate_swaps_exactly_two() {
        let mut rng = ChromosomeRng::new(3);
        let original = pts(&[1, 2, 3, 4, 5]);
        let mut mutated = original.clone();
        rng.mutate(&mut mutated);
        let changed = original
            .iter()
            .zip(&mutated)
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(changed, 2);
        assert_eq!(sorted(mutated), original);
    }

    #[test]
    fn test_mutate_single_gene_noop() {
        let mut rng = ChromosomeRng::new(3);
        let mut one = pts(&[4]);
        rng.mutate(&mut one);
        assert_eq!(one, pts(&[4]));
    }

    #[test]
    fn test_sample_distinct() {
        let mut rng = ChromosomeRng::new(5);
        let picked = rng.sample(10, 4);
        assert_eq!(picked.len(), 4);
        let unique: HashSet<_> = picked.iter().collect();
        assert_eq!(unique.len(), 4);
        assert_eq!(rng.sample(3, 8).len(), 3);
    }

    proptest! {
        #[test]
        fn prop_crossover_preserves_permutation(
            genes in prop::collection::hash_set(0i32..200, 1..20),
            seed in any::<u64>(),
        ) {
            let p1: Vec<Point> = genes.iter().map(|&x| Point::new(x, x / 7)).collect();
            let mut p2 = p1.clone();
            let mut shuffler = StdRng::seed_from_u64(seed);
            p2.shuffle(&mut shuffler);

            let mut rng = ChromosomeRng::new(seed);
            let (c1, c2) = rng.crossover(&p1, &p2).unwrap();
            prop_assert_eq!(sorted(c1), sorted(p1.clone()));
            prop_assert_eq!(sorted(c2), sorted(p1));
        }

        #[test]
        fn prop_any_cut_range_preserves_permutation(
            len in 1usize..15,
            a in any::<usize>(),
            b in any::<usize>(),
            seed in any::<u64>(),
        ) {
            let start = a % len;
            let end = start + 1 + b % (len - start);
            let p1 = pts(&(0..len as i32).collect::<Vec<_>>());
            let mut p2 = p1.clone();
            p2.shuffle(&mut StdRng::seed_from_u64(seed));

            let child = order_crossover(&p1, &p2, start, end);
            prop_assert_eq!(&child[start..end], &p1[start..end]);
            prop_assert_eq!(sorted(child), p1);
        }
    }
}
