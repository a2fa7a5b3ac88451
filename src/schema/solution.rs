//! Found routes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::compute::{Action, Point};

/// An ordered route from start to goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// Positions visited, start first.
    pub path: Vec<Point>,
    /// Action that produced each position; `None` for the start.
    pub actions: Vec<Option<Action>>,
    /// Sum of move costs.
    pub cost: f64,
    /// Wall-clock solve time in milliseconds.
    pub elapsed_ms: f64,
    /// Nodes expanded by the search (summed over legs).
    pub expanded: usize,
}

impl Solution {
    pub fn start(&self) -> Option<Point> {
        self.path.first().copied()
    }

    pub fn end(&self) -> Option<Point> {
        self.path.last().copied()
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, position) in self.path.iter().enumerate() {
            match self.actions.get(i).copied().flatten() {
                Some(action) => writeln!(f, "{action} TO {position}")?,
                None => writeln!(f, "{position}")?,
            }
        }
        write!(f, "Cost: {}", self.cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let solution = Solution {
            path: vec![Point::new(1, 1), Point::new(1, 2)],
            actions: vec![None, Some(Action::Up)],
            cost: 1.0,
            elapsed_ms: 0.1,
            expanded: 2,
        };
        assert_eq!(solution.to_string(), "(1, 1)\nUP TO (1, 2)\nCost: 1");
        assert_eq!(solution.start(), Some(Point::new(1, 1)));
        assert_eq!(solution.end(), Some(Point::new(1, 2)));
    }
}
