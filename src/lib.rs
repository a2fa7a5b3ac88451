//! Obstacle Router - Collision-free routing on a grid among moving polygons.
//!
//! A point agent moves on the integer lattice of a bounded plane with eight
//! moves per step. Polygonal obstacles may slide back and forth along x,
//! driven by a background mover thread.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Problem descriptions, solver configuration and result types
//! - `compute`: Geometry, the environment, graph search and the genetic sequencer
//!
//! Point-to-point problems are solved by [`SearchSolver`] (Dijkstra, A* or
//! Greedy-Best-First). Problems with pickup points are solved by
//! [`GeneticSolver`], which orders the pickups and stitches A* legs.
//!
//! # Example
//!
//! ```rust,no_run
//! use obstacle_router::{
//!     compute::SearchSolver,
//!     schema::ProblemSpec,
//! };
//!
//! let spec = ProblemSpec::default();
//! let mut env = spec.into_environment().unwrap();
//! env.start_motion();
//!
//! let solution = env.solved_by(&SearchSolver::a_star()).unwrap();
//! println!("{solution}");
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::evolution::GeneticSolver;
pub use compute::{Environment, PlanError, Point, Polygon, SearchSolver, Solver, Strategy};
pub use schema::{GeneticConfig, ProblemSpec, RouteResult, Solution};
