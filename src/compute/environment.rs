//! The planning world: bounds, endpoints, pickups and a shared obstacle field
//! that may be translated by a background mover.
//!
//! # Locking
//!
//! The obstacle list lives behind one reader/writer lock. The mover takes the
//! write side once per tick. A planner opens a [`PlanningSession`] (read side)
//! and keeps it for the whole solve, so every collision test of one solve sees
//! the same snapshot. The mover stalls for as long as a session is open.
//! Readers take the lock recursively, so a thread holding a session can still
//! call the read-only helpers on [`Environment`] while the mover waits.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info};
use parking_lot::{RwLock, RwLockReadGuard};
use rand::Rng;
use rand::seq::SliceRandom;

use super::geometry::{Action, Point, Polygon};
use super::search::{Node, NodeId, PlanError, Solver};
use crate::schema::{MotionConfig, Solution};

/// Obstacle polygons together with their configured starting positions.
#[derive(Debug, Clone)]
pub struct ObstacleField {
    initial: Vec<Polygon>,
    obstacles: Vec<Polygon>,
    speed: i32,
    direction: i32,
    ticks: u64,
}

impl ObstacleField {
    pub fn new(obstacles: Vec<Polygon>, speed: i32) -> Self {
        Self {
            initial: obstacles.clone(),
            obstacles,
            speed,
            direction: 1,
            ticks: 0,
        }
    }

    pub fn obstacles(&self) -> &[Polygon] {
        &self.obstacles
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    /// Number of motion ticks applied since construction or the last reset.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// One motion tick: shift every obstacle by `speed` along x, then flip
    /// direction for the next tick.
    pub fn advance(&mut self) {
        if self.speed == 0 {
            return;
        }
        let dx = self.speed * self.direction;
        for obstacle in &mut self.obstacles {
            obstacle.translate_x(dx);
        }
        self.direction = -self.direction;
        self.ticks += 1;
    }

    /// Restore the configured positions, dropping injected obstacles.
    pub fn reset(&mut self) {
        self.obstacles = self.initial.clone();
        self.direction = 1;
        self.ticks = 0;
    }

    fn push(&mut self, polygon: Polygon) {
        self.obstacles.push(polygon);
    }

    fn remove_last(&mut self, polygon: &Polygon) -> bool {
        match self.obstacles.iter().rposition(|p| p == polygon) {
            Some(idx) => {
                self.obstacles.remove(idx);
                true
            }
            None => false,
        }
    }
}

/// Background thread ticking an [`ObstacleField`] at a fixed interval.
#[derive(Debug)]
pub struct ObstacleMover {
    should_stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl ObstacleMover {
    /// Spawn the mover thread.
    pub fn spawn(field: Arc<RwLock<ObstacleField>>, interval: Duration) -> Self {
        let should_stop = Arc::new(AtomicBool::new(false));
        let stop = Arc::clone(&should_stop);

        let handle = thread::spawn(move || {
            while !stop.load(Ordering::SeqCst) {
                thread::park_timeout(interval);
                if stop.load(Ordering::SeqCst) {
                    break;
                }
                field.write().advance();
            }
        });

        debug!("obstacle mover started ({:?} per tick)", interval);

        Self {
            should_stop,
            handle: Some(handle),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Signal the thread and wait for it to exit.
    pub fn stop(&mut self) {
        self.should_stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
            debug!("obstacle mover stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for ObstacleMover {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The planning world.
#[derive(Debug)]
pub struct Environment {
    start: Point,
    goal: Point,
    width: i32,
    height: i32,
    pickup_points: Vec<Point>,
    field: Arc<RwLock<ObstacleField>>,
    motion: MotionConfig,
    mover: Option<ObstacleMover>,
}

impl Environment {
    /// Build an environment. Obstacles stay still until [`start_motion`]
    /// is called.
    ///
    /// [`start_motion`]: Environment::start_motion
    pub fn new(
        start: Point,
        goal: Point,
        width: i32,
        height: i32,
        obstacles: Vec<Polygon>,
        obstacle_speed: i32,
        pickup_points: Vec<Point>,
    ) -> Self {
        Self {
            start,
            goal,
            width,
            height,
            pickup_points,
            field: Arc::new(RwLock::new(ObstacleField::new(obstacles, obstacle_speed))),
            motion: MotionConfig::default(),
            mover: None,
        }
    }

    pub fn with_motion_config(mut self, motion: MotionConfig) -> Self {
        self.motion = motion;
        self
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn goal(&self) -> Point {
        self.goal
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn pickup_points(&self) -> &[Point] {
        &self.pickup_points
    }

    pub fn obstacle_speed(&self) -> i32 {
        self.field.read_recursive().speed()
    }

    pub fn has_pickups(&self) -> bool {
        !self.pickup_points.is_empty()
    }

    /// Launch the mover at the configured tick interval. No-op when the
    /// obstacles are static or the mover already runs.
    pub fn start_motion(&mut self) {
        let interval = Duration::from_millis(self.motion.tick_interval_ms);
        self.launch_mover(interval);
    }

    pub fn stop_motion(&mut self) {
        if let Some(mut mover) = self.mover.take() {
            mover.stop();
        }
    }

    pub fn is_moving(&self) -> bool {
        self.mover.as_ref().is_some_and(ObstacleMover::is_running)
    }

    /// Stop the mover, put obstacles back where they started and relaunch the
    /// mover at the slower replay interval.
    pub fn restart(&mut self) {
        self.stop_motion();
        self.field.write().reset();
        let interval = Duration::from_millis(self.motion.replay_interval_ms);
        self.launch_mover(interval);
        info!("environment restarted for replay");
    }

    fn launch_mover(&mut self, interval: Duration) {
        if self.mover.is_some() || self.field.read_recursive().speed() == 0 {
            return;
        }
        self.mover = Some(ObstacleMover::spawn(Arc::clone(&self.field), interval));
    }

    /// Copy of the current obstacle positions.
    pub fn snapshot(&self) -> Vec<Polygon> {
        self.field.read_recursive().obstacles().to_vec()
    }

    /// Apply one motion tick by hand.
    pub fn advance(&self) {
        self.field.write().advance();
    }

    /// Open a planning session; obstacles are frozen until it is dropped.
    ///
    /// Read access is recursive, so the environment's own helpers may be
    /// called while a session is open on the same thread.
    pub fn begin_planning(&self) -> PlanningSession<'_> {
        PlanningSession {
            env: self,
            guard: self.field.read_recursive(),
        }
    }

    /// Inject an obstacle into the live field.
    pub fn add_obstacle(&self, polygon: Polygon) {
        self.field.write().push(polygon);
    }

    /// Remove the most recently added obstacle equal to `polygon`.
    pub fn remove_last_obstacle(&self, polygon: &Polygon) -> bool {
        self.field.write().remove_last(polygon)
    }

    /// Valid successors of `node` (stored at `id`) in fixed action order.
    pub fn get_neighbors(&self, id: NodeId, node: &Node) -> Vec<Node> {
        self.begin_planning().space(self.start, self.goal).neighbors(id, node)
    }

    /// Successor of `node` under one action, if valid.
    pub fn result(&self, id: NodeId, node: &Node, action: Action) -> Option<Node> {
        self.begin_planning()
            .space(self.start, self.goal)
            .result(id, node, action)
    }

    /// True iff no straight segment of start → pickups → goal meets an
    /// obstacle.
    pub fn validate_pickup_sequence(&self, sequence: &[Point]) -> bool {
        self.begin_planning().validate_pickup_sequence(sequence)
    }

    /// Uniformly shuffled copy of the pickup points.
    pub fn random_pickup_sequence<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Point> {
        let mut sequence = self.pickup_points.clone();
        sequence.shuffle(rng);
        sequence
    }

    /// Solve with any solver.
    pub fn solved_by(&self, solver: &dyn Solver) -> Result<Solution, PlanError> {
        solver.solve(self)
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        self.stop_motion();
    }
}

/// Read-locked view of an environment for the length of one solve.
pub struct PlanningSession<'a> {
    env: &'a Environment,
    guard: RwLockReadGuard<'a, ObstacleField>,
}

impl<'a> PlanningSession<'a> {
    pub fn environment(&self) -> &'a Environment {
        self.env
    }

    pub fn obstacles(&self) -> &[Polygon] {
        self.guard.obstacles()
    }

    /// Point-to-point view between two waypoints over this snapshot.
    pub fn space(&self, start: Point, goal: Point) -> SearchSpace<'_> {
        SearchSpace {
            width: self.env.width,
            height: self.env.height,
            start,
            goal,
            obstacles: self.guard.obstacles(),
            extra: Vec::new(),
        }
    }

    pub fn validate_pickup_sequence(&self, sequence: &[Point]) -> bool {
        let waypoints: Vec<Point> = std::iter::once(self.env.start)
            .chain(sequence.iter().copied())
            .chain(std::iter::once(self.env.goal))
            .collect();

        waypoints.windows(2).all(|leg| {
            !self
                .obstacles()
                .iter()
                .any(|obstacle| obstacle.blocks_segment(leg[0], leg[1]))
        })
    }

    /// Release the lock.
    pub fn end(self) {}
}

/// Point-to-point search problem over a frozen obstacle snapshot, with room
/// for temporary obstacles local to this view.
#[derive(Debug, Clone)]
pub struct SearchSpace<'a> {
    width: i32,
    height: i32,
    start: Point,
    goal: Point,
    obstacles: &'a [Polygon],
    extra: Vec<Polygon>,
}

impl<'a> SearchSpace<'a> {
    pub fn start(&self) -> Point {
        self.start
    }

    pub fn goal(&self) -> Point {
        self.goal
    }

    pub fn set_endpoints(&mut self, start: Point, goal: Point) {
        self.start = start;
        self.goal = goal;
    }

    pub fn add_obstacle(&mut self, polygon: Polygon) {
        self.extra.push(polygon);
    }

    /// Remove the most recently added temporary obstacle equal to `polygon`.
    pub fn remove_last_obstacle(&mut self, polygon: &Polygon) -> bool {
        match self.extra.iter().rposition(|p| p == polygon) {
            Some(idx) => {
                self.extra.remove(idx);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn in_bounds(&self, p: Point) -> bool {
        0 < p.x && p.x < self.width && 0 < p.y && p.y < self.height
    }

    /// In bounds and clear of every obstacle (inside or touching).
    pub fn is_free(&self, p: Point) -> bool {
        self.in_bounds(p)
            && !self
                .obstacles
                .iter()
                .chain(self.extra.iter())
                .any(|obstacle| obstacle.blocks(p))
    }

    pub fn result(&self, id: NodeId, node: &Node, action: Action) -> Option<Node> {
        let next = node.position.step(action);
        self.is_free(next).then(|| Node::child(next, id, action))
    }

    pub fn neighbors(&self, id: NodeId, node: &Node) -> Vec<Node> {
        Action::ALL
            .iter()
            .filter_map(|&action| self.result(id, node, action))
            .collect()
    }
}
