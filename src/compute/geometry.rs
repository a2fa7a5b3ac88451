//! Planar primitives: integer points, obstacle polygons and the eight grid moves.
//!
//! All predicates work on exact integer arithmetic (products are widened to
//! `i128`), so "touching" is decided without any floating point tolerance.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = f64::from(other.x - self.x);
        let dy = f64::from(other.y - self.y);
        dx.hypot(dy)
    }

    /// Point displaced by one action.
    #[inline]
    pub fn step(&self, action: Action) -> Point {
        let (dx, dy) = action.delta();
        Point::new(self.x + dx, self.y + dy)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the eight grid moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Action {
    /// Application order used for successor generation. Ties in the open set
    /// are broken by this order.
    pub const ALL: [Action; 8] = [
        Action::Left,
        Action::Right,
        Action::Up,
        Action::Down,
        Action::UpLeft,
        Action::UpRight,
        Action::DownLeft,
        Action::DownRight,
    ];

    /// Displacement `(dx, dy)`; `Up` increases y.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Action::Left => (-1, 0),
            Action::Right => (1, 0),
            Action::Up => (0, 1),
            Action::Down => (0, -1),
            Action::UpLeft => (-1, 1),
            Action::UpRight => (1, 1),
            Action::DownLeft => (-1, -1),
            Action::DownRight => (1, -1),
        }
    }

    #[inline]
    pub fn is_diagonal(self) -> bool {
        let (dx, dy) = self.delta();
        dx != 0 && dy != 0
    }

    /// 1 for orthogonal moves, exactly `SQRT_2` for diagonal ones.
    #[inline]
    pub fn cost(self) -> f64 {
        if self.is_diagonal() {
            std::f64::consts::SQRT_2
        } else {
            1.0
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::Left => "LEFT",
            Action::Right => "RIGHT",
            Action::Up => "UP",
            Action::Down => "DOWN",
            Action::UpLeft => "UP_LEFT",
            Action::UpRight => "UP_RIGHT",
            Action::DownLeft => "DOWN_LEFT",
            Action::DownRight => "DOWN_RIGHT",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A simple polygon given by its ordered vertices.
///
/// A single-vertex polygon is allowed and blocks exactly that position; it is
/// how a waypoint is temporarily walled off during leg stitching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    /// Degenerate polygon covering a single position.
    pub fn point(p: Point) -> Self {
        Self { vertices: vec![p] }
    }

    /// Axis-aligned rectangle with inclusive corners.
    pub fn rectangle(min: Point, max: Point) -> Self {
        Self::new(vec![
            min,
            Point::new(max.x, min.y),
            max,
            Point::new(min.x, max.y),
        ])
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Closed edge list, last vertex joined back to the first.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Shift every vertex along x.
    pub fn translate_x(&mut self, dx: i32) {
        for v in &mut self.vertices {
            v.x += dx;
        }
    }

    /// True if `p` lies on any edge.
    pub fn touches(&self, p: Point) -> bool {
        self.edges().any(|(a, b)| on_segment(a, b, p))
    }

    /// True if `p` lies strictly inside (even-odd rule).
    pub fn contains_strictly(&self, p: Point) -> bool {
        if self.vertices.len() < 3 || self.touches(p) {
            return false;
        }
        let mut inside = false;
        for (a, b) in self.edges() {
            let dy = i128::from(b.y) - i128::from(a.y);
            if (a.y > p.y) == (b.y > p.y) {
                continue;
            }
            let cross = cross(a, b, p);
            if (dy > 0 && cross > 0) || (dy < 0 && cross < 0) {
                inside = !inside;
            }
        }
        inside
    }

    /// Collision rule for positions: inside or on the boundary.
    #[inline]
    pub fn blocks(&self, p: Point) -> bool {
        self.touches(p) || self.contains_strictly(p)
    }

    /// Collision rule for straight moves: the segment crosses or touches an
    /// edge, or lies entirely inside.
    pub fn blocks_segment(&self, a: Point, b: Point) -> bool {
        if self.vertices.is_empty() {
            return false;
        }
        self.edges().any(|(p, q)| segments_intersect(a, b, p, q)) || self.blocks(a)
    }
}

/// `(b - a) x (p - a)`. Coordinate differences need 33 bits, so their
/// products are taken in `i128`.
fn cross(a: Point, b: Point, p: Point) -> i128 {
    let (ax, ay) = (i128::from(a.x), i128::from(a.y));
    (i128::from(b.x) - ax) * (i128::from(p.y) - ay) - (i128::from(p.x) - ax) * (i128::from(b.y) - ay)
}

fn within_box(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    cross(a, b, p) == 0 && within_box(a, b, p)
}

/// Closed segment intersection, endpoints and collinear overlap included.
pub fn segments_intersect(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = cross(q1, q2, p1).signum();
    let d2 = cross(q1, q2, p2).signum();
    let d3 = cross(p1, p2, q1).signum();
    let d4 = cross(p1, p2, q2).signum();

    if d1 * d2 < 0 && d3 * d4 < 0 {
        return true;
    }

    (d1 == 0 && within_box(q1, q2, p1))
        || (d2 == 0 && within_box(q1, q2, p2))
        || (d3 == 0 && within_box(p1, p2, q1))
        || (d4 == 0 && within_box(p1, p2, q2))
}
