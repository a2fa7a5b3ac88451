//! Problem description and obstacle motion parameters.

use serde::{Deserialize, Serialize};

use crate::compute::{Environment, Point, Polygon};

/// Default obstacle speed: static obstacles.
fn default_speed() -> i32 {
    0
}

/// Serializable description of one planning problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemSpec {
    /// Grid width; valid x lies in the open interval (0, width).
    pub width: i32,
    /// Grid height; valid y lies in the open interval (0, height).
    pub height: i32,
    pub start: Point,
    pub goal: Point,
    /// Obstacle polygons as ordered vertex lists.
    #[serde(default)]
    pub obstacles: Vec<Polygon>,
    /// Translation per mover tick along x. Zero keeps obstacles still.
    #[serde(default = "default_speed")]
    pub obstacle_speed: i32,
    /// Points to visit before the goal. Non-empty selects the genetic sequencer.
    #[serde(default)]
    pub pickup_points: Vec<Point>,
    #[serde(default)]
    pub motion: MotionConfig,
}

impl Default for ProblemSpec {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            start: Point::new(2, 2),
            goal: Point::new(17, 17),
            obstacles: vec![Polygon::rectangle(Point::new(8, 4), Point::new(11, 15))],
            obstacle_speed: default_speed(),
            pickup_points: Vec::new(),
            motion: MotionConfig::default(),
        }
    }
}

/// Mover tick intervals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Tick interval while planning.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Slower tick interval used after `restart()` for replay.
    #[serde(default = "default_replay_interval_ms")]
    pub replay_interval_ms: u64,
}

fn default_tick_interval_ms() -> u64 {
    10
}

fn default_replay_interval_ms() -> u64 {
    200
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            replay_interval_ms: default_replay_interval_ms(),
        }
    }
}

impl ProblemSpec {
    /// Parse from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let spec: Self = serde_json::from_str(json)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Validate problem parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if let Some(index) = self.obstacles.iter().position(Polygon::is_empty) {
            return Err(ConfigError::EmptyObstacle { index });
        }
        if self.motion.tick_interval_ms == 0 || self.motion.replay_interval_ms == 0 {
            return Err(ConfigError::InvalidTickInterval);
        }
        Ok(())
    }

    /// Build the environment. The mover is not started.
    pub fn into_environment(self) -> Result<Environment, ConfigError> {
        self.validate()?;
        Ok(Environment::new(
            self.start,
            self.goal,
            self.width,
            self.height,
            self.obstacles,
            self.obstacle_speed,
            self.pickup_points,
        )
        .with_motion_config(self.motion))
    }
}

/// Problem validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid dimensions (width, height) must be positive")]
    InvalidDimensions,
    #[error("Obstacle {index} has no vertices")]
    EmptyObstacle { index: usize },
    #[error("Mover tick intervals must be non-zero")]
    InvalidTickInterval,
    #[error("Malformed problem description: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_problem_valid() {
        assert!(ProblemSpec::default().validate().is_ok());
    }

    #[test]
    fn test_minimal_json() {
        let json = r#"{
            "width": 10,
            "height": 10,
            "start": {"x": 1, "y": 1},
            "goal": {"x": 1, "y": 4}
        }"#;
        let spec = ProblemSpec::from_json_str(json).unwrap();
        assert!(spec.obstacles.is_empty());
        assert_eq!(spec.obstacle_speed, 0);
        assert_eq!(spec.motion, MotionConfig::default());

        let env = spec.into_environment().unwrap();
        assert_eq!(env.goal(), Point::new(1, 4));
        assert!(!env.has_pickups());
    }

    #[test]
    fn test_obstacles_as_vertex_lists() {
        let json = r#"{
            "width": 10,
            "height": 10,
            "start": {"x": 1, "y": 1},
            "goal": {"x": 8, "y": 8},
            "obstacles": [[{"x": 3, "y": 3}, {"x": 5, "y": 3}, {"x": 4, "y": 6}]],
            "obstacle_speed": 1,
            "pickup_points": [{"x": 2, "y": 7}]
        }"#;
        let spec = ProblemSpec::from_json_str(json).unwrap();
        assert_eq!(spec.obstacles[0].vertices().len(), 3);
        assert_eq!(spec.pickup_points, vec![Point::new(2, 7)]);
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        let spec = ProblemSpec {
            width: 0,
            ..Default::default()
        };
        assert!(matches!(spec.validate(), Err(ConfigError::InvalidDimensions)));
    }

    #[test]
    fn test_rejects_empty_obstacle() {
        let spec = ProblemSpec {
            obstacles: vec![Polygon::new(Vec::new())],
            ..Default::default()
        };
        assert!(matches!(
            spec.validate(),
            Err(ConfigError::EmptyObstacle { index: 0 })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ProblemSpec::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("problem.json");
        let json = serde_json::to_string_pretty(&ProblemSpec::default()).unwrap();
        std::fs::write(&path, json).unwrap();

        let loaded = ProblemSpec::from_json_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.width, 20);
        assert_eq!(loaded.obstacles.len(), 1);
    }
}
