//! Realizing a pickup order as a chain of A* legs.

use std::iter;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::compute::{
    PlanError, PlanningSession, Point, Polygon, SearchOutcome, SearchSpace, Strategy, search,
};
use crate::schema::{LegRetryConfig, Solution};

/// Solve start → `order` → goal leg by leg over the session's snapshot.
///
/// The final goal is blocked as a one-vertex obstacle on every leg that does
/// not end there, so no leg passes through it early. Leg paths are joined
/// without repeating the shared boundary position and their costs summed.
pub fn stitch_route(
    session: &PlanningSession<'_>,
    order: &[Point],
    retry: &LegRetryConfig,
) -> Result<Solution, PlanError> {
    let env = session.environment();
    let (start, goal) = (env.start(), env.goal());
    let started = Instant::now();

    let waypoints: Vec<Point> = iter::once(start)
        .chain(order.iter().copied())
        .chain(iter::once(goal))
        .collect();
    let legs = waypoints.len() - 1;

    let blocker = Polygon::point(goal);
    let mut space = session.space(start, goal);
    space.add_obstacle(blocker.clone());
    let mut goal_blocked = true;

    let mut path = vec![start];
    let mut actions = vec![None];
    let mut cost = 0.0;
    let mut expanded = 0;

    for (index, leg) in waypoints.windows(2).enumerate() {
        let (from, to) = (leg[0], leg[1]);
        if goal_blocked && (index + 1 == legs || to == goal) {
            space.remove_last_obstacle(&blocker);
            goal_blocked = false;
        }
        space.set_endpoints(from, to);

        let outcome = solve_leg(&space, retry)?;
        debug!(
            "leg {}/{} {} -> {}: cost {:.3}",
            index + 1,
            legs,
            from,
            to,
            outcome.cost
        );

        // first position repeats the previous leg's last one
        path.extend(outcome.path.into_iter().skip(1));
        actions.extend(outcome.actions.into_iter().skip(1));
        cost += outcome.cost;
        expanded += outcome.expanded;
    }

    Ok(Solution {
        path,
        actions,
        cost,
        elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
        expanded,
    })
}

/// A* with a bounded number of attempts and a wall-clock deadline.
///
/// Inside a planning session the snapshot is frozen, so a failed attempt
/// repeats identically; the bound only matters for a space whose obstacles
/// can change between attempts. Failure is reported once the attempts or
/// the deadline run out.
fn solve_leg(space: &SearchSpace<'_>, retry: &LegRetryConfig) -> Result<SearchOutcome, PlanError> {
    let deadline = Instant::now() + Duration::from_millis(retry.timeout_ms);
    let mut attempts = 0;

    while attempts < retry.max_attempts {
        attempts += 1;
        if let Some(outcome) = search(space, Strategy::AStar) {
            return Ok(outcome);
        }
        warn!(
            "leg {} -> {} unsolvable (attempt {}/{})",
            space.start(),
            space.goal(),
            attempts,
            retry.max_attempts
        );
        if Instant::now() >= deadline {
            break;
        }
    }

    Err(PlanError::LegUnsolvable {
        from: space.start(),
        to: space.goal(),
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{Action, Environment};

    fn env_with(obstacles: Vec<Polygon>, start: Point, goal: Point, pickups: Vec<Point>) -> Environment {
        Environment::new(start, goal, 20, 20, obstacles, 0, pickups)
    }

    fn step_cost(path: &[Point]) -> f64 {
        path.windows(2)
            .map(|w| if w[0].x != w[1].x && w[0].y != w[1].y { std::f64::consts::SQRT_2 } else { 1.0 })
            .sum()
    }

    #[test]
    fn test_join_has_no_duplicates_and_costs_add_up() {
        let pickups = vec![Point::new(5, 8), Point::new(12, 3)];
        let env = env_with(
            vec![Polygon::rectangle(Point::new(8, 2), Point::new(9, 12))],
            Point::new(2, 2),
            Point::new(16, 16),
            pickups.clone(),
        );
        let session = env.begin_planning();
        let solution = stitch_route(&session, &pickups, &LegRetryConfig::default()).unwrap();
        session.end();

        assert_eq!(solution.start(), Some(Point::new(2, 2)));
        assert_eq!(solution.end(), Some(Point::new(16, 16)));
        assert_eq!(solution.path.len(), solution.actions.len());
        assert!(solution.path.windows(2).all(|w| w[0] != w[1]));
        for pickup in &pickups {
            assert!(solution.path.contains(pickup));
        }
        assert!((solution.cost - step_cost(&solution.path)).abs() < 1e-9);
        assert!(solution.actions[1..].iter().all(Option::is_some));
    }

    #[test]
    fn test_goal_not_visited_before_last_leg() {
        // the straight way to the pickup runs through the goal
        let pickups = vec![Point::new(9, 5)];
        let env = env_with(Vec::new(), Point::new(1, 5), Point::new(5, 5), pickups.clone());
        let session = env.begin_planning();
        let solution = stitch_route(&session, &pickups, &LegRetryConfig::default()).unwrap();

        let goal = Point::new(5, 5);
        let first_visit = solution.path.iter().position(|&p| p == goal);
        assert_eq!(first_visit, Some(solution.path.len() - 1));
        assert!(solution.path.contains(&Point::new(9, 5)));
        assert_eq!(solution.actions.last().copied().flatten(), Some(Action::Left));
    }

    #[test]
    fn test_enclosed_pickup_fails_after_bounded_attempts() {
        let pickup = Point::new(10, 10);
        let env = env_with(
            vec![Polygon::rectangle(Point::new(8, 8), Point::new(12, 12))],
            Point::new(2, 2),
            Point::new(17, 17),
            vec![pickup],
        );
        let retry = LegRetryConfig {
            max_attempts: 3,
            timeout_ms: 1000,
        };
        let session = env.begin_planning();
        match stitch_route(&session, &[pickup], &retry) {
            Err(PlanError::LegUnsolvable { from, to, attempts }) => {
                assert_eq!(from, Point::new(2, 2));
                assert_eq!(to, pickup);
                assert!((1..=3).contains(&attempts));
            }
            other => panic!("expected LegUnsolvable, got {other:?}"),
        }
    }

    #[test]
    fn test_leg_attempts_stop_at_bound() {
        let env = env_with(
            vec![Polygon::rectangle(Point::new(8, 0), Point::new(9, 20))],
            Point::new(2, 2),
            Point::new(4, 4),
            Vec::new(),
        );
        let session = env.begin_planning();
        let space = session.space(Point::new(2, 2), Point::new(15, 15));
        let retry = LegRetryConfig {
            max_attempts: 4,
            timeout_ms: 60_000,
        };
        match solve_leg(&space, &retry) {
            Err(PlanError::LegUnsolvable { attempts, .. }) => assert_eq!(attempts, 4),
            other => panic!("expected LegUnsolvable, got {other:?}"),
        }

        let expired = LegRetryConfig {
            max_attempts: 4,
            timeout_ms: 0,
        };
        match solve_leg(&space, &expired) {
            Err(PlanError::LegUnsolvable { attempts, .. }) => assert_eq!(attempts, 1),
            other => panic!("expected LegUnsolvable, got {other:?}"),
        }
    }
}
