//! Obstacle Router CLI - Solve routing problems from JSON descriptions.

use std::fs;
use std::path::PathBuf;

use obstacle_router::{
    compute::{Environment, SearchSolver, Strategy, evolution::GeneticSolver},
    schema::{GeneticConfig, ProblemSpec},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!(
            "Usage: {} <problem.json> [dijkstra|astar|gbfs|genetic] [genetic.json]",
            args[0]
        );
        eprintln!();
        eprintln!("Plan a collision-free route from a JSON problem description.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  problem.json  Grid, endpoints, obstacles and optional pickup points");
        eprintln!("  solver        Search strategy (default: astar, or genetic with pickups)");
        eprintln!("  genetic.json  Genetic sequencer configuration (optional)");
        eprintln!();
        eprintln!("Example problem is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_problem();
        return;
    }

    let problem_path = PathBuf::from(&args[1]);
    let problem_str = fs::read_to_string(&problem_path).unwrap_or_else(|e| {
        eprintln!("Error reading problem file: {}", e);
        std::process::exit(1);
    });
    let spec = ProblemSpec::from_json_str(&problem_str).unwrap_or_else(|e| {
        eprintln!("Error loading problem: {}", e);
        std::process::exit(1);
    });

    let solver_name = args.get(2).map(String::as_str).unwrap_or(if spec.pickup_points.is_empty() {
        "astar"
    } else {
        "genetic"
    });

    let genetic_config: GeneticConfig = match args.get(3) {
        Some(path) => {
            let config_str = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading genetic config: {}", e);
                std::process::exit(1);
            });
            serde_json::from_str(&config_str).unwrap_or_else(|e| {
                eprintln!("Error parsing genetic config: {}", e);
                std::process::exit(1);
            })
        }
        None => GeneticConfig::default(),
    };

    println!("Obstacle Router");
    println!("===============");
    println!("Grid: {}x{}", spec.width, spec.height);
    println!("Start: {}  Goal: {}", spec.start, spec.goal);
    println!("Obstacles: {} (speed {})", spec.obstacles.len(), spec.obstacle_speed);
    println!("Pickups: {}", spec.pickup_points.len());
    println!("Solver: {}", solver_name);
    println!();

    let mut env = spec.into_environment().unwrap_or_else(|e| {
        eprintln!("Error building environment: {}", e);
        std::process::exit(1);
    });
    env.start_motion();

    if solver_name.eq_ignore_ascii_case("genetic") {
        run_genetic(&env, genetic_config);
    } else {
        let strategy: Strategy = solver_name.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        run_search(&env, strategy);
    }

    env.stop_motion();
}

fn run_search(env: &Environment, strategy: Strategy) {
    match env.solved_by(&SearchSolver::new(strategy)) {
        Ok(solution) => {
            println!("{}", solution);
            println!();
            println!(
                "Expanded: {}  Time: {:.2} ms",
                solution.expanded, solution.elapsed_ms
            );
        }
        Err(e) => {
            eprintln!("Planning failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_genetic(env: &Environment, config: GeneticConfig) {
    match GeneticSolver::new(config).run(env) {
        Ok(result) => {
            println!("{}", result.solution);
            println!();
            println!("Order: {:?}", result.order);
            println!(
                "Generations: {} ({:?})  Best fitness: {:.6}",
                result.stats.generations, result.stats.stop_reason, result.stats.best_fitness
            );
            println!(
                "Evolution: {:.2} ms  Total: {:.2} ms",
                result.stats.evolution_ms, result.solution.elapsed_ms
            );
        }
        Err(e) => {
            eprintln!("Planning failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_example_problem() {
    let spec = ProblemSpec::default();
    let config = GeneticConfig::default();

    match serde_json::to_string_pretty(&spec) {
        Ok(json) => {
            println!("Example problem (problem.json):");
            println!("{}", json);
        }
        Err(e) => eprintln!("Error serializing problem: {}", e),
    }
    println!();
    match serde_json::to_string_pretty(&config) {
        Ok(json) => {
            println!("Example genetic configuration (genetic.json):");
            println!("{}", json);
        }
        Err(e) => eprintln!("Error serializing configuration: {}", e),
    }
}
