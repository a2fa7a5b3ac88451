//! Benchmarks for the graph search strategies and the genetic sequencer.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use obstacle_router::{
    compute::{Environment, Point, Polygon, SearchSolver, Solver, Strategy, evolution::GeneticSolver},
    schema::GeneticConfig,
};

fn walled_environment(size: i32, pickups: Vec<Point>) -> Environment {
    let third = size / 3;
    Environment::new(
        Point::new(2, 2),
        Point::new(size - 3, size - 3),
        size,
        size,
        vec![
            Polygon::rectangle(Point::new(third, 0), Point::new(third + 1, 2 * third)),
            Polygon::rectangle(Point::new(2 * third, third), Point::new(2 * third + 1, size)),
        ],
        0,
        pickups,
    )
}

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_to_point");

    for size in [32, 64, 128] {
        let env = walled_environment(size, Vec::new());

        for strategy in [Strategy::Dijkstra, Strategy::AStar, Strategy::GreedyBestFirst] {
            let solver = SearchSolver::new(strategy);
            group.bench_with_input(
                BenchmarkId::new(strategy.name(), format!("{}x{}", size, size)),
                &size,
                |b, _| {
                    b.iter(|| black_box(solver.solve(black_box(&env))));
                },
            );
        }
    }

    group.finish();
}

fn bench_genetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("genetic");
    group.sample_size(10);

    let pickups = vec![
        Point::new(5, 50),
        Point::new(30, 10),
        Point::new(55, 55),
        Point::new(12, 30),
        Point::new(50, 20),
        Point::new(35, 45),
    ];
    let env = walled_environment(64, pickups);

    for population_size in [100, 500] {
        let solver = GeneticSolver::new(GeneticConfig {
            max_generations: 50,
            parent_pool_size: population_size / 10,
            population_size,
            random_seed: Some(42),
            ..Default::default()
        });
        group.bench_with_input(
            BenchmarkId::from_parameter(population_size),
            &population_size,
            |b, _| {
                b.iter(|| black_box(solver.run(black_box(&env))));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_strategies, bench_genetic);
criterion_main!(benches);
