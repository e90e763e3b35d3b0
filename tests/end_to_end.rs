//! Whole-population scenarios: seeding, one-step growth, merging, and the
//! engine's file outputs.

use geo::Point;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use dolina::snapshot::SnapshotWriter;
use dolina::{
    grow_population, merge_population, seed_population, AreaDistribution, Depression, Engine,
    GrowthParameters, Scenario, Termination,
};

#[test]
fn five_hundred_shapes_all_grow_in_one_step() {
    let mut rng = ChaCha8Rng::seed_from_u64(123);
    let shapes = seed_population(500, 1000.0, AreaDistribution::default(), &mut rng).unwrap();
    assert_eq!(shapes.len(), 500);

    let params = GrowthParameters::new(1.5, 0.25, 0.01).unwrap();
    let grown = grow_population(&shapes, &params).unwrap();

    assert_eq!(grown.shapes.len(), 500);
    assert_eq!(grown.extinct, 0);
    for (before, after) in shapes.iter().zip(&grown.shapes) {
        assert!(
            after.area() > before.area(),
            "area {} did not grow past {}",
            after.area(),
            before.area()
        );
    }
}

#[test]
fn merging_two_overlapping_seeds_drops_count_by_one() {
    // A disjoint grid of seeds plus one deliberately overlapping pair.
    let mut shapes: Vec<Depression> = (0..20)
        .map(|i| {
            let x = 50.0 + 40.0 * (i % 5) as f64;
            let y = 50.0 + 40.0 * (i / 5) as f64;
            Depression::disk(Point::new(x, y), 2.0)
        })
        .collect();
    shapes.push(Depression::disk(Point::new(500.0, 500.0), 3.0));
    shapes.push(Depression::disk(Point::new(502.0, 500.0), 3.0));
    let input_count = shapes.len();

    let params = GrowthParameters::new(1.5, 0.25, 0.01).unwrap();
    let grown = grow_population(&shapes, &params).unwrap();
    let merged = merge_population(&grown.shapes);

    assert_eq!(merged.len(), input_count - 1);
}

#[test]
fn engine_writes_series_and_checkpoints() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = Scenario::from_yaml_str(
        "\
name: files
seed: 9
domain_size: 300.0
initial_count: 6
total_time: 0.03
record_interval_steps: 1
checkpoint_interval_time: 0.01
stop:
  min_population: 1
",
    )
    .unwrap();

    let mut engine = Engine::new(scenario, Some(dir.path())).unwrap();
    let summary = engine.run(None).unwrap();
    assert_eq!(summary.termination, Termination::Completed);
    assert_eq!(summary.steps_run, 3);
    assert_eq!(summary.final_count, 6);

    // Header plus one row per shape for steps 0..=3.
    let csv = std::fs::read_to_string(dir.path().join("files.csv")).unwrap();
    assert_eq!(csv.lines().count(), 1 + 6 * 4);

    // Checkpoints at every step, reloadable with geometry intact.
    let last = dir.path().join("files").join("step_00000003.json");
    let checkpoint = SnapshotWriter::load(&last).unwrap();
    assert_eq!(checkpoint.meta.step, 3);
    assert_eq!(checkpoint.meta.count, 6);
    let restored_total: f64 = checkpoint.shapes.iter().map(|s| s.area()).sum();
    let live_total: f64 = engine.population().iter().map(|s| s.area()).sum();
    assert!((restored_total - live_total).abs() < 1e-9 * live_total);
}

#[test]
fn merge_enabled_engine_never_increases_count() {
    let scenario = Scenario::from_yaml_str(
        "\
name: merging
seed: 21
domain_size: 40.0
initial_count: 30
total_time: 0.2
merge_enabled: true
stop:
  min_population: 1
",
    )
    .unwrap();

    let mut engine = Engine::new(scenario, None).unwrap();
    let summary = engine.run(None).unwrap();
    assert!(summary.final_count <= 30);
    // Count at each recorded step never grows.
    let counts: Vec<usize> = engine.recorder().rows().iter().map(|r| r.count).collect();
    for pair in counts.windows(2) {
        assert!(pair[1] <= pair[0]);
    }
}
