use std::path::Path;

use crate::error::SimError;
use crate::geometry::Depression;
use crate::growth::{grow_population, GrowthParameters};
use crate::merge::merge_population;
use crate::recorder::Recorder;
use crate::rng::RngStreams;
use crate::scenario::Scenario;
use crate::seed::seed_population;
use crate::snapshot::SnapshotWriter;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// All requested steps ran.
    Completed,
    /// The population fell below the configured floor.
    PopulationFloor,
    /// The largest depression exceeded its share of the domain.
    MaxAreaFraction,
}

#[derive(Debug)]
pub struct RunSummary {
    pub scenario_name: String,
    pub steps_run: u64,
    pub termination: Termination,
    pub final_count: usize,
    /// Shapes dropped because a buffer collapsed them to empty.
    pub extinct_total: usize,
    pub max_area: f64,
}

/// Drives one simulation run: seed, then grow -> (merge) -> record/checkpoint
/// until the step budget or a stop rule ends it.
pub struct Engine {
    scenario: Scenario,
    params: GrowthParameters,
    rng: RngStreams,
    recorder: Recorder,
    snapshots: Option<SnapshotWriter>,
    population: Vec<Depression>,
}

impl Engine {
    /// Builds an engine from a validated scenario. With an output directory
    /// the run streams a CSV series and periodic geometry checkpoints there;
    /// without one it runs entirely in memory.
    pub fn new(scenario: Scenario, out_dir: Option<&Path>) -> Result<Self, SimError> {
        scenario.validate()?;
        let params = scenario.growth_parameters()?;

        let (recorder, snapshots) = match out_dir {
            Some(dir) => {
                let csv_path = dir.join(format!("{}.csv", scenario.name));
                std::fs::create_dir_all(dir)?;
                let recorder = Recorder::with_csv(scenario.initial_count, csv_path)?;
                let interval = scenario.checkpoint_interval_steps();
                let snapshots = if interval == 0 {
                    None
                } else {
                    Some(SnapshotWriter::new(dir.join(&scenario.name), interval)?)
                };
                (recorder, snapshots)
            }
            None => (Recorder::in_memory(scenario.initial_count), None),
        };

        Ok(Self {
            rng: RngStreams::new(scenario.seed),
            scenario,
            params,
            recorder,
            snapshots,
            population: Vec::new(),
        })
    }

    /// Runs the scenario, optionally overriding the step budget.
    pub fn run(&mut self, override_steps: Option<u64>) -> Result<RunSummary, SimError> {
        let steps = override_steps.unwrap_or_else(|| self.scenario.steps());
        let dt = self.params.dt();
        let domain_area = self.scenario.domain_size * self.scenario.domain_size;
        let area_limit = self.scenario.stop.max_area_fraction * domain_area;

        self.population = seed_population(
            self.scenario.initial_count,
            self.scenario.domain_size,
            self.scenario.areas,
            self.rng.stream("seeding"),
        )?;
        self.recorder.record(0, 0.0, &self.population)?;
        if let Some(snapshots) = &self.snapshots {
            snapshots.maybe_write(0, 0.0, &self.population)?;
        }

        let mut extinct_total = 0;
        let mut steps_run = 0;
        let mut termination = Termination::Completed;

        for step in 1..=steps {
            if self.population.len() < self.scenario.stop.min_population {
                termination = Termination::PopulationFloor;
                break;
            }

            let grown = grow_population(&self.population, &self.params)?;
            extinct_total += grown.extinct;
            self.population = if self.scenario.merge_enabled {
                merge_population(&grown.shapes)
            } else {
                grown.shapes
            };
            steps_run = step;
            let time = step as f64 * dt;

            if step % self.scenario.record_interval_steps == 0 {
                self.recorder.record(step, time, &self.population)?;
                tracing::info!(
                    step,
                    count = self.population.len(),
                    max_area = self.max_area(),
                    "recorded"
                );
            } else {
                tracing::debug!(step, count = self.population.len(), "stepped");
            }
            if let Some(snapshots) = &self.snapshots {
                snapshots.maybe_write(step, time, &self.population)?;
            }

            if self.max_area() > area_limit {
                termination = Termination::MaxAreaFraction;
                break;
            }
            if self.population.len() < self.scenario.stop.min_population {
                termination = Termination::PopulationFloor;
                break;
            }
        }

        // Final state always lands in the series and, when enabled, on disk.
        let final_time = steps_run as f64 * dt;
        if steps_run % self.scenario.record_interval_steps != 0 {
            self.recorder.record(steps_run, final_time, &self.population)?;
        }
        if let Some(snapshots) = &self.snapshots {
            if !snapshots.should_snapshot(steps_run) {
                snapshots.write(steps_run, final_time, &self.population)?;
            }
        }

        tracing::info!(
            scenario = %self.scenario.name,
            steps_run,
            ?termination,
            count = self.population.len(),
            "run finished"
        );

        Ok(RunSummary {
            scenario_name: self.scenario.name.clone(),
            steps_run,
            termination,
            final_count: self.population.len(),
            extinct_total,
            max_area: self.max_area(),
        })
    }

    pub fn population(&self) -> &[Depression] {
        &self.population
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    fn max_area(&self) -> f64 {
        self.population
            .iter()
            .map(Depression::area)
            .fold(0.0, f64::max)
    }
}
