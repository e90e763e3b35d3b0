use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::growth::GrowthParameters;
use crate::seed::AreaDistribution;

fn default_total_time() -> f64 {
    50.0
}

fn default_record_interval() -> u64 {
    100
}

fn default_checkpoint_interval() -> f64 {
    5.0
}

fn default_scale_factor() -> f64 {
    1.5
}

fn default_rate() -> f64 {
    0.25
}

fn default_dt() -> f64 {
    0.01
}

fn default_min_population() -> usize {
    100
}

fn default_max_area_fraction() -> f64 {
    0.25
}

/// One simulation run, loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    /// Side length of the square placement domain.
    pub domain_size: f64,
    /// Depressions seeded at time zero.
    pub initial_count: usize,
    #[serde(default)]
    pub growth: GrowthConfig,
    #[serde(default)]
    pub areas: AreaDistribution,
    /// Maximum simulated time; the step count is `total_time / dt`.
    #[serde(default = "default_total_time")]
    pub total_time: f64,
    #[serde(default)]
    pub merge_enabled: bool,
    #[serde(default)]
    pub stop: StopRules,
    /// Steps between CSV records; the initial state is always recorded.
    #[serde(default = "default_record_interval")]
    pub record_interval_steps: u64,
    /// Simulated time between geometry checkpoints; zero disables them.
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval_time: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GrowthConfig {
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
    #[serde(default = "default_rate")]
    pub rate: f64,
    #[serde(default = "default_dt")]
    pub dt: f64,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            scale_factor: default_scale_factor(),
            rate: default_rate(),
            dt: default_dt(),
        }
    }
}

/// Termination rules checked after every step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StopRules {
    /// Stop once the population falls below this count.
    #[serde(default = "default_min_population")]
    pub min_population: usize,
    /// Stop once the largest shape exceeds this fraction of the domain area.
    #[serde(default = "default_max_area_fraction")]
    pub max_area_fraction: f64,
}

impl Default for StopRules {
    fn default() -> Self {
        Self {
            min_population: default_min_population(),
            max_area_fraction: default_max_area_fraction(),
        }
    }
}

impl Scenario {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| {
            SimError::Scenario(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, SimError> {
        let scenario: Scenario = serde_yaml::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Boundary validation; no partial recovery is attempted downstream.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.name.trim().is_empty() {
            return Err(SimError::Scenario("scenario must have a name".into()));
        }
        if !self.domain_size.is_finite() || self.domain_size <= 0.0 {
            return Err(SimError::Scenario(format!(
                "domain_size must be positive, got {}",
                self.domain_size
            )));
        }
        if self.initial_count == 0 {
            return Err(SimError::Scenario(
                "initial_count must be at least 1".into(),
            ));
        }
        self.growth_parameters()?;
        if self.areas.log_sigma < 0.0 {
            return Err(SimError::Scenario(format!(
                "areas.log_sigma must be non-negative, got {}",
                self.areas.log_sigma
            )));
        }
        if !self.total_time.is_finite() || self.total_time <= 0.0 {
            return Err(SimError::Scenario(format!(
                "total_time must be positive, got {}",
                self.total_time
            )));
        }
        if self.record_interval_steps == 0 {
            return Err(SimError::Scenario(
                "record_interval_steps must be at least 1".into(),
            ));
        }
        let fraction = self.stop.max_area_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(SimError::Scenario(format!(
                "stop.max_area_fraction must be in (0, 1], got {fraction}"
            )));
        }
        if self.checkpoint_interval_time < 0.0 {
            return Err(SimError::Scenario(format!(
                "checkpoint_interval_time must not be negative, got {}",
                self.checkpoint_interval_time
            )));
        }
        Ok(())
    }

    pub fn growth_parameters(&self) -> Result<GrowthParameters, SimError> {
        GrowthParameters::new(self.growth.scale_factor, self.growth.rate, self.growth.dt)
    }

    /// Step count implied by `total_time` and `dt`.
    pub fn steps(&self) -> u64 {
        // Nudge before flooring so 0.03 / 0.01 counts as 3 steps, not 2.
        (self.total_time / self.growth.dt + 1e-9).floor() as u64
    }

    /// Checkpoint cadence in steps; zero when checkpoints are disabled.
    /// A positive interval shorter than `dt` still checkpoints every step.
    pub fn checkpoint_interval_steps(&self) -> u64 {
        if self.checkpoint_interval_time <= 0.0 {
            0
        } else {
            ((self.checkpoint_interval_time / self.growth.dt).round() as u64).max(1)
        }
    }
}
