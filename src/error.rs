use thiserror::Error;

/// Errors surfaced by the simulation core and the run harness.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(
        "buffer-distance search did not converge after {iterations} iterations \
         (area {area:.6}, target area {target:.6})"
    )]
    RootFindFailure {
        area: f64,
        target: f64,
        iterations: usize,
    },

    #[error("initial area draw stayed non-positive after {attempts} resample attempts")]
    DegenerateInitialArea { attempts: usize },

    #[error("scenario error: {0}")]
    Scenario(String),

    #[error("failed to parse scenario: {0}")]
    ScenarioParse(#[from] serde_yaml::Error),

    #[error("record stream error: {0}")]
    Record(#[from] csv::Error),

    #[error("checkpoint serialization error: {0}")]
    Checkpoint(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
