//! Growth and coalescence of two-dimensional depressions (dolines) on a
//! bounded planar surface: per-shape RK4 area growth realized as polygon
//! offsets, plus optional geometric merging of overlapping shapes.

pub mod engine;
pub mod error;
pub mod geometry;
pub mod growth;
pub mod merge;
pub mod recorder;
pub mod rng;
pub mod scenario;
pub mod seed;
pub mod snapshot;

pub use engine::{Engine, RunSummary, Termination};
pub use error::SimError;
pub use geometry::Depression;
pub use growth::{grow_one, grow_population, GrowthParameters, GrownPopulation};
pub use merge::merge_population;
pub use scenario::Scenario;
pub use seed::{seed_population, AreaDistribution};
