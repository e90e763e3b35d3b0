//! Area growth: one RK4 step of `dA/dt = c * A^k` per shape, realized as a
//! boundary offset found by a secant search on the buffer distance.

use rayon::prelude::*;

use crate::error::SimError;
use crate::geometry::Depression;

/// Iteration cap for the buffer-distance search.
pub const MAX_ROOT_ITERATIONS: usize = 64;

/// Relative tolerance on the achieved area, scaled by the target.
const AREA_TOLERANCE: f64 = 1e-9;

/// Parameters of the growth law `dA/dt = c * A^k`.
///
/// Numerical stability of the explicit RK4 step requires `c * dt` to stay
/// small relative to typical areas; that is a caller tuning concern and is
/// deliberately not validated here.
#[derive(Debug, Clone, Copy)]
pub struct GrowthParameters {
    scale_factor: f64,
    rate: f64,
    dt: f64,
}

impl GrowthParameters {
    /// Validates the boundary contract: `k` finite, `c > 0`, `dt > 0`.
    pub fn new(scale_factor: f64, rate: f64, dt: f64) -> Result<Self, SimError> {
        if !scale_factor.is_finite() {
            return Err(SimError::InvalidParameter(format!(
                "scale factor k must be finite, got {scale_factor}"
            )));
        }
        if !rate.is_finite() || rate <= 0.0 {
            return Err(SimError::InvalidParameter(format!(
                "rate constant c must be positive and finite, got {rate}"
            )));
        }
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimError::InvalidParameter(format!(
                "time step dt must be positive and finite, got {dt}"
            )));
        }
        Ok(Self {
            scale_factor,
            rate,
            dt,
        })
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }
}

/// Target area after one RK4 step of `dA/dt = c * A^k` from `a0`.
pub fn rk4_area_target(a0: f64, params: &GrowthParameters) -> f64 {
    let k = params.scale_factor;
    let c = params.rate;
    let dt = params.dt;

    let k1 = dt * c * a0.powf(k);
    let k2 = dt * c * (a0 + k1 / 2.0).powf(k);
    let k3 = dt * c * (a0 + k2 / 2.0).powf(k);
    let k4 = dt * c * (a0 + k3).powf(k);

    a0 + (k1 + 2.0 * k2 + 2.0 * k3 + k4) / 6.0
}

/// Computes the buffer distance that takes `shape` to its RK4 target area.
///
/// The residual `f(x) = a_target - area(buffer(shape, x))` decreases
/// monotonically in `x` for well-behaved shapes, so a derivative-free secant
/// iteration seeded at zero and at the first-order guess `da / perimeter`
/// converges in a handful of steps. No bracketing is attempted; a shape for
/// which the iteration stalls is reported as a `RootFindFailure`.
pub fn grow_one(shape: &Depression, params: &GrowthParameters) -> Result<f64, SimError> {
    let a0 = shape.area();
    let target = rk4_area_target(a0, params);
    solve_buffer_distance(shape, target)
}

/// Finds `x` with `area(buffer(shape, x))` equal to `target` within tolerance.
pub fn solve_buffer_distance(shape: &Depression, target: f64) -> Result<f64, SimError> {
    let a0 = shape.area();
    let tolerance = AREA_TOLERANCE * target.abs().max(1.0);

    let mut x0 = 0.0;
    let mut f0 = target - a0;
    if f0.abs() <= tolerance {
        return Ok(0.0);
    }

    // First-order seed: a uniform offset d changes the area by ~ perimeter * d.
    let perimeter = shape.perimeter();
    let mut x1 = if perimeter > f64::EPSILON {
        f0 / perimeter
    } else {
        f0.signum() * f64::EPSILON.sqrt()
    };

    for iteration in 1..=MAX_ROOT_ITERATIONS {
        let f1 = target - buffered_area(shape, x1);
        if f1.abs() <= tolerance {
            return Ok(x1);
        }
        let denominator = f1 - f0;
        if denominator.abs() < f64::MIN_POSITIVE || !x1.is_finite() {
            return Err(SimError::RootFindFailure {
                area: a0,
                target,
                iterations: iteration,
            });
        }
        let x2 = x1 - f1 * (x1 - x0) / denominator;
        x0 = x1;
        f0 = f1;
        x1 = x2;
    }

    Err(SimError::RootFindFailure {
        area: a0,
        target,
        iterations: MAX_ROOT_ITERATIONS,
    })
}

fn buffered_area(shape: &Depression, distance: f64) -> f64 {
    shape
        .buffer(distance)
        .map(|buffered| buffered.area())
        .unwrap_or(0.0)
}

/// Result of growing a whole population for one step.
#[derive(Debug)]
pub struct GrownPopulation {
    /// Grown shapes, input order preserved.
    pub shapes: Vec<Depression>,
    /// Shapes whose buffered result came back empty and were dropped.
    /// Always zero under validated parameters, since growth never shrinks.
    pub extinct: usize,
}

/// Grows every shape independently, in parallel across shapes.
///
/// Error policy: the first shape that fails to converge aborts the whole
/// step and the failure is propagated; no shape is silently skipped.
pub fn grow_population(
    shapes: &[Depression],
    params: &GrowthParameters,
) -> Result<GrownPopulation, SimError> {
    let distances: Vec<f64> = shapes
        .par_iter()
        .map(|shape| grow_one(shape, params))
        .collect::<Result<_, _>>()?;

    let mut grown = Vec::with_capacity(shapes.len());
    let mut extinct = 0;
    for (shape, distance) in shapes.iter().zip(&distances) {
        match shape.buffer(*distance) {
            Some(next) => grown.push(next),
            None => extinct += 1,
        }
    }
    Ok(GrownPopulation {
        shapes: grown,
        extinct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;

    fn disk(area: f64) -> Depression {
        Depression::disk_with_area(Point::new(0.0, 0.0), area)
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(GrowthParameters::new(f64::NAN, 0.25, 0.01).is_err());
        assert!(GrowthParameters::new(1.5, 0.0, 0.01).is_err());
        assert!(GrowthParameters::new(1.5, -0.25, 0.01).is_err());
        assert!(GrowthParameters::new(1.5, 0.25, 0.0).is_err());
        assert!(GrowthParameters::new(1.5, 0.25, f64::INFINITY).is_err());
    }

    #[test]
    fn rk4_with_zero_exponent_is_linear() {
        let params = GrowthParameters::new(0.0, 0.25, 0.01).unwrap();
        let a0 = 3.7;
        let target = rk4_area_target(a0, &params);
        assert!((target - (a0 + 0.25 * 0.01)).abs() < 1e-12);
    }

    #[test]
    fn rk4_exceeds_euler_for_superlinear_growth() {
        let params = GrowthParameters::new(1.5, 0.25, 0.01).unwrap();
        let a0: f64 = 2.0;
        let euler = a0 + 0.25 * 0.01 * a0.powf(1.5);
        let target = rk4_area_target(a0, &params);
        assert!(target > a0);
        // dA/dt increases with A, so the RK4 average slope beats Euler's.
        assert!(target > euler);
    }

    #[test]
    fn grown_area_matches_rk4_target() {
        let params = GrowthParameters::new(1.5, 0.25, 0.01).unwrap();
        let shape = disk(3.0);
        let target = rk4_area_target(shape.area(), &params);
        let distance = grow_one(&shape, &params).unwrap();
        let achieved = shape.buffer(distance).unwrap().area();
        assert!(
            (achieved - target).abs() < 1e-6 * target,
            "achieved {achieved}, target {target}"
        );
    }

    #[test]
    fn buffer_distance_increases_with_rate() {
        let shape = disk(2.0);
        let mut previous = 0.0;
        for rate in [0.1, 0.2, 0.4, 0.8] {
            let params = GrowthParameters::new(1.2, rate, 0.01).unwrap();
            let distance = grow_one(&shape, &params).unwrap();
            assert!(
                distance > previous,
                "distance {distance} at c={rate} should exceed {previous}"
            );
            previous = distance;
        }
    }

    #[test]
    fn solve_handles_already_satisfied_target() {
        let shape = disk(2.0);
        let distance = solve_buffer_distance(&shape, shape.area()).unwrap();
        assert_eq!(distance, 0.0);
    }

    #[test]
    fn solve_reaches_shrink_targets_too() {
        let shape = disk(4.0);
        let target = shape.area() * 0.5;
        let distance = solve_buffer_distance(&shape, target).unwrap();
        assert!(distance < 0.0);
        let achieved = shape.buffer(distance).unwrap().area();
        assert!((achieved - target).abs() < 1e-6 * target);
    }

    #[test]
    fn zero_area_shape_grows_under_constant_rate() {
        use geo::{LineString, Polygon};
        let sliver = Depression::from_polygon(Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]),
            vec![],
        ));
        assert!(sliver.area() <= 1e-12);

        // k = 0 gives dA/dt = c, so a point-like shape still has a
        // well-defined positive target after one step.
        let params = GrowthParameters::new(0.0, 0.25, 0.01).unwrap();
        let target = rk4_area_target(sliver.area(), &params);
        assert!((target - 0.0025).abs() < 1e-15);

        let distance = grow_one(&sliver, &params).unwrap();
        assert!(distance > 0.0);
        let achieved = sliver.buffer(distance).unwrap().area();
        assert!(
            (achieved - target).abs() < 1e-6 * target,
            "achieved {achieved}, target {target}"
        );
    }

    #[test]
    fn unreachable_target_reports_root_find_failure() {
        let shape = disk(4.0);
        // No buffer distance yields a negative area, so the residual can
        // never cross zero and the secant stalls on a flat segment.
        let err = solve_buffer_distance(&shape, -1.0).unwrap_err();
        match err {
            SimError::RootFindFailure {
                area,
                target,
                iterations,
            } => {
                assert!((area - shape.area()).abs() < 1e-9);
                assert_eq!(target, -1.0);
                assert!(iterations >= 1);
                assert!(iterations <= MAX_ROOT_ITERATIONS);
            }
            other => panic!("expected RootFindFailure, got {other:?}"),
        }
    }

    #[test]
    fn population_growth_preserves_count_and_order() {
        let params = GrowthParameters::new(1.5, 0.25, 0.01).unwrap();
        let shapes: Vec<Depression> = (1..=5)
            .map(|i| Depression::disk_with_area(Point::new(10.0 * i as f64, 0.0), i as f64))
            .collect();
        let before: Vec<f64> = shapes.iter().map(Depression::area).collect();

        let grown = grow_population(&shapes, &params).unwrap();
        assert_eq!(grown.shapes.len(), shapes.len());
        assert_eq!(grown.extinct, 0);
        for (next, previous) in grown.shapes.iter().zip(&before) {
            assert!(next.area() > *previous);
        }
        // Order preserved: areas stay sorted the way the inputs were.
        let after: Vec<f64> = grown.shapes.iter().map(Depression::area).collect();
        for pair in after.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
