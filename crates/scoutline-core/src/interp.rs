// Piecewise-linear breakpoint tables with end clamping.
//
// Regression offsets, regression strength, and scouting base weights are all
// small sorted (x, y) tables; they share this one implementation.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A sorted table of `[x, y]` points. Lookups between points interpolate
/// linearly; lookups outside the table clamp to the nearest end value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PiecewiseLinear {
    points: Vec<[f64; 2]>,
}

impl PiecewiseLinear {
    pub fn new(points: Vec<[f64; 2]>) -> Self {
        PiecewiseLinear { points }
    }

    /// A table that returns `y` everywhere.
    pub fn constant(y: f64) -> Self {
        PiecewiseLinear {
            points: vec![[0.0, y]],
        }
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    /// Evaluate the table at `x`. An empty table evaluates to 0.0.
    pub fn eval(&self, x: f64) -> f64 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return 0.0,
        };
        if x.is_nan() || x <= first[0] {
            return first[1];
        }
        if x >= last[0] {
            return last[1];
        }

        // First point strictly greater than x; guaranteed in 1..len here.
        let idx = self.points.partition_point(|p| p[0] <= x);
        let [x0, y0] = self.points[idx - 1];
        let [x1, y1] = self.points[idx];
        if x1 - x0 <= f64::EPSILON {
            return y1;
        }
        let t = (x - x0) / (x1 - x0);
        y0 + t * (y1 - y0)
    }

    /// Check that the table is non-empty, finite, and strictly ascending in x.
    pub fn validate(&self, field: &str) -> Result<(), EngineError> {
        if self.points.is_empty() {
            return Err(EngineError::invalid(field, "breakpoint table is empty"));
        }
        if self.points.iter().flatten().any(|v| !v.is_finite()) {
            return Err(EngineError::invalid(field, "breakpoints must be finite"));
        }
        for w in self.points.windows(2) {
            if w[0][0] >= w[1][0] {
                return Err(EngineError::invalid(
                    field,
                    format!("breakpoints must be strictly ascending: {} >= {}", w[0][0], w[1][0]),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn table() -> PiecewiseLinear {
        PiecewiseLinear::new(vec![[-1.0, -0.5], [0.0, 0.0], [2.0, 1.0]])
    }

    #[test]
    fn interpolates_between_points() {
        let t = table();
        assert!(approx_eq(t.eval(-0.5), -0.25, 1e-12));
        assert!(approx_eq(t.eval(1.0), 0.5, 1e-12));
    }

    #[test]
    fn exact_breakpoints_hit_their_values() {
        let t = table();
        assert_eq!(t.eval(-1.0), -0.5);
        assert_eq!(t.eval(0.0), 0.0);
        assert_eq!(t.eval(2.0), 1.0);
    }

    #[test]
    fn clamps_outside_range() {
        let t = table();
        assert_eq!(t.eval(-10.0), -0.5);
        assert_eq!(t.eval(10.0), 1.0);
    }

    #[test]
    fn nan_clamps_to_first_point() {
        assert_eq!(table().eval(f64::NAN), -0.5);
    }

    #[test]
    fn empty_table_is_zero_and_invalid() {
        let t = PiecewiseLinear::new(vec![]);
        assert_eq!(t.eval(3.0), 0.0);
        assert!(t.validate("t").is_err());
    }

    #[test]
    fn unsorted_table_rejected() {
        let t = PiecewiseLinear::new(vec![[1.0, 0.0], [0.5, 1.0]]);
        assert!(t.validate("t").is_err());
        assert!(table().validate("t").is_ok());
    }

    #[test]
    fn constant_table() {
        let t = PiecewiseLinear::constant(0.3);
        assert_eq!(t.eval(-100.0), 0.3);
        assert_eq!(t.eval(100.0), 0.3);
    }
}
