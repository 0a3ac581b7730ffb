//! # Partial-Load Efficiency
//!
//! Fuel burn of a controllable plant is modelled as an affine function of its
//! online capacity `C` and its output `P`:
//!
//! ```text
//! fuel = a * C + b * P
//! a = (eff_max - eff_min) * p / ((1 - p) * eff_min * eff_max)
//! b = (eff_min - p * eff_max) / ((1 - p) * eff_min * eff_max)
//! ```
//!
//! where `p` is the minimum partial-load fraction. The two coefficients solve
//! the 2x2 system that pins realized efficiency `P / fuel` to `eff_min` at
//! minimum load (`P = p * C`) and to `eff_max` at full load (`P = C`). Between
//! the anchors fuel is interpolated linearly, so efficiency rises with load even
//! though the relation is linear in `C` and `P` separately.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Linearized fuel curve of a plant with partial-load losses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartialLoadCurve {
    efficiency_min: f64,
    efficiency_max: f64,
    partial_load_min: f64,
    online_coefficient: f64,
    output_coefficient: f64,
}

impl PartialLoadCurve {
    pub fn new(
        efficiency_min: f64,
        efficiency_max: f64,
        partial_load_min: f64,
    ) -> Result<Self, ConfigurationError> {
        for (name, value) in [
            ("efficiency_min", efficiency_min),
            ("efficiency_max", efficiency_max),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigurationError::EfficiencyOutOfRange { name, value });
            }
        }
        if efficiency_min > efficiency_max {
            return Err(ConfigurationError::EfficiencyOrder {
                min: efficiency_min,
                max: efficiency_max,
            });
        }
        if !(0.0..1.0).contains(&partial_load_min) {
            return Err(ConfigurationError::PartialLoadOutOfRange(partial_load_min));
        }

        let denominator = (1.0 - partial_load_min) * efficiency_min * efficiency_max;
        let online_coefficient =
            (efficiency_max - efficiency_min) * partial_load_min / denominator;
        let output_coefficient =
            (efficiency_min - partial_load_min * efficiency_max) / denominator;

        if output_coefficient < 0.0 {
            tracing::warn!(
                efficiency_min,
                efficiency_max,
                partial_load_min,
                output_coefficient,
                "marginal fuel burn is negative: raising output above minimum load lowers fuel input"
            );
        }

        Ok(Self {
            efficiency_min,
            efficiency_max,
            partial_load_min,
            online_coefficient,
            output_coefficient,
        })
    }

    /// Coefficient `a` applied to online capacity
    pub fn online_coefficient(&self) -> f64 {
        self.online_coefficient
    }

    /// Coefficient `b` applied to output
    pub fn output_coefficient(&self) -> f64 {
        self.output_coefficient
    }

    pub fn efficiency_min(&self) -> f64 {
        self.efficiency_min
    }

    pub fn efficiency_max(&self) -> f64 {
        self.efficiency_max
    }

    pub fn partial_load_min(&self) -> f64 {
        self.partial_load_min
    }

    /// Fuel input rate for a given online capacity and output
    pub fn fuel_input(&self, online_capacity: f64, output: f64) -> f64 {
        self.online_coefficient * online_capacity + self.output_coefficient * output
    }

    /// Realized efficiency `output / fuel`, `None` when no fuel is burnt
    pub fn realized_efficiency(&self, online_capacity: f64, output: f64) -> Option<f64> {
        let fuel = self.fuel_input(online_capacity, output);
        (fuel > f64::EPSILON).then(|| output / fuel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    const TOL: f64 = 1e-9;

    #[rstest]
    #[case(0.3, 0.5, 0.4)]
    #[case(0.25, 0.45, 0.2)]
    #[case(0.35, 0.6, 0.5)]
    #[case(0.9, 0.9, 0.3)]
    fn test_anchor_points_are_reproduced(
        #[case] eff_min: f64,
        #[case] eff_max: f64,
        #[case] p: f64,
    ) {
        let curve = PartialLoadCurve::new(eff_min, eff_max, p).unwrap();
        let capacity = 10.0;

        let at_min = curve.realized_efficiency(capacity, p * capacity).unwrap();
        let at_full = curve.realized_efficiency(capacity, capacity).unwrap();

        assert!((at_min - eff_min).abs() < TOL, "min-load efficiency {at_min}");
        assert!((at_full - eff_max).abs() < TOL, "full-load efficiency {at_full}");
        assert!((curve.fuel_input(capacity, capacity) - capacity / eff_max).abs() < TOL);
    }

    #[test]
    fn test_equal_efficiencies_degenerate_to_constant() {
        let curve = PartialLoadCurve::new(0.5, 0.5, 0.4).unwrap();

        assert!(curve.online_coefficient().abs() < TOL);
        assert!((curve.output_coefficient() - 2.0).abs() < TOL);
        assert!((curve.fuel_input(7.0, 3.0) - 6.0).abs() < TOL);
    }

    #[test]
    fn test_zero_partial_load_is_constant_at_max_efficiency() {
        let curve = PartialLoadCurve::new(0.3, 0.6, 0.0).unwrap();

        assert!(curve.online_coefficient().abs() < TOL);
        assert!((curve.output_coefficient() - 1.0 / 0.6).abs() < TOL);
    }

    #[rstest]
    #[case(0.6, 0.5, 0.3)]
    #[case(0.0, 0.5, 0.3)]
    #[case(0.3, 1.2, 0.3)]
    #[case(0.3, 0.5, 1.0)]
    #[case(0.3, 0.5, -0.1)]
    fn test_rejects_invalid_parameters(
        #[case] eff_min: f64,
        #[case] eff_max: f64,
        #[case] p: f64,
    ) {
        assert!(PartialLoadCurve::new(eff_min, eff_max, p).is_err());
    }

    #[test]
    fn test_inverted_efficiencies_report_order_error() {
        assert_eq!(
            PartialLoadCurve::new(0.6, 0.5, 0.3),
            Err(ConfigurationError::EfficiencyOrder { min: 0.6, max: 0.5 })
        );
    }

    #[test]
    fn test_no_fuel_means_no_efficiency() {
        let curve = PartialLoadCurve::new(0.4, 0.5, 0.3).unwrap();
        assert_eq!(curve.realized_efficiency(0.0, 0.0), None);
    }

    proptest! {
        #[test]
        fn prop_efficiency_increases_with_load(
            eff_min in 0.1f64..0.9,
            spread in 0.0f64..0.1,
            p in 0.0f64..0.9,
            lo in 0.01f64..1.0,
            hi in 0.01f64..1.0,
        ) {
            let eff_max = eff_min + spread;
            let curve = PartialLoadCurve::new(eff_min, eff_max, p).unwrap();
            let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            let lo_load = p + (1.0 - p) * lo;
            let hi_load = p + (1.0 - p) * hi;

            let lo_eff = curve.realized_efficiency(1.0, lo_load).unwrap();
            let hi_eff = curve.realized_efficiency(1.0, hi_load).unwrap();

            prop_assert!(hi_eff + 1e-9 >= lo_eff);
            prop_assert!(lo_eff >= eff_min - 1e-9 && hi_eff <= eff_max + 1e-9);
        }
    }
}
