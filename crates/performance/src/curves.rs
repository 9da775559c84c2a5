//! Thrust sweeps over airspeed and throttle.

use crate::{PerformanceError, PropulsionUnit, SolvedState};

/// Equilibrium at one node of an airspeed × throttle grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrustCurvePoint {
    pub airspeed_ft_s: f64,
    pub throttle: f64,
    pub outcome: Result<SolvedState, PerformanceError>,
}

impl PropulsionUnit {
    /// Sweep `airspeed_steps` airspeeds in `[0, max_airspeed_ft_s]` against
    /// `throttle_steps` throttles in `[0, 1]`, both evenly spaced and end-inclusive.
    ///
    /// Nodes where the solver fails keep their error; the sweep itself only fails on
    /// a malformed grid.
    pub fn thrust_curves(
        &self,
        max_airspeed_ft_s: f64,
        airspeed_steps: usize,
        throttle_steps: usize,
    ) -> Result<Vec<ThrustCurvePoint>, PerformanceError> {
        if !(max_airspeed_ft_s.is_finite() && max_airspeed_ft_s >= 0.0) {
            return Err(PerformanceError::InvalidInput {
                name: "max airspeed",
                value: max_airspeed_ft_s,
            });
        }
        let airspeeds = linspace(0.0, max_airspeed_ft_s, airspeed_steps, "airspeed steps")?;
        let throttles = linspace(0.0, 1.0, throttle_steps, "throttle steps")?;

        let mut points = Vec::with_capacity(airspeeds.len() * throttles.len());
        for &airspeed_ft_s in &airspeeds {
            for &throttle in &throttles {
                points.push(ThrustCurvePoint {
                    airspeed_ft_s,
                    throttle,
                    outcome: self.equilibrium(throttle, airspeed_ft_s),
                });
            }
        }
        Ok(points)
    }
}

fn linspace(
    start: f64,
    end: f64,
    steps: usize,
    name: &'static str,
) -> Result<Vec<f64>, PerformanceError> {
    if steps < 2 {
        return Err(PerformanceError::InvalidInput {
            name,
            value: steps as f64,
        });
    }
    let step = (end - start) / (steps - 1) as f64;
    let mut values: Vec<f64> = (0..steps).map(|i| start + step * i as f64).collect();
    // pin the end point against rounding
    if let Some(last) = values.last_mut() {
        *last = end;
    }
    Ok(values)
}
