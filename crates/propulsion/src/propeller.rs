//! Propeller geometry and fitted aerodynamic coefficients.
//!
//! Thrust and power coefficients are stored as polynomials of polynomials: each
//! power of the advance ratio J carries a polynomial in RPM. Evaluation first
//! collapses the table at the operating RPM into a polynomial in J, then evaluates
//! that polynomial at the operating J.

use std::f64::consts::PI;

use eprop_core::units;

use crate::{ComponentError, require_non_negative, require_positive};

/// Advance ratio used when the shaft is (numerically) stopped.
///
/// Any coefficient computed with it is multiplied by a vanishing rotation rate.
pub const STATIONARY_ADVANCE_RATIO: f64 = 10_000.0;

const STATIONARY_RPS: f64 = 1e-10;

/// Fitted coefficient surface `C(rpm, J)`.
///
/// `rows()[i][j]` multiplies `J^i * rpm^j`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientTable {
    rows: Vec<Vec<f64>>,
}

impl CoefficientTable {
    /// Build a table, rejecting ragged, empty or non-finite input.
    ///
    /// At least two advance-ratio rows are required: the highest one is clamped to
    /// be non-positive during evaluation, which would otherwise wipe a constant fit.
    pub fn new(
        component: &str,
        table: &'static str,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, ComponentError> {
        let invalid = |reason: String| ComponentError::InvalidTable {
            component: component.to_string(),
            table,
            reason,
        };

        if rows.len() < 2 {
            return Err(invalid(format!(
                "needs at least 2 advance-ratio rows (got {})",
                rows.len()
            )));
        }
        let width = rows[0].len();
        if width == 0 {
            return Err(invalid("has an empty RPM row".to_string()));
        }
        if let Some(idx) = rows.iter().position(|row| row.len() != width) {
            return Err(invalid(format!(
                "row {idx} has {} entries, expected {width}",
                rows[idx].len()
            )));
        }
        if rows.iter().flatten().any(|c| !c.is_finite()) {
            return Err(invalid("contains non-finite entries".to_string()));
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Polynomial order in the advance ratio.
    pub fn advance_ratio_order(&self) -> usize {
        self.rows.len() - 1
    }

    /// Polynomial order in RPM.
    pub fn rpm_order(&self) -> usize {
        self.rows[0].len() - 1
    }

    /// Collapse the surface at `rpm` into ascending coefficients of a polynomial in J.
    ///
    /// The leading coefficient is clamped to `<= 0`: coefficients may flatten or decay
    /// at high advance ratio but never grow.
    pub fn at_rpm(&self, rpm: f64) -> Vec<f64> {
        let mut poly: Vec<f64> = self.rows.iter().map(|row| polyval(row, rpm)).collect();
        if let Some(leading) = poly.last_mut() {
            *leading = leading.min(0.0);
        }
        poly
    }

    /// Evaluate the coefficient at one operating point.
    pub fn evaluate(&self, rpm: f64, advance_ratio: f64) -> f64 {
        polyval(&self.at_rpm(rpm), advance_ratio)
    }
}

/// Horner evaluation of ascending coefficients.
pub fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Aerodynamic coefficients at one operating point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AeroCoefficients {
    pub rpm: f64,
    pub advance_ratio: f64,
    /// Ct
    pub thrust: f64,
    /// Cp
    pub power: f64,
    /// Cq = Cp / 2π
    pub torque: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Propeller {
    pub name: String,
    pub manufacturer: String,
    pub diameter_in: f64,
    pub pitch_in: f64,
    pub blades: u32,
    pub thrust_table: CoefficientTable,
    pub power_table: CoefficientTable,
}

impl Propeller {
    pub fn validate(&self) -> Result<(), ComponentError> {
        require_positive(&self.name, "diameter_in", self.diameter_in)?;
        require_non_negative(&self.name, "pitch_in", self.pitch_in)?;
        require_positive(&self.name, "blades", f64::from(self.blades))
    }

    pub fn diameter_ft(&self) -> f64 {
        units::in_to_ft(self.diameter_in)
    }

    /// J = V / (n D), with a sentinel when the shaft is stopped.
    pub fn advance_ratio(&self, omega_rad_s: f64, airspeed_ft_s: f64) -> f64 {
        let rps = units::rad_s_to_rps(omega_rad_s);
        if rps.abs() < STATIONARY_RPS {
            STATIONARY_ADVANCE_RATIO
        } else {
            airspeed_ft_s / (rps * self.diameter_ft())
        }
    }

    /// Thrust, power and torque coefficients at shaft speed `omega_rad_s`.
    pub fn coefficients(&self, omega_rad_s: f64, airspeed_ft_s: f64) -> AeroCoefficients {
        let rpm = units::rad_s_to_rpm(omega_rad_s);
        let advance_ratio = self.advance_ratio(omega_rad_s, airspeed_ft_s);
        let thrust = self.thrust_table.evaluate(rpm, advance_ratio);
        let power = self.power_table.evaluate(rpm, advance_ratio);
        AeroCoefficients {
            rpm,
            advance_ratio,
            thrust,
            power,
            torque: power / (2.0 * PI),
        }
    }
}
