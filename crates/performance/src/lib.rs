//! Steady-state performance of an electric propulsion unit.
//!
//! A [`PropulsionUnit`] couples the motor's electrical model to the propeller's
//! aerodynamic load. It carries no operating state: every query returns an explicit
//! [`SolvedState`] describing the equilibrium it found.

pub mod curves;
pub mod solver;

pub use curves::ThrustCurvePoint;

use std::f64::consts::PI;
use std::sync::Arc;

use eprop_core::constants::{ESC_SWITCHING_LOSS, TORQUE_CONSTANT_FT_LBF};
use eprop_core::{atmosphere, units};
use eprop_propulsion::{Battery, ComponentError, Esc, Motor, Propeller};
use serde::Serialize;
use thiserror::Error;

use crate::solver::{Bound, bracketed_secant};

/// Lowest shaft speed the equilibrium solver considers (rad/s).
pub const MIN_OMEGA_RAD_S: f64 = 1e-6;
/// Secant seeds of the equilibrium solver (rad/s).
pub const OMEGA_SEEDS: (f64, f64) = (300.0, 330.0);
/// Secant seeds of the throttle inverter.
pub const THROTTLE_SEEDS: (f64, f64) = (0.5, 0.55);

/// Errors raised while assembling a propulsion unit.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UnitError {
    #[error("battery, ESC and motor resistances are all zero")]
    ShortCircuit,
    #[error(transparent)]
    Component(#[from] ComponentError),
    #[error("altitude {altitude_ft} ft is outside the standard atmosphere")]
    AltitudeOutOfRange { altitude_ft: f64 },
}

/// Errors raised by the solvers of an assembled unit.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PerformanceError {
    #[error("{solver} solver did not converge within {iterations} iterations")]
    NonConvergence {
        solver: &'static str,
        iterations: usize,
    },
    #[error("{solver} solver hit a non-finite residual at {x}")]
    NonFiniteResidual { solver: &'static str, x: f64 },
    #[error(
        "required thrust {required_lbf:.4} lbf is outside the achievable range [{min_lbf:.4}, {max_lbf:.4}] lbf"
    )]
    ThrottleOutOfRange {
        required_lbf: f64,
        min_lbf: f64,
        max_lbf: f64,
    },
    #[error("{component} current rating exceeded: {current_a:.2} A > {limit_a:.2} A")]
    RatingExceeded {
        component: &'static str,
        current_a: f64,
        limit_a: f64,
    },
    #[error("run time {minutes} min is not a positive duration")]
    NonPositiveEndurance { minutes: f64 },
    #[error("invalid {name}: {value}")]
    InvalidInput { name: &'static str, value: f64 },
}

/// How the equilibrium solver settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingRegime {
    /// Motor and propeller torques balance inside the admissible speed range.
    Balanced,
    /// The propeller out-pulls the motor at every speed; the shaft rests at the floor.
    Stalled,
    /// The motor out-pulls the propeller up to no-load speed.
    Runaway,
    /// Zero throttle in still air.
    Idle,
}

impl OperatingRegime {
    pub fn label(&self) -> &'static str {
        match self {
            OperatingRegime::Balanced => "balanced",
            OperatingRegime::Stalled => "stalled",
            OperatingRegime::Runaway => "runaway",
            OperatingRegime::Idle => "idle",
        }
    }
}

/// Operating point returned by the equilibrium solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolvedState {
    pub throttle: f64,
    pub airspeed_ft_s: f64,
    pub omega_rad_s: f64,
    pub rpm: f64,
    pub advance_ratio: f64,
    pub current_a: f64,
    pub thrust_lbf: f64,
    /// Torque absorbed by the propeller.
    pub torque_ft_lbf: f64,
    pub iterations: usize,
    pub regime: OperatingRegime,
}

/// Motor and propeller torque at one shaft speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorqueBalance {
    pub current_a: f64,
    pub motor_ft_lbf: f64,
    pub propeller_ft_lbf: f64,
}

impl TorqueBalance {
    /// Positive when the motor accelerates the shaft.
    pub fn residual(&self) -> f64 {
        self.motor_ft_lbf - self.propeller_ft_lbf
    }
}

/// Flight time at one cruise condition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Endurance {
    pub minutes: f64,
    pub throttle: f64,
    pub state: SolvedState,
}

/// One propeller, motor, battery pack and ESC at a fixed altitude.
#[derive(Debug, Clone)]
pub struct PropulsionUnit {
    propeller: Arc<Propeller>,
    motor: Arc<Motor>,
    battery: Arc<Battery>,
    esc: Arc<Esc>,
    altitude_ft: f64,
    air_density_slug_ft3: f64,
}

impl PropulsionUnit {
    pub fn new(
        propeller: Arc<Propeller>,
        motor: Arc<Motor>,
        battery: Arc<Battery>,
        esc: Arc<Esc>,
        altitude_ft: f64,
    ) -> Result<Self, UnitError> {
        propeller.validate()?;
        motor.validate()?;
        battery.validate()?;
        esc.validate()?;
        if battery.resistance_ohm() == 0.0
            && esc.resistance_ohm == 0.0
            && motor.resistance_ohm == 0.0
        {
            return Err(UnitError::ShortCircuit);
        }
        let density_kg_m3 = atmosphere::density_kg_m3(units::ft_to_m(altitude_ft))
            .ok_or(UnitError::AltitudeOutOfRange { altitude_ft })?;

        Ok(Self {
            propeller,
            motor,
            battery,
            esc,
            altitude_ft,
            air_density_slug_ft3: units::kg_m3_to_slug_ft3(density_kg_m3),
        })
    }

    pub fn propeller(&self) -> &Propeller {
        &self.propeller
    }

    pub fn motor(&self) -> &Motor {
        &self.motor
    }

    pub fn battery(&self) -> &Battery {
        &self.battery
    }

    pub fn esc(&self) -> &Esc {
        &self.esc
    }

    pub fn altitude_ft(&self) -> f64 {
        self.altitude_ft
    }

    pub fn air_density_slug_ft3(&self) -> f64 {
        self.air_density_slug_ft3
    }

    /// Battery, motor and ESC weight in pounds. The propeller is not weighed.
    pub fn weight_lb(&self) -> f64 {
        units::oz_to_lb(self.battery.weight_oz() + self.motor.weight_oz + self.esc.weight_oz)
    }

    /// Propeller shaft speed at which back-EMF equals the open-circuit pack voltage.
    pub fn no_load_omega_rad_s(&self) -> f64 {
        units::rpm_to_rad_s(self.motor.no_load_rpm(self.battery.voltage_v()))
    }

    /// Motor current at `throttle` with the propeller shaft at `omega_rad_s`.
    pub fn motor_current(&self, throttle: f64, omega_rad_s: f64) -> f64 {
        let efficiency = 1.0 - ESC_SWITCHING_LOSS * (1.0 - throttle);
        let back_emf =
            self.motor.gear_ratio / self.motor.kv_rpm_per_v * units::rad_s_to_rpm(omega_rad_s);
        let supply = efficiency * throttle * self.battery.voltage_v();
        let resistance = efficiency * throttle * self.battery.resistance_ohm()
            + self.esc.resistance_ohm
            + self.motor.resistance_ohm;
        // only at zero throttle through an ideal ESC and motor; the open ESC carries nothing
        if resistance == 0.0 {
            return 0.0;
        }
        (supply - back_emf) / resistance
    }

    pub fn torque_balance(
        &self,
        throttle: f64,
        airspeed_ft_s: f64,
        omega_rad_s: f64,
    ) -> TorqueBalance {
        let current_a = self.motor_current(throttle, omega_rad_s);
        let motor_ft_lbf = TORQUE_CONSTANT_FT_LBF * self.motor.gear_ratio / self.motor.kv_rpm_per_v
            * (current_a - self.motor.no_load_current_a);
        let coefficients = self.propeller.coefficients(omega_rad_s, airspeed_ft_s);
        let propeller_ft_lbf = coefficients.torque
            * self.dynamic_scale(omega_rad_s)
            * self.propeller.diameter_ft().powi(5);
        TorqueBalance {
            current_a,
            motor_ft_lbf,
            propeller_ft_lbf,
        }
    }

    /// Thrust (lbf) with the shaft at `omega_rad_s`.
    pub fn thrust_at(&self, airspeed_ft_s: f64, omega_rad_s: f64) -> f64 {
        let coefficients = self.propeller.coefficients(omega_rad_s, airspeed_ft_s);
        coefficients.thrust * self.dynamic_scale(omega_rad_s) * self.propeller.diameter_ft().powi(4)
    }

    /// ρ n², shared by the thrust and torque expressions.
    fn dynamic_scale(&self, omega_rad_s: f64) -> f64 {
        let rps = omega_rad_s / (2.0 * PI);
        self.air_density_slug_ft3 * rps * rps
    }

    /// Shaft speed where motor torque balances propeller torque.
    pub fn equilibrium(
        &self,
        throttle: f64,
        airspeed_ft_s: f64,
    ) -> Result<SolvedState, PerformanceError> {
        if !(0.0..=1.0).contains(&throttle) {
            return Err(PerformanceError::InvalidInput {
                name: "throttle",
                value: throttle,
            });
        }
        if !airspeed_ft_s.is_finite() {
            return Err(PerformanceError::InvalidInput {
                name: "airspeed",
                value: airspeed_ft_s,
            });
        }

        if airspeed_ft_s == 0.0 && throttle == 0.0 {
            return Ok(SolvedState {
                throttle,
                airspeed_ft_s,
                omega_rad_s: 0.0,
                rpm: 0.0,
                advance_ratio: self.propeller.advance_ratio(0.0, airspeed_ft_s),
                current_a: 0.0,
                thrust_lbf: 0.0,
                torque_ft_lbf: 0.0,
                iterations: 0,
                regime: OperatingRegime::Idle,
            });
        }

        let residual =
            |omega: f64| self.torque_balance(throttle, airspeed_ft_s, omega).residual();
        let floor = Bound {
            x: MIN_OMEGA_RAD_S,
            residual: residual(MIN_OMEGA_RAD_S),
        };
        let ceiling_omega = self.no_load_omega_rad_s().max(MIN_OMEGA_RAD_S);
        let ceiling = Bound {
            x: ceiling_omega,
            residual: residual(ceiling_omega),
        };

        if floor.residual <= 0.0 && ceiling.residual < 0.0 {
            return Ok(self.state_at(
                throttle,
                airspeed_ft_s,
                floor.x,
                0,
                OperatingRegime::Stalled,
            ));
        }
        if floor.residual > 0.0 && ceiling.residual > 0.0 {
            return Ok(self.state_at(
                throttle,
                airspeed_ft_s,
                ceiling.x,
                0,
                OperatingRegime::Runaway,
            ));
        }

        let root = bracketed_secant("equilibrium", residual, floor, ceiling, OMEGA_SEEDS)?;
        Ok(self.state_at(
            throttle,
            airspeed_ft_s,
            root.x,
            root.iterations,
            OperatingRegime::Balanced,
        ))
    }

    fn state_at(
        &self,
        throttle: f64,
        airspeed_ft_s: f64,
        omega_rad_s: f64,
        iterations: usize,
        regime: OperatingRegime,
    ) -> SolvedState {
        let balance = self.torque_balance(throttle, airspeed_ft_s, omega_rad_s);
        SolvedState {
            throttle,
            airspeed_ft_s,
            omega_rad_s,
            rpm: units::rad_s_to_rpm(omega_rad_s),
            advance_ratio: self.propeller.advance_ratio(omega_rad_s, airspeed_ft_s),
            current_a: balance.current_a,
            thrust_lbf: self.thrust_at(airspeed_ft_s, omega_rad_s),
            torque_ft_lbf: balance.propeller_ft_lbf,
            iterations,
            regime,
        }
    }

    /// Equilibrium thrust (lbf) at `throttle`.
    pub fn cruise_thrust(
        &self,
        airspeed_ft_s: f64,
        throttle: f64,
    ) -> Result<f64, PerformanceError> {
        self.equilibrium(throttle, airspeed_ft_s)
            .map(|state| state.thrust_lbf)
    }

    /// Throttle in [0, 1] producing `thrust_lbf`, with the equilibrium at that throttle.
    pub fn cruise_throttle(
        &self,
        airspeed_ft_s: f64,
        thrust_lbf: f64,
    ) -> Result<SolvedState, PerformanceError> {
        if !thrust_lbf.is_finite() {
            return Err(PerformanceError::InvalidInput {
                name: "thrust",
                value: thrust_lbf,
            });
        }

        let idle = self.cruise_thrust(airspeed_ft_s, 0.0)?;
        let full = self.cruise_thrust(airspeed_ft_s, 1.0)?;
        let lower = Bound {
            x: 0.0,
            residual: idle - thrust_lbf,
        };
        let upper = Bound {
            x: 1.0,
            residual: full - thrust_lbf,
        };
        if lower.residual > 0.0 || upper.residual < 0.0 {
            return Err(PerformanceError::ThrottleOutOfRange {
                required_lbf: thrust_lbf,
                min_lbf: idle.min(full),
                max_lbf: idle.max(full),
            });
        }

        // The residual closure cannot propagate errors; the first one is kept and
        // reported once the outer solve returns.
        let mut inner_error = None;
        let residual = |throttle: f64| match self.cruise_thrust(airspeed_ft_s, throttle) {
            Ok(thrust) => thrust - thrust_lbf,
            Err(err) => {
                inner_error.get_or_insert(err);
                f64::NAN
            }
        };
        let root = bracketed_secant("throttle", residual, lower, upper, THROTTLE_SEEDS);
        if let Some(err) = inner_error {
            return Err(err);
        }
        let throttle = root?.x;
        self.equilibrium(throttle, airspeed_ft_s)
    }

    /// Flight time at cruise, limited by the ESC and battery current ratings.
    pub fn endurance(
        &self,
        airspeed_ft_s: f64,
        thrust_lbf: f64,
    ) -> Result<Endurance, PerformanceError> {
        let state = self.cruise_throttle(airspeed_ft_s, thrust_lbf)?;
        let current_a = state.current_a;
        if current_a > self.esc.max_current_a {
            return Err(PerformanceError::RatingExceeded {
                component: "ESC",
                current_a,
                limit_a: self.esc.max_current_a,
            });
        }
        if current_a > self.battery.max_current_a {
            return Err(PerformanceError::RatingExceeded {
                component: "battery",
                current_a,
                limit_a: self.battery.max_current_a,
            });
        }

        let minutes = self.battery.capacity_mah() / 1000.0 / current_a * 60.0;
        if !(minutes.is_finite() && minutes > 0.0) {
            return Err(PerformanceError::NonPositiveEndurance { minutes });
        }
        Ok(Endurance {
            minutes,
            throttle: state.throttle,
            state,
        })
    }
}
