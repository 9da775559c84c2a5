//! Resolution of a search manifest into a validated request.

use std::ops::RangeInclusive;

use chrono::Utc;
use eprop_config::{ConfigError, ManufacturerConfig, SearchConfig};
use eprop_core::{atmosphere, units};

pub const DEFAULT_SAMPLES: usize = 10_000;
pub const DEFAULT_WORKERS: usize = 8;
pub const DEFAULT_MIN_CELLS: u32 = 2;
pub const DEFAULT_MAX_CELLS: u32 = 5;
pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// Thrust a sampled unit has to deliver at cruise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThrustTarget {
    Absolute { thrust_lbf: f64 },
    /// Thrust scales with the unit's own weight plus the frame weight.
    ThrustToWeight { ratio: f64 },
}

impl ThrustTarget {
    pub fn required_thrust_lbf(&self, unit_weight_lb: f64, frame_weight_lb: f64) -> f64 {
        match *self {
            ThrustTarget::Absolute { thrust_lbf } => thrust_lbf,
            ThrustTarget::ThrustToWeight { ratio } => ratio * (unit_weight_lb + frame_weight_lb),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub airspeed_ft_s: f64,
    pub altitude_ft: f64,
    pub target: ThrustTarget,
    pub frame_weight_lb: f64,
    pub samples: usize,
    pub workers: usize,
    pub seed: u64,
    pub cells: RangeInclusive<u32>,
    /// Sampling attempts per trial before the trial is given up.
    pub max_attempts: usize,
    pub manufacturers: ManufacturerConfig,
}

impl SearchRequest {
    /// Apply defaults and validate a manifest.
    ///
    /// Airspeed and altitude are required, as is exactly one of an absolute thrust or
    /// a thrust-to-weight ratio; the ratio also needs a frame weight.
    pub fn from_config(config: &SearchConfig) -> Result<Self, ConfigError> {
        let airspeed_ft_s = config
            .airspeed_ft_s
            .ok_or(ConfigError::MissingParameter("airspeed_ft_s"))?;
        if !(airspeed_ft_s.is_finite() && airspeed_ft_s >= 0.0) {
            return Err(invalid("airspeed_ft_s", "must be a non-negative number"));
        }

        let altitude_ft = config
            .altitude_ft
            .ok_or(ConfigError::MissingParameter("altitude_ft"))?;
        if atmosphere::state_at(units::ft_to_m(altitude_ft)).is_none() {
            return Err(invalid(
                "altitude_ft",
                "is outside the standard atmosphere",
            ));
        }

        let (target, frame_weight_lb) = match (config.thrust_lbf, config.thrust_to_weight) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::ConflictingParameters(
                    "thrust_lbf and thrust_to_weight are mutually exclusive",
                ));
            }
            (None, None) => {
                return Err(ConfigError::MissingParameter(
                    "thrust_lbf or thrust_to_weight",
                ));
            }
            (Some(thrust_lbf), None) => {
                if !(thrust_lbf.is_finite() && thrust_lbf > 0.0) {
                    return Err(invalid("thrust_lbf", "must be positive"));
                }
                (
                    ThrustTarget::Absolute { thrust_lbf },
                    config.frame_weight_lb.unwrap_or(0.0),
                )
            }
            (None, Some(ratio)) => {
                if !(ratio.is_finite() && ratio > 0.0) {
                    return Err(invalid("thrust_to_weight", "must be positive"));
                }
                let frame_weight_lb = config
                    .frame_weight_lb
                    .ok_or(ConfigError::MissingParameter("frame_weight_lb"))?;
                (ThrustTarget::ThrustToWeight { ratio }, frame_weight_lb)
            }
        };
        if !(frame_weight_lb.is_finite() && frame_weight_lb >= 0.0) {
            return Err(invalid("frame_weight_lb", "must be non-negative"));
        }

        let samples = config.samples.unwrap_or(DEFAULT_SAMPLES);
        if samples == 0 {
            return Err(invalid("samples", "must be at least 1"));
        }
        let workers = config.workers.unwrap_or(DEFAULT_WORKERS);
        if workers == 0 {
            return Err(invalid("workers", "must be at least 1"));
        }
        let max_attempts = config.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(invalid("max_attempts", "must be at least 1"));
        }

        let min_cells = config.min_cells.unwrap_or(DEFAULT_MIN_CELLS);
        let max_cells = config.max_cells.unwrap_or(DEFAULT_MAX_CELLS);
        if min_cells == 0 || min_cells > max_cells {
            return Err(ConfigError::InvalidParameter {
                name: "min_cells",
                reason: format!("cell range {min_cells}..={max_cells} is empty or starts at zero"),
            });
        }

        Ok(Self {
            airspeed_ft_s,
            altitude_ft,
            target,
            frame_weight_lb,
            samples,
            workers,
            seed: config.seed.unwrap_or_else(wall_clock_seed),
            cells: min_cells..=max_cells,
            max_attempts,
            manufacturers: config.manufacturers.clone(),
        })
    }
}

/// Seed derived from the current time, for searches without an explicit seed.
pub fn wall_clock_seed() -> u64 {
    Utc::now().timestamp_micros() as u64
}

fn invalid(name: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.to_string(),
    }
}
