//! Component models for an electric propulsion unit: propeller, motor, battery and ESC.
//!
//! Models are plain value objects. They are built once per catalog lookup and are
//! never mutated afterwards; operating state lives in the solver outputs instead.

pub mod propeller;

pub use propeller::{AeroCoefficients, CoefficientTable, Propeller, STATIONARY_ADVANCE_RATIO};

use thiserror::Error;

/// Errors raised when a component record violates a physical invariant.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ComponentError {
    #[error("{component}: {field} = {value} must be {requirement}")]
    InvalidParameter {
        component: String,
        field: &'static str,
        value: f64,
        requirement: &'static str,
    },
    #[error("{component}: {table} coefficient table {reason}")]
    InvalidTable {
        component: String,
        table: &'static str,
        reason: String,
    },
}

pub(crate) fn require_positive(
    component: &str,
    field: &'static str,
    value: f64,
) -> Result<(), ComponentError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ComponentError::InvalidParameter {
            component: component.to_string(),
            field,
            value,
            requirement: "positive",
        })
    }
}

pub(crate) fn require_non_negative(
    component: &str,
    field: &'static str,
    value: f64,
) -> Result<(), ComponentError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ComponentError::InvalidParameter {
            component: component.to_string(),
            field,
            value,
            requirement: "non-negative",
        })
    }
}

/// Brushless motor described by its velocity constant and winding losses.
#[derive(Debug, Clone, PartialEq)]
pub struct Motor {
    pub name: String,
    pub manufacturer: String,
    pub kv_rpm_per_v: f64,
    /// Motor revolutions per propeller revolution.
    pub gear_ratio: f64,
    pub resistance_ohm: f64,
    pub no_load_current_a: f64,
    pub weight_oz: f64,
}

impl Motor {
    pub fn validate(&self) -> Result<(), ComponentError> {
        require_positive(&self.name, "kv_rpm_per_v", self.kv_rpm_per_v)?;
        require_positive(&self.name, "gear_ratio", self.gear_ratio)?;
        require_non_negative(&self.name, "resistance_ohm", self.resistance_ohm)?;
        require_non_negative(&self.name, "no_load_current_a", self.no_load_current_a)?;
        require_non_negative(&self.name, "weight_oz", self.weight_oz)
    }

    /// Propeller shaft speed (rpm) at which the back-EMF cancels the supply voltage.
    pub fn no_load_rpm(&self, supply_voltage_v: f64) -> f64 {
        self.kv_rpm_per_v * supply_voltage_v / self.gear_ratio
    }
}

/// Battery pack built from identical cells wired in series.
#[derive(Debug, Clone, PartialEq)]
pub struct Battery {
    pub name: String,
    pub manufacturer: String,
    pub cells: u32,
    pub cell_capacity_mah: f64,
    pub cell_voltage_v: f64,
    pub cell_resistance_ohm: f64,
    pub cell_weight_oz: f64,
    pub max_current_a: f64,
}

impl Battery {
    pub fn validate(&self) -> Result<(), ComponentError> {
        require_positive(&self.name, "cells", f64::from(self.cells))?;
        require_positive(&self.name, "cell_capacity_mah", self.cell_capacity_mah)?;
        require_positive(&self.name, "cell_voltage_v", self.cell_voltage_v)?;
        require_non_negative(&self.name, "cell_resistance_ohm", self.cell_resistance_ohm)?;
        require_non_negative(&self.name, "cell_weight_oz", self.cell_weight_oz)?;
        require_positive(&self.name, "max_current_a", self.max_current_a)
    }

    /// Open-circuit pack voltage.
    pub fn voltage_v(&self) -> f64 {
        self.cell_voltage_v * f64::from(self.cells)
    }

    /// Series internal resistance of the pack.
    pub fn resistance_ohm(&self) -> f64 {
        self.cell_resistance_ohm * f64::from(self.cells)
    }

    pub fn weight_oz(&self) -> f64 {
        self.cell_weight_oz * f64::from(self.cells)
    }

    /// Series packs keep the capacity of a single cell.
    pub fn capacity_mah(&self) -> f64 {
        self.cell_capacity_mah
    }
}

/// Electronic speed controller.
#[derive(Debug, Clone, PartialEq)]
pub struct Esc {
    pub name: String,
    pub manufacturer: String,
    pub resistance_ohm: f64,
    pub max_current_a: f64,
    pub weight_oz: f64,
}

impl Esc {
    pub fn validate(&self) -> Result<(), ComponentError> {
        require_non_negative(&self.name, "resistance_ohm", self.resistance_ohm)?;
        require_positive(&self.name, "max_current_a", self.max_current_a)?;
        require_non_negative(&self.name, "weight_oz", self.weight_oz)
    }
}
