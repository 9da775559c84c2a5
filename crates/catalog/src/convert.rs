//! Record to component-model conversion.
//!
//! Models are always imperial: inches for propeller geometry and ounces for weight.
//! Metric records are converted here; electrical quantities are unit-system neutral.

use eprop_config::{BatteryRecord, EscRecord, MotorRecord, PropellerRecord, RecordUnits};
use eprop_core::units;
use eprop_propulsion::{Battery, CoefficientTable, ComponentError, Esc, Motor, Propeller};

fn length_in(value: f64, units: RecordUnits) -> f64 {
    match units {
        RecordUnits::Imperial => value,
        RecordUnits::Metric => units::mm_to_in(value),
    }
}

fn weight_oz(value: f64, units: RecordUnits) -> f64 {
    match units {
        RecordUnits::Imperial => value,
        RecordUnits::Metric => units::g_to_oz(value),
    }
}

pub fn propeller(record: &PropellerRecord) -> Result<Propeller, ComponentError> {
    let propeller = Propeller {
        name: record.name.clone(),
        manufacturer: record.manufacturer.clone(),
        diameter_in: length_in(record.diameter, record.units),
        pitch_in: length_in(record.pitch, record.units),
        blades: record.blades,
        thrust_table: CoefficientTable::new(
            &record.name,
            "thrust",
            record.thrust_coefficients.clone(),
        )?,
        power_table: CoefficientTable::new(
            &record.name,
            "power",
            record.power_coefficients.clone(),
        )?,
    };
    propeller.validate()?;
    Ok(propeller)
}

pub fn motor(record: &MotorRecord) -> Result<Motor, ComponentError> {
    let motor = Motor {
        name: record.name.clone(),
        manufacturer: record.manufacturer.clone(),
        kv_rpm_per_v: record.kv_rpm_per_v,
        gear_ratio: record.gear_ratio,
        resistance_ohm: record.resistance_ohm,
        no_load_current_a: record.no_load_current_a,
        weight_oz: weight_oz(record.weight, record.units),
    };
    motor.validate()?;
    Ok(motor)
}

/// Build a pack of `cells` series cells from a per-cell record.
pub fn battery(record: &BatteryRecord, cells: u32) -> Result<Battery, ComponentError> {
    let battery = Battery {
        name: record.name.clone(),
        manufacturer: record.manufacturer.clone(),
        cells,
        cell_capacity_mah: record.cell_capacity_mah,
        cell_voltage_v: record.cell_voltage_v,
        cell_resistance_ohm: record.cell_resistance_ohm,
        cell_weight_oz: weight_oz(record.cell_weight, record.units),
        max_current_a: record.max_current_a,
    };
    battery.validate()?;
    Ok(battery)
}

pub fn esc(record: &EscRecord) -> Result<Esc, ComponentError> {
    let esc = Esc {
        name: record.name.clone(),
        manufacturer: record.manufacturer.clone(),
        resistance_ohm: record.resistance_ohm,
        max_current_a: record.max_current_a,
        weight_oz: weight_oz(record.weight, record.units),
    };
    esc.validate()?;
    Ok(esc)
}
