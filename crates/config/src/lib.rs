//! Configuration models and loaders for the electric propulsion designer.
//!
//! Catalog records mirror vendor data as it arrives: each record states its own
//! unit system and the catalog crate converts it into component models.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Unit system a catalog record is written in.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordUnits {
    /// Lengths in inches, weights in ounces.
    #[default]
    Imperial,
    /// Lengths in millimetres, weights in grams.
    Metric,
}

/// Propeller geometry and fitted coefficient tables.
#[derive(Debug, Deserialize, Clone)]
pub struct PropellerRecord {
    pub name: String,
    #[serde(default)]
    pub manufacturer: String,
    pub diameter: f64,
    pub pitch: f64,
    #[serde(default = "default_blades")]
    pub blades: u32,
    /// Rows per advance-ratio power, columns per RPM power, both ascending.
    pub thrust_coefficients: Vec<Vec<f64>>,
    pub power_coefficients: Vec<Vec<f64>>,
    #[serde(default)]
    pub units: RecordUnits,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MotorRecord {
    pub name: String,
    #[serde(default)]
    pub manufacturer: String,
    pub kv_rpm_per_v: f64,
    #[serde(default = "default_gear_ratio")]
    pub gear_ratio: f64,
    pub resistance_ohm: f64,
    pub no_load_current_a: f64,
    pub weight: f64,
    #[serde(default)]
    pub units: RecordUnits,
}

/// Per-cell battery data; the cell count is chosen at lookup time.
#[derive(Debug, Deserialize, Clone)]
pub struct BatteryRecord {
    pub name: String,
    #[serde(default)]
    pub manufacturer: String,
    pub cell_capacity_mah: f64,
    pub cell_voltage_v: f64,
    pub cell_resistance_ohm: f64,
    pub cell_weight: f64,
    pub max_current_a: f64,
    #[serde(default)]
    pub units: RecordUnits,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EscRecord {
    pub name: String,
    #[serde(default)]
    pub manufacturer: String,
    pub resistance_ohm: f64,
    pub max_current_a: f64,
    pub weight: f64,
    #[serde(default)]
    pub units: RecordUnits,
}

/// All component records of a catalog directory.
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    pub propellers: Vec<PropellerRecord>,
    pub motors: Vec<MotorRecord>,
    pub batteries: Vec<BatteryRecord>,
    pub escs: Vec<EscRecord>,
}

/// Optional manufacturer restriction per component kind.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ManufacturerConfig {
    pub propeller: Option<String>,
    pub motor: Option<String>,
    pub battery: Option<String>,
    pub esc: Option<String>,
}

/// Design-space search manifest. Every key is optional so CLI flags can fill gaps.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub airspeed_ft_s: Option<f64>,
    pub altitude_ft: Option<f64>,
    pub thrust_lbf: Option<f64>,
    pub thrust_to_weight: Option<f64>,
    pub frame_weight_lb: Option<f64>,
    pub samples: Option<usize>,
    pub workers: Option<usize>,
    pub seed: Option<u64>,
    pub min_cells: Option<u32>,
    pub max_cells: Option<u32>,
    pub max_attempts: Option<usize>,
    pub manufacturers: ManufacturerConfig,
}

impl SearchConfig {
    /// Overlay `overrides` on top of `self`; values present in `overrides` win.
    pub fn merged_with(self, overrides: SearchConfig) -> SearchConfig {
        SearchConfig {
            airspeed_ft_s: overrides.airspeed_ft_s.or(self.airspeed_ft_s),
            altitude_ft: overrides.altitude_ft.or(self.altitude_ft),
            thrust_lbf: overrides.thrust_lbf.or(self.thrust_lbf),
            thrust_to_weight: overrides.thrust_to_weight.or(self.thrust_to_weight),
            frame_weight_lb: overrides.frame_weight_lb.or(self.frame_weight_lb),
            samples: overrides.samples.or(self.samples),
            workers: overrides.workers.or(self.workers),
            seed: overrides.seed.or(self.seed),
            min_cells: overrides.min_cells.or(self.min_cells),
            max_cells: overrides.max_cells.or(self.max_cells),
            max_attempts: overrides.max_attempts.or(self.max_attempts),
            manufacturers: ManufacturerConfig {
                propeller: overrides
                    .manufacturers
                    .propeller
                    .or(self.manufacturers.propeller),
                motor: overrides.manufacturers.motor.or(self.manufacturers.motor),
                battery: overrides
                    .manufacturers
                    .battery
                    .or(self.manufacturers.battery),
                esc: overrides.manufacturers.esc.or(self.manufacturers.esc),
            },
        }
    }
}

/// Errors that can occur while loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("no {kind} records found under {}", .dir.display())]
    MissingCatalogFile { kind: &'static str, dir: PathBuf },
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("conflicting parameters: {0}")]
    ConflictingParameters(&'static str),
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Load propeller records from a YAML list, a TOML file or a directory of TOML files.
pub fn load_propellers<P: AsRef<Path>>(path: P) -> Result<Vec<PropellerRecord>, ConfigError> {
    load_records(path)
}

pub fn load_motors<P: AsRef<Path>>(path: P) -> Result<Vec<MotorRecord>, ConfigError> {
    load_records(path)
}

pub fn load_batteries<P: AsRef<Path>>(path: P) -> Result<Vec<BatteryRecord>, ConfigError> {
    load_records(path)
}

pub fn load_escs<P: AsRef<Path>>(path: P) -> Result<Vec<EscRecord>, ConfigError> {
    load_records(path)
}

/// Load every component kind from a catalog directory.
///
/// Each kind is read from `<dir>/<kind>.yaml`, `<dir>/<kind>.yml` or a `<dir>/<kind>/`
/// directory of TOML records, in that order of preference.
pub fn load_catalog<P: AsRef<Path>>(dir: P) -> Result<CatalogConfig, ConfigError> {
    let dir = dir.as_ref();
    Ok(CatalogConfig {
        propellers: load_records(catalog_source(dir, "propellers")?)?,
        motors: load_records(catalog_source(dir, "motors")?)?,
        batteries: load_records(catalog_source(dir, "batteries")?)?,
        escs: load_records(catalog_source(dir, "escs")?)?,
    })
}

/// Load a search manifest from a TOML or YAML file.
pub fn load_search_config<P: AsRef<Path>>(path: P) -> Result<SearchConfig, ConfigError> {
    let path = path.as_ref();
    if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn catalog_source(dir: &Path, kind: &'static str) -> Result<PathBuf, ConfigError> {
    [
        dir.join(format!("{kind}.yaml")),
        dir.join(format!("{kind}.yml")),
        dir.join(kind),
    ]
    .into_iter()
    .find(|candidate| candidate.exists())
    .ok_or_else(|| ConfigError::MissingCatalogFile {
        kind,
        dir: dir.to_path_buf(),
    })
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}

fn default_blades() -> u32 {
    2
}

fn default_gear_ratio() -> f64 {
    1.0
}
