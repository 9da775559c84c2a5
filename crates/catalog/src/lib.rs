//! Read-only component catalog.
//!
//! The search and reporting layers only see the [`ComponentCatalog`] trait. The
//! in-memory implementation is built from catalog records; unit conversion of the
//! records happens in [`convert`] so it can be tested without the solver.

pub mod convert;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use eprop_config::{CatalogConfig, ConfigError, load_catalog};
use eprop_propulsion::{Battery, ComponentError, Esc, Motor, Propeller};
use thiserror::Error;

/// The four component kinds held by a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Propeller,
    Motor,
    Battery,
    Esc,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Propeller,
        ComponentKind::Motor,
        ComponentKind::Battery,
        ComponentKind::Esc,
    ];
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ComponentKind::Propeller => "propeller",
            ComponentKind::Motor => "motor",
            ComponentKind::Battery => "battery",
            ComponentKind::Esc => "ESC",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no {kind} with id {id} (catalog holds {count}, ids start at 1)")]
    UnknownId {
        kind: ComponentKind,
        id: usize,
        count: usize,
    },
    #[error("no {kind} named '{name}'")]
    UnknownName { kind: ComponentKind, name: String },
    #[error("invalid {kind} record: {source}")]
    InvalidRecord {
        kind: ComponentKind,
        #[source]
        source: ComponentError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Query interface over a read-only store of components.
///
/// Ids are 1-based positions within one kind. Name lookups ignore ASCII case.
pub trait ComponentCatalog {
    fn count(&self, kind: ComponentKind) -> usize;

    /// Ids of one kind, optionally restricted to a manufacturer (ASCII case ignored).
    fn ids(&self, kind: ComponentKind, manufacturer: Option<&str>) -> Vec<usize>;

    fn propeller(&self, id: usize) -> Result<Arc<Propeller>, CatalogError>;
    fn propeller_by_name(&self, name: &str) -> Result<Arc<Propeller>, CatalogError>;

    fn motor(&self, id: usize) -> Result<Arc<Motor>, CatalogError>;
    fn motor_by_name(&self, name: &str) -> Result<Arc<Motor>, CatalogError>;

    /// Battery pack of `cells` series cells built from the stored cell record.
    fn battery(&self, id: usize, cells: u32) -> Result<Battery, CatalogError>;
    fn battery_by_name(&self, name: &str, cells: u32) -> Result<Battery, CatalogError>;

    fn esc(&self, id: usize) -> Result<Arc<Esc>, CatalogError>;
    fn esc_by_name(&self, name: &str) -> Result<Arc<Esc>, CatalogError>;
}

/// Catalog held entirely in memory. Cheap to share between worker threads.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    propellers: Vec<Arc<Propeller>>,
    motors: Vec<Arc<Motor>>,
    /// Single-cell templates; the pack is assembled per lookup.
    battery_cells: Vec<Battery>,
    escs: Vec<Arc<Esc>>,
}

impl InMemoryCatalog {
    /// Convert and validate every record. The first invalid record aborts the load.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let propellers = config
            .propellers
            .iter()
            .map(|record| {
                convert::propeller(record)
                    .map(Arc::new)
                    .map_err(invalid(ComponentKind::Propeller))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let motors = config
            .motors
            .iter()
            .map(|record| {
                convert::motor(record)
                    .map(Arc::new)
                    .map_err(invalid(ComponentKind::Motor))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let battery_cells = config
            .batteries
            .iter()
            .map(|record| convert::battery(record, 1).map_err(invalid(ComponentKind::Battery)))
            .collect::<Result<Vec<_>, _>>()?;
        let escs = config
            .escs
            .iter()
            .map(|record| {
                convert::esc(record)
                    .map(Arc::new)
                    .map_err(invalid(ComponentKind::Esc))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            propellers,
            motors,
            battery_cells,
            escs,
        })
    }

    /// Load a catalog directory (see [`eprop_config::load_catalog`]).
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, CatalogError> {
        let config = load_catalog(dir)?;
        Self::from_config(&config)
    }

    fn manufacturer_of(&self, kind: ComponentKind, index: usize) -> &str {
        match kind {
            ComponentKind::Propeller => &self.propellers[index].manufacturer,
            ComponentKind::Motor => &self.motors[index].manufacturer,
            ComponentKind::Battery => &self.battery_cells[index].manufacturer,
            ComponentKind::Esc => &self.escs[index].manufacturer,
        }
    }

    fn assemble_battery(&self, template: &Battery, cells: u32) -> Result<Battery, CatalogError> {
        let pack = Battery {
            cells,
            ..template.clone()
        };
        pack.validate().map_err(invalid(ComponentKind::Battery))?;
        Ok(pack)
    }
}

impl ComponentCatalog for InMemoryCatalog {
    fn count(&self, kind: ComponentKind) -> usize {
        match kind {
            ComponentKind::Propeller => self.propellers.len(),
            ComponentKind::Motor => self.motors.len(),
            ComponentKind::Battery => self.battery_cells.len(),
            ComponentKind::Esc => self.escs.len(),
        }
    }

    fn ids(&self, kind: ComponentKind, manufacturer: Option<&str>) -> Vec<usize> {
        (0..self.count(kind))
            .filter(|&index| match manufacturer {
                Some(wanted) => self
                    .manufacturer_of(kind, index)
                    .trim()
                    .eq_ignore_ascii_case(wanted.trim()),
                None => true,
            })
            .map(|index| index + 1)
            .collect()
    }

    fn propeller(&self, id: usize) -> Result<Arc<Propeller>, CatalogError> {
        by_id(&self.propellers, ComponentKind::Propeller, id).cloned()
    }

    fn propeller_by_name(&self, name: &str) -> Result<Arc<Propeller>, CatalogError> {
        by_name(&self.propellers, ComponentKind::Propeller, name, |p| &p.name).cloned()
    }

    fn motor(&self, id: usize) -> Result<Arc<Motor>, CatalogError> {
        by_id(&self.motors, ComponentKind::Motor, id).cloned()
    }

    fn motor_by_name(&self, name: &str) -> Result<Arc<Motor>, CatalogError> {
        by_name(&self.motors, ComponentKind::Motor, name, |m| &m.name).cloned()
    }

    fn battery(&self, id: usize, cells: u32) -> Result<Battery, CatalogError> {
        let template = by_id(&self.battery_cells, ComponentKind::Battery, id)?;
        self.assemble_battery(template, cells)
    }

    fn battery_by_name(&self, name: &str, cells: u32) -> Result<Battery, CatalogError> {
        let template = by_name(&self.battery_cells, ComponentKind::Battery, name, |b| {
            &b.name
        })?;
        self.assemble_battery(template, cells)
    }

    fn esc(&self, id: usize) -> Result<Arc<Esc>, CatalogError> {
        by_id(&self.escs, ComponentKind::Esc, id).cloned()
    }

    fn esc_by_name(&self, name: &str) -> Result<Arc<Esc>, CatalogError> {
        by_name(&self.escs, ComponentKind::Esc, name, |e| &e.name).cloned()
    }
}

fn invalid(kind: ComponentKind) -> impl Fn(ComponentError) -> CatalogError {
    move |source| CatalogError::InvalidRecord { kind, source }
}

fn by_id<T>(items: &[T], kind: ComponentKind, id: usize) -> Result<&T, CatalogError> {
    id.checked_sub(1)
        .and_then(|index| items.get(index))
        .ok_or(CatalogError::UnknownId {
            kind,
            id,
            count: items.len(),
        })
}

fn by_name<'a, T, F>(
    items: &'a [T],
    kind: ComponentKind,
    name: &str,
    name_of: F,
) -> Result<&'a T, CatalogError>
where
    F: Fn(&T) -> &String,
{
    let wanted = name.trim();
    items
        .iter()
        .find(|item| name_of(item).eq_ignore_ascii_case(wanted))
        .ok_or_else(|| CatalogError::UnknownName {
            kind,
            name: name.to_string(),
        })
}
