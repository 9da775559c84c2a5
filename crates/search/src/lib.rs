//! Random design-space search.
//!
//! Every trial draws a propeller, motor, battery (with a cell count) and ESC from
//! the catalog, evaluates cruise endurance and keeps drawing until it finds a
//! usable combination or runs out of attempts. Trials run on a dedicated thread
//! pool and are reduced to the combination with the longest endurance.

pub mod request;

pub use request::{SearchRequest, ThrustTarget};

use std::sync::Arc;

use eprop_catalog::{ComponentCatalog, ComponentKind};
use eprop_performance::{Endurance, PerformanceError, PropulsionUnit, UnitError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("no {kind} in the catalog matches manufacturer filter {filter:?}")]
    EmptyPool {
        kind: ComponentKind,
        filter: Option<String>,
    },
    #[error("invalid search request: {0}")]
    InvalidRequest(&'static str),
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("all {trials} trials exhausted their attempts without a feasible combination")]
    NoFeasibleCombination {
        trials: usize,
        rejections: RejectionCounts,
    },
}

/// Why a sampled combination was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Battery, ESC and motor resistances all zero.
    Degenerate,
    /// Lookup failed or a record did not validate.
    Catalog,
    NonConvergence,
    ThrottleOutOfRange,
    RatingExceeded,
    NonPositiveEndurance,
}

impl From<&PerformanceError> for Rejection {
    fn from(err: &PerformanceError) -> Self {
        match err {
            PerformanceError::ThrottleOutOfRange { .. } => Rejection::ThrottleOutOfRange,
            PerformanceError::RatingExceeded { .. } => Rejection::RatingExceeded,
            PerformanceError::NonPositiveEndurance { .. } => Rejection::NonPositiveEndurance,
            // request values are validated up front, so bad input is numerical too
            PerformanceError::NonConvergence { .. }
            | PerformanceError::NonFiniteResidual { .. }
            | PerformanceError::InvalidInput { .. } => Rejection::NonConvergence,
        }
    }
}

/// Tally of discarded samples by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RejectionCounts {
    pub degenerate: usize,
    pub catalog: usize,
    pub non_convergence: usize,
    pub throttle_out_of_range: usize,
    pub rating_exceeded: usize,
    pub non_positive_endurance: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, rejection: Rejection) {
        let slot = match rejection {
            Rejection::Degenerate => &mut self.degenerate,
            Rejection::Catalog => &mut self.catalog,
            Rejection::NonConvergence => &mut self.non_convergence,
            Rejection::ThrottleOutOfRange => &mut self.throttle_out_of_range,
            Rejection::RatingExceeded => &mut self.rating_exceeded,
            Rejection::NonPositiveEndurance => &mut self.non_positive_endurance,
        };
        *slot += 1;
    }

    pub fn merge(&mut self, other: &RejectionCounts) {
        self.degenerate += other.degenerate;
        self.catalog += other.catalog;
        self.non_convergence += other.non_convergence;
        self.throttle_out_of_range += other.throttle_out_of_range;
        self.rating_exceeded += other.rating_exceeded;
        self.non_positive_endurance += other.non_positive_endurance;
    }

    pub fn total(&self) -> usize {
        self.degenerate
            + self.catalog
            + self.non_convergence
            + self.throttle_out_of_range
            + self.rating_exceeded
            + self.non_positive_endurance
    }
}

/// A feasible combination found by one trial.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub trial: usize,
    pub propeller_id: usize,
    pub motor_id: usize,
    pub battery_id: usize,
    pub esc_id: usize,
    pub cells: u32,
    pub unit: PropulsionUnit,
    pub required_thrust_lbf: f64,
    pub endurance: Endurance,
    /// Unit plus frame weight.
    pub total_weight_lb: f64,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best: Candidate,
    /// One entry per successful trial, in trial order.
    pub candidates: Vec<Candidate>,
    pub exhausted_trials: usize,
    pub rejections: RejectionCounts,
    pub seed: u64,
}

/// Sampling pools, one list of catalog ids per component kind.
#[derive(Debug, Clone)]
struct Pools {
    propellers: Vec<usize>,
    motors: Vec<usize>,
    batteries: Vec<usize>,
    escs: Vec<usize>,
}

impl Pools {
    fn build<C: ComponentCatalog>(
        catalog: &C,
        request: &SearchRequest,
    ) -> Result<Self, SearchError> {
        let filters = &request.manufacturers;
        let pool = |kind: ComponentKind, filter: &Option<String>| {
            let ids = catalog.ids(kind, filter.as_deref());
            if ids.is_empty() {
                Err(SearchError::EmptyPool {
                    kind,
                    filter: filter.clone(),
                })
            } else {
                Ok(ids)
            }
        };
        Ok(Self {
            propellers: pool(ComponentKind::Propeller, &filters.propeller)?,
            motors: pool(ComponentKind::Motor, &filters.motor)?,
            batteries: pool(ComponentKind::Battery, &filters.battery)?,
            escs: pool(ComponentKind::Esc, &filters.esc)?,
        })
    }
}

struct TrialResult {
    candidate: Option<Candidate>,
    rejections: RejectionCounts,
}

/// Run `request.samples` independent trials on `request.workers` threads.
///
/// Results depend only on the catalog and the request (including its seed), not on
/// the number of workers.
pub fn run_search<C>(catalog: &C, request: &SearchRequest) -> Result<SearchOutcome, SearchError>
where
    C: ComponentCatalog + Sync,
{
    if request.cells.is_empty() {
        return Err(SearchError::InvalidRequest("cell range is empty"));
    }
    let pools = Pools::build(catalog, request)?;
    let thread_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(request.workers)
        .build()?;

    let trials: Vec<TrialResult> = thread_pool.install(|| {
        (0..request.samples)
            .into_par_iter()
            .map(|trial| run_trial(catalog, request, &pools, trial))
            .collect()
    });

    let mut rejections = RejectionCounts::default();
    let mut exhausted_trials = 0;
    let mut candidates = Vec::with_capacity(trials.len());
    for result in trials {
        rejections.merge(&result.rejections);
        match result.candidate {
            Some(candidate) => candidates.push(candidate),
            None => exhausted_trials += 1,
        }
    }

    let best = candidates
        .iter()
        .max_by(|a, b| a.endurance.minutes.total_cmp(&b.endurance.minutes))
        .cloned()
        .ok_or(SearchError::NoFeasibleCombination {
            trials: request.samples,
            rejections,
        })?;

    Ok(SearchOutcome {
        best,
        candidates,
        exhausted_trials,
        rejections,
        seed: request.seed,
    })
}

fn run_trial<C: ComponentCatalog>(
    catalog: &C,
    request: &SearchRequest,
    pools: &Pools,
    trial: usize,
) -> TrialResult {
    let mut rng = StdRng::seed_from_u64(request.seed ^ mix(trial as u64));
    let mut rejections = RejectionCounts::default();
    for _ in 0..request.max_attempts {
        match attempt(catalog, request, pools, trial, &mut rng) {
            Ok(candidate) => {
                return TrialResult {
                    candidate: Some(candidate),
                    rejections,
                };
            }
            Err(rejection) => rejections.record(rejection),
        }
    }
    TrialResult {
        candidate: None,
        rejections,
    }
}

fn attempt<C: ComponentCatalog>(
    catalog: &C,
    request: &SearchRequest,
    pools: &Pools,
    trial: usize,
    rng: &mut StdRng,
) -> Result<Candidate, Rejection> {
    let propeller_id = pick(&pools.propellers, rng);
    let motor_id = pick(&pools.motors, rng);
    let battery_id = pick(&pools.batteries, rng);
    let esc_id = pick(&pools.escs, rng);
    let cells = rng.gen_range(request.cells.clone());

    let propeller = catalog.propeller(propeller_id).map_err(|_| Rejection::Catalog)?;
    let motor = catalog.motor(motor_id).map_err(|_| Rejection::Catalog)?;
    let battery = catalog
        .battery(battery_id, cells)
        .map_err(|_| Rejection::Catalog)?;
    let esc = catalog.esc(esc_id).map_err(|_| Rejection::Catalog)?;

    if battery.resistance_ohm() == 0.0
        && esc.resistance_ohm == 0.0
        && motor.resistance_ohm == 0.0
    {
        return Err(Rejection::Degenerate);
    }

    let unit = PropulsionUnit::new(propeller, motor, Arc::new(battery), esc, request.altitude_ft)
        .map_err(|err| match err {
            UnitError::ShortCircuit => Rejection::Degenerate,
            _ => Rejection::Catalog,
        })?;

    let unit_weight_lb = unit.weight_lb();
    let required_thrust_lbf = request
        .target
        .required_thrust_lbf(unit_weight_lb, request.frame_weight_lb);
    let endurance = unit
        .endurance(request.airspeed_ft_s, required_thrust_lbf)
        .map_err(|err| Rejection::from(&err))?;

    Ok(Candidate {
        trial,
        propeller_id,
        motor_id,
        battery_id,
        esc_id,
        cells,
        unit,
        required_thrust_lbf,
        endurance,
        total_weight_lb: unit_weight_lb + request.frame_weight_lb,
    })
}

fn pick(pool: &[usize], rng: &mut StdRng) -> usize {
    pool[rng.gen_range(0..pool.len())]
}

/// SplitMix64 finaliser; spreads consecutive trial indices over the seed space.
fn mix(index: u64) -> u64 {
    let mut z = index.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
