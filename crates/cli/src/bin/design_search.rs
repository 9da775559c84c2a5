use anyhow::anyhow;
use clap::Parser;
use eprop_designer::catalog::InMemoryCatalog;
use eprop_designer::config::{ManufacturerConfig, SearchConfig, load_search_config};
use eprop_designer::export::{
    design_space as export_design_space, summary as export_summary, writer_for_path,
};
use eprop_designer::search::{SearchRequest, run_search};
use std::io::Write;
use std::path::PathBuf;

#[path = "design_search/report.rs"]
mod report;

/// Sample random propeller/motor/battery/ESC combinations and report the one with
/// the longest cruise endurance.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Design-space search for electric propulsion units"
)]
struct Cli {
    /// Cruise airspeed in ft/s
    #[arg(long)]
    speed: Option<f64>,

    /// Altitude in ft
    #[arg(long)]
    alt: Option<f64>,

    /// Required thrust in lbf
    #[arg(long)]
    thrust: Option<f64>,

    /// Required thrust as a multiple of unit + frame weight
    #[arg(long)]
    thrust_to_weight: Option<f64>,

    /// Frame weight in lb (needed with --thrust-to-weight)
    #[arg(long)]
    weight: Option<f64>,

    /// Number of sampled combinations (default 10000)
    #[arg(long)]
    units: Option<usize>,

    /// Worker threads (default 8)
    #[arg(long)]
    processes: Option<usize>,

    /// RNG seed (defaults to the wall clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Catalog directory holding propellers, motors, batteries and escs
    #[arg(long, default_value = "configs/catalog")]
    catalog: PathBuf,

    /// Search manifest (TOML or YAML); flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    prop_manufacturer: Option<String>,

    #[arg(long)]
    motor_manufacturer: Option<String>,

    #[arg(long)]
    esc_manufacturer: Option<String>,

    #[arg(long)]
    batt_manufacturer: Option<String>,

    /// Design-space CSV, one row per feasible trial (use '-' for stdout)
    #[arg(long)]
    output: Option<PathBuf>,

    /// JSON summary of the best combination (use '-' for stdout)
    #[arg(long)]
    summary: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> SearchConfig {
        SearchConfig {
            airspeed_ft_s: self.speed,
            altitude_ft: self.alt,
            thrust_lbf: self.thrust,
            thrust_to_weight: self.thrust_to_weight,
            frame_weight_lb: self.weight,
            samples: self.units,
            workers: self.processes,
            seed: self.seed,
            manufacturers: ManufacturerConfig {
                propeller: self.prop_manufacturer.clone(),
                motor: self.motor_manufacturer.clone(),
                battery: self.batt_manufacturer.clone(),
                esc: self.esc_manufacturer.clone(),
            },
            ..SearchConfig::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let manifest = match &cli.config {
        Some(path) => load_search_config(path)
            .map_err(|err| anyhow!("failed to load search manifest {}: {err}", path.display()))?,
        None => SearchConfig::default(),
    };
    let config = manifest.merged_with(cli.overrides());
    let request = SearchRequest::from_config(&config)?;

    let catalog = InMemoryCatalog::load(&cli.catalog)
        .map_err(|err| anyhow!("failed to load catalog {}: {err}", cli.catalog.display()))?;

    report::print_parameters(&request);
    let outcome = run_search(&catalog, &request)?;
    report::print_outcome(&outcome);

    if let Some(path) = &cli.output {
        let mut writer = writer_for_path(path)?;
        export_design_space::write_header(writer.as_mut())?;
        for candidate in &outcome.candidates {
            report::design_space_record(candidate).write_to(writer.as_mut())?;
        }
        writer.flush()?;
    }

    if let Some(path) = &cli.summary {
        let summary = export_summary::SearchSummary {
            parameters: report::summary_parameters(&request),
            feasible_trials: outcome.candidates.len(),
            exhausted_trials: outcome.exhausted_trials,
            rejections: &outcome.rejections,
            best: report::best_combination(&outcome.best),
        };
        export_summary::write_json(path, &summary)?;
    }

    Ok(())
}
