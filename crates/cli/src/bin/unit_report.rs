use anyhow::anyhow;
use clap::Parser;
use eprop_designer::catalog::{ComponentCatalog, InMemoryCatalog};
use eprop_designer::export::{thrust_curves as export_curves, writer_for_path};
use eprop_designer::performance::{PropulsionUnit, SolvedState};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Evaluate one named propeller/motor/battery/ESC combination.
#[derive(Parser, Debug)]
#[command(author, version, about = "Performance report for a fixed propulsion unit")]
struct Cli {
    /// Propeller name (case-insensitive)
    #[arg(long)]
    prop: String,

    /// Motor name (case-insensitive)
    #[arg(long)]
    motor: String,

    /// Battery cell name (case-insensitive)
    #[arg(long)]
    battery: String,

    /// Cells in series
    #[arg(long, default_value_t = 3)]
    cells: u32,

    /// ESC name (case-insensitive)
    #[arg(long)]
    esc: String,

    /// Altitude in ft
    #[arg(long, default_value_t = 0.0)]
    alt: f64,

    /// Cruise airspeed in ft/s
    #[arg(long, default_value_t = 0.0)]
    speed: f64,

    /// Required cruise thrust in lbf; enables the throttle and endurance report
    #[arg(long)]
    thrust: Option<f64>,

    /// Catalog directory holding propellers, motors, batteries and escs
    #[arg(long, default_value = "configs/catalog")]
    catalog: PathBuf,

    /// Thrust-curve CSV output (use '-' for stdout)
    #[arg(long)]
    curves: Option<PathBuf>,

    /// Highest airspeed of the thrust curves in ft/s
    #[arg(long, default_value_t = 60.0)]
    max_speed: f64,

    /// Airspeed grid points of the thrust curves
    #[arg(long, default_value_t = 13)]
    speed_steps: usize,

    /// Throttle grid points of the thrust curves
    #[arg(long, default_value_t = 11)]
    throttle_steps: usize,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let catalog = InMemoryCatalog::load(&cli.catalog)
        .map_err(|err| anyhow!("failed to load catalog {}: {err}", cli.catalog.display()))?;

    let unit = PropulsionUnit::new(
        catalog.propeller_by_name(&cli.prop)?,
        catalog.motor_by_name(&cli.motor)?,
        Arc::new(catalog.battery_by_name(&cli.battery, cli.cells)?),
        catalog.esc_by_name(&cli.esc)?,
        cli.alt,
    )?;

    print_unit(&unit);

    let static_full = unit.equilibrium(1.0, 0.0)?;
    print_state("Static, full throttle", &static_full);
    if cli.speed > 0.0 {
        let cruise_full = unit.equilibrium(1.0, cli.speed)?;
        print_state(&format!("{:.1} ft/s, full throttle", cli.speed), &cruise_full);
    }

    if let Some(thrust) = cli.thrust {
        println!("\nCruise at {:.1} ft/s, {thrust:.3} lbf", cli.speed);
        match unit.endurance(cli.speed, thrust) {
            Ok(endurance) => {
                println!("  throttle       : {:.1} %", endurance.throttle * 100.0);
                println!("  current draw   : {:.2} A", endurance.state.current_a);
                println!("  rpm            : {:.0}", endurance.state.rpm);
                println!("  endurance      : {:.2} min", endurance.minutes);
            }
            Err(err) => println!("  endurance      : unavailable ({err})"),
        }
    }

    if let Some(path) = &cli.curves {
        let points = unit.thrust_curves(cli.max_speed, cli.speed_steps, cli.throttle_steps)?;
        let mut writer = writer_for_path(path)?;
        export_curves::write_header(writer.as_mut())?;
        for point in &points {
            let status = match &point.outcome {
                Ok(state) => state.regime.label().to_string(),
                Err(err) => err.to_string(),
            };
            let state = point.outcome.as_ref().ok();
            let record = export_curves::Record {
                airspeed_ft_s: point.airspeed_ft_s,
                throttle: point.throttle,
                thrust_lbf: state.map(|s| s.thrust_lbf),
                rpm: state.map(|s| s.rpm),
                current_a: state.map(|s| s.current_a),
                status: &status,
            };
            record.write_to(writer.as_mut())?;
        }
        writer.flush()?;
    }

    Ok(())
}

fn print_unit(unit: &PropulsionUnit) {
    let propeller = unit.propeller();
    let motor = unit.motor();
    let battery = unit.battery();
    let esc = unit.esc();
    println!("Propulsion unit");
    println!(
        "  propeller      : {} ({:.1}x{:.1} in, {} blades)",
        propeller.name, propeller.diameter_in, propeller.pitch_in, propeller.blades
    );
    println!(
        "  motor          : {} (Kv {:.0}, {:.3} ohm, {:.2} A no-load)",
        motor.name, motor.kv_rpm_per_v, motor.resistance_ohm, motor.no_load_current_a
    );
    println!(
        "  battery        : {} {}S ({:.0} mAh, {:.1} V, {:.3} ohm)",
        battery.name,
        battery.cells,
        battery.capacity_mah(),
        battery.voltage_v(),
        battery.resistance_ohm()
    );
    println!(
        "  ESC            : {} ({:.3} ohm, {:.0} A)",
        esc.name, esc.resistance_ohm, esc.max_current_a
    );
    println!("  weight         : {:.3} lb", unit.weight_lb());
    println!(
        "  air density    : {:.6} slug/ft^3 at {:.0} ft",
        unit.air_density_slug_ft3(),
        unit.altitude_ft()
    );
    println!(
        "  no-load speed  : {:.0} rpm",
        eprop_designer::units::rad_s_to_rpm(unit.no_load_omega_rad_s())
    );
}

fn print_state(label: &str, state: &SolvedState) {
    println!("\n{label}");
    println!("  thrust         : {:.3} lbf", state.thrust_lbf);
    println!("  rpm            : {:.0}", state.rpm);
    println!("  current draw   : {:.2} A", state.current_a);
}
