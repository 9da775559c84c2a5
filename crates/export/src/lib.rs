//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Quote a free-text field when it would break the row.
fn csv_field(text: &str) -> String {
    if text.contains([',', '"', '\n']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

fn optional(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:.precision$}"))
        .unwrap_or_default()
}

pub mod design_space {
    use std::io::{self, Write};

    use super::csv_field;

    const HEADER: &str = "trial,propeller,motor,battery,esc,cells,diameter_in,pitch_in,kv_rpm_per_v,pack_voltage_v,capacity_mah,throttle,current_a,thrust_lbf,rpm,weight_lb,endurance_min";

    /// Write the design-space CSV header.
    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// One feasible combination.
    #[derive(Debug, Clone)]
    pub struct Record<'a> {
        pub trial: usize,
        pub propeller: &'a str,
        pub motor: &'a str,
        pub battery: &'a str,
        pub esc: &'a str,
        pub cells: u32,
        pub diameter_in: f64,
        pub pitch_in: f64,
        pub kv_rpm_per_v: f64,
        pub pack_voltage_v: f64,
        pub capacity_mah: f64,
        pub throttle: f64,
        pub current_a: f64,
        pub thrust_lbf: f64,
        pub rpm: f64,
        pub weight_lb: f64,
        pub endurance_min: f64,
    }

    impl<'a> Record<'a> {
        /// Serialize the record to CSV, matching the header ordering.
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            writeln!(
                writer,
                "{},{},{},{},{},{},{:.2},{:.2},{:.1},{:.2},{:.0},{:.6},{:.4},{:.4},{:.1},{:.4},{:.3}",
                self.trial,
                csv_field(self.propeller),
                csv_field(self.motor),
                csv_field(self.battery),
                csv_field(self.esc),
                self.cells,
                self.diameter_in,
                self.pitch_in,
                self.kv_rpm_per_v,
                self.pack_voltage_v,
                self.capacity_mah,
                self.throttle,
                self.current_a,
                self.thrust_lbf,
                self.rpm,
                self.weight_lb,
                self.endurance_min,
            )
        }
    }
}

pub mod thrust_curves {
    use std::io::{self, Write};

    use super::{csv_field, optional};

    const HEADER: &str = "airspeed_ft_s,throttle,thrust_lbf,rpm,current_a,status";

    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// Grid node of a thrust sweep. Solver failures leave the numeric columns empty.
    #[derive(Debug, Clone)]
    pub struct Record<'a> {
        pub airspeed_ft_s: f64,
        pub throttle: f64,
        pub thrust_lbf: Option<f64>,
        pub rpm: Option<f64>,
        pub current_a: Option<f64>,
        pub status: &'a str,
    }

    impl<'a> Record<'a> {
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            writeln!(
                writer,
                "{:.3},{:.4},{},{},{},{}",
                self.airspeed_ft_s,
                self.throttle,
                optional(self.thrust_lbf, 6),
                optional(self.rpm, 1),
                optional(self.current_a, 4),
                csv_field(self.status),
            )
        }
    }
}

pub mod summary {
    use std::io::{self, Write};
    use std::path::Path;

    use serde::Serialize;
    use serde_json::to_writer_pretty;

    /// Conditions the search was run under.
    #[derive(Debug, Clone, Serialize)]
    pub struct Parameters {
        pub airspeed_ft_s: f64,
        pub altitude_ft: f64,
        pub thrust_lbf: Option<f64>,
        pub thrust_to_weight: Option<f64>,
        pub frame_weight_lb: f64,
        pub samples: usize,
        pub workers: usize,
        pub seed: u64,
    }

    /// The winning combination with its operating point.
    #[derive(Debug, Clone, Serialize)]
    pub struct BestCombination<'a> {
        pub propeller: &'a str,
        pub propeller_manufacturer: &'a str,
        pub diameter_in: f64,
        pub pitch_in: f64,
        pub motor: &'a str,
        pub motor_manufacturer: &'a str,
        pub kv_rpm_per_v: f64,
        pub battery: &'a str,
        pub battery_manufacturer: &'a str,
        pub cells: u32,
        pub capacity_mah: f64,
        pub pack_voltage_v: f64,
        pub esc: &'a str,
        pub esc_manufacturer: &'a str,
        pub esc_max_current_a: f64,
        pub throttle: f64,
        pub current_a: f64,
        pub thrust_lbf: f64,
        pub rpm: f64,
        pub total_weight_lb: f64,
        pub endurance_min: f64,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct SearchSummary<'a, R: Serialize> {
        pub parameters: Parameters,
        pub feasible_trials: usize,
        pub exhausted_trials: usize,
        pub rejections: &'a R,
        pub best: BestCombination<'a>,
    }

    /// Write the summary as pretty JSON (`-` for stdout).
    pub fn write_json<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
        let mut writer = super::writer_for_path(path)?;
        to_writer_pretty(&mut writer, value)?;
        writeln!(writer)?;
        writer.flush()
    }
}
