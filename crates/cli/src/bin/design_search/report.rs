use eprop_designer::export::design_space::Record;
use eprop_designer::export::summary::{BestCombination, Parameters};
use eprop_designer::search::{Candidate, SearchOutcome, SearchRequest, ThrustTarget};

pub fn print_parameters(request: &SearchRequest) {
    println!("Design-space search (eprop_designer {})", eprop_designer::version());
    println!("  airspeed       : {:.1} ft/s", request.airspeed_ft_s);
    println!("  altitude       : {:.0} ft", request.altitude_ft);
    match request.target {
        ThrustTarget::Absolute { thrust_lbf } => {
            println!("  thrust         : {thrust_lbf:.3} lbf")
        }
        ThrustTarget::ThrustToWeight { ratio } => println!(
            "  thrust/weight  : {ratio:.2} (frame {:.2} lb)",
            request.frame_weight_lb
        ),
    }
    println!(
        "  samples        : {} on {} workers, cells {}-{}",
        request.samples,
        request.workers,
        request.cells.start(),
        request.cells.end()
    );
    println!("  seed           : {}", request.seed);
}

pub fn print_outcome(outcome: &SearchOutcome) {
    let best = &outcome.best;
    let unit = &best.unit;
    let state = &best.endurance.state;
    let propeller = unit.propeller();
    let motor = unit.motor();
    let battery = unit.battery();
    let esc = unit.esc();

    println!("\nBest combination (trial {})", best.trial);
    println!(
        "  propeller      : {} ({:.1}x{:.1} in)",
        propeller.name, propeller.diameter_in, propeller.pitch_in
    );
    println!(
        "  motor          : {} (Kv {:.0}, gear {:.2})",
        motor.name, motor.kv_rpm_per_v, motor.gear_ratio
    );
    println!(
        "  battery        : {} {}S ({:.0} mAh, {:.1} V)",
        battery.name,
        battery.cells,
        battery.capacity_mah(),
        battery.voltage_v()
    );
    println!(
        "  ESC            : {} ({:.0} A)",
        esc.name, esc.max_current_a
    );
    println!("  total weight   : {:.3} lb", best.total_weight_lb);
    println!("  required thrust: {:.3} lbf", best.required_thrust_lbf);
    println!("  throttle       : {:.1} %", best.endurance.throttle * 100.0);
    println!("  current draw   : {:.2} A at {:.0} rpm", state.current_a, state.rpm);
    println!("  endurance      : {:.2} min", best.endurance.minutes);

    let rejections = &outcome.rejections;
    println!(
        "\nTrials: {} feasible, {} exhausted",
        outcome.candidates.len(),
        outcome.exhausted_trials
    );
    println!(
        "Rejected samples: {} (degenerate {}, catalog {}, non-convergence {}, throttle range {}, rating {}, non-positive endurance {})",
        rejections.total(),
        rejections.degenerate,
        rejections.catalog,
        rejections.non_convergence,
        rejections.throttle_out_of_range,
        rejections.rating_exceeded,
        rejections.non_positive_endurance
    );
    if outcome.exhausted_trials > 0 {
        eprintln!(
            "warning: {} trials found no feasible combination within their attempt budget",
            outcome.exhausted_trials
        );
    }
}

pub fn design_space_record(candidate: &Candidate) -> Record<'_> {
    let unit = &candidate.unit;
    let state = &candidate.endurance.state;
    Record {
        trial: candidate.trial,
        propeller: &unit.propeller().name,
        motor: &unit.motor().name,
        battery: &unit.battery().name,
        esc: &unit.esc().name,
        cells: candidate.cells,
        diameter_in: unit.propeller().diameter_in,
        pitch_in: unit.propeller().pitch_in,
        kv_rpm_per_v: unit.motor().kv_rpm_per_v,
        pack_voltage_v: unit.battery().voltage_v(),
        capacity_mah: unit.battery().capacity_mah(),
        throttle: candidate.endurance.throttle,
        current_a: state.current_a,
        thrust_lbf: state.thrust_lbf,
        rpm: state.rpm,
        weight_lb: candidate.total_weight_lb,
        endurance_min: candidate.endurance.minutes,
    }
}

pub fn summary_parameters(request: &SearchRequest) -> Parameters {
    let (thrust_lbf, thrust_to_weight) = match request.target {
        ThrustTarget::Absolute { thrust_lbf } => (Some(thrust_lbf), None),
        ThrustTarget::ThrustToWeight { ratio } => (None, Some(ratio)),
    };
    Parameters {
        airspeed_ft_s: request.airspeed_ft_s,
        altitude_ft: request.altitude_ft,
        thrust_lbf,
        thrust_to_weight,
        frame_weight_lb: request.frame_weight_lb,
        samples: request.samples,
        workers: request.workers,
        seed: request.seed,
    }
}

pub fn best_combination(candidate: &Candidate) -> BestCombination<'_> {
    let unit = &candidate.unit;
    let state = &candidate.endurance.state;
    BestCombination {
        propeller: &unit.propeller().name,
        propeller_manufacturer: &unit.propeller().manufacturer,
        diameter_in: unit.propeller().diameter_in,
        pitch_in: unit.propeller().pitch_in,
        motor: &unit.motor().name,
        motor_manufacturer: &unit.motor().manufacturer,
        kv_rpm_per_v: unit.motor().kv_rpm_per_v,
        battery: &unit.battery().name,
        battery_manufacturer: &unit.battery().manufacturer,
        cells: candidate.cells,
        capacity_mah: unit.battery().capacity_mah(),
        pack_voltage_v: unit.battery().voltage_v(),
        esc: &unit.esc().name,
        esc_manufacturer: &unit.esc().manufacturer,
        esc_max_current_a: unit.esc().max_current_a,
        throttle: candidate.endurance.throttle,
        current_a: state.current_a,
        thrust_lbf: state.thrust_lbf,
        rpm: state.rpm,
        total_weight_lb: candidate.total_weight_lb,
        endurance_min: candidate.endurance.minutes,
    }
}
