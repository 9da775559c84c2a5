use std::sync::Arc;

use eprop_designer::performance::{
    MIN_OMEGA_RAD_S, OperatingRegime, PerformanceError, PropulsionUnit, UnitError,
};
use eprop_designer::propulsion::{Battery, CoefficientTable, Esc, Motor, Propeller};
use eprop_designer::constants::TORQUE_CONSTANT_FT_LBF;
use eprop_designer::units;

const AIRSPEED_FT_S: f64 = 10.0;
const ALTITUDE_FT: f64 = 1000.0;

fn propeller() -> Propeller {
    let name = "APC 9x6.5E";
    Propeller {
        name: name.to_string(),
        manufacturer: "APC".to_string(),
        diameter_in: 9.0,
        pitch_in: 6.5,
        blades: 2,
        thrust_table: CoefficientTable::new(
            name,
            "thrust",
            vec![vec![0.11, 0.0], vec![-0.02, 0.0], vec![-0.10, 0.0]],
        )
        .expect("thrust table"),
        power_table: CoefficientTable::new(
            name,
            "power",
            vec![vec![0.05, 0.0], vec![0.01, 0.0], vec![-0.06, 0.0]],
        )
        .expect("power table"),
    }
}

fn motor() -> Motor {
    Motor {
        name: "Turnigy D2830-11 1000kv".to_string(),
        manufacturer: "Turnigy".to_string(),
        kv_rpm_per_v: 1000.0,
        gear_ratio: 1.0,
        resistance_ohm: 0.1,
        no_load_current_a: 0.5,
        weight_oz: units::g_to_oz(50.0),
    }
}

fn battery() -> Battery {
    Battery {
        name: "Zippy 2100 LiPo".to_string(),
        manufacturer: "Zippy".to_string(),
        cells: 3,
        cell_capacity_mah: 2100.0,
        cell_voltage_v: 3.7,
        cell_resistance_ohm: 0.005,
        cell_weight_oz: 2.0,
        max_current_a: 42.0,
    }
}

fn esc() -> Esc {
    Esc {
        name: "Hobbywing Skywalker 30A".to_string(),
        manufacturer: "Hobbywing".to_string(),
        resistance_ohm: 0.01,
        max_current_a: 30.0,
        weight_oz: 1.0,
    }
}

fn build(motor: Motor, battery: Battery, esc: Esc) -> Result<PropulsionUnit, UnitError> {
    PropulsionUnit::new(
        Arc::new(propeller()),
        Arc::new(motor),
        Arc::new(battery),
        Arc::new(esc),
        ALTITUDE_FT,
    )
}

fn scenario_unit() -> PropulsionUnit {
    build(motor(), battery(), esc()).expect("scenario unit")
}

#[test]
fn unit_derives_density_weight_and_no_load_speed() {
    let unit = scenario_unit();
    let rho = unit.air_density_slug_ft3();
    assert!((rho - 0.002_308).abs() < 2e-6, "density {rho}");

    let expected_weight = (3.0 * 2.0 + units::g_to_oz(50.0) + 1.0) / 16.0;
    assert!((unit.weight_lb() - expected_weight).abs() < 1e-12);

    let no_load = unit.no_load_omega_rad_s();
    assert!((units::rad_s_to_rpm(no_load) - 11_100.0).abs() < 1e-6);
}

#[test]
fn idle_in_still_air_is_exactly_zero() {
    let unit = scenario_unit();
    let state = unit.equilibrium(0.0, 0.0).expect("idle state");
    assert_eq!(state.regime, OperatingRegime::Idle);
    assert_eq!(state.iterations, 0);
    assert_eq!(state.omega_rad_s, 0.0);
    assert_eq!(state.current_a, 0.0);
    assert_eq!(unit.cruise_thrust(0.0, 0.0).expect("idle thrust"), 0.0);
}

#[test]
fn converged_equilibria_balance_torque() {
    let unit = scenario_unit();
    for airspeed in [0.0, 10.0, 30.0] {
        for throttle in [0.3, 0.5, 0.8, 1.0] {
            let state = unit.equilibrium(throttle, airspeed).expect("equilibrium");
            assert_eq!(state.regime, OperatingRegime::Balanced);
            assert!(state.omega_rad_s >= MIN_OMEGA_RAD_S);
            assert!(state.omega_rad_s <= unit.no_load_omega_rad_s());
            let balance = unit.torque_balance(throttle, airspeed, state.omega_rad_s);
            assert!(
                balance.residual().abs() < 1e-5,
                "residual {} at throttle {throttle}, airspeed {airspeed}",
                balance.residual()
            );
            assert!((balance.current_a - state.current_a).abs() < 1e-12);
        }
    }
}

#[test]
fn thrust_rises_with_throttle_at_fixed_airspeed() {
    let unit = scenario_unit();
    let thrusts: Vec<f64> = [0.3, 0.5, 0.8, 1.0]
        .iter()
        .map(|&t| unit.cruise_thrust(AIRSPEED_FT_S, t).expect("thrust"))
        .collect();
    assert!(thrusts.windows(2).all(|w| w[1] > w[0]), "{thrusts:?}");
    assert!(thrusts[3] > 1.7 && thrusts[3] < 2.0, "full throttle {}", thrusts[3]);
}

#[test]
fn solves_do_not_leak_state_between_calls() {
    let unit = scenario_unit();
    let first = unit.equilibrium(0.6, AIRSPEED_FT_S).expect("first");
    let _other = unit.equilibrium(0.9, 40.0).expect("other airspeed");
    let second = unit.equilibrium(0.6, AIRSPEED_FT_S).expect("second");
    assert_eq!(first, second);

    let fresh = scenario_unit()
        .equilibrium(0.6, AIRSPEED_FT_S)
        .expect("fresh unit");
    assert_eq!(first.omega_rad_s, fresh.omega_rad_s);
    assert_eq!(first.thrust_lbf, fresh.thrust_lbf);
}

#[test]
fn cruise_throttle_round_trips_through_cruise_thrust() {
    let unit = scenario_unit();
    for required in [0.3, 0.5, 1.0, 1.4] {
        let state = unit
            .cruise_throttle(AIRSPEED_FT_S, required)
            .expect("feasible thrust");
        assert!(state.throttle > 0.0 && state.throttle < 1.0);
        let thrust = unit
            .cruise_thrust(AIRSPEED_FT_S, state.throttle)
            .expect("thrust at solved throttle");
        assert!(
            (thrust - required).abs() < 1e-4,
            "required {required}, got {thrust}"
        );
        assert!((state.thrust_lbf - thrust).abs() < 1e-12);
    }
}

#[test]
fn scenario_endurance_is_plausible() {
    let unit = scenario_unit();
    let endurance = unit.endurance(AIRSPEED_FT_S, 0.5).expect("endurance");
    let current = endurance.state.current_a;

    assert!(endurance.throttle > 0.0 && endurance.throttle < 1.0);
    assert!((endurance.throttle - 0.506).abs() < 0.01, "throttle {}", endurance.throttle);
    assert!(current > 1.0 && current < 10.0, "current {current}");
    assert!(endurance.minutes > 0.0);
    assert!(endurance.minutes < 2100.0 / 1000.0 * 60.0);
    assert!((endurance.minutes - 2100.0 / 1000.0 / current * 60.0).abs() < 1e-9);
    assert!((endurance.minutes - 27.5).abs() < 0.5, "minutes {}", endurance.minutes);
}

#[test]
fn endurance_does_not_increase_with_required_thrust() {
    let unit = scenario_unit();
    let minutes: Vec<f64> = [0.3, 0.5, 0.7, 1.0, 1.4]
        .iter()
        .map(|&thrust| {
            unit.endurance(AIRSPEED_FT_S, thrust)
                .expect("feasible endurance")
                .minutes
        })
        .collect();
    assert!(minutes.windows(2).all(|w| w[1] <= w[0]), "{minutes:?}");
}

#[test]
fn esc_rating_limits_endurance() {
    let limited = Esc {
        max_current_a: 0.01,
        ..esc()
    };
    let unit = build(motor(), battery(), limited).expect("unit");
    match unit.endurance(AIRSPEED_FT_S, 0.5) {
        Err(PerformanceError::RatingExceeded {
            component,
            current_a,
            limit_a,
        }) => {
            assert_eq!(component, "ESC");
            assert_eq!(limit_a, 0.01);
            assert!(current_a > limit_a);
        }
        other => panic!("expected ESC rating error, got {other:?}"),
    }
}

#[test]
fn battery_rating_limits_endurance() {
    let limited = Battery {
        max_current_a: 1.0,
        ..battery()
    };
    let unit = build(motor(), limited, esc()).expect("unit");
    let err = unit.endurance(AIRSPEED_FT_S, 0.5).unwrap_err();
    assert!(matches!(
        err,
        PerformanceError::RatingExceeded {
            component: "battery",
            ..
        }
    ));
}

#[test]
fn unreachable_thrust_is_reported_out_of_range() {
    let unit = scenario_unit();
    match unit.cruise_throttle(AIRSPEED_FT_S, 5.0) {
        Err(PerformanceError::ThrottleOutOfRange {
            required_lbf,
            min_lbf,
            max_lbf,
        }) => {
            assert_eq!(required_lbf, 5.0);
            assert!(min_lbf < 0.0);
            assert!(max_lbf > 1.7 && max_lbf < 2.0);
        }
        other => panic!("expected out-of-range throttle, got {other:?}"),
    }
    assert!(matches!(
        unit.endurance(AIRSPEED_FT_S, 5.0),
        Err(PerformanceError::ThrottleOutOfRange { .. })
    ));
}

#[test]
fn zero_throttle_in_forward_flight_stalls_the_shaft() {
    let unit = scenario_unit();
    let state = unit.equilibrium(0.0, AIRSPEED_FT_S).expect("stalled state");
    assert_eq!(state.regime, OperatingRegime::Stalled);
    assert_eq!(state.omega_rad_s, MIN_OMEGA_RAD_S);
    assert!(state.thrust_lbf < 0.0);
}

#[test]
fn zero_series_resistance_is_rejected() {
    let motor = Motor {
        resistance_ohm: 0.0,
        ..motor()
    };
    let battery = Battery {
        cell_resistance_ohm: 0.0,
        ..battery()
    };
    let esc = Esc {
        resistance_ohm: 0.0,
        ..esc()
    };
    assert_eq!(build(motor, battery, esc).unwrap_err(), UnitError::ShortCircuit);
}

#[test]
fn ideal_motor_and_esc_draw_no_current_at_zero_throttle() {
    let motor = Motor {
        resistance_ohm: 0.0,
        ..motor()
    };
    let esc = Esc {
        resistance_ohm: 0.0,
        ..esc()
    };
    let unit = build(motor, battery(), esc).expect("battery resistance keeps the unit valid");

    let balance = unit.torque_balance(0.0, AIRSPEED_FT_S, 500.0);
    assert_eq!(balance.current_a, 0.0);
    let friction = -TORQUE_CONSTANT_FT_LBF / 1000.0 * 0.5;
    assert!((balance.motor_ft_lbf - friction).abs() < 1e-12);

    let state = unit.equilibrium(0.0, AIRSPEED_FT_S).expect("zero throttle state");
    assert_eq!(state.regime, OperatingRegime::Stalled);
    assert_eq!(state.current_a, 0.0);
    assert!(state.thrust_lbf.is_finite());

    for point in unit.thrust_curves(30.0, 2, 2).expect("curves") {
        let state = point.outcome.expect("every node solves");
        assert!(state.current_a.is_finite());
        assert!(state.thrust_lbf.is_finite());
    }
}

#[test]
fn full_throttle_in_a_fast_stream_runs_away() {
    let unit = scenario_unit();
    let state = unit.equilibrium(1.0, 200.0).expect("runaway state");
    assert_eq!(state.regime, OperatingRegime::Runaway);
    assert_eq!(state.omega_rad_s, unit.no_load_omega_rad_s());
}

#[test]
fn invalid_components_and_altitudes_are_rejected() {
    let motor = Motor {
        kv_rpm_per_v: 0.0,
        ..motor()
    };
    assert!(matches!(
        build(motor, battery(), esc()),
        Err(UnitError::Component(_))
    ));

    let err = PropulsionUnit::new(
        Arc::new(propeller()),
        Arc::new(self::motor()),
        Arc::new(battery()),
        Arc::new(esc()),
        400_000.0,
    )
    .unwrap_err();
    assert!(matches!(err, UnitError::AltitudeOutOfRange { .. }));
}

#[test]
fn out_of_range_inputs_are_rejected() {
    let unit = scenario_unit();
    assert!(matches!(
        unit.equilibrium(1.5, AIRSPEED_FT_S),
        Err(PerformanceError::InvalidInput {
            name: "throttle",
            ..
        })
    ));
    assert!(matches!(
        unit.equilibrium(0.5, f64::NAN),
        Err(PerformanceError::InvalidInput { .. })
    ));
    assert!(matches!(
        unit.cruise_throttle(AIRSPEED_FT_S, f64::INFINITY),
        Err(PerformanceError::InvalidInput { .. })
    ));
}

#[test]
fn thrust_curves_cover_the_grid() {
    let unit = scenario_unit();
    let points = unit.thrust_curves(30.0, 4, 3).expect("curves");
    assert_eq!(points.len(), 12);

    let first = &points[0];
    assert_eq!((first.airspeed_ft_s, first.throttle), (0.0, 0.0));
    let idle = first.outcome.as_ref().expect("idle node");
    assert_eq!(idle.regime, OperatingRegime::Idle);

    let last = points.last().expect("last node");
    assert_eq!((last.airspeed_ft_s, last.throttle), (30.0, 1.0));

    let static_thrusts: Vec<f64> = points[..3]
        .iter()
        .map(|p| p.outcome.as_ref().expect("static node").thrust_lbf)
        .collect();
    assert!(static_thrusts.windows(2).all(|w| w[1] > w[0]));

    assert!(matches!(
        unit.thrust_curves(30.0, 1, 3),
        Err(PerformanceError::InvalidInput { .. })
    ));
}
