//! Core units, constants, and shared primitives for the electric propulsion designer workspace.

/// Physical constants. SI unless the name says otherwise.
pub mod constants {
    /// Standard gravity at Earth's surface (m/s²).
    pub const G0: f64 = 9.80665;
    /// Newton-metres per foot-pound-force.
    pub const NM_PER_FT_LBF: f64 = 1.355_817_948_3;
    /// Converts a motor current (A) scaled by `1 / Kv` (Kv in rpm/V) into shaft torque (ft·lbf).
    ///
    /// Kt = 60 / (2π Kv) N·m/A, expressed in ft·lbf. Evaluates to ≈ 7.0432.
    pub const TORQUE_CONSTANT_FT_LBF: f64 = 30.0 / std::f64::consts::PI / NM_PER_FT_LBF;
    /// Switching loss of a speed controller per unit of throttle below full.
    pub const ESC_SWITCHING_LOSS: f64 = 0.078;
}

/// Basic unit conversion helpers.
pub mod units {
    use std::f64::consts::PI;

    /// Convert feet to metres.
    #[inline]
    pub fn ft_to_m(v: f64) -> f64 {
        v * 0.3048
    }

    /// Convert inches to feet.
    #[inline]
    pub fn in_to_ft(v: f64) -> f64 {
        v / 12.0
    }

    /// Convert millimetres to inches.
    #[inline]
    pub fn mm_to_in(v: f64) -> f64 {
        v / 25.4
    }

    /// Convert grams to ounces (avoirdupois).
    #[inline]
    pub fn g_to_oz(v: f64) -> f64 {
        v / 28.349_523_125
    }

    /// Convert ounces to pounds.
    #[inline]
    pub fn oz_to_lb(v: f64) -> f64 {
        v / 16.0
    }

    /// Convert kg/m³ to slug/ft³.
    #[inline]
    pub fn kg_m3_to_slug_ft3(v: f64) -> f64 {
        v * 0.001_940_320_3
    }

    /// Convert an angular velocity in rad/s to revolutions per minute.
    #[inline]
    pub fn rad_s_to_rpm(v: f64) -> f64 {
        v * 30.0 / PI
    }

    /// Convert revolutions per minute to rad/s.
    #[inline]
    pub fn rpm_to_rad_s(v: f64) -> f64 {
        v * PI / 30.0
    }

    /// Convert an angular velocity in rad/s to revolutions per second.
    #[inline]
    pub fn rad_s_to_rps(v: f64) -> f64 {
        v / (2.0 * PI)
    }
}

/// 1976 US / ICAO standard atmosphere.
pub mod atmosphere {
    use super::constants::G0;

    /// Specific gas constant for dry air (J/(kg·K)).
    const R_AIR: f64 = 287.052_87;
    /// Effective Earth radius used for geopotential altitude (m).
    const EARTH_RADIUS_M: f64 = 6_356_766.0;
    /// Lowest tabulated geometric altitude (m).
    pub const MIN_ALTITUDE_M: f64 = -610.0;
    /// Highest geometric altitude covered by the seven layers (m).
    pub const MAX_ALTITUDE_M: f64 = 84_852.0;

    struct Layer {
        base_altitude_m: f64,
        base_temperature_k: f64,
        base_pressure_pa: f64,
        lapse_rate_k_m: f64,
    }

    const LAYERS: [Layer; 7] = [
        Layer {
            base_altitude_m: 0.0,
            base_temperature_k: 288.15,
            base_pressure_pa: 101_325.0,
            lapse_rate_k_m: -0.0065,
        },
        Layer {
            base_altitude_m: 11_000.0,
            base_temperature_k: 216.65,
            base_pressure_pa: 22_632.06,
            lapse_rate_k_m: 0.0,
        },
        Layer {
            base_altitude_m: 20_000.0,
            base_temperature_k: 216.65,
            base_pressure_pa: 5_474.889,
            lapse_rate_k_m: 0.001,
        },
        Layer {
            base_altitude_m: 32_000.0,
            base_temperature_k: 228.65,
            base_pressure_pa: 868.018_7,
            lapse_rate_k_m: 0.0028,
        },
        Layer {
            base_altitude_m: 47_000.0,
            base_temperature_k: 270.65,
            base_pressure_pa: 110.906_3,
            lapse_rate_k_m: 0.0,
        },
        Layer {
            base_altitude_m: 51_000.0,
            base_temperature_k: 270.65,
            base_pressure_pa: 66.938_87,
            lapse_rate_k_m: -0.0028,
        },
        Layer {
            base_altitude_m: 71_000.0,
            base_temperature_k: 214.65,
            base_pressure_pa: 3.956_42,
            lapse_rate_k_m: -0.002,
        },
    ];

    /// Temperature, pressure and density at one altitude.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct AtmosphereState {
        pub temperature_k: f64,
        pub pressure_pa: f64,
        pub density_kg_m3: f64,
    }

    /// Standard atmosphere at a geometric altitude in metres.
    ///
    /// Returns `None` outside `[MIN_ALTITUDE_M, MAX_ALTITUDE_M]` or for non-finite input.
    pub fn state_at(altitude_m: f64) -> Option<AtmosphereState> {
        if !altitude_m.is_finite() || !(MIN_ALTITUDE_M..=MAX_ALTITUDE_M).contains(&altitude_m) {
            return None;
        }
        let h = EARTH_RADIUS_M * altitude_m / (EARTH_RADIUS_M + altitude_m);
        let layer = LAYERS
            .iter()
            .rev()
            .find(|layer| h >= layer.base_altitude_m)
            .unwrap_or(&LAYERS[0]);

        let dh = h - layer.base_altitude_m;
        let temperature_k = layer.base_temperature_k + layer.lapse_rate_k_m * dh;
        let pressure_pa = if layer.lapse_rate_k_m == 0.0 {
            layer.base_pressure_pa * (-G0 * dh / (R_AIR * layer.base_temperature_k)).exp()
        } else {
            layer.base_pressure_pa
                * (temperature_k / layer.base_temperature_k)
                    .powf(-G0 / (layer.lapse_rate_k_m * R_AIR))
        };

        Some(AtmosphereState {
            temperature_k,
            pressure_pa,
            density_kg_m3: pressure_pa / (R_AIR * temperature_k),
        })
    }

    /// Air density (kg/m³) at a geometric altitude in metres.
    pub fn density_kg_m3(altitude_m: f64) -> Option<f64> {
        state_at(altitude_m).map(|state| state.density_kg_m3)
    }
}
