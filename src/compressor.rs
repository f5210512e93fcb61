// Copyright 2026 The AirRide Project. All rights reserved.
// AirRide Panel Service Core - Compressor Staging
//
// Bang-bang charge controller with hysteresis: once charging starts below
// the low threshold it continues until the tank reaches the high threshold,
// not merely until the low threshold is exceeded. A second pump stage
// engages only at very low tank pressure (the panel's two LED indicators).

use serde::{Deserialize, Serialize};

// ─── Constants ───────────────────────────────────────────────────────────────

/// Tank ceiling; charging clamps here and the compressor shuts off.
pub const TANK_HIGH_PSI: f64 = 150.0;
/// Charging starts when the tank falls below this.
pub const TANK_LOW_PSI: f64 = 120.0;
/// The second pump stage engages below this.
pub const DUAL_PUMP_BELOW_PSI: f64 = 105.0;

/// Base charge rate in PSI per tick before efficiency and staging.
pub const BASE_FILL_RATE: f64 = 0.06;
/// Charge efficiency floor; a pump never drops below 30% of its base rate.
pub const EFFICIENCY_FLOOR: f64 = 0.3;
/// Efficiency falls off linearly as `1 - tank/EFFICIENCY_ROLLOFF_PSI`.
pub const EFFICIENCY_ROLLOFF_PSI: f64 = 200.0;

// ─── Charge curve ────────────────────────────────────────────────────────────

/// Charge-rate efficiency at the given tank pressure. Head pressure works
/// against the pump, so the rate degrades as the tank fills.
pub fn efficiency(tank_psi: f64) -> f64 {
    (1.0 - tank_psi / EFFICIENCY_ROLLOFF_PSI).max(EFFICIENCY_FLOOR)
}

/// Pump stages contributing at the given tank pressure.
pub fn pump_count(tank_psi: f64) -> f64 {
    if tank_psi < DUAL_PUMP_BELOW_PSI {
        2.0
    } else {
        1.0
    }
}

/// PSI added to the tank in one tick of active charging.
pub fn fill_rate(tank_psi: f64) -> f64 {
    BASE_FILL_RATE * efficiency(tank_psi) * pump_count(tank_psi)
}

// ─── Compressor ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Compressor {
    active: bool,
}

impl Compressor {
    pub fn new() -> Self {
        Self { active: false }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Pump stages engaged right now: 0 while off, 1 or 2 while charging.
    pub fn pumps_engaged(&self, tank_psi: f64) -> u8 {
        if self.active {
            pump_count(tank_psi) as u8
        } else {
            0
        }
    }

    /// Advance one tick of charge logic and return the new tank pressure.
    ///
    /// At or above the ceiling the tank is clamped to exactly
    /// `TANK_HIGH_PSI` and the compressor turns off; if an active charge
    /// lands on the ceiling it turns off the same tick.
    pub fn charge(&mut self, tank_psi: f64) -> f64 {
        if tank_psi >= TANK_HIGH_PSI {
            self.active = false;
            return TANK_HIGH_PSI;
        }
        if tank_psi < TANK_LOW_PSI || self.active {
            self.active = true;
            let next = (tank_psi + fill_rate(tank_psi)).min(TANK_HIGH_PSI);
            if next >= TANK_HIGH_PSI {
                self.active = false;
            }
            return next;
        }
        tank_psi
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn efficiency_floor_holds() {
        assert!((efficiency(0.0) - 1.0).abs() < 1e-12);
        assert!((efficiency(100.0) - 0.5).abs() < 1e-12);
        // 1 - 145/200 = 0.275, below the 0.3 floor
        assert!((efficiency(145.0) - EFFICIENCY_FLOOR).abs() < 1e-12);
    }

    #[test]
    fn dual_pump_engages_below_threshold() {
        assert!((pump_count(100.0) - 2.0).abs() < f64::EPSILON);
        assert!((pump_count(105.0) - 1.0).abs() < f64::EPSILON);
        assert!((pump_count(130.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn fill_rate_doubles_with_second_stage() {
        // Normalizing out the efficiency term isolates the staging factor.
        let low = fill_rate(100.0) / efficiency(100.0);
        let high = fill_rate(130.0) / efficiency(130.0);
        assert!((low - 2.0 * high).abs() < 1e-12);
    }

    #[test]
    fn compressor_off_above_low_threshold() {
        let mut compressor = Compressor::new();
        let next = compressor.charge(130.0);
        assert!(!compressor.is_active());
        assert!((next - 130.0).abs() < f64::EPSILON);
    }

    #[test]
    fn compressor_starts_below_low_threshold() {
        let mut compressor = Compressor::new();
        let next = compressor.charge(119.9);
        assert!(compressor.is_active());
        assert!(next > 119.9);
    }

    #[test]
    fn hysteresis_keeps_charging_between_thresholds() {
        let mut compressor = Compressor::new();
        let mut tank = 119.0;
        tank = compressor.charge(tank);
        assert!(compressor.is_active());
        // Charge monotonically through the 120..150 band without flapping.
        while tank < TANK_HIGH_PSI {
            let before = tank;
            tank = compressor.charge(tank);
            assert!(tank > before);
            if tank < TANK_HIGH_PSI {
                assert!(compressor.is_active(), "flapped at {tank}");
            }
        }
        assert!((tank - TANK_HIGH_PSI).abs() < f64::EPSILON);
        assert!(!compressor.is_active());
    }

    #[test]
    fn clamp_at_ceiling_turns_off_same_tick() {
        let mut compressor = Compressor::new();
        compressor.charge(119.0); // now active
        let next = compressor.charge(149.999);
        assert!((next - TANK_HIGH_PSI).abs() < f64::EPSILON);
        assert!(!compressor.is_active());
    }

    #[test]
    fn overshoot_is_clamped() {
        let mut compressor = Compressor::new();
        let next = compressor.charge(151.0);
        assert!((next - TANK_HIGH_PSI).abs() < f64::EPSILON);
        assert!(!compressor.is_active());
    }

    #[test]
    fn pumps_engaged_mirrors_staging() {
        let mut compressor = Compressor::new();
        assert_eq!(compressor.pumps_engaged(100.0), 0);
        compressor.charge(100.0);
        assert_eq!(compressor.pumps_engaged(100.0), 2);
        assert_eq!(compressor.pumps_engaged(130.0), 1);
    }
}
