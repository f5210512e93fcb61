// Copyright 2026 The AirRide Project. All rights reserved.
// AirRide Panel Service Core - Reservoir Transfer and Conservation

use serde::{Deserialize, Serialize};

/// Tank pressure drawn per PSI gained by a corner. The tank is a much larger
/// volume than a spring, so one PSI of corner gain costs a fraction of a PSI
/// of tank pressure.
pub const TANK_DRAW_RATIO: f64 = 0.4;

/// Ledger tolerance: absolute coupling error below this is considered balanced.
const TOLERANCE: f64 = 1e-9;

// ─── Transfer ────────────────────────────────────────────────────────────────

/// A single tank-to-corner air movement, recorded atomically so the coupling
/// between the two reservoirs stays auditable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    /// PSI added to the corner.
    pub corner_gain: f64,
    /// PSI removed from the tank.
    pub tank_draw: f64,
}

/// Move `gain` PSI into a corner, drawing from the tank at the fixed
/// coupling ratio. Both fields are mutated together; the returned record
/// feeds the conservation ledger.
pub fn tank_to_corner(tank_psi: &mut f64, corner_psi: &mut f64, gain: f64) -> Transfer {
    let draw = gain * TANK_DRAW_RATIO;
    *corner_psi += gain;
    *tank_psi -= draw;
    Transfer {
        corner_gain: gain,
        tank_draw: draw,
    }
}

/// Dump `drop` PSI from a corner to atmosphere, floored at zero.
/// Returns the amount actually vented.
pub fn vent(corner_psi: &mut f64, drop: f64) -> f64 {
    let vented = drop.min(*corner_psi).max(0.0);
    *corner_psi = (*corner_psi - drop).max(0.0);
    vented
}

// ─── Conservation Ledger ─────────────────────────────────────────────────────

/// Outcome of a single ledger verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConservationResult {
    pub balanced: bool,
    pub error: f64,
}

/// Accumulates every tank-coupled fill and every atmospheric vent so the
/// coupling invariant `tank_draw == TANK_DRAW_RATIO * corner_gain` can be
/// verified independently of the stepper.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConservationLedger {
    /// Total PSI gained by corners from tank-coupled fills.
    pub corner_gain: f64,
    /// Total PSI drawn from the tank by those fills.
    pub tank_draw: f64,
    /// Total PSI vented to atmosphere (never returns to the tank).
    pub vented: f64,
    /// Number of verifications that violated tolerance.
    pub violations: u32,
}

impl ConservationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_transfer(&mut self, transfer: Transfer) {
        self.corner_gain += transfer.corner_gain;
        self.tank_draw += transfer.tank_draw;
    }

    pub fn record_vent(&mut self, vented: f64) {
        self.vented += vented;
    }

    /// Verify the coupling invariant over everything recorded so far.
    pub fn verify(&mut self) -> ConservationResult {
        let expected = self.corner_gain * TANK_DRAW_RATIO;
        let error = (self.tank_draw - expected).abs();
        let balanced = error < TOLERANCE;
        if !balanced {
            self.violations += 1;
        }
        ConservationResult { balanced, error }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_couples_tank_and_corner() {
        let mut tank = 145.0;
        let mut corner = 45.0;
        let t = tank_to_corner(&mut tank, &mut corner, 0.5);
        assert!((corner - 45.5).abs() < f64::EPSILON);
        assert!((tank - (145.0 - 0.2)).abs() < 1e-12);
        assert!((t.tank_draw - t.corner_gain * TANK_DRAW_RATIO).abs() < 1e-12);
    }

    #[test]
    fn vent_floors_at_zero() {
        let mut corner = 0.05;
        let vented = vent(&mut corner, 0.2);
        assert!(corner.abs() < f64::EPSILON);
        assert!((vented - 0.05).abs() < 1e-12);
    }

    #[test]
    fn vent_partial() {
        let mut corner = 30.0;
        let vented = vent(&mut corner, 0.2);
        assert!((corner - 29.8).abs() < 1e-12);
        assert!((vented - 0.2).abs() < 1e-12);
    }

    #[test]
    fn ledger_balanced_over_mixed_traffic() {
        let mut ledger = ConservationLedger::new();
        let mut tank = 145.0;
        let mut corners = [45.0, 45.0, 30.0, 30.0];
        for i in 0..100 {
            let c = i % 4;
            let t = tank_to_corner(&mut tank, &mut corners[c], 0.03);
            ledger.record_transfer(t);
            let vented = vent(&mut corners[(c + 1) % 4], 0.02);
            ledger.record_vent(vented);
        }
        let result = ledger.verify();
        assert!(result.balanced, "coupling error: {}", result.error);
        assert_eq!(ledger.violations, 0);
    }

    #[test]
    fn ledger_detects_uncoupled_draw() {
        let mut ledger = ConservationLedger::new();
        ledger.record_transfer(Transfer {
            corner_gain: 1.0,
            tank_draw: 0.5, // wrong ratio
        });
        let result = ledger.verify();
        assert!(!result.balanced);
        assert!((result.error - 0.1).abs() < 1e-12);
        assert_eq!(ledger.violations, 1);
    }
}
