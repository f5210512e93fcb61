// Copyright 2026 The AirRide Project. All rights reserved.
// AirRide Panel Service Core - Corner Dynamics
//
// One corner per call: manual fill/dump while a solenoid is held, otherwise
// a target-tracking loop with strictly smaller gains and wider dead-bands so
// automatic leveling is visibly gentler than user-driven actuation, and so
// the dead-band prevents perpetual micro-actuation around the setpoint.

use crate::reservoir::{self, Transfer};
use crate::types::SolenoidFlags;

// ─── Constants ───────────────────────────────────────────────────────────────

/// Manual fill gain applied to the square root of the tank/corner delta.
pub const MANUAL_FILL_GAIN: f64 = 0.05;
/// Manual fill requires at least this much tank head pressure.
pub const MANUAL_FILL_MIN_DELTA: f64 = 1.0;
/// Manual dump gain applied to the square root of the corner pressure.
pub const MANUAL_DUMP_GAIN: f64 = 0.04;

/// Target-tracking dead-band in PSI.
pub const TRACK_DEADBAND_PSI: f64 = 0.3;
/// Target-tracking fill gain (slower than manual).
pub const TRACK_FILL_GAIN: f64 = 0.02;
/// Target-tracking fill requires a wider tank head margin than manual.
pub const TRACK_FILL_MIN_DELTA: f64 = 2.0;
/// Target-tracking dump gain (slower than manual).
pub const TRACK_DUMP_GAIN: f64 = 0.015;

// ─── Corner Action ───────────────────────────────────────────────────────────

/// What one tick of corner dynamics did, for the conservation ledger and
/// for tests. Fills carry the tank-coupled transfer; dumps carry the PSI
/// vented to atmosphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CornerAction {
    ManualFill(Transfer),
    ManualDump(f64),
    TrackFill(Transfer),
    TrackDump(f64),
    Idle,
}

// ─── Step ────────────────────────────────────────────────────────────────────

/// Advance one corner by one tick.
///
/// While a solenoid is held the target snaps to the current pressure every
/// tick, whether or not air moved: manual control redefines the setpoint
/// live, so releasing the button holds the corner where it ended up.
pub fn step_corner(
    tank_psi: &mut f64,
    pressure: &mut f64,
    target: &mut f64,
    flags: SolenoidFlags,
) -> CornerAction {
    if flags.inflating {
        let delta_p = (*tank_psi - *pressure).max(0.0);
        let action = if delta_p > MANUAL_FILL_MIN_DELTA {
            let gain = MANUAL_FILL_GAIN * delta_p.sqrt();
            CornerAction::ManualFill(reservoir::tank_to_corner(tank_psi, pressure, gain))
        } else {
            CornerAction::Idle
        };
        *target = *pressure;
        return action;
    }

    if flags.deflating {
        let drop = MANUAL_DUMP_GAIN * pressure.max(0.0).sqrt();
        let vented = reservoir::vent(pressure, drop);
        *target = *pressure;
        return CornerAction::ManualDump(vented);
    }

    // Idle: bang-bang target tracking with dead-band.
    let diff = *target - *pressure;
    if diff.abs() > TRACK_DEADBAND_PSI {
        if diff > 0.0 {
            let delta_p = (*tank_psi - *pressure).max(0.0);
            if delta_p > TRACK_FILL_MIN_DELTA {
                let gain = TRACK_FILL_GAIN * delta_p.sqrt();
                return CornerAction::TrackFill(reservoir::tank_to_corner(
                    tank_psi, pressure, gain,
                ));
            }
        } else {
            // Deflation vents to atmosphere, never back to the tank.
            let drop = TRACK_DUMP_GAIN * pressure.max(0.0).sqrt();
            let vented = reservoir::vent(pressure, drop);
            return CornerAction::TrackDump(vented);
        }
    }
    CornerAction::Idle
}

// ─── Tests ───────────────────────────────────────────────────────────────────
