// Copyright 2026 The AirRide Project. All rights reserved.
// AirRide Panel Service Core - Type Definitions

use serde::{Deserialize, Serialize};

// ─── Corner ──────────────────────────────────────────────────────────────────

/// One of the four independently-actuated air springs.
///
/// The wire index mapping is fixed: FL=0, FR=1, RL=2, RR=3.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Corner {
    FrontLeft = 0,
    FrontRight = 1,
    RearLeft = 2,
    RearRight = 3,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::FrontLeft,
        Corner::FrontRight,
        Corner::RearLeft,
        Corner::RearRight,
    ];

    /// Wire/array index of this corner.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Resolve a raw wire index. Out-of-range indices come from the
    /// presentation boundary and are dropped by the caller.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::FrontLeft),
            1 => Some(Self::FrontRight),
            2 => Some(Self::RearLeft),
            3 => Some(Self::RearRight),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FrontLeft => "FL",
            Self::FrontRight => "FR",
            Self::RearLeft => "RL",
            Self::RearRight => "RR",
        }
    }
}

// ─── Flow Direction ──────────────────────────────────────────────────────────

/// Direction of a manual solenoid gesture.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FlowDirection {
    Inflate,
    Deflate,
}

impl FlowDirection {
    /// Wire encoding used by the device `/b` endpoint.
    pub fn wire_code(self) -> i8 {
        match self {
            Self::Inflate => 1,
            Self::Deflate => -1,
        }
    }
}

// ─── Level Mode ──────────────────────────────────────────────────────────────

/// Leveling-assist mode: which corner group the device height-controls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LevelMode {
    Off = 0,
    Front = 1,
    Rear = 2,
    All = 3,
}

impl Default for LevelMode {
    fn default() -> Self {
        LevelMode::Off
    }
}

impl LevelMode {
    pub fn from_wire(raw: u64) -> Option<Self> {
        match raw {
            0 => Some(Self::Off),
            1 => Some(Self::Front),
            2 => Some(Self::Rear),
            3 => Some(Self::All),
            _ => None,
        }
    }

    pub fn wire_code(self) -> u8 {
        self as u8
    }
}

// ─── Solenoid Flags ──────────────────────────────────────────────────────────

/// UI-gesture mirror for one corner's fill and dump solenoids.
///
/// The flags are mutually exclusive: beginning an actuation in one direction
/// clears the opposite flag, and releasing clears both.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SolenoidFlags {
    pub inflating: bool,
    pub deflating: bool,
}

impl SolenoidFlags {
    pub fn is_idle(self) -> bool {
        !self.inflating && !self.deflating
    }
}

// ─── Preset Table ────────────────────────────────────────────────────────────

pub const PRESET_COUNT: usize = 3;

/// Three-slot table of per-corner target tuples, indexed FL, FR, RL, RR.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresetTable {
    slots: [[f64; 4]; PRESET_COUNT],
}

impl PresetTable {
    /// Factory presets: Lay (frame on the ground), Cruise, Max.
    pub fn factory() -> Self {
        Self {
            slots: [
                [0.0, 0.0, 0.0, 0.0],
                [80.0, 80.0, 50.0, 50.0],
                [100.0, 100.0, 80.0, 80.0],
            ],
        }
    }

    pub fn name(slot: usize) -> &'static str {
        match slot {
            0 => "Lay",
            1 => "Cruise",
            2 => "Max",
            _ => "?",
        }
    }

    pub fn get(&self, slot: usize) -> Option<[f64; 4]> {
        self.slots.get(slot).copied()
    }

    /// Overwrite a slot. Returns `false` for an out-of-range slot.
    pub fn set(&mut self, slot: usize, targets: [f64; 4]) -> bool {
        match self.slots.get_mut(slot) {
            Some(entry) => {
                *entry = targets;
                true
            }
            None => false,
        }
    }

    pub fn slots(&self) -> &[[f64; 4]; PRESET_COUNT] {
        &self.slots
    }
}

impl Default for PresetTable {
    fn default() -> Self {
        Self::factory()
    }
}

// ─── PhysicalState ───────────────────────────────────────────────────────────

/// The mutable record behind the panel: simulated pressures, targets,
/// solenoid flags, and the preset table. Mutated only by the simulation
/// stepper (physics) and the device gateway (intent-driven overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalState {
    /// Corner pressures in PSI, indexed by `Corner`.
    pub pressures: [f64; 4],
    /// Shared reservoir pressure in PSI.
    pub tank_psi: f64,
    /// Desired steady-state pressure per corner.
    pub targets: [f64; 4],
    /// Per-corner solenoid gesture flags.
    pub solenoids: [SolenoidFlags; 4],
    /// Local preset table (replaced by device-provided presets when live).
    pub presets: PresetTable,
}

impl Default for PhysicalState {
    fn default() -> Self {
        // Front springs carry the engine; rears start lower.
        Self {
            pressures: [45.0, 45.0, 30.0, 30.0],
            tank_psi: 145.0,
            targets: [45.0, 45.0, 30.0, 30.0],
            solenoids: [SolenoidFlags::default(); 4],
            presets: PresetTable::factory(),
        }
    }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Single coherent view of the system as surfaced to the presentation layer,
/// whether sourced from the device report or the offline model.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub pressures: [f64; 4],
    pub tank_psi: f64,
    pub targets: [f64; 4],
    pub solenoids: [SolenoidFlags; 4],
    pub compressor_active: bool,
    /// Pump stages currently engaged (two LEDs on the panel).
    pub pumps_engaged: u8,
    pub connected: bool,
    pub level: LevelMode,
    pub lockout: bool,
    pub pump_enabled: bool,
    pub presets: [[f64; 4]; PRESET_COUNT],
}

// ─── TickSummary ─────────────────────────────────────────────────────────────

/// Compact per-tick telemetry returned by the stepper.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TickSummary {
    pub tick: u64,
    pub tank_psi: f64,
    pub compressor_active: bool,
    pub pumps_engaged: u8,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_index_round_trip() {
        for corner in Corner::ALL {
            assert_eq!(Corner::from_index(corner.index()), Some(corner));
        }
        assert_eq!(Corner::from_index(4), None);
        assert_eq!(Corner::from_index(usize::MAX), None);
    }

    #[test]
    fn corner_wire_mapping_is_fixed() {
        assert_eq!(Corner::FrontLeft.index(), 0);
        assert_eq!(Corner::FrontRight.index(), 1);
        assert_eq!(Corner::RearLeft.index(), 2);
        assert_eq!(Corner::RearRight.index(), 3);
    }

    #[test]
    fn flow_direction_wire_codes() {
        assert_eq!(FlowDirection::Inflate.wire_code(), 1);
        assert_eq!(FlowDirection::Deflate.wire_code(), -1);
    }

    #[test]
    fn level_mode_from_wire() {
        assert_eq!(LevelMode::from_wire(0), Some(LevelMode::Off));
        assert_eq!(LevelMode::from_wire(3), Some(LevelMode::All));
        assert_eq!(LevelMode::from_wire(4), None);
    }

    #[test]
    fn factory_presets() {
        let table = PresetTable::factory();
        assert_eq!(table.get(0), Some([0.0, 0.0, 0.0, 0.0]));
        assert_eq!(table.get(1), Some([80.0, 80.0, 50.0, 50.0]));
        assert_eq!(table.get(2), Some([100.0, 100.0, 80.0, 80.0]));
        assert_eq!(table.get(3), None);
    }

    #[test]
    fn preset_set_out_of_range() {
        let mut table = PresetTable::factory();
        assert!(!table.set(3, [1.0; 4]));
        assert!(table.set(1, [60.0, 60.0, 40.0, 40.0]));
        assert_eq!(table.get(1), Some([60.0, 60.0, 40.0, 40.0]));
    }

    #[test]
    fn initial_state_matches_reference() {
        let state = PhysicalState::default();
        assert_eq!(state.pressures, [45.0, 45.0, 30.0, 30.0]);
        assert!((state.tank_psi - 145.0).abs() < f64::EPSILON);
        assert_eq!(state.targets, state.pressures);
        for flags in state.solenoids {
            assert!(flags.is_idle());
        }
    }
}
