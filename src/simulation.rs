// Copyright 2026 The AirRide Project. All rights reserved.
// AirRide Panel Service Core - Simulation Stepper

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::compressor::Compressor;
use crate::corner::{self, CornerAction};
use crate::reservoir::ConservationLedger;
use crate::types::{
    Corner, FlowDirection, PhysicalState, Snapshot, SolenoidFlags, TickSummary,
};

// ─── Constants ───────────────────────────────────────────────────────────────

/// Fixed simulation time-step (~62.5 Hz).
pub const TICK_MS: u64 = 16;
/// Slow leakage/consumption drained from the tank every tick.
pub const TANK_DECAY_PER_TICK: f64 = 0.01;
/// Full span of the uniform per-corner sensor jitter in PSI.
pub const JITTER_SPAN_PSI: f64 = 0.005;

// ─── AirSimulation ───────────────────────────────────────────────────────────

/// Discrete-time model of the four-corner suspension plus tank.
///
/// The stepper runs unconditionally so the model stays warm if the device
/// drops out mid-session; the gateway only surfaces its values while the
/// link is down. All mutation goes through `tick_core` (physics) or the
/// intent methods below (gateway fallback overrides).
#[derive(Debug)]
pub struct AirSimulation {
    state: PhysicalState,
    compressor: Compressor,
    ledger: ConservationLedger,
    rng: ChaCha8Rng,
    tick: u64,
}

impl AirSimulation {
    pub fn new() -> Self {
        Self::from_rng(ChaCha8Rng::from_entropy())
    }

    /// Deterministic stepper for tests and reproducible demo runs.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(rng: ChaCha8Rng) -> Self {
        Self {
            state: PhysicalState::default(),
            compressor: Compressor::new(),
            ledger: ConservationLedger::new(),
            rng,
            tick: 0,
        }
    }

    // ─── Physics ────────────────────────────────────────────────────────────

    /// Advance the model by one fixed time-step.
    pub fn tick_core(&mut self) -> TickSummary {
        self.tick += 1;

        // 1. Tank decay, floored at zero.
        if self.state.tank_psi > 0.0 {
            self.state.tank_psi = (self.state.tank_psi - TANK_DECAY_PER_TICK).max(0.0);
        }

        // 2. Compressor staging.
        self.state.tank_psi = self.compressor.charge(self.state.tank_psi);

        // 3. Per-corner dynamics plus jitter.
        for corner in Corner::ALL {
            let i = corner.index();
            let flags = self.state.solenoids[i];
            let action = corner::step_corner(
                &mut self.state.tank_psi,
                &mut self.state.pressures[i],
                &mut self.state.targets[i],
                flags,
            );
            match action {
                CornerAction::ManualFill(t) | CornerAction::TrackFill(t) => {
                    self.ledger.record_transfer(t);
                }
                CornerAction::ManualDump(v) | CornerAction::TrackDump(v) => {
                    self.ledger.record_vent(v);
                }
                CornerAction::Idle => {}
            }

            // Sensor noise, applied even when otherwise idle.
            let jitter = (self.rng.gen::<f64>() - 0.5) * JITTER_SPAN_PSI;
            self.state.pressures[i] += jitter;
        }

        let result = self.ledger.verify();
        if !result.balanced {
            log::warn!("reservoir coupling out of balance by {}", result.error);
        }

        TickSummary {
            tick: self.tick,
            tank_psi: self.state.tank_psi,
            compressor_active: self.compressor.is_active(),
            pumps_engaged: self.compressor.pumps_engaged(self.state.tank_psi),
        }
    }

    // ─── Intent overrides (gateway fallback path) ───────────────────────────

    /// Press-start of a manual inflate/deflate gesture. Sets the requested
    /// flag and clears the opposite one so both can never be held at once.
    pub fn begin_actuation(&mut self, corner: Corner, direction: FlowDirection) {
        let flags = &mut self.state.solenoids[corner.index()];
        match direction {
            FlowDirection::Inflate => {
                flags.inflating = true;
                flags.deflating = false;
            }
            FlowDirection::Deflate => {
                flags.deflating = true;
                flags.inflating = false;
            }
        }
    }

    /// Press-end: releases both solenoids for the corner.
    pub fn end_actuation(&mut self, corner: Corner) {
        self.state.solenoids[corner.index()] = SolenoidFlags::default();
    }

    /// Copy a preset slot into the targets. Returns `false` for an
    /// out-of-range slot (silent no-op at the public boundary).
    pub fn apply_preset(&mut self, slot: usize) -> bool {
        match self.state.presets.get(slot) {
            Some(targets) => {
                self.state.targets = targets;
                true
            }
            None => false,
        }
    }

    /// Explicit per-corner target set.
    pub fn set_target(&mut self, corner: Corner, psi: f64) {
        self.state.targets[corner.index()] = psi;
    }

    /// Capture the current pressures, rounded to whole PSI, into a preset
    /// slot. Returns `false` for an out-of-range slot.
    pub fn save_preset(&mut self, slot: usize) -> bool {
        let rounded = self.state.pressures.map(f64::round);
        self.state.presets.set(slot, rounded)
    }

    /// Adopt a device-provided preset table (custom presets from the
    /// device's persistent storage).
    pub fn adopt_presets(&mut self, slots: &[[f64; 4]]) {
        for (i, targets) in slots.iter().enumerate() {
            self.state.presets.set(i, *targets);
        }
    }

    // ─── Read access ────────────────────────────────────────────────────────

    pub fn state(&self) -> &PhysicalState {
        &self.state
    }

    pub fn ledger(&self) -> &ConservationLedger {
        &self.ledger
    }

    pub fn ticks_run(&self) -> u64 {
        self.tick
    }

    /// Coherent snapshot of the simulated system for the presentation layer.
    pub fn snapshot(&self, connected: bool) -> Snapshot {
        Snapshot {
            pressures: self.state.pressures,
            tank_psi: self.state.tank_psi,
            targets: self.state.targets,
            solenoids: self.state.solenoids,
            compressor_active: self.compressor.is_active(),
            pumps_engaged: self.compressor.pumps_engaged(self.state.tank_psi),
            connected,
            level: Default::default(),
            lockout: false,
            pump_enabled: true,
            presets: *self.state.presets.slots(),
        }
    }
}

impl Default for AirSimulation {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
