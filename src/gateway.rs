// Copyright 2026 The AirRide Project. All rights reserved.
// AirRide Panel Service Core - Device Gateway
//
// Every control operation attempts the real device call with a bounded
// timeout; on failure the equivalent mutation is applied to the local
// model instead, so the panel-visible effect of a user action is the same
// with or without hardware. Failures never propagate past this boundary:
// callers fire and forget, and convergence shows up in the next poll.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info};
use thiserror::Error;

use crate::link::DeviceLink;
use crate::simulation::AirSimulation;
use crate::types::{Corner, FlowDirection, LevelMode, Snapshot, SolenoidFlags, PRESET_COUNT};
use crate::wire::{self, DeviceStatus, WireError};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Bound on every device round-trip; a hung call is a failed call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);
/// The controller's usual soft-AP address.
pub const DEFAULT_BASE_URL: &str = "http://192.168.4.1";

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

// ─── Errors (absorbed at this boundary) ──────────────────────────────────────

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("device request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("device returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error(transparent)]
    Wire(#[from] WireError),
}

// ─── Device Gateway ──────────────────────────────────────────────────────────

pub struct DeviceGateway {
    http: reqwest::Client,
    base_url: String,
    sim: Arc<Mutex<AirSimulation>>,
    link: Mutex<DeviceLink>,
    /// Pressures from the most recent live report; what the panel is
    /// displaying while the link is up. Cleared on any failure.
    live_pressures: Mutex<Option<[f64; 4]>>,
}

impl DeviceGateway {
    /// Build a gateway over a shared simulation. The HTTP client is built
    /// once with the configured timeout.
    pub fn new(
        config: GatewayConfig,
        sim: Arc<Mutex<AirSimulation>>,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url,
            sim,
            link: Mutex::new(DeviceLink::new()),
            live_pressures: Mutex::new(None),
        })
    }

    pub fn is_live(&self) -> bool {
        self.lock_link().is_live()
    }

    // ─── Status polling ─────────────────────────────────────────────────────

    /// Poll `/s`. Live: the parsed device report, with device presets
    /// adopted into the local table. Simulated: the current model snapshot.
    pub async fn fetch_status(&self) -> Snapshot {
        match self.try_fetch_status().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.mark_failure("fetch_status", &err);
                self.lock_sim().snapshot(false)
            }
        }
    }

    async fn try_fetch_status(&self) -> Result<Snapshot, GatewayError> {
        let body = self.call("/s").await?;
        let status = wire::parse_status(&body)?;
        self.mark_success();
        *self.lock_live_pressures() = Some(status.pressures);
        let mut sim = self.lock_sim();
        if let Some(presets) = &status.presets {
            sim.adopt_presets(presets);
        }
        Ok(snapshot_from_device(&status, sim.state().presets.slots()))
    }

    // ─── Control operations ─────────────────────────────────────────────────

    /// Press-start of a hold-style inflate/deflate gesture.
    pub async fn begin_actuation(&self, corner: Corner, direction: FlowDirection) {
        let path = format!(
            "/b?n={}&d={}&h=1",
            corner.index(),
            direction.wire_code()
        );
        if let Err(err) = self.call_ok(&path).await {
            self.mark_failure("begin_actuation", &err);
            self.lock_sim().begin_actuation(corner, direction);
        }
    }

    /// Press-end: releases the corner's hold.
    pub async fn end_actuation(&self, corner: Corner) {
        let path = format!("/bh?n={}", corner.index());
        if let Err(err) = self.call_ok(&path).await {
            self.mark_failure("end_actuation", &err);
            self.lock_sim().end_actuation(corner);
        }
    }

    /// Apply a preset slot to all four targets.
    pub async fn apply_preset(&self, slot: usize) {
        let path = format!("/p?n={slot}");
        if let Err(err) = self.call_ok(&path).await {
            self.mark_failure("apply_preset", &err);
            self.lock_sim().apply_preset(slot);
        }
    }

    /// Set a single corner's target pressure.
    pub async fn set_target(&self, corner: Corner, psi: f64) {
        let path = format!("/bt?n={}&t={}", corner.index(), psi);
        if let Err(err) = self.call_ok(&path).await {
            self.mark_failure("set_target", &err);
            self.lock_sim().set_target(corner, psi);
        }
    }

    /// Select the device's leveling-assist mode. Leveling is not simulated,
    /// so the offline fallback is a no-op.
    pub async fn set_level_mode(&self, mode: LevelMode) {
        let path = format!("/l?m={}", mode.wire_code());
        if let Err(err) = self.call_ok(&path).await {
            self.mark_failure("set_level_mode", &err);
        }
    }

    /// Capture the currently displayed pressures, rounded to whole PSI,
    /// into a preset slot on the device (or the local table when offline).
    /// While the link is up the displayed pressures are the device's
    /// last-reported ones, not the model's.
    pub async fn save_preset(&self, slot: usize) {
        let displayed = self
            .displayed_pressures()
            .unwrap_or_else(|| self.lock_sim().state().pressures);
        let rounded: [i64; 4] = displayed.map(|p| p.round() as i64);
        let path = format!(
            "/sp?n={}&fl={}&fr={}&rl={}&rr={}",
            slot, rounded[0], rounded[1], rounded[2], rounded[3]
        );
        if let Err(err) = self.call_ok(&path).await {
            self.mark_failure("save_preset", &err);
            self.lock_sim().save_preset(slot);
        }
    }

    /// Toggle the device's pump lockout override. Not simulated offline.
    pub async fn toggle_pump_override(&self) {
        if let Err(err) = self.call_ok("/po").await {
            self.mark_failure("toggle_pump_override", &err);
        }
    }

    // ─── Internals ──────────────────────────────────────────────────────────

    async fn call(&self, path_and_query: &str) -> Result<String, GatewayError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status));
        }
        Ok(response.text().await?)
    }

    /// A control call: the body is irrelevant, only the round-trip matters.
    async fn call_ok(&self, path_and_query: &str) -> Result<(), GatewayError> {
        self.call(path_and_query).await?;
        self.mark_success();
        Ok(())
    }

    fn mark_success(&self) {
        if self.lock_link().record_success() {
            info!("device link established, live data authoritative");
        }
    }

    fn mark_failure(&self, op: &str, err: &GatewayError) {
        debug!("{op} falling back to simulation: {err}");
        *self.lock_live_pressures() = None;
        if self.lock_link().record_failure() {
            info!("device link lost, simulated data authoritative");
        }
    }

    /// The last live-reported pressures, while the link is up.
    fn displayed_pressures(&self) -> Option<[f64; 4]> {
        if !self.lock_link().is_live() {
            return None;
        }
        *self.lock_live_pressures()
    }

    fn lock_sim(&self) -> MutexGuard<'_, AirSimulation> {
        self.sim.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_link(&self) -> MutexGuard<'_, DeviceLink> {
        self.link.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_live_pressures(&self) -> MutexGuard<'_, Option<[f64; 4]>> {
        self.live_pressures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Build the panel-facing snapshot from a live device report. Solenoid
/// gesture flags are a client-side concept and read idle while live.
fn snapshot_from_device(status: &DeviceStatus, presets: &[[f64; 4]; PRESET_COUNT]) -> Snapshot {
    Snapshot {
        pressures: status.pressures,
        tank_psi: status.tank_psi,
        targets: status.targets,
        solenoids: [SolenoidFlags::default(); 4],
        compressor_active: status.compressor_active,
        pumps_engaged: u8::from(status.compressor_active),
        connected: true,
        level: status.level,
        lockout: status.lockout,
        pump_enabled: status.pump_enabled,
        presets: *presets,
    }
}
