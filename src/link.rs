// Copyright 2026 The AirRide Project. All rights reserved.
// AirRide Panel Service Core - Device Link State Machine

use serde::{Deserialize, Serialize};

// ─── Link State ──────────────────────────────────────────────────────────────

/// Which data source is authoritative for the panel.
///
/// `Live` after any successful device round-trip, `Simulated` after any
/// failure. The stepper always runs; its output is only surfaced while
/// the link is `Simulated`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LinkState {
    Live,
    Simulated,
}

// ─── Device Link ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceLink {
    state: LinkState,
    consecutive_failures: u32,
    transitions: u64,
}

impl DeviceLink {
    /// A fresh link starts offline; the first successful poll promotes it.
    pub fn new() -> Self {
        Self {
            state: LinkState::Simulated,
            consecutive_failures: 0,
            transitions: 0,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_live(&self) -> bool {
        self.state == LinkState::Live
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Record a successful round-trip. Returns `true` when this call
    /// transitioned the link from Simulated to Live.
    pub fn record_success(&mut self) -> bool {
        self.consecutive_failures = 0;
        if self.state == LinkState::Simulated {
            self.state = LinkState::Live;
            self.transitions += 1;
            return true;
        }
        false
    }

    /// Record a failed or timed-out call. Returns `true` when this call
    /// transitioned the link from Live to Simulated.
    pub fn record_failure(&mut self) -> bool {
        self.consecutive_failures += 1;
        if self.state == LinkState::Live {
            self.state = LinkState::Simulated;
            self.transitions += 1;
            return true;
        }
        false
    }
}

impl Default for DeviceLink {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_simulated() {
        let link = DeviceLink::new();
        assert_eq!(link.state(), LinkState::Simulated);
        assert!(!link.is_live());
    }

    #[test]
    fn success_promotes_once() {
        let mut link = DeviceLink::new();
        assert!(link.record_success());
        assert!(link.is_live());
        // Repeated successes are not transitions.
        assert!(!link.record_success());
        assert_eq!(link.transitions(), 1);
    }

    #[test]
    fn failure_demotes_and_counts() {
        let mut link = DeviceLink::new();
        link.record_success();
        assert!(link.record_failure());
        assert!(!link.is_live());
        assert!(!link.record_failure());
        assert_eq!(link.consecutive_failures(), 2);
        assert_eq!(link.transitions(), 2);
    }

    #[test]
    fn success_clears_failure_streak() {
        let mut link = DeviceLink::new();
        link.record_failure();
        link.record_failure();
        link.record_success();
        assert_eq!(link.consecutive_failures(), 0);
    }
}
