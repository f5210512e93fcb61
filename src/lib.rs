// Copyright 2026 The AirRide Project. All rights reserved.
// AirRide Panel Service Core
//
// Headless service layer for the four-corner air-suspension control panel.
// When the controller hardware is reachable the gateway relays intents and
// parses its status reports; when it is not, a fixed-rate offline physics
// model keeps the panel fully interactive.

pub mod compressor;
pub mod corner;
pub mod gateway;
pub mod link;
pub mod reservoir;
pub mod simulation;
pub mod types;
pub mod wire;

pub use gateway::{DeviceGateway, GatewayConfig};
pub use link::{DeviceLink, LinkState};
pub use simulation::AirSimulation;
pub use types::*;
