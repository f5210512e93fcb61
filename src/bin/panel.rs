// AirRide Panel Runner — headless demo of the full service stack
//
// Drives the engine the way the browser panel does: a 16 ms simulation
// tick, a 400 ms status poll printed as gauge lines, and a 5 s slow poll
// for compressor/preset telemetry.
//
// Usage:
//   cargo run --bin panel                          # offline demo (no device)
//   cargo run --bin panel -- --url http://10.0.0.5 # point at a real device
//   cargo run --bin panel -- --seed 42 --polls 20  # reproducible, bounded run

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use airride_engine::simulation::TICK_MS;
use airride_engine::{AirSimulation, DeviceGateway, GatewayConfig, PresetTable, Snapshot};
use tokio::time::interval;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    url: String,
    timeout_ms: u64,
    seed: Option<u64>,
    polls: u64,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        url: airride_engine::gateway::DEFAULT_BASE_URL.to_string(),
        timeout_ms: 1000,
        seed: None,
        polls: 0,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--url" => {
                i += 1;
                if i < args.len() {
                    cli.url = args[i].clone();
                }
            }
            "--timeout-ms" => {
                i += 1;
                if i < args.len() {
                    cli.timeout_ms = args[i].parse().unwrap_or(1000);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().ok();
                }
            }
            "--polls" => {
                i += 1;
                if i < args.len() {
                    cli.polls = args[i].parse().unwrap_or(0);
                }
            }
            other => {
                eprintln!("unknown argument: {other}");
            }
        }
        i += 1;
    }
    cli
}

// ─── Rendering ──────────────────────────────────────────────────────────────

fn render_gauges(snap: &Snapshot) -> String {
    let source = if snap.connected { "LIVE" } else { "SIM" };
    let pump = if snap.compressor_active {
        format!("pump ON x{}", snap.pumps_engaged)
    } else {
        "pump OFF".to_string()
    };
    format!(
        "[{source:>4}] FL {:5.1}/{:5.1}  FR {:5.1}/{:5.1}  RL {:5.1}/{:5.1}  RR {:5.1}/{:5.1}  TANK {:5.1}  {pump}",
        snap.pressures[0], snap.targets[0],
        snap.pressures[1], snap.targets[1],
        snap.pressures[2], snap.targets[2],
        snap.pressures[3], snap.targets[3],
        snap.tank_psi,
    )
}

// ─── Main ───────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), String> {
    env_logger::init();
    let cli = parse_args();

    let sim = match cli.seed {
        Some(seed) => AirSimulation::with_seed(seed),
        None => AirSimulation::new(),
    };
    let sim = Arc::new(Mutex::new(sim));

    let config = GatewayConfig {
        base_url: cli.url.clone(),
        timeout: Duration::from_millis(cli.timeout_ms),
    };
    let gateway = Arc::new(
        DeviceGateway::new(config, Arc::clone(&sim))
            .map_err(|err| format!("failed to build gateway: {err}"))?,
    );

    // Fixed-rate physics tick.
    let tick_sim = Arc::clone(&sim);
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_millis(TICK_MS));
        loop {
            ticker.tick().await;
            let mut guard = tick_sim.lock().unwrap_or_else(PoisonError::into_inner);
            guard.tick_core();
        }
    });

    // Slow poll: compressor and preset telemetry.
    let slow_sim = Arc::clone(&sim);
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(5));
        loop {
            ticker.tick().await;
            let guard = slow_sim.lock().unwrap_or_else(PoisonError::into_inner);
            let state = guard.state();
            let names: Vec<String> = (0..3)
                .map(|i| {
                    let slot = state.presets.get(i).unwrap_or_default();
                    format!("{}={:?}", PresetTable::name(i), slot)
                })
                .collect();
            log::info!(
                "tick {} tank {:5.1} presets {}",
                guard.ticks_run(),
                state.tank_psi,
                names.join(" ")
            );
        }
    });

    println!("airride panel runner, polling {} every 400 ms", cli.url);

    // Main status poll, mirroring the panel's gauge refresh.
    let mut poll = interval(Duration::from_millis(400));
    let mut polled: u64 = 0;
    loop {
        poll.tick().await;
        let snap = gateway.fetch_status().await;
        println!("{}", render_gauges(&snap));
        polled += 1;
        if cli.polls > 0 && polled >= cli.polls {
            break;
        }
    }
    Ok(())
}
