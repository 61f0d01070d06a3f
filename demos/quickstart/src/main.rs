//! quickstart — smallest end-to-end run of the EMS dispatch simulator.
//!
//! Loads an embedded four-ambulance map (one broken) and a six-call morning scenario,
//! dispatches with the nearest-available policy and writes a text event log
//! plus CSV tables to `output/quickstart/`.
//!
//! ```text
//! cargo run -p quickstart                    # default SimConfig
//! cargo run -p quickstart -- config.json     # JSON SimConfig, missing keys default
//! RUST_LOG=debug cargo run -p quickstart     # per-decision tracing
//! ```

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ems_core::SimConfig;
use ems_output::{CsvWriter, SimOutputObserver, TextEventLog};
use ems_policy::NearestAvailablePolicy;
use ems_sim::SimBuilder;
use ems_world::{load_map_reader, load_scenario_reader};

// ── Embedded inputs ───────────────────────────────────────────────────────────

const MAP_JSON: &str = r#"{
  "ambulances": [
    {"id": 1, "lat": 52.2297, "lng": 21.0122},
    {"id": 2, "lat": 52.2500, "lng": 20.9800},
    {"id": 3, "lat": 52.2000, "lng": 21.0500},
    {"id": 4, "lat": 52.2400, "lng": 21.0300, "broken": true}
  ],
  "hospitals": [
    {"id": 10, "lat": 52.2350, "lng": 21.0000, "free_beds": 4},
    {"id": 11, "lat": 52.2100, "lng": 21.0300, "free_beds": 3}
  ],
  "rescue_stations": [
    {"id": 1, "lat": 52.2297, "lng": 21.0122}
  ],
  "key_zones": [
    {"id": 1, "lat": 52.2200, "lng": 21.0100},
    {"id": 2, "lat": 52.2450, "lng": 20.9950}
  ]
}"#;

const SCENARIO_JSON: &str = r#"{
  "emergencies": [
    {"id": 101, "timestamp": "2025-01-27-08-00-00", "lat": 52.2310, "lng": 21.0060, "hospitals": [10, 11]},
    {"id": 102, "timestamp": "2025-01-27-08-04-00", "lat": 52.2050, "lng": 21.0450, "hospitals": [11]},
    {"id": 103, "timestamp": "2025-01-27-08-04-00", "lat": 52.2480, "lng": 20.9850, "hospitals": [10]},
    {"id": 104, "timestamp": "2025-01-27-08-20-00", "lat": 52.2150, "lng": 21.0200, "hospitals": [10, 11]},
    {"id": 105, "timestamp": "2025-01-27-08-45-00", "lat": 52.2400, "lng": 21.0000, "hospitals": [10]},
    {"id": 106, "timestamp": "2025-01-27-09-10-00", "lat": 52.2250, "lng": 21.0250, "hospitals": [11, 10]}
  ]
}"#;

const OUTPUT_DIR: &str = "output/quickstart";

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    // 1. Configuration: defaults, or a JSON file named on the command line.
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str::<SimConfig>(&text).with_context(|| format!("parsing {path}"))?
        }
        None => SimConfig::default(),
    };
    info!(
        tick_minutes = config.tick_minutes,
        max_ticks = config.max_ticks,
        seed = config.seed,
        speed_kmh = config.speed_kmh,
        "configuration loaded"
    );

    // 2. World.
    let mut state = load_map_reader(MAP_JSON.as_bytes(), "embedded map")?;
    let calls = load_scenario_reader(&mut state, SCENARIO_JSON.as_bytes(), "embedded scenario")?;
    info!(
        ambulances = state.ambulances().len(),
        hospitals = state.hospitals().len(),
        calls,
        start = %state.now(),
        "world loaded"
    );

    // 3. Sim.
    let policy = NearestAvailablePolicy::new(config.seed);
    let mut sim = SimBuilder::new(config, state, policy).build()?;

    // 4. Output: event log and CSV tables side by side.
    let out = Path::new(OUTPUT_DIR);
    fs::create_dir_all(out).with_context(|| format!("creating {OUTPUT_DIR}"))?;
    let log = TextEventLog::new(BufWriter::new(File::create(out.join("events.log"))?))?;
    let tables = SimOutputObserver::new(CsvWriter::new(out)?);
    let mut obs = (log, tables);

    // 5. Run.
    let t0 = Instant::now();
    let summary = sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.0.take_error() {
        warn!("event log incomplete: {e}");
    }
    if let Some(e) = obs.1.take_error() {
        warn!("csv output incomplete: {e}");
    }

    // 6. Report.
    println!();
    println!("Simulated {} ticks in {:.3} s", summary.ticks, elapsed.as_secs_f64());
    println!("  policy               : {}", summary.policy);
    println!("  all resolved         : {}", summary.all_resolved);
    println!("  resolved emergencies : {}", summary.stats.resolved_count);
    println!("  average total wait   : {:.2} min", summary.stats.avg_total_wait_min);
    println!("  median total wait    : {:.2} min", summary.stats.median_total_wait_min);
    println!("  score                : {:.2}", summary.score);
    println!();

    println!("{:<10} {:<10}", "Hospital", "Free beds");
    println!("{}", "-".repeat(20));
    for h in sim.state.hospitals() {
        println!("{:<10} {:<10}", h.id().0, h.free_beds());
    }
    println!();
    println!("Output written to {OUTPUT_DIR}/");

    Ok(())
}
