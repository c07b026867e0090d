//! Siege Line headless runner
//!
//! Plays one full run with the demo bot at fixed frame steps, then submits the
//! result to a local profile store.
//!
//! Usage: `siege-line [config.json] [profile.json]`

use siege_line::audio::LogSink;
use siege_line::consts::SIM_DT;
use siege_line::profile::{LocalProfileStore, ProfileGateway};
use siege_line::sim::GamePhase;
use siege_line::{Engine, GameConfig, Settings};

/// Upper bound on frames so a misconfigured run cannot spin forever
const MAX_FRAMES: u64 = 60 * 60 * 60;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Siege Line (headless) starting...");

    let mut args = std::env::args().skip(1);
    let config_path = args.next();
    let profile_path = args.next();

    let mut config = match config_path.as_deref() {
        Some(path) => match GameConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };
    config.validate();

    let mut store = match profile_path.as_deref() {
        Some(path) => match LocalProfileStore::open(path) {
            Ok(store) => store,
            Err(e) => {
                log::error!("Failed to open profile {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => LocalProfileStore::default(),
    };
    let profile = match store.fetch_profile() {
        Ok(profile) => profile,
        Err(e) => {
            log::error!("Failed to fetch profile: {}", e);
            std::process::exit(1);
        }
    };

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let mut engine = Engine::new(config, profile, Settings::default(), LogSink, seed);
    engine.set_autopilot(true);

    let mut frames = 0;
    loop {
        match engine.phase() {
            // Step through dialogue one line per frame
            GamePhase::Intro { .. } | GamePhase::Victory { .. } => {
                engine.handle_event(siege_line::InputEvent::KeyDown(siege_line::Key::Confirm));
            }
            GamePhase::GameOver | GamePhase::Won | GamePhase::Exited => break,
            GamePhase::Playing | GamePhase::Paused => {}
        }
        engine.frame(SIM_DT);
        frames += 1;
        if frames >= MAX_FRAMES {
            log::warn!("Frame limit reached, stopping");
            break;
        }
    }

    let stats = engine.final_stats();
    let state = engine.state();
    log::info!(
        "Run finished ({:?}) after {}s: score {}, kills {}, base {:.0}, currency {}",
        state.phase,
        state.elapsed_ms() / 1000,
        state.score,
        state.kills,
        state.base_health,
        stats.currency
    );

    if let Err(e) = engine.submit_final_stats(&mut store) {
        log::error!("Could not record run: {}", e);
    }
    engine.cleanup();
    println!(
        "{}",
        serde_json::to_string_pretty(&stats).unwrap_or_else(|_| format!("{:?}", stats))
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser hosts embed the library directly
}
