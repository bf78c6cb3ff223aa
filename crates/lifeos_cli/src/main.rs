//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `lifeos_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use lifeos_core::{simulate_panel, summarize, LifeConfig, ProgressionEngine};
use rand::rngs::StdRng;
use rand::SeedableRng;

const SAMPLE_TOTAL_XP: u64 = 120;
const SAMPLE_SEED: u64 = 7;

fn main() {
    println!("lifeos_core ping={}", lifeos_core::ping());
    println!("lifeos_core version={}", lifeos_core::core_version());

    let config = LifeConfig::default();
    let engine = ProgressionEngine::new(config.progression);
    let xp = engine.user_xp(SAMPLE_TOTAL_XP);
    println!(
        "level total_xp={} level={} current={} next_level={}",
        SAMPLE_TOTAL_XP, xp.level, xp.current, xp.next_level
    );

    // Seeded so the probe prints the same panel on every run.
    let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);
    let panel = simulate_panel(&config.diagnostics, &mut rng);
    for point in &panel {
        println!(
            "reading metric=\"{}\" value={} unit={} status={}",
            point.metric_name,
            point.value,
            point.unit,
            point.status.as_str()
        );
    }
    println!("panel flagged={}", summarize(&panel).flagged());
}
