use clap::Parser;
use fireworks_core::{
    FireworkRule, FireworkSimulation, ForceSpec, RuleTable, SimulationConfig, TickReport, Vector3D,
};
use std::error::Error;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Headless fireworks show with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "fireworks-headless")]
#[command(about = "Fireworks particle simulation without a renderer", long_about = None)]
struct Args {
    /// Simulation duration in seconds
    #[arg(short, long, default_value_t = 10.0)]
    duration: f64,

    /// Tick length in seconds
    #[arg(long, default_value_t = 0.016)]
    dt: f64,

    /// Seconds between root launches (0 = single launch at t=0)
    #[arg(short, long, default_value_t = 1.0)]
    launch_interval: f64,

    /// Kind launched as the root firework
    #[arg(short, long, default_value_t = 1)]
    kind: u32,

    /// Seed for reproducible runs (random if omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Rule table JSON file (built-in classic show if omitted)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Linear drag coefficient applied to every firework
    #[arg(long, default_value_t = 0.0)]
    drag_k1: f64,

    /// Quadratic drag coefficient applied to every firework
    #[arg(long, default_value_t = 0.0)]
    drag_k2: f64,

    /// Extra gravity force in m/s² applied to every firework (on top of rule gravity)
    #[arg(long, default_value_t = 0.0)]
    extra_gravity: f64,

    /// Report interval in seconds
    #[arg(short, long, default_value_t = 0.5)]
    report_interval: f64,

    /// Write the active rule table to this JSON file and exit
    #[arg(long)]
    dump_rules: Option<PathBuf>,

    /// Run validation checks instead of a show
    #[arg(short, long)]
    validate: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if args.validate {
        run_validation_checks();
        return Ok(());
    }

    println!("=== Fireworks Simulation ===\n");

    let rules = match &args.rules {
        Some(path) => {
            println!("Loading rule table from {}", path.display());
            RuleTable::load(path)?
        }
        None => RuleTable::classic(),
    };

    if let Some(path) = &args.dump_rules {
        rules.save(path)?;
        println!("Wrote {} rules to {}", rules.len(), path.display());
        return Ok(());
    }

    if args.dt.is_nan() || args.dt <= 0.0 {
        warn!("Non-positive tick length {}s: the show would never advance", args.dt);
        return Ok(());
    }

    let mut config = SimulationConfig::default().with_dt(args.dt);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if args.drag_k1 != 0.0 || args.drag_k2 != 0.0 {
        config = config.with_ambient_force(ForceSpec::Drag {
            k1: args.drag_k1,
            k2: args.drag_k2,
        });
    }
    if args.extra_gravity != 0.0 {
        config = config.with_ambient_force(ForceSpec::Gravity {
            gravity: Vector3D::new(0.0, -args.extra_gravity, 0.0),
        });
    }

    println!("Rules: {}", rules.len());
    for rule in rules.rules() {
        println!(
            "  kind {}: fuse {:.2}-{:.2}s, damping {:.2}, burst {}",
            rule.kind,
            rule.min_age,
            rule.max_age,
            rule.damping,
            rule.burst_size()
        );
    }
    let seed = match args.seed {
        Some(seed) => seed.to_string(),
        None => "random".to_string(),
    };
    println!(
        "Duration: {:.1}s, dt: {}s, launch every {:.1}s, seed: {}\n",
        args.duration, args.dt, args.launch_interval, seed
    );

    let mut sim = FireworkSimulation::new(rules, config);

    println!("Time(s) | Live | Expired | Spawned | Highest(m) | Launched");
    println!("--------|------|---------|---------|------------|---------");

    let mut next_launch = 0.0;
    let mut next_report = 0.0;
    let mut window = TickReport::default();
    let mut total_expired = 0;
    let mut total_spawned = 0;
    let mut peak_live = 0;

    while sim.elapsed() < args.duration {
        let time = sim.elapsed();

        if time >= next_launch {
            sim.launch(args.kind)?;
            next_launch = if args.launch_interval > 0.0 {
                next_launch + args.launch_interval
            } else {
                f64::INFINITY
            };
        }

        let report = sim.tick();

        window.expired += report.expired;
        window.spawned += report.spawned;
        total_expired += report.expired;
        total_spawned += report.spawned;
        peak_live = peak_live.max(report.live);

        if sim.elapsed() >= next_report {
            print_report_row(&sim, &window);
            window = TickReport::default();
            next_report += args.report_interval.max(args.dt);
        }
    }

    println!("\n=== Simulation Complete ===");
    println!("Simulated time: {:.2}s", sim.elapsed());
    println!("Root launches: {}", sim.total_launched());
    println!("Children spawned: {}", total_spawned);
    println!("Fireworks expired: {}", total_expired);
    println!("Peak live fireworks: {}", peak_live);
    println!("Still airborne: {}", sim.len());

    info!(
        "Show finished after {:.2}s with {} launches",
        sim.elapsed(),
        sim.total_launched()
    );

    Ok(())
}

fn print_report_row(sim: &FireworkSimulation, window: &TickReport) {
    let highest = sim
        .fireworks()
        .iter()
        .map(|f| f.position().y)
        .fold(0.0_f64, f64::max);

    println!(
        "{:7.2} | {:4} | {:7} | {:7} | {:10.1} | {:8}",
        sim.elapsed(),
        sim.len(),
        window.expired,
        window.spawned,
        highest,
        sim.total_launched()
    );
}

/// Quick physics sanity checks printed as PASS/FAIL lines
fn run_validation_checks() {
    println!("=== Validation Checks ===\n");

    // Damping is frame-rate independent: one 0.1s step equals two 0.05s steps
    let damping = 0.9_f64;
    let whole = damping.powf(0.1);
    let halves = damping.powf(0.05).powi(2);
    let ok = (whole - halves).abs() < 1e-9;
    println!(
        "Damping split 0.1s vs 2x0.05s: {:.12} vs {:.12} {}",
        whole,
        halves,
        verdict(ok)
    );

    // A classic rocket bursts into exactly its payload
    let rules = RuleTable::classic();
    let expected = rules.rule(1).map_or(0, FireworkRule::burst_size);
    let mut sim = FireworkSimulation::new(rules, SimulationConfig::default().with_seed(1));
    let spawned = match sim.launch(1) {
        Ok(_) => (0..1000).map(|_| sim.tick().spawned).sum::<usize>(),
        Err(e) => {
            println!("Launch failed: {e}");
            0
        }
    };
    println!(
        "Rocket burst size: {} (expected {}) {}",
        spawned,
        expected,
        verdict(spawned == expected)
    );

    // Everything eventually burns out or hits the ground
    println!(
        "Show empties itself: {} live after {:.1}s {}",
        sim.len(),
        sim.elapsed(),
        verdict(sim.is_empty())
    );
}

fn verdict(ok: bool) -> &'static str {
    if ok {
        "✓ PASS"
    } else {
        "✗ FAIL"
    }
}
