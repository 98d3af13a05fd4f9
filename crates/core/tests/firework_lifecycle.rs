//! Firework lifecycle validation
//!
//! End-to-end scenarios for the spawn/burst engine driven through
//! `FireworkSimulation`:
//! - Root launches stay inside the rule's velocity box and start at the origin
//! - Rockets burst into exactly their payload, launched from the rocket's final state
//! - Terminal sparks disappear without spawning anything
//! - Ground contact expires a firework whatever its remaining fuse
//!
//! Run tests with: cargo test --test `firework_lifecycle`

use fireworks_core::{
    Color, ColorScheme, FireworkRule, FireworkSimulation, ParticleId, Payload, RuleTable,
    SimulationConfig, Vector3D, DEFAULT_DT,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn rule(kind: u32, min_velocity: Vector3D, max_velocity: Vector3D) -> FireworkRule {
    FireworkRule {
        kind,
        min_age: 0.5,
        max_age: 1.0,
        min_velocity,
        max_velocity,
        damping: 0.9,
        payloads: Vec::new(),
        color: ColorScheme::Random,
    }
}

/// Rocket with a fixed 0.1s fuse bursting into 20 sparks
fn timed_rocket_table(spark_spread: f64) -> RuleTable {
    let mut rocket = rule(
        1,
        Vector3D::new(-5.0, 25.0, -5.0),
        Vector3D::new(5.0, 35.0, 5.0),
    );
    rocket.min_age = 0.1;
    rocket.max_age = 0.1;
    rocket.damping = 0.99;
    rocket.payloads = vec![Payload::new(2, 20)];
    rocket.color = ColorScheme::Fixed(Color::RED);

    let spread = Vector3D::new(spark_spread, spark_spread, spark_spread);
    let spark = rule(2, -spread, spread);

    RuleTable::new(vec![rocket, spark]).unwrap()
}

#[test]
fn test_root_launch_stays_in_velocity_box() {
    let min = Vector3D::new(-5.0, 25.0, -5.0);
    let max = Vector3D::new(5.0, 35.0, 5.0);
    let rocket = rule(1, min, max);
    let mut rng = StdRng::seed_from_u64(2024);

    for i in 0..1000 {
        let fw = rocket.create(ParticleId::new(i), None, &mut rng);
        let v = fw.velocity();

        assert!(v.x >= min.x && v.x <= max.x, "x out of range: {}", v.x);
        assert!(v.y >= min.y && v.y <= max.y, "y out of range: {}", v.y);
        assert!(v.z >= min.z && v.z <= max.z, "z out of range: {}", v.z);
        assert!(fw.age() >= 0.5 && fw.age() <= 1.0);
        assert_eq!(fw.position(), Vector3D::new(0.0, 0.0, 0.0));
    }
}

#[test]
fn test_rocket_bursts_into_payload_from_final_state() {
    let mut sim = FireworkSimulation::new(
        timed_rocket_table(0.0),
        SimulationConfig::default().with_seed(11),
    );
    let rocket_id = sim.launch(1).unwrap();

    loop {
        let mut rocket = sim
            .firework(rocket_id)
            .expect("rocket should still be alive")
            .clone();
        // Same update the simulation is about to apply (no registered forces)
        let state = rocket.update(DEFAULT_DT);

        let report = sim.tick();
        if !state.is_expired() {
            assert_eq!(report.spawned, 0);
            continue;
        }

        assert_eq!(report.expired, 1);
        assert_eq!(report.spawned, 20);
        assert_eq!(sim.len(), 20);
        assert!(sim.firework(rocket_id).is_none());

        // Zero spread: every spark is launched exactly from the rocket's final state
        for spark in sim.fireworks() {
            assert_eq!(spark.kind(), 2);
            assert_eq!(spark.position(), rocket.position());
            assert_eq!(spark.velocity(), rocket.velocity());
            assert!(spark.id() > rocket_id);
        }
        break;
    }
}

#[test]
fn test_burst_spread_is_sampled_per_spark() {
    let spread = 20.0;
    let mut sim = FireworkSimulation::new(
        timed_rocket_table(spread),
        SimulationConfig::default().with_seed(12),
    );
    let rocket_id = sim.launch(1).unwrap();

    let mut parent = None;
    while parent.is_none() {
        let mut rocket = sim.firework(rocket_id).unwrap().clone();
        if rocket.update(DEFAULT_DT).is_expired() {
            parent = Some(rocket.snapshot());
        }
        sim.tick();
    }
    let parent = parent.unwrap();

    assert_eq!(sim.len(), 20);
    let mut offsets = Vec::new();
    for spark in sim.fireworks() {
        assert_eq!(spark.position(), parent.position);
        let offset = spark.velocity() - parent.velocity;
        for c in [offset.x, offset.y, offset.z] {
            assert!(c.abs() <= spread + 1e-9, "offset component {c} outside spread");
        }
        offsets.push(offset);
    }

    // Independent samples: no two sparks share the same spread
    for (i, a) in offsets.iter().enumerate() {
        for b in &offsets[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn test_terminal_sparks_expire_without_spawning() {
    let mut sim = FireworkSimulation::new(
        RuleTable::classic(),
        SimulationConfig::default().with_seed(99),
    );
    for _ in 0..30 {
        sim.launch(2).unwrap();
    }

    let mut saw_expiry = false;
    while !sim.is_empty() {
        let before = sim.len();
        let report = sim.tick();

        assert_eq!(report.spawned, 0);
        assert_eq!(report.live, before - report.expired);
        assert_eq!(sim.len(), report.live);
        saw_expiry |= report.expired > 0;

        assert!(sim.elapsed() < 2.0, "sparks should burn out within their fuse");
    }
    assert!(saw_expiry);
}

#[test]
fn test_ground_contact_expires_regardless_of_fuse() {
    let mut diver = rule(
        1,
        Vector3D::new(-1.0, -10.0, -1.0),
        Vector3D::new(1.0, -5.0, 1.0),
    );
    diver.min_age = 100.0;
    diver.max_age = 100.0;
    diver.payloads = vec![Payload::new(2, 3)];
    let spark = rule(2, Vector3D::zeros(), Vector3D::zeros());
    let rules = RuleTable::new(vec![diver, spark]).unwrap();

    let mut sim = FireworkSimulation::new(rules, SimulationConfig::default().with_seed(4));
    let id = sim.launch(1).unwrap();

    let report = sim.tick();
    assert_eq!(report.expired, 1);
    assert!(sim.firework(id).is_none());

    // The burst still happens; its sparks are already below ground and die next tick
    assert_eq!(report.spawned, 3);
    for spark in sim.fireworks() {
        assert!(spark.position().y < 0.0);
    }
    let report = sim.tick();
    assert_eq!(report.expired, 3);
    assert!(sim.is_empty());
}

#[test]
fn test_classic_show_runs_to_completion() {
    let mut sim = FireworkSimulation::new(
        RuleTable::classic(),
        SimulationConfig::default().with_seed(7),
    );
    for _ in 0..3 {
        sim.launch(1).unwrap();
    }

    let mut total_spawned = 0;
    let mut peak = 0;
    for _ in 0..(5.0 / DEFAULT_DT) as usize {
        let report = sim.tick();
        total_spawned += report.spawned;
        peak = peak.max(report.live);
    }

    // Rockets leave at 25+ units/s upward and burn out while still airborne
    assert_eq!(total_spawned, 60);
    assert!(peak >= 20);
    assert!(sim.is_empty());
}
