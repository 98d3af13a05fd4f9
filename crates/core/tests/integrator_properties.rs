//! Integrator and force composition properties
//!
//! Checks the numerical contracts the firework engine relies on:
//! - Non-positive timesteps leave particles untouched
//! - Exponential damping is independent of how a span of time is sliced
//! - Force generators compose additively, so registration order cannot matter
//! - User-defined generators plug into the registry like the built-in ones
//!
//! Run tests with: cargo test --test `integrator_properties`

use approx::assert_relative_eq;
use fireworks_core::{
    DragGenerator, ForceGenerator, ForceRegistry, GravityGenerator, Particle, ParticleId,
    Vector3D, STANDARD_GRAVITY,
};
use std::sync::Arc;

const TOLERANCE: f64 = 1e-9;

/// Hooke spring pulling a particle toward a fixed anchor
#[derive(Debug)]
struct AnchoredSpring {
    anchor: Vector3D,
    stiffness: f64,
}

impl ForceGenerator for AnchoredSpring {
    fn update_force(&self, particle: &mut Particle, _dt: f64) {
        let stretch = particle.position() - self.anchor;
        particle.add_force(stretch * -self.stiffness);
    }
}

fn projectile() -> Particle {
    Particle::new(Vector3D::new(0.0, 2.0, 0.0))
        .with_velocity(Vector3D::new(12.0, 30.0, -4.0))
        .with_damping(0.97)
}

#[test]
fn test_non_positive_dt_leaves_state_unchanged() {
    for dt in [0.0, -1e-9, -0.016, -10.0] {
        let mut p = projectile();
        p.add_force(Vector3D::new(3.0, -2.0, 1.0));
        p.integrate(dt);

        assert_eq!(p.position(), Vector3D::new(0.0, 2.0, 0.0));
        assert_eq!(p.velocity(), Vector3D::new(12.0, 30.0, -4.0));
        assert_eq!(p.force_accum(), Vector3D::new(3.0, -2.0, 1.0));
    }
}

#[test]
fn test_damping_follows_exponential_law() {
    for damping in [0.5_f64, 0.9, 0.99, 1.0] {
        for delta in [0.016, 0.1, 1.0] {
            assert_relative_eq!(
                damping.powf(delta),
                damping.powf(delta / 2.0).powi(2),
                epsilon = TOLERANCE
            );

            let mut whole = Particle::default()
                .with_velocity(Vector3D::new(5.0, -3.0, 8.0))
                .with_damping(damping);
            let mut halves = whole.clone();

            whole.integrate(delta);
            halves.integrate(delta / 2.0);
            halves.integrate(delta / 2.0);

            assert_relative_eq!(*whole.velocity(), *halves.velocity(), epsilon = TOLERANCE);
        }
    }
}

#[test]
fn test_generator_order_is_irrelevant() {
    let generators: Vec<Arc<dyn ForceGenerator>> = vec![
        Arc::new(GravityGenerator::standard()),
        Arc::new(DragGenerator::new(0.2, 0.01)),
        Arc::new(AnchoredSpring {
            anchor: Vector3D::new(1.0, 1.0, 1.0),
            stiffness: 4.0,
        }),
    ];
    let id = ParticleId::new(0);

    let orders: [[usize; 3]; 3] = [[0, 1, 2], [2, 1, 0], [1, 2, 0]];
    let mut results = Vec::new();

    for order in orders {
        let mut registry = ForceRegistry::new();
        for index in order {
            registry.add(id, Arc::clone(&generators[index]));
        }

        let mut set = vec![(id, projectile())];
        for _ in 0..60 {
            registry.update_forces(0.016, set.as_mut_slice());
            set[0].1.integrate(0.016);
        }
        results.push(set[0].1.clone());
    }

    for other in &results[1..] {
        assert_relative_eq!(*results[0].position(), *other.position(), epsilon = 1e-6);
        assert_relative_eq!(*results[0].velocity(), *other.velocity(), epsilon = 1e-6);
    }
}

#[test]
fn test_gravity_generator_matches_base_acceleration() {
    // A gravity force on a 3 kg particle must accelerate it exactly like a base
    // acceleration of -g would
    let mut forced = projectile();
    forced.set_mass(3.0);
    let mut based = projectile().with_acceleration(Vector3D::new(0.0, -STANDARD_GRAVITY, 0.0));

    let gravity = GravityGenerator::standard();
    for _ in 0..100 {
        gravity.update_force(&mut forced, 0.016);
        forced.integrate(0.016);
        based.integrate(0.016);
    }

    assert_relative_eq!(*forced.position(), *based.position(), epsilon = 1e-9);
    assert_relative_eq!(*forced.velocity(), *based.velocity(), epsilon = 1e-9);
}

#[test]
fn test_forces_last_one_tick() {
    let mut p = Particle::default();
    p.add_force(Vector3D::new(10.0, 0.0, 0.0));
    p.integrate(0.1);
    let after_push = p.velocity();

    // No force re-applied: velocity stays constant (no damping, no base acceleration)
    p.integrate(0.1);
    assert_eq!(p.velocity(), after_push);
    assert_relative_eq!(after_push.x, 1.0, epsilon = TOLERANCE);
}
