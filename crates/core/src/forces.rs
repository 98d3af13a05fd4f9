//! Force generators and the per-particle force registry
//!
//! A [`ForceGenerator`] contributes a force to a single particle for one tick by
//! writing into its accumulator. The [`ForceRegistry`] pairs particles with the
//! generators acting on them and applies every pairing once per tick, before
//! integration.
//!
//! Registrations hold a [`ParticleId`] handle rather than a reference: the particle
//! set is owned by the simulation driver and passed to
//! [`ForceRegistry::update_forces`] each tick. A registration whose particle is no
//! longer in the set is skipped, and the driver removes registrations for expired
//! particles in the same tick they die.
//!
//! Forces are additive, so the physical result of a tick does not depend on the
//! order registrations are applied in. The registry still applies them in
//! registration order so runs are reproducible bit for bit.

use crate::core_types::Vector3D;
use crate::particle::{Particle, ParticleId};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Magnitude of the downward gravitational acceleration (units/s²)
pub const STANDARD_GRAVITY: f64 = 9.8;

/// Something that can push on a particle for one tick
///
/// Implementations must only touch the particle through
/// [`Particle::add_force`] so contributions stay additive.
pub trait ForceGenerator: fmt::Debug + Send + Sync {
    /// Add this generator's force for the current tick to `particle`
    ///
    /// # Arguments
    ///
    /// * `particle` - Particle receiving the force
    /// * `dt` - Length of the tick in seconds
    fn update_force(&self, particle: &mut Particle, dt: f64);
}

/// Uniform gravitational field: `F = m × g`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GravityGenerator {
    pub gravity: Vector3D,
}

impl GravityGenerator {
    pub fn new(gravity: Vector3D) -> Self {
        Self { gravity }
    }

    /// Standard downward gravity along -y
    pub fn standard() -> Self {
        Self::new(Vector3D::new(0.0, -STANDARD_GRAVITY, 0.0))
    }
}

impl ForceGenerator for GravityGenerator {
    fn update_force(&self, particle: &mut Particle, _dt: f64) {
        // Infinite mass: there is no finite force that would move it
        if !particle.has_finite_mass() {
            return;
        }

        particle.add_force(self.gravity.scaled(particle.mass()));
    }
}

/// Velocity-dependent air resistance
///
/// ```text
/// |F| = k1 × |v| + k2 × |v|²,  F points against v
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragGenerator {
    /// Linear drag coefficient
    pub k1: f64,
    /// Quadratic drag coefficient
    pub k2: f64,
}

impl DragGenerator {
    pub fn new(k1: f64, k2: f64) -> Self {
        Self { k1, k2 }
    }
}

impl ForceGenerator for DragGenerator {
    fn update_force(&self, particle: &mut Particle, _dt: f64) {
        let mut force = particle.velocity();

        let speed = force.magnitude();
        let drag_coeff = self.k1 * speed + self.k2 * speed * speed;

        // A particle at rest normalizes to zero and receives no drag
        force.normalize();
        force.scalar_multiply(-drag_coeff);

        particle.add_force(force);
    }
}

/// Serializable description of a generator, used by simulation config
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ForceSpec {
    Gravity { gravity: Vector3D },
    Drag { k1: f64, k2: f64 },
}

impl ForceSpec {
    /// Instantiate the described generator
    pub fn build(&self) -> Arc<dyn ForceGenerator> {
        match *self {
            ForceSpec::Gravity { gravity } => Arc::new(GravityGenerator::new(gravity)),
            ForceSpec::Drag { k1, k2 } => Arc::new(DragGenerator::new(k1, k2)),
        }
    }
}

/// Mutable lookup of particles by handle
///
/// Implemented by whatever collection owns the live particles.
pub trait ParticleSet {
    /// The particle with handle `id`, if it is still alive
    fn particle_mut(&mut self, id: ParticleId) -> Option<&mut Particle>;
}

/// Unordered `(id, particle)` pairs, looked up by linear scan.
///
/// Meant for small hand-built sets driving a registry outside
/// `FireworkSimulation`; large live sets should keep themselves sorted and
/// binary search instead, as `[Firework]` does.
impl ParticleSet for [(ParticleId, Particle)] {
    fn particle_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.iter_mut()
            .find(|(candidate, _)| *candidate == id)
            .map(|(_, particle)| particle)
    }
}

/// One (particle, generator) pairing
#[derive(Debug, Clone)]
pub struct ForceRegistration {
    pub particle: ParticleId,
    pub generator: Arc<dyn ForceGenerator>,
}

/// Ordered list of (particle, generator) pairings
#[derive(Debug, Default, Clone)]
pub struct ForceRegistry {
    registrations: Vec<ForceRegistration>,
}

impl ForceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `generator` to act on `particle`.
    ///
    /// A particle may carry several generators and one generator may be shared
    /// between many particles.
    pub fn add(&mut self, particle: ParticleId, generator: Arc<dyn ForceGenerator>) {
        self.registrations.push(ForceRegistration {
            particle,
            generator,
        });
    }

    /// Remove the pairing of `particle` with this exact generator instance.
    ///
    /// Returns `true` if a pairing was removed.
    pub fn remove(&mut self, particle: ParticleId, generator: &Arc<dyn ForceGenerator>) -> bool {
        let position = self
            .registrations
            .iter()
            .position(|r| r.particle == particle && Arc::ptr_eq(&r.generator, generator));
        if let Some(index) = position {
            self.registrations.remove(index);
            true
        } else {
            false
        }
    }

    /// Drop every pairing that targets `particle`; returns how many were removed
    pub fn remove_particle(&mut self, particle: ParticleId) -> usize {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.particle != particle);
        before - self.registrations.len()
    }

    /// Drop every pairing targeting one of `particles`; returns how many were removed
    pub fn remove_particles(&mut self, particles: &FxHashSet<ParticleId>) -> usize {
        if particles.is_empty() {
            return 0;
        }
        let before = self.registrations.len();
        self.registrations
            .retain(|r| !particles.contains(&r.particle));
        before - self.registrations.len()
    }

    /// Keep only pairings whose particle satisfies `keep`; returns how many were
    /// removed
    pub fn retain_particles<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(ParticleId) -> bool,
    {
        let before = self.registrations.len();
        self.registrations.retain(|r| keep(r.particle));
        before - self.registrations.len()
    }

    /// Remove all pairings. Particle state is not touched.
    pub fn clear(&mut self) {
        self.registrations.clear();
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Pairings in registration order
    pub fn registrations(&self) -> &[ForceRegistration] {
        &self.registrations
    }

    /// Apply every registered generator to its particle, once, in registration order.
    ///
    /// Pairings whose particle is missing from `particles` are skipped.
    ///
    /// # Returns
    ///
    /// Number of pairings that were applied
    pub fn update_forces<S>(&self, dt: f64, particles: &mut S) -> usize
    where
        S: ParticleSet + ?Sized,
    {
        let mut applied = 0;
        for registration in &self.registrations {
            let Some(particle) = particles.particle_mut(registration.particle) else {
                debug!(
                    "Skipping force registration for missing particle {}",
                    registration.particle
                );
                continue;
            };
            registration.generator.update_force(particle, dt);
            applied += 1;
        }
        applied
    }
}
