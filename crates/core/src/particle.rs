//! Point-mass particle with a per-step force accumulator
//!
//! A [`Particle`] carries position, velocity and a base acceleration (usually
//! gravity), together with a transient force accumulator that force generators
//! write into before each integration step.
//!
//! # Integration
//!
//! [`Particle::integrate`] advances the state by `dt` seconds using explicit Euler
//! for position (pre-update velocity) and velocity, followed by exponential damping:
//!
//! ```text
//! position += velocity × dt
//! a         = acceleration + force_accum × inverse_mass
//! velocity += a × dt
//! velocity *= damping^dt
//! ```
//!
//! Raising damping to the power `dt` keeps drag independent of the tick rate: two
//! half steps decay velocity exactly as much as one full step.
//!
//! The accumulator is cleared at the end of every step, so a force lasts exactly one
//! tick unless it is applied again.
//!
//! # Immovable particles
//!
//! `inverse_mass == 0` means infinite mass. Such a particle receives no acceleration
//! at all (neither accumulated forces nor the base acceleration); it keeps drifting
//! at its current, damped velocity.

use crate::core_types::Vector3D;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle identifying one particle within a simulation.
///
/// Ids are handed out in increasing order and never reused, so a handle held by
/// the force registry can never alias a newer particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ParticleId(u32);

impl ParticleId {
    pub const fn new(raw: u32) -> Self {
        ParticleId(raw)
    }

    /// Raw numeric value
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Hand out the current value of `counter` and advance it.
    ///
    /// Returns `None` once the counter cannot advance any further; the counter is
    /// left untouched so no id is ever handed out twice.
    pub(crate) fn next(counter: &mut u32) -> Option<Self> {
        let id = ParticleId(*counter);
        *counter = counter.checked_add(1)?;
        Some(id)
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Point mass advanced by [`Particle::integrate`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub(crate) position: Vector3D,
    pub(crate) velocity: Vector3D,
    /// Constant acceleration applied every step (e.g. gravity)
    pub(crate) acceleration: Vector3D,
    /// Fraction of velocity kept per second, in (0, 1]. 1 = no drag.
    pub(crate) damping: f64,
    /// 1/mass; 0 = immovable
    pub(crate) inverse_mass: f64,
    #[serde(skip)]
    pub(crate) force_accum: Vector3D,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vector3D::zeros(),
            velocity: Vector3D::zeros(),
            acceleration: Vector3D::zeros(),
            damping: 1.0,
            inverse_mass: 1.0,
            force_accum: Vector3D::zeros(),
        }
    }
}

impl Particle {
    /// Create a unit-mass particle at rest with no damping
    pub fn new(position: Vector3D) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, velocity: Vector3D) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the constant base acceleration
    pub fn with_acceleration(mut self, acceleration: Vector3D) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Set the damping factor (fraction of velocity kept per second)
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the inverse mass directly (0 = immovable)
    pub fn with_inverse_mass(mut self, inverse_mass: f64) -> Self {
        self.inverse_mass = inverse_mass;
        self
    }

    /// Advance the particle by `dt` seconds and clear the force accumulator.
    ///
    /// Non-positive (and NaN) `dt` is a no-op: position, velocity and the
    /// accumulator are left untouched.
    pub fn integrate(&mut self, dt: f64) {
        if dt.is_nan() || dt <= 0.0 {
            return;
        }

        self.position.add_scaled_vector(self.velocity, dt);

        if self.has_finite_mass() {
            let mut resulting_acc = self.acceleration;
            resulting_acc.add_scaled_vector(self.force_accum, self.inverse_mass);
            self.velocity.add_scaled_vector(resulting_acc, dt);
        }

        self.velocity.scalar_multiply(self.damping.powf(dt));

        self.clear_accumulator();
    }

    /// Add a force to be consumed by the next [`integrate`](Self::integrate) call
    #[inline]
    pub fn add_force(&mut self, force: Vector3D) {
        self.force_accum.add_vector(force);
    }

    /// Reset the force accumulator to zero
    #[inline]
    pub fn clear_accumulator(&mut self) {
        self.force_accum = Vector3D::zeros();
    }

    /// False for immovable particles (`inverse_mass == 0`)
    #[inline]
    pub fn has_finite_mass(&self) -> bool {
        self.inverse_mass > 0.0
    }

    /// Mass in simulation units; infinite for immovable particles
    pub fn mass(&self) -> f64 {
        if self.has_finite_mass() {
            1.0 / self.inverse_mass
        } else {
            f64::INFINITY
        }
    }

    /// Set the mass. Non-positive or infinite mass makes the particle immovable.
    pub fn set_mass(&mut self, mass: f64) {
        self.inverse_mass = if mass > 0.0 && mass.is_finite() {
            1.0 / mass
        } else {
            0.0
        };
    }

    /// ½·m·|v|², zero for immovable particles
    pub fn kinetic_energy(&self) -> f64 {
        if self.has_finite_mass() {
            0.5 * self.mass() * self.velocity.square_magnitude()
        } else {
            0.0
        }
    }

    pub fn position(&self) -> Vector3D {
        self.position
    }

    pub fn set_position(&mut self, position: Vector3D) {
        self.position = position;
    }

    pub fn velocity(&self) -> Vector3D {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vector3D) {
        self.velocity = velocity;
    }

    pub fn acceleration(&self) -> Vector3D {
        self.acceleration
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    pub fn inverse_mass(&self) -> f64 {
        self.inverse_mass
    }

    /// Forces accumulated since the last integration step
    pub fn force_accum(&self) -> Vector3D {
        self.force_accum
    }
}
