//! Firework particles and their lifecycle
//!
//! A [`Firework`] is a [`Particle`] plus a countdown `age`, a rule `kind` and a
//! cosmetic color. Each tick [`Firework::update`] integrates the particle, ages it
//! by `dt` and reports whether it is still [`FireworkState::Alive`].
//!
//! A firework expires the moment either condition holds after integration:
//!
//! - `age < 0` (its fuse ran out)
//! - `position.y < 0` (it fell through the ground plane)
//!
//! Expiry is terminal. The simulation removes the firework and, if its kind has a
//! rule, spawns the rule's payloads from the firework's last position and velocity.

use crate::core_types::Vector3D;
use crate::forces::ParticleSet;
use crate::particle::{Particle, ParticleId};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// 1-based rule id identifying what kind of firework this is
pub type FireworkKind = u32;

/// RGBA color for renderers; has no effect on the physics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const RED: Color = Color::rgb(230, 41, 55);
    pub const GOLD: Color = Color::rgb(255, 203, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    /// Opaque color with random channels
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Color::rgb(rng.random(), rng.random(), rng.random())
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Lifecycle state reported by [`Firework::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireworkState {
    Alive,
    /// Terminal: the firework must be removed from the live set
    Expired,
}

impl FireworkState {
    pub fn is_expired(self) -> bool {
        self == FireworkState::Expired
    }
}

/// Position and velocity of a firework at the moment it expired.
///
/// Children are launched from this snapshot; nothing keeps a reference to the
/// parent once it is gone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentSnapshot {
    pub position: Vector3D,
    pub velocity: Vector3D,
}

/// Particle governed by a firework rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Firework {
    pub(crate) id: ParticleId,
    pub(crate) particle: Particle,
    pub(crate) kind: FireworkKind,
    /// Seconds left before the fuse runs out
    pub(crate) age: f64,
    pub(crate) color: Color,
}

impl Firework {
    pub fn new(id: ParticleId, kind: FireworkKind, particle: Particle, age: f64, color: Color) -> Self {
        Self {
            id,
            particle,
            kind,
            age,
            color,
        }
    }

    /// Integrate one tick, burn `dt` seconds off the fuse and report liveness.
    ///
    /// A non-positive `dt` neither moves nor ages the firework; the current state is
    /// reported unchanged.
    pub fn update(&mut self, dt: f64) -> FireworkState {
        if dt > 0.0 {
            self.particle.integrate(dt);
            self.age -= dt;
        }
        self.state()
    }

    /// Liveness without advancing time
    pub fn state(&self) -> FireworkState {
        if self.age < 0.0 || self.particle.position.y < 0.0 {
            FireworkState::Expired
        } else {
            FireworkState::Alive
        }
    }

    /// Snapshot handed to children spawned when this firework expires
    pub fn snapshot(&self) -> ParentSnapshot {
        ParentSnapshot {
            position: self.particle.position,
            velocity: self.particle.velocity,
        }
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }

    pub fn kind(&self) -> FireworkKind {
        self.kind
    }

    pub fn age(&self) -> f64 {
        self.age
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn position(&self) -> Vector3D {
        self.particle.position
    }

    pub fn velocity(&self) -> Vector3D {
        self.particle.velocity
    }

    pub fn particle(&self) -> &Particle {
        &self.particle
    }

    pub fn particle_mut(&mut self) -> &mut Particle {
        &mut self.particle
    }
}

/// Live fireworks are kept ordered by id, so lookup is a binary search
impl ParticleSet for [Firework] {
    fn particle_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        let index = self.binary_search_by_key(&id, |f| f.id).ok()?;
        Some(&mut self[index].particle)
    }
}
