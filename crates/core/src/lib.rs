//! Fireworks Particle Engine Core Library
//!
//! Point-mass particle simulation with accumulated forces, a fixed-timestep
//! integrator and a rule-driven spawn engine: rockets burst into sparks when their
//! fuse runs out.
//!
//! ## Layout
//!
//! - [`core_types`] - 3D vector algebra ([`Vector3D`])
//! - [`particle`] - point mass, force accumulator and integrator
//! - [`forces`] - gravity and drag generators plus the per-particle force registry
//! - [`firework`] - firework particles and their alive/expired lifecycle
//! - [`rules`] - firework rules, payloads and the validated rule table
//! - [`simulation`] - the tick driver owning the live firework set
//!
//! ## Quick start
//!
//! ```
//! use fireworks_core::{FireworkSimulation, RuleTable, SimulationConfig};
//!
//! let mut sim = FireworkSimulation::new(
//!     RuleTable::classic(),
//!     SimulationConfig::default().with_seed(1),
//! );
//! sim.launch(1).unwrap();
//!
//! // Two simulated seconds at 60 Hz: the rocket bursts and its sparks burn out
//! for _ in 0..125 {
//!     sim.tick();
//! }
//! assert_eq!(sim.total_launched(), 1);
//! ```

// Core types and utilities
pub mod core_types;

// Physics
pub mod forces;
pub mod particle;

// Firework lifecycle
pub mod firework;
pub mod rules;
pub mod simulation;

// Re-export core types
pub use core_types::Vector3D;

// Re-export physics types
pub use forces::{
    DragGenerator, ForceGenerator, ForceRegistration, ForceRegistry, ForceSpec, GravityGenerator,
    ParticleSet, STANDARD_GRAVITY,
};
pub use particle::{Particle, ParticleId};

// Re-export firework types
pub use firework::{Color, Firework, FireworkKind, FireworkState, ParentSnapshot};
pub use rules::{ColorScheme, ConfigError, FireworkRule, Payload, RuleTable, RuleTableError};
pub use simulation::{FireworkSimulation, SimulationConfig, SimulationError, TickReport, DEFAULT_DT};
