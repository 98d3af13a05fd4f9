//! Fixed-timestep driver owning the live firework set
//!
//! [`FireworkSimulation`] runs the whole lifecycle, one tick at a time:
//!
//! 1. Apply every registered force generator to its firework
//! 2. Integrate and age every firework
//! 3. Drop expired fireworks, expanding the payloads of those with a rule into
//!    fresh children launched from the parent's last position and velocity
//!
//! Children are appended after the survivors. Ids only ever grow, so the live set
//! stays sorted by id and the force registry can look particles up by handle.
//!
//! All randomness comes from one generator owned by the simulation. Setting
//! [`SimulationConfig::seed`] makes runs reproducible.

use crate::firework::{Firework, FireworkKind};
use crate::forces::{ForceGenerator, ForceRegistry, ForceSpec};
use crate::particle::ParticleId;
use crate::rules::RuleTable;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default tick length (60 Hz)
pub const DEFAULT_DT: f64 = 0.016;

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Tick length used by [`FireworkSimulation::tick`], seconds
    pub dt: f64,
    /// Seed for the spawn generator; `None` seeds from OS entropy
    pub seed: Option<u64>,
    /// Generators registered against every firework when it is created
    pub ambient_forces: Vec<ForceSpec>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            seed: None,
            ambient_forces: Vec::new(),
        }
    }
}

impl SimulationConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_ambient_force(mut self, force: ForceSpec) -> Self {
        self.ambient_forces.push(force);
        self
    }
}

/// Errors surfaced by [`FireworkSimulation`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("no rule for firework kind {0}")]
    UnknownKind(FireworkKind),
    #[error("particle ids exhausted; no more fireworks can be created")]
    IdsExhausted,
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Fireworks removed this tick
    pub expired: usize,
    /// Children created from payloads this tick
    pub spawned: usize,
    /// Live fireworks after the tick
    pub live: usize,
}

/// Owner of the live firework set, the force registry and the spawn generator
#[derive(Debug)]
pub struct FireworkSimulation {
    rules: RuleTable,
    config: SimulationConfig,
    fireworks: Vec<Firework>,
    registry: ForceRegistry,
    ambient: Vec<Arc<dyn ForceGenerator>>,
    rng: StdRng,
    next_id: u32,
    elapsed: f64,
    total_launched: usize,
}

impl FireworkSimulation {
    /// Create an empty simulation over a validated rule table
    pub fn new(rules: RuleTable, config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let ambient = config.ambient_forces.iter().map(ForceSpec::build).collect();

        info!(
            "Creating firework simulation: {} rules, dt={}s, seed={:?}, {} ambient forces",
            rules.len(),
            config.dt,
            config.seed,
            config.ambient_forces.len()
        );

        Self {
            rules,
            config,
            fireworks: Vec::new(),
            registry: ForceRegistry::new(),
            ambient,
            rng,
            next_id: 0,
            elapsed: 0.0,
            total_launched: 0,
        }
    }

    /// Launch a root firework of `kind` from the origin.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownKind`] if the rule table has no rule for
    /// `kind`, and [`SimulationError::IdsExhausted`] once every particle id has
    /// been used. Nothing is spawned in either case.
    pub fn launch(&mut self, kind: FireworkKind) -> Result<ParticleId, SimulationError> {
        let rule = self
            .rules
            .rule(kind)
            .ok_or(SimulationError::UnknownKind(kind))?;

        let id = ParticleId::next(&mut self.next_id).ok_or(SimulationError::IdsExhausted)?;
        let firework = rule.create(id, None, &mut self.rng);
        for generator in &self.ambient {
            self.registry.add(id, Arc::clone(generator));
        }

        info!(
            "Launched firework {} of kind {} (fuse {:.2}s, velocity {})",
            id,
            kind,
            firework.age(),
            firework.velocity()
        );

        self.fireworks.push(firework);
        self.total_launched += 1;
        Ok(id)
    }

    /// Advance one tick of the configured length
    pub fn tick(&mut self) -> TickReport {
        self.step(self.config.dt)
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// A non-positive `dt` changes nothing and reports no activity. Once particle
    /// ids run out, expiring fireworks still die but release no children.
    pub fn step(&mut self, dt: f64) -> TickReport {
        if dt.is_nan() || dt <= 0.0 {
            return TickReport {
                live: self.fireworks.len(),
                ..TickReport::default()
            };
        }

        // Drop registrations for ids that were handed out but are no longer live
        let fireworks = &self.fireworks;
        let next_id = self.next_id;
        let orphaned = self.registry.retain_particles(|id| {
            id.get() >= next_id || fireworks.binary_search_by_key(&id, Firework::id).is_ok()
        });

        // 1. Forces
        self.registry
            .update_forces(dt, self.fireworks.as_mut_slice());

        // 2. Integrate + age, 3. expiry and payload expansion
        let mut next_frame = Vec::with_capacity(self.fireworks.len());
        let mut children = Vec::new();
        let mut dead = FxHashSet::default();

        for mut firework in std::mem::take(&mut self.fireworks) {
            if !firework.update(dt).is_expired() {
                next_frame.push(firework);
                continue;
            }

            dead.insert(firework.id);

            // Kinds without a rule are terminal and simply disappear
            let Some(rule) = self.rules.rule(firework.kind) else {
                continue;
            };
            if rule.payloads.is_empty() {
                continue;
            }

            let parent = firework.snapshot();
            for payload in &rule.payloads {
                // Payload kinds are checked when the table is built
                let Some(child_rule) = self.rules.rule(payload.kind) else {
                    continue;
                };
                for _ in 0..payload.count {
                    let Some(id) = ParticleId::next(&mut self.next_id) else {
                        warn!(
                            "Particle ids exhausted: firework {} releases no further children",
                            firework.id
                        );
                        break;
                    };
                    children.push(child_rule.create(id, Some(parent), &mut self.rng));
                }
            }

            debug!(
                "Firework {} (kind {}) burst at {} into {} children",
                firework.id,
                firework.kind,
                parent.position,
                rule.burst_size()
            );
        }

        let removed = self.registry.remove_particles(&dead) + orphaned;
        for child in &children {
            for generator in &self.ambient {
                self.registry.add(child.id, Arc::clone(generator));
            }
        }

        let report = TickReport {
            expired: dead.len(),
            spawned: children.len(),
            live: next_frame.len() + children.len(),
        };

        next_frame.extend(children);
        self.fireworks = next_frame;
        self.elapsed += dt;

        debug!(
            "Tick t={:.3}s: {} expired, {} spawned, {} live, {} registrations dropped",
            self.elapsed, report.expired, report.spawned, report.live, removed
        );

        report
    }

    /// Live fireworks, ordered by id
    pub fn fireworks(&self) -> &[Firework] {
        &self.fireworks
    }

    /// Live firework with handle `id`
    pub fn firework(&self, id: ParticleId) -> Option<&Firework> {
        self.fireworks
            .binary_search_by_key(&id, Firework::id)
            .ok()
            .map(|index| &self.fireworks[index])
    }

    pub fn len(&self) -> usize {
        self.fireworks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fireworks.is_empty()
    }

    /// Simulated seconds since creation
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Root fireworks launched so far
    pub fn total_launched(&self) -> usize {
        self.total_launched
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn registry(&self) -> &ForceRegistry {
        &self.registry
    }

    /// Register extra generators against individual fireworks.
    ///
    /// Registrations for a firework are dropped automatically when it expires.
    /// Ids not handed out yet may be registered ahead of their launch; ids that
    /// were handed out but are no longer live are pruned on the next step.
    pub fn registry_mut(&mut self) -> &mut ForceRegistry {
        &mut self.registry
    }
}
