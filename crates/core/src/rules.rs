//! Firework rules: how each kind is born and what it bursts into
//!
//! A [`FireworkRule`] is a template keyed by a 1-based [`FireworkKind`]. It defines
//! the lifespan range, the launch velocity spread and damping of new fireworks of
//! that kind, plus the [`Payload`]s released when one expires.
//!
//! Rules live in a [`RuleTable`], a flat list where the rule for kind `k` sits at
//! index `k - 1`. The table is validated once, when it is built, so the simulation
//! never has to deal with dangling payload references mid-run.
//!
//! # Example
//!
//! ```
//! use fireworks_core::{RuleTable, ParticleId};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let rules = RuleTable::classic();
//! let mut rng = StdRng::seed_from_u64(7);
//!
//! let rocket = rules.rule(1).unwrap().create(ParticleId::new(0), None, &mut rng);
//! assert_eq!(rocket.kind(), 1);
//! assert!(rocket.velocity().y >= 25.0);
//! ```

use crate::core_types::Vector3D;
use crate::firework::{Color, Firework, FireworkKind, ParentSnapshot};
use crate::forces::STANDARD_GRAVITY;
use crate::particle::{Particle, ParticleId};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// `count` children of kind `kind`, released when the parent expires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub kind: FireworkKind,
    pub count: u32,
}

impl Payload {
    pub fn new(kind: FireworkKind, count: u32) -> Self {
        Self { kind, count }
    }
}

/// How fireworks created by a rule are colored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    Fixed(Color),
    /// Each firework draws its own random color
    #[default]
    Random,
}

/// Template for one firework kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireworkRule {
    /// Kind managed by this rule (1-based)
    pub kind: FireworkKind,
    /// Shortest fuse, seconds
    pub min_age: f64,
    /// Longest fuse, seconds
    pub max_age: f64,
    /// Lower corner of the launch velocity box
    pub min_velocity: Vector3D,
    /// Upper corner of the launch velocity box
    pub max_velocity: Vector3D,
    pub damping: f64,
    #[serde(default)]
    pub payloads: Vec<Payload>,
    #[serde(default)]
    pub color: ColorScheme,
}

impl FireworkRule {
    /// Create a firework of this rule's kind.
    ///
    /// Children (`parent` is `Some`) start at the parent's position with the
    /// parent's velocity; root launches start at rest at the origin. In both cases
    /// the velocity then gets a random offset drawn per axis from
    /// `[min_velocity, max_velocity]`, and the fuse is drawn from
    /// `[min_age, max_age]`.
    ///
    /// The rule is expected to have passed [`RuleTable::new`] validation.
    pub fn create<R: Rng + ?Sized>(
        &self,
        id: ParticleId,
        parent: Option<ParentSnapshot>,
        rng: &mut R,
    ) -> Firework {
        let age = random_range(rng, self.min_age, self.max_age);

        let (position, mut velocity) = match parent {
            Some(snapshot) => (snapshot.position, snapshot.velocity),
            None => (Vector3D::zeros(), Vector3D::zeros()),
        };
        velocity.add_vector(random_vector(rng, self.min_velocity, self.max_velocity));

        let mut particle = Particle::new(position)
            .with_velocity(velocity)
            .with_acceleration(Vector3D::new(0.0, -STANDARD_GRAVITY, 0.0))
            .with_damping(self.damping)
            .with_inverse_mass(1.0);
        particle.clear_accumulator();

        let color = match self.color {
            ColorScheme::Fixed(color) => color,
            ColorScheme::Random => Color::random(rng),
        };

        Firework::new(id, self.kind, particle, age, color)
    }

    /// Total number of children one expiry of this rule releases
    pub fn burst_size(&self) -> usize {
        self.payloads.iter().map(|p| p.count as usize).sum()
    }

    fn validate(&self, index: usize, table_len: usize) -> Result<(), RuleTableError> {
        let kind = self.kind;
        let expected = index as u64 + 1;
        if u64::from(kind) != expected {
            return Err(RuleTableError::KindMismatch { index, kind });
        }

        // Uniform sampling needs the span itself to be representable
        if !(self.min_age.is_finite()
            && self.max_age.is_finite()
            && (self.max_age - self.min_age).is_finite())
        {
            return Err(RuleTableError::NonFinite { kind, field: "age" });
        }
        if self.min_age > self.max_age {
            return Err(RuleTableError::AgeRange {
                kind,
                min: self.min_age,
                max: self.max_age,
            });
        }

        if !(self.min_velocity.is_finite() && self.max_velocity.is_finite()) {
            return Err(RuleTableError::NonFinite {
                kind,
                field: "velocity",
            });
        }
        let axes = [
            ('x', self.min_velocity.x, self.max_velocity.x),
            ('y', self.min_velocity.y, self.max_velocity.y),
            ('z', self.min_velocity.z, self.max_velocity.z),
        ];
        for (axis, min, max) in axes {
            if !(max - min).is_finite() {
                return Err(RuleTableError::NonFinite {
                    kind,
                    field: "velocity",
                });
            }
            if min > max {
                return Err(RuleTableError::VelocityRange {
                    kind,
                    axis,
                    min,
                    max,
                });
            }
        }

        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(RuleTableError::Damping {
                kind,
                damping: self.damping,
            });
        }

        for payload in &self.payloads {
            let in_table = payload.kind >= 1 && (payload.kind as usize) <= table_len;
            if !in_table {
                return Err(RuleTableError::UnknownPayloadKind {
                    kind,
                    payload_kind: payload.kind,
                });
            }
        }

        Ok(())
    }
}

/// Uniform value in `[min, max]`; `min == max` yields `min`
fn random_range<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    rng.random_range(min..=max)
}

/// Vector with each component uniform in `[min.c, max.c]`
fn random_vector<R: Rng + ?Sized>(rng: &mut R, min: Vector3D, max: Vector3D) -> Vector3D {
    Vector3D::new(
        random_range(rng, min.x, max.x),
        random_range(rng, min.y, max.y),
        random_range(rng, min.z, max.z),
    )
}

/// Reasons a rule table is rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleTableError {
    #[error("rule table is empty")]
    Empty,
    #[error("rule at index {index} has kind {kind}, expected kind {}", .index + 1)]
    KindMismatch { index: usize, kind: FireworkKind },
    #[error("rule {kind}: {field} bounds and their span must be finite")]
    NonFinite {
        kind: FireworkKind,
        field: &'static str,
    },
    #[error("rule {kind}: min_age {min} exceeds max_age {max}")]
    AgeRange {
        kind: FireworkKind,
        min: f64,
        max: f64,
    },
    #[error("rule {kind}: min_velocity.{axis} {min} exceeds max_velocity.{axis} {max}")]
    VelocityRange {
        kind: FireworkKind,
        axis: char,
        min: f64,
        max: f64,
    },
    #[error("rule {kind}: damping {damping} must be in (0, 1]")]
    Damping { kind: FireworkKind, damping: f64 },
    #[error("rule {kind}: payload references kind {payload_kind}, which has no rule")]
    UnknownPayloadKind {
        kind: FireworkKind,
        payload_kind: FireworkKind,
    },
}

/// Failure loading or saving a rule table file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access rule file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse rule file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid rule table: {0}")]
    Invalid(#[from] RuleTableError),
}

/// Validated, read-only set of rules indexed by `kind - 1`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RuleTable {
    rules: Vec<FireworkRule>,
}

impl RuleTable {
    /// Validate and wrap a list of rules.
    ///
    /// # Errors
    ///
    /// Returns [`RuleTableError`] if the list is empty, if a rule's kind does not
    /// match its position, if any range is inverted or non-finite, if damping is
    /// outside (0, 1], or if a payload names a kind with no rule.
    pub fn new(rules: Vec<FireworkRule>) -> Result<Self, RuleTableError> {
        if rules.is_empty() {
            return Err(RuleTableError::Empty);
        }
        for (index, rule) in rules.iter().enumerate() {
            rule.validate(index, rules.len())?;
        }
        Ok(Self { rules })
    }

    /// Rocket that bursts into twenty sparks
    ///
    /// - kind 1 (rocket): fuse 0.5-1.5 s, launch velocity (-5, 25, -5)..(5, 35, 5),
    ///   damping 0.99, red, bursts into 20 × kind 2
    /// - kind 2 (spark): fuse 0.5-1.0 s, spread ±20 on every axis, damping 0.9,
    ///   random color, no payload
    pub fn classic() -> Self {
        Self {
            rules: vec![
                FireworkRule {
                    kind: 1,
                    min_age: 0.5,
                    max_age: 1.5,
                    min_velocity: Vector3D::new(-5.0, 25.0, -5.0),
                    max_velocity: Vector3D::new(5.0, 35.0, 5.0),
                    damping: 0.99,
                    payloads: vec![Payload::new(2, 20)],
                    color: ColorScheme::Fixed(Color::RED),
                },
                FireworkRule {
                    kind: 2,
                    min_age: 0.5,
                    max_age: 1.0,
                    min_velocity: Vector3D::new(-20.0, -20.0, -20.0),
                    max_velocity: Vector3D::new(20.0, 20.0, 20.0),
                    damping: 0.9,
                    payloads: Vec::new(),
                    color: ColorScheme::Random,
                },
            ],
        }
    }

    /// Parse and validate a JSON array of rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] on malformed input and
    /// [`ConfigError::Invalid`] if the rules fail validation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let rules: Vec<FireworkRule> = serde_json::from_str(json)?;
        Ok(Self::new(rules)?)
    }

    /// Load and validate a rule table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Write the table as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if serialization or the write fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Pretty-printed JSON form of the table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(&self.rules)?)
    }

    /// Rule governing `kind`, or `None` if `kind` is outside the table
    pub fn rule(&self, kind: FireworkKind) -> Option<&FireworkRule> {
        let index = (kind as usize).checked_sub(1)?;
        self.rules.get(index)
    }

    pub fn rules(&self) -> &[FireworkRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
