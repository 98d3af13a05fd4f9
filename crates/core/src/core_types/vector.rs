//! 3D vector algebra for particle state
//!
//! [`Vector3D`] wraps `nalgebra::Vector3<f64>` so the simulation gets a single,
//! strongly named vector type with two families of operations:
//!
//! - **In-place modifiers** (`add_vector`, `scalar_multiply`, `add_scaled_vector`, ...)
//!   mutate the receiver and return nothing. These are used on the hot path of
//!   integration.
//! - **Pure operations** (`added`, `scaled`, `cross`, ...) return a new vector and
//!   leave the receiver untouched.
//!
//! Components are readable and writable through `Deref` (`v.x`, `v.y = 0.0`).
//!
//! # Usage
//! ```
//! use fireworks_core::Vector3D;
//!
//! let mut position = Vector3D::new(0.0, 10.0, 0.0);
//! let velocity = Vector3D::new(1.0, 2.0, 0.0);
//! position.add_scaled_vector(velocity, 0.5);
//! assert_eq!(position, Vector3D::new(0.5, 11.0, 0.0));
//!
//! let mut zero = Vector3D::zeros();
//! zero.normalize(); // zero length is left alone
//! assert_eq!(zero, Vector3D::zeros());
//! ```

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Deref, DerefMut, Mul, MulAssign, Neg, Sub, SubAssign};

/// Point or displacement in 3D simulation space.
///
/// Serialized as a `[x, y, z]` sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Vector3D(Vector3<f64>);

impl Deref for Vector3D {
    type Target = Vector3<f64>;
    #[inline]
    fn deref(&self) -> &Vector3<f64> {
        &self.0
    }
}

impl DerefMut for Vector3D {
    #[inline]
    fn deref_mut(&mut self) -> &mut Vector3<f64> {
        &mut self.0
    }
}

impl Vector3D {
    /// Create a vector from its components
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3D(Vector3::new(x, y, z))
    }

    /// The zero vector (identity for addition)
    #[inline]
    #[must_use]
    pub fn zeros() -> Self {
        Vector3D(Vector3::zeros())
    }

    // ------------------------------------------------------------------------
    // In-place modifiers
    // ------------------------------------------------------------------------

    /// Flip the direction of the vector
    #[inline]
    pub fn invert(&mut self) {
        self.0 = -self.0;
    }

    /// `self += other`
    #[inline]
    pub fn add_vector(&mut self, other: Vector3D) {
        self.0 += other.0;
    }

    /// `self -= other`
    #[inline]
    pub fn subtract_vector(&mut self, other: Vector3D) {
        self.0 -= other.0;
    }

    /// `self *= scale`
    #[inline]
    pub fn scalar_multiply(&mut self, scale: f64) {
        self.0 *= scale;
    }

    /// `self += other * scale`
    ///
    /// Used by the integrator for `position += velocity * dt` and friends.
    #[inline]
    pub fn add_scaled_vector(&mut self, other: Vector3D, scale: f64) {
        self.0 += other.0 * scale;
    }

    /// Component-wise product, written back into `self`
    #[inline]
    pub fn component_product_update(&mut self, other: Vector3D) {
        self.0.component_mul_assign(&other.0);
    }

    /// Replace `self` with `self × other` (right-handed)
    #[inline]
    pub fn cross_product(&mut self, other: Vector3D) {
        // nalgebra builds the result from the untouched operands before we store it
        self.0 = self.0.cross(&other.0);
    }

    /// Scale to unit length.
    ///
    /// A zero-length vector is left unchanged rather than becoming NaN.
    #[inline]
    pub fn normalize(&mut self) {
        let length = self.magnitude();
        if length > 0.0 {
            self.0 *= 1.0 / length;
        }
    }

    // ------------------------------------------------------------------------
    // Pure operations
    // ------------------------------------------------------------------------

    /// `self + other`
    #[inline]
    #[must_use]
    pub fn added(self, other: Vector3D) -> Self {
        Vector3D(self.0 + other.0)
    }

    /// `self - other`
    #[inline]
    #[must_use]
    pub fn subtracted(self, other: Vector3D) -> Self {
        Vector3D(self.0 - other.0)
    }

    /// `self * scale`
    #[inline]
    #[must_use]
    pub fn scaled(self, scale: f64) -> Self {
        Vector3D(self.0 * scale)
    }

    /// Component-wise product
    #[inline]
    #[must_use]
    pub fn component_product(self, other: Vector3D) -> Self {
        Vector3D(self.0.component_mul(&other.0))
    }

    /// Cross product `self × other`
    #[inline]
    #[must_use]
    pub fn cross(self, other: Vector3D) -> Self {
        Vector3D(self.0.cross(&other.0))
    }

    /// Unit-length copy (zero stays zero)
    #[inline]
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Copy pointing the opposite way
    #[inline]
    #[must_use]
    pub fn inverted(self) -> Self {
        Vector3D(-self.0)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Euclidean length
    #[inline]
    pub fn magnitude(&self) -> f64 {
        self.0.norm()
    }

    /// Squared length. Prefer this for comparisons.
    #[inline]
    pub fn square_magnitude(&self) -> f64 {
        self.0.norm_squared()
    }

    /// Scalar product
    #[inline]
    pub fn dot_product(&self, other: Vector3D) -> f64 {
        self.0.dot(&other.0)
    }

    /// True when every component is finite
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.0.x.is_finite() && self.0.y.is_finite() && self.0.z.is_finite()
    }
}

impl Default for Vector3D {
    fn default() -> Self {
        Vector3D::zeros()
    }
}

impl From<Vector3<f64>> for Vector3D {
    fn from(v: Vector3<f64>) -> Self {
        Vector3D(v)
    }
}

impl From<Vector3D> for Vector3<f64> {
    fn from(v: Vector3D) -> Self {
        v.0
    }
}

impl From<[f64; 3]> for Vector3D {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Vector3D::new(x, y, z)
    }
}

impl fmt::Display for Vector3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.0.x, self.0.y, self.0.z)
    }
}

// ============================================================================
// OPERATORS
// ============================================================================

impl Add for Vector3D {
    type Output = Vector3D;
    #[inline]
    fn add(self, rhs: Vector3D) -> Vector3D {
        self.added(rhs)
    }
}

impl Sub for Vector3D {
    type Output = Vector3D;
    #[inline]
    fn sub(self, rhs: Vector3D) -> Vector3D {
        self.subtracted(rhs)
    }
}

impl Mul<f64> for Vector3D {
    type Output = Vector3D;
    #[inline]
    fn mul(self, rhs: f64) -> Vector3D {
        self.scaled(rhs)
    }
}

impl Neg for Vector3D {
    type Output = Vector3D;
    #[inline]
    fn neg(self) -> Vector3D {
        self.inverted()
    }
}

impl AddAssign for Vector3D {
    #[inline]
    fn add_assign(&mut self, rhs: Vector3D) {
        self.add_vector(rhs);
    }
}

impl SubAssign for Vector3D {
    #[inline]
    fn sub_assign(&mut self, rhs: Vector3D) {
        self.subtract_vector(rhs);
    }
}

impl MulAssign<f64> for Vector3D {
    #[inline]
    fn mul_assign(&mut self, rhs: f64) {
        self.scalar_multiply(rhs);
    }
}
