//! Domain primitives shared by the distance routines.

use core::{fmt, ops::Deref};

use thiserror::Error;

use super::helpers::validate_dimensions;

/// Identifies whether an error was produced while inspecting the left or right
/// vector argument.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VectorKind {
    /// Value originating from the first argument.
    Left,
    /// Value originating from the second argument.
    Right,
}

impl fmt::Display for VectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Errors emitted while computing distances.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DistanceError {
    /// Either input vector had zero length.
    #[error("vectors must have positive dimension")]
    ZeroLength,
    /// Input vectors had different lengths.
    #[error("dimension mismatch: left={left}, right={right}")]
    DimensionMismatch {
        /// Dimensionality of the left-hand vector.
        left: usize,
        /// Dimensionality of the right-hand vector.
        right: usize,
    },
    /// Encountered a non-finite value in one of the vectors.
    #[error("{which} vector contains a non-finite value at index {index}: {value}")]
    NonFinite {
        /// Vector holding the offending value.
        which: VectorKind,
        /// Position of the offending value.
        index: usize,
        /// The offending value.
        value: f64,
    },
    /// Provided norms must be finite and non-negative.
    #[error("provided {which} norm must be finite and non-negative (got {value})")]
    InvalidNorm {
        /// Vector the norm belongs to.
        which: VectorKind,
        /// The rejected norm.
        value: f64,
    },
}

/// Convenient alias for distance computations.
pub type Result<T> = core::result::Result<T, DistanceError>;

/// Vector newtype that validates dimensionality and finiteness on construction.
#[derive(Clone, Copy, Debug)]
pub struct Vector<'a>(&'a [f64]);

impl<'a> Vector<'a> {
    /// Validates and constructs a [`Vector`].
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError::ZeroLength`] when the slice is empty and
    /// [`DistanceError::NonFinite`] when a value is NaN or infinite.
    pub fn new(values: &'a [f64], which: VectorKind) -> Result<Self> {
        if values.is_empty() {
            return Err(DistanceError::ZeroLength);
        }

        for (index, value) in values.iter().enumerate() {
            if !value.is_finite() {
                return Err(DistanceError::NonFinite {
                    which,
                    index,
                    value: *value,
                });
            }
        }

        Ok(Self(values))
    }

    /// Returns the dimensionality of the vector.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.0.len()
    }
}

impl Deref for Vector<'_> {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

/// Validated L2 norm.
///
/// Unlike a strict metric norm this admits zero: a vendor without any rating
/// has a zero filled vector and still takes part in neighbour search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Norm(f64);

impl Norm {
    /// Validates an explicit norm value.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError::InvalidNorm`] when the value is non-finite or
    /// negative.
    pub fn new(value: f64, which: VectorKind) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(DistanceError::InvalidNorm { which, value });
        }
        Ok(Self(value))
    }

    /// Computes an L2 norm from a validated vector.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError::InvalidNorm`] when the squared sum overflows.
    pub fn from_vector(vector: &Vector<'_>, which: VectorKind) -> Result<Self> {
        let sum = vector.iter().map(|value| value * value).sum::<f64>();
        Self::from_squared_sum(sum, which)
    }

    pub(crate) fn from_squared_sum(sum: f64, which: VectorKind) -> Result<Self> {
        Self::new(sum.sqrt(), which)
    }

    /// Returns the validated norm value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Whether the vector this norm was taken from is the zero vector.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl Deref for Norm {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Cosine distance in `[0, 2]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Distance(f64);

impl Distance {
    /// Distance reported when either operand is the zero vector.
    pub const UNDEFINED: Self = Self(1.0);

    pub(crate) fn from_raw(value: f64) -> Self {
        Self(value)
    }

    /// Returns the raw distance value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Returns the cosine similarity this distance was derived from.
    #[must_use]
    pub fn similarity(&self) -> f64 {
        1.0 - self.0
    }
}

impl Deref for Distance {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Pre-computed L2 norms for cosine distance calculations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CosineNorms {
    left: Norm,
    right: Norm,
}

impl CosineNorms {
    /// Builds [`CosineNorms`] from explicit norm values.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError::InvalidNorm`] when a norm is non-finite or
    /// negative.
    pub fn new(left: f64, right: f64) -> Result<Self> {
        let left = Norm::new(left, VectorKind::Left)?;
        let right = Norm::new(right, VectorKind::Right)?;
        Ok(Self { left, right })
    }

    /// Pairs two already validated norms.
    #[must_use]
    pub fn from_norms(left: Norm, right: Norm) -> Self {
        Self { left, right }
    }

    /// Computes norms from the provided vectors.
    ///
    /// # Errors
    ///
    /// Propagates validation errors surfaced by [`super::cosine_distance`].
    pub fn from_vectors(left: &[f64], right: &[f64]) -> Result<Self> {
        let left = Vector::new(left, VectorKind::Left)?;
        let right = Vector::new(right, VectorKind::Right)?;
        validate_dimensions(&left, &right)?;
        let left = Norm::from_vector(&left, VectorKind::Left)?;
        let right = Norm::from_vector(&right, VectorKind::Right)?;
        Ok(Self { left, right })
    }

    /// Returns the validated norm for the left vector.
    #[must_use]
    pub fn left(&self) -> Norm {
        self.left
    }

    /// Returns the validated norm for the right vector.
    #[must_use]
    pub fn right(&self) -> Norm {
        self.right
    }
}
