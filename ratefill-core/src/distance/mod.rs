//! Cosine distance over filled rating vectors.
//!
//! These routines validate their inputs and surface detailed errors so the
//! similarity index can report which vendor pair failed.

mod cosine;
mod helpers;
mod types;

pub use self::cosine::cosine_distance;
pub use self::types::{CosineNorms, Distance, DistanceError, Norm, Result, Vector, VectorKind};
