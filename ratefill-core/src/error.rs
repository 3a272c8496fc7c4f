//! Error types for the ratefill core library.
//!
//! Defines the error enum exposed by the public API, its stable error codes and
//! a convenient result alias.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::{distance::DistanceError, index::ExecutionStrategy};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Which identifier space a lookup was performed in.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IdKind {
    /// Row identifier of the rating matrix.
    Vendor,
    /// Column identifier of the rating matrix.
    Supplier,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vendor => f.write_str("vendor"),
            Self::Supplier => f.write_str("supplier"),
        }
    }
}

/// Error type produced by matrix construction, index fitting and prediction.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RatingError {
    /// The requested vendor or supplier is not part of the matrix.
    #[error("{kind} `{id}` not found")]
    NotFound {
        /// Identifier space the lookup was performed in.
        kind: IdKind,
        /// Identifier that could not be resolved.
        id: Arc<str>,
    },
    /// Two records were supplied for the same vendor and supplier.
    #[error("duplicate rating for vendor `{vendor_id}` and supplier `{supplier_id}`")]
    DuplicateEntry {
        /// Vendor shared by the conflicting records.
        vendor_id: Arc<str>,
        /// Supplier shared by the conflicting records.
        supplier_id: Arc<str>,
    },
    /// The matrix holds no ratings, so no global mean exists.
    #[error("rating matrix contains no ratings")]
    EmptyDataset,
    /// A record carried a non-finite aggregate rating.
    #[error("rating for vendor `{vendor_id}` and supplier `{supplier_id}` is not finite ({value})")]
    InvalidRating {
        /// Vendor of the offending record.
        vendor_id: Arc<str>,
        /// Supplier of the offending record.
        supplier_id: Arc<str>,
        /// The rejected value.
        value: f64,
    },
    /// A neighbour count of zero was requested.
    #[error("neighbour count must be at least 1 (got {got})")]
    InvalidNeighbourCount {
        /// The rejected neighbour count.
        got: usize,
    },
    /// More neighbours were requested than the index was fitted with.
    #[error("requested {requested} neighbours but the index was fitted with {fitted}")]
    NeighbourCountExceedsFit {
        /// Neighbour count requested by the caller.
        requested: usize,
        /// Neighbour count fixed when the index was fitted.
        fitted: usize,
    },
    /// The similarity index was fitted against a differently shaped matrix.
    #[error(
        "similarity index covers {index_rows} vendors but the matrix has {matrix_rows}"
    )]
    IndexMismatch {
        /// Vendor rows covered by the index.
        index_rows: usize,
        /// Vendor rows present in the matrix.
        matrix_rows: usize,
    },
    /// The requested execution strategy is unavailable in the current build.
    #[error("the requested execution strategy {requested:?} is not available in this build")]
    BackendUnavailable {
        /// Strategy that could not be satisfied by the current build.
        requested: ExecutionStrategy,
    },
    /// Computing the distance between two vendor vectors failed.
    #[error("distance between vendors `{left}` and `{right}` failed: {error}")]
    Distance {
        /// Vendor whose vector was the left operand.
        left: Arc<str>,
        /// Vendor whose vector was the right operand.
        right: Arc<str>,
        #[source]
        /// Underlying distance error.
        error: DistanceError,
    },
}

define_error_codes! {
    /// Stable codes describing [`RatingError`] variants.
    enum RatingErrorCode for RatingError {
        /// The requested vendor or supplier is not part of the matrix.
        NotFound => NotFound { .. } => "RATEFILL_NOT_FOUND",
        /// Two records were supplied for the same vendor and supplier.
        DuplicateEntry => DuplicateEntry { .. } => "RATEFILL_DUPLICATE_ENTRY",
        /// The matrix holds no ratings.
        EmptyDataset => EmptyDataset => "RATEFILL_EMPTY_DATASET",
        /// A record carried a non-finite aggregate rating.
        InvalidRating => InvalidRating { .. } => "RATEFILL_INVALID_RATING",
        /// A neighbour count of zero was requested.
        InvalidNeighbourCount => InvalidNeighbourCount { .. } => "RATEFILL_INVALID_NEIGHBOUR_COUNT",
        /// More neighbours were requested than the index was fitted with.
        NeighbourCountExceedsFit => NeighbourCountExceedsFit { .. } => "RATEFILL_NEIGHBOUR_COUNT_EXCEEDS_FIT",
        /// The similarity index was fitted against a differently shaped matrix.
        IndexMismatch => IndexMismatch { .. } => "RATEFILL_INDEX_MISMATCH",
        /// The requested execution strategy is unavailable in the current build.
        BackendUnavailable => BackendUnavailable { .. } => "RATEFILL_BACKEND_UNAVAILABLE",
        /// Computing a vendor distance failed.
        DistanceFailure => Distance { .. } => "RATEFILL_DISTANCE_FAILURE",
    }
}

impl RatingError {
    pub(crate) fn vendor_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: IdKind::Vendor,
            id: Arc::from(id),
        }
    }

    pub(crate) fn supplier_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: IdKind::Supplier,
            id: Arc::from(id),
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, RatingError>;
