//! Ratefill core library.
//!
//! Builds a vendor×supplier rating matrix, fits a cosine nearest-neighbour
//! index over vendor rows and predicts the ratings each vendor never gave from
//! the ratings of its most similar vendors.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod distance;
mod error;
mod index;
mod matrix;
mod predictor;
mod record;

#[cfg(test)]
mod test_utils;

pub use crate::{
    distance::{CosineNorms, Distance, DistanceError, Norm, Vector, VectorKind, cosine_distance},
    error::{IdKind, RatingError, RatingErrorCode, Result},
    index::{
        DEFAULT_NEIGHBOURS, ExecutionStrategy, IndexParams, IndexParamsBuilder, Neighbour,
        NeighbourSet, SelfMatch, SimilarityIndex,
    },
    matrix::{Cell, FilledView, RatingMatrix, Row},
    predictor::{
        Contribution, PredictedRating, Prediction, PredictionBasis, PredictionResult, Predictor,
        VendorPredictions,
    },
    record::{RatingRecord, SubMetrics},
};
