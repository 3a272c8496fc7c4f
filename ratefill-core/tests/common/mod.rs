use ratefill_core::{RatingMatrix, RatingRecord};

/// Three vendors over two suppliers; V1 is missing S2 and V3 is missing S2.
#[must_use]
pub fn scenario_records() -> Vec<RatingRecord> {
    vec![
        RatingRecord::aggregate("V1", "S1", 4.0),
        RatingRecord::aggregate("V2", "S1", 4.0),
        RatingRecord::aggregate("V2", "S2", 5.0),
        RatingRecord::aggregate("V3", "S1", 2.0),
    ]
}

#[must_use]
pub fn scenario_matrix() -> RatingMatrix {
    RatingMatrix::build(&scenario_records()).expect("scenario records are valid")
}
