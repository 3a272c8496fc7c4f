//! Configuration for fitting a [`super::SimilarityIndex`].

use std::num::NonZeroUsize;

use crate::{Result, error::RatingError};

/// Neighbour count used when none is configured.
pub const DEFAULT_NEIGHBOURS: usize = 3;

/// Indicates how the pairwise distance pass is scheduled when fitting.
///
/// `Auto` uses the rayon pool when the `parallel` feature is compiled in and a
/// single thread otherwise. Every strategy yields identical neighbour sets.
///
/// # Examples
/// ```
/// use ratefill_core::ExecutionStrategy;
///
/// let strategy = ExecutionStrategy::Auto;
/// assert!(matches!(strategy, ExecutionStrategy::Auto));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Allow the library to select the scheduling automatically.
    Auto,
    /// Compute every row on the calling thread.
    Sequential,
    /// Spread rows across the rayon thread pool.
    Parallel,
}

impl ExecutionStrategy {
    /// Whether the pass runs on the rayon pool once resolved.
    pub(crate) fn runs_parallel(self) -> bool {
        match self {
            Self::Auto => cfg!(feature = "parallel"),
            Self::Sequential => false,
            Self::Parallel => true,
        }
    }
}

/// Whether a vendor may appear in its own neighbour set.
///
/// Including self makes the vendor its own nearest neighbour (distance `0`
/// unless it has no ratings at all), which dominates any weighted average for
/// suppliers it rated. Since predictions only target unrated suppliers the
/// self row never contributes a rating, but it still occupies one of the `k`
/// slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelfMatch {
    /// Skip the queried vendor's own row.
    #[default]
    Exclude,
    /// Let the queried vendor compete like any other row.
    Include,
}

/// Validated parameters for fitting a similarity index.
///
/// # Examples
/// ```
/// use ratefill_core::{ExecutionStrategy, IndexParams, SelfMatch};
///
/// let params = IndexParams::default();
/// assert_eq!(params.neighbours().get(), 3);
/// assert_eq!(params.self_match(), SelfMatch::Exclude);
/// assert_eq!(params.execution_strategy(), ExecutionStrategy::Auto);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexParams {
    neighbours: NonZeroUsize,
    self_match: SelfMatch,
    execution_strategy: ExecutionStrategy,
}

impl IndexParams {
    /// Creates default parameters with `neighbours` per vendor.
    ///
    /// # Errors
    /// Returns [`RatingError::InvalidNeighbourCount`] when `neighbours` is zero.
    pub fn new(neighbours: usize) -> Result<Self> {
        IndexParamsBuilder::new().with_neighbours(neighbours).build()
    }

    /// Returns the number of neighbours kept per vendor.
    #[must_use]
    pub fn neighbours(&self) -> NonZeroUsize {
        self.neighbours
    }

    /// Returns the self-match policy.
    #[must_use]
    pub fn self_match(&self) -> SelfMatch {
        self.self_match
    }

    /// Returns the configured execution strategy.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }
}

impl Default for IndexParams {
    fn default() -> Self {
        Self {
            neighbours: NonZeroUsize::MIN.saturating_add(DEFAULT_NEIGHBOURS - 1),
            self_match: SelfMatch::Exclude,
            execution_strategy: ExecutionStrategy::Auto,
        }
    }
}

/// Configures and constructs [`IndexParams`].
///
/// # Examples
/// ```
/// use ratefill_core::{ExecutionStrategy, IndexParamsBuilder, SelfMatch};
///
/// let params = IndexParamsBuilder::new()
///     .with_neighbours(5)
///     .with_self_match(SelfMatch::Include)
///     .with_execution_strategy(ExecutionStrategy::Sequential)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(params.neighbours().get(), 5);
/// assert_eq!(params.self_match(), SelfMatch::Include);
/// ```
#[derive(Debug, Clone)]
pub struct IndexParamsBuilder {
    neighbours: usize,
    self_match: SelfMatch,
    execution_strategy: ExecutionStrategy,
}

impl Default for IndexParamsBuilder {
    fn default() -> Self {
        Self {
            neighbours: DEFAULT_NEIGHBOURS,
            self_match: SelfMatch::Exclude,
            execution_strategy: ExecutionStrategy::Auto,
        }
    }
}

impl IndexParamsBuilder {
    /// Creates a builder populated with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the number of neighbours kept per vendor.
    #[must_use]
    pub fn with_neighbours(mut self, neighbours: usize) -> Self {
        self.neighbours = neighbours;
        self
    }

    /// Returns the configured neighbour count.
    #[must_use]
    pub fn neighbours(&self) -> usize {
        self.neighbours
    }

    /// Sets whether a vendor may be its own neighbour.
    #[must_use]
    pub fn with_self_match(mut self, self_match: SelfMatch) -> Self {
        self.self_match = self_match;
        self
    }

    /// Sets the execution strategy used when fitting.
    #[must_use]
    pub fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.execution_strategy = strategy;
        self
    }

    /// Returns the currently configured execution strategy.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns [`RatingError::InvalidNeighbourCount`] when the neighbour count
    /// is zero and [`RatingError::BackendUnavailable`] when
    /// [`ExecutionStrategy::Parallel`] is requested without the `parallel`
    /// feature.
    ///
    /// # Examples
    /// ```
    /// use ratefill_core::{IndexParamsBuilder, RatingError};
    ///
    /// let err = IndexParamsBuilder::new().with_neighbours(0).build();
    /// assert!(matches!(err, Err(RatingError::InvalidNeighbourCount { got: 0 })));
    /// ```
    pub fn build(self) -> Result<IndexParams> {
        let neighbours = NonZeroUsize::new(self.neighbours).ok_or(
            RatingError::InvalidNeighbourCount {
                got: self.neighbours,
            },
        )?;

        if self.execution_strategy == ExecutionStrategy::Parallel && !cfg!(feature = "parallel") {
            return Err(RatingError::BackendUnavailable {
                requested: ExecutionStrategy::Parallel,
            });
        }

        Ok(IndexParams {
            neighbours,
            self_match: self.self_match,
            execution_strategy: self.execution_strategy,
        })
    }
}
