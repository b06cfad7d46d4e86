//! Harmony Search configuration.
//!
//! [`HsConfig`] holds all parameters that control one optimization run.

/// Configuration for a Harmony Search run.
///
/// Immutable once passed to the runner; a run never mutates its
/// configuration, and two runs with the same configuration and seed are
/// identical.
///
/// # Defaults
///
/// ```
/// use harmony_search::HsConfig;
///
/// let config = HsConfig::default();
/// assert_eq!(config.hmcr, 0.8);
/// assert_eq!(config.par, 0.3);
/// assert_eq!(config.memory_size, 20);
/// assert_eq!(config.max_iterations, 1000);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use harmony_search::HsConfig;
///
/// let config = HsConfig::default()
///     .with_hmcr(0.9)
///     .with_par(0.1)
///     .with_memory_size(50)
///     .with_max_iterations(10_000)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HsConfig {
    /// Harmony memory considering rate: probability of recalling a value
    /// already held in memory instead of sampling fresh (0.0–1.0).
    ///
    /// Higher values exploit the memory more; lower values explore the
    /// raw domain. Typical range: 0.7–0.95.
    pub hmcr: f64,

    /// Pitch adjusting rate: probability of overwriting a variable's
    /// chosen value with a fresh draw from its domain (0.0–1.0).
    ///
    /// Applied after memory consideration, independently per variable.
    /// Note that adjustment re-samples the whole domain rather than
    /// perturbing the chosen value locally.
    pub par: f64,

    /// Number of harmonies held in memory (HMS). Must be at least 2.
    pub memory_size: usize,

    /// Number of improvisation iterations. Exhausting this budget is the
    /// run's only termination condition.
    pub max_iterations: usize,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Whether to memoize objective evaluations for the duration of the
    /// run, keyed on the harmony's full value tuple.
    ///
    /// Worthwhile when the objective is expensive and the design space is
    /// discrete enough for repeat candidates to occur.
    pub cache_evaluations: bool,

    /// Whether to record an [`IterationRecord`](crate::IterationRecord)
    /// per iteration in the result.
    pub log_progress: bool,
}

impl Default for HsConfig {
    fn default() -> Self {
        Self {
            hmcr: 0.8,
            par: 0.3,
            memory_size: 20,
            max_iterations: 1000,
            seed: None,
            cache_evaluations: false,
            log_progress: false,
        }
    }
}

impl HsConfig {
    /// Sets the harmony memory considering rate.
    ///
    /// Out-of-range values are not clamped; they are rejected by
    /// [`validate`](Self::validate).
    pub fn with_hmcr(mut self, hmcr: f64) -> Self {
        self.hmcr = hmcr;
        self
    }

    /// Sets the pitch adjusting rate.
    ///
    /// Out-of-range values are not clamped; they are rejected by
    /// [`validate`](Self::validate).
    pub fn with_par(mut self, par: f64) -> Self {
        self.par = par;
        self
    }

    /// Sets the harmony memory size.
    pub fn with_memory_size(mut self, size: usize) -> Self {
        self.memory_size = size;
        self
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables per-run evaluation caching.
    pub fn with_cache_evaluations(mut self, cache: bool) -> Self {
        self.cache_evaluations = cache;
        self
    }

    /// Enables or disables per-iteration progress records.
    pub fn with_log_progress(mut self, log: bool) -> Self {
        self.log_progress = log;
        self
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.hmcr) {
            return Err(format!("hmcr must be in [0, 1], got {}", self.hmcr));
        }
        if !(0.0..=1.0).contains(&self.par) {
            return Err(format!("par must be in [0, 1], got {}", self.par));
        }
        if self.memory_size < 2 {
            return Err(format!(
                "memory_size must be at least 2, got {}",
                self.memory_size
            ));
        }
        if self.max_iterations == 0 {
            return Err("max_iterations must be at least 1".into());
        }
        Ok(())
    }
}
