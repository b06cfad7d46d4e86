//! Design-space modeling: variable domains and sampling.
//!
//! A [`DesignSpace`] is an ordered mapping from variable names to
//! [`Sampler`]s. Each sampler is a capability — "draw one value from this
//! domain" — with no memory of prior draws. Four domain shapes are
//! supported: continuous intervals, discrete value lists, constants, and
//! categorical label sets. All draws are uniform over the declared domain;
//! no variant is frequency-weighted.
//!
//! # Dependent bounds
//!
//! Continuous and discrete domains may track a sibling variable: the
//! tracked variable's sampled value overrides the static bound (continuous)
//! or filters the listed values (discrete) within the same draw. Tracking
//! declarations form a dependency graph over the design space;
//! [`DesignSpace::sampling_order`] derives the explicit evaluation order —
//! declaration order, with a variable deferred until every variable it
//! tracks has been drawn — and validation rejects unknown names and cycles.

use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;

use crate::types::{Harmony, Value};

/// A variable domain that can produce random values.
///
/// Construction itself is infallible; domain invariants (finite ordered
/// continuous bounds, non-empty discrete/categorical domains) are checked
/// by [`DesignSpace::validate`] before any sampling happens.
///
/// # Examples
///
/// ```
/// use harmony_search::Sampler;
///
/// let width = Sampler::continuous(0.1, 2.0);
/// let plies = Sampler::discrete([1, 2, 3, 4]);
/// let load = Sampler::constant(6000.0);
/// let direction = Sampler::categorical(["up", "down"]);
/// # let _ = (width, plies, load, direction);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sampler {
    /// Uniform draw from the real interval `[min, max]`.
    Continuous {
        /// Lower bound. Must be finite and strictly below `max`.
        min: f64,
        /// Upper bound. Must be finite.
        max: f64,
        /// Sibling variable whose sampled value overrides `min`.
        min_from: Option<String>,
        /// Sibling variable whose sampled value overrides `max`.
        max_from: Option<String>,
    },
    /// Uniform draw from a fixed, ordered, non-empty value list.
    Discrete {
        /// The candidate values. Must be non-empty.
        values: Vec<Value>,
        /// Sibling variable whose sampled value filters out smaller values.
        min_from: Option<String>,
        /// Sibling variable whose sampled value filters out larger values.
        max_from: Option<String>,
    },
    /// Always returns the same value.
    ///
    /// Fixes a variable while keeping it part of the design-space
    /// interface.
    Constant {
        /// The fixed value.
        value: Value,
    },
    /// Uniform draw from a fixed, non-empty set of opaque labels.
    Categorical {
        /// The candidate labels. Must be non-empty.
        labels: Vec<String>,
    },
}

impl Sampler {
    /// Continuous domain over `[min, max]`.
    pub fn continuous(min: f64, max: f64) -> Self {
        Sampler::Continuous {
            min,
            max,
            min_from: None,
            max_from: None,
        }
    }

    /// Discrete domain over an ordered value list.
    pub fn discrete<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Sampler::Discrete {
            values: values.into_iter().map(Into::into).collect(),
            min_from: None,
            max_from: None,
        }
    }

    /// Constant domain: every draw returns `value`.
    pub fn constant(value: impl Into<Value>) -> Self {
        Sampler::Constant {
            value: value.into(),
        }
    }

    /// Categorical domain over a set of labels.
    pub fn categorical<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        Sampler::Categorical {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Makes the lower bound track a sibling variable's sampled value.
    ///
    /// Applies to continuous and discrete domains; has no effect on
    /// constant and categorical domains.
    pub fn min_tracks(mut self, var: impl Into<String>) -> Self {
        let var = var.into();
        match &mut self {
            Sampler::Continuous { min_from, .. } | Sampler::Discrete { min_from, .. } => {
                *min_from = Some(var);
            }
            Sampler::Constant { .. } | Sampler::Categorical { .. } => {}
        }
        self
    }

    /// Makes the upper bound track a sibling variable's sampled value.
    ///
    /// Applies to continuous and discrete domains; has no effect on
    /// constant and categorical domains.
    pub fn max_tracks(mut self, var: impl Into<String>) -> Self {
        let var = var.into();
        match &mut self {
            Sampler::Continuous { max_from, .. } | Sampler::Discrete { max_from, .. } => {
                *max_from = Some(var);
            }
            Sampler::Constant { .. } | Sampler::Categorical { .. } => {}
        }
        self
    }

    /// Draws one value using the static domain, ignoring tracked bounds.
    ///
    /// Draws made through a [`DesignSpace`] resolve tracked bounds against
    /// the sibling values already sampled in the same harmony.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Value {
        self.sample_in(&SampleContext::empty(), rng)
    }

    /// Names of sibling variables this sampler's bounds track.
    pub fn dependencies(&self) -> Vec<&str> {
        match self {
            Sampler::Continuous {
                min_from, max_from, ..
            }
            | Sampler::Discrete {
                min_from, max_from, ..
            } => min_from
                .iter()
                .chain(max_from.iter())
                .map(String::as_str)
                .collect(),
            Sampler::Constant { .. } | Sampler::Categorical { .. } => Vec::new(),
        }
    }

    pub(crate) fn validate(&self, name: &str) -> Result<(), String> {
        match self {
            Sampler::Continuous { min, max, .. } => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(format!(
                        "variable '{name}': continuous bounds must be finite, got [{min}, {max}]"
                    ));
                }
                if min >= max {
                    return Err(format!(
                        "variable '{name}': continuous bounds require min < max, got [{min}, {max}]"
                    ));
                }
            }
            Sampler::Discrete { values, .. } => {
                if values.is_empty() {
                    return Err(format!("variable '{name}': discrete domain is empty"));
                }
            }
            Sampler::Categorical { labels } => {
                if labels.is_empty() {
                    return Err(format!("variable '{name}': categorical domain is empty"));
                }
            }
            Sampler::Constant { .. } => {}
        }
        Ok(())
    }

    /// Draws one value, resolving tracked bounds against `ctx`.
    pub(crate) fn sample_in<R: Rng>(&self, ctx: &SampleContext<'_>, rng: &mut R) -> Value {
        match self {
            Sampler::Continuous {
                min,
                max,
                min_from,
                max_from,
            } => {
                let lo = resolve_bound(min_from, ctx).unwrap_or(*min);
                let hi = resolve_bound(max_from, ctx).unwrap_or(*max);
                if lo < hi {
                    Value::Number(rng.random_range(lo..hi))
                } else {
                    // A tracked bound collapsed the interval.
                    Value::Number(hi)
                }
            }
            Sampler::Discrete {
                values,
                min_from,
                max_from,
            } => {
                let lo = resolve_bound(min_from, ctx).unwrap_or(f64::NEG_INFINITY);
                let hi = resolve_bound(max_from, ctx).unwrap_or(f64::INFINITY);
                let admissible: Vec<usize> = (0..values.len())
                    .filter(|&i| in_bounds(&values[i], lo, hi))
                    .collect();
                let pick = if admissible.is_empty() {
                    // Tracked bounds excluded every value; fall back to the
                    // full domain rather than failing the draw.
                    rng.random_range(0..values.len())
                } else {
                    admissible[rng.random_range(0..admissible.len())]
                };
                values[pick].clone()
            }
            Sampler::Constant { value } => value.clone(),
            Sampler::Categorical { labels } => {
                Value::Label(labels[rng.random_range(0..labels.len())].clone())
            }
        }
    }

    /// Whether an existing value is admissible under the bounds resolved
    /// against `ctx`.
    ///
    /// Used during memory consideration: a recalled value that violates a
    /// tracked bound is not reused.
    pub(crate) fn accepts(&self, value: &Value, ctx: &SampleContext<'_>) -> bool {
        match self {
            Sampler::Continuous {
                min,
                max,
                min_from,
                max_from,
            } => {
                if min_from.is_none() && max_from.is_none() {
                    return true;
                }
                let lo = resolve_bound(min_from, ctx).unwrap_or(*min);
                let hi = resolve_bound(max_from, ctx).unwrap_or(*max);
                in_bounds(value, lo, hi)
            }
            Sampler::Discrete {
                min_from, max_from, ..
            } => {
                if min_from.is_none() && max_from.is_none() {
                    return true;
                }
                let lo = resolve_bound(min_from, ctx).unwrap_or(f64::NEG_INFINITY);
                let hi = resolve_bound(max_from, ctx).unwrap_or(f64::INFINITY);
                in_bounds(value, lo, hi)
            }
            Sampler::Constant { value: fixed } => value == fixed,
            Sampler::Categorical { .. } => true,
        }
    }
}

fn resolve_bound(var: &Option<String>, ctx: &SampleContext<'_>) -> Option<f64> {
    var.as_deref().and_then(|name| ctx.number_of(name))
}

/// Labels pass numeric bound filters untouched.
fn in_bounds(value: &Value, lo: f64, hi: f64) -> bool {
    value.as_number().is_none_or(|n| lo <= n && n <= hi)
}

/// Sibling values already drawn for the harmony under construction.
pub(crate) struct SampleContext<'a> {
    design: Option<&'a DesignSpace>,
    values: &'a [Option<Value>],
}

impl<'a> SampleContext<'a> {
    pub(crate) fn new(design: &'a DesignSpace, values: &'a [Option<Value>]) -> Self {
        Self {
            design: Some(design),
            values,
        }
    }

    fn empty() -> SampleContext<'static> {
        SampleContext {
            design: None,
            values: &[],
        }
    }

    fn number_of(&self, name: &str) -> Option<f64> {
        let design = self.design?;
        let index = design.index_of(name)?;
        self.values
            .get(index)?
            .as_ref()
            .and_then(Value::as_number)
    }
}

/// An ordered, fixed set of named design variables.
///
/// Insertion order is preserved and defines the default sampling order;
/// the variable-name set is fixed for the lifetime of a run.
///
/// # Examples
///
/// ```
/// use harmony_search::{DesignSpace, Sampler};
///
/// let design = DesignSpace::new()
///     .with("beam_width", Sampler::continuous(0.1, 2.0))
///     .with("beam_height", Sampler::continuous(0.1, 10.0));
///
/// assert!(design.validate().is_ok());
/// assert_eq!(design.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DesignSpace {
    names: Vec<String>,
    samplers: Vec<Sampler>,
}

impl DesignSpace {
    /// Creates an empty design space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable, consuming and returning the space for chaining.
    pub fn with(mut self, name: impl Into<String>, sampler: Sampler) -> Self {
        self.add(name, sampler);
        self
    }

    /// Adds a variable.
    ///
    /// Duplicate names are rejected by [`validate`](Self::validate), not
    /// here.
    pub fn add(&mut self, name: impl Into<String>, sampler: Sampler) {
        self.names.push(name.into());
        self.samplers.push(sampler);
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the space has no variables.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Variable names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The sampler at a declaration index.
    pub fn sampler(&self, index: usize) -> &Sampler {
        &self.samplers[index]
    }

    /// Declaration index of a named variable.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Iterates over `(name, sampler)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Sampler)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.samplers.iter())
    }

    /// Validates the whole space.
    ///
    /// Returns `Err` with a description if the space is empty, a name is
    /// duplicated, any sampler's domain is invalid, or the tracking
    /// declarations reference unknown variables or form a cycle.
    pub fn validate(&self) -> Result<(), String> {
        if self.is_empty() {
            return Err("design space must contain at least one variable".into());
        }
        let mut seen = HashSet::new();
        for name in &self.names {
            if !seen.insert(name.as_str()) {
                return Err(format!("duplicate variable name '{name}'"));
            }
        }
        for (name, sampler) in self.iter() {
            sampler.validate(name)?;
        }
        self.sampling_order().map(|_| ())
    }

    /// The explicit order variables are drawn in: declaration order, with
    /// a variable deferred until every variable it tracks has been drawn.
    ///
    /// Returns `Err` if a tracked variable does not exist or the tracking
    /// declarations are cyclic.
    pub fn sampling_order(&self) -> Result<Vec<usize>, String> {
        let n = self.len();
        let mut deps: Vec<Vec<usize>> = Vec::with_capacity(n);
        for (name, sampler) in self.iter() {
            let mut resolved = Vec::new();
            for dep in sampler.dependencies() {
                let index = self.index_of(dep).ok_or_else(|| {
                    format!("variable '{name}' tracks unknown variable '{dep}'")
                })?;
                resolved.push(index);
            }
            deps.push(resolved);
        }

        let mut order = Vec::with_capacity(n);
        let mut placed = vec![false; n];
        while order.len() < n {
            let mut advanced = false;
            for i in 0..n {
                if !placed[i] && deps[i].iter().all(|&d| placed[d]) {
                    placed[i] = true;
                    order.push(i);
                    advanced = true;
                }
            }
            if !advanced {
                let stuck = (0..n).find(|&i| !placed[i]).map(|i| self.names[i].as_str());
                return Err(format!(
                    "cyclic sampling dependency involving '{}'",
                    stuck.unwrap_or("?")
                ));
            }
        }
        Ok(order)
    }

    /// Wraps caller-supplied values into a [`Harmony`] for manual
    /// evaluation of a specific design point.
    pub fn harmony(&self, values: Vec<Value>) -> Result<Harmony, String> {
        if values.len() != self.len() {
            return Err(format!(
                "expected {} values, got {}",
                self.len(),
                values.len()
            ));
        }
        Ok(Harmony::new(self.shared_names(), values))
    }

    pub(crate) fn shared_names(&self) -> Arc<[String]> {
        self.names.iter().cloned().collect()
    }

    /// Draws one full harmony in sampling order.
    pub(crate) fn draw<R: Rng>(
        &self,
        names: &Arc<[String]>,
        order: &[usize],
        rng: &mut R,
    ) -> Harmony {
        let mut slots: Vec<Option<Value>> = vec![None; self.len()];
        for &i in order {
            let value = {
                let ctx = SampleContext::new(self, &slots);
                self.samplers[i].sample_in(&ctx, rng)
            };
            slots[i] = Some(value);
        }
        let values = slots
            .into_iter()
            .map(|v| v.expect("sampling order covers every variable"))
            .collect();
        Harmony::new(names.clone(), values)
    }
}
