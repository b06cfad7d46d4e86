//! Core type and trait definitions for the Harmony Search engine.
//!
//! The central trait — [`HsProblem`] — defines the contract between the
//! generic search engine and domain-specific problem implementations:
//! the design space to sample from, the optimization sense, and the
//! objective evaluation.

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use crate::design::DesignSpace;

/// A concrete value assigned to one design variable.
///
/// Continuous, discrete, and constant domains produce [`Value::Number`];
/// categorical domains produce [`Value::Label`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// A numeric value.
    Number(f64),
    /// An opaque categorical label.
    Label(String),
}

impl Value {
    /// Returns the numeric value, or `None` for a label.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Label(_) => None,
        }
    }

    /// Returns the label, or `None` for a number.
    pub fn as_label(&self) -> Option<&str> {
        match self {
            Value::Number(_) => None,
            Value::Label(s) => Some(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Label(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Label(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Label(s) => write!(f, "{s}"),
        }
    }
}

/// One candidate solution: a full assignment of values to all design
/// variables, index-aligned with the [`DesignSpace`](crate::DesignSpace)
/// that produced it.
///
/// Harmonies are created by the engine; objectives read them by variable
/// name via [`get`](Harmony::get), [`number`](Harmony::number),
/// [`label`](Harmony::label), or indexing (`harmony["x"]`).
#[derive(Debug, Clone, PartialEq)]
pub struct Harmony {
    names: Arc<[String]>,
    values: Vec<Value>,
}

impl Harmony {
    pub(crate) fn new(names: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { names, values }
    }

    /// Number of design variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the harmony has no variables.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value of the named variable, or `None` if unknown.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.values[i])
    }

    /// Returns the numeric value of the named variable.
    ///
    /// `None` if the variable is unknown or holds a label.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_number)
    }

    /// Returns the label of the named variable.
    ///
    /// `None` if the variable is unknown or holds a number.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_label)
    }

    /// Iterates over `(name, value)` pairs in design-space order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// The values in design-space order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub(crate) fn value_at(&self, index: usize) -> &Value {
        &self.values[index]
    }
}

impl Index<&str> for Harmony {
    type Output = Value;

    /// # Panics
    /// Panics if no design variable has this name. Use [`Harmony::get`]
    /// for a fallible lookup.
    fn index(&self, name: &str) -> &Value {
        self.get(name)
            .unwrap_or_else(|| panic!("no design variable named '{name}'"))
    }
}

impl fmt::Display for Harmony {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}

/// The result of evaluating one harmony against the objective.
///
/// `penalty` measures aggregate constraint violation: `penalty <= 0.0`
/// means the harmony is feasible; a positive penalty is the degree of
/// infeasibility and must be comparable across evaluations.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Evaluation {
    /// Objective value. Interpreted per [`Sense`].
    pub fitness: f64,
    /// Aggregate constraint violation; `<= 0.0` means feasible.
    pub penalty: f64,
}

impl Evaluation {
    /// Creates an evaluation with an explicit penalty.
    pub fn new(fitness: f64, penalty: f64) -> Self {
        Self { fitness, penalty }
    }

    /// Creates a feasible evaluation (penalty zero).
    ///
    /// Use this for unconstrained objectives.
    pub fn feasible(fitness: f64) -> Self {
        Self {
            fitness,
            penalty: 0.0,
        }
    }

    /// Whether this evaluation satisfies all constraints.
    pub fn is_feasible(&self) -> bool {
        self.penalty <= 0.0
    }
}

/// Whether the engine seeks minimum or maximum fitness.
///
/// Every fitness comparison in the engine goes through this enum; penalty
/// comparisons never flip (a smaller violation is always preferred).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sense {
    /// Lower fitness is better.
    Minimize,
    /// Higher fitness is better.
    Maximize,
}

impl Sense {
    /// Whether fitness `a` is strictly better than fitness `b`.
    pub fn better(self, a: f64, b: f64) -> bool {
        match self {
            Sense::Minimize => a < b,
            Sense::Maximize => a > b,
        }
    }

    /// The worst representable fitness for this sense.
    ///
    /// Used as the fitness half of the failed-evaluation sentinel.
    pub fn worst_fitness(self) -> f64 {
        match self {
            Sense::Minimize => f64::INFINITY,
            Sense::Maximize => f64::NEG_INFINITY,
        }
    }
}

/// Defines a Harmony Search optimization problem.
///
/// The user supplies the design space, the optimization sense, and the
/// objective; the engine handles memory management, improvisation, and
/// replacement.
///
/// # Evaluation failures
///
/// `evaluate` may fail (numeric blow-up, missing variable, domain error).
/// The engine applies one uniform policy: a failed evaluation is scored as
/// a sentinel — worst-possible fitness for the sense and infinite penalty —
/// so it is never selected as best while any successfully evaluated member
/// exists, and is always first in line for replacement. Failures are
/// counted in [`HsResult::failed_evaluations`](crate::HsResult), which
/// together with the infinite penalty keeps them distinguishable from
/// genuinely bad but valid evaluations.
///
/// # Examples
///
/// ```
/// use harmony_search::{DesignSpace, Evaluation, Harmony, HsProblem, Sampler};
///
/// struct Sphere {
///     design: DesignSpace,
/// }
///
/// impl HsProblem for Sphere {
///     fn design(&self) -> &DesignSpace {
///         &self.design
///     }
///
///     fn evaluate(&self, harmony: &Harmony) -> Result<Evaluation, String> {
///         let x = harmony.number("x").ok_or("x missing")?;
///         let y = harmony.number("y").ok_or("y missing")?;
///         Ok(Evaluation::feasible(x * x + y * y))
///     }
/// }
///
/// let problem = Sphere {
///     design: DesignSpace::new()
///         .with("x", Sampler::continuous(-5.0, 5.0))
///         .with("y", Sampler::continuous(-5.0, 5.0)),
/// };
/// # let _ = problem;
/// ```
pub trait HsProblem: Send + Sync {
    /// The design space to sample candidate harmonies from.
    fn design(&self) -> &DesignSpace;

    /// The optimization sense. Defaults to minimization.
    fn sense(&self) -> Sense {
        Sense::Minimize
    }

    /// Evaluates a harmony, returning fitness and penalty.
    ///
    /// Must be pure and deterministic for equal inputs; randomness here
    /// breaks the engine's reproducibility guarantees.
    fn evaluate(&self, harmony: &Harmony) -> Result<Evaluation, String>;

    /// Called after each iteration with the current best member.
    ///
    /// Useful for logging or external progress reporting. The default
    /// implementation is a no-op.
    fn on_iteration(&self, _iteration: usize, _best_fitness: f64, _best_penalty: f64) {}
}
