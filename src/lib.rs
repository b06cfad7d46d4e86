//! Feasibility-aware Harmony Search optimization.
//!
//! A population-based stochastic search engine for bounded-variable design
//! problems with inequality constraints handled via penalty. The engine
//! needs no gradient information: the objective may be non-differentiable,
//! discontinuous, or a black box.
//!
//! # Components
//!
//! - [`Sampler`] / [`DesignSpace`]: variable domains — continuous,
//!   discrete, constant, categorical — with optional dependent bounds
//!   drawn in an explicit topological order.
//! - [`HarmonyMemory`]: the algorithm's entire mutable state — a
//!   fixed-size population of evaluated candidates ranked
//!   feasibility-first.
//! - [`HsProblem`]: the user's contract — design space, optimization
//!   [`Sense`], and objective evaluation.
//! - [`HsConfig`] / [`HsRunner`]: run parameters and the improvise →
//!   evaluate → replace loop, with opt-in evaluation caching and progress
//!   records.
//! - [`restart`]: independent best-of-N restarts, the one point where
//!   parallelism is sound (enable the `parallel` feature for rayon).
//!
//! # Example
//!
//! ```
//! use harmony_search::{
//!     DesignSpace, Evaluation, Harmony, HsConfig, HsProblem, HsRunner, Sampler,
//! };
//!
//! struct Identity {
//!     design: DesignSpace,
//! }
//!
//! impl HsProblem for Identity {
//!     fn design(&self) -> &DesignSpace {
//!         &self.design
//!     }
//!
//!     fn evaluate(&self, harmony: &Harmony) -> Result<Evaluation, String> {
//!         let x = harmony.number("x").ok_or("x missing")?;
//!         Ok(Evaluation::feasible(x))
//!     }
//! }
//!
//! let problem = Identity {
//!     design: DesignSpace::new().with("x", Sampler::continuous(0.0, 10.0)),
//! };
//! let config = HsConfig::default()
//!     .with_memory_size(5)
//!     .with_max_iterations(50)
//!     .with_seed(42);
//!
//! let result = HsRunner::run(&problem, &config);
//! assert!(result.best_fitness >= 0.0 && result.best_fitness <= 10.0);
//! ```
//!
//! # References
//!
//! - Geem, Kim & Loganathan (2001), *A New Heuristic Optimization
//!   Algorithm: Harmony Search*
//! - Lee & Geem (2005), *A new meta-heuristic algorithm for continuous
//!   engineering optimization*
//! - Coello (2000), *Use of a self-adaptive penalty approach for
//!   engineering optimization problems*

pub mod config;
pub mod design;
pub mod memory;
pub mod restart;
pub mod runner;
pub mod types;

pub use config::HsConfig;
pub use design::{DesignSpace, Sampler};
pub use memory::HarmonyMemory;
pub use runner::{HsResult, HsRunner, IterationRecord};
pub use types::{Evaluation, Harmony, HsProblem, Sense, Value};
