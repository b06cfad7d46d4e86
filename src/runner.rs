//! Harmony Search execution loop.
//!
//! [`HsRunner`] orchestrates the complete search: memory initialization →
//! improvise → evaluate → replace, repeated for the configured iteration
//! budget. The loop is strictly sequential: every iteration depends on the
//! memory state left by the previous one.

use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::HsConfig;
use crate::design::{DesignSpace, SampleContext};
use crate::memory::HarmonyMemory;
use crate::types::{Evaluation, Harmony, HsProblem, Sense, Value};

/// Best-member snapshot taken at the end of one iteration.
///
/// Recorded only when [`HsConfig::log_progress`] is set.
#[derive(Debug, Clone)]
pub struct IterationRecord {
    /// 1-based iteration index.
    pub iteration: usize,
    /// Best harmony at the end of the iteration.
    pub best: Harmony,
    /// Fitness of the best member.
    pub best_fitness: f64,
    /// Penalty of the best member.
    pub best_penalty: f64,
}

/// Result of a Harmony Search run.
///
/// Contains the best member found, evaluation accounting, and the final
/// harmony memory for inspection.
#[derive(Debug, Clone)]
pub struct HsResult {
    /// The best harmony in the final memory.
    pub best: Harmony,

    /// Fitness of the best member.
    pub best_fitness: f64,

    /// Penalty of the best member; `<= 0.0` means the solution is
    /// feasible.
    pub best_penalty: f64,

    /// Number of improvisation iterations executed.
    pub iterations: usize,

    /// Number of objective calls actually made (cache hits excluded).
    pub evaluations: usize,

    /// Number of evaluations answered from the per-run cache.
    pub cache_hits: usize,

    /// Number of objective calls that failed and were scored with the
    /// sentinel evaluation.
    pub failed_evaluations: usize,

    /// Best fitness after initialization and after each iteration
    /// (`max_iterations + 1` entries).
    pub fitness_history: Vec<f64>,

    /// Per-iteration best snapshots; empty unless
    /// [`HsConfig::log_progress`] was set.
    pub progress: Vec<IterationRecord>,

    /// The final harmony memory, for diagnostics.
    pub memory: HarmonyMemory,
}

/// Executes the Harmony Search loop.
///
/// The runner is stateless: each [`run`](HsRunner::run) call owns a fresh
/// harmony memory and RNG, so runs never share mutable state and
/// independent runs may execute concurrently (see
/// [`restart`](crate::restart)).
///
/// # Usage
///
/// ```ignore
/// let problem = MyProblem::new();
/// let config = HsConfig::default().with_seed(42);
/// let result = HsRunner::run(&problem, &config);
/// println!("best: {} (fitness {})", result.best, result.best_fitness);
/// ```
pub struct HsRunner;

impl HsRunner {
    /// Runs the optimization.
    ///
    /// The run terminates only by exhausting the iteration budget; there
    /// is no in-run cancellation or timeout.
    ///
    /// # Panics
    /// Panics if the configuration or design space is invalid (call
    /// [`HsConfig::validate`] and
    /// [`DesignSpace::validate`](crate::DesignSpace::validate) first to
    /// get the descriptive error).
    pub fn run<P: HsProblem>(problem: &P, config: &HsConfig) -> HsResult {
        config.validate().expect("invalid HsConfig");
        let design = problem.design();
        design.validate().expect("invalid design space");
        let order = design
            .sampling_order()
            .expect("design space already validated");
        let sense = problem.sense();

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        let names = design.shared_names();
        let mut evaluator = Evaluator::new(config.cache_evaluations, sense);

        // 1. Initialize harmony memory
        let mut memory = HarmonyMemory::with_capacity(sense, config.memory_size);
        for _ in 0..config.memory_size {
            let harmony = design.draw(&names, &order, &mut rng);
            let eval = evaluator.evaluate(problem, &harmony);
            memory.push(harmony, eval);
        }
        memory.recompute_best_worst();

        let mut fitness_history = Vec::with_capacity(config.max_iterations + 1);
        fitness_history.push(memory.best_fitness());
        let mut progress = Vec::new();

        // 2. Improvisation loop
        for iteration in 1..=config.max_iterations {
            let candidate = improvise(
                design,
                &memory,
                &names,
                &order,
                config.hmcr,
                config.par,
                &mut rng,
            );
            let eval = evaluator.evaluate(problem, &candidate);
            memory.try_replace(candidate, eval);

            fitness_history.push(memory.best_fitness());
            problem.on_iteration(iteration, memory.best_fitness(), memory.best_penalty());
            if config.log_progress {
                progress.push(IterationRecord {
                    iteration,
                    best: memory.best_harmony().clone(),
                    best_fitness: memory.best_fitness(),
                    best_penalty: memory.best_penalty(),
                });
            }
        }

        HsResult {
            best: memory.best_harmony().clone(),
            best_fitness: memory.best_fitness(),
            best_penalty: memory.best_penalty(),
            iterations: config.max_iterations,
            evaluations: evaluator.evaluations,
            cache_hits: evaluator.cache_hits,
            failed_evaluations: evaluator.failed_evaluations,
            fitness_history,
            progress,
            memory,
        }
    }
}

/// Improvises one candidate harmony.
///
/// Per variable, in sampling order: with probability `hmcr` recall one
/// member's value for that variable (restricted to values admissible under
/// tracked bounds already resolved this draw; fresh sample when none is),
/// otherwise sample fresh; then, independently, with probability `par`
/// overwrite with a fresh sample. Variables are chosen independently, so
/// the candidate is a per-variable mosaic across the whole memory, not a
/// recombination of one member.
fn improvise<R: Rng>(
    design: &DesignSpace,
    memory: &HarmonyMemory,
    names: &Arc<[String]>,
    order: &[usize],
    hmcr: f64,
    par: f64,
    rng: &mut R,
) -> Harmony {
    let mut slots: Vec<Option<Value>> = vec![None; design.len()];
    for &i in order {
        let value = {
            let ctx = SampleContext::new(design, &slots);
            let sampler = design.sampler(i);
            let mut value = if rng.random_range(0.0..1.0) < hmcr {
                let pool: Vec<&Value> = memory
                    .values_for(i)
                    .filter(|v| sampler.accepts(v, &ctx))
                    .collect();
                if pool.is_empty() {
                    sampler.sample_in(&ctx, rng)
                } else {
                    pool[rng.random_range(0..pool.len())].clone()
                }
            } else {
                sampler.sample_in(&ctx, rng)
            };
            if rng.random_range(0.0..1.0) < par {
                value = sampler.sample_in(&ctx, rng);
            }
            value
        };
        slots[i] = Some(value);
    }
    let values = slots
        .into_iter()
        .map(|v| v.expect("sampling order covers every variable"))
        .collect();
    Harmony::new(names.clone(), values)
}

/// Evaluation path shared by initialization and the loop: optional
/// memoization plus the uniform failure policy.
struct Evaluator {
    cache: Option<HashMap<Vec<CacheKey>, Evaluation>>,
    sentinel_fitness: f64,
    evaluations: usize,
    cache_hits: usize,
    failed_evaluations: usize,
}

#[derive(Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Number(u64),
    Label(String),
}

fn cache_key(harmony: &Harmony) -> Vec<CacheKey> {
    harmony
        .values()
        .iter()
        .map(|v| match v {
            Value::Number(n) => CacheKey::Number(n.to_bits()),
            Value::Label(s) => CacheKey::Label(s.clone()),
        })
        .collect()
}

impl Evaluator {
    fn new(cache_evaluations: bool, sense: Sense) -> Self {
        Self {
            cache: cache_evaluations.then(HashMap::new),
            sentinel_fitness: sense.worst_fitness(),
            evaluations: 0,
            cache_hits: 0,
            failed_evaluations: 0,
        }
    }

    fn evaluate<P: HsProblem>(&mut self, problem: &P, harmony: &Harmony) -> Evaluation {
        let key = match &self.cache {
            Some(cache) => {
                let key = cache_key(harmony);
                if let Some(&cached) = cache.get(&key) {
                    self.cache_hits += 1;
                    return cached;
                }
                Some(key)
            }
            None => None,
        };

        let eval = self.call(problem, harmony);
        if let (Some(cache), Some(key)) = (&mut self.cache, key) {
            cache.insert(key, eval);
        }
        eval
    }

    /// A failed evaluation is scored as worst-possible fitness with
    /// infinite penalty: never best while a valid member exists, always
    /// first in line for replacement.
    fn call<P: HsProblem>(&mut self, problem: &P, harmony: &Harmony) -> Evaluation {
        self.evaluations += 1;
        match problem.evaluate(harmony) {
            Ok(eval) => eval,
            Err(_) => {
                self.failed_evaluations += 1;
                Evaluation::new(self.sentinel_fitness, f64::INFINITY)
            }
        }
    }
}
