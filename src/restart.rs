//! Independent-restart driver.
//!
//! One Harmony Search run is strictly sequential, but independent restarts
//! share no state and are embarrassingly parallel. [`best_of`] runs the
//! same problem N times with derived seeds and keeps the
//! feasibility-aware best result — in parallel via rayon when the
//! `parallel` feature is enabled, sequentially otherwise.

use crate::config::HsConfig;
use crate::runner::{HsResult, HsRunner};
use crate::types::{HsProblem, Sense};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Runs `runs` independent searches and returns the best result.
///
/// When the configuration carries a seed, run `i` uses `seed + i`, so a
/// seeded best-of-N is reproducible and `best_of(problem, &config, 1)`
/// equals a plain [`HsRunner::run`]. Results compare feasibility-first:
/// a feasible result beats an infeasible one, feasible results compare by
/// fitness per the problem's sense, infeasible ones by violation.
///
/// # Panics
/// Panics if `runs` is zero, or if the configuration or design space is
/// invalid.
pub fn best_of<P: HsProblem>(problem: &P, config: &HsConfig, runs: usize) -> HsResult {
    assert!(runs >= 1, "best_of requires at least one run");

    let configs: Vec<HsConfig> = (0..runs)
        .map(|i| {
            let mut derived = config.clone();
            if let Some(seed) = config.seed {
                derived.seed = Some(seed.wrapping_add(i as u64));
            }
            derived
        })
        .collect();

    #[cfg(feature = "parallel")]
    let results: Vec<HsResult> = configs
        .par_iter()
        .map(|c| HsRunner::run(problem, c))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results: Vec<HsResult> = configs.iter().map(|c| HsRunner::run(problem, c)).collect();

    let sense = problem.sense();
    results
        .into_iter()
        .reduce(|best, candidate| {
            if prefers(sense, &candidate, &best) {
                candidate
            } else {
                best
            }
        })
        .expect("at least one run")
}

/// Whether result `a` outranks result `b`, feasibility first.
fn prefers(sense: Sense, a: &HsResult, b: &HsResult) -> bool {
    match (a.best_penalty <= 0.0, b.best_penalty <= 0.0) {
        (true, false) => true,
        (false, true) => false,
        (true, true) => sense.better(a.best_fitness, b.best_fitness),
        (false, false) => a.best_penalty < b.best_penalty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{DesignSpace, Sampler};
    use crate::types::{Evaluation, Harmony};

    struct Identity {
        design: DesignSpace,
    }

    impl Identity {
        fn new() -> Self {
            Self {
                design: DesignSpace::new().with("x", Sampler::continuous(0.0, 10.0)),
            }
        }
    }

    impl HsProblem for Identity {
        fn design(&self) -> &DesignSpace {
            &self.design
        }

        fn evaluate(&self, harmony: &Harmony) -> Result<Evaluation, String> {
            Ok(Evaluation::feasible(
                harmony.number("x").ok_or("x missing")?,
            ))
        }
    }

    fn config() -> HsConfig {
        HsConfig::default()
            .with_memory_size(5)
            .with_max_iterations(40)
            .with_seed(42)
    }

    #[test]
    fn test_single_restart_matches_plain_run() {
        let problem = Identity::new();
        let direct = HsRunner::run(&problem, &config());
        let restarted = best_of(&problem, &config(), 1);
        assert_eq!(direct.best, restarted.best);
        assert_eq!(direct.best_fitness, restarted.best_fitness);
    }

    #[test]
    fn test_best_of_never_worse_than_first_run() {
        let problem = Identity::new();
        let single = HsRunner::run(&problem, &config());
        let multi = best_of(&problem, &config(), 8);
        assert!(multi.best_fitness <= single.best_fitness);
        assert!((0.0..=10.0).contains(&multi.best_fitness));
    }

    #[test]
    fn test_best_of_is_deterministic_when_seeded() {
        let problem = Identity::new();
        let a = best_of(&problem, &config(), 4);
        let b = best_of(&problem, &config(), 4);
        assert_eq!(a.best, b.best);
        assert_eq!(a.best_fitness, b.best_fitness);
    }

    #[test]
    #[should_panic(expected = "at least one run")]
    fn test_zero_runs_panics() {
        let problem = Identity::new();
        best_of(&problem, &config(), 0);
    }

    #[test]
    fn test_prefers_feasibility_first() {
        let problem = Identity::new();
        let template = HsRunner::run(&problem, &config());

        let mut feasible = template.clone();
        feasible.best_fitness = 100.0;
        feasible.best_penalty = 0.0;

        let mut infeasible = template.clone();
        infeasible.best_fitness = 1.0;
        infeasible.best_penalty = 4.0;

        assert!(prefers(Sense::Minimize, &feasible, &infeasible));
        assert!(!prefers(Sense::Minimize, &infeasible, &feasible));

        let mut less_violating = infeasible.clone();
        less_violating.best_penalty = 2.0;
        assert!(prefers(Sense::Minimize, &less_violating, &infeasible));
    }
}
