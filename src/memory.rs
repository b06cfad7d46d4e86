//! Harmony memory: the engine's entire mutable state.
//!
//! A fixed-capacity population of evaluated harmonies stored as three
//! index-aligned arrays (members, fitness, penalty), plus cached best and
//! worst indices. The memory is populated once at initialization and then
//! mutated only by single-slot replacement of the worst member; it never
//! grows or shrinks.
//!
//! # Ranking
//!
//! Members are ranked feasibility-first: a feasible member always outranks
//! an infeasible one; feasible members compare by fitness per the
//! optimization sense; infeasible members compare by violation magnitude.
//! Fitness plays no part in ranking infeasible members.

use crate::types::{Evaluation, Harmony, Sense, Value};

/// Fixed-size population of `(Harmony, fitness, penalty)` triples with
/// best/worst bookkeeping.
///
/// Owned exclusively by one run; [`HsResult`](crate::HsResult) carries the
/// final state for inspection after the run ends.
#[derive(Debug, Clone)]
pub struct HarmonyMemory {
    sense: Sense,
    members: Vec<Harmony>,
    fitness: Vec<f64>,
    penalty: Vec<f64>,
    best_index: usize,
    worst_index: usize,
}

impl HarmonyMemory {
    pub(crate) fn with_capacity(sense: Sense, capacity: usize) -> Self {
        Self {
            sense,
            members: Vec::with_capacity(capacity),
            fitness: Vec::with_capacity(capacity),
            penalty: Vec::with_capacity(capacity),
            best_index: 0,
            worst_index: 0,
        }
    }

    /// Appends an evaluated member during initialization.
    ///
    /// Best/worst indices are stale until
    /// [`recompute_best_worst`](Self::recompute_best_worst) runs.
    pub(crate) fn push(&mut self, harmony: Harmony, eval: Evaluation) {
        self.members.push(harmony);
        self.fitness.push(eval.fitness);
        self.penalty.push(eval.penalty);
    }

    /// Recomputes best/worst indices from scratch in O(len).
    ///
    /// Three cases over the feasibility split:
    /// - all infeasible: best has minimum penalty, worst has maximum
    ///   penalty among the remaining members;
    /// - all feasible: best has the best fitness per sense, worst has the
    ///   worst fitness among the remaining members;
    /// - mixed: worst has maximum penalty outright, best has the best
    ///   fitness over the feasible subset.
    ///
    /// Ties resolve to the lowest index.
    pub(crate) fn recompute_best_worst(&mut self) {
        let n = self.members.len();
        debug_assert!(n >= 2, "memory needs at least two members to rank");

        let feasible_count = self.penalty.iter().filter(|&&p| p <= 0.0).count();

        if feasible_count == 0 {
            let mut best = 0;
            for i in 1..n {
                if self.penalty[i] < self.penalty[best] {
                    best = i;
                }
            }
            let mut worst = if best == 0 { 1 } else { 0 };
            for i in 0..n {
                if i != best && self.penalty[i] > self.penalty[worst] {
                    worst = i;
                }
            }
            self.best_index = best;
            self.worst_index = worst;
        } else if feasible_count == n {
            let mut best = 0;
            for i in 1..n {
                if self.sense.better(self.fitness[i], self.fitness[best]) {
                    best = i;
                }
            }
            let mut worst = if best == 0 { 1 } else { 0 };
            for i in 0..n {
                if i != best && self.sense.better(self.fitness[worst], self.fitness[i]) {
                    worst = i;
                }
            }
            self.best_index = best;
            self.worst_index = worst;
        } else {
            let mut worst = 0;
            for i in 1..n {
                if self.penalty[i] > self.penalty[worst] {
                    worst = i;
                }
            }
            let mut best: Option<usize> = None;
            for i in 0..n {
                if self.penalty[i] <= 0.0
                    && best.is_none_or(|b| self.sense.better(self.fitness[i], self.fitness[b]))
                {
                    best = Some(i);
                }
            }
            self.best_index = best.expect("mixed case has a feasible member");
            self.worst_index = worst;
        }
    }

    /// Applies the replacement policy to a freshly evaluated candidate.
    ///
    /// The candidate competes against the current worst member:
    /// - both infeasible: replace iff the candidate violates less;
    /// - both feasible: replace iff the candidate's fitness is strictly
    ///   better per sense;
    /// - candidate feasible, worst infeasible: always replace;
    /// - candidate infeasible, worst feasible: never replace.
    ///
    /// On replacement the worst slot is overwritten in place and best/worst
    /// are recomputed. Returns whether the candidate was accepted.
    pub(crate) fn try_replace(&mut self, harmony: Harmony, eval: Evaluation) -> bool {
        let w = self.worst_index;
        let worst_feasible = self.penalty[w] <= 0.0;

        let accept = if eval.is_feasible() {
            !worst_feasible || self.sense.better(eval.fitness, self.fitness[w])
        } else {
            !worst_feasible && eval.penalty < self.penalty[w]
        };

        if accept {
            self.members[w] = harmony;
            self.fitness[w] = eval.fitness;
            self.penalty[w] = eval.penalty;
            self.recompute_best_worst();
        }
        accept
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the memory holds no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The optimization sense this memory ranks by.
    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Index of the current best member.
    pub fn best_index(&self) -> usize {
        self.best_index
    }

    /// Index of the current worst member.
    pub fn worst_index(&self) -> usize {
        self.worst_index
    }

    /// The current best harmony.
    pub fn best_harmony(&self) -> &Harmony {
        &self.members[self.best_index]
    }

    /// Fitness of the current best member.
    pub fn best_fitness(&self) -> f64 {
        self.fitness[self.best_index]
    }

    /// Penalty of the current best member.
    pub fn best_penalty(&self) -> f64 {
        self.penalty[self.best_index]
    }

    /// Fitness of the current worst member.
    pub fn worst_fitness(&self) -> f64 {
        self.fitness[self.worst_index]
    }

    /// Penalty of the current worst member.
    pub fn worst_penalty(&self) -> f64 {
        self.penalty[self.worst_index]
    }

    /// The member at an index as `(harmony, fitness, penalty)`.
    pub fn member(&self, index: usize) -> (&Harmony, f64, f64) {
        (&self.members[index], self.fitness[index], self.penalty[index])
    }

    /// Read-only snapshot of all members in index order.
    pub fn snapshot(&self) -> Vec<(Harmony, f64, f64)> {
        (0..self.len())
            .map(|i| (self.members[i].clone(), self.fitness[i], self.penalty[i]))
            .collect()
    }

    /// The values currently held for one variable across all members.
    pub(crate) fn values_for(&self, var: usize) -> impl Iterator<Item = &Value> + '_ {
        self.members.iter().map(move |h| h.value_at(var))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn names() -> Arc<[String]> {
        vec!["x".to_string()].into()
    }

    fn h(x: f64) -> Harmony {
        Harmony::new(names(), vec![Value::Number(x)])
    }

    fn memory(sense: Sense, evals: &[(f64, f64)]) -> HarmonyMemory {
        let mut m = HarmonyMemory::with_capacity(sense, evals.len());
        for (i, &(fitness, penalty)) in evals.iter().enumerate() {
            m.push(h(i as f64), Evaluation::new(fitness, penalty));
        }
        m.recompute_best_worst();
        m
    }

    #[test]
    fn test_all_feasible_minimize() {
        let m = memory(Sense::Minimize, &[(3.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert_eq!(m.best_index(), 1);
        assert_eq!(m.worst_index(), 0);
    }

    #[test]
    fn test_all_feasible_maximize() {
        let m = memory(Sense::Maximize, &[(3.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert_eq!(m.best_index(), 0);
        assert_eq!(m.worst_index(), 1);
    }

    #[test]
    fn test_all_infeasible_ranks_by_penalty_only() {
        // Fitness is deliberately misleading; ranking must ignore it.
        let m = memory(Sense::Minimize, &[(0.0, 5.0), (99.0, 1.0), (50.0, 9.0)]);
        assert_eq!(m.best_index(), 1);
        assert_eq!(m.worst_index(), 2);
    }

    #[test]
    fn test_all_infeasible_worst_excludes_best() {
        // Two members with equal penalties: best takes the first,
        // worst must be the other.
        let m = memory(Sense::Minimize, &[(0.0, 4.0), (0.0, 4.0)]);
        assert_eq!(m.best_index(), 0);
        assert_eq!(m.worst_index(), 1);
    }

    #[test]
    fn test_mixed_worst_is_most_infeasible() {
        let m = memory(
            Sense::Minimize,
            &[(10.0, 0.0), (1.0, 7.0), (2.0, 0.0), (0.5, 3.0)],
        );
        // Best fitness among feasible members {0, 2} is index 2.
        assert_eq!(m.best_index(), 2);
        // Worst is the largest penalty, despite its good fitness.
        assert_eq!(m.worst_index(), 1);
    }

    #[test]
    fn test_all_feasible_tie_resolves_to_first() {
        let m = memory(Sense::Minimize, &[(1.0, 0.0), (1.0, 0.0), (5.0, 0.0)]);
        assert_eq!(m.best_index(), 0);
        assert_eq!(m.worst_index(), 2);
    }

    #[test]
    fn test_replace_feasible_over_infeasible_worst() {
        let mut m = memory(Sense::Minimize, &[(1.0, 0.0), (2.0, 6.0)]);
        assert_eq!(m.worst_index(), 1);
        // Feasible candidate with awful fitness still dominates an
        // infeasible worst.
        assert!(m.try_replace(h(9.0), Evaluation::feasible(1000.0)));
        assert_eq!(m.len(), 2);
        assert!(m.worst_penalty() <= 0.0);
    }

    #[test]
    fn test_infeasible_candidate_never_replaces_feasible_worst() {
        let mut m = memory(Sense::Minimize, &[(1.0, 0.0), (2.0, 0.0)]);
        assert!(!m.try_replace(h(9.0), Evaluation::new(0.0, 0.1)));
        assert_eq!(m.worst_fitness(), 2.0);
    }

    #[test]
    fn test_infeasible_replaces_worse_infeasible() {
        let mut m = memory(Sense::Minimize, &[(1.0, 2.0), (1.0, 8.0)]);
        assert!(m.try_replace(h(9.0), Evaluation::new(50.0, 5.0)));
        assert_eq!(m.worst_penalty(), 5.0);

        // Equal or larger violation is rejected.
        assert!(!m.try_replace(h(9.0), Evaluation::new(0.0, 5.0)));
        assert!(!m.try_replace(h(9.0), Evaluation::new(0.0, 7.0)));
    }

    #[test]
    fn test_feasible_replaces_strictly_better_only() {
        let mut m = memory(Sense::Minimize, &[(1.0, 0.0), (3.0, 0.0)]);
        assert!(!m.try_replace(h(9.0), Evaluation::feasible(3.0)));
        assert!(!m.try_replace(h(9.0), Evaluation::feasible(4.0)));
        assert!(m.try_replace(h(9.0), Evaluation::feasible(2.0)));
        assert_eq!(m.worst_fitness(), 2.0);
    }

    #[test]
    fn test_maximize_replacement_direction() {
        let mut m = memory(Sense::Maximize, &[(5.0, 0.0), (3.0, 0.0)]);
        assert_eq!(m.worst_index(), 1);
        assert!(!m.try_replace(h(9.0), Evaluation::feasible(2.0)));
        assert!(m.try_replace(h(9.0), Evaluation::feasible(4.0)));
        assert_eq!(m.best_fitness(), 5.0);
        assert_eq!(m.worst_fitness(), 4.0);
    }

    #[test]
    fn test_cached_indices_match_recomputation() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(11);
        let mut m = memory(
            Sense::Minimize,
            &[(4.0, 0.0), (2.0, 3.0), (7.0, 0.0), (1.0, 9.0)],
        );

        for _ in 0..500 {
            let fitness = rng.random_range(0.0..10.0);
            let penalty = if rng.random_range(0.0..1.0) < 0.5 {
                0.0
            } else {
                rng.random_range(0.0..10.0)
            };
            m.try_replace(h(fitness), Evaluation::new(fitness, penalty));

            let mut fresh = m.clone();
            fresh.recompute_best_worst();
            assert_eq!(m.best_index(), fresh.best_index());
            assert_eq!(m.worst_index(), fresh.worst_index());
            assert_eq!(m.len(), 4);
        }
    }

    #[test]
    fn test_snapshot_preserves_order_and_values() {
        let m = memory(Sense::Minimize, &[(3.0, 0.0), (1.0, 2.0)]);
        let snap = m.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].1, 3.0);
        assert_eq!(snap[1].2, 2.0);
    }
}
