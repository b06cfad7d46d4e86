//! Criterion benchmarks for the Harmony Search engine.
//!
//! Uses synthetic problems (sphere function, pressure-vessel design) to
//! measure pure engine overhead independent of any domain.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use harmony_search::{DesignSpace, Evaluation, Harmony, HsConfig, HsProblem, HsRunner, Sampler};

// ===========================================================================
// Sphere function: minimize sum(x_i^2)
// ===========================================================================

struct Sphere {
    design: DesignSpace,
}

impl Sphere {
    fn new(dim: usize) -> Self {
        let mut design = DesignSpace::new();
        for i in 0..dim {
            design.add(format!("x{i}"), Sampler::continuous(-5.0, 5.0));
        }
        Self { design }
    }
}

impl HsProblem for Sphere {
    fn design(&self) -> &DesignSpace {
        &self.design
    }

    fn evaluate(&self, harmony: &Harmony) -> Result<Evaluation, String> {
        let sum = harmony
            .values()
            .iter()
            .filter_map(|v| v.as_number())
            .map(|x| x * x)
            .sum();
        Ok(Evaluation::feasible(sum))
    }
}

fn bench_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("hs_sphere");
    for dim in [2usize, 8, 32] {
        let problem = Sphere::new(dim);
        let config = HsConfig::default()
            .with_memory_size(20)
            .with_max_iterations(1_000)
            .with_seed(42);
        group.bench_with_input(BenchmarkId::from_parameter(dim), &dim, |b, _| {
            b.iter(|| HsRunner::run(black_box(&problem), black_box(&config)));
        });
    }
    group.finish();
}

// ===========================================================================
// Pressure vessel design (Sandgren 1990 formulation, penalty-based)
// ===========================================================================

struct PressureVessel {
    design: DesignSpace,
}

impl PressureVessel {
    fn new() -> Self {
        Self {
            design: DesignSpace::new()
                .with("x1", Sampler::continuous(0.1, 2.0))
                .with("x2", Sampler::continuous(0.1, 2.0))
                .with("x3", Sampler::continuous(10.0, 100.0))
                .with("x4", Sampler::continuous(10.0, 240.0)),
        }
    }
}

impl HsProblem for PressureVessel {
    fn design(&self) -> &DesignSpace {
        &self.design
    }

    fn evaluate(&self, harmony: &Harmony) -> Result<Evaluation, String> {
        let x1 = harmony.number("x1").ok_or("x1 missing")?;
        let x2 = harmony.number("x2").ok_or("x2 missing")?;
        let x3 = harmony.number("x3").ok_or("x3 missing")?;
        let x4 = harmony.number("x4").ok_or("x4 missing")?;

        let fitness = 0.6224 * x1 * x3 * x4
            + 1.7781 * x2.powi(2) * x3
            + 3.1661 * x1.powi(2) * x4
            + 19.8621 * x1 * x3.powi(2);

        let pi = std::f64::consts::PI;
        let constraints = [
            -x1 + 0.0193 * x3,
            -x2 + 0.00954 * x3,
            -pi * x3.powi(2) * x4 - (4.0 / 3.0) * pi * x3.powi(3) + 1_296_000.0,
            x4 - 240.0,
        ];
        let penalty: f64 = constraints.iter().map(|&g| g.max(0.0)).sum();

        Ok(Evaluation::new(fitness, penalty))
    }
}

fn bench_pressure_vessel(c: &mut Criterion) {
    let problem = PressureVessel::new();
    let config = HsConfig::default()
        .with_hmcr(0.9)
        .with_par(0.2)
        .with_memory_size(30)
        .with_max_iterations(2_000)
        .with_seed(42);

    c.bench_function("hs_pressure_vessel", |b| {
        b.iter(|| HsRunner::run(black_box(&problem), black_box(&config)));
    });
}

// ===========================================================================
// Evaluation cache on a small discrete space (repeat candidates dominate)
// ===========================================================================

struct DiscreteGrid {
    design: DesignSpace,
}

impl DiscreteGrid {
    fn new() -> Self {
        Self {
            design: DesignSpace::new()
                .with("a", Sampler::discrete([0, 1, 2, 3, 4]))
                .with("b", Sampler::discrete([0, 1, 2, 3, 4]))
                .with("c", Sampler::discrete([0, 1, 2, 3, 4])),
        }
    }
}

impl HsProblem for DiscreteGrid {
    fn design(&self) -> &DesignSpace {
        &self.design
    }

    fn evaluate(&self, harmony: &Harmony) -> Result<Evaluation, String> {
        let sum = harmony
            .values()
            .iter()
            .filter_map(|v| v.as_number())
            .sum();
        Ok(Evaluation::feasible(sum))
    }
}

fn bench_evaluation_cache(c: &mut Criterion) {
    let problem = DiscreteGrid::new();
    let mut group = c.benchmark_group("hs_discrete_grid");
    for cached in [false, true] {
        let config = HsConfig::default()
            .with_memory_size(10)
            .with_max_iterations(2_000)
            .with_seed(42)
            .with_cache_evaluations(cached);
        let label = if cached { "cached" } else { "uncached" };
        group.bench_function(label, |b| {
            b.iter(|| HsRunner::run(black_box(&problem), black_box(&config)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_sphere,
    bench_pressure_vessel,
    bench_evaluation_cache
);
criterion_main!(benches);
