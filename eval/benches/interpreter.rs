//! Benches for parsing and evaluation.
//!
//! Implemented benches:
//!
//! - Parsing a medium-sized expression with calls and variables
//! - Re-evaluating a parsed program under variable mutation
//! - Native baseline for the evaluated expression

use criterion::{criterion_group, criterion_main, Bencher, Criterion};

use expression_eval::{fns, Environment, ParseMode};

const EXPRESSION: &str = "sin(2 * pi * x) + x^2 - atan2(x, 1 + x) / max(x, 0.5)";

fn bench_env() -> Environment<f64> {
    let mut env = Environment::new();
    fns::install(&mut env).unwrap();
    env.register_variable("x", 0.0).unwrap();
    env
}

fn bench_parse(bencher: &mut Bencher<'_>) {
    let env = bench_env();
    bencher.iter(|| env.parse(EXPRESSION, ParseMode::Normal).unwrap());
}

fn bench_evaluate(bencher: &mut Bencher<'_>) {
    let env = bench_env();
    let x = env.get_variable("x").unwrap();
    let program = env.parse(EXPRESSION, ParseMode::Normal).unwrap();

    let mut i = 0_u32;
    bencher.iter(|| {
        i = i.wrapping_add(1);
        x.set(f64::from(i) * 0.001).unwrap();
        program.evaluate().unwrap()
    });
}

fn bench_evaluate_native(bencher: &mut Bencher<'_>) {
    let mut i = 0_u32;
    bencher.iter(|| {
        i = i.wrapping_add(1);
        let x = f64::from(i) * 0.001;
        (2.0 * std::f64::consts::PI * x).sin() + x.powf(2.0)
            - x.atan2(1.0 + x) / x.max(0.5)
    });
}

fn main_benches(criterion: &mut Criterion) {
    criterion
        .bench_function("parse", bench_parse)
        .bench_function("evaluate", bench_evaluate)
        .bench_function("evaluate_native", bench_evaluate_native);
}

criterion_group!(benches, main_benches);
criterion_main!(benches);
