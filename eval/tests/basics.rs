use assert_matches::assert_matches;

use expression_eval::{
    fns, Associativity, DefineError, DictError, Environment, EvalError, NativeOp, Operand,
    ParseErrorKind, ParseMode,
};

fn math_env() -> Environment<f64> {
    let mut env = Environment::new();
    fns::install(&mut env).unwrap();
    fns::register_assignment(&mut env).unwrap();
    env
}

fn evaluate(env: &Environment<f64>, input: &str) -> f64 {
    env.parse(input, ParseMode::Normal)
        .unwrap()
        .evaluate()
        .unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "{} != {}",
        actual,
        expected
    );
}

#[test]
fn precedence_and_grouping() {
    let env = math_env();
    assert_eq!(evaluate(&env, "1 + 2 * 3"), 7.0);
    assert_eq!(evaluate(&env, "(1 + 2) * 3"), 9.0);
    assert_eq!(evaluate(&env, "7 % 4 + 10 / 4"), 5.5);
    assert_eq!(evaluate(&env, "-2^2"), -4.0);
}

#[test]
fn power_is_right_associative_by_default() {
    let env = math_env();
    assert_eq!(evaluate(&env, "2 ^ 3 ^ 2"), 512.0);

    let mut left_env = Environment::new();
    fns::standard_syntax(&mut left_env);
    left_env.set_constant_parser(fns::decimal_constant::<f64>);
    left_env
        .register_infix("^", 3, Associativity::Left, fns::Binary::new(f64::powf))
        .unwrap();
    assert_eq!(evaluate(&left_env, "2 ^ 3 ^ 2"), 64.0);
}

#[test]
fn function_calls() {
    let env = math_env();
    assert_close(evaluate(&env, "sin(0) + cos(0)"), 1.0);
    assert_eq!(evaluate(&env, "max(2, 7)"), 7.0);
    assert_eq!(evaluate(&env, "atan2(0, 1)"), 0.0);
    assert_close(evaluate(&env, "log(2, 8)"), 3.0);
    assert_close(evaluate(&env, "lg(100) + log10(100)"), 4.0);
    assert_close(evaluate(&env, "root(3, 27)"), 3.0);
    assert_close(evaluate(&env, "hypot(3, 4)"), 5.0);
}

#[test]
fn constants_fold_in_normal_mode() {
    let env = math_env();
    assert_close(evaluate(&env, "sin(2 * pi)"), 0.0);
    assert_close(evaluate(&env, "log(e, e ^ 3)"), 3.0);
}

#[test]
fn immediate_and_normal_agree_without_mutables() {
    let env = math_env();
    let source = "2 ^ 3 ^ 2 + pi / 2";
    let immediate = env
        .parse(source, ParseMode::Immediate)
        .unwrap()
        .evaluate()
        .unwrap();
    let normal = env
        .parse(source, ParseMode::Normal)
        .unwrap()
        .evaluate()
        .unwrap();
    assert_eq!(immediate, normal);
}

#[test]
fn persistent_programs_observe_mutations() {
    let mut env = math_env();
    let x = env.register_variable("x", 3.0).unwrap();

    let persistent = env.parse("x * x", ParseMode::Persistent).unwrap();
    let snapshot = env.parse("x * x", ParseMode::Immediate).unwrap();
    assert_eq!(persistent.evaluate().unwrap(), 9.0);
    assert_eq!(snapshot.evaluate().unwrap(), 9.0);

    x.set(5.0).unwrap();
    assert_eq!(persistent.evaluate().unwrap(), 25.0);
    assert_eq!(snapshot.evaluate().unwrap(), 9.0);
}

#[test]
fn assignment_through_the_evaluator() {
    let mut env = math_env();
    let x = env.register_variable("x", 3.0).unwrap();

    assert_eq!(evaluate(&env, "x = 5"), 5.0);
    assert_eq!(x.get(), 5.0);
    assert_eq!(evaluate(&env, "x + 1"), 6.0);

    // Assignment is right-associative and returns its target.
    env.register_variable("y", 0.0).unwrap();
    assert_eq!(evaluate(&env, "x = y = 2 + 1"), 3.0);
    assert_eq!(env.get_variable("y").unwrap().get(), 3.0);
    assert_eq!(x.get(), 3.0);
}

#[test]
fn assignment_to_constants_is_rejected() {
    let env = math_env();
    let err = env
        .parse("pi = 3", ParseMode::Normal)
        .unwrap()
        .evaluate()
        .unwrap_err();
    assert_matches!(err, EvalError::ConstAssignment);

    // In persistent mode the reference survives to runtime, with the same
    // outcome.
    let err = env
        .parse("pi = 3", ParseMode::Persistent)
        .unwrap()
        .evaluate()
        .unwrap_err();
    assert_matches!(err, EvalError::ConstAssignment);
}

#[test]
fn user_functions() {
    let mut env = math_env();
    env.define_function("f", &["a", "b"], "a*a + b*b").unwrap();

    assert_eq!(evaluate(&env, "f(3, 4)"), 25.0);
    assert_eq!(evaluate(&env, "f(1, 2) + f(2, 1)"), 10.0);

    // The parameters do not leak into the enclosing environment.
    assert!(env.get_variable("a").is_none());
    let err = env.parse("a", ParseMode::Normal).unwrap_err();
    assert_matches!(err.kind(), ParseErrorKind::UnexpectedCharacter);
}

#[test]
fn user_functions_can_call_the_library() {
    let mut env = math_env();
    env.define_function("norm2", &["a", "b"], "sqrt(a*a + b*b)")
        .unwrap();
    assert_close(evaluate(&env, "norm2(3, 4)"), 5.0);
}

#[test]
fn define_function_restores_shadowed_bindings() {
    let mut env = math_env();
    let a = env.register_variable("a", 10.0).unwrap();

    env.define_function("g", &["a"], "a + 1").unwrap();
    assert_eq!(env.get_variable("a").unwrap().get(), 10.0);
    assert_eq!(evaluate(&env, "g(4) + a"), 15.0);

    // The outer binding is untouched by calls.
    assert_eq!(a.get(), 10.0);
}

#[test]
fn define_function_restores_bindings_on_parse_error() {
    let mut env = math_env();
    env.register_variable("a", 10.0).unwrap();
    let keys_before = env.variables().borrow().keys();

    let err = env.define_function("g", &["a", "b"], "a $ b").unwrap_err();
    assert_matches!(err, DefineError::Parse(_));

    assert_eq!(env.variables().borrow().keys(), keys_before);
    assert_eq!(env.get_variable("a").unwrap().get(), 10.0);
    assert!(env.get_variable("b").is_none());
}

#[test]
fn define_function_rejects_duplicate_params() {
    let mut env = math_env();
    let err = env.define_function("g", &["a", "a"], "a").unwrap_err();
    assert_matches!(err, DefineError::Dict(DictError::Duplicate));
    assert!(env.get_variable("a").is_none());
}

#[test]
fn duplicate_registrations_are_rejected() {
    let mut env = math_env();
    env.register_variable("x", 1.0).unwrap();
    assert_matches!(
        env.register_variable("x", 2.0),
        Err(DictError::Duplicate)
    );

    env.define_function("f", &["a"], "a").unwrap();
    let err = env.define_function("f", &["a"], "a + 1").unwrap_err();
    assert_matches!(err, DefineError::Dict(DictError::Duplicate));
}

#[test]
fn strong_programs_survive_dictionary_pruning() {
    let mut env = math_env();
    env.register_variable("x", 2.0).unwrap();
    let program = env.parse("x * 10", ParseMode::Persistent).unwrap();

    env.variables().borrow_mut().remove("x").unwrap();
    assert_eq!(program.evaluate().unwrap(), 20.0);

    // A re-registered `x` is a fresh binding; the old program still refers
    // to the original slot.
    env.register_variable("x", 7.0).unwrap();
    assert_eq!(program.evaluate().unwrap(), 20.0);
}

#[test]
fn weak_programs_expire_with_their_bindings() {
    let mut env = math_env();
    let program = {
        let x = env.register_variable("x", 1.0).unwrap();
        let program = env.parse_weak("x + 1", ParseMode::Persistent).unwrap();
        assert_eq!(program.evaluate().unwrap(), 2.0);
        env.variables().borrow_mut().remove("x").unwrap();
        drop(x);
        program
    };
    assert_matches!(program.evaluate(), Err(EvalError::ExpiredBinding));
}

struct Fail;

impl NativeOp<f64> for Fail {
    fn evaluate(&self, _: &mut [Operand<f64>]) -> Result<Option<Operand<f64>>, EvalError> {
        Err(EvalError::callable("division by zero"))
    }
}

#[test]
fn callable_errors_pass_through() {
    let mut env = math_env();
    env.register_function("fail", 1, Fail).unwrap();

    let err = env
        .parse("1 + fail(0)", ParseMode::Normal)
        .unwrap()
        .evaluate()
        .unwrap_err();
    assert_matches!(err, EvalError::Callable(e) if e.to_string() == "division by zero");
}

#[test]
fn environments_share_dictionaries() {
    let mut env = math_env();
    let mut clone = env.clone();
    clone.register_variable("shared", 4.0).unwrap();

    // Registration through the clone is visible to the original.
    assert_eq!(evaluate(&env, "shared + 1"), 5.0);

    // A fresh environment can adopt a single dictionary.
    let mut bare = Environment::new();
    bare.set_variables(env.variables().clone());
    let program = bare.parse("shared", ParseMode::Persistent).unwrap();
    env.get_variable("shared").unwrap().set(9.0).unwrap();
    assert_eq!(program.evaluate().unwrap(), 9.0);
}

#[test]
fn parse_errors_render_their_position() {
    let env = math_env();
    let err = env.parse("1 + $", ParseMode::Normal).unwrap_err();
    assert_eq!(err.to_string(), "Unexpected character at position 4");
}

#[cfg(feature = "complex")]
mod complex {
    use super::*;
    use num_complex::Complex64;

    fn complex_env() -> Environment<Complex64> {
        let mut env = Environment::new();
        fns::complex::install(&mut env).unwrap();
        env
    }

    fn evaluate(env: &Environment<Complex64>, input: &str) -> Complex64 {
        env.parse(input, ParseMode::Normal)
            .unwrap()
            .evaluate()
            .unwrap()
    }

    #[test]
    fn imaginary_suffix_and_constant() {
        let env = complex_env();
        assert_eq!(evaluate(&env, "3i"), Complex64::new(0.0, 3.0));
        assert_eq!(evaluate(&env, "3 * i"), Complex64::new(0.0, 3.0));
        assert_eq!(evaluate(&env, "1 + 2i"), Complex64::new(1.0, 2.0));
    }

    #[test]
    fn complex_arithmetic() {
        let env = complex_env();
        assert_eq!(
            evaluate(&env, "(1 + 2i) * conj(1 + 2i)"),
            Complex64::new(5.0, 0.0)
        );
        assert_eq!(evaluate(&env, "norm(3 + 4i)"), Complex64::new(25.0, 0.0));
        assert_eq!(evaluate(&env, "abs(3 + 4i)"), Complex64::new(5.0, 0.0));
        assert_eq!(evaluate(&env, "re(2 + 3i) + im(2 + 3i)"), Complex64::new(5.0, 0.0));

        let square = evaluate(&env, "i ^ 2");
        assert!((square - Complex64::new(-1.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn complex_projection_and_logarithm() {
        let env = complex_env();
        assert_eq!(evaluate(&env, "proj(1 + 2i)"), Complex64::new(1.0, 2.0));
        assert_eq!(
            evaluate(&env, "proj(inf + 2i)"),
            Complex64::new(f64::INFINITY, 0.0)
        );

        let lg = evaluate(&env, "log10(100)");
        assert!((lg - Complex64::new(2.0, 0.0)).norm() < 1e-9);
    }
}
