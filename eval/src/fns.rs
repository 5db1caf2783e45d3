//! Ready-made recognizers, operator wrappers and math-library presets.
//!
//! Everything in this module is a plain registration call atop the core;
//! nothing here is required to use [`Environment`] with a fully custom
//! symbol set.
//!
//! # Examples
//!
//! ```
//! use expression_eval::{fns, Environment, ParseMode};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut env = Environment::<f64>::new();
//! fns::install(&mut env)?;
//! fns::register_assignment(&mut env)?;
//! let x = env.register_variable("x", 3.0)?;
//!
//! let program = env.parse("x = max(2, 7) / 2", ParseMode::Normal)?;
//! assert_eq!(program.evaluate()?, 3.5);
//! assert_eq!(x.get(), 3.5);
//! # Ok(())
//! # }
//! ```

use num_traits::{Float, FloatConst};

use std::str::FromStr;

use crate::{
    env::Environment,
    error::{DictError, EvalError},
    values::{Associativity, NativeOp, Operand},
};

#[cfg(feature = "complex")]
pub mod complex;

/// Wrapper turning a plain unary value function into a [`NativeOp`].
///
/// # Examples
///
/// ```
/// use expression_eval::fns;
///
/// const SIN: fns::Unary<f64> = fns::Unary::new(f64::sin);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Unary<T> {
    function: fn(T) -> T,
}

impl<T> Unary<T> {
    /// Wraps the provided function.
    pub const fn new(function: fn(T) -> T) -> Self {
        Self { function }
    }
}

impl<T: Clone> NativeOp<T> for Unary<T> {
    fn evaluate(&self, args: &mut [Operand<T>]) -> Result<Option<Operand<T>>, EvalError> {
        Ok(Some(Operand::Value((self.function)(args[0].value()))))
    }
}

/// Wrapper turning a plain binary value function into a [`NativeOp`].
#[derive(Debug, Clone, Copy)]
pub struct Binary<T> {
    function: fn(T, T) -> T,
}

impl<T> Binary<T> {
    /// Wraps the provided function.
    pub const fn new(function: fn(T, T) -> T) -> Self {
        Self { function }
    }
}

impl<T: Clone> NativeOp<T> for Binary<T> {
    fn evaluate(&self, args: &mut [Operand<T>]) -> Result<Option<Operand<T>>, EvalError> {
        let value = (self.function)(args[0].value(), args[1].value());
        Ok(Some(Operand::Value(value)))
    }
}

/// Assignment operation: writes the second operand through the first and
/// returns the first operand, enabling chained assignment.
///
/// Fails with [`EvalError::ConstAssignment`] if the target is a constant
/// binding or a temporary value.
#[derive(Debug, Clone, Copy)]
pub struct Assign;

impl<T: Clone> NativeOp<T> for Assign {
    fn evaluate(&self, args: &mut [Operand<T>]) -> Result<Option<Operand<T>>, EvalError> {
        let value = args[1].value();
        args[0].assign(value)?;
        Ok(Some(args[0].clone()))
    }
}

/// Recognizes an unsigned decimal literal with an optional fraction and
/// exponent (`42`, `1.25`, `3e-4`) and parses it via [`FromStr`].
///
/// Suitable as a constant recognizer for any numeric type whose `FromStr`
/// accepts this format. A sign is never consumed; unary `-` / `+` handle it.
pub fn decimal_constant<T: FromStr>(input: &str, pos: usize) -> Option<(T, usize)> {
    let bytes = input.as_bytes();
    let mut end = pos;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == pos {
        return None;
    }
    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        // The exponent is consumed only if at least one digit follows.
        if exp < bytes.len() && bytes[exp].is_ascii_digit() {
            end = exp;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
        }
    }
    input[pos..end].parse().ok().map(|value| (value, end))
}

/// Enables the conventional syntax: whitespace skipping, `(` / `)` brackets
/// and the `,` argument separator.
pub fn standard_syntax<T>(env: &mut Environment<T>) {
    env.enable_whitespace_skipping(true);
    env.enable_brackets(true);
    env.set_brackets('(', ')');
    env.enable_separator(true);
    env.set_separator(',');
}

/// Registers the arithmetic operators `+ - * / % ^` (precedences 1, 1, 2, 2,
/// 2, 3; `^` right-associative, the rest left-associative) and the unary
/// `-` / `+` prefixes.
pub fn register_arithmetic<T: Float + 'static>(env: &mut Environment<T>) -> Result<(), DictError> {
    use crate::values::Associativity::{Left, Right};

    env.register_infix("+", 1, Left, Binary::new(|x: T, y: T| x + y))?;
    env.register_infix("-", 1, Left, Binary::new(|x: T, y: T| x - y))?;
    env.register_infix("*", 2, Left, Binary::new(|x: T, y: T| x * y))?;
    env.register_infix("/", 2, Left, Binary::new(|x: T, y: T| x / y))?;
    env.register_infix("%", 2, Left, Binary::new(|x: T, y: T| x % y))?;
    env.register_infix("^", 3, Right, Binary::new(T::powf))?;
    env.register_prefix("-", 2, Unary::new(|x: T| -x))?;
    env.register_prefix("+", 2, Unary::new(|x: T| x))?;
    Ok(())
}

fn log_base<T: Float>(base: T, x: T) -> T {
    x.ln() / base.ln()
}

fn nth_root<T: Float>(n: T, x: T) -> T {
    x.powf(n.recip())
}

/// Registers the floating-point function library: trigonometry, hyperbolics,
/// exponentials (`exp`, `exp2`) and logarithms (`ln`, `lg`, `log2`, `log10`,
/// `log1p`, 2-argument `log`), powers and roots (`sqrt`, `cbrt`, `hypot`,
/// `root`), rounding (`ceil`, `floor`, `round`, `trunc`), `abs`, `atan2`,
/// `min` and `max`.
///
/// `lg` and `log10` are both the decimal logarithm.
pub fn register_math<T: Float + 'static>(env: &mut Environment<T>) -> Result<(), DictError> {
    let unary: [(&str, fn(T) -> T); 26] = [
        ("sin", T::sin),
        ("cos", T::cos),
        ("tan", T::tan),
        ("asin", T::asin),
        ("acos", T::acos),
        ("atan", T::atan),
        ("sinh", T::sinh),
        ("cosh", T::cosh),
        ("tanh", T::tanh),
        ("asinh", T::asinh),
        ("acosh", T::acosh),
        ("atanh", T::atanh),
        ("exp", T::exp),
        ("exp2", T::exp2),
        ("ln", T::ln),
        ("lg", T::log10),
        ("log1p", T::ln_1p),
        ("log2", T::log2),
        ("log10", T::log10),
        ("sqrt", T::sqrt),
        ("cbrt", T::cbrt),
        ("abs", T::abs),
        ("ceil", T::ceil),
        ("floor", T::floor),
        ("round", T::round),
        ("trunc", T::trunc),
    ];
    for &(name, function) in &unary {
        env.register_function(name, 1, Unary::new(function))?;
    }

    let binary: [(&str, fn(T, T) -> T); 6] = [
        ("atan2", T::atan2),
        ("hypot", T::hypot),
        ("log", log_base),
        ("root", nth_root),
        ("min", T::min),
        ("max", T::max),
    ];
    for &(name, function) in &binary {
        env.register_function(name, 2, Binary::new(function))?;
    }
    Ok(())
}

/// Registers the constants `pi`, `e`, `inf` and `nan` as `Const` bindings.
pub fn register_constants<T>(env: &mut Environment<T>) -> Result<(), DictError>
where
    T: Float + FloatConst + 'static,
{
    env.register_constant("pi", T::PI())?;
    env.register_constant("e", T::E())?;
    env.register_constant("inf", T::infinity())?;
    env.register_constant("nan", T::nan())?;
    Ok(())
}

/// Registers the assignment operator `=` (right-associative, precedence 0)
/// with [`Assign`] semantics.
pub fn register_assignment<T: Clone + 'static>(env: &mut Environment<T>) -> Result<(), DictError> {
    env.register_infix("=", 0, Associativity::Right, Assign)
}

/// One-call setup for floating-point arithmetic: [`standard_syntax`], the
/// [decimal recognizer](decimal_constant), [arithmetic
/// operators](register_arithmetic), the [math library](register_math) and
/// the [constants](register_constants).
pub fn install<T>(env: &mut Environment<T>) -> Result<(), DictError>
where
    T: Float + FloatConst + FromStr + 'static,
{
    standard_syntax(env);
    env.set_constant_parser(decimal_constant::<T>);
    register_arithmetic(env)?;
    register_math(env)?;
    register_constants(env)?;
    Ok(())
}
