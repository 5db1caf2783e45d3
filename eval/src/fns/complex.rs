//! Complex-number counterparts of the standard presets.
//!
//! Literals denote real values; the imaginary unit is available both as the
//! constant `i` and as the suffix operator `i`, so `3i` and `3 * i` are
//! equivalent.
//!
//! # Examples
//!
//! ```
//! use expression_eval::{fns, Environment, ParseMode};
//! use num_complex::Complex64;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut env = Environment::<Complex64>::new();
//! fns::complex::install(&mut env)?;
//!
//! let program = env.parse("(1 + 2i) * conj(1 + 2i)", ParseMode::Normal)?;
//! assert_eq!(program.evaluate()?, Complex64::new(5.0, 0.0));
//! # Ok(())
//! # }
//! ```

use num_complex::Complex;
use num_traits::{Float, FloatConst};

use std::str::FromStr;

use super::{decimal_constant, standard_syntax, Binary, Unary};
use crate::{env::Environment, error::DictError, values::Associativity};

/// Recognizes a decimal literal and lifts it to a complex number with a zero
/// imaginary part.
pub fn complex_constant<F>(input: &str, pos: usize) -> Option<(Complex<F>, usize)>
where
    F: Float + FromStr,
{
    decimal_constant::<F>(input, pos).map(|(re, next)| (Complex::new(re, F::zero()), next))
}

/// Registers the arithmetic operators `+ - * / ^`, the unary `-` / `+`
/// prefixes and the imaginary-unit suffix `i`.
pub fn register_arithmetic<F: Float + 'static>(
    env: &mut Environment<Complex<F>>,
) -> Result<(), DictError> {
    use crate::values::Associativity::{Left, Right};

    env.register_infix("+", 1, Left, Binary::new(|x: Complex<F>, y: Complex<F>| x + y))?;
    env.register_infix("-", 1, Left, Binary::new(|x: Complex<F>, y: Complex<F>| x - y))?;
    env.register_infix("*", 2, Left, Binary::new(|x: Complex<F>, y: Complex<F>| x * y))?;
    env.register_infix("/", 2, Left, Binary::new(|x: Complex<F>, y: Complex<F>| x / y))?;
    env.register_infix("^", 3, Right, Binary::new(Complex::<F>::powc))?;
    env.register_prefix("-", 2, Unary::new(|x: Complex<F>| -x))?;
    env.register_prefix("+", 2, Unary::new(|x: Complex<F>| x))?;
    // Multiplication by the imaginary unit: re + im*i -> -im + re*i.
    env.register_suffix("i", 2, Unary::new(|x: Complex<F>| Complex::new(-x.im, x.re)))?;
    Ok(())
}

// Projection onto the Riemann sphere, as in C++ `std::proj`.
fn proj<F: Float>(z: Complex<F>) -> Complex<F> {
    if z.re.is_infinite() || z.im.is_infinite() {
        let zero = if z.im.is_sign_negative() {
            -F::zero()
        } else {
            F::zero()
        };
        return Complex::new(F::infinity(), zero);
    }
    z
}

/// Registers the analytic function library (`exp`, `ln`, `log10`, 2-argument
/// `log`, `sqrt`, trigonometry and hyperbolics) together with the
/// complex-specific functions `re`, `im`, `arg`, `norm`, `abs`, `conj` and
/// `proj`.
///
/// `norm` is the squared magnitude; `abs` is the modulus.
pub fn register_math<F: Float + FloatConst + 'static>(
    env: &mut Environment<Complex<F>>,
) -> Result<(), DictError> {
    let unary: [(&str, fn(Complex<F>) -> Complex<F>); 23] = [
        ("sin", Complex::sin),
        ("cos", Complex::cos),
        ("tan", Complex::tan),
        ("asin", Complex::asin),
        ("acos", Complex::acos),
        ("atan", Complex::atan),
        ("sinh", Complex::sinh),
        ("cosh", Complex::cosh),
        ("tanh", Complex::tanh),
        ("asinh", Complex::asinh),
        ("acosh", Complex::acosh),
        ("atanh", Complex::atanh),
        ("exp", Complex::exp),
        ("ln", Complex::ln),
        ("log10", |z| z.ln() / Complex::new(F::LN_10(), F::zero())),
        ("sqrt", Complex::sqrt),
        ("re", |z| Complex::new(z.re, F::zero())),
        ("im", |z| Complex::new(z.im, F::zero())),
        ("arg", |z| Complex::new(z.arg(), F::zero())),
        ("norm", |z| Complex::new(z.norm_sqr(), F::zero())),
        ("abs", |z| Complex::new(z.norm(), F::zero())),
        ("conj", |z| z.conj()),
        ("proj", proj),
    ];
    for &(name, function) in &unary {
        env.register_function(name, 1, Unary::new(function))?;
    }

    env.register_function(
        "log",
        2,
        Binary::new(|base: Complex<F>, x: Complex<F>| x.ln() / base.ln()),
    )?;
    Ok(())
}

/// Registers the constants `pi`, `e`, `i`, `inf` and `nan`.
pub fn register_constants<F>(env: &mut Environment<Complex<F>>) -> Result<(), DictError>
where
    F: Float + FloatConst + 'static,
{
    env.register_constant("pi", Complex::new(F::PI(), F::zero()))?;
    env.register_constant("e", Complex::new(F::E(), F::zero()))?;
    env.register_constant("i", Complex::i())?;
    env.register_constant("inf", Complex::new(F::infinity(), F::zero()))?;
    env.register_constant("nan", Complex::new(F::nan(), F::zero()))?;
    Ok(())
}

/// Registers the assignment operator `=` for complex environments.
pub fn register_assignment<F: Float + 'static>(
    env: &mut Environment<Complex<F>>,
) -> Result<(), DictError> {
    env.register_infix("=", 0, Associativity::Right, super::Assign)
}

/// One-call setup for complex arithmetic, mirroring
/// [`fns::install`](super::install).
pub fn install<F>(env: &mut Environment<Complex<F>>) -> Result<(), DictError>
where
    F: Float + FloatConst + FromStr + 'static,
{
    standard_syntax(env);
    env.set_constant_parser(complex_constant::<F>);
    register_arithmetic(env)?;
    register_math(env)?;
    register_constants(env)?;
    Ok(())
}
