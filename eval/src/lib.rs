//! Configurable parser and evaluator for arithmetic-style infix expressions
//! over a user-chosen numeric domain.
//!
//! # How it works
//!
//! 1. An [`Environment`] holds five symbol dictionaries — variables, prefix
//!    operators, functions, infix operators and suffix operators — all backed
//!    by the same character-indexed prefix trie ([`SymbolDict`]), plus a
//!    constant recognizer, a whitespace predicate and the delimiter
//!    configuration.
//! 2. [`Environment::parse()`] runs a shunting-yard recognizer over the
//!    source text, consulting the dictionaries with longest-match lookups,
//!    and emits a linear postfix [`Program`].
//! 3. [`Program::evaluate()`] executes the program on a value stack against
//!    the current contents of the referenced variable bindings. Programs can
//!    be evaluated repeatedly; writes to bindings (through the evaluator or
//!    the host) are observed on the next run.
//!
//! The numeric domain is an arbitrary type parameter: the core never
//! inspects it, and registered callables define all available operations.
//! The [`fns`] module provides presets for floating-point types (and, behind
//! the `complex` feature, for complex numbers from [`num-complex`]).
//!
//! [`num-complex`]: https://crates.io/crates/num-complex
//!
//! # Examples
//!
//! ```
//! use expression_eval::{fns, Environment, ParseMode};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut env = Environment::<f64>::new();
//! fns::install(&mut env)?;
//! let x = env.register_variable("x", 3.0)?;
//!
//! // Programs hold handles to the bindings they reference...
//! let program = env.parse("sin(2 * pi) + x^2", ParseMode::Normal)?;
//! assert!((program.evaluate()? - 9.0).abs() < 1e-9);
//!
//! // ...so mutating `x` is observed on the next evaluation.
//! x.set(4.0)?;
//! assert!((program.evaluate()? - 16.0).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```
//!
//! Defining functions whose bodies are themselves expressions:
//!
//! ```
//! use expression_eval::{fns, Environment, ParseMode};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut env = Environment::<f64>::new();
//! fns::install(&mut env)?;
//! env.define_function("mean", &["a", "b"], "(a + b) / 2")?;
//!
//! let program = env.parse("mean(1, 2) + mean(3, 5)", ParseMode::Normal)?;
//! assert_eq!(program.evaluate()?, 5.5);
//! # Ok(())
//! # }
//! ```
//!
//! # Crate features
//!
//! - `complex`. Enables the [`fns::complex`] presets for
//!   `num_complex::Complex` numbers.

#![doc(html_root_url = "https://docs.rs/expression-eval/0.1.0")]
#![warn(missing_docs, missing_debug_implementations)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

pub use crate::{
    dict::SymbolDict,
    env::{ConstantParser, Environment, SharedDict, WhitespacePredicate},
    error::{DefineError, DictError, EvalError, ParseError, ParseErrorKind},
    executable::Program,
    parser::ParseMode,
    values::{
        Associativity, Binding, BindingKind, InfixOp, NativeOp, Operand, Operation,
        CALL_PRECEDENCE,
    },
};

mod dict;
mod env;
pub mod error;
mod executable;
pub mod fns;
mod parser;
mod values;
