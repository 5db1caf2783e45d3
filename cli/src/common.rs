//! Common utils.

use num_complex::Complex64;

use std::fmt;

use expression_eval::{fns, Environment, ParseError, ParseMode};

/// Exit code on parse or evaluation error.
pub const ERROR_EXIT_CODE: i32 = 2;

/// Numeric types the CLI can evaluate expressions over.
pub trait ReplLiteral: Clone + Default + fmt::Display + 'static {
    /// Creates an environment with the full standard library and the
    /// assignment operator.
    fn create_env() -> Environment<Self>;
}

impl ReplLiteral for f32 {
    fn create_env() -> Environment<Self> {
        let mut env = Environment::new();
        fns::install(&mut env).expect("standard library registration");
        fns::register_assignment(&mut env).expect("assignment registration");
        env
    }
}

impl ReplLiteral for f64 {
    fn create_env() -> Environment<Self> {
        let mut env = Environment::new();
        fns::install(&mut env).expect("standard library registration");
        fns::register_assignment(&mut env).expect("assignment registration");
        env
    }
}

impl ReplLiteral for Complex64 {
    fn create_env() -> Environment<Self> {
        let mut env = Environment::new();
        fns::complex::install(&mut env).expect("standard library registration");
        fns::complex::register_assignment(&mut env).expect("assignment registration");
        env
    }
}

/// Prints a parse error with a caret under the failing position.
pub fn report_parse_error(source: &str, err: &ParseError) {
    let column = source
        .get(..err.position())
        .map_or(err.position(), |prefix| prefix.chars().count());
    eprintln!("error[PARSE]: {}", err.kind());
    eprintln!("    {}", source);
    eprintln!("    {}^", " ".repeat(column));
}

/// Registers `name` as a fresh variable if `line` looks like an assignment
/// to a not-yet-bound identifier. The core parser only recognizes known
/// symbols, so first assignments need this shim.
pub fn ensure_assign_target<T: ReplLiteral>(env: &mut Environment<T>, line: &str) {
    let eq = match line.find('=') {
        Some(eq) => eq,
        None => return,
    };
    let name = line[..eq].trim();
    if is_identifier(name) && env.get_variable(name).is_none() {
        let _ = env.register_variable(name, T::default());
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let head = match chars.next() {
        Some(head) => head,
        None => return false,
    };
    (head.is_alphabetic() || head == '_') && chars.all(|ch| ch.is_alphanumeric() || ch == '_')
}

/// Parses and evaluates a single expression, printing the result or the
/// error. Returns `false` on failure.
pub fn parse_and_eval<T: ReplLiteral>(env: &Environment<T>, line: &str) -> bool {
    match env.parse(line, ParseMode::Normal) {
        Ok(program) => match program.evaluate() {
            Ok(value) => {
                println!("{}", value);
                true
            }
            Err(err) => {
                eprintln!("error[EVAL]: {}", err);
                false
            }
        },
        Err(err) => {
            report_parse_error(line, &err);
            false
        }
    }
}

/// Handles a `.def name(a, b) = body` command.
pub fn define_command<T: ReplLiteral>(env: &mut Environment<T>, input: &str) {
    let result = (|| {
        let eq = input.find('=')?;
        let (signature, body) = input.split_at(eq);
        let body = &body[1..];
        let open = signature.find('(')?;
        let close = signature.rfind(')')?;
        if close < open {
            return None;
        }
        let name = signature[..open].trim().to_owned();
        if !is_identifier(&name) {
            return None;
        }
        let params: Vec<_> = signature[open + 1..close]
            .split(',')
            .map(str::trim)
            .filter(|param| !param.is_empty())
            .collect();
        Some((name, params, body.trim().to_owned()))
    })();

    let (name, params, body) = match result {
        Some(parts) => parts,
        None => {
            eprintln!("error[CMD]: expected `.def name(a, b) = body`");
            return;
        }
    };
    if let Err(err) = env.define_function(&name, &params, &body) {
        eprintln!("error[DEF]: {}", err);
    }
}

/// Prints all registered variables.
pub fn dump_variables<T: ReplLiteral>(env: &Environment<T>) {
    for name in env.variables().borrow().keys() {
        if let Some(binding) = env.get_variable(&name) {
            println!("{} = {}", name, binding.get());
        }
    }
}
