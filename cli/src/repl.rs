//! REPL for arithmetic expressions.

use rustyline::{error::ReadlineError, Editor};
use unindent::unindent;

use std::io;

use crate::common::{
    define_command, dump_variables, ensure_assign_target, parse_and_eval, ReplLiteral,
};

const HELP: &str = "
    Expressions are parsed with the standard arithmetic syntax: `+ - * / % ^`,
    parenthesized function calls such as `atan2(1, x)`, and the constants
    `pi`, `e`, `inf` and `nan`. Assigning to a new name creates a variable:

        x = 3
        sin(x) ^ 2 + cos(x) ^ 2

    COMMANDS
    All commands start with a dot '.'.

        .help               Displays help.
        .def f(a, b) = ...  Defines a function over the listed parameters.
        .vars               Outputs all defined variables.
    Use Ctrl+C / Cmd+C to exit the REPL.
";

pub fn repl<T: ReplLiteral>() -> io::Result<()> {
    let mut rl = Editor::<()>::new();
    let mut env = T::create_env();

    println!(
        "expression-eval REPL v{}",
        env!("CARGO_PKG_VERSION")
    );
    println!("Use .help for more information about supported commands / operations.");

    loop {
        let line = rl.readline(">>> ");
        match line {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line);

                if let Some(command) = line.strip_prefix('.') {
                    run_command(&mut env, command);
                } else {
                    ensure_assign_target(&mut env, line);
                    parse_and_eval(&env, line);
                }
            }

            Err(ReadlineError::Interrupted) => {
                println!("Bye");
                break Ok(());
            }

            Err(ReadlineError::Eof) => {
                break Ok(());
            }

            Err(e) => panic!("Error reading command: {}", e),
        }
    }
}

fn run_command<T: ReplLiteral>(env: &mut expression_eval::Environment<T>, command: &str) {
    if command == "help" {
        println!("{}", unindent(HELP));
    } else if command == "vars" {
        dump_variables(env);
    } else if let Some(definition) = command.strip_prefix("def ") {
        define_command(env, definition);
    } else {
        eprintln!("error[CMD]: unknown command; use .help to list commands");
    }
}
