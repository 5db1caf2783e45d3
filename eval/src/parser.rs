//! Shunting-yard parser translating expression text into postfix programs.

use std::rc::Rc;

use crate::{
    env::Environment,
    error::{ParseError, ParseErrorKind},
    executable::{Instr, Program},
    values::{Associativity, Operation, VarRef},
};


/// Controls how variable references are compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Every variable reference is materialized as a constant holding the
    /// value at parse time. Subsequent variable mutations do not affect the
    /// program.
    Immediate,
    /// Every variable reference becomes a runtime instruction regardless of
    /// the binding's mutability.
    Persistent,
    /// `Const` bindings are folded to constants; `Mutable` bindings become
    /// runtime references.
    Normal,
}

/// Kind of variable handle embedded into the produced program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Handles {
    Strong,
    Weak,
}

/// Entry of the working operator stack.
enum StackEntry<T> {
    /// A prefix or infix operation awaiting emission.
    Op(Rc<Operation<T>>),
    /// Sentinel for a plain grouping bracket.
    Bracket,
    /// Sentinel for a function call: the left delimiter together with the
    /// called operation and the number of completed arguments (separators
    /// seen so far).
    Call { op: Rc<Operation<T>>, args: usize },
}

pub(crate) fn parse<T: Clone>(
    env: &Environment<T>,
    input: &str,
    mode: ParseMode,
    handles: Handles,
) -> Result<Program<T>, ParseError> {
    let parser = Parser {
        env,
        input,
        pos: 0,
        mode,
        handles,
        instrs: Vec::new(),
        op_stack: Vec::new(),
        expecting_operand: true,
        pending_call: None,
    };
    parser.run()
}

struct Parser<'a, T> {
    env: &'a Environment<T>,
    input: &'a str,
    pos: usize,
    mode: ParseMode,
    handles: Handles,
    instrs: Vec<Instr<T>>,
    op_stack: Vec<StackEntry<T>>,
    expecting_operand: bool,
    /// Position of a function name that matched but was not followed by the
    /// left delimiter. Converts the generic "unexpected character" error into
    /// a more precise one if nothing else matches at that position.
    pending_call: Option<usize>,
}

impl<'a, T: Clone> Parser<'a, T> {
    fn run(mut self) -> Result<Program<T>, ParseError> {
        loop {
            self.skip_whitespace();
            if self.pos >= self.input.len() {
                break;
            }
            self.pending_call = None;

            let matched = if self.expecting_operand {
                self.parse_left_bracket()
                    || self.parse_constant()
                    || self.parse_function()
                    || self.parse_prefix()
                    || self.parse_variable()
                    || self.parse_empty_call()?
            } else {
                self.parse_right_bracket()?
                    || self.parse_separator()?
                    || self.parse_infix()
                    || self.parse_suffix()
            };

            if !matched {
                let kind = if self.pending_call == Some(self.pos) {
                    ParseErrorKind::RequiredBracketMissing
                } else {
                    ParseErrorKind::UnexpectedCharacter
                };
                return Err(ParseError::new(self.pos, kind));
            }
        }
        self.finish()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        if let Some(predicate) = self.env.whitespace_skipper() {
            let skipped: usize = self.input[self.pos..]
                .chars()
                .take_while(|&ch| (*predicate)(ch))
                .map(char::len_utf8)
                .sum();
            self.pos += skipped;
        }
    }

    fn emit(&mut self, op: Rc<Operation<T>>) {
        self.instrs.push(Instr::Op(op));
    }

    fn parse_left_bracket(&mut self) -> bool {
        let left = match self.env.brackets() {
            Some((left, _)) => left,
            None => return false,
        };
        if self.peek() != Some(left) {
            return false;
        }
        self.op_stack.push(StackEntry::Bracket);
        self.pos += left.len_utf8();
        true
    }

    fn parse_constant(&mut self) -> bool {
        let recognizer = match self.env.constant_parser() {
            Some(recognizer) => recognizer,
            None => return false,
        };
        match (*recognizer)(self.input, self.pos) {
            // Refuse cursors that did not advance, which would stall parsing.
            Some((value, next)) if next > self.pos => {
                self.instrs.push(Instr::Const(value));
                self.pos = next;
                self.expecting_operand = false;
                true
            }
            _ => false,
        }
    }

    fn parse_function(&mut self) -> bool {
        let left = match self.env.brackets() {
            Some((left, _)) => left,
            None => return false,
        };
        let found = {
            let dict = self.env.functions().borrow();
            dict.find_longest(self.input, self.pos)
                .map(|(op, next)| (Rc::clone(op), next))
        };
        let (op, next) = match found {
            Some(found) => found,
            None => return false,
        };
        if self.input[next..].chars().next() == Some(left) {
            self.pos = next + left.len_utf8();
            self.op_stack.push(StackEntry::Call { op, args: 0 });
            true
        } else {
            // Rewind the whole match; a prefix operator or variable sharing
            // the spelling may still apply.
            self.pending_call = Some(self.pos);
            false
        }
    }

    fn parse_prefix(&mut self) -> bool {
        let found = {
            let dict = self.env.prefix_ops().borrow();
            dict.find_longest(self.input, self.pos)
                .map(|(op, next)| (Rc::clone(op), next))
        };
        let (op, next) = match found {
            Some(found) => found,
            None => return false,
        };
        self.op_stack.push(StackEntry::Op(op));
        self.pos = next;
        true
    }

    fn parse_variable(&mut self) -> bool {
        let found = {
            let dict = self.env.variables().borrow();
            dict.find_longest(self.input, self.pos)
                .map(|(binding, next)| (Rc::clone(binding), next))
        };
        let (binding, next) = match found {
            Some(found) => found,
            None => return false,
        };

        let fold_to_constant = match self.mode {
            ParseMode::Immediate => true,
            ParseMode::Persistent => false,
            ParseMode::Normal => !binding.is_mutable(),
        };
        if fold_to_constant {
            self.instrs.push(Instr::Const(binding.get()));
        } else {
            let var = match self.handles {
                Handles::Strong => VarRef::Strong(binding),
                Handles::Weak => VarRef::Weak(Rc::downgrade(&binding)),
            };
            self.instrs.push(Instr::Var(var));
        }
        self.pos = next;
        self.expecting_operand = false;
        true
    }

    /// Recognizes the right delimiter closing an empty-argument call. Only
    /// applicable directly after a call's left delimiter.
    fn parse_empty_call(&mut self) -> Result<bool, ParseError> {
        let right = match self.env.brackets() {
            Some((_, right)) => right,
            None => return Ok(false),
        };
        if self.peek() != Some(right) {
            return Ok(false);
        }
        if !matches!(self.op_stack.last(), Some(StackEntry::Call { args: 0, .. })) {
            return Ok(false);
        }
        if let Some(StackEntry::Call { op, .. }) = self.op_stack.pop() {
            if op.arity() != 0 {
                return Err(ParseError::new(
                    self.pos,
                    ParseErrorKind::ArityMismatch {
                        name: op.name().to_owned(),
                        expected: op.arity(),
                        supplied: 0,
                    },
                ));
            }
            self.emit(op);
        }
        self.pos += right.len_utf8();
        self.expecting_operand = false;
        Ok(true)
    }

    fn parse_right_bracket(&mut self) -> Result<bool, ParseError> {
        let right = match self.env.brackets() {
            Some((_, right)) => right,
            None => return Ok(false),
        };
        if self.peek() != Some(right) {
            return Ok(false);
        }
        loop {
            match self.op_stack.pop() {
                Some(StackEntry::Op(op)) => self.emit(op),
                Some(StackEntry::Bracket) => break,
                Some(StackEntry::Call { op, args }) => {
                    let supplied = args + 1;
                    if supplied != op.arity() {
                        return Err(ParseError::new(
                            self.pos,
                            ParseErrorKind::ArityMismatch {
                                name: op.name().to_owned(),
                                expected: op.arity(),
                                supplied,
                            },
                        ));
                    }
                    self.emit(op);
                    break;
                }
                None => {
                    return Err(ParseError::new(self.pos, ParseErrorKind::MismatchedBrackets));
                }
            }
        }
        self.pos += right.len_utf8();
        Ok(true)
    }

    /// Handles the argument separator: operators are popped down to, but not
    /// past, the nearest bracket sentinel, so operator precedence stays
    /// confined to a single argument.
    fn parse_separator(&mut self) -> Result<bool, ParseError> {
        let separator = match self.env.separator() {
            Some(separator) => separator,
            None => return Ok(false),
        };
        if self.peek() != Some(separator) {
            return Ok(false);
        }
        loop {
            match self.op_stack.last_mut() {
                Some(StackEntry::Bracket) => break,
                Some(StackEntry::Call { args, .. }) => {
                    *args += 1;
                    break;
                }
                Some(StackEntry::Op(_)) => {}
                None => {
                    return Err(ParseError::new(
                        self.pos,
                        ParseErrorKind::MisplacedSeparator,
                    ));
                }
            }
            if let Some(StackEntry::Op(op)) = self.op_stack.pop() {
                self.emit(op);
            }
        }
        self.pos += separator.len_utf8();
        self.expecting_operand = true;
        Ok(true)
    }

    fn parse_infix(&mut self) -> bool {
        let found = {
            let dict = self.env.infix_ops().borrow();
            dict.find_longest(self.input, self.pos)
                .map(|(op, next)| (op.clone(), next))
        };
        let (infix, next) = match found {
            Some(found) => found,
            None => return false,
        };

        let precedence = infix.operation().precedence();
        let left_associative = infix.associativity() == Associativity::Left;
        while let Some(StackEntry::Op(top)) = self.op_stack.last() {
            if top.precedence() > precedence
                || (left_associative && top.precedence() == precedence)
            {
                if let Some(StackEntry::Op(op)) = self.op_stack.pop() {
                    self.emit(op);
                }
            } else {
                break;
            }
        }

        self.op_stack.push(StackEntry::Op(Rc::clone(infix.operation())));
        self.pos = next;
        self.expecting_operand = true;
        true
    }

    fn parse_suffix(&mut self) -> bool {
        let found = {
            let dict = self.env.suffix_ops().borrow();
            dict.find_longest(self.input, self.pos)
                .map(|(op, next)| (Rc::clone(op), next))
        };
        let (op, next) = match found {
            Some(found) => found,
            None => return false,
        };
        self.emit(op);
        self.pos = next;
        true
    }

    fn finish(mut self) -> Result<Program<T>, ParseError> {
        while let Some(entry) = self.op_stack.pop() {
            match entry {
                StackEntry::Op(op) => self.instrs.push(Instr::Op(op)),
                StackEntry::Bracket | StackEntry::Call { .. } => {
                    return Err(ParseError::new(
                        self.input.len(),
                        ParseErrorKind::MismatchedBrackets,
                    ));
                }
            }
        }
        Ok(Program {
            instrs: self.instrs,
        })
    }
}
