//! [`Environment`]: the symbol tables and parsing configuration.

use core::fmt;
use std::{cell::RefCell, rc::Rc};

use crate::{
    dict::SymbolDict,
    error::{DefineError, DictError, ParseError},
    executable::Program,
    parser::{self, Handles, ParseMode},
    values::{
        Associativity, Binding, BindingKind, InfixOp, NativeOp, Operand, Operation,
        CALL_PRECEDENCE,
    },
};

/// Symbol dictionary shared between [`Environment`]s and parse sessions.
/// Modifications through one handle are visible to all holders.
pub type SharedDict<P> = Rc<RefCell<SymbolDict<P>>>;

/// Constant recognizer: invoked with the source text and a byte position; on
/// success returns the recognized value together with the position just past
/// the consumed characters. A `None` return must leave no trace.
pub type ConstantParser<T> = dyn Fn(&str, usize) -> Option<(T, usize)>;

/// Predicate deciding which characters the parser skips between tokens when
/// whitespace skipping is enabled.
pub type WhitespacePredicate = dyn Fn(char) -> bool;

/// Configuration and symbol tables driving parsing and evaluation.
///
/// An environment owns five dictionaries, uniformly backed by the
/// [`SymbolDict`] prefix trie: variables, prefix operators, functions, infix
/// operators and suffix operators. Dictionaries are reference-counted:
/// [cloning](Clone) an environment shares them, and the `set_*` accessors
/// allow sharing an individual dictionary between otherwise unrelated
/// environments. Delimiters, toggles and the constant/whitespace recognizers
/// are per-environment.
///
/// A freshly created environment recognizes nothing: no constants, no
/// operators, and all syntax toggles are off. See the [`fns`](crate::fns)
/// module for presets.
///
/// # Examples
///
/// ```
/// use expression_eval::{fns, Associativity, Environment, ParseMode};
///
/// # fn main() -> anyhow::Result<()> {
/// let mut env = Environment::new();
/// env.enable_brackets(true);
/// env.set_constant_parser(fns::decimal_constant::<f64>);
/// env.register_infix("+", 1, Associativity::Left, fns::Binary::new(|x: f64, y: f64| x + y))?;
/// env.register_function("sin", 1, fns::Unary::new(f64::sin))?;
///
/// let program = env.parse("sin(0)+1", ParseMode::Normal)?;
/// assert_eq!(program.evaluate()?, 1.0);
/// # Ok(())
/// # }
/// ```
pub struct Environment<T> {
    variables: SharedDict<Rc<Binding<T>>>,
    prefix_ops: SharedDict<Rc<Operation<T>>>,
    functions: SharedDict<Rc<Operation<T>>>,
    infix_ops: SharedDict<InfixOp<T>>,
    suffix_ops: SharedDict<Rc<Operation<T>>>,
    constant_parser: Option<Rc<ConstantParser<T>>>,
    whitespace: Rc<WhitespacePredicate>,
    skip_whitespace: bool,
    brackets_enabled: bool,
    left_bracket: char,
    right_bracket: char,
    separator_enabled: bool,
    separator: char,
}

impl<T> fmt::Debug for Environment<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Environment")
            .field("brackets_enabled", &self.brackets_enabled)
            .field("left_bracket", &self.left_bracket)
            .field("right_bracket", &self.right_bracket)
            .field("separator_enabled", &self.separator_enabled)
            .field("separator", &self.separator)
            .field("skip_whitespace", &self.skip_whitespace)
            .finish()
    }
}

/// Shares all five dictionaries with the original; toggles, delimiters and
/// recognizers are copied.
impl<T> Clone for Environment<T> {
    fn clone(&self) -> Self {
        Self {
            variables: Rc::clone(&self.variables),
            prefix_ops: Rc::clone(&self.prefix_ops),
            functions: Rc::clone(&self.functions),
            infix_ops: Rc::clone(&self.infix_ops),
            suffix_ops: Rc::clone(&self.suffix_ops),
            constant_parser: self.constant_parser.clone(),
            whitespace: Rc::clone(&self.whitespace),
            skip_whitespace: self.skip_whitespace,
            brackets_enabled: self.brackets_enabled,
            left_bracket: self.left_bracket,
            right_bracket: self.right_bracket,
            separator_enabled: self.separator_enabled,
            separator: self.separator,
        }
    }
}

impl<T> Default for Environment<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Environment<T> {
    /// Creates an empty environment: empty dictionaries, no constant
    /// recognizer, all syntax toggles off. The delimiters default to `(`,
    /// `)` and `,` but stay inert until enabled.
    pub fn new() -> Self {
        Self {
            variables: Rc::default(),
            prefix_ops: Rc::default(),
            functions: Rc::default(),
            infix_ops: Rc::default(),
            suffix_ops: Rc::default(),
            constant_parser: None,
            whitespace: Rc::new(char::is_whitespace),
            skip_whitespace: false,
            brackets_enabled: false,
            left_bracket: '(',
            right_bracket: ')',
            separator_enabled: false,
            separator: ',',
        }
    }

    /// Returns the variable dictionary.
    pub fn variables(&self) -> &SharedDict<Rc<Binding<T>>> {
        &self.variables
    }

    /// Returns the prefix-operator dictionary.
    pub fn prefix_ops(&self) -> &SharedDict<Rc<Operation<T>>> {
        &self.prefix_ops
    }

    /// Returns the function dictionary.
    pub fn functions(&self) -> &SharedDict<Rc<Operation<T>>> {
        &self.functions
    }

    /// Returns the infix-operator dictionary.
    pub fn infix_ops(&self) -> &SharedDict<InfixOp<T>> {
        &self.infix_ops
    }

    /// Returns the suffix-operator dictionary.
    pub fn suffix_ops(&self) -> &SharedDict<Rc<Operation<T>>> {
        &self.suffix_ops
    }

    /// Replaces the variable dictionary, e.g. to share it with another
    /// environment.
    pub fn set_variables(&mut self, dict: SharedDict<Rc<Binding<T>>>) {
        self.variables = dict;
    }

    /// Replaces the prefix-operator dictionary.
    pub fn set_prefix_ops(&mut self, dict: SharedDict<Rc<Operation<T>>>) {
        self.prefix_ops = dict;
    }

    /// Replaces the function dictionary.
    pub fn set_functions(&mut self, dict: SharedDict<Rc<Operation<T>>>) {
        self.functions = dict;
    }

    /// Replaces the infix-operator dictionary.
    pub fn set_infix_ops(&mut self, dict: SharedDict<InfixOp<T>>) {
        self.infix_ops = dict;
    }

    /// Replaces the suffix-operator dictionary.
    pub fn set_suffix_ops(&mut self, dict: SharedDict<Rc<Operation<T>>>) {
        self.suffix_ops = dict;
    }

    /// Sets the constant recognizer consulted by the parser in operand
    /// position.
    pub fn set_constant_parser(
        &mut self,
        parser: impl Fn(&str, usize) -> Option<(T, usize)> + 'static,
    ) {
        self.constant_parser = Some(Rc::new(parser));
    }

    /// Removes the constant recognizer; literals are no longer recognized.
    pub fn clear_constant_parser(&mut self) {
        self.constant_parser = None;
    }

    /// Sets the whitespace predicate. The default recognizes Unicode
    /// whitespace. Skipping must be enabled separately via
    /// [`enable_whitespace_skipping`](Self::enable_whitespace_skipping).
    pub fn set_whitespace_predicate(&mut self, predicate: impl Fn(char) -> bool + 'static) {
        self.whitespace = Rc::new(predicate);
    }

    /// Toggles skipping of whitespace between tokens.
    pub fn enable_whitespace_skipping(&mut self, enable: bool) {
        self.skip_whitespace = enable;
    }

    /// Toggles recognition of grouping brackets and function calls.
    pub fn enable_brackets(&mut self, enable: bool) {
        self.brackets_enabled = enable;
    }

    /// Sets the left and right bracket delimiters. Delimiter characters take
    /// priority over dictionary keys starting with the same character.
    pub fn set_brackets(&mut self, left: char, right: char) {
        self.left_bracket = left;
        self.right_bracket = right;
    }

    /// Toggles recognition of the argument separator.
    pub fn enable_separator(&mut self, enable: bool) {
        self.separator_enabled = enable;
    }

    /// Sets the argument separator character.
    pub fn set_separator(&mut self, separator: char) {
        self.separator = separator;
    }

    /// Returns the bracket delimiters if bracketing is enabled.
    pub fn brackets(&self) -> Option<(char, char)> {
        if self.brackets_enabled {
            Some((self.left_bracket, self.right_bracket))
        } else {
            None
        }
    }

    /// Returns the argument separator if separator parsing is enabled.
    pub fn separator(&self) -> Option<char> {
        if self.separator_enabled {
            Some(self.separator)
        } else {
            None
        }
    }

    pub(crate) fn constant_parser(&self) -> Option<Rc<ConstantParser<T>>> {
        self.constant_parser.clone()
    }

    pub(crate) fn whitespace_skipper(&self) -> Option<Rc<WhitespacePredicate>> {
        if self.skip_whitespace {
            Some(Rc::clone(&self.whitespace))
        } else {
            None
        }
    }

    /// Registers a mutable variable, returning a handle to its binding.
    ///
    /// The handle can be used to read and write the variable from the host;
    /// programs parsed in [`ParseMode::Persistent`] (or `Normal`) observe
    /// such writes on their next evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`DictError::Duplicate`] if the name is already bound.
    pub fn register_variable(&mut self, name: &str, value: T) -> Result<Rc<Binding<T>>, DictError> {
        self.insert_binding(name, BindingKind::Mutable, value)
    }

    /// Registers a constant binding. Constants reject assignment and are
    /// folded into programs under [`ParseMode::Normal`].
    ///
    /// # Errors
    ///
    /// Returns [`DictError::Duplicate`] if the name is already bound.
    pub fn register_constant(&mut self, name: &str, value: T) -> Result<Rc<Binding<T>>, DictError> {
        self.insert_binding(name, BindingKind::Const, value)
    }

    fn insert_binding(
        &mut self,
        name: &str,
        kind: BindingKind,
        value: T,
    ) -> Result<Rc<Binding<T>>, DictError> {
        let binding = Rc::new(Binding::new(name, kind, value));
        self.variables
            .borrow_mut()
            .insert(name, Rc::clone(&binding))?;
        Ok(binding)
    }

    /// Returns a handle to the named variable binding, if present.
    pub fn get_variable(&self, name: &str) -> Option<Rc<Binding<T>>> {
        self.variables.borrow().get(name).map(Rc::clone)
    }

    /// Registers a binary infix operator.
    ///
    /// # Errors
    ///
    /// Returns [`DictError::Duplicate`] if the name is already an infix
    /// operator.
    pub fn register_infix(
        &mut self,
        name: &str,
        precedence: usize,
        associativity: Associativity,
        callable: impl NativeOp<T> + 'static,
    ) -> Result<(), DictError> {
        let operation = Rc::new(Operation::new(name, 2, precedence, callable));
        self.infix_ops
            .borrow_mut()
            .insert(name, InfixOp::new(operation, associativity))
    }

    /// Registers a unary prefix operator.
    ///
    /// # Errors
    ///
    /// Returns [`DictError::Duplicate`] if the name is already a prefix
    /// operator.
    pub fn register_prefix(
        &mut self,
        name: &str,
        precedence: usize,
        callable: impl NativeOp<T> + 'static,
    ) -> Result<(), DictError> {
        let operation = Rc::new(Operation::new(name, 1, precedence, callable));
        self.prefix_ops.borrow_mut().insert(name, operation)
    }

    /// Registers a unary suffix operator.
    ///
    /// # Errors
    ///
    /// Returns [`DictError::Duplicate`] if the name is already a suffix
    /// operator.
    pub fn register_suffix(
        &mut self,
        name: &str,
        precedence: usize,
        callable: impl NativeOp<T> + 'static,
    ) -> Result<(), DictError> {
        let operation = Rc::new(Operation::new(name, 1, precedence, callable));
        self.suffix_ops.borrow_mut().insert(name, operation)
    }

    /// Registers a named function with the specified arity. Functions carry
    /// [`CALL_PRECEDENCE`] and must be called with parenthesized, separated
    /// arguments: `name(a, b)`.
    ///
    /// # Errors
    ///
    /// Returns [`DictError::Duplicate`] if the name is already a function.
    pub fn register_function(
        &mut self,
        name: &str,
        arity: usize,
        callable: impl NativeOp<T> + 'static,
    ) -> Result<(), DictError> {
        let operation = Rc::new(Operation::new(name, arity, CALL_PRECEDENCE, callable));
        self.functions.borrow_mut().insert(name, operation)
    }
}

impl<T: Clone> Environment<T> {
    /// Parses `input` into a postfix [`Program`] holding strong handles to
    /// the referenced bindings; the program remains valid even if bindings
    /// are later pruned from the dictionaries.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] with the byte position of the first failure.
    pub fn parse(&self, input: &str, mode: ParseMode) -> Result<Program<T>, ParseError> {
        parser::parse(self, input, mode, Handles::Strong)
    }

    /// Parses `input` like [`parse`](Self::parse), but the program holds
    /// weak variable handles: it does not keep bindings alive, and
    /// evaluating it after a referenced binding has been dropped fails with
    /// [`EvalError::ExpiredBinding`](crate::EvalError::ExpiredBinding).
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] with the byte position of the first failure.
    pub fn parse_weak(&self, input: &str, mode: ParseMode) -> Result<Program<T>, ParseError> {
        parser::parse(self, input, mode, Handles::Weak)
    }
}

impl<T: Clone + Default + 'static> Environment<T> {
    /// Defines a function whose body is itself an expression over the
    /// current environment.
    ///
    /// Each parameter temporarily shadows any equally named variable while
    /// the body is parsed; the body's parameter references are captured as
    /// private slots of the function, and the previous bindings are restored
    /// afterwards — also when body parsing fails. Calling the function
    /// assigns the arguments to the slots in order and evaluates the
    /// captured program.
    ///
    /// The captured slots are shared between invocations, so recursive or
    /// otherwise re-entrant calls of a defined function are not supported.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter list contains duplicates, the body
    /// fails to parse, or the function name is already taken.
    ///
    /// # Examples
    ///
    /// ```
    /// use expression_eval::{fns, Environment, ParseMode};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let mut env = Environment::<f64>::new();
    /// fns::install(&mut env)?;
    /// env.define_function("hypot2", &["a", "b"], "a*a + b*b")?;
    ///
    /// let program = env.parse("hypot2(3, 4)", ParseMode::Normal)?;
    /// assert_eq!(program.evaluate()?, 25.0);
    /// # Ok(())
    /// # }
    /// ```
    pub fn define_function(
        &mut self,
        name: &str,
        params: &[&str],
        body: &str,
    ) -> Result<(), DefineError> {
        for (index, param) in params.iter().enumerate() {
            if params[..index].contains(param) {
                return Err(DictError::Duplicate.into());
            }
        }

        let mut slots = Vec::with_capacity(params.len());
        let mut scope = ParamScope {
            dict: &self.variables,
            params,
            saved: Vec::new(),
        };
        {
            let mut vars = scope.dict.borrow_mut();
            for &param in params {
                if let Ok(prev) = vars.remove(param) {
                    scope.saved.push((param.to_owned(), prev));
                }
                let slot = Rc::new(Binding::new(param, BindingKind::Mutable, T::default()));
                // Cannot collide: the key was just vacated.
                let _ = vars.insert(param, Rc::clone(&slot));
                slots.push(slot);
            }
        }

        let parsed = parser::parse(self, body, ParseMode::Normal, Handles::Strong);
        // Restores the shadowed bindings before a parse error is surfaced.
        drop(scope);
        let program = parsed?;

        let callable = move |args: &mut [Operand<T>]| {
            for (slot, arg) in slots.iter().zip(args.iter()) {
                slot.store(arg.value());
            }
            program.evaluate().map(|value| Some(Operand::Value(value)))
        };
        self.register_function(name, params.len(), callable)?;
        Ok(())
    }
}

/// Temporary shadowing of variables by function parameters. Dropping the
/// scope removes the parameter bindings and restores the saved ones.
struct ParamScope<'a, T> {
    dict: &'a SharedDict<Rc<Binding<T>>>,
    params: &'a [&'a str],
    saved: Vec<(String, Rc<Binding<T>>)>,
}

impl<T> Drop for ParamScope<'_, T> {
    fn drop(&mut self) {
        let mut vars = self.dict.borrow_mut();
        for &param in self.params {
            let _ = vars.remove(param);
        }
        for (name, binding) in self.saved.drain(..) {
            let _ = vars.insert(&name, binding);
        }
    }
}
