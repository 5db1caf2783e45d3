//! Variable bindings, operation records and the callable interface.

use core::fmt;
use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use crate::error::EvalError;

/// Precedence assigned to function-call operations. An operation with this
/// precedence is never popped from the operator stack by an infix or suffix
/// operator; it is emitted only when the right delimiter of its call is
/// processed.
pub const CALL_PRECEDENCE: usize = usize::MAX;

/// Mutability of a [`Binding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// The binding rejects assignment and is eligible for constant folding
    /// under [`ParseMode::Normal`](crate::ParseMode::Normal).
    Const,
    /// The binding can be written through the evaluator.
    Mutable,
}

/// Named slot holding a value of the numeric domain.
///
/// Bindings live in the variable dictionary of an
/// [`Environment`](crate::Environment) and are shared, by reference-counted
/// handle, with every parsed program that names them. Writing through a
/// handle is therefore observed by all programs on their next evaluation.
#[derive(Debug)]
pub struct Binding<T> {
    name: String,
    kind: BindingKind,
    value: RefCell<T>,
}

impl<T> Binding<T> {
    pub(crate) fn new(name: &str, kind: BindingKind, value: T) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            value: RefCell::new(value),
        }
    }

    /// Returns the display name of this binding.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the mutability of this binding.
    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    /// Checks whether this binding can be assigned to.
    pub fn is_mutable(&self) -> bool {
        self.kind == BindingKind::Mutable
    }

    /// Sets the value of this binding.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::ConstAssignment`] for a `Const` binding.
    pub fn set(&self, value: T) -> Result<(), EvalError> {
        if !self.is_mutable() {
            return Err(EvalError::ConstAssignment);
        }
        *self.value.borrow_mut() = value;
        Ok(())
    }

    // Parameter slots of user functions bypass the mutability check; they are
    // not reachable through any dictionary.
    pub(crate) fn store(&self, value: T) {
        *self.value.borrow_mut() = value;
    }
}

impl<T: Clone> Binding<T> {
    /// Returns the current value of this binding.
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }
}

/// Reference from a program to a variable binding.
///
/// Programs produced by [`Environment::parse`] hold strong handles: the
/// binding outlives the program even if it is pruned from the dictionary.
/// [`Environment::parse_weak`] produces weak handles instead, which expire
/// together with the dictionary entry.
///
/// [`Environment::parse`]: crate::Environment::parse()
/// [`Environment::parse_weak`]: crate::Environment::parse_weak()
#[derive(Debug)]
pub(crate) enum VarRef<T> {
    Strong(Rc<Binding<T>>),
    Weak(Weak<Binding<T>>),
}

impl<T> Clone for VarRef<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Strong(rc) => Self::Strong(Rc::clone(rc)),
            Self::Weak(weak) => Self::Weak(Weak::clone(weak)),
        }
    }
}

impl<T> VarRef<T> {
    pub(crate) fn upgrade(&self) -> Result<Rc<Binding<T>>, EvalError> {
        match self {
            Self::Strong(rc) => Ok(Rc::clone(rc)),
            Self::Weak(weak) => weak.upgrade().ok_or(EvalError::ExpiredBinding),
        }
    }
}

/// Operand passed to a callable: either a plain value or a handle to a
/// variable binding.
///
/// Handles let assignment-style callables distinguish writable targets from
/// constants and temporaries; purely arithmetic callables only ever read the
/// [value](Self::value) component.
#[derive(Debug)]
pub enum Operand<T> {
    /// An intermediate value with no storage behind it.
    Value(T),
    /// A handle to a variable binding.
    Var(Rc<Binding<T>>),
}

impl<T: Clone> Clone for Operand<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Value(value) => Self::Value(value.clone()),
            Self::Var(binding) => Self::Var(Rc::clone(binding)),
        }
    }
}

impl<T: Clone> Operand<T> {
    /// Returns the value of this operand, reading through the binding if
    /// necessary.
    pub fn value(&self) -> T {
        match self {
            Self::Value(value) => value.clone(),
            Self::Var(binding) => binding.get(),
        }
    }
}

impl<T> Operand<T> {
    /// Checks whether [`assign`](Self::assign) would succeed.
    pub fn is_assignable(&self) -> bool {
        match self {
            Self::Value(_) => false,
            Self::Var(binding) => binding.is_mutable(),
        }
    }

    /// Writes `value` through this operand.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::ConstAssignment`] if the operand is a temporary
    /// value or a handle to a `Const` binding.
    pub fn assign(&self, value: T) -> Result<(), EvalError> {
        match self {
            Self::Value(_) => Err(EvalError::ConstAssignment),
            Self::Var(binding) => binding.set(value),
        }
    }
}

/// Callable body of an [`Operation`].
///
/// Implemented automatically for compatible closures; see the
/// [`fns`](crate::fns) module for ready-made wrappers around plain value
/// functions.
pub trait NativeOp<T> {
    /// Executes the operation on the specified arguments. The slice length
    /// always equals the declared arity of the owning operation.
    ///
    /// Returning `Ok(None)` pushes nothing onto the value stack.
    fn evaluate(&self, args: &mut [Operand<T>]) -> Result<Option<Operand<T>>, EvalError>;
}

impl<T, F> NativeOp<T> for F
where
    F: Fn(&mut [Operand<T>]) -> Result<Option<Operand<T>>, EvalError>,
{
    fn evaluate(&self, args: &mut [Operand<T>]) -> Result<Option<Operand<T>>, EvalError> {
        self(args)
    }
}

impl<T> fmt::Debug for dyn NativeOp<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("NativeOp").finish()
    }
}

/// Operation record: display name, arity, precedence and the callable.
///
/// A single `Operation` type backs prefix operators, infix operators (via
/// [`InfixOp`]), suffix operators and named functions; the table an operation
/// is registered in determines how the parser treats it.
pub struct Operation<T> {
    name: String,
    arity: usize,
    precedence: usize,
    callable: Box<dyn NativeOp<T>>,
}

impl<T> fmt::Debug for Operation<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Operation")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("precedence", &self.precedence)
            .finish()
    }
}

impl<T> Operation<T> {
    pub(crate) fn new(
        name: &str,
        arity: usize,
        precedence: usize,
        callable: impl NativeOp<T> + 'static,
    ) -> Self {
        Self {
            name: name.to_owned(),
            arity,
            precedence,
            callable: Box::new(callable),
        }
    }

    /// Returns the display name of this operation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of operands this operation consumes.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Returns the precedence of this operation; [`CALL_PRECEDENCE`] for
    /// named functions.
    pub fn precedence(&self) -> usize {
        self.precedence
    }

    pub(crate) fn call(&self, args: &mut [Operand<T>]) -> Result<Option<Operand<T>>, EvalError> {
        if args.len() != self.arity {
            return Err(EvalError::Arity {
                name: self.name.clone(),
                expected: self.arity,
                supplied: args.len(),
            });
        }
        self.callable.evaluate(args)
    }
}

/// Associativity of an infix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    /// `a ~ b ~ c` groups as `(a ~ b) ~ c`.
    Left,
    /// `a ~ b ~ c` groups as `a ~ (b ~ c)`.
    Right,
}

/// Infix operation: an [`Operation`] plus its associativity.
#[derive(Debug)]
pub struct InfixOp<T> {
    operation: Rc<Operation<T>>,
    associativity: Associativity,
}

impl<T> Clone for InfixOp<T> {
    fn clone(&self) -> Self {
        Self {
            operation: Rc::clone(&self.operation),
            associativity: self.associativity,
        }
    }
}

impl<T> InfixOp<T> {
    pub(crate) fn new(operation: Rc<Operation<T>>, associativity: Associativity) -> Self {
        Self {
            operation,
            associativity,
        }
    }

    /// Returns the underlying operation.
    pub fn operation(&self) -> &Rc<Operation<T>> {
        &self.operation
    }

    /// Returns the associativity of this operator.
    pub fn associativity(&self) -> Associativity {
        self.associativity
    }
}
