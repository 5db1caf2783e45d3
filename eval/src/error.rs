//! Error types for dictionary maintenance, parsing and evaluation.

use derive_more::Display;

use core::fmt;

/// Errors raised by [`SymbolDict`](crate::SymbolDict) operations.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum DictError {
    /// The key is already associated with a payload.
    #[display(fmt = "Key is already associated with a payload")]
    Duplicate,
    /// The key is not associated with a payload.
    #[display(fmt = "Key is not associated with a payload")]
    Missing,
}

impl std::error::Error for DictError {}

/// Kinds of parsing errors.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// No tokenizer accepted the character at the error position.
    #[display(fmt = "Unexpected character")]
    UnexpectedCharacter,

    /// A right delimiter without a matching left one, or vice versa.
    #[display(fmt = "Mismatched brackets")]
    MismatchedBrackets,

    /// An argument separator outside of any bracketed group.
    #[display(fmt = "Misplaced argument separator")]
    MisplacedSeparator,

    /// A function name not followed by the left delimiter of its call.
    #[display(fmt = "Function call must be parenthesized")]
    RequiredBracketMissing,

    /// A call supplies a number of arguments differing from the declared
    /// arity of the called operation.
    #[display(
        fmt = "`{}` expects {} argument(s), the call supplies {}",
        name,
        expected,
        supplied
    )]
    ArityMismatch {
        /// Name of the called operation.
        name: String,
        /// Declared arity.
        expected: usize,
        /// Number of arguments in the call.
        supplied: usize,
    },
}

/// Parsing error together with the byte position at fault.
///
/// The parser does not recover: the first failure aborts parsing and is
/// surfaced as a `ParseError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    position: usize,
    kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(position: usize, kind: ParseErrorKind) -> Self {
        Self { position, kind }
    }

    /// Returns the byte position in the source at which parsing failed.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} at position {}", self.kind, self.position)
    }
}

impl std::error::Error for ParseError {}

/// Errors raised when executing a [`Program`](crate::Program).
///
/// The evaluator does not recover: the first failure aborts the run.
#[derive(Debug, Display)]
#[non_exhaustive]
pub enum EvalError {
    /// An operation required more values than the stack holds. Cannot occur
    /// for parser-produced programs; the parser only emits programs whose
    /// running stack depth never goes negative.
    #[display(fmt = "Value stack underflow when applying `{}`", _0)]
    StackUnderflow(String),

    /// The value stack did not hold exactly one value at the end of the run.
    #[display(fmt = "Malformed program: {} values left on the stack", _0)]
    Malformed(usize),

    /// An operation was invoked with a number of arguments differing from
    /// its declared arity.
    #[display(fmt = "`{}` expects {} argument(s), got {}", name, expected, supplied)]
    Arity {
        /// Name of the operation.
        name: String,
        /// Declared arity.
        expected: usize,
        /// Number of supplied arguments.
        supplied: usize,
    },

    /// The program references a variable binding that has been dropped.
    /// Only programs produced by [`Environment::parse_weak`] can observe
    /// this.
    ///
    /// [`Environment::parse_weak`]: crate::Environment::parse_weak()
    #[display(fmt = "Program references a dropped variable binding")]
    ExpiredBinding,

    /// An assignment targeted a constant binding or a temporary value.
    #[display(fmt = "Cannot assign to a constant")]
    ConstAssignment,

    /// Error raised by a user-defined callable; passed through unchanged.
    #[display(fmt = "Error executing operation: {}", _0)]
    Callable(anyhow::Error),
}

impl EvalError {
    /// Creates a [`Callable`](Self::Callable) error with the specified
    /// `message`.
    ///
    /// This is a shortcut for callables that signal failure with a plain
    /// message (e.g., a division checking for a zero denominator).
    pub fn callable(message: impl Into<String>) -> Self {
        Self::Callable(anyhow::Error::msg(message.into()))
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Callable(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Errors raised by [`Environment::define_function`].
///
/// [`Environment::define_function`]: crate::Environment::define_function()
#[derive(Debug, Display)]
#[non_exhaustive]
pub enum DefineError {
    /// The function body failed to parse. Parameter bindings are restored
    /// before the error is surfaced.
    #[display(fmt = "{}", _0)]
    Parse(ParseError),
    /// A dictionary operation failed: the function name is already taken,
    /// or the parameter list contains a duplicate name.
    #[display(fmt = "{}", _0)]
    Dict(DictError),
}

impl From<ParseError> for DefineError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<DictError> for DefineError {
    fn from(err: DictError) -> Self {
        Self::Dict(err)
    }
}

impl std::error::Error for DefineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Dict(err) => Some(err),
        }
    }
}
