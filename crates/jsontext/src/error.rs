use std::{error::Error, fmt, io};

/// A failed parse.
///
/// Carries the zero-based character offset at which the failure occurred and
/// a [`ParseErrorKind`] describing what went wrong there. Every failure is
/// terminal for the parse in progress; there is no recovery or resync.
#[derive(Debug)]
pub struct ParseError {
    kind: ParseErrorKind,
    position: usize,
}

#[derive(Debug)]
pub enum ParseErrorKind {
    /// No valid token can begin or continue at the current position.
    UnexpectedCharacter(char),
    /// The grammar does not permit this token in the current parser state.
    /// The payload is the rendered token text.
    UnexpectedToken(String),
    /// The input ended in the middle of a token.
    UnexpectedEof,
    /// The document nests deeper than the configured limit.
    NestingTooDeep(usize),
    /// The byte stream is not valid UTF-8.
    InvalidUtf8,
    /// A `\u` escape encodes a lone UTF-16 surrogate.
    UnpairedSurrogate,
    /// The underlying source failed to read.
    Io(io::Error),
    /// A token operation was invoked on a closed lexer.
    Closed,
    /// `current_token` was called before the first `next_token`.
    Unstarted,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, position: usize) -> Self {
        Self { kind, position }
    }

    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// Zero-based character offset of the offending input.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParseErrorKind::UnexpectedCharacter(c) => {
                write!(f, "unexpected character {c:?} at position {}", self.position)
            }
            ParseErrorKind::UnexpectedToken(token) => {
                write!(f, "unexpected token {token} at position {}", self.position)
            }
            ParseErrorKind::UnexpectedEof => {
                write!(f, "unexpected end of input at position {}", self.position)
            }
            ParseErrorKind::NestingTooDeep(limit) => {
                write!(
                    f,
                    "nesting deeper than {limit} levels at position {}",
                    self.position
                )
            }
            ParseErrorKind::InvalidUtf8 => {
                write!(f, "invalid UTF-8 at position {}", self.position)
            }
            ParseErrorKind::UnpairedSurrogate => {
                write!(
                    f,
                    "unpaired surrogate in unicode escape at position {}",
                    self.position
                )
            }
            ParseErrorKind::Io(error) => {
                write!(f, "read failed at position {}: {error}", self.position)
            }
            ParseErrorKind::Closed => write!(f, "the lexer is already closed"),
            ParseErrorKind::Unstarted => write!(f, "no token has been produced yet"),
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            ParseErrorKind::Io(error) => Some(error),
            _ => None,
        }
    }
}

/// The six cases a [`crate::Value`] can take, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueType::Null => "null",
            ValueType::Bool => "boolean",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Array => "array",
            ValueType::Object => "object",
        })
    }
}

/// A narrowing accessor was called against a non-matching [`ValueType`].
///
/// This is a caller-usage error surfaced at the accessor call site; it never
/// originates from parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMismatch {
    actual: ValueType,
    requested: ValueType,
}

impl TypeMismatch {
    pub(crate) fn new(actual: ValueType, requested: ValueType) -> Self {
        Self { actual, requested }
    }

    pub fn actual(&self) -> ValueType {
        self.actual
    }

    pub fn requested(&self) -> ValueType {
        self.requested
    }
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot access a {} value as {}",
            self.actual, self.requested
        )
    }
}

impl Error for TypeMismatch {}
