use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::value::{Map, Value};

/// Nesting bound applied by [`Parser::new`]. Deep enough for realistic
/// documents, shallow enough to fail cleanly before the call stack does.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Recursive-descent consumer of a [`Lexer`]'s token stream.
///
/// A parser holds no state across invocations; it is a configuration value
/// (the nesting bound) plus pure functions over whatever lexer it is handed.
#[derive(Debug, Clone, Copy)]
pub struct Parser {
    max_depth: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Parses exactly one document: a single value followed by end of input.
    ///
    /// The lexer is left as-is on return; callers that constructed it own its
    /// closing (the crate-level entry points do exactly that).
    pub fn parse_document(&self, lexer: &mut Lexer<'_>) -> Result<Value, ParseError> {
        lexer.next_token()?;
        let value = self.parse_value(lexer, 0)?;
        let trailing = lexer.next_token()?;
        match trailing.kind {
            TokenKind::Eof => Ok(value),
            _ => Err(unexpected(trailing)),
        }
    }

    /// Parses the value whose first token is the lexer's current token.
    fn parse_value(&self, lexer: &mut Lexer<'_>, depth: usize) -> Result<Value, ParseError> {
        let token = lexer.current_token()?;
        match &token.kind {
            TokenKind::ObjectStart => self.parse_object(lexer, depth + 1),
            TokenKind::ArrayStart => self.parse_array(lexer, depth + 1),
            TokenKind::String(s) => Ok(Value::String(s.clone())),
            TokenKind::Number(n) => Ok(Value::Number(*n)),
            TokenKind::True => Ok(Value::Bool(true)),
            TokenKind::False => Ok(Value::Bool(false)),
            TokenKind::Null => Ok(Value::Null),
            _ => Err(unexpected(token)),
        }
    }

    fn parse_object(&self, lexer: &mut Lexer<'_>, depth: usize) -> Result<Value, ParseError> {
        self.check_depth(lexer, depth)?;
        let mut map = Map::default();
        let mut token = lexer.next_token()?;
        if token.kind == TokenKind::ObjectEnd {
            return Ok(Value::Object(map));
        }
        loop {
            let key = match &token.kind {
                TokenKind::String(key) => key.clone(),
                _ => return Err(unexpected(token)),
            };
            let colon = lexer.next_token()?;
            if colon.kind != TokenKind::Colon {
                return Err(unexpected(colon));
            }
            lexer.next_token()?;
            let value = self.parse_value(lexer, depth)?;
            // Last write wins, and the entry takes the last occurrence's
            // place in iteration order.
            if map.contains_key(&key) {
                map.shift_remove(&key);
            }
            map.insert(key, value);
            let separator = lexer.next_token()?;
            match separator.kind {
                TokenKind::ObjectEnd => return Ok(Value::Object(map)),
                TokenKind::Comma => {}
                _ => return Err(unexpected(separator)),
            }
            token = lexer.next_token()?;
        }
    }

    fn parse_array(&self, lexer: &mut Lexer<'_>, depth: usize) -> Result<Value, ParseError> {
        self.check_depth(lexer, depth)?;
        let mut items = Vec::new();
        let first = lexer.next_token()?;
        if first.kind == TokenKind::ArrayEnd {
            return Ok(Value::Array(items));
        }
        loop {
            items.push(self.parse_value(lexer, depth)?);
            let separator = lexer.next_token()?;
            match separator.kind {
                TokenKind::ArrayEnd => return Ok(Value::Array(items)),
                TokenKind::Comma => {}
                _ => return Err(unexpected(separator)),
            }
            lexer.next_token()?;
        }
    }

    fn check_depth(&self, lexer: &Lexer<'_>, depth: usize) -> Result<(), ParseError> {
        if depth > self.max_depth {
            let position = match lexer.current_token() {
                Ok(token) => token.position,
                Err(_) => lexer.position(),
            };
            return Err(ParseError::new(
                ParseErrorKind::NestingTooDeep(self.max_depth),
                position,
            ));
        }
        Ok(())
    }
}

fn unexpected(token: &Token) -> ParseError {
    ParseError::new(
        ParseErrorKind::UnexpectedToken(token.kind.to_string()),
        token.position,
    )
}
