//! JSON parsing, manipulation, and serialization.
//!
//! Text goes in through [`from_str`], [`from_reader`], or [`from_file`] and
//! comes out as a [`Value`] tree; [`Value::serialize`] and
//! [`Value::to_pretty_string`] turn a tree back into text.
//!
//! ```rust
//! let value = jsontext::from_str(r#"{"name": "gadget", "tags": ["a", "b"]}"#)?;
//! assert_eq!(value.get("name").and_then(|v| v.as_str().ok()), Some("gadget"));
//! assert_eq!(value.serialize(), r#"{"name":"gadget","tags":["a","b"]}"#);
//! # Ok::<(), jsontext::ParseError>(())
//! ```
//!
//! Malformed input is rejected with the character position of the offending
//! input:
//!
//! ```rust
//! let error = jsontext::from_str("[1, ]").expect_err("trailing comma");
//! assert_eq!(error.position(), 4);
//! ```
//!
//! For token-level access, drive a [`Lexer`] directly, or combine one with a
//! [`Parser`] to override the nesting bound:
//!
//! ```rust
//! use jsontext::{Lexer, Parser};
//!
//! let mut lexer = Lexer::new("[[42]]");
//! let value = Parser::with_max_depth(4).parse_document(&mut lexer)?;
//! lexer.close();
//! assert_eq!(value.get_index(0).and_then(|v| v.get_index(0)).and_then(|v| v.as_i64().ok()), Some(42));
//! # Ok::<(), jsontext::ParseError>(())
//! ```
mod error;
mod lexer;
mod parser;
mod ser;
mod value;

use std::fs::File;
use std::io::Read;
use std::path::Path;

pub use error::{ParseError, ParseErrorKind, TypeMismatch, ValueType};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{Parser, DEFAULT_MAX_DEPTH};
pub use ser::{PrettyConfig, PrettyPrinter};
pub use value::{Map, Number, Value};

/// Parses a complete JSON document from a string.
pub fn from_str(text: &str) -> Result<Value, ParseError> {
    parse_with(Lexer::new(text))
}

/// Parses a complete JSON document from a byte stream.
///
/// The reader is consumed incrementally through a fixed-size buffer, so the
/// document never needs to fit in memory as text.
pub fn from_reader<R: Read>(reader: R) -> Result<Value, ParseError> {
    parse_with(Lexer::from_reader(reader))
}

/// Parses the JSON document stored at `path`.
pub fn from_file(path: impl AsRef<Path>) -> Result<Value, ParseError> {
    let file = File::open(path).map_err(|error| ParseError::new(ParseErrorKind::Io(error), 0))?;
    parse_with(Lexer::from_reader(file))
}

/// Fetches `url` and parses the response body as a JSON document.
#[cfg(feature = "resolve-http")]
pub fn from_url(url: &str) -> Result<Value, ParseError> {
    let response = reqwest::blocking::get(url)
        .map_err(|error| ParseError::new(ParseErrorKind::Io(std::io::Error::other(error)), 0))?;
    parse_with(Lexer::from_reader(response))
}

fn parse_with(mut lexer: Lexer<'_>) -> Result<Value, ParseError> {
    let result = Parser::new().parse_document(&mut lexer);
    lexer.close();
    result
}
