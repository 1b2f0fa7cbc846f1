use core::fmt;
use std::io::Read;

use crate::error::{ParseError, ParseErrorKind};
use crate::value::Number;

const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;
// A refill must always be able to hold one complete code point.
const MIN_BUFFER_SIZE: usize = 4;

/// One classified lexical unit.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Eof,
    ObjectStart,
    ObjectEnd,
    ArrayStart,
    ArrayEnd,
    Comma,
    Colon,
    True,
    False,
    Null,
    String(String),
    Number(Number),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Eof => f.write_str("EOF"),
            TokenKind::ObjectStart => f.write_str("{"),
            TokenKind::ObjectEnd => f.write_str("}"),
            TokenKind::ArrayStart => f.write_str("["),
            TokenKind::ArrayEnd => f.write_str("]"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Colon => f.write_str(":"),
            TokenKind::True => f.write_str("true"),
            TokenKind::False => f.write_str("false"),
            TokenKind::Null => f.write_str("null"),
            TokenKind::String(s) => f.write_str(s),
            TokenKind::Number(n) => n.fmt(f),
        }
    }
}

/// A token plus the zero-based character offset of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

/// Converts character input into tokens on demand.
///
/// A lexer is single-threaded mutable state: sharing one instance between
/// threads without external synchronization is a caller error. The underlying
/// source is released by [`Lexer::close`] (or on drop); after `close`, every
/// token operation fails with a closed-state error.
///
/// String-backed input is consumed in place with no refill. Stream-backed
/// input goes through a rolling byte buffer that refills from the reader,
/// keeping any partially read UTF-8 sequence intact across refills;
/// in-progress string and number literals accumulate in a scratch buffer, so
/// no token state spans a refill boundary.
pub struct Lexer<'a> {
    input: Option<Input<'a>>,
    peeked: Option<char>,
    position: usize,
    current: Option<Token>,
    scratch: String,
}

enum Input<'a> {
    Text(std::str::Chars<'a>),
    Stream(StreamInput<'a>),
}

struct StreamInput<'a> {
    reader: Box<dyn Read + 'a>,
    buf: Box<[u8]>,
    start: usize,
    end: usize,
    eof: bool,
}

impl<'a> StreamInput<'a> {
    fn refill(&mut self, position: usize) -> Result<(), ParseError> {
        if self.start > 0 {
            self.buf.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }
        match self.reader.read(&mut self.buf[self.end..]) {
            Ok(0) => {
                self.eof = true;
                Ok(())
            }
            Ok(n) => {
                self.end += n;
                Ok(())
            }
            Err(error) => Err(ParseError::new(ParseErrorKind::Io(error), position)),
        }
    }

    fn next_char(&mut self, position: usize) -> Result<Option<char>, ParseError> {
        loop {
            let available = self.end - self.start;
            if available == 0 {
                if self.eof {
                    return Ok(None);
                }
                self.refill(position)?;
                continue;
            }
            let Some(need) = utf8_sequence_len(self.buf[self.start]) else {
                return Err(ParseError::new(ParseErrorKind::InvalidUtf8, position));
            };
            if available < need {
                if self.eof {
                    // Source ended inside a multi-byte sequence.
                    return Err(ParseError::new(ParseErrorKind::InvalidUtf8, position));
                }
                self.refill(position)?;
                continue;
            }
            let bytes = &self.buf[self.start..self.start + need];
            let Some(c) = std::str::from_utf8(bytes).ok().and_then(|s| s.chars().next()) else {
                return Err(ParseError::new(ParseErrorKind::InvalidUtf8, position));
            };
            self.start += need;
            return Ok(Some(c));
        }
    }
}

fn utf8_sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

impl<'a> Lexer<'a> {
    /// Lexer over an in-memory string; end-of-input is reported one past the
    /// final character.
    pub fn new(text: &'a str) -> Self {
        Self::with_input(Input::Text(text.chars()))
    }

    /// Lexer over a byte stream, decoded as UTF-8.
    pub fn from_reader(reader: impl Read + 'a) -> Self {
        Self::from_reader_with_capacity(reader, DEFAULT_BUFFER_SIZE)
    }

    /// Like [`Lexer::from_reader`] with an explicit buffer capacity.
    /// Capacities below one code point (4 bytes) are rounded up.
    pub fn from_reader_with_capacity(reader: impl Read + 'a, capacity: usize) -> Self {
        Self::with_input(Input::Stream(StreamInput {
            reader: Box::new(reader),
            buf: vec![0; capacity.max(MIN_BUFFER_SIZE)].into_boxed_slice(),
            start: 0,
            end: 0,
            eof: false,
        }))
    }

    fn with_input(input: Input<'a>) -> Self {
        Self {
            input: Some(input),
            peeked: None,
            position: 0,
            current: None,
            scratch: String::new(),
        }
    }

    /// Zero-based count of characters consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Advances past one token and returns it.
    pub fn next_token(&mut self) -> Result<&Token, ParseError> {
        if self.input.is_none() {
            return Err(ParseError::new(ParseErrorKind::Closed, self.position));
        }
        let token = self.read_token()?;
        Ok(self.current.insert(token))
    }

    /// The most recently produced token, without advancing.
    pub fn current_token(&self) -> Result<&Token, ParseError> {
        if self.input.is_none() {
            return Err(ParseError::new(ParseErrorKind::Closed, self.position));
        }
        self.current
            .as_ref()
            .ok_or_else(|| ParseError::new(ParseErrorKind::Unstarted, self.position))
    }

    /// Releases the underlying source. Idempotent; subsequent token
    /// operations fail with a closed-state error.
    pub fn close(&mut self) {
        self.input = None;
        self.current = None;
        self.peeked = None;
        self.scratch = String::new();
    }

    fn read_char(&mut self) -> Result<Option<char>, ParseError> {
        match self.input.as_mut() {
            Some(Input::Text(chars)) => Ok(chars.next()),
            Some(Input::Stream(stream)) => stream.next_char(self.position),
            None => Err(ParseError::new(ParseErrorKind::Closed, self.position)),
        }
    }

    fn next_char(&mut self) -> Result<Option<char>, ParseError> {
        let c = match self.peeked.take() {
            Some(c) => Some(c),
            None => self.read_char()?,
        };
        if c.is_some() {
            self.position += 1;
        }
        Ok(c)
    }

    fn peek_char(&mut self) -> Result<Option<char>, ParseError> {
        if self.peeked.is_none() {
            self.peeked = self.read_char()?;
        }
        Ok(self.peeked)
    }

    fn read_token(&mut self) -> Result<Token, ParseError> {
        loop {
            let start = self.position;
            let Some(c) = self.next_char()? else {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    position: self.position,
                });
            };
            let kind = match c {
                ' ' | '\t' | '\r' | '\n' | '\0' => continue,
                '{' => TokenKind::ObjectStart,
                '}' => TokenKind::ObjectEnd,
                '[' => TokenKind::ArrayStart,
                ']' => TokenKind::ArrayEnd,
                ',' => TokenKind::Comma,
                ':' => TokenKind::Colon,
                '"' => TokenKind::String(self.read_string()?),
                '-' | '0'..='9' => TokenKind::Number(self.read_number(c, start)?),
                't' => {
                    self.expect_keyword("rue")?;
                    TokenKind::True
                }
                'f' => {
                    self.expect_keyword("alse")?;
                    TokenKind::False
                }
                'n' => {
                    self.expect_keyword("ull")?;
                    TokenKind::Null
                }
                other => {
                    return Err(ParseError::new(
                        ParseErrorKind::UnexpectedCharacter(other),
                        start,
                    ))
                }
            };
            return Ok(Token {
                kind,
                position: start,
            });
        }
    }

    fn expect_keyword(&mut self, rest: &str) -> Result<(), ParseError> {
        for expected in rest.chars() {
            let at = self.position;
            match self.next_char()? {
                Some(c) if c == expected => {}
                Some(c) => {
                    return Err(ParseError::new(ParseErrorKind::UnexpectedCharacter(c), at))
                }
                None => {
                    return Err(ParseError::new(ParseErrorKind::UnexpectedEof, self.position))
                }
            }
        }
        Ok(())
    }

    fn read_string(&mut self) -> Result<String, ParseError> {
        self.scratch.clear();
        loop {
            let at = self.position;
            let Some(c) = self.next_char()? else {
                return Err(ParseError::new(ParseErrorKind::UnexpectedEof, self.position));
            };
            match c {
                '"' => return Ok(std::mem::take(&mut self.scratch)),
                '\\' => {
                    let decoded = self.read_escape()?;
                    self.scratch.push(decoded);
                }
                '\u{8}' | '\u{c}' | '\n' | '\r' | '\t' => {
                    return Err(ParseError::new(ParseErrorKind::UnexpectedCharacter(c), at))
                }
                _ => self.scratch.push(c),
            }
        }
    }

    fn read_escape(&mut self) -> Result<char, ParseError> {
        let at = self.position;
        let Some(c) = self.next_char()? else {
            return Err(ParseError::new(ParseErrorKind::UnexpectedEof, self.position));
        };
        Ok(match c {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => return self.read_unicode_escape(at),
            other => {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedCharacter(other),
                    at,
                ))
            }
        })
    }

    /// Decodes `\uXXXX` as one UTF-16 code unit; a lead surrogate must be
    /// followed immediately by a trail surrogate escape and the pair is
    /// combined into one code point.
    fn read_unicode_escape(&mut self, escape_at: usize) -> Result<char, ParseError> {
        let unit = self.read_hex_unit()?;
        let code = if (0xD800..=0xDBFF).contains(&unit) {
            if self.next_char()? != Some('\\') || self.next_char()? != Some('u') {
                return Err(ParseError::new(
                    ParseErrorKind::UnpairedSurrogate,
                    escape_at,
                ));
            }
            let trail = self.read_hex_unit()?;
            if !(0xDC00..=0xDFFF).contains(&trail) {
                return Err(ParseError::new(
                    ParseErrorKind::UnpairedSurrogate,
                    escape_at,
                ));
            }
            0x10000 + ((unit - 0xD800) << 10) + (trail - 0xDC00)
        } else if (0xDC00..=0xDFFF).contains(&unit) {
            return Err(ParseError::new(
                ParseErrorKind::UnpairedSurrogate,
                escape_at,
            ));
        } else {
            unit
        };
        char::from_u32(code).ok_or_else(|| {
            ParseError::new(ParseErrorKind::UnpairedSurrogate, escape_at)
        })
    }

    fn read_hex_unit(&mut self) -> Result<u32, ParseError> {
        let mut unit = 0;
        for _ in 0..4 {
            let at = self.position;
            let Some(c) = self.next_char()? else {
                return Err(ParseError::new(ParseErrorKind::UnexpectedEof, self.position));
            };
            let Some(digit) = c.to_digit(16) else {
                return Err(ParseError::new(ParseErrorKind::UnexpectedCharacter(c), at));
            };
            unit = unit << 4 | digit;
        }
        Ok(unit)
    }

    /// Scans `-? digits ('.' digits)? ([eE] [+-]? digits)?` strictly; bare
    /// minus signs, trailing dots, and empty exponents are lexical errors.
    fn read_number(&mut self, first: char, start: usize) -> Result<Number, ParseError> {
        self.scratch.clear();
        self.scratch.push(first);
        let mut is_float = false;
        if first == '-' {
            self.require_digit()?;
        }
        self.consume_digits()?;
        if self.peek_char()? == Some('.') {
            is_float = true;
            self.push_next()?;
            self.require_digit()?;
            self.consume_digits()?;
        }
        if matches!(self.peek_char()?, Some('e' | 'E')) {
            is_float = true;
            self.push_next()?;
            if matches!(self.peek_char()?, Some('+' | '-')) {
                self.push_next()?;
            }
            self.require_digit()?;
            self.consume_digits()?;
        }
        if is_float {
            match self.scratch.parse() {
                Ok(f) => Ok(Number::Float(f)),
                Err(_) => Err(ParseError::new(
                    ParseErrorKind::UnexpectedToken(self.scratch.clone()),
                    start,
                )),
            }
        } else {
            match self.scratch.parse() {
                Ok(i) => Ok(Number::Int(i)),
                // Out of i64 range; keep the value as a float.
                Err(_) => match self.scratch.parse() {
                    Ok(f) => Ok(Number::Float(f)),
                    Err(_) => Err(ParseError::new(
                        ParseErrorKind::UnexpectedToken(self.scratch.clone()),
                        start,
                    )),
                },
            }
        }
    }

    fn push_next(&mut self) -> Result<(), ParseError> {
        if let Some(c) = self.next_char()? {
            self.scratch.push(c);
        }
        Ok(())
    }

    fn consume_digits(&mut self) -> Result<(), ParseError> {
        while matches!(self.peek_char()?, Some('0'..='9')) {
            self.push_next()?;
        }
        Ok(())
    }

    fn require_digit(&mut self) -> Result<(), ParseError> {
        let at = self.position;
        match self.next_char()? {
            Some(c @ '0'..='9') => {
                self.scratch.push(c);
                Ok(())
            }
            Some(c) => Err(ParseError::new(ParseErrorKind::UnexpectedCharacter(c), at)),
            None => Err(ParseError::new(ParseErrorKind::UnexpectedEof, self.position)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, Read};

    use test_case::test_case;

    use super::*;
    use crate::error::ParseErrorKind;

    fn tokenize(text: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(text);
        let mut kinds = Vec::new();
        loop {
            let token = lexer.next_token().expect("token should lex");
            let done = token.kind == TokenKind::Eof;
            kinds.push(token.kind.clone());
            if done {
                return kinds;
            }
        }
    }

    fn first_token(text: &str) -> TokenKind {
        tokenize(text).remove(0)
    }

    fn lex_error(text: &str) -> ParseError {
        let mut lexer = Lexer::new(text);
        loop {
            let done = match lexer.next_token() {
                Ok(token) => token.kind == TokenKind::Eof,
                Err(error) => return error,
            };
            assert!(!done, "expected a lexical error in {text:?}");
        }
    }

    #[test_case("{", TokenKind::ObjectStart; "object start")]
    #[test_case("}", TokenKind::ObjectEnd; "object end")]
    #[test_case("[", TokenKind::ArrayStart; "array start")]
    #[test_case("]", TokenKind::ArrayEnd; "array end")]
    #[test_case(",", TokenKind::Comma; "comma")]
    #[test_case(":", TokenKind::Colon; "colon")]
    #[test_case("true", TokenKind::True; "true literal")]
    #[test_case("false", TokenKind::False; "false literal")]
    #[test_case("null", TokenKind::Null; "null literal")]
    fn structural_and_keyword_tokens(text: &str, expected: TokenKind) {
        assert_eq!(first_token(text), expected);
    }

    #[test]
    fn whitespace_never_produces_a_token() {
        assert_eq!(tokenize(" \t\r\n\0 "), vec![TokenKind::Eof]);
        assert_eq!(
            tokenize(" [ true ,\nfalse ] "),
            vec![
                TokenKind::ArrayStart,
                TokenKind::True,
                TokenKind::Comma,
                TokenKind::False,
                TokenKind::ArrayEnd,
                TokenKind::Eof,
            ]
        );
    }

    #[test_case(r#""hello""#, "hello"; "plain")]
    #[test_case(r#""""#, ""; "empty")]
    #[test_case(r#""a\/b""#, "a/b"; "escaped solidus")]
    #[test_case(r#""\"\\\b\f\n\r\t""#, "\"\\\u{8}\u{c}\n\r\t"; "short escapes")]
    #[test_case("\"\\u0041\\u00e9\"", "A\u{e9}"; "unicode escapes")]
    #[test_case("\"\\uABCD\"", "\u{ABCD}"; "bmp code point")]
    #[test_case("\"\\uD83D\\uDE00\"", "\u{1F600}"; "surrogate pair")]
    #[test_case("\"caf\u{e9}\"", "caf\u{e9}"; "raw multibyte")]
    fn string_decoding(text: &str, expected: &str) {
        assert_eq!(first_token(text), TokenKind::String(expected.to_owned()));
    }

    #[test_case("123", Number::Int(123); "integer")]
    #[test_case("-123", Number::Int(-123); "negative integer")]
    #[test_case("0", Number::Int(0); "zero")]
    #[test_case("1.010", Number::Float(1.01); "fraction")]
    #[test_case("1.010e-5", Number::Float(1.01e-5); "fraction with exponent")]
    #[test_case("2E3", Number::Float(2000.0); "upper exponent")]
    #[test_case("2e+3", Number::Float(2000.0); "signed exponent")]
    #[test_case("-0.5", Number::Float(-0.5); "negative fraction")]
    #[test_case("9223372036854775808", Number::Float(9_223_372_036_854_775_808.0); "i64 overflow becomes float")]
    fn number_classification(text: &str, expected: Number) {
        assert_eq!(first_token(text), TokenKind::Number(expected));
    }

    #[test_case("x", 'x', 0; "unknown leading character")]
    #[test_case("[+1]", '+', 1; "leading plus")]
    #[test_case("nulx", 'x', 3; "keyword mismatch")]
    #[test_case("-a", 'a', 1; "bare minus")]
    #[test_case("1.x", 'x', 2; "dot without digits")]
    #[test_case("1e*", '*', 2; "empty exponent")]
    #[test_case("\"a\nb\"", '\n', 2; "unescaped control character")]
    #[test_case(r#""\q""#, 'q', 2; "unknown escape class")]
    #[test_case(r#""\u12G4""#, 'G', 5; "non-hex escape digit")]
    fn unexpected_characters(text: &str, offending: char, position: usize) {
        let error = lex_error(text);
        assert!(
            matches!(error.kind(), ParseErrorKind::UnexpectedCharacter(c) if *c == offending),
            "{error}"
        );
        assert_eq!(error.position(), position);
    }

    #[test_case("\"abc"; "unterminated string")]
    #[test_case("-"; "minus alone")]
    #[test_case("1."; "trailing dot")]
    #[test_case("1e"; "trailing exponent")]
    #[test_case("tru"; "truncated keyword")]
    #[test_case("\"\\u12"; "truncated unicode escape")]
    fn truncated_input(text: &str) {
        let error = lex_error(text);
        assert!(
            matches!(error.kind(), ParseErrorKind::UnexpectedEof),
            "{error}"
        );
        assert_eq!(error.position(), text.chars().count());
    }

    #[test_case(r#""\uD800""#; "lone lead surrogate")]
    #[test_case(r#""\uDC00""#; "lone trail surrogate")]
    #[test_case(r#""\uD800A""#; "lead without trail")]
    fn surrogate_errors(text: &str) {
        let error = lex_error(text);
        assert!(
            matches!(error.kind(), ParseErrorKind::UnpairedSurrogate),
            "{error}"
        );
        // The escape is introduced right after the opening quote.
        assert_eq!(error.position(), 2);
    }

    #[test]
    fn positions_are_zero_based_token_starts() {
        let mut lexer = Lexer::new("  [null, 12]");
        for expected in [2, 3, 7, 9, 11] {
            assert_eq!(lexer.next_token().expect("token should lex").position, expected);
        }
        // EOF sits one past the final character for string sources.
        assert_eq!(lexer.next_token().expect("token should lex").position, 12);
        assert_eq!(lexer.position(), 12);
    }

    #[test]
    fn current_token_before_first_advance_is_a_state_error() {
        let lexer = Lexer::new("1");
        let error = lexer.current_token().expect_err("must not have a token");
        assert!(matches!(error.kind(), ParseErrorKind::Unstarted));
    }

    #[test]
    fn close_is_idempotent_and_poisons_token_operations() {
        let mut lexer = Lexer::new("1");
        lexer.next_token().expect("token should lex");
        lexer.close();
        lexer.close();
        assert!(matches!(
            lexer.next_token().expect_err("closed").kind(),
            ParseErrorKind::Closed
        ));
        assert!(matches!(
            lexer.current_token().expect_err("closed").kind(),
            ParseErrorKind::Closed
        ));
    }

    #[test]
    fn current_token_returns_the_most_recent_token() {
        let mut lexer = Lexer::new("[1]");
        lexer.next_token().expect("token should lex");
        assert_eq!(
            lexer.current_token().expect("token is current").kind,
            TokenKind::ArrayStart
        );
        lexer.next_token().expect("token should lex");
        assert_eq!(
            lexer.current_token().expect("token is current").kind,
            TokenKind::Number(Number::Int(1))
        );
    }

    #[test]
    fn tiny_stream_buffers_produce_the_same_tokens() {
        let doc = "{\"emoji\": \"\u{1F600}\u{1F388}\", \"caf\u{e9}\": [1, 2.5, null]}";
        let expected = tokenize(doc);
        for capacity in [1, 2, 3, 4, 5, 7, 16] {
            let mut lexer = Lexer::from_reader_with_capacity(Cursor::new(doc.as_bytes()), capacity);
            let mut kinds = Vec::new();
            loop {
                let token = lexer.next_token().expect("token should lex");
                let done = token.kind == TokenKind::Eof;
                kinds.push(token.kind.clone());
                if done {
                    break;
                }
            }
            assert_eq!(kinds, expected, "capacity {capacity}");
        }
    }

    #[test_case(&[0xFF]; "invalid lead byte")]
    #[test_case(&[0xE2, 0x82]; "truncated sequence")]
    #[test_case(&[0xC0, 0xAF]; "overlong encoding")]
    fn invalid_utf8_input(bytes: &[u8]) {
        let mut lexer = Lexer::from_reader(Cursor::new(bytes.to_vec()));
        let error = lexer.next_token().expect_err("must fail");
        assert!(matches!(error.kind(), ParseErrorKind::InvalidUtf8), "{error}");
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "boom"))
        }
    }

    #[test]
    fn read_failures_are_wrapped_with_position() {
        let mut lexer = Lexer::from_reader(FailingReader);
        let error = lexer.next_token().expect_err("must fail");
        assert!(matches!(error.kind(), ParseErrorKind::Io(_)), "{error}");
        assert_eq!(error.position(), 0);
    }
}
