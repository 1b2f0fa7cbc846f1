mod pretty;

use core::fmt::{self, Write};

use crate::value::{Number, Value};

pub use pretty::{PrettyConfig, PrettyPrinter};

/// Renders the canonical compact form: no inserted whitespace, object keys
/// in iteration order. The output re-parses to an equal value.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self)
    }
}

impl Value {
    /// Canonical compact rendering.
    pub fn serialize(&self) -> String {
        self.to_string()
    }
}

pub(crate) fn write_value<W: Write>(out: &mut W, value: &Value) -> fmt::Result {
    match value {
        Value::Null => out.write_str("null"),
        Value::Bool(true) => out.write_str("true"),
        Value::Bool(false) => out.write_str("false"),
        Value::Number(n) => write_number(out, *n),
        Value::String(s) => write_escaped(out, s),
        Value::Array(items) => {
            out.write_char('[')?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.write_char(',')?;
                }
                write_value(out, item)?;
            }
            out.write_char(']')
        }
        Value::Object(map) => {
            out.write_char('{')?;
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.write_char(',')?;
                }
                write_escaped(out, key)?;
                out.write_char(':')?;
                write_value(out, item)?;
            }
            out.write_char('}')
        }
    }
}

pub(crate) fn write_number<W: Write>(out: &mut W, number: Number) -> fmt::Result {
    match number {
        Number::Int(i) => out.write_str(itoa::Buffer::new().format(i)),
        Number::Float(f) if f.is_finite() => write!(out, "{f}"),
        // NaN and infinities have no JSON literal; they only arise from
        // programmatic construction.
        Number::Float(_) => out.write_str("null"),
    }
}

pub(crate) fn write_escaped<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '/' => out.write_str("\\/")?,
            '\u{8}' => out.write_str("\\b")?,
            '\u{c}' => out.write_str("\\f")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}
