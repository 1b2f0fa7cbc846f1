use core::fmt::{self, Write};

use crate::value::{Map, Value};

use super::write_escaped;

/// Options recognized by the pretty printer.
///
/// The defaults produce two-space indentation with one key/value pair or
/// array element per line and a space after commas and colons.
#[derive(Debug, Clone)]
pub struct PrettyConfig {
    indent: String,
    space_within_braces: bool,
    space_within_brackets: bool,
    space_before_comma: bool,
    space_after_comma: bool,
    space_before_colon: bool,
    space_after_colon: bool,
    array_contents_on_same_line: bool,
    object_contents_on_same_line: bool,
}

impl Default for PrettyConfig {
    fn default() -> Self {
        Self {
            indent: "  ".to_owned(),
            space_within_braces: false,
            space_within_brackets: false,
            space_before_comma: false,
            space_after_comma: true,
            space_before_colon: false,
            space_after_colon: true,
            array_contents_on_same_line: false,
            object_contents_on_same_line: false,
        }
    }
}

impl PrettyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// The string repeated once per nesting level.
    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Pad `{`/`}` with an inner space when object contents share a line.
    pub fn space_within_braces(mut self, yes: bool) -> Self {
        self.space_within_braces = yes;
        self
    }

    /// Pad `[`/`]` with an inner space when array contents share a line.
    pub fn space_within_brackets(mut self, yes: bool) -> Self {
        self.space_within_brackets = yes;
        self
    }

    pub fn space_before_comma(mut self, yes: bool) -> Self {
        self.space_before_comma = yes;
        self
    }

    pub fn space_after_comma(mut self, yes: bool) -> Self {
        self.space_after_comma = yes;
        self
    }

    pub fn space_before_colon(mut self, yes: bool) -> Self {
        self.space_before_colon = yes;
        self
    }

    pub fn space_after_colon(mut self, yes: bool) -> Self {
        self.space_after_colon = yes;
        self
    }

    /// Collapse array elements onto the line of their brackets.
    pub fn array_contents_on_same_line(mut self, yes: bool) -> Self {
        self.array_contents_on_same_line = yes;
        self
    }

    /// Collapse object members onto the line of their braces.
    pub fn object_contents_on_same_line(mut self, yes: bool) -> Self {
        self.object_contents_on_same_line = yes;
        self
    }
}

/// Walks a value tree and writes the configured pretty form.
///
/// Holds an explicit indent-level counter, incremented entering a container
/// and decremented leaving it; the tree itself is never mutated.
pub struct PrettyPrinter<'a, W> {
    config: &'a PrettyConfig,
    out: W,
    indent_level: usize,
}

impl<'a, W: Write> PrettyPrinter<'a, W> {
    pub fn new(config: &'a PrettyConfig, out: W) -> Self {
        Self {
            config,
            out,
            indent_level: 0,
        }
    }

    pub fn write(&mut self, value: &Value) -> fmt::Result {
        match value {
            Value::Array(items) if !items.is_empty() => self.write_array(items),
            Value::Object(map) if !map.is_empty() => self.write_object(map),
            // Empty containers and scalars keep their compact form.
            other => super::write_value(&mut self.out, other),
        }
    }

    fn write_array(&mut self, items: &[Value]) -> fmt::Result {
        let same_line = self.config.array_contents_on_same_line;
        self.out.write_char('[')?;
        self.open(same_line, self.config.space_within_brackets)?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.separator(same_line)?;
            }
            self.write(item)?;
        }
        self.close(same_line, self.config.space_within_brackets)?;
        self.out.write_char(']')
    }

    fn write_object(&mut self, map: &Map) -> fmt::Result {
        let same_line = self.config.object_contents_on_same_line;
        self.out.write_char('{')?;
        self.open(same_line, self.config.space_within_braces)?;
        for (i, (key, value)) in map.iter().enumerate() {
            if i > 0 {
                self.separator(same_line)?;
            }
            write_escaped(&mut self.out, key)?;
            if self.config.space_before_colon {
                self.out.write_char(' ')?;
            }
            self.out.write_char(':')?;
            if self.config.space_after_colon {
                self.out.write_char(' ')?;
            }
            self.write(value)?;
        }
        self.close(same_line, self.config.space_within_braces)?;
        self.out.write_char('}')
    }

    fn open(&mut self, same_line: bool, pad: bool) -> fmt::Result {
        if same_line {
            if pad {
                self.out.write_char(' ')?;
            }
            Ok(())
        } else {
            self.indent_level += 1;
            self.newline_and_indent()
        }
    }

    fn close(&mut self, same_line: bool, pad: bool) -> fmt::Result {
        if same_line {
            if pad {
                self.out.write_char(' ')?;
            }
            Ok(())
        } else {
            self.indent_level -= 1;
            self.newline_and_indent()
        }
    }

    fn separator(&mut self, same_line: bool) -> fmt::Result {
        if self.config.space_before_comma {
            self.out.write_char(' ')?;
        }
        self.out.write_char(',')?;
        if same_line {
            if self.config.space_after_comma {
                self.out.write_char(' ')?;
            }
            Ok(())
        } else {
            self.newline_and_indent()
        }
    }

    fn newline_and_indent(&mut self) -> fmt::Result {
        self.out.write_char('\n')?;
        for _ in 0..self.indent_level {
            self.out.write_str(&self.config.indent)?;
        }
        Ok(())
    }
}

impl Value {
    /// Renders the configured human-readable form.
    pub fn to_pretty_string(&self, config: &PrettyConfig) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = PrettyPrinter::new(config, &mut out).write(self);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_str;

    fn parsed(text: &str) -> Value {
        from_str(text).expect("document should parse")
    }

    #[test]
    fn default_config_one_entry_per_line() {
        let value = parsed(r#"{"greeting":"hello","count":3,"items":[1,2]}"#);
        let expected = "{\n  \"greeting\": \"hello\",\n  \"count\": 3,\n  \"items\": [\n    1,\n    2\n  ]\n}";
        assert_eq!(value.to_pretty_string(&PrettyConfig::new()), expected);
    }

    #[test]
    fn same_line_contents_with_padding() {
        let config = PrettyConfig::new()
            .array_contents_on_same_line(true)
            .object_contents_on_same_line(true)
            .space_within_brackets(true)
            .space_within_braces(true);
        let value = parsed(r#"{"a":[1,2],"b":true}"#);
        assert_eq!(
            value.to_pretty_string(&config),
            r#"{ "a": [ 1, 2 ], "b": true }"#
        );
    }

    #[test]
    fn comma_and_colon_spacing_options() {
        let config = PrettyConfig::new()
            .array_contents_on_same_line(true)
            .object_contents_on_same_line(true)
            .space_before_comma(true)
            .space_after_comma(false)
            .space_before_colon(true)
            .space_after_colon(false);
        let value = parsed(r#"{"a":1,"b":[2,3]}"#);
        assert_eq!(value.to_pretty_string(&config), r#"{"a" :1 ,"b" :[2 ,3]}"#);
    }

    #[test]
    fn custom_indent_unit() {
        let config = PrettyConfig::new().indent("\t");
        let value = parsed("[1]");
        assert_eq!(value.to_pretty_string(&config), "[\n\t1\n]");
    }

    #[test]
    fn empty_containers_stay_compact() {
        assert_eq!(parsed("[]").to_pretty_string(&PrettyConfig::new()), "[]");
        assert_eq!(parsed("{}").to_pretty_string(&PrettyConfig::new()), "{}");
        assert_eq!(
            parsed(r#"{"a":{},"b":[]}"#).to_pretty_string(&PrettyConfig::new()),
            "{\n  \"a\": {},\n  \"b\": []\n}"
        );
    }

    #[test]
    fn indent_levels_unwind_after_nested_containers() {
        let value = parsed(r#"[[1],2]"#);
        assert_eq!(
            value.to_pretty_string(&PrettyConfig::new()),
            "[\n  [\n    1\n  ],\n  2\n]"
        );
    }
}
