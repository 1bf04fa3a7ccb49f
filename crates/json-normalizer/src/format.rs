//! Whitespace layout of encoded JSON.
//!
//! Normalization only reorders keys. To write a result back without reformatting the whole file,
//! detect the [`Format`] of the original text and print the normalized value with it.
use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

use crate::{Json, JsonValue};

static INDENTED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mR)^( +|\t+)").expect("Valid regex"));

/// Whitespace used for one level of nesting. Consists of spaces only or tabs only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indent(String);

impl Indent {
    #[must_use]
    pub fn spaces(size: usize) -> Indent {
        Indent(" ".repeat(size))
    }
    #[must_use]
    pub fn tabs(size: usize) -> Indent {
        Indent("\t".repeat(size))
    }
    /// Indentation of the first indented line of `encoded`, if any.
    #[must_use]
    pub fn detect(encoded: &str) -> Option<Indent> {
        INDENTED_LINE
            .captures(encoded)
            .map(|captures| Indent(captures[1].to_string()))
    }
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Indent {
    fn default() -> Self {
        Indent::spaces(4)
    }
}

/// Line terminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NewLine {
    #[default]
    Lf,
    CrLf,
    Cr,
}

impl NewLine {
    /// The first line terminator appearing in `encoded`, if any.
    #[must_use]
    pub fn detect(encoded: &str) -> Option<NewLine> {
        let position = encoded.find(['\r', '\n'])?;
        Some(match &encoded.as_bytes()[position..] {
            [b'\r', b'\n', ..] => NewLine::CrLf,
            [b'\r', ..] => NewLine::Cr,
            _ => NewLine::Lf,
        })
    }
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NewLine::Lf => "\n",
            NewLine::CrLf => "\r\n",
            NewLine::Cr => "\r",
        }
    }
}

/// How a JSON document is laid out: indentation, line terminator and a trailing line terminator.
///
/// The default is four spaces, `\n` and a final new line.
///
/// ```rust
/// use json_normalizer::{Json, NewLine};
///
/// let json = Json::from_encoded("{\r\n  \"b\": 1,\r\n  \"a\": 2\r\n}").expect("Valid JSON");
/// let format = json.format();
/// assert_eq!(format.indent().as_str(), "  ");
/// assert_eq!(format.new_line(), NewLine::CrLf);
/// assert!(!format.has_final_new_line());
/// assert_eq!(format.print(json.decoded()).to_string(), json.encoded());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    indent: Indent,
    new_line: NewLine,
    final_new_line: bool,
}

impl Default for Format {
    fn default() -> Self {
        Format {
            indent: Indent::default(),
            new_line: NewLine::default(),
            final_new_line: true,
        }
    }
}

impl Format {
    #[must_use]
    pub fn new(indent: Indent, new_line: NewLine, final_new_line: bool) -> Format {
        Format {
            indent,
            new_line,
            final_new_line,
        }
    }
    /// Detect the layout of `encoded`.
    ///
    /// Text without indented lines or line terminators gets the default indentation and `\n`.
    #[must_use]
    pub fn detect(encoded: &str) -> Format {
        Format {
            indent: Indent::detect(encoded).unwrap_or_default(),
            new_line: NewLine::detect(encoded).unwrap_or_default(),
            final_new_line: encoded.ends_with(['\n', '\r']),
        }
    }
    #[must_use]
    pub fn from_json(json: &Json) -> Format {
        Format::detect(json.encoded())
    }
    #[must_use]
    pub fn indent(&self) -> &Indent {
        &self.indent
    }
    #[must_use]
    pub fn new_line(&self) -> NewLine {
        self.new_line
    }
    #[must_use]
    pub fn has_final_new_line(&self) -> bool {
        self.final_new_line
    }
    #[must_use]
    pub fn with_indent(mut self, indent: Indent) -> Format {
        self.indent = indent;
        self
    }
    #[must_use]
    pub fn with_new_line(mut self, new_line: NewLine) -> Format {
        self.new_line = new_line;
        self
    }
    #[must_use]
    pub fn with_final_new_line(mut self, final_new_line: bool) -> Format {
        self.final_new_line = final_new_line;
        self
    }
    /// Pretty-print `value` in this format.
    #[must_use]
    pub fn print<'a>(&'a self, value: &'a JsonValue) -> Printed<'a> {
        Printed {
            format: self,
            value,
        }
    }
}

/// A value printed in a [`Format`], see [`Format::print`].
#[derive(Debug)]
pub struct Printed<'a> {
    format: &'a Format,
    value: &'a JsonValue,
}

impl fmt::Display for Printed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatter =
            serde_json::ser::PrettyFormatter::with_indent(self.format.indent.as_str().as_bytes());
        let mut output = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut output, formatter);
        self.value
            .serialize(&mut serializer)
            .map_err(|_| fmt::Error)?;
        let printed = std::str::from_utf8(&output).map_err(|_| fmt::Error)?;
        // Strings escape their line terminators, so every `\n` here is layout
        match self.format.new_line {
            NewLine::Lf => f.write_str(printed)?,
            new_line => f.write_str(&printed.replace('\n', new_line.as_str()))?,
        }
        if self.format.final_new_line {
            f.write_str(self.format.new_line.as_str())?;
        }
        Ok(())
    }
}
