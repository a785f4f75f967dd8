//! Parser for the filter signature notation.
//!
//! A signature lists a filter's parameters:
//!
//! ```text
//! (clip, int x, float "y"=1.5, [string s], clip clip2 [, ...])
//! ```
//!
//! - the outer parentheses are optional
//! - a term is `TYPE NAME` or `TYPE NAME=EXTRA`, or a bare type keyword
//! - a quoted name (`"y"`) marks an argument that may be passed by name
//! - a term wrapped in `[...]` is optional
//! - the marker `[, ...]` makes its term repeat zero or more times
//! - anything else becomes a clip slot named after the whole term
//!
//! Parsing never fails. Malformed text degrades to whatever slots can be
//! recovered.

use std::fmt;

use serde::Serialize;

use crate::split::find_top_level;
use crate::split::split_top_level_commas;

const VARIADIC_MARKER: &str = "...";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ArgType {
    Clip,
    Int,
    Float,
    Bool,
    String,
    Unknown,
}

impl ArgType {
    /// Recognize a type keyword. `val` is the untyped keyword.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "clip" => Some(Self::Clip),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "bool" => Some(Self::Bool),
            "string" => Some(Self::String),
            "val" => Some(Self::Unknown),
            _ => None,
        }
    }

    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Clip => "clip",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Unknown => "val",
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One parameter slot of a parsed signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArgSpec {
    /// The term as written, trimmed.
    pub raw_text: String,
    pub arg_type: ArgType,
    /// Parameter name without quotes. Empty for a bare type keyword.
    pub name: String,
    pub is_variadic: bool,
    pub is_optional: bool,
    /// The name was quoted, so the argument may be passed as `name=value`.
    pub is_named: bool,
    /// The term started with a type keyword rather than being an implicit clip.
    pub has_type_keyword: bool,
    /// Everything after `=`: the default value and any annotation.
    pub extra: String,
}

impl ArgSpec {
    /// The declared default, with any trailing parenthesised annotation
    /// such as a range or choice list removed.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        let extra = self.extra.trim();
        let value = match find_top_level(extra, ' ') {
            Some(idx) if extra[idx..].trim_start().starts_with('(') => extra[..idx].trim(),
            _ if extra.starts_with('(') => "",
            _ => extra,
        };
        (!value.is_empty()).then_some(value)
    }

    /// Whether this slot is a clip that a chained call can supply implicitly.
    #[must_use]
    pub fn is_receiver_candidate(&self) -> bool {
        self.arg_type == ArgType::Clip && !self.is_named
    }

    /// Render the slot the way calltips show it, e.g. `float "y"` or `clip1`.
    #[must_use]
    pub fn display(&self) -> String {
        let name = if self.is_named {
            format!("\"{}\"", self.name)
        } else {
            self.name.clone()
        };
        match (self.has_type_keyword, name.is_empty()) {
            (true, true) => self.arg_type.keyword().to_string(),
            (true, false) => format!("{} {name}", self.arg_type.keyword()),
            (false, _) => name,
        }
    }
}

/// Parse a raw signature string into its ordered argument slots.
#[must_use]
pub fn parse_signature(signature: &str) -> Vec<ArgSpec> {
    let body = strip_outer_parens(signature.trim());
    let mut specs = Vec::new();
    for term in split_top_level_commas(body) {
        parse_term(term, false, &mut specs);
    }
    specs
}

fn strip_outer_parens(text: &str) -> &str {
    let Some(inner) = text.strip_prefix('(') else {
        return text.strip_suffix(')').unwrap_or(text);
    };

    let mut closing = None;
    let mut depth = 1usize;
    let mut in_quote = false;
    for (idx, ch) in inner.char_indices() {
        match ch {
            '"' => in_quote = !in_quote,
            _ if in_quote => {}
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    closing = Some(idx);
                    break;
                }
            }
            _ => {}
        }
    }

    match closing {
        Some(idx) if inner[idx + 1..].trim().is_empty() => &inner[..idx],
        // `(a) (b)` or an unclosed paren: keep going with what is there.
        _ => inner.strip_suffix(')').unwrap_or(inner),
    }
}

fn parse_term(term: &str, inherited_optional: bool, specs: &mut Vec<ArgSpec>) {
    let raw_text = term.trim();
    if raw_text.is_empty() {
        return;
    }

    let (text, is_variadic) = strip_variadic_marker(raw_text);
    let mut text = text.trim();
    let mut is_optional = inherited_optional;

    if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        is_optional = true;
        let inner_terms = split_top_level_commas(inner);
        if inner_terms.len() > 1 {
            for inner_term in inner_terms {
                parse_term(inner_term, true, specs);
            }
            return;
        }
        text = inner.trim();
    }

    let mut spec = parse_typed_term(text);
    spec.raw_text = raw_text.to_string();
    spec.is_variadic = is_variadic;
    spec.is_optional = is_optional;
    specs.push(spec);
}

/// Remove a `[, ...]` marker (whitespace inside is tolerated).
fn strip_variadic_marker(text: &str) -> (String, bool) {
    let mut search_from = 0;
    while let Some(rel) = text[search_from..].find('[') {
        let open = search_from + rel;
        let rest = text[open + 1..].trim_start();
        if let Some(after_comma) = rest.strip_prefix(',') {
            let after_comma = after_comma.trim_start();
            if let Some(after_dots) = after_comma.strip_prefix(VARIADIC_MARKER) {
                if let Some(tail) = after_dots.trim_start().strip_prefix(']') {
                    let mut stripped = text[..open].trim_end().to_string();
                    if !tail.trim().is_empty() {
                        stripped.push(' ');
                        stripped.push_str(tail.trim());
                    }
                    return (stripped, true);
                }
            }
        }
        search_from = open + 1;
    }
    (text.to_string(), false)
}

fn parse_typed_term(text: &str) -> ArgSpec {
    let (first, rest) = match text.find(char::is_whitespace) {
        Some(idx) => (&text[..idx], text[idx..].trim()),
        None => (text, ""),
    };

    let Some(arg_type) = ArgType::from_keyword(first) else {
        let (name, is_named) = unquote(text);
        return ArgSpec {
            raw_text: String::new(),
            arg_type: ArgType::Clip,
            name: name.to_string(),
            is_variadic: false,
            is_optional: false,
            is_named,
            has_type_keyword: false,
            extra: String::new(),
        };
    };

    let (name_part, mut extra) = match find_top_level(rest, '=') {
        Some(idx) => (rest[..idx].trim(), rest[idx + 1..].trim().to_string()),
        None => (rest, String::new()),
    };

    // `int "x" (0 to 10)`: anything after the name is annotation.
    let (name_token, leftover) = match name_part.find(char::is_whitespace) {
        Some(idx) => (&name_part[..idx], name_part[idx..].trim()),
        None => (name_part, ""),
    };
    if !leftover.is_empty() {
        extra = if extra.is_empty() {
            leftover.to_string()
        } else {
            format!("{leftover} {extra}")
        };
    }

    let (name, is_named) = unquote(name_token);
    ArgSpec {
        raw_text: String::new(),
        arg_type,
        name: name.to_string(),
        is_variadic: false,
        is_optional: false,
        is_named,
        has_type_keyword: true,
        extra,
    }
}

fn unquote(text: &str) -> (&str, bool) {
    match text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        Some(inner) => (inner, true),
        None => (text, false),
    }
}
