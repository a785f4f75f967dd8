//! Extraction of the actual arguments written inside a call.
//!
//! Bracket and comma counting only looks at bytes the lexer classified as
//! code, so a `)` or `,` inside a string or comment never ends an argument.

use avsp_lexer::reserved_words;
use avsp_lexer::Document;
use avsp_lexer::Token;
use avsp_signatures::is_identifier;
use avsp_signatures::ArgType;
use avsp_signatures::FilterCategory;
use avsp_signatures::Registry;
use avsp_source::Span;
use serde::Serialize;

/// Literal type of an argument as written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ActualType {
    Int,
    Float,
    Bool,
    String,
    Hex,
    Clip,
    /// An identifier or expression whose type is not known.
    Var,
    Named,
    Empty,
}

impl From<ArgType> for ActualType {
    fn from(arg_type: ArgType) -> Self {
        match arg_type {
            ArgType::Clip => Self::Clip,
            ArgType::Int => Self::Int,
            ArgType::Float => Self::Float,
            ArgType::Bool => Self::Bool,
            ArgType::String => Self::String,
            ArgType::Unknown => Self::Var,
        }
    }
}

/// Resolves script variables to a type, e.g. from a running evaluation.
pub trait TypeOracle {
    fn resolve_variable_type(&self, name: &str) -> Option<ArgType>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActualArg {
    /// Value text with comments and continuation markers removed.
    pub text: String,
    pub name: Option<String>,
    pub inferred_type: ActualType,
    /// Source span of the whole argument, name included.
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScannedCall {
    pub name: String,
    pub name_span: Span,
    pub open_paren: usize,
    /// `None` while the call is still being typed.
    pub close_paren: Option<usize>,
    /// Written as `clip.Name(...)`, so the clip receiver is implicit.
    pub is_chained: bool,
    pub args: Vec<ActualArg>,
    /// Argument the cursor is in, when a cursor was given and lies inside
    /// the parentheses. Equals `args.len()` on a new trailing argument.
    pub active_index: Option<usize>,
}

pub struct ArgumentScanner<'a> {
    document: &'a Document,
    registry: &'a Registry,
    oracle: Option<&'a dyn TypeOracle>,
}

impl<'a> ArgumentScanner<'a> {
    #[must_use]
    pub fn new(document: &'a Document, registry: &'a Registry) -> Self {
        Self {
            document,
            registry,
            oracle: None,
        }
    }

    #[must_use]
    pub fn with_oracle(mut self, oracle: &'a dyn TypeOracle) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// The innermost call whose parentheses enclose `cursor`.
    ///
    /// Grouping parentheses and keyword parentheses such as `if (` are
    /// skipped in favor of the call around them.
    #[must_use]
    pub fn call_at(&self, cursor: usize) -> Option<ScannedCall> {
        let cursor = cursor.min(self.document.text().len());
        let start = self.statement_start(cursor);
        let tokens: Vec<&Token> = self.document.tokens_in_range(start, cursor).collect();

        let mut depth = 0u32;
        for token in tokens.iter().rev().filter(|token| token.category.is_code()) {
            let lexeme = token.lexeme(self.document.text());
            for (idx, ch) in lexeme.char_indices().rev() {
                let offset = token.start() + idx;
                if offset >= cursor {
                    continue;
                }
                match ch {
                    ')' => depth += 1,
                    '(' if depth > 0 => depth -= 1,
                    '(' => {
                        if let Some(name_start) = self.call_name_before(offset) {
                            return self.scan_call(name_start, Some(cursor));
                        }
                    }
                    _ => {}
                }
            }
        }
        None
    }

    /// Scan the call whose name starts at `name_start`. Returns `None` if no
    /// identifier followed by `(` starts there.
    #[must_use]
    pub fn scan_call(&self, name_start: usize, cursor: Option<usize>) -> Option<ScannedCall> {
        let text = self.document.text();
        let bytes = text.as_bytes();
        if !text.is_char_boundary(name_start) {
            return None;
        }

        let mut name_end = name_start;
        while name_end < bytes.len() && is_word_byte(bytes[name_end]) {
            name_end += 1;
        }
        let name = &text[name_start..name_end];
        if !is_identifier(name) {
            return None;
        }

        let mut open_paren = name_end;
        while open_paren < bytes.len() && matches!(bytes[open_paren], b' ' | b'\t') {
            open_paren += 1;
        }
        if bytes.get(open_paren) != Some(&b'(')
            || !self.document.category_at(open_paren).is_code()
        {
            return None;
        }

        let end = self.statement_end(open_paren);
        let mut collector = ArgCollector::new(text, open_paren + 1, cursor);
        for token in self.document.tokens_in_range(open_paren + 1, end) {
            if collector.feed(token) {
                break;
            }
        }
        let close_paren = collector.close;
        let (pieces, commas_before_cursor) = collector.finish();

        let args: Vec<ActualArg> = pieces
            .into_iter()
            .map(|piece| self.actual_arg(piece))
            .collect();

        let active_index = cursor
            .filter(|&cursor| cursor > open_paren && close_paren.is_none_or(|close| cursor <= close))
            .map(|_| commas_before_cursor);

        let call = ScannedCall {
            name: name.to_string(),
            name_span: Span::from_bounds(name_start, name_end),
            open_paren,
            close_paren,
            is_chained: self.previous_code_byte(name_start) == Some(b'.'),
            args,
            active_index,
        };
        tracing::trace!(name = %call.name, args = call.args.len(), active = ?call.active_index, "scanned call");
        Some(call)
    }

    fn actual_arg(&self, piece: RawPiece) -> ActualArg {
        let text = piece.value.trim().to_string();
        let inferred_type = classify_value(&text, self.registry, self.oracle);
        let span = match piece.first {
            Some(first) => Span::from_bounds(first, piece.last.max(first)),
            None => Span::from_bounds(piece.start, piece.start),
        };
        ActualArg {
            text,
            name: piece.name,
            inferred_type,
            span,
        }
    }

    fn call_name_before(&self, open_paren: usize) -> Option<usize> {
        let bytes = self.document.text().as_bytes();
        let mut end = open_paren;
        while end > 0 && matches!(bytes[end - 1], b' ' | b'\t') {
            end -= 1;
        }
        let mut start = end;
        while start > 0 && is_word_byte(bytes[start - 1]) {
            start -= 1;
        }

        let word = &self.document.text()[start..end];
        let is_call = is_identifier(word)
            && self.document.category_at(start).is_code()
            && !reserved_words().any(|reserved| reserved.eq_ignore_ascii_case(word));
        is_call.then_some(start)
    }

    fn previous_code_byte(&self, offset: usize) -> Option<u8> {
        self.document.text().as_bytes()[..offset]
            .iter()
            .rev()
            .copied()
            .find(|b| !matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'\\'))
    }

    fn statement_start(&self, offset: usize) -> usize {
        let index = self.document.line_index();
        let mut line = index.line_of(offset);
        while line > 0 && self.continues(line - 1) {
            line -= 1;
        }
        index.line_start(line).unwrap_or(0)
    }

    fn statement_end(&self, offset: usize) -> usize {
        let index = self.document.line_index();
        let mut line = index.line_of(offset);
        while line + 1 < index.line_count() && self.continues(line) {
            line += 1;
        }
        index
            .line_range(line)
            .map_or(self.document.text().len(), |range| range.end)
    }

    /// Whether `line` continues onto the next one: it ends with `\`, or the
    /// next line starts with `\`.
    fn continues(&self, line: usize) -> bool {
        let lines = self.document.lines();
        let text = self.document.text();
        let significant = |token: &&Token| {
            !token.category.is_comment() && !token.lexeme(text).trim().is_empty()
        };

        let ends_with_marker = lines.get(line).is_some_and(|lexed| {
            lexed
                .tokens
                .iter()
                .rev()
                .find(significant)
                .is_some_and(|token| {
                    token.category.is_code() && token.lexeme(text).trim_end().ends_with('\\')
                })
        });
        let next_starts_with_marker = lines.get(line + 1).is_some_and(|lexed| {
            lexed.tokens.iter().find(significant).is_some_and(|token| {
                token.category.is_code() && token.lexeme(text).trim_start().starts_with('\\')
            })
        });

        ends_with_marker || next_starts_with_marker
    }
}

/// Literal type of an argument value, checked in a fixed order.
#[must_use]
pub fn classify_value(
    text: &str,
    registry: &Registry,
    oracle: Option<&dyn TypeOracle>,
) -> ActualType {
    let text = text.trim();
    if text.is_empty() {
        ActualType::Empty
    } else if is_integer(text) {
        ActualType::Int
    } else if is_float(text) {
        ActualType::Float
    } else if text.starts_with('$') {
        ActualType::Hex
    } else if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false") {
        ActualType::Bool
    } else if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        ActualType::String
    } else if text.contains('=') {
        ActualType::Named
    } else if text.eq_ignore_ascii_case("last") {
        ActualType::Clip
    } else if let Some(property_type) = property_type(text, registry) {
        property_type
    } else {
        oracle
            .and_then(|oracle| oracle.resolve_variable_type(text))
            .map_or(ActualType::Var, ActualType::from)
    }
}

fn is_integer(text: &str) -> bool {
    let digits = text.strip_prefix(|ch: char| ch == '-' || ch == '+').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_float(text: &str) -> bool {
    text.bytes().any(|b| b.is_ascii_digit())
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
        && text.parse::<f64>().is_ok()
}

/// Declared type of a trailing `.Property` access such as `src.Width`.
fn property_type(text: &str, registry: &Registry) -> Option<ActualType> {
    let (_, property) = text.rsplit_once('.')?;
    let property = property.trim();
    if !is_identifier(property) {
        return None;
    }
    let entry = registry
        .lookup(property)
        .filter(|entry| entry.category == FilterCategory::ClipProperty)?;
    ArgType::from_keyword(entry.signature.trim()).map(ActualType::from)
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

#[derive(Debug, Default)]
struct RawPiece {
    start: usize,
    first: Option<usize>,
    last: usize,
    value: String,
    name: Option<String>,
}

impl RawPiece {
    fn starting_at(start: usize) -> Self {
        Self {
            start,
            ..Self::default()
        }
    }

    fn push(&mut self, ch: char, offset: usize) {
        if !ch.is_whitespace() {
            self.first.get_or_insert(offset);
            self.last = offset + ch.len_utf8();
        }
        self.value.push(ch);
    }

    fn push_literal(&mut self, lexeme: &str, start: usize) {
        let trimmed = lexeme.trim_end();
        if !trimmed.is_empty() {
            self.first.get_or_insert(start);
            self.last = start + trimmed.len();
        }
        self.value.push_str(lexeme);
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.value.trim().is_empty()
    }
}

/// Splits the inside of a call into argument pieces, one token at a time.
struct ArgCollector<'t> {
    text: &'t str,
    cursor: Option<usize>,
    depth: u32,
    pieces: Vec<RawPiece>,
    current: RawPiece,
    commas_before_cursor: usize,
    close: Option<usize>,
}

impl<'t> ArgCollector<'t> {
    fn new(text: &'t str, start: usize, cursor: Option<usize>) -> Self {
        Self {
            text,
            cursor,
            depth: 0,
            pieces: Vec::new(),
            current: RawPiece::starting_at(start),
            commas_before_cursor: 0,
            close: None,
        }
    }

    /// Returns `true` once the closing parenthesis has been seen.
    fn feed(&mut self, token: &Token) -> bool {
        let lexeme = token.lexeme(self.text);
        if token.category.is_comment() {
            return false;
        }
        if !token.category.is_code() {
            self.current.push_literal(lexeme, token.start());
            return false;
        }

        for (idx, ch) in lexeme.char_indices() {
            let offset = token.start() + idx;
            match ch {
                '(' => {
                    self.depth += 1;
                    self.current.push(ch, offset);
                }
                ')' if self.depth == 0 => {
                    self.close = Some(offset);
                    return true;
                }
                ')' => {
                    self.depth -= 1;
                    self.current.push(ch, offset);
                }
                ',' if self.depth == 0 => {
                    if self.cursor.is_some_and(|cursor| offset < cursor) {
                        self.commas_before_cursor += 1;
                    }
                    let next = RawPiece::starting_at(offset + 1);
                    self.pieces.push(std::mem::replace(&mut self.current, next));
                }
                '=' if self.depth == 0 && self.current.name.is_none() && self.is_binding(offset) => {
                    let name = self.current.value.trim();
                    if is_identifier(name) {
                        self.current.name = Some(name.to_string());
                        self.current.value.clear();
                    } else {
                        self.current.push(ch, offset);
                    }
                }
                // Line continuation marker.
                '\\' => {}
                '\r' | '\n' => self.current.push(' ', offset),
                _ => self.current.push(ch, offset),
            }
        }
        false
    }

    /// `=` that binds a name, as opposed to part of `==`, `!=`, `<=` or `>=`.
    fn is_binding(&self, offset: usize) -> bool {
        let bytes = self.text.as_bytes();
        let next = bytes.get(offset + 1).copied();
        let previous = offset.checked_sub(1).map(|idx| bytes[idx]);
        next != Some(b'=') && !matches!(previous, Some(b'=' | b'!' | b'<' | b'>'))
    }

    fn finish(mut self) -> (Vec<RawPiece>, usize) {
        self.pieces.push(self.current);
        if self.pieces.last().is_some_and(RawPiece::is_empty) {
            self.pieces.pop();
        }
        (self.pieces, self.commas_before_cursor)
    }
}

#[cfg(test)]
mod tests {
    use avsp_lexer::Lexer;
    use avsp_lexer::LexerOptions;
    use avsp_signatures::BuiltinLoader;

    use super::*;

    fn registry() -> Registry {
        Registry::from_loaders(&[&BuiltinLoader]).unwrap()
    }

    fn document(registry: &Registry, text: &str) -> Document {
        Document::new(&Lexer::new(registry, LexerOptions::default()), text)
    }

    /// Scan the call around the `|` marker, which is removed from the text.
    fn call_at_marker(text: &str) -> Option<ScannedCall> {
        let cursor = text.find('|').unwrap();
        let text = text.replacen('|', "", 1);
        let registry = registry();
        let document = document(&registry, &text);
        ArgumentScanner::new(&document, &registry).call_at(cursor)
    }

    fn texts(call: &ScannedCall) -> Vec<&str> {
        call.args.iter().map(|arg| arg.text.as_str()).collect()
    }

    mod classify {
        use super::*;

        fn classify(text: &str) -> ActualType {
            classify_value(text, &registry(), None)
        }

        #[test]
        fn literal_types() {
            assert_eq!(classify(""), ActualType::Empty);
            assert_eq!(classify("  "), ActualType::Empty);
            assert_eq!(classify("42"), ActualType::Int);
            assert_eq!(classify("-3"), ActualType::Int);
            assert_eq!(classify("1.5"), ActualType::Float);
            assert_eq!(classify(".5"), ActualType::Float);
            assert_eq!(classify("$FF00FF"), ActualType::Hex);
            assert_eq!(classify("TRUE"), ActualType::Bool);
            assert_eq!(classify("false"), ActualType::Bool);
            assert_eq!(classify("\"fast\""), ActualType::String);
            assert_eq!(classify("a=b"), ActualType::Named);
            assert_eq!(classify("Last"), ActualType::Clip);
            assert_eq!(classify("src"), ActualType::Var);
            assert_eq!(classify("Blur(src, 1)"), ActualType::Var);
        }

        #[test]
        fn words_that_parse_as_floats_are_variables() {
            assert_eq!(classify("inf"), ActualType::Var);
            assert_eq!(classify("NaN"), ActualType::Var);
        }

        #[test]
        fn clip_property_access_uses_declared_type() {
            assert_eq!(classify("src.Width"), ActualType::Int);
            assert_eq!(classify("src.FrameRate"), ActualType::Float);
            assert_eq!(classify("last.HasAudio"), ActualType::Bool);
            assert_eq!(classify("src.Unknown"), ActualType::Var);
        }

        #[test]
        fn oracle_resolves_variables() {
            struct Fixed;
            impl TypeOracle for Fixed {
                fn resolve_variable_type(&self, name: &str) -> Option<ArgType> {
                    (name == "src").then_some(ArgType::Clip)
                }
            }
            let registry = registry();
            assert_eq!(
                classify_value("src", &registry, Some(&Fixed)),
                ActualType::Clip
            );
            assert_eq!(
                classify_value("other", &registry, Some(&Fixed)),
                ActualType::Var
            );
        }
    }

    mod calls {
        use super::*;

        #[test]
        fn positional_and_named_arguments() {
            let call = call_at_marker("Blur(src, 1.5, amount_v=|2)").unwrap();
            assert_eq!(call.name, "Blur");
            assert_eq!(texts(&call), vec!["src", "1.5", "2"]);
            assert_eq!(call.args[2].name.as_deref(), Some("amount_v"));
            assert_eq!(call.args[2].inferred_type, ActualType::Int);
            assert_eq!(call.active_index, Some(2));
            assert!(!call.is_chained);
        }

        #[test]
        fn strings_and_comments_do_not_split() {
            let call =
                call_at_marker("Subtitle(\"a, (b)\" /* ), */, |x=\"=\")").unwrap();
            assert_eq!(texts(&call), vec!["\"a, (b)\"", "\"=\""]);
            assert_eq!(call.args[0].inferred_type, ActualType::String);
            assert_eq!(call.args[1].name.as_deref(), Some("x"));
            assert_eq!(call.active_index, Some(1));
        }

        #[test]
        fn nested_calls_are_one_argument() {
            let text = "Overlay(Blur(a, 1), b, |mode=\"add\")";
            let call = call_at_marker(text).unwrap();
            assert_eq!(call.name, "Overlay");
            assert_eq!(texts(&call), vec!["Blur(a, 1)", "b", "\"add\""]);
        }

        #[test]
        fn innermost_call_wins() {
            let call = call_at_marker("Overlay(Blur(a, |1), b)").unwrap();
            assert_eq!(call.name, "Blur");
            assert_eq!(call.active_index, Some(1));
        }

        #[test]
        fn grouping_and_keyword_parentheses_are_skipped() {
            let call = call_at_marker("Blur((1 + |2) * 3)").unwrap();
            assert_eq!(call.name, "Blur");
            assert_eq!(texts(&call), vec!["(1 + 2) * 3"]);

            assert!(call_at_marker("x = (1, |2)").is_none());
        }

        #[test]
        fn trailing_empty_slot_is_the_active_index() {
            let call = call_at_marker("Blur(src, |").unwrap();
            assert_eq!(texts(&call), vec!["src"]);
            assert_eq!(call.active_index, Some(1));
            assert_eq!(call.close_paren, None);

            let call = call_at_marker("Blur(|)").unwrap();
            assert!(call.args.is_empty());
            assert_eq!(call.active_index, Some(0));
        }

        #[test]
        fn inner_empty_slots_are_kept() {
            let call = call_at_marker("Crop(|a, , 4)").unwrap();
            let types: Vec<ActualType> = call.args.iter().map(|arg| arg.inferred_type).collect();
            assert_eq!(
                types,
                vec![ActualType::Var, ActualType::Empty, ActualType::Int]
            );
        }

        #[test]
        fn comparisons_are_not_names() {
            let call = call_at_marker("Blur(|a == b, c <= d)").unwrap();
            assert!(call.args.iter().all(|arg| arg.name.is_none()));
            assert_eq!(texts(&call), vec!["a == b", "c <= d"]);
        }

        #[test]
        fn chained_calls() {
            let call = call_at_marker("src.Blur(|1.0)").unwrap();
            assert!(call.is_chained);
            assert_eq!(call.name_span, Span::from_bounds(4, 8));
        }

        #[test]
        fn continuation_lines() {
            let text = "Blur(src,\n\\   1.5, # strength\n\\   amount_v=|2)\nnext(3)";
            let call = call_at_marker(text).unwrap();
            assert_eq!(call.name, "Blur");
            assert_eq!(texts(&call), vec!["src", "1.5", "2"]);
            assert_eq!(call.args[2].name.as_deref(), Some("amount_v"));
            assert_eq!(call.active_index, Some(2));

            let text = "Blur(src, \\\n  1.5|)";
            let call = call_at_marker(text).unwrap();
            assert_eq!(texts(&call), vec!["src", "1.5"]);
        }

        #[test]
        fn unterminated_call_stops_at_statement_end() {
            let call = call_at_marker("Blur(src, |\nCrop(1, 2, 3, 4)").unwrap();
            assert_eq!(call.name, "Blur");
            assert_eq!(texts(&call), vec!["src"]);
        }

        #[test]
        fn cursor_outside_any_call() {
            assert!(call_at_marker("Blur(src)|").is_none());
            assert!(call_at_marker("|Blur(src)").is_none());
            assert!(call_at_marker("x = \"Blur(|\"").is_none());
        }

        #[test]
        fn argument_spans_include_names() {
            let text = "Blur(src,  amount_v = 2 )";
            let registry = registry();
            let document = document(&registry, text);
            let call = ArgumentScanner::new(&document, &registry)
                .scan_call(0, None)
                .unwrap();
            assert_eq!(&text[call.args[1].span.range()], "amount_v = 2");
            assert_eq!(call.close_paren, Some(text.len() - 1));
            assert_eq!(call.active_index, None);
        }

        #[test]
        fn scan_call_requires_a_call() {
            let registry = registry();
            let document = document(&registry, "x = 1");
            let scanner = ArgumentScanner::new(&document, &registry);
            assert!(scanner.scan_call(0, None).is_none());
            assert!(scanner.scan_call(99, None).is_none());
        }
    }
}
