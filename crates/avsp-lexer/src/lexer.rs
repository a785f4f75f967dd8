use std::ops::Range;

use avsp_conf::HighlightSettings;
use avsp_signatures::Registry;
use avsp_source::LineIndex;
use avsp_source::Span;

use crate::category::SyntaxCategory;
use crate::keywords;
use crate::state::Carry;
use crate::state::FoldState;
use crate::state::LineState;
use crate::tokens::LexedLine;
use crate::tokens::ModuleLoad;
use crate::tokens::Token;

const OPERATORS: &[u8] = b"+-*/%=<>!?:,.&|\\^~;[]@";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LexerOptions {
    /// Color known filter names even when they are not called.
    pub prefer_function_highlighting: bool,
}

impl From<&HighlightSettings> for LexerOptions {
    fn from(settings: &HighlightSettings) -> Self {
        Self {
            prefer_function_highlighting: settings.prefer_function_highlighting,
        }
    }
}

/// Classifies script text line by line.
///
/// The lexer itself holds no per-document state: every line is lexed from
/// its entry [`LineState`], which makes any line start a restart point.
pub struct Lexer<'r> {
    registry: &'r Registry,
    options: LexerOptions,
}

impl<'r> Lexer<'r> {
    #[must_use]
    pub fn new(registry: &'r Registry, options: LexerOptions) -> Self {
        Self { registry, options }
    }

    #[must_use]
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Lex a whole text from the default state.
    #[must_use]
    pub fn lex(&self, text: &str) -> Vec<LexedLine> {
        let index = LineIndex::from_text(text);
        let mut entry = LineState::default();
        (0..index.line_count())
            .map(|line| {
                let range = index.line_range(line).unwrap_or(text.len()..text.len());
                let lexed = self.lex_line(text, range, &entry);
                entry = lexed.exit.clone();
                lexed
            })
            .collect()
    }

    /// Lex the line occupying `line` (terminator included) of `text`,
    /// starting from `entry`.
    #[must_use]
    pub fn lex_line(&self, text: &str, line: Range<usize>, entry: &LineState) -> LexedLine {
        LineScanner::new(self, text, line, entry).run()
    }
}

/// What the scanner is in the middle of. One handler per variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Default,
    LineComment,
    BlockComment { c_style: bool, nesting: u32 },
    Identifier,
    String,
    TripleString,
    Number,
    HexNumber,
    Slider,
    EndOfFile,
}

struct LineScanner<'l, 'r> {
    lexer: &'l Lexer<'r>,
    source: &'l str,
    bytes: &'l [u8],
    line_start: usize,
    content_end: usize,
    line_end: usize,
    start: usize,
    current: usize,
    entry: LineState,
    state: LineState,
    min_fold: u32,
    tokens: Vec<Token>,
    module_loads: Vec<ModuleLoad>,
    eol_category: SyntaxCategory,
    resumed: bool,
    expect_function_name: bool,
    reached_end_marker: bool,
}

impl<'l, 'r> LineScanner<'l, 'r> {
    fn new(lexer: &'l Lexer<'r>, source: &'l str, line: Range<usize>, entry: &LineState) -> Self {
        let line_end = line.end.min(source.len());
        let line_start = line.start.min(line_end);
        let bytes = source.as_bytes();

        let mut content_end = line_end;
        if content_end > line_start && bytes[content_end - 1] == b'\n' {
            content_end -= 1;
            if content_end > line_start && bytes[content_end - 1] == b'\r' {
                content_end -= 1;
            }
        }

        Self {
            lexer,
            source,
            bytes,
            line_start,
            content_end,
            line_end,
            start: line_start,
            current: line_start,
            entry: entry.clone(),
            state: entry.clone(),
            min_fold: entry.fold_depth,
            tokens: Vec::new(),
            module_loads: Vec::new(),
            eol_category: SyntaxCategory::Default,
            resumed: false,
            expect_function_name: false,
            reached_end_marker: false,
        }
    }

    fn run(mut self) -> LexedLine {
        let mut mode = match self.state.carry {
            Carry::None => Mode::Default,
            Carry::BlockComment { c_style, nesting } => Mode::BlockComment { c_style, nesting },
            Carry::TripleString => Mode::TripleString,
            Carry::EndOfFile => Mode::EndOfFile,
        };
        self.resumed = mode != Mode::Default;
        self.state.carry = Carry::None;
        if mode == Mode::Default && !self.entry.continues && !self.starts_with_continuation() {
            self.state.paren_depth = 0;
            self.state.pending_module = None;
        }
        self.state.continues = false;

        while !self.is_at_end() {
            mode = self.step(mode);
        }
        // A construct opened right at the end of the line still owes a token.
        if mode != Mode::Default {
            mode = self.step(mode);
        }
        self.finish(mode);

        self.start = self.content_end;
        self.current = self.line_end;
        self.emit(self.eol_category);

        let fold = self.fold_state();
        tracing::trace!(
            line_start = self.line_start,
            tokens = self.tokens.len(),
            level = fold.level,
            "lexed line"
        );

        LexedLine {
            entry: self.entry,
            exit: self.state,
            tokens: self.tokens,
            fold,
            module_loads: self.module_loads,
        }
    }

    fn step(&mut self, mode: Mode) -> Mode {
        match mode {
            Mode::Default => self.scan_default(),
            Mode::LineComment => self.scan_line_comment(),
            Mode::BlockComment { c_style, nesting } => self.scan_block_comment(c_style, nesting),
            Mode::Identifier => self.scan_identifier(),
            Mode::String => self.scan_string(),
            Mode::TripleString => self.scan_triple_string(),
            Mode::Number => self.scan_number(),
            Mode::HexNumber => self.scan_hex_number(),
            Mode::Slider => self.scan_slider(),
            Mode::EndOfFile => self.scan_end_of_file(),
        }
    }

    fn finish(&mut self, mode: Mode) {
        match mode {
            Mode::BlockComment { c_style, nesting } => {
                self.state.carry = Carry::BlockComment { c_style, nesting };
                self.eol_category = SyntaxCategory::BlockComment;
            }
            Mode::TripleString => {
                self.state.carry = Carry::TripleString;
                self.eol_category = SyntaxCategory::TripleString;
            }
            Mode::EndOfFile => {
                self.state = LineState {
                    carry: Carry::EndOfFile,
                    ..LineState::default()
                };
                self.eol_category = SyntaxCategory::EndOfFileComment;
            }
            _ => {}
        }
    }

    fn fold_state(&self) -> FoldState {
        let is_whitespace_only = self.source[self.line_start..self.content_end]
            .trim()
            .is_empty();

        if self.entry.carry == Carry::EndOfFile {
            return FoldState {
                level: 0,
                is_header: false,
                is_whitespace_only,
            };
        }

        FoldState {
            level: self.min_fold,
            is_header: !self.reached_end_marker && self.state.fold_depth > self.min_fold,
            is_whitespace_only,
        }
    }

    fn scan_default(&mut self) -> Mode {
        self.start = self.current;
        self.resumed = false;

        let ch = self.peek();
        let next = self.peek_next();
        match ch {
            b' ' | b'\t' | b'\r' | b'\x0c' => {
                while !self.is_at_end() && matches!(self.peek(), b' ' | b'\t' | b'\r' | b'\x0c') {
                    self.current += 1;
                }
                self.emit(SyntaxCategory::Default);
                Mode::Default
            }
            b'#' => Mode::LineComment,
            b'/' if next == b'*' => {
                self.current += 2;
                self.open_fold();
                Mode::BlockComment {
                    c_style: true,
                    nesting: 0,
                }
            }
            b'[' if next == b'*' => {
                self.current += 2;
                self.open_fold();
                Mode::BlockComment {
                    c_style: false,
                    nesting: 1,
                }
            }
            b'[' if next == b'<' => {
                self.current += 2;
                Mode::Slider
            }
            b'"' if next == b'"' && self.peek_at(2) == b'"' => {
                self.current += 3;
                Mode::TripleString
            }
            b'"' => {
                self.current += 1;
                Mode::String
            }
            b'$' => {
                self.current += 1;
                Mode::HexNumber
            }
            b'0'..=b'9' => Mode::Number,
            b'.' if next.is_ascii_digit() && !is_word_byte(self.peek_previous()) => Mode::Number,
            c if is_word_start(c) => Mode::Identifier,
            b'{' => {
                self.current += 1;
                self.emit(SyntaxCategory::Operator);
                self.open_fold();
                Mode::Default
            }
            b'}' => {
                self.current += 1;
                self.emit(SyntaxCategory::Operator);
                self.close_fold();
                Mode::Default
            }
            b'(' => {
                self.current += 1;
                self.emit(SyntaxCategory::Operator);
                self.state.paren_depth += 1;
                Mode::Default
            }
            b')' => {
                self.current += 1;
                self.emit(SyntaxCategory::Operator);
                self.state.paren_depth = self.state.paren_depth.saturating_sub(1);
                self.state.pending_module = None;
                Mode::Default
            }
            c if OPERATORS.contains(&c) => {
                self.current += 1;
                self.emit(SyntaxCategory::Operator);
                Mode::Default
            }
            _ => {
                self.consume_char();
                self.emit(SyntaxCategory::Default);
                Mode::Default
            }
        }
    }

    fn scan_line_comment(&mut self) -> Mode {
        self.current = self.content_end;
        self.emit(SyntaxCategory::Comment);
        self.eol_category = SyntaxCategory::Comment;
        Mode::Default
    }

    fn scan_block_comment(&mut self, c_style: bool, mut nesting: u32) -> Mode {
        while !self.is_at_end() {
            match (self.peek(), self.peek_next()) {
                (b'[', b'*') => {
                    self.current += 2;
                    nesting += 1;
                }
                (b'*', b']') => {
                    self.current += 2;
                    if nesting > 0 {
                        nesting -= 1;
                        if nesting == 0 && !c_style {
                            return self.close_block_comment();
                        }
                    }
                }
                (b'*', b'/') => {
                    self.current += 2;
                    if c_style && nesting == 0 {
                        return self.close_block_comment();
                    }
                }
                _ => self.consume_char(),
            }
        }

        self.emit(SyntaxCategory::BlockComment);
        Mode::BlockComment { c_style, nesting }
    }

    fn close_block_comment(&mut self) -> Mode {
        self.emit(SyntaxCategory::BlockComment);
        self.close_fold();
        Mode::Default
    }

    fn scan_string(&mut self) -> Mode {
        let body_start = self.current;
        let closing = self.bytes[body_start..self.content_end]
            .iter()
            .position(|&b| b == b'"');

        if let Some(len) = closing {
            self.current = body_start + len + 1;
            self.record_module_load(body_start..body_start + len);
            self.emit(SyntaxCategory::String);
        } else {
            self.current = self.content_end;
            self.emit(SyntaxCategory::StringEol);
            self.eol_category = SyntaxCategory::StringEol;
        }
        Mode::Default
    }

    /// Ends at the first run of three quotes. Quotes beyond three in that
    /// run are string content, so `"""a""""` is one string whose body is `a"`.
    fn scan_triple_string(&mut self) -> Mode {
        let body_start = self.current;
        let mut idx = self.current;
        while idx + 3 <= self.content_end {
            if &self.bytes[idx..idx + 3] == b"\"\"\"" {
                while idx + 3 < self.content_end && self.bytes[idx + 3] == b'"' {
                    idx += 1;
                }
                self.current = idx + 3;
                if !self.resumed {
                    self.record_module_load(body_start..idx);
                }
                self.emit(SyntaxCategory::TripleString);
                return Mode::Default;
            }
            idx += 1;
        }

        self.current = self.content_end;
        self.emit(SyntaxCategory::TripleString);
        Mode::TripleString
    }

    fn scan_number(&mut self) -> Mode {
        while !self.is_at_end() && (self.peek().is_ascii_digit() || self.peek() == b'.') {
            self.current += 1;
        }
        self.emit(SyntaxCategory::Number);
        Mode::Default
    }

    fn scan_hex_number(&mut self) -> Mode {
        let digits_start = self.current;
        while !self.is_at_end() && is_word_byte(self.peek()) {
            self.current += 1;
        }
        let digits = &self.bytes[digits_start..self.current];
        let category = if !digits.is_empty() && digits.iter().all(u8::is_ascii_hexdigit) {
            SyntaxCategory::Number
        } else {
            SyntaxCategory::NumberBad
        };
        self.emit(category);
        Mode::Default
    }

    fn scan_slider(&mut self) -> Mode {
        let closing = self.bytes[self.current..self.content_end]
            .windows(2)
            .position(|pair| pair == b">]");

        if let Some(idx) = closing {
            self.current += idx + 2;
            self.emit(SyntaxCategory::Slider);
        } else {
            self.current = self.content_end;
            self.emit(SyntaxCategory::SliderEol);
            self.eol_category = SyntaxCategory::SliderEol;
        }
        Mode::Default
    }

    fn scan_identifier(&mut self) -> Mode {
        while !self.is_at_end() && is_word_byte(self.peek()) {
            self.current += 1;
        }
        let source = self.source;
        let category = self.classify_word(&source[self.start..self.current]);
        self.emit(category);

        if self.reached_end_marker {
            Mode::EndOfFile
        } else {
            Mode::Default
        }
    }

    fn scan_end_of_file(&mut self) -> Mode {
        self.start = self.current;
        self.current = self.content_end;
        self.emit(SyntaxCategory::EndOfFileComment);
        Mode::EndOfFile
    }

    fn classify_word(&mut self, word: &str) -> SyntaxCategory {
        if keywords::is_datatype(word) && self.followed_by_whitespace() {
            self.expect_function_name = false;
            return SyntaxCategory::Datatype;
        }
        if keywords::is_keyword(word) {
            self.expect_function_name = word.eq_ignore_ascii_case(keywords::FUNCTION_KEYWORD);
            return SyntaxCategory::Keyword;
        }
        if keywords::is_misc_word(word) {
            if word.eq_ignore_ascii_case(keywords::END_OF_SCRIPT) {
                self.reached_end_marker = true;
            }
            return SyntaxCategory::MiscWord;
        }
        if std::mem::take(&mut self.expect_function_name) {
            return SyntaxCategory::ScriptFunction;
        }

        let registry = self.lexer.registry;
        match self.next_significant(self.current) {
            Some((_, b'(')) => {
                return match registry.lookup(word) {
                    Some(entry) => {
                        if keywords::is_module_loader(word) {
                            self.state.pending_module = Some(entry.name.clone());
                        }
                        entry.category.into()
                    }
                    None => SyntaxCategory::UnknownFunction,
                };
            }
            Some((idx, b'=')) if self.byte_at(idx + 1) != b'=' => {
                return if self.state.paren_depth > 0 {
                    SyntaxCategory::Parameter
                } else {
                    SyntaxCategory::Assignment
                };
            }
            _ => {}
        }

        // `clip.Width` is a call without parentheses.
        let chained = self.previous_significant(self.start) == Some(b'.');
        match registry.lookup(word) {
            Some(entry) if chained || self.lexer.options.prefer_function_highlighting => {
                entry.category.into()
            }
            _ => SyntaxCategory::Default,
        }
    }

    fn record_module_load(&mut self, body: Range<usize>) {
        if let Some(function) = self.state.pending_module.take() {
            self.module_loads.push(ModuleLoad {
                function,
                path: self.source[body].to_string(),
                span: Span::from_bounds(self.start, self.current),
            });
        }
    }

    fn emit(&mut self, category: SyntaxCategory) {
        if self.current > self.start && category.is_code() {
            let lexeme = self.source[self.start..self.current].trim();
            if !lexeme.is_empty() {
                self.state.continues = lexeme.ends_with('\\');
            }
        }
        if self.current > self.start {
            let span = Span::from_bounds(self.start, self.current);
            match self.tokens.last_mut() {
                Some(last)
                    if last.category == category
                        && category.merges()
                        && last.end() == self.start =>
                {
                    last.span = last.span.with_end(self.current);
                }
                _ => self.tokens.push(Token::new(span, category)),
            }
        }
        self.start = self.current;
    }

    fn open_fold(&mut self) {
        self.state.fold_depth += 1;
    }

    fn close_fold(&mut self) {
        self.state.fold_depth = self.state.fold_depth.saturating_sub(1);
        self.min_fold = self.min_fold.min(self.state.fold_depth);
    }

    fn starts_with_continuation(&self) -> bool {
        self.next_significant(self.line_start).map(|(_, b)| b) == Some(b'\\')
    }

    /// Blanks and the line terminator both count as whitespace.
    fn followed_by_whitespace(&self) -> bool {
        match self.peek() {
            b' ' | b'\t' => true,
            _ => self.is_at_end() && self.content_end < self.line_end,
        }
    }

    fn next_significant(&self, from: usize) -> Option<(usize, u8)> {
        (from..self.content_end)
            .map(|idx| (idx, self.bytes[idx]))
            .find(|(_, b)| !matches!(b, b' ' | b'\t'))
    }

    fn previous_significant(&self, before: usize) -> Option<u8> {
        self.bytes[self.line_start..before]
            .iter()
            .rev()
            .copied()
            .find(|b| !matches!(b, b' ' | b'\t'))
    }

    #[inline]
    fn is_at_end(&self) -> bool {
        self.current >= self.content_end
    }

    #[inline]
    fn byte_at(&self, idx: usize) -> u8 {
        if idx < self.content_end {
            self.bytes[idx]
        } else {
            0
        }
    }

    #[inline]
    fn peek(&self) -> u8 {
        self.byte_at(self.current)
    }

    fn peek_next(&self) -> u8 {
        self.byte_at(self.current + 1)
    }

    fn peek_at(&self, ahead: usize) -> u8 {
        self.byte_at(self.current + ahead)
    }

    fn peek_previous(&self) -> u8 {
        if self.current > self.line_start {
            self.bytes[self.current - 1]
        } else {
            0
        }
    }

    fn consume_char(&mut self) {
        let len = self.source[self.current..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        self.current = (self.current + len).min(self.content_end);
    }
}

fn is_word_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}
