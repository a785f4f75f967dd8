use std::ops::Range;

use avsp_source::LineIndex;
use thiserror::Error;

use crate::category::SyntaxCategory;
use crate::lexer::Lexer;
use crate::state::FoldState;
use crate::state::LineState;
use crate::tokens::LexedLine;
use crate::tokens::ModuleLoad;
use crate::tokens::Token;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("edit range {start}..{end} is inverted")]
    InvertedRange { start: usize, end: usize },
    #[error("edit range {start}..{end} is outside a document of {len} bytes")]
    OutOfBounds { start: usize, end: usize, len: usize },
    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },
}

/// What an incremental edit had to redo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditSummary {
    pub version: u64,
    /// First line whose tokens were recomputed.
    pub first_line: usize,
    pub relexed_lines: usize,
    /// Lines after the edit whose previous tokens were shifted and kept.
    pub reused_lines: usize,
}

/// A script buffer together with its per-line lexer output.
///
/// Every line keeps the state the lexer entered it with, so an edit only
/// re-lexes from the edited line until the lexer state converges with what
/// was stored for the following unchanged lines.
#[derive(Clone, Debug)]
pub struct Document {
    text: String,
    line_index: LineIndex,
    lines: Vec<LexedLine>,
    version: u64,
}

impl Document {
    #[must_use]
    pub fn new(lexer: &Lexer<'_>, text: impl Into<String>) -> Self {
        let text = text.into();
        let line_index = LineIndex::from_text(&text);
        let lines = lexer.lex(&text);
        Self {
            text,
            line_index,
            lines,
            version: 0,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn lines(&self) -> &[LexedLine] {
        &self.lines
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.lines.iter().flat_map(|line| line.tokens.iter())
    }

    /// Tokens overlapping `start..end`, in document order.
    pub fn tokens_in_range(&self, start: usize, end: usize) -> impl Iterator<Item = &Token> {
        let first = self.line_index.line_of(start);
        let last = self.line_index.line_of(end).max(first);
        self.lines
            .get(first..=last.min(self.lines.len().saturating_sub(1)))
            .unwrap_or_default()
            .iter()
            .flat_map(|line| line.tokens.iter())
            .filter(move |token| token.span.overlaps(start, end.max(start.saturating_add(1))))
    }

    #[must_use]
    pub fn token_at(&self, offset: usize) -> Option<&Token> {
        let line = self.lines.get(self.line_index.line_of(offset))?;
        line.tokens
            .iter()
            .find(|token| token.span.contains(offset))
    }

    /// Category of the byte at `offset`; `Default` past the end.
    #[must_use]
    pub fn category_at(&self, offset: usize) -> SyntaxCategory {
        self.token_at(offset)
            .map_or(SyntaxCategory::Default, |token| token.category)
    }

    #[must_use]
    pub fn fold_state(&self, line: usize) -> Option<FoldState> {
        self.lines.get(line).map(|lexed| lexed.fold)
    }

    #[must_use]
    pub fn fold_level(&self, line: usize) -> Option<u32> {
        self.fold_state(line).map(|fold| fold.level)
    }

    /// State the lexer was in at the start of `line`.
    #[must_use]
    pub fn line_state(&self, line: usize) -> Option<&LineState> {
        self.lines.get(line).map(|lexed| &lexed.entry)
    }

    pub fn module_loads(&self) -> impl Iterator<Item = &ModuleLoad> {
        self.lines.iter().flat_map(|line| line.module_loads.iter())
    }

    /// Replace `range` with `replacement` and re-lex what the change affects.
    pub fn edit(
        &mut self,
        lexer: &Lexer<'_>,
        range: Range<usize>,
        replacement: &str,
    ) -> Result<EditSummary, EditError> {
        self.check_range(&range)?;

        let first_line = self.line_index.line_of(range.start);
        let old_last_line = self.line_index.line_of(range.end);
        let delta = signed(replacement.len()) - signed(range.len());
        let edit_end = range.start + replacement.len();

        self.text.replace_range(range, replacement);
        self.line_index = LineIndex::from_text(&self.text);
        self.version += 1;

        let mut lines = std::mem::take(&mut self.lines);
        let tail = lines.split_off((old_last_line + 1).min(lines.len()));
        lines.truncate(first_line);

        let new_last_line = self.line_index.line_of(edit_end);
        let (relexed_lines, reused_lines) =
            self.relex_lines(lexer, lines, first_line, new_last_line, tail, delta);

        let summary = EditSummary {
            version: self.version,
            first_line,
            relexed_lines,
            reused_lines,
        };
        tracing::debug!(?summary, "applied edit");
        Ok(summary)
    }

    /// Re-lex the whole document, e.g. after the registry changed.
    pub fn relex(&mut self, lexer: &Lexer<'_>) {
        self.lines = lexer.lex(&self.text);
        self.version += 1;
    }

    /// Re-lex `line` and everything after it from the stored entry state.
    pub fn relex_from(&mut self, lexer: &Lexer<'_>, line: usize) {
        let line = line.min(self.lines.len());
        let mut lines = std::mem::take(&mut self.lines);
        lines.truncate(line);
        let last_line = self.line_index.line_count().saturating_sub(1);
        self.relex_lines(lexer, lines, line, last_line, Vec::new(), 0);
        self.version += 1;
    }

    pub fn replace_all(&mut self, lexer: &Lexer<'_>, text: impl Into<String>) {
        self.text = text.into();
        self.line_index = LineIndex::from_text(&self.text);
        self.relex(lexer);
    }

    /// Lex from `first_line` onward, appending to `lines`. Once past
    /// `last_changed`, a line whose stored entry state matches the current
    /// state ends the scan and the remaining `tail` is reused.
    fn relex_lines(
        &mut self,
        lexer: &Lexer<'_>,
        mut lines: Vec<LexedLine>,
        first_line: usize,
        last_changed: usize,
        mut tail: Vec<LexedLine>,
        delta: isize,
    ) -> (usize, usize) {
        let mut entry = lines.last().map(|line| line.exit.clone()).unwrap_or_default();
        let mut relexed = 0;
        let mut reused = 0;

        for line in first_line..self.line_index.line_count() {
            if line > last_changed {
                let idx = line - last_changed - 1;
                if tail.get(idx).is_some_and(|old| old.entry == entry) {
                    reused = tail.len() - idx;
                    lines.extend(tail.drain(idx..).map(|old| old.shifted(delta)));
                    break;
                }
            }

            let Some(range) = self.line_index.line_range(line) else {
                break;
            };
            let lexed = lexer.lex_line(&self.text, range, &entry);
            entry.clone_from(&lexed.exit);
            lines.push(lexed);
            relexed += 1;
        }

        tracing::trace!(first_line, relexed, reused, "relexed lines");
        self.lines = lines;
        (relexed, reused)
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), EditError> {
        if range.start > range.end {
            return Err(EditError::InvertedRange {
                start: range.start,
                end: range.end,
            });
        }
        if range.end > self.text.len() {
            return Err(EditError::OutOfBounds {
                start: range.start,
                end: range.end,
                len: self.text.len(),
            });
        }
        for offset in [range.start, range.end] {
            if !self.text.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary { offset });
            }
        }
        Ok(())
    }
}

fn signed(len: usize) -> isize {
    isize::try_from(len).unwrap_or(isize::MAX)
}
