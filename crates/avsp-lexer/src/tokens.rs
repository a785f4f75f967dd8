use avsp_source::Span;
use serde::Serialize;

use crate::category::SyntaxCategory;
use crate::state::FoldState;
use crate::state::LineState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Token {
    pub span: Span,
    pub category: SyntaxCategory,
}

impl Token {
    #[must_use]
    pub fn new(span: Span, category: SyntaxCategory) -> Self {
        Self { span, category }
    }

    #[must_use]
    pub fn start(&self) -> usize {
        self.span.start_usize()
    }

    #[must_use]
    pub fn end(&self) -> usize {
        self.span.end_usize()
    }

    #[must_use]
    pub fn lexeme<'t>(&self, text: &'t str) -> &'t str {
        text.get(self.span.range()).unwrap_or_default()
    }

    #[must_use]
    fn shifted(self, delta: isize) -> Self {
        Self::new(self.span.shifted(delta), self.category)
    }
}

/// A quoted filename passed to a module-loading call such as `LoadPlugin`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ModuleLoad {
    pub function: String,
    pub path: String,
    /// Span of the string literal, quotes included.
    pub span: Span,
}

/// Everything the lexer produced for one line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LexedLine {
    pub entry: LineState,
    pub exit: LineState,
    pub tokens: Vec<Token>,
    pub fold: FoldState,
    pub module_loads: Vec<ModuleLoad>,
}

impl LexedLine {
    /// Move every span by `delta` bytes, for lines that follow an edit.
    #[must_use]
    pub(crate) fn shifted(mut self, delta: isize) -> Self {
        if delta != 0 {
            for token in &mut self.tokens {
                *token = token.shifted(delta);
            }
            for load in &mut self.module_loads {
                load.span = load.span.shifted(delta);
            }
        }
        self
    }
}
