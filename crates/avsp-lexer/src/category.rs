use serde::Serialize;

use avsp_signatures::FilterCategory;

/// Syntax class assigned to every byte of a script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SyntaxCategory {
    Default,
    Operator,
    Comment,
    BlockComment,
    /// Everything after the end-of-script marker.
    EndOfFileComment,
    Number,
    NumberBad,
    String,
    TripleString,
    /// A single-quoted string that reached the end of its line.
    StringEol,
    Slider,
    /// A slider literal that reached the end of its line.
    SliderEol,
    Keyword,
    Datatype,
    MiscWord,
    CoreFilter,
    PluginFilter,
    UserFunction,
    ScriptFunction,
    ClipProperty,
    UnknownFunction,
    Assignment,
    Parameter,
}

impl SyntaxCategory {
    /// Whether the bytes are script code rather than comment, string or
    /// slider content. Bracket and comma counting only looks at code.
    #[must_use]
    pub fn is_code(self) -> bool {
        !self.is_comment() && !self.is_literal_text()
    }

    #[must_use]
    pub fn is_comment(self) -> bool {
        matches!(
            self,
            Self::Comment | Self::BlockComment | Self::EndOfFileComment
        )
    }

    fn is_literal_text(self) -> bool {
        matches!(
            self,
            Self::String | Self::TripleString | Self::StringEol | Self::Slider | Self::SliderEol
        )
    }

    /// Adjacent tokens of these categories are stored as one token.
    pub(crate) fn merges(self) -> bool {
        matches!(
            self,
            Self::Comment
                | Self::BlockComment
                | Self::EndOfFileComment
                | Self::TripleString
                | Self::StringEol
                | Self::SliderEol
        )
    }
}

impl From<FilterCategory> for SyntaxCategory {
    fn from(category: FilterCategory) -> Self {
        match category {
            FilterCategory::Core => Self::CoreFilter,
            FilterCategory::Plugin => Self::PluginFilter,
            FilterCategory::UserDefined => Self::UserFunction,
            FilterCategory::ScriptDefined => Self::ScriptFunction,
            FilterCategory::ClipProperty => Self::ClipProperty,
        }
    }
}
