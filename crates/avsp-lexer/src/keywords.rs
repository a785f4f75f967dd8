/// Type keywords, recognized only when followed by whitespace.
const DATATYPES: &[&str] = &["bool", "clip", "float", "int", "string", "val", "var"];

const KEYWORDS: &[&str] = &[
    "break", "catch", "continue", "else", "false", "for", "function", "global", "if", "last",
    "no", "return", "true", "try", "while", "yes",
];

/// Marks the rest of the script as a trailing comment.
pub(crate) const END_OF_SCRIPT: &str = "__end__";

const MISC_WORDS: &[&str] = &[END_OF_SCRIPT];

/// Calls whose quoted argument names an external module to load.
const MODULE_LOADERS: &[&str] = &[
    "import",
    "load_stdcall_plugin",
    "loadcplugin",
    "loadplugin",
    "loadvfapiplugin",
    "loadvirtualdubplugin",
];

pub(crate) const FUNCTION_KEYWORD: &str = "function";

fn contains(list: &[&str], word: &str) -> bool {
    list.iter().any(|candidate| candidate.eq_ignore_ascii_case(word))
}

pub(crate) fn is_datatype(word: &str) -> bool {
    contains(DATATYPES, word)
}

pub(crate) fn is_keyword(word: &str) -> bool {
    contains(KEYWORDS, word)
}

pub(crate) fn is_misc_word(word: &str) -> bool {
    contains(MISC_WORDS, word)
}

pub(crate) fn is_module_loader(word: &str) -> bool {
    contains(MODULE_LOADERS, word)
}

/// Every reserved word, for completion lists.
pub fn reserved_words() -> impl Iterator<Item = &'static str> {
    DATATYPES.iter().chain(KEYWORDS).copied()
}
