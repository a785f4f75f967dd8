//! Editor features for AviSynth scripts.
//!
//! This crate sits between the lexer and signature registry on one side and
//! an editing UI on the other: it finds the call under the cursor, lines its
//! arguments up with the filter's signature, and turns the result into
//! calltips, completions and value suggestions.

mod functions;
mod matcher;
mod scanner;
mod session;

pub use functions::script_functions;
pub use functions::ScriptFunction;
pub use matcher::accepts;
pub use matcher::match_arguments;
pub use matcher::MatchResult;
pub use matcher::MatchedArg;
pub use scanner::classify_value;
pub use scanner::ActualArg;
pub use scanner::ActualType;
pub use scanner::ArgumentScanner;
pub use scanner::ScannedCall;
pub use scanner::TypeOracle;
pub use session::CallContext;
pub use session::ScriptSession;
pub use session::SessionOptions;
