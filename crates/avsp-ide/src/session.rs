//! The editor-facing entry point: one script plus the registry it is read
//! against.

use std::ops::Range;

use avsp_conf::Settings;
use avsp_lexer::reserved_words;
use avsp_lexer::Document;
use avsp_lexer::EditError;
use avsp_lexer::EditSummary;
use avsp_lexer::Lexer;
use avsp_lexer::LexerOptions;
use avsp_lexer::ModuleLoad;
use avsp_lexer::Token;
use avsp_signatures::build_calltip_text;
use avsp_signatures::build_default_invocation;
use avsp_signatures::suggest_values;
use avsp_signatures::ArgSpec;
use avsp_signatures::BuiltinLoader;
use avsp_signatures::CalltipText;
use avsp_signatures::FilterCategory;
use avsp_signatures::FilterEntry;
use avsp_signatures::LoadError;
use avsp_signatures::Registry;
use avsp_signatures::UserFilterLoader;
use rustc_hash::FxHashMap;

use crate::functions::script_functions;
use crate::functions::ScriptFunction;
use crate::matcher::match_arguments;
use crate::matcher::MatchResult;
use crate::scanner::ArgumentScanner;
use crate::scanner::ScannedCall;
use crate::scanner::TypeOracle;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionOptions {
    pub lexer: LexerOptions,
    pub show_all_defaults: bool,
    /// Invocation text that replaces the generated one, keyed by lowercase
    /// filter name.
    pub presets: FxHashMap<String, String>,
}

impl From<&Settings> for SessionOptions {
    fn from(settings: &Settings) -> Self {
        let presets = settings
            .filters
            .iter()
            .filter_map(|filter| {
                let preset = filter.preset.as_ref()?;
                Some((filter.name.to_ascii_lowercase(), preset.clone()))
            })
            .collect();

        Self {
            lexer: LexerOptions::from(&settings.highlight),
            show_all_defaults: settings.calltips.show_all_defaults,
            presets,
        }
    }
}

/// The call under a cursor, matched against its filter's signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// Registered name of the filter, as the registry spells it.
    pub filter: String,
    pub call: ScannedCall,
    pub specs: Vec<ArgSpec>,
    pub matched: MatchResult,
}

/// A script being edited, kept lexed against a registry that also tracks
/// the functions the script defines.
pub struct ScriptSession {
    registry: Registry,
    options: SessionOptions,
    document: Document,
    script_functions: Vec<ScriptFunction>,
    /// Registry entries hidden by a script function of the same name.
    shadowed: Vec<FilterEntry>,
    oracle: Option<Box<dyn TypeOracle>>,
}

impl ScriptSession {
    #[must_use]
    pub fn new(registry: Registry, options: SessionOptions, text: impl Into<String>) -> Self {
        let document = Document::new(&Lexer::new(&registry, options.lexer), text);
        let mut session = Self {
            registry,
            options,
            document,
            script_functions: Vec::new(),
            shadowed: Vec::new(),
            oracle: None,
        };
        session.refresh_script_definitions();
        session
    }

    /// Builtins plus the `[[filters]]` from `settings`, which win over
    /// builtins of the same name.
    pub fn from_settings(settings: &Settings, text: impl Into<String>) -> Result<Self, LoadError> {
        let user_filters = UserFilterLoader::new(&settings.filters);
        let registry = Registry::from_loaders(&[&BuiltinLoader, &user_filters])?;
        Ok(Self::new(registry, SessionOptions::from(settings), text))
    }

    pub fn set_type_oracle(&mut self, oracle: Box<dyn TypeOracle>) {
        self.oracle = Some(oracle);
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    #[must_use]
    pub fn script_functions(&self) -> &[ScriptFunction] {
        &self.script_functions
    }

    pub fn edit(&mut self, range: Range<usize>, replacement: &str) -> Result<EditSummary, EditError> {
        let lexer = Lexer::new(&self.registry, self.options.lexer);
        let summary = self.document.edit(&lexer, range, replacement)?;
        self.refresh_script_definitions();
        Ok(summary)
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let lexer = Lexer::new(&self.registry, self.options.lexer);
        self.document.replace_all(&lexer, text);
        self.refresh_script_definitions();
    }

    /// Change the registry, e.g. after plugins were installed, and re-lex.
    pub fn update_registry(&mut self, update: impl FnOnce(&mut Registry)) {
        update(&mut self.registry);
        self.relex();
    }

    /// Re-extract the script's function definitions and register them.
    /// Returns whether the set of definitions changed.
    pub fn refresh_script_definitions(&mut self) -> bool {
        let functions = script_functions(&self.document);
        let unchanged = functions.len() == self.script_functions.len()
            && functions
                .iter()
                .zip(&self.script_functions)
                .all(|(new, old)| new.name == old.name && new.signature == old.signature);
        if unchanged {
            self.script_functions = functions;
            return false;
        }

        self.registry.remove_category(FilterCategory::ScriptDefined);
        for entry in self.shadowed.drain(..) {
            self.registry.upsert(entry);
        }
        for function in &functions {
            let entry = FilterEntry::new(
                &function.name,
                &function.signature,
                FilterCategory::ScriptDefined,
            );
            if let Some(previous) = self.registry.upsert(entry) {
                if previous.category != FilterCategory::ScriptDefined {
                    self.shadowed.push(previous);
                }
            }
        }

        tracing::debug!(
            count = functions.len(),
            shadowed = self.shadowed.len(),
            "script definitions refreshed"
        );
        self.script_functions = functions;
        self.relex();
        true
    }

    fn relex(&mut self) {
        let lexer = Lexer::new(&self.registry, self.options.lexer);
        self.document.relex(&lexer);
    }

    /// Tokens overlapping `start..end`.
    #[must_use]
    pub fn spans_in_range(&self, start: usize, end: usize) -> Vec<Token> {
        self.document.tokens_in_range(start, end).copied().collect()
    }

    /// Fold level of `line`; 0 past the end of the document.
    #[must_use]
    pub fn fold_level(&self, line: usize) -> u32 {
        self.document.fold_level(line).unwrap_or(0)
    }

    pub fn module_loads(&self) -> impl Iterator<Item = &ModuleLoad> {
        self.document.module_loads()
    }

    /// The known call around `cursor` and how its arguments line up.
    #[must_use]
    pub fn call_context(&self, cursor: usize) -> Option<CallContext> {
        let mut scanner = ArgumentScanner::new(&self.document, &self.registry);
        if let Some(oracle) = self.oracle.as_deref() {
            scanner = scanner.with_oracle(oracle);
        }
        let call = scanner.call_at(cursor)?;

        let entry = self.registry.lookup(&call.name)?;
        if entry.category == FilterCategory::ClipProperty {
            return None;
        }
        let filter = entry.name.clone();
        let specs = self.registry.arg_specs(&call.name)?;
        let matched = match_arguments(&specs, &call.args, call.is_chained, call.active_index);

        Some(CallContext {
            filter,
            call,
            specs,
            matched,
        })
    }

    /// Calltip for the call around `cursor`, e.g. `Blur(clip, float amount)`,
    /// with the slot being typed marked for emphasis.
    #[must_use]
    pub fn calltip_at(&self, cursor: usize) -> Option<CalltipText> {
        let context = self.call_context(cursor)?;
        let tip = build_calltip_text(
            &context.specs,
            context.matched.active_slot,
            context.matched.out_of_order,
            self.options.show_all_defaults,
        );

        let offset = context.filter.len();
        Some(CalltipText {
            text: format!("{}{}", context.filter, tip.text),
            highlight: tip
                .highlight
                .map(|range| range.start + offset..range.end + offset),
        })
    }

    /// Literal values for the slot being typed at `cursor`.
    #[must_use]
    pub fn value_suggestions_at(&self, cursor: usize) -> Vec<String> {
        self.call_context(cursor)
            .and_then(|context| {
                let slot = context.matched.active_slot?;
                let spec = context.specs.get(slot)?;
                Some(suggest_values(spec.arg_type, &spec.extra))
            })
            .unwrap_or_default()
    }

    /// Filter names and reserved words starting with `prefix`, ignoring case.
    #[must_use]
    pub fn completion_candidates(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_ascii_lowercase();
        let names = self.registry.all_names().map(ToString::to_string);
        let words = reserved_words().map(ToString::to_string);
        let mut candidates: Vec<String> = names
            .chain(words)
            .filter(|name| name.to_ascii_lowercase().starts_with(&prefix))
            .collect();

        candidates.sort_by_cached_key(|name| (name.to_ascii_lowercase(), name.clone()));
        candidates.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
        candidates
    }

    /// Text to insert for `name`: its configured preset, or an invocation
    /// generated from the signature.
    #[must_use]
    pub fn default_invocation(&self, name: &str) -> Option<String> {
        if let Some(preset) = self.options.presets.get(&name.to_ascii_lowercase()) {
            return Some(preset.clone());
        }

        let entry = self.registry.lookup(name)?;
        if entry.category == FilterCategory::ClipProperty {
            return None;
        }
        let specs = self.registry.arg_specs(name)?;
        Some(build_default_invocation(&entry.name, &specs))
    }
}

#[cfg(test)]
mod tests {
    use avsp_conf::FilterDefinition;
    use avsp_conf::FilterKind;
    use avsp_lexer::SyntaxCategory;
    use avsp_signatures::ArgType;

    use super::*;
    use crate::scanner::ActualType;

    fn session(text: &str) -> ScriptSession {
        ScriptSession::from_settings(&Settings::default(), text).unwrap()
    }

    /// Session over `text` with the `|` marker removed, plus the marker offset.
    fn session_at(text: &str) -> (ScriptSession, usize) {
        let cursor = text.find('|').unwrap();
        (session(&text.replacen('|', "", 1)), cursor)
    }

    mod calltips {
        use super::*;

        #[test]
        fn active_slot_is_highlighted() {
            let (session, cursor) = session_at("Blur(src, |");
            let tip = session.calltip_at(cursor).unwrap();
            insta::assert_snapshot!(tip.text, @r#"Blur(clip, float amount, float "amount_v", bool "MMX")"#);
            assert_eq!(&tip.text[tip.highlight.unwrap()], "float amount");
        }

        #[test]
        fn active_default_is_shown() {
            let (session, cursor) = session_at("src.Blur(1.0, MMX=|)");
            let tip = session.calltip_at(cursor).unwrap();
            insta::assert_snapshot!(tip.text, @r#"Blur(clip, float amount, float "amount_v", bool "MMX"=true)"#);
            assert_eq!(&tip.text[tip.highlight.unwrap()], "bool \"MMX\"=true");
        }

        #[test]
        fn named_argument_before_cursor_drops_highlight() {
            let (session, cursor) = session_at("Blur(amount_v=2, |");
            let tip = session.calltip_at(cursor).unwrap();
            assert_eq!(tip.highlight, None);
        }

        #[test]
        fn chained_call_skips_receiver() {
            let (session, cursor) = session_at("src.Crop(|");
            let tip = session.calltip_at(cursor).unwrap();
            assert_eq!(&tip.text[tip.highlight.unwrap()], "int left");
        }

        #[test]
        fn unknown_calls_and_properties_have_no_calltip() {
            let (session, cursor) = session_at("Mystery(|)");
            assert_eq!(session.calltip_at(cursor), None);
            let (session, cursor) = session_at("Width(|)");
            assert_eq!(session.calltip_at(cursor), None);
        }

        #[test]
        fn show_all_defaults_setting() {
            let mut settings = Settings::default();
            settings.calltips.show_all_defaults = true;
            let text = "Invert(";
            let session = ScriptSession::from_settings(&settings, text).unwrap();
            let tip = session.calltip_at(text.len()).unwrap();
            insta::assert_snapshot!(tip.text, @r#"Invert(clip, string "channels"="RGBA")"#);
        }

        #[test]
        fn aliases_use_the_target_signature() {
            let (session, cursor) = session_at("Grayscale(|");
            let tip = session.calltip_at(cursor).unwrap();
            assert!(tip.text.starts_with("Grayscale(clip, string \"matrix\""));
        }
    }

    mod suggestions {
        use super::*;

        #[test]
        fn bool_slot() {
            let (session, cursor) = session_at("Blur(src, 1.0, MMX=|)");
            assert_eq!(session.value_suggestions_at(cursor), vec!["true", "false"]);
        }

        #[test]
        fn choice_list_slot() {
            let (session, cursor) = session_at("ConvertToYV12(matrix=|)");
            assert_eq!(
                session.value_suggestions_at(cursor),
                vec!["Rec601", "Rec709", "PC.601", "PC.709", "AVERAGE"]
            );
        }

        #[test]
        fn nothing_outside_calls() {
            let (session, cursor) = session_at("x = |1");
            assert!(session.value_suggestions_at(cursor).is_empty());
        }
    }

    mod completion {
        use super::*;

        #[test]
        fn prefix_is_case_insensitive_and_sorted() {
            let session = session("");
            let candidates = session.completion_candidates("fl");
            assert_eq!(candidates, vec!["FlipHorizontal", "FlipVertical", "float"]);
        }

        #[test]
        fn script_functions_are_candidates() {
            let session = session("function MySoften(clip c) { c }");
            assert_eq!(session.completion_candidates("mys"), vec!["MySoften"]);
        }

        #[test]
        fn empty_prefix_lists_everything() {
            let session = session("");
            let candidates = session.completion_candidates("");
            assert!(candidates.len() > session.registry().len());
            assert!(candidates.iter().any(|name| name == "function"));
        }
    }

    mod invocations {
        use super::*;

        #[test]
        fn generated_from_signature() {
            let session = session("");
            assert_eq!(
                session.default_invocation("blur").as_deref(),
                Some("Blur(?, amount_v=?, MMX=true)")
            );
            assert_eq!(session.default_invocation("Nope"), None);
            assert_eq!(session.default_invocation("Width"), None);
        }

        #[test]
        fn presets_replace_generated_text() {
            let settings = Settings {
                filters: vec![FilterDefinition {
                    name: "Blur".to_string(),
                    signature: "(clip, float amount)".to_string(),
                    category: FilterKind::User,
                    alias_of: None,
                    preset: Some("Blur(1.0)".to_string()),
                }],
                ..Settings::default()
            };
            let session = ScriptSession::from_settings(&settings, "").unwrap();
            assert_eq!(session.default_invocation("BLUR").as_deref(), Some("Blur(1.0)"));
            assert_eq!(
                session.registry().lookup("blur").unwrap().category,
                FilterCategory::UserDefined
            );
        }

        #[test]
        fn invalid_user_filter_fails_the_session() {
            let settings = Settings {
                filters: vec![FilterDefinition {
                    name: "not valid".to_string(),
                    signature: String::new(),
                    category: FilterKind::Plugin,
                    alias_of: None,
                    preset: None,
                }],
                ..Settings::default()
            };
            assert!(matches!(
                ScriptSession::from_settings(&settings, ""),
                Err(LoadError::InvalidEntry { .. })
            ));
        }
    }

    mod script_definitions {
        use super::*;

        #[test]
        fn definitions_are_registered_and_colored() {
            let text = "Soft(1)\nfunction Soft(clip c, float \"amount\") { c }";
            let session = session(text);
            let entry = session.registry().lookup("soft").unwrap();
            assert_eq!(entry.category, FilterCategory::ScriptDefined);
            assert_eq!(entry.signature, "(clip c, float \"amount\")");
            assert_eq!(
                session.document().category_at(0),
                SyntaxCategory::ScriptFunction
            );
        }

        #[test]
        fn edits_refresh_definitions() {
            let mut session = session("Soft(1)\n");
            assert_eq!(
                session.document().category_at(0),
                SyntaxCategory::UnknownFunction
            );

            let end = session.document().text().len();
            session
                .edit(end..end, "function Soft(clip c) { c }\n")
                .unwrap();
            assert_eq!(
                session.document().category_at(0),
                SyntaxCategory::ScriptFunction
            );

            let start = session.document().text().find("function").unwrap();
            let end = session.document().text().len();
            session.edit(start..end, "").unwrap();
            assert!(!session.registry().contains("Soft"));
            assert_eq!(
                session.document().category_at(0),
                SyntaxCategory::UnknownFunction
            );
        }

        #[test]
        fn shadowed_builtins_come_back() {
            let mut session = session("function Blur(clip c) { c }");
            assert_eq!(
                session.registry().lookup("Blur").unwrap().category,
                FilterCategory::ScriptDefined
            );

            session.set_text("Blur(1)");
            assert_eq!(
                session.registry().lookup("Blur").unwrap().category,
                FilterCategory::Core
            );
        }

        #[test]
        fn unchanged_definitions_do_not_relex() {
            let mut session = session("function A(clip c) { c }\n");
            let version = session.document().version();
            assert!(!session.refresh_script_definitions());
            assert_eq!(session.document().version(), version);
        }
    }

    mod queries {
        use super::*;

        #[test]
        fn spans_and_folds() {
            let session = session("a = Blur(1)\nif (x) {\n  b\n}");
            let spans = session.spans_in_range(4, 8);
            assert_eq!(spans.len(), 1);
            assert_eq!(spans[0].category, SyntaxCategory::CoreFilter);
            assert_eq!(session.fold_level(2), 1);
            assert_eq!(session.fold_level(99), 0);
        }

        #[test]
        fn module_loads() {
            let session = session("LoadPlugin(\"mvtools2.dll\")\nImport(\"lib.avsi\")");
            let paths: Vec<&str> = session
                .module_loads()
                .map(|load| load.path.as_str())
                .collect();
            assert_eq!(paths, vec!["mvtools2.dll", "lib.avsi"]);
        }

        #[test]
        fn type_oracle_is_consulted() {
            struct Strength;
            impl TypeOracle for Strength {
                fn resolve_variable_type(&self, name: &str) -> Option<avsp_signatures::ArgType> {
                    (name == "strength").then_some(avsp_signatures::ArgType::Float)
                }
            }

            let (mut session, cursor) = session_at("Blur(strength, |");
            let context = session.call_context(cursor).unwrap();
            assert_eq!(context.matched.clip_offset, 0);
            assert_eq!(context.matched.active_slot, Some(1));

            session.set_type_oracle(Box::new(Strength));
            let context = session.call_context(cursor).unwrap();
            assert_eq!(context.matched.clip_offset, 1);
            assert_eq!(context.matched.active_slot, Some(2));
        }
    }

    /// Each argument of a default invocation parses back to the type declared
    /// by the slot it was generated from.
    #[test]
    fn default_invocations_round_trip() {
        let session = session("");
        let extra = [
            ("Mixed", "([clip c], int, [float \"f\"=1.0], string s [, ...])"),
            ("Bare", "(clip, int, float, bool, string)"),
            ("Defaults", "(clip, int x, float \"y\"=1.5, int \"c\"=$FF00FF, bool \"b\"=false)"),
        ];
        let mut registry = session.registry().clone();
        for (name, signature) in extra {
            registry.upsert(FilterEntry::new(name, signature, FilterCategory::UserDefined));
        }

        let filters: Vec<&FilterEntry> = registry
            .iter()
            .filter(|entry| {
                entry.category != FilterCategory::ClipProperty && entry.alias_of.is_none()
            })
            .collect();
        assert!(filters.len() > 20);

        let mut checked = 0;
        for entry in filters {
            let specs = registry.arg_specs(&entry.name).unwrap();
            let invocation = build_default_invocation(&entry.name, &specs);
            let emitted: Vec<&ArgSpec> = specs
                .iter()
                .enumerate()
                .filter(|(idx, spec)| !(*idx == 0 && spec.is_receiver_candidate()))
                .map(|(_, spec)| spec)
                .collect();

            let lexer = Lexer::new(&registry, LexerOptions::default());
            let document = Document::new(&lexer, &invocation);
            let call = ArgumentScanner::new(&document, &registry)
                .scan_call(0, None)
                .unwrap();
            assert_eq!(call.args.len(), emitted.len(), "{invocation}");

            for (actual, spec) in call.args.iter().zip(emitted) {
                if spec.is_named && !spec.name.is_empty() {
                    assert_eq!(actual.name.as_deref(), Some(spec.name.as_str()), "{invocation}");
                }
                if actual.text == "?" {
                    assert_eq!(actual.inferred_type, ActualType::Var, "{invocation}");
                    continue;
                }
                let declared = ActualType::from(spec.arg_type);
                let fits = spec.arg_type == ArgType::Unknown
                    || actual.inferred_type == declared
                    || (declared == ActualType::Int && actual.inferred_type == ActualType::Hex);
                assert!(
                    fits,
                    "{invocation}: `{}` is {:?}, declared {}",
                    actual.text,
                    actual.inferred_type,
                    spec.display()
                );
                checked += 1;
            }
        }
        assert!(checked > 20, "only {checked} defaults checked");
    }
}
