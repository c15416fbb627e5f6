//! Recording of compiler events relevant to include-usage analysis.
//!
//! Where [`crate::analysis`] analyzes AST nodes and recorded preprocessor
//! events, this module captures them from a parse: the driver installs the
//! [`RecordedPp`] hooks into its preprocessor callbacks and feeds
//! [`RecordedAst`] from its top-level-declaration consumer. Both are plain
//! data once parsing completes.

use log::debug;

use crate::ast::{Ast, DeclId, DeclKind};
use crate::context::SymbolCache;
use crate::pp::{MacroInfo, Preprocessor, Token};
use crate::source::{FileId, SourceLocation, SourceMap};
use crate::types::{FxIndexMap, Header, SymbolReference};

/// A single `#include` directive from the main file.
#[derive(Debug, Clone)]
pub struct Include {
    /// Text between the delimiters, e.g. `vector`.
    pub spelled: String,
    /// The concrete file the preprocessor resolved, if any.
    pub resolved: Option<FileId>,
    /// Location of the hash in `#include <vector>`.
    pub hash_location: SourceLocation,
    /// 1-based line number of the hash.
    pub line: u32,
    /// Written with angle brackets.
    pub angled: bool,
    /// Carries a "keep" annotation; never reported unused.
    pub keep: bool,
}

/// The set of includes recorded from the main file, in textual order, with
/// secondary indices by spelling and by resolved file.
#[derive(Default)]
pub struct RecordedIncludes {
    all: Vec<Include>,
    by_spelling: FxIndexMap<String, Vec<u32>>,
    by_file: FxIndexMap<FileId, Vec<u32>>,
}

impl RecordedIncludes {
    /// All `#include`s seen, in the order they appear.
    pub fn all(&self) -> &[Include] {
        &self.all
    }

    /// Ordinals of the includes that match a header providing a used
    /// symbol, sorted and deduplicated.
    ///
    /// Matching depends on the header variant: physical files compare the
    /// resolved file, logical standard-library headers compare the
    /// spelling with angle brackets trimmed, verbatim headers compare the
    /// spelling as-is. Builtin and main-file headers never match.
    pub fn match_header(&self, header: &Header) -> Vec<u32> {
        let mut result = match header {
            Header::Physical(file) => self.by_file.get(file).cloned().unwrap_or_default(),
            Header::StandardLibrary(h) => {
                let spelling = h.name().trim_start_matches('<').trim_end_matches('>');
                self.by_spelling.get(spelling).cloned().unwrap_or_default()
            }
            Header::Verbatim(spelling) => {
                self.by_spelling.get(spelling).cloned().unwrap_or_default()
            }
            Header::Builtin | Header::MainFile => Vec::new(),
        };
        result.sort_unstable();
        result.dedup();
        result
    }

    fn push(&mut self, include: Include) {
        let ordinal = self.all.len() as u32;
        self.by_spelling
            .entry(include.spelled.clone())
            .or_default()
            .push(ordinal);
        if let Some(file) = include.resolved {
            self.by_file.entry(file).or_default().push(ordinal);
        }
        self.all.push(include);
    }
}

/// The inclusion-directive event payload.
#[derive(Debug, Clone)]
pub struct IncludeDirective<'t> {
    /// Location of the leading `#`.
    pub hash_location: SourceLocation,
    /// Spelled file name, without delimiters.
    pub spelled: &'t str,
    pub angled: bool,
    pub resolved: Option<FileId>,
    /// The directive carries a keep annotation.
    pub keep: bool,
}

/// Recorded preprocessor events relevant to include-usage analysis.
///
/// The hooks ignore everything outside the main file: the file-change
/// event toggles recording as inclusion depth enters and leaves it.
#[derive(Default)]
pub struct RecordedPp {
    /// Where macros were used from the main file.
    pub macro_references: Vec<SymbolReference>,
    pub includes: RecordedIncludes,
    active: bool,
}

impl RecordedPp {
    pub fn new() -> Self {
        Self::default()
    }

    /// The preprocessor entered a file (or returned to one).
    pub fn file_changed(&mut self, sm: &SourceMap, loc: SourceLocation) {
        self.active = sm.is_in_main_file(loc);
    }

    /// A `#include` directive was seen.
    pub fn inclusion_directive(&mut self, sm: &SourceMap, directive: &IncludeDirective) {
        if !self.active {
            return;
        }
        let line = sm.line_number(directive.hash_location).unwrap_or(0);
        debug!(
            "recorded #include {:?} on line {line} (resolved: {})",
            directive.spelled,
            directive.resolved.is_some()
        );
        self.includes.push(Include {
            spelled: directive.spelled.to_string(),
            resolved: directive.resolved,
            hash_location: directive.hash_location,
            line,
            angled: directive.angled,
            keep: directive.keep,
        });
    }

    /// A macro is about to be expanded.
    pub fn macro_expands(&mut self, cache: &mut SymbolCache, name: &Token, info: &MacroInfo) {
        if !self.active {
            return;
        }
        self.record_macro_ref(cache, name, info);
    }

    /// A macro was just defined.
    ///
    /// The body tokens of a definition can refer to other macros. Formally
    /// such a reference is not resolved until the defined macro expands,
    /// but it is a textual reference in the main file and is treated as
    /// one here (the names never expand lexically at the definition).
    pub fn macro_defined(&mut self, pp: &Preprocessor, cache: &mut SymbolCache, name: &Token) {
        if !self.active {
            return;
        }
        let Some(info) = pp.macro_info(&name.text) else {
            return;
        };
        for tok in &info.body {
            // Could this token be a reference to a macro? (Not a formal
            // parameter of this definition.)
            if !tok.is_identifier()
                || info.params.contains(&tok.text)
                || !pp.had_macro_definition(&tok.text)
            {
                continue;
            }
            if let Some(referenced) = pp.macro_info(&tok.text) {
                self.record_macro_ref(cache, tok, referenced);
            }
        }
    }

    fn record_macro_ref(&mut self, cache: &mut SymbolCache, tok: &Token, info: &MacroInfo) {
        if info.is_builtin {
            // The file-name macro and friends are not references.
            return;
        }
        self.macro_references.push(SymbolReference {
            location: tok.location,
            target: cache.macro_symbol(&tok.text, info.definition),
        });
    }
}

/// Recorded parser events: the declarations written at file scope inside
/// the main file.
///
/// These are the roots of the subtrees traversed to find uses; walking
/// the whole translation unit would find uses inside headers.
#[derive(Default)]
pub struct RecordedAst {
    pub top_level_decls: Vec<DeclId>,
}

impl RecordedAst {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one top-level declaration group from the parser.
    pub fn handle_top_level_decls(&mut self, sm: &SourceMap, ast: &Ast, group: &[DeclId]) {
        for &id in group {
            let decl = ast.decl(id);
            if !sm.is_in_main_file(decl.location) {
                continue;
            }
            if decl.is_implicit_instantiation {
                continue;
            }
            // Method declarations are not actually top-level; walking them
            // would re-walk their enclosing type.
            if matches!(decl.kind, DeclKind::Method) {
                continue;
            }
            self.top_level_decls.push(id);
        }
    }
}
