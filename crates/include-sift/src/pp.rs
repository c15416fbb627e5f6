//! Preprocessor view consumed by the analyzer.
//!
//! The real preprocessor lives in the parser; during parsing the driver
//! mirrors the parts the analyzer needs into a [`Preprocessor`]: the live
//! macro table (for resolving identifiers inside `#define` bodies), the set
//! of names that ever had a definition, and which files turned out to be
//! self-contained (include-guarded), which backs the unused-include
//! eligibility check.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::source::{FileId, SourceLocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Literal,
    Punctuation,
}

/// One preprocessor token, as spelled in the source.
#[derive(Debug, Clone)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub location: SourceLocation,
}

impl Token {
    pub fn identifier(text: impl Into<String>, location: SourceLocation) -> Self {
        Token {
            text: text.into(),
            kind: TokenKind::Identifier,
            location,
        }
    }

    pub fn literal(text: impl Into<String>, location: SourceLocation) -> Self {
        Token {
            text: text.into(),
            kind: TokenKind::Literal,
            location,
        }
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }
}

/// One macro definition, as the preprocessor saw it.
#[derive(Debug, Clone)]
pub struct MacroInfo {
    /// Location of the macro name in the `#define`.
    pub definition: SourceLocation,
    /// Formal parameter names, for function-like macros.
    pub params: Vec<String>,
    /// The replacement tokens.
    pub body: Vec<Token>,
    /// Compiler-predefined macros like the file-name macro; these are
    /// never symbols.
    pub is_builtin: bool,
}

impl MacroInfo {
    pub fn new(definition: SourceLocation) -> Self {
        MacroInfo {
            definition,
            params: Vec::new(),
            body: Vec::new(),
            is_builtin: false,
        }
    }
}

/// The preprocessor state the driver maintains while parsing.
#[derive(Default)]
pub struct Preprocessor {
    macros: FxHashMap<String, MacroInfo>,
    ever_defined: FxHashSet<String>,
    self_contained: FxHashSet<FileId>,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a macro definition, replacing any current definition of the
    /// same name.
    pub fn define(&mut self, name: impl Into<String>, info: MacroInfo) {
        let name = name.into();
        self.ever_defined.insert(name.clone());
        self.macros.insert(name, info);
    }

    /// Install a compiler-predefined macro.
    pub fn define_builtin(&mut self, name: impl Into<String>) {
        let mut info = MacroInfo::new(SourceLocation::Invalid);
        info.is_builtin = true;
        self.define(name, info);
    }

    /// Remove the current definition of a name (`#undef`).
    pub fn undef(&mut self, name: &str) {
        self.macros.remove(name);
    }

    /// The currently live definition of a name, if any.
    pub fn macro_info(&self, name: &str) -> Option<&MacroInfo> {
        self.macros.get(name)
    }

    /// Did this name ever have a macro definition, live or not?
    pub fn had_macro_definition(&self, name: &str) -> bool {
        self.ever_defined.contains(name)
    }

    /// Mark a file as self-contained (it has an include guard or
    /// `#pragma once`).
    pub fn set_self_contained(&mut self, file: FileId) {
        self.self_contained.insert(file);
    }

    /// Files without include guards may have side effects by design and are
    /// never reported unused.
    pub fn is_self_contained(&self, file: FileId) -> bool {
        self.self_contained.contains(&file)
    }
}
