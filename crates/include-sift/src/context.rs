//! The analysis context: policy, borrowed parser state, and the symbol
//! cache for one analysis run.

use crate::ast::Ast;
use crate::config::Policy;
use crate::pp::Preprocessor;
use crate::source::{SourceLocation, SourceMap};
use crate::types::{FxIndexMap, MacroId, Symbol};

/// A macro name together with a particular definition of it.
///
/// Redefined macros are generally considered different symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinedMacro {
    pub name: String,
    pub definition: SourceLocation,
}

/// Append-only interning table for macro symbols.
///
/// Lookups with equal (name, definition-location) keys return the same
/// [`MacroId`]; distinct definition locations yield distinct ids even
/// under name equality.
#[derive(Default)]
pub struct SymbolCache {
    macros: Vec<DefinedMacro>,
    by_name: FxIndexMap<String, Vec<MacroId>>,
}

impl SymbolCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a macro definition and return its symbol.
    pub fn macro_symbol(&mut self, name: &str, definition: SourceLocation) -> Symbol {
        let ids = self.by_name.entry(name.to_string()).or_default();
        // Linear scan; we typically see ~1 definition per macro name.
        for &id in ids.iter() {
            if self.macros[id.0 as usize].definition == definition {
                return Symbol::Macro(id);
            }
        }
        let id = MacroId(self.macros.len() as u32);
        self.macros.push(DefinedMacro {
            name: name.to_string(),
            definition,
        });
        ids.push(id);
        Symbol::Macro(id)
    }

    pub fn defined_macro(&self, id: MacroId) -> &DefinedMacro {
        &self.macros[id.0 as usize]
    }
}

/// Bundles the policy, borrowed compiler state, and the symbol cache for
/// one analysis run.
///
/// The recorder hooks run before the context exists, borrowing the source
/// map and preprocessor per call; once parsing completes the driver
/// assembles the context, the recorder state freezes, and everything
/// downstream is read-only over it.
pub struct AnalysisContext<'a> {
    policy: Policy,
    source: &'a SourceMap,
    pp: &'a Preprocessor,
    cache: SymbolCache,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        policy: Policy,
        source: &'a SourceMap,
        pp: &'a Preprocessor,
        cache: SymbolCache,
    ) -> Self {
        AnalysisContext {
            policy,
            source,
            pp,
            cache,
        }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn source(&self) -> &SourceMap {
        self.source
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        self.pp
    }

    /// Intern a macro symbol. Drivers that discover macro references after
    /// parsing (e.g. by re-lexing the main file) use this to obtain
    /// symbols consistent with the recorded ones.
    pub fn macro_symbol(&mut self, name: &str, definition: SourceLocation) -> Symbol {
        self.cache.macro_symbol(name, definition)
    }

    pub fn defined_macro(&self, id: MacroId) -> &DefinedMacro {
        self.cache.defined_macro(id)
    }

    /// The symbol's user-visible name.
    pub fn symbol_name<'s>(&'s self, ast: &'s Ast, symbol: Symbol) -> &'s str {
        match symbol {
            Symbol::Declaration(d) => &ast.decl(d).name,
            Symbol::Macro(m) => &self.defined_macro(m).name,
        }
    }

    /// The symbol's node kind, as printed in diagnostics ("macro",
    /// "class", "function", ...).
    pub fn symbol_node_name(&self, ast: &Ast, symbol: Symbol) -> &'static str {
        match symbol {
            Symbol::Declaration(d) => ast.decl(d).kind.node_name(),
            Symbol::Macro(_) => "macro",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FileId;

    fn loc(file: FileId, offset: u32) -> SourceLocation {
        SourceLocation::File { file, offset }
    }

    #[test]
    fn test_macro_interning_is_stable() {
        let mut sm = SourceMap::new();
        let f = sm.add_file("a.h", "#define FOO 1\n#define FOO 2\n");
        let mut cache = SymbolCache::new();

        let first = cache.macro_symbol("FOO", loc(f, 8));
        let again = cache.macro_symbol("FOO", loc(f, 8));
        assert_eq!(first, again);
    }

    #[test]
    fn test_redefinition_is_a_distinct_symbol() {
        let mut sm = SourceMap::new();
        let f = sm.add_file("a.h", "#define FOO 1\n#define FOO 2\n");
        let mut cache = SymbolCache::new();

        let first = cache.macro_symbol("FOO", loc(f, 8));
        let second = cache.macro_symbol("FOO", loc(f, 22));
        assert_ne!(first, second);

        // Same location under a different name is also distinct.
        let other = cache.macro_symbol("BAR", loc(f, 8));
        assert_ne!(first, other);
    }
}
