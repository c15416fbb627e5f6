//! Shared sum types for used-symbol analysis.
//!
//! Finding referenced headers is mostly a matter of translating
//!
//! ```text
//! AST node => declaration => source location => file
//! ```
//!
//! but there are special cases: macros are not declarations, and the
//! concrete file a standard-library symbol was parsed from doesn't matter.
//! The slightly more abstract sum types here handle those cases while
//! keeping the rest of the crate on plain pattern matching: [`Symbol`] is
//! declaration-or-macro, [`Location`] is physical-or-stdlib, and
//! [`Header`] covers everything an include directive can satisfy.

use std::hash::BuildHasherDefault;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHasher;

use crate::ast::DeclId;
use crate::source::{FileId, SourceLocation, SourceMap};
use crate::stdlib::{StdHeader, StdSymbol};

/// An `IndexMap` with a deterministic, fast hasher; used wherever
/// insertion order is observable.
pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;
/// An `IndexSet` with a deterministic, fast hasher.
pub type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;

/// Identifies a macro symbol interned in the symbol cache.
///
/// Redefinitions of a macro under the same name intern to distinct ids, so
/// id equality is (name, definition-location) equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacroId(pub(crate) u32);

/// An entity that can be referenced: a named declaration or a macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// A named declaration, identified by its canonical declaration.
    Declaration(DeclId),
    /// A macro, identified by a particular definition of its name.
    Macro(MacroId),
}

/// A usage of a [`Symbol`] seen in the source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolReference {
    /// The point in the code where the reference occurred.
    pub location: SourceLocation,
    pub target: Symbol,
}

/// A place where a symbol can be provided: a physical part of the
/// translation unit, or a logical location in the standard library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Physical(SourceLocation),
    StandardLibrary(StdSymbol),
}

impl Location {
    /// Debug-friendly rendering for logs and tests.
    pub fn name(&self, sm: &SourceMap) -> String {
        match self {
            Location::Physical(loc) => match sm.file_id(*loc) {
                Some(file) => match sm.line_number(*loc) {
                    Some(line) => format!("{}:{line}", sm.file_name(file)),
                    None => sm.file_name(file).to_string(),
                },
                None => "<invalid>".to_string(),
            },
            Location::StandardLibrary(sym) => sym.name().to_string(),
        }
    }
}

/// An includable unit that can provide access to [`Location`]s.
///
/// The derived order is the deduplication order used by the ranker:
/// variants first, then payload.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Header {
    /// A concrete file in the translation unit.
    Physical(FileId),
    /// A logical standard-library header such as `<vector>`.
    StandardLibrary(StdHeader),
    /// A textual spelling to be matched or emitted as-is.
    Verbatim(String),
    /// The compiler's predefines region; never diagnosable.
    Builtin,
    /// The translation unit's own primary file; never diagnosable.
    MainFile,
}

impl Header {
    /// User-visible name, as printed in diagnostics.
    pub fn name(&self, sm: &SourceMap) -> String {
        match self {
            Header::Physical(file) => sm.file_name(*file).to_string(),
            Header::StandardLibrary(h) => h.name().to_string(),
            Header::Verbatim(spelling) => spelling.clone(),
            Header::Builtin => "<built-in>".to_string(),
            Header::MainFile => "<main-file>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    fn stdlib_header(name: &str) -> Header {
        Header::StandardLibrary(StdHeader::named(name).expect("known header"))
    }

    #[test]
    fn test_header_equality() {
        let mut sm = SourceMap::new();
        let a = sm.add_file("a.h", "");
        let b = sm.add_file("b.h", "");

        assert_eq!(Header::Physical(a), Header::Physical(a));
        assert_ne!(Header::Physical(a), Header::Physical(b));
        assert_eq!(stdlib_header("<vector>"), stdlib_header("<vector>"));
        assert_ne!(stdlib_header("<vector>"), stdlib_header("<string>"));
        assert_eq!(
            Header::Verbatim("foo.h".to_string()),
            Header::Verbatim("foo.h".to_string())
        );
        assert_eq!(Header::Builtin, Header::Builtin);
        assert_eq!(Header::MainFile, Header::MainFile);
        assert_ne!(Header::Builtin, Header::MainFile);
        // Kind mismatch is never equal, whatever the payload.
        assert_ne!(Header::Physical(a), Header::Verbatim("a.h".to_string()));
    }

    #[test]
    fn test_header_order_groups_variants() {
        let mut sm = SourceMap::new();
        let a = sm.add_file("a.h", "");

        let mut headers = vec![
            Header::MainFile,
            Header::Verbatim("z.h".to_string()),
            stdlib_header("<vector>"),
            Header::Builtin,
            Header::Physical(a),
            Header::Verbatim("a.h".to_string()),
        ];
        headers.sort();
        assert_eq!(
            headers,
            vec![
                Header::Physical(a),
                stdlib_header("<vector>"),
                Header::Verbatim("a.h".to_string()),
                Header::Verbatim("z.h".to_string()),
                Header::Builtin,
                Header::MainFile,
            ]
        );
    }

    #[test]
    fn test_equal_headers_hash_alike() {
        let mut set = FxHashSet::default();
        set.insert(Header::Verbatim("foo.h".to_string()));
        set.insert(Header::Verbatim("foo.h".to_string()));
        set.insert(stdlib_header("<vector>"));
        set.insert(stdlib_header("<vector>"));
        set.insert(Header::Builtin);
        set.insert(Header::Builtin);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_header_names() {
        let mut sm = SourceMap::new();
        let a = sm.add_file("include/a.h", "");
        assert_eq!(Header::Physical(a).name(&sm), "include/a.h");
        assert_eq!(stdlib_header("<vector>").name(&sm), "<vector>");
        assert_eq!(Header::Verbatim("foo/bar.h".into()).name(&sm), "foo/bar.h");
        assert_eq!(Header::Builtin.name(&sm), "<built-in>");
        assert_eq!(Header::MainFile.name(&sm), "<main-file>");
    }
}
