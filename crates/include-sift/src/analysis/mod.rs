//! Used-symbol analysis: find and report all references to symbols in a
//! region of code.
//!
//! The headers providing a reference are found by chaining smaller
//! mappings, each in its own submodule:
//!
//! ```text
//! AST => AST node => Symbol => Location => Header
//!                   /
//! macro expansion =>
//! ```

mod headers;
mod locate;
mod walk;

use std::ops::{BitOr, BitOrAssign};

use crate::ast::{Ast, DeclId};
use crate::context::AnalysisContext;
use crate::source::{SourceLocation, SourceMap};
use crate::types::{Header, Symbol, SymbolReference};

pub(crate) use headers::includable_headers;
pub(crate) use locate::{locate_decl, locate_macro};
pub(crate) use walk::walk_ast;

/// Advisory ranking bits. Hints never affect which headers are candidates,
/// only their preference order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Hint(u8);

impl Hint {
    pub const NONE: Hint = Hint(0);
    /// Provides a complete definition that is often needed, e.g. classes
    /// and templates.
    pub const COMPLETE: Hint = Hint(1);
    /// Header name matches the symbol name.
    pub const NAME_MATCH: Hint = Hint(2);

    pub fn contains(self, other: Hint) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Hint {
    type Output = Hint;
    fn bitor(self, rhs: Hint) -> Hint {
        Hint(self.0 | rhs.0)
    }
}

impl BitOrAssign for Hint {
    fn bitor_assign(&mut self, rhs: Hint) {
        self.0 |= rhs.0;
    }
}

/// A value with its accumulated ranking hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Hinted<T> {
    pub value: T,
    pub hint: Hint,
}

impl<T> Hinted<T> {
    pub fn new(value: T) -> Self {
        Hinted {
            value,
            hint: Hint::NONE,
        }
    }

    pub fn with_hint(value: T, hint: Hint) -> Self {
        Hinted { value, hint }
    }
}

fn add_hint(hint: Hint, items: &mut [Hinted<Header>]) {
    for item in items {
        item.hint |= hint;
    }
}

/// Add the name-match hint to physical candidates whose file stem equals
/// the referenced identifier, compared case-insensitively.
fn add_name_match_hint(sm: &SourceMap, name: &str, items: &mut [Hinted<Header>]) {
    if name.is_empty() {
        return;
    }
    for item in items {
        if let Header::Physical(file) = &item.value
            && sm.file_stem(*file).eq_ignore_ascii_case(name)
        {
            item.hint |= Hint::NAME_MATCH;
        }
    }
}

/// Dedupe and order candidate headers; the first entry of the result is
/// the preferred provider.
fn rank(mut candidates: Vec<Hinted<Header>>) -> Vec<Header> {
    // Sort by header so duplicates are adjacent and can be folded,
    // OR-combining their hints.
    candidates.sort_by(|l, r| l.value.cmp(&r.value));
    let mut deduped: Vec<Hinted<Header>> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if let Some(last) = deduped.last_mut()
            && last.value == candidate.value
        {
            last.hint |= candidate.hint;
            continue;
        }
        deduped.push(candidate);
    }
    // Now sort by hint preference; stability preserves insertion order on
    // ties.
    deduped.sort_by_key(|h| {
        std::cmp::Reverse((
            h.hint.contains(Hint::NAME_MATCH),
            h.hint.contains(Hint::COMPLETE),
        ))
    });
    deduped.into_iter().map(|h| h.value).collect()
}

fn headers_for_decl(ctx: &AnalysisContext, ast: &Ast, decl: Hinted<DeclId>) -> Vec<Header> {
    let mut headers = Vec::new();
    for location in locate_decl(ast, decl.value) {
        let mut candidates = includable_headers(ctx, &location.value);
        add_hint(location.hint, &mut candidates);
        headers.append(&mut candidates);
    }
    add_hint(decl.hint, &mut headers);
    add_name_match_hint(ctx.source(), &ast.decl(decl.value).name, &mut headers);
    rank(headers)
}

/// Find and report all references to symbols in a region of code.
///
/// The AST traversal is rooted at `ast_roots` - typically the top-level
/// declarations of a single source file. `macro_refs` are additional
/// recorded references to macros, which do not appear in the AST.
///
/// The visitor is called exactly once per reference, in traversal order
/// for declarations and then recorded order for macros. The first header
/// of each reported list is the preferred provider. Matching headers
/// against `#include` directives is not done here; see
/// [`crate::record::RecordedIncludes::match_header`].
pub fn walk_used(
    ctx: &AnalysisContext,
    ast: &Ast,
    ast_roots: &[DeclId],
    macro_refs: &[SymbolReference],
    mut visit: impl FnMut(SourceLocation, Symbol, &[Header]),
) {
    for &root in ast_roots {
        walk_ast(ctx, ast, root, &mut |ref_loc, decl| {
            let headers = headers_for_decl(ctx, ast, decl);
            visit(ref_loc, Symbol::Declaration(decl.value), &headers);
        });
    }
    for macro_ref in macro_refs {
        let Symbol::Macro(id) = macro_ref.target else {
            debug_assert!(false, "macro reference to a non-macro symbol");
            continue;
        };
        let location = locate_macro(ctx, id);
        let mut candidates = includable_headers(ctx, &location.value);
        add_hint(location.hint, &mut candidates);
        add_name_match_hint(ctx.source(), &ctx.defined_macro(id).name, &mut candidates);
        visit(macro_ref.location, macro_ref.target, &rank(candidates));
    }
}
