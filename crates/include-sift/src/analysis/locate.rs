//! Finding the locations where a symbol is provided.

use crate::analysis::{Hint, Hinted};
use crate::ast::{Ast, Decl, DeclId, DeclKind};
use crate::context::AnalysisContext;
use crate::stdlib;
use crate::types::{Location, MacroId};

/// The hint a redeclaration contributes to its location: a definition of a
/// tag or template provides the complete type, which is what most uses
/// need.
fn decl_hint(decl: &Decl) -> Hint {
    match decl.kind {
        DeclKind::Record(_) | DeclKind::ClassTemplate | DeclKind::FunctionTemplate
            if decl.is_definition =>
        {
            Hint::COMPLETE
        }
        _ => Hint::NONE,
    }
}

/// Find the locations where a declaration is provided.
///
/// A declaration the standard-library recognizer knows is provided at its
/// logical stdlib location and nowhere else; the concrete file it was
/// parsed from is irrelevant. Otherwise every redeclaration with a valid
/// location counts, except `friend` declarations, which do not act as
/// forward declarations.
pub(crate) fn locate_decl(ast: &Ast, id: DeclId) -> Vec<Hinted<Location>> {
    if let Some(symbol) = stdlib::recognize(ast, id) {
        return vec![Hinted::new(Location::StandardLibrary(symbol))];
    }

    let mut result = Vec::new();
    for &redecl in ast.redeclarations(id) {
        let decl = ast.decl(redecl);
        if decl.is_friend {
            continue;
        }
        if decl.location.is_valid() {
            result.push(Hinted::with_hint(
                Location::Physical(decl.location),
                decl_hint(decl),
            ));
        }
    }
    result
}

/// Find the location where a macro is provided: its definition.
pub(crate) fn locate_macro(ctx: &AnalysisContext, id: MacroId) -> Hinted<Location> {
    Hinted::new(Location::Physical(ctx.defined_macro(id).definition))
}
