//! User-facing diagnostics for the standalone tool shell.
//!
//! Scans the recorded references and headers providing them:
//! - a reference satisfied only by headers that match no `#include` in the
//!   main file violates the policy and is reported unsatisfied;
//! - an `#include` that satisfies no reference is reported unused, with a
//!   suggested edit deleting the directive's line.
//!
//! With [`DiagnosticOptions::show_satisfied`] set, things that were fine
//! are reported too: satisfied references and used includes.

use log::debug;
use serde::Serialize;

use crate::analysis::walk_used;
use crate::ast::Ast;
use crate::config::DiagnosticOptions;
use crate::context::AnalysisContext;
use crate::record::{Include, RecordedAst, RecordedIncludes, RecordedPp};
use crate::source::SourceLocation;
use crate::stdlib::StdHeader;
use crate::types::{FxIndexMap, FxIndexSet, Header, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Note,
    Remark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A reference whose provider matches some `#include` (or needs none).
    SatisfiedReference,
    /// No header included for a referenced symbol.
    UnsatisfiedReference,
    /// The symbol was located but no includable header provides it.
    UnknownHeader,
    /// "provided by" note attached to an unsatisfied reference.
    ProvidedBy,
    /// An include some reference needs.
    UsedInclude,
    /// An include no reference needs.
    UnusedInclude,
}

/// A suggested edit replacing lines `[start_line, end_line)` (1-based,
/// from column 1 to column 1) with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start_line: u32,
    pub end_line: u32,
    pub new_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub location: SourceLocation,
    pub message: String,
    pub fix: Option<Edit>,
}

/// Which include ordinals are used, and for each the first symbol that
/// used it (for "include provides ..." reporting).
pub type UsedIncludes = FxIndexMap<u32, Symbol>;

/// Mark the includes satisfying one reference as used.
///
/// Headers are tried in ranked order; the first header with any matching
/// directive attributes the reference, and every directive matching that
/// header (duplicates included) is marked. Later candidates are left
/// alone, so a worse provider that happens to also be included stays
/// eligible for the unused report. Returns the attributed ordinal.
fn attribute_reference(
    includes: &RecordedIncludes,
    headers: &[Header],
    symbol: Symbol,
    used: &mut UsedIncludes,
) -> Option<u32> {
    for header in headers {
        let matched = includes.match_header(header);
        let Some(&first) = matched.first() else {
            continue;
        };
        for ordinal in matched {
            used.entry(ordinal).or_insert(symbol);
        }
        return Some(first);
    }
    None
}

/// Run the analysis and decide which main-file includes are used.
pub fn compute_used(
    ctx: &AnalysisContext,
    ast: &Ast,
    recorded_ast: &RecordedAst,
    recorded_pp: &RecordedPp,
) -> UsedIncludes {
    let mut used = UsedIncludes::default();
    walk_used(
        ctx,
        ast,
        &recorded_ast.top_level_decls,
        &recorded_pp.macro_references,
        |_, symbol, headers| {
            attribute_reference(&recorded_pp.includes, headers, symbol, &mut used);
        },
    );
    used
}

/// Is this include eligible for the unused report?
///
/// Keep-annotated directives are the author's decision. Angle-bracket
/// includes are opaque unless stdlib analysis is on and the spelling is a
/// recognized standard header. Headers without include guards may have
/// side effects by design.
pub fn may_consider_unused(
    ctx: &AnalysisContext,
    include: &Include,
    analyze_stdlib: bool,
) -> bool {
    if include.keep {
        return false;
    }
    if include.angled {
        return analyze_stdlib && StdHeader::named(&format!("<{}>", include.spelled)).is_some();
    }
    match include.resolved {
        Some(file) => {
            if ctx.preprocessor().is_self_contained(file) {
                true
            } else {
                debug!(
                    "{} has no include guard and will not be considered unused",
                    include.spelled
                );
                false
            }
        }
        // Unresolved includes point at code that failed to parse anyway.
        None => false,
    }
}

fn delete_line_fix(include: &Include) -> Option<Edit> {
    (include.line > 0).then(|| Edit {
        start_line: include.line,
        end_line: include.line + 1,
        new_text: String::new(),
    })
}

/// Produce the full diagnostic stream for one analyzed translation unit.
///
/// Every reference is processed independently; no condition aborts the
/// analysis of the others. Running this twice over the same frozen state
/// yields identical diagnostics.
pub fn diagnose(
    ctx: &AnalysisContext,
    ast: &Ast,
    recorded_ast: &RecordedAst,
    recorded_pp: &RecordedPp,
    opts: &DiagnosticOptions,
) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let mut used = UsedIncludes::default();
    let mut recovered: FxIndexSet<Header> = FxIndexSet::default();

    walk_used(
        ctx,
        ast,
        &recorded_ast.top_level_decls,
        &recorded_pp.macro_references,
        |loc, symbol, headers| {
            diagnose_reference(
                ctx,
                ast,
                recorded_pp,
                opts,
                loc,
                symbol,
                headers,
                &mut recovered,
                &mut used,
                &mut diags,
            );
        },
    );

    for (ordinal, include) in recorded_pp.includes.all().iter().enumerate() {
        match used.get(&(ordinal as u32)) {
            Some(&symbol) => {
                if opts.show_satisfied {
                    diags.push(Diagnostic {
                        kind: DiagnosticKind::UsedInclude,
                        severity: Severity::Remark,
                        location: include.hash_location,
                        message: format!(
                            "include provides {} '{}'",
                            ctx.symbol_node_name(ast, symbol),
                            ctx.symbol_name(ast, symbol)
                        ),
                        fix: None,
                    });
                }
            }
            None => {
                if may_consider_unused(ctx, include, opts.analyze_stdlib) {
                    diags.push(Diagnostic {
                        kind: DiagnosticKind::UnusedInclude,
                        severity: Severity::Error,
                        location: include.hash_location,
                        message: "include is unused".to_string(),
                        fix: delete_line_fix(include),
                    });
                } else {
                    debug!(
                        "{} was not used, but is not eligible to be diagnosed as unused",
                        include.spelled
                    );
                }
            }
        }
    }

    diags
}

#[allow(clippy::too_many_arguments)]
fn diagnose_reference(
    ctx: &AnalysisContext,
    ast: &Ast,
    recorded_pp: &RecordedPp,
    opts: &DiagnosticOptions,
    loc: SourceLocation,
    symbol: Symbol,
    headers: &[Header],
    recovered: &mut FxIndexSet<Header>,
    used: &mut UsedIncludes,
    diags: &mut Vec<Diagnostic>,
) {
    let satisfied = |provider: String| Diagnostic {
        kind: DiagnosticKind::SatisfiedReference,
        severity: Severity::Remark,
        location: loc,
        message: format!(
            "{} '{}' provided by {}",
            ctx.symbol_node_name(ast, symbol),
            ctx.symbol_name(ast, symbol),
            provider
        ),
        fix: None,
    };

    // References into the main file or the predefines need no directive.
    let self_satisfied = headers
        .iter()
        .find(|h| matches!(h, Header::Builtin | Header::MainFile));
    let attributed = attribute_reference(&recorded_pp.includes, headers, symbol, used);

    if let Some(ordinal) = attributed {
        if opts.show_satisfied {
            let spelled = &recorded_pp.includes.all()[ordinal as usize].spelled;
            diags.push(satisfied(spelled.clone()));
        }
        return;
    }
    if let Some(header) = self_satisfied {
        if opts.show_satisfied {
            diags.push(satisfied(header.name(ctx.source())));
        }
        return;
    }
    if opts.recover {
        for header in headers {
            if recovered.contains(header) {
                if opts.show_satisfied {
                    diags.push(satisfied(header.name(ctx.source())));
                }
                return;
            }
        }
    }

    if headers.is_empty() {
        diags.push(Diagnostic {
            kind: DiagnosticKind::UnknownHeader,
            severity: Severity::Warning,
            location: loc,
            message: format!(
                "unknown header provides {} '{}'",
                ctx.symbol_node_name(ast, symbol),
                ctx.symbol_name(ast, symbol)
            ),
            fix: None,
        });
    } else {
        diags.push(Diagnostic {
            kind: DiagnosticKind::UnsatisfiedReference,
            severity: Severity::Error,
            location: loc,
            message: format!(
                "no header included for {} '{}'",
                ctx.symbol_node_name(ast, symbol),
                ctx.symbol_name(ast, symbol)
            ),
            fix: None,
        });
    }
    for header in headers {
        recovered.insert(header.clone());
        diags.push(Diagnostic {
            kind: DiagnosticKind::ProvidedBy,
            severity: Severity::Note,
            location: loc,
            message: format!("provided by {}", header.name(ctx.source())),
            fix: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Policy;
    use crate::context::SymbolCache;
    use crate::pp::Preprocessor;
    use crate::source::{FileId, SourceMap};

    fn include(spelled: &str, angled: bool, resolved: Option<FileId>, keep: bool) -> Include {
        Include {
            spelled: spelled.to_string(),
            resolved,
            hash_location: SourceLocation::Invalid,
            line: 1,
            angled,
            keep,
        }
    }

    #[test]
    fn test_keep_annotation_is_never_unused() {
        let sm = SourceMap::new();
        let pp = Preprocessor::new();
        let ctx = AnalysisContext::new(Policy::default(), &sm, &pp, SymbolCache::new());
        assert!(!may_consider_unused(&ctx, &include("a.h", false, None, true), true));
    }

    #[test]
    fn test_angled_includes_need_stdlib_analysis() {
        let sm = SourceMap::new();
        let pp = Preprocessor::new();
        let ctx = AnalysisContext::new(Policy::default(), &sm, &pp, SymbolCache::new());

        let vector = include("vector", true, None, false);
        assert!(may_consider_unused(&ctx, &vector, true));
        assert!(!may_consider_unused(&ctx, &vector, false));

        // Not a recognized standard header, whatever the flag says.
        let custom = include("sys/custom.h", true, None, false);
        assert!(!may_consider_unused(&ctx, &custom, true));
    }

    #[test]
    fn test_unguarded_headers_are_never_unused() {
        let mut sm = SourceMap::new();
        let guarded = sm.add_file("guarded.h", "");
        let unguarded = sm.add_file("unguarded.def", "");
        let mut pp = Preprocessor::new();
        pp.set_self_contained(guarded);
        let ctx = AnalysisContext::new(Policy::default(), &sm, &pp, SymbolCache::new());

        assert!(may_consider_unused(
            &ctx,
            &include("guarded.h", false, Some(guarded), false),
            false
        ));
        assert!(!may_consider_unused(
            &ctx,
            &include("unguarded.def", false, Some(unguarded), false),
            false
        ));
        // An include the preprocessor never resolved is not diagnosable.
        assert!(!may_consider_unused(&ctx, &include("missing.h", false, None, false), false));
    }
}
