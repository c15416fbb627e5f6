//! Editor integration: structured unused-include diagnostics.
//!
//! A one-shot entry point for language-server hosts: given a parsed
//! translation unit and the main file's text, produce one structured
//! diagnostic per unused include, each carrying the range of the directive
//! (from `#` to end of line), an unnecessary-code tag, and a single fix
//! that deletes the directive's line.

use anyhow::{Context as _, Result, bail};
use log::debug;
use serde::Serialize;

use crate::ast::Ast;
use crate::context::AnalysisContext;
use crate::diagnostics::{Severity, compute_used, may_consider_unused};
use crate::record::{RecordedAst, RecordedPp};
use crate::source::SourceLocation;

/// The source tag attached to every diagnostic this analyzer issues.
pub const SOURCE: &str = "include-sift";

/// A zero-based line/character position, in UTF-16 code units as language
/// servers count them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fix {
    pub message: String,
    pub edits: Vec<TextEdit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticTag {
    /// The range is unnecessary code; editors typically render it faded.
    Unnecessary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorDiagnostic {
    pub range: Range,
    pub message: String,
    pub severity: Severity,
    /// Identifies this analyzer to the host.
    pub source: &'static str,
    pub tags: Vec<DiagnosticTag>,
    pub fixes: Vec<Fix>,
}

fn offset_to_position(code: &str, offset: usize) -> Position {
    let before = &code[..offset];
    let line = before.bytes().filter(|&b| b == b'\n').count() as u32;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    Position {
        line,
        character: code[line_start..offset].encode_utf16().count() as u32,
    }
}

/// The range starting at `#` and ending at the end of line. Escaped
/// newlines are not handled.
fn directive_range(code: &str, hash_offset: usize) -> Range {
    let start = offset_to_position(code, hash_offset);
    let rest = &code[hash_offset..];
    let len = rest.find(['\n', '\r']).unwrap_or(rest.len());
    Range {
        start,
        end: Position {
            line: start.line,
            character: start.character + rest[..len].encode_utf16().count() as u32,
        },
    }
}

fn basename(spelled: &str) -> &str {
    spelled.rsplit('/').next().unwrap_or(spelled)
}

/// Produce unused-include diagnostics for one parsed translation unit.
///
/// `code` is the main file's text, used to compute diagnostic ranges; it
/// must match what was parsed. `analyze_stdlib` gates eligibility of
/// angle-bracket includes and is typically off in editors.
pub fn unused_include_diagnostics(
    ctx: &AnalysisContext,
    ast: &Ast,
    recorded_ast: &RecordedAst,
    recorded_pp: &RecordedPp,
    code: &str,
    analyze_stdlib: bool,
) -> Result<Vec<EditorDiagnostic>> {
    let used = compute_used(ctx, ast, recorded_ast, recorded_pp);
    let mut result = Vec::new();

    for (ordinal, include) in recorded_pp.includes.all().iter().enumerate() {
        if used.contains_key(&(ordinal as u32)) {
            debug!("{} is used", include.spelled);
            continue;
        }
        if !may_consider_unused(ctx, include, analyze_stdlib) {
            debug!(
                "{} was not used, but is not eligible to be diagnosed as unused",
                include.spelled
            );
            continue;
        }
        let SourceLocation::File { file, offset } = include.hash_location else {
            bail!("include {:?} has no main-file location", include.spelled);
        };
        if Some(file) != ctx.source().main_file() {
            bail!("include {:?} recorded outside the main file", include.spelled);
        }
        let offset = offset as usize;
        if offset >= code.len() {
            bail!(
                "include {:?} at offset {offset} lies outside the provided text",
                include.spelled
            );
        }
        let hash_line = include
            .line
            .checked_sub(1)
            .context("include has no line number")?;

        // Removing the directive can break the build if headers are only
        // reachable transitively through it, so the fix is advisory.
        result.push(EditorDiagnostic {
            range: directive_range(code, offset),
            message: format!("included header {} is not used", basename(&include.spelled)),
            severity: Severity::Warning,
            source: SOURCE,
            tags: vec![DiagnosticTag::Unnecessary],
            fixes: vec![Fix {
                message: "remove #include directive".to_string(),
                edits: vec![TextEdit {
                    range: Range {
                        start: Position {
                            line: hash_line,
                            character: 0,
                        },
                        end: Position {
                            line: hash_line + 1,
                            character: 0,
                        },
                    },
                    new_text: String::new(),
                }],
            }],
        });
    }
    Ok(result)
}
