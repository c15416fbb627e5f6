//! Include-usage analysis for C/C++ translation units.
//!
//! Given the artifacts of a parse (a preprocessor event stream and an AST
//! rooted in the main file), this crate decides, for every `#include`
//! written in the main file, whether the directive is used: whether some
//! symbol textually referenced from the main file is provided by a header
//! the directive satisfies. The resolution chain is
//!
//! ```text
//! AST node => referenced symbol => provider location => includable header
//!          => matched directive
//! ```
//!
//! The parser and preprocessor themselves are external collaborators; a
//! driver feeds the [`record`] hooks during parsing and then invokes
//! [`analysis::walk_used`] (or one of the diagnostic adapters in
//! [`diagnostics`] and [`editor`]) over the frozen recorder state.

pub mod analysis;
pub mod ast;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod editor;
pub mod pp;
pub mod record;
pub mod source;
pub mod stdlib;
pub mod types;
