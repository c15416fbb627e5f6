//! Finding the headers that provide a location.

use crate::analysis::Hinted;
use crate::context::AnalysisContext;
use crate::types::{Header, Location};

/// The includable header(s) that expose a location.
///
/// A physical location is expanded through macros and attributed to its
/// containing file; the main file and the predefines buffer get their own
/// never-diagnosable variants. A standard-library location maps to the
/// symbol's canonical header.
//
// TODO: if the file is not self-contained, find its umbrella header
// instead of returning the literal containing file.
pub(crate) fn includable_headers(ctx: &AnalysisContext, location: &Location) -> Vec<Hinted<Header>> {
    match location {
        Location::Physical(loc) => {
            let Some(file) = ctx.source().file_id(*loc) else {
                return Vec::new();
            };
            if Some(file) == ctx.source().main_file() {
                return vec![Hinted::new(Header::MainFile)];
            }
            if Some(file) == ctx.source().predefines() {
                return vec![Hinted::new(Header::Builtin)];
            }
            vec![Hinted::new(Header::Physical(file))]
        }
        Location::StandardLibrary(symbol) => {
            vec![Hinted::new(Header::StandardLibrary(symbol.header()))]
        }
    }
}
