//! Source-manager view consumed by the analyzer.
//!
//! The parser owns the real source manager; the analyzer only needs a small
//! set of primitives: file identity for a location, expansion vs. spelling
//! locations, 1-based line numbers, and the identities of the main file and
//! the compiler's predefines buffer. A driver populates a [`SourceMap`] with
//! exactly that information while parsing.

/// Identity of one physical file in the translation unit.
///
/// One id is registered per distinct file, so `FileId` doubles as the
/// file-entry identity used by include matching: two `#include`s resolving
/// to the same file carry the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(u32);

impl FileId {
    /// Returns the underlying u32 value of the id.
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Identity of one recorded macro expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpansionId(u32);

/// A point in the translation unit.
///
/// Locations inside macro expansions are represented separately from file
/// offsets; [`SourceMap::expansion_loc`] walks them back to the file
/// location where the expansion was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLocation {
    /// No location. Compiler builtins and implicit declarations carry this.
    Invalid,
    /// A byte offset into a registered file.
    File { file: FileId, offset: u32 },
    /// An offset into the token sequence produced by a macro expansion.
    Macro { expansion: ExpansionId, offset: u32 },
}

impl SourceLocation {
    pub fn is_valid(&self) -> bool {
        !matches!(self, SourceLocation::Invalid)
    }

    /// Is this location inside a macro expansion?
    pub fn is_macro_id(&self) -> bool {
        matches!(self, SourceLocation::Macro { .. })
    }

    /// The location `delta` bytes further along, staying in the same file
    /// or expansion.
    pub fn with_offset(self, delta: u32) -> SourceLocation {
        match self {
            SourceLocation::Invalid => SourceLocation::Invalid,
            SourceLocation::File { file, offset } => SourceLocation::File {
                file,
                offset: offset + delta,
            },
            SourceLocation::Macro { expansion, offset } => SourceLocation::Macro {
                expansion,
                offset: offset + delta,
            },
        }
    }
}

/// One macro expansion the preprocessor performed.
#[derive(Debug, Clone)]
pub struct Expansion {
    /// Where the expansion was written (the macro name at the use site).
    pub use_site: SourceLocation,
    /// Where the expanded tokens were spelled: the macro body, or for a
    /// macro-argument expansion the argument text at the call site.
    pub spelling: SourceLocation,
    /// True when this expansion substitutes a macro argument rather than a
    /// macro body.
    pub is_macro_arg: bool,
}

struct SourceFile {
    name: String,
    text: String,
    /// Byte offset of the start of each line.
    line_starts: Vec<u32>,
}

/// The registry of files and expansions making up one translation unit.
#[derive(Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
    expansions: Vec<Expansion>,
    main_file: Option<FileId>,
    predefines: Option<FileId>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file and its contents, returning its identity.
    pub fn add_file(&mut self, name: impl Into<String>, text: impl Into<String>) -> FileId {
        let text = text.into();
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        let id = FileId(self.files.len() as u32);
        self.files.push(SourceFile {
            name: name.into(),
            text,
            line_starts,
        });
        id
    }

    /// Mark the translation unit's primary file.
    pub fn set_main_file(&mut self, file: FileId) {
        self.main_file = Some(file);
    }

    /// Mark the compiler's predefines buffer.
    pub fn set_predefines(&mut self, file: FileId) {
        self.predefines = Some(file);
    }

    pub fn main_file(&self) -> Option<FileId> {
        self.main_file
    }

    pub fn predefines(&self) -> Option<FileId> {
        self.predefines
    }

    /// Record a macro expansion, returning its identity for locations
    /// spelled inside it.
    pub fn add_expansion(
        &mut self,
        use_site: SourceLocation,
        spelling: SourceLocation,
        is_macro_arg: bool,
    ) -> ExpansionId {
        let id = ExpansionId(self.expansions.len() as u32);
        self.expansions.push(Expansion {
            use_site,
            spelling,
            is_macro_arg,
        });
        id
    }

    pub fn expansion(&self, id: ExpansionId) -> &Expansion {
        &self.expansions[id.0 as usize]
    }

    /// Walk a location out of any macro expansions to the file location
    /// where the outermost expansion was written.
    pub fn expansion_loc(&self, mut loc: SourceLocation) -> SourceLocation {
        while let SourceLocation::Macro { expansion, .. } = loc {
            loc = self.expansion(expansion).use_site;
        }
        loc
    }

    /// The file containing a location, after expanding through macros.
    pub fn file_id(&self, loc: SourceLocation) -> Option<FileId> {
        match self.expansion_loc(loc) {
            SourceLocation::File { file, .. } => Some(file),
            _ => None,
        }
    }

    /// 1-based line number of a location, after expanding through macros.
    pub fn line_number(&self, loc: SourceLocation) -> Option<u32> {
        let SourceLocation::File { file, offset } = self.expansion_loc(loc) else {
            return None;
        };
        let starts = &self.files[file.as_u32() as usize].line_starts;
        Some(starts.partition_point(|&s| s <= offset) as u32)
    }

    /// Does this location (expanded through macros) lie in the main file?
    pub fn is_in_main_file(&self, loc: SourceLocation) -> bool {
        self.main_file.is_some() && self.file_id(loc) == self.main_file
    }

    pub fn file_name(&self, file: FileId) -> &str {
        &self.files[file.as_u32() as usize].name
    }

    pub fn file_text(&self, file: FileId) -> &str {
        &self.files[file.as_u32() as usize].text
    }

    /// The file's base name without directories or extension, used for the
    /// name-match ranking hint ("foo" for "include/foo.h").
    pub fn file_stem(&self, file: FileId) -> &str {
        let name = self.file_name(file);
        let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
        base.split_once('.').map_or(base, |(stem, _)| stem)
    }
}
