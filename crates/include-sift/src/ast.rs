//! Borrowed AST view consumed by the analyzer.
//!
//! The parser owns the real AST; a driver mirrors the subtrees rooted at
//! the main file's top-level declarations into an [`Ast`] arena. The shape
//! is deliberately small: declarations carry just enough to resolve
//! references to provider locations, and [`AstNode`] covers exactly the
//! node categories the walker dispatches on.

use rustc_hash::FxHashMap;

use crate::source::SourceLocation;

/// Handle to a declaration in the [`Ast`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclId(u32);

impl DeclId {
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Tag of a record-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Struct,
    Class,
    Union,
    Enum,
}

/// What kind of named declaration this is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    Function,
    /// A member function. Semantically nested even when its definition is
    /// written at file scope.
    Method,
    Record(TagKind),
    Variable,
    Field,
    EnumConstant,
    Typedef,
    TypeAlias,
    /// A using-declaration, with the declarations it names as targets.
    Using { targets: Vec<DeclId> },
    ClassTemplate,
    FunctionTemplate,
    Namespace,
}

impl DeclKind {
    /// User-visible node kind, as printed in diagnostics.
    pub fn node_name(&self) -> &'static str {
        match self {
            DeclKind::Function => "function",
            DeclKind::Method => "method",
            DeclKind::Record(TagKind::Struct) => "struct",
            DeclKind::Record(TagKind::Class) => "class",
            DeclKind::Record(TagKind::Union) => "union",
            DeclKind::Record(TagKind::Enum) => "enum",
            DeclKind::Variable => "variable",
            DeclKind::Field => "field",
            DeclKind::EnumConstant => "enumerator",
            DeclKind::Typedef => "typedef",
            DeclKind::TypeAlias => "type alias",
            DeclKind::Using { .. } => "using declaration",
            DeclKind::ClassTemplate => "class template",
            DeclKind::FunctionTemplate => "function template",
            DeclKind::Namespace => "namespace",
        }
    }
}

/// One (re)declaration of a named entity.
#[derive(Debug, Clone)]
pub struct Decl {
    pub name: String,
    /// Enclosing namespace path, e.g. `std` for `std::vector`.
    pub scope: Option<String>,
    pub kind: DeclKind,
    /// Location of the declared name.
    pub location: SourceLocation,
    /// The first declaration of this entity; `None` when this declaration
    /// is itself canonical.
    pub canonical: Option<DeclId>,
    /// Is this redeclaration the definition?
    pub is_definition: bool,
    /// Declared only as a `friend`; not a forward declaration for provider
    /// purposes.
    pub is_friend: bool,
    /// An implicit template instantiation (function, class, or variable).
    pub is_implicit_instantiation: bool,
    /// The declaration's subtree: initializers, bodies, written types.
    pub children: Vec<AstNode>,
}

impl Decl {
    pub fn new(name: impl Into<String>, kind: DeclKind, location: SourceLocation) -> Self {
        Decl {
            name: name.into(),
            scope: None,
            kind,
            location,
            canonical: None,
            is_definition: false,
            is_friend: false,
            is_implicit_instantiation: false,
            children: Vec::new(),
        }
    }

    /// Is this a function declared with operator syntax (`operator==`,
    /// `operator bool`, `operator""_s`)?
    pub fn is_overloaded_operator(&self) -> bool {
        matches!(self.kind, DeclKind::Function | DeclKind::Method)
            && self
                .name
                .strip_prefix("operator")
                .and_then(|rest| rest.chars().next())
                .is_some_and(|c| !c.is_alphanumeric() && c != '_')
    }
}

/// The referenced declaration inside a type, shared between written and
/// unwritten type trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// A class/struct/union/enum type.
    Tag(DeclId),
    /// A template specialization names both the primary template and, when
    /// the specialization has been materialized, the specialized record.
    TemplateSpecialization {
        primary: DeclId,
        specialized: Option<DeclId>,
    },
    /// A type found through a using-declaration.
    Using { found: DeclId },
    /// A typedef-name.
    Typedef(DeclId),
    /// Builtin types and sugar with no referenced declaration.
    None,
}

/// A written type, carrying the location where it begins. Lexically nested
/// written types (template arguments, pointee types) carry their own
/// locations.
#[derive(Debug, Clone)]
pub struct TypeLoc {
    pub location: SourceLocation,
    pub ty: TypeRef,
    pub nested: Vec<TypeLoc>,
}

/// An unwritten type (e.g. the type of an implicit construction); no
/// location of its own.
#[derive(Debug, Clone)]
pub struct TypeNode {
    pub ty: TypeRef,
    pub nested: Vec<TypeNode>,
}

/// A traversable node in a declaration's subtree.
#[derive(Debug, Clone)]
pub enum AstNode {
    /// A direct reference to a named declaration.
    DeclRef {
        location: SourceLocation,
        decl: DeclId,
    },
    /// A member access; `location` is the member-name location.
    Member {
        location: SourceLocation,
        member: DeclId,
        base: Box<AstNode>,
    },
    /// An unresolved overload set.
    Overload {
        location: SourceLocation,
        candidates: Vec<DeclId>,
        /// An unresolved *member* lookup, gated by the members policy.
        is_member: bool,
        children: Vec<AstNode>,
    },
    /// A constructor call whose type is not written at the call site.
    Construct {
        location: SourceLocation,
        ty: TypeNode,
        args: Vec<AstNode>,
    },
    /// A written type occurrence.
    Type(TypeLoc),
    /// A declaration nested in the subtree (local classes, using
    /// declarations inside bodies).
    Decl(DeclId),
    /// Any other syntax; traversal continues into the children.
    Other(Vec<AstNode>),
}

/// Arena of declarations mirrored from the parser.
#[derive(Default)]
pub struct Ast {
    decls: Vec<Decl>,
    /// Redeclaration groups, keyed by canonical declaration, in
    /// declaration order.
    redecls: FxHashMap<DeclId, Vec<DeclId>>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_decl(&mut self, decl: Decl) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        let canonical = decl.canonical.unwrap_or(id);
        self.decls.push(decl);
        self.redecls.entry(canonical).or_default().push(id);
        id
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.as_u32() as usize]
    }

    /// The canonical declaration identifying this entity; redeclarations
    /// unify through it.
    pub fn canonical(&self, id: DeclId) -> DeclId {
        self.decl(id).canonical.unwrap_or(id)
    }

    /// All redeclarations of the entity, in declaration order.
    pub fn redeclarations(&self, id: DeclId) -> &[DeclId] {
        self.redecls
            .get(&self.canonical(id))
            .map_or(&[], |group| group.as_slice())
    }

    /// `scope::name`, the form the standard-library recognizer matches.
    pub fn qualified_name(&self, id: DeclId) -> String {
        let d = self.decl(id);
        match &d.scope {
            Some(scope) => format!("{scope}::{}", d.name),
            None => d.name.clone(),
        }
    }
}
