//! Traversal of a declaration subtree, reporting referenced declarations.

use crate::analysis::Hinted;
use crate::ast::{Ast, AstNode, DeclId, DeclKind, TypeLoc, TypeNode, TypeRef};
use crate::context::AnalysisContext;
use crate::source::SourceLocation;

/// Traverse one top-level declaration, reporting each (use-location,
/// referenced declaration) pair. Reported declarations are canonical, so
/// redeclarations unify.
pub(crate) fn walk_ast(
    ctx: &AnalysisContext,
    ast: &Ast,
    root: DeclId,
    callback: &mut dyn FnMut(SourceLocation, Hinted<DeclId>),
) {
    AstWalker {
        ctx,
        ast,
        callback,
        location_of_type: SourceLocation::Invalid,
    }
    .traverse_decl(root);
}

struct AstWalker<'a, 'cb> {
    ctx: &'a AnalysisContext<'a>,
    ast: &'a Ast,
    callback: &'cb mut dyn FnMut(SourceLocation, Hinted<DeclId>),
    /// Location of the nearest enclosing written type; consumed by the
    /// type references below it, which have no token of their own.
    location_of_type: SourceLocation,
}

impl AstWalker<'_, '_> {
    fn traverse_decl(&mut self, id: DeclId) {
        let decl = self.ast.decl(id);
        match &decl.kind {
            // A function definition counts as a reference to its earlier
            // declaration.
            DeclKind::Function | DeclKind::Method if decl.is_definition => {
                let canonical = self.ast.canonical(id);
                if canonical != id {
                    self.report(decl.location, canonical);
                }
            }
            DeclKind::Using { targets } => {
                for &target in targets {
                    self.report(decl.location, target);
                }
            }
            _ => {}
        }
        for child in &decl.children {
            self.traverse_node(child);
        }
    }

    fn traverse_node(&mut self, node: &AstNode) {
        match node {
            AstNode::DeclRef { location, decl } => {
                if !self.ctx.policy().operators && self.ast.decl(*decl).is_overloaded_operator() {
                    return;
                }
                self.report(*location, *decl);
            }
            AstNode::Member {
                location,
                member,
                base,
            } => {
                if self.ctx.policy().members {
                    self.report(*location, *member);
                }
                self.traverse_node(base);
            }
            AstNode::Overload {
                location,
                candidates,
                is_member,
                children,
            } => {
                if !*is_member || self.ctx.policy().members {
                    for &candidate in candidates {
                        self.report(*location, candidate);
                    }
                }
                for child in children {
                    self.traverse_node(child);
                }
            }
            AstNode::Construct { location, ty, args } => {
                if self.ctx.policy().construction {
                    let saved = std::mem::replace(&mut self.location_of_type, *location);
                    self.traverse_type(ty);
                    self.location_of_type = saved;
                }
                for arg in args {
                    self.traverse_node(arg);
                }
            }
            AstNode::Type(type_loc) => self.traverse_type_loc(type_loc),
            AstNode::Decl(id) => self.traverse_decl(*id),
            AstNode::Other(children) => {
                for child in children {
                    self.traverse_node(child);
                }
            }
        }
    }

    /// A written type: its begin location becomes the reported location
    /// for every type reference at this level, then each lexically nested
    /// written type installs its own.
    fn traverse_type_loc(&mut self, type_loc: &TypeLoc) {
        let saved = std::mem::replace(&mut self.location_of_type, type_loc.location);
        self.visit_type_ref(&type_loc.ty);
        for nested in &type_loc.nested {
            self.traverse_type_loc(nested);
        }
        self.location_of_type = saved;
    }

    /// An unwritten type: everything below reports at the location already
    /// stashed by the caller.
    fn traverse_type(&mut self, ty: &TypeNode) {
        self.visit_type_ref(&ty.ty);
        for nested in &ty.nested {
            self.traverse_type(nested);
        }
    }

    fn visit_type_ref(&mut self, ty: &TypeRef) {
        match ty {
            TypeRef::Tag(decl) => self.report(self.location_of_type, *decl),
            TypeRef::TemplateSpecialization {
                primary,
                specialized,
            } => {
                self.report(self.location_of_type, *primary);
                if let Some(specialized) = specialized {
                    self.report(self.location_of_type, *specialized);
                }
            }
            TypeRef::Using { found } => self.report(self.location_of_type, *found),
            TypeRef::Typedef(decl) => self.report(self.location_of_type, *decl),
            TypeRef::None => {}
        }
    }

    fn report(&mut self, mut loc: SourceLocation, decl: DeclId) {
        while let SourceLocation::Macro { expansion, offset } = loc {
            let info = self.ctx.source().expansion(expansion);
            if !info.is_macro_arg {
                // Names within macro bodies are not references written in
                // the main file; the recorder captures those separately.
                return;
            }
            loc = info.spelling.with_offset(offset);
        }
        (self.callback)(loc, Hinted::new(self.ast.canonical(decl)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Decl;
    use crate::ast::TagKind;
    use crate::config::Policy;
    use crate::context::SymbolCache;
    use crate::pp::Preprocessor;
    use crate::source::{FileId, SourceMap};

    struct Fixture {
        sm: SourceMap,
        pp: Preprocessor,
        ast: Ast,
        main: FileId,
        header: FileId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut sm = SourceMap::new();
            let main = sm.add_file("main.cc", "int main() {}\n");
            let header = sm.add_file("a.h", "struct Foo {};\n");
            sm.set_main_file(main);
            Fixture {
                sm,
                pp: Preprocessor::new(),
                ast: Ast::new(),
                main,
                header,
            }
        }

        fn loc(&self, offset: u32) -> SourceLocation {
            SourceLocation::File {
                file: self.main,
                offset,
            }
        }

        fn collect(&self, policy: Policy, root: DeclId) -> Vec<(SourceLocation, DeclId)> {
            let ctx = AnalysisContext::new(policy, &self.sm, &self.pp, SymbolCache::new());
            let mut seen = Vec::new();
            walk_ast(&ctx, &self.ast, root, &mut |loc, decl| {
                seen.push((loc, decl.value));
            });
            seen
        }
    }

    #[test]
    fn test_tag_type_reports_at_enclosing_type_loc() {
        let mut fx = Fixture::new();
        let foo = fx.ast.add_decl(Decl::new(
            "Foo",
            DeclKind::Record(TagKind::Struct),
            SourceLocation::File {
                file: fx.header,
                offset: 7,
            },
        ));
        let mut var = Decl::new("f", DeclKind::Variable, fx.loc(4));
        var.children = vec![AstNode::Type(TypeLoc {
            location: fx.loc(0),
            ty: TypeRef::Tag(foo),
            nested: vec![],
        })];
        let var = fx.ast.add_decl(var);

        assert_eq!(fx.collect(Policy::default(), var), vec![(fx.loc(0), foo)]);
    }

    #[test]
    fn test_nested_type_locs_restore_location() {
        let mut fx = Fixture::new();
        let outer = fx.ast.add_decl(Decl::new(
            "Outer",
            DeclKind::ClassTemplate,
            SourceLocation::File {
                file: fx.header,
                offset: 0,
            },
        ));
        let inner = fx.ast.add_decl(Decl::new(
            "Inner",
            DeclKind::Record(TagKind::Class),
            SourceLocation::File {
                file: fx.header,
                offset: 20,
            },
        ));
        // Outer<Inner> x; - Outer reports at offset 0, Inner at offset 6.
        let mut var = Decl::new("x", DeclKind::Variable, fx.loc(13));
        var.children = vec![AstNode::Type(TypeLoc {
            location: fx.loc(0),
            ty: TypeRef::TemplateSpecialization {
                primary: outer,
                specialized: None,
            },
            nested: vec![TypeLoc {
                location: fx.loc(6),
                ty: TypeRef::Tag(inner),
                nested: vec![],
            }],
        })];
        let var = fx.ast.add_decl(var);

        assert_eq!(
            fx.collect(Policy::default(), var),
            vec![(fx.loc(0), outer), (fx.loc(6), inner)]
        );
    }

    #[test]
    fn test_template_specialization_reports_both() {
        let mut fx = Fixture::new();
        let primary = fx.ast.add_decl(Decl::new(
            "Box",
            DeclKind::ClassTemplate,
            SourceLocation::File {
                file: fx.header,
                offset: 0,
            },
        ));
        let specialized = fx.ast.add_decl(Decl::new(
            "Box",
            DeclKind::Record(TagKind::Class),
            SourceLocation::File {
                file: fx.header,
                offset: 40,
            },
        ));
        let mut var = Decl::new("b", DeclKind::Variable, fx.loc(9));
        var.children = vec![AstNode::Type(TypeLoc {
            location: fx.loc(0),
            ty: TypeRef::TemplateSpecialization {
                primary,
                specialized: Some(specialized),
            },
            nested: vec![],
        })];
        let var = fx.ast.add_decl(var);

        assert_eq!(
            fx.collect(Policy::default(), var),
            vec![(fx.loc(0), primary), (fx.loc(0), specialized)]
        );
    }

    #[test]
    fn test_operator_refs_gated_by_policy() {
        let mut fx = Fixture::new();
        let op = fx.ast.add_decl(Decl::new(
            "operator==",
            DeclKind::Function,
            SourceLocation::File {
                file: fx.header,
                offset: 0,
            },
        ));
        let mut var = Decl::new("x", DeclKind::Variable, fx.loc(5));
        var.children = vec![AstNode::Other(vec![AstNode::DeclRef {
            location: fx.loc(10),
            decl: op,
        }])];
        let var = fx.ast.add_decl(var);

        assert!(fx.collect(Policy::default(), var).is_empty());
        let with_operators = Policy {
            operators: true,
            ..Policy::default()
        };
        assert_eq!(fx.collect(with_operators, var), vec![(fx.loc(10), op)]);
    }

    #[test]
    fn test_member_access_gated_by_policy() {
        let mut fx = Fixture::new();
        let field = fx.ast.add_decl(Decl::new(
            "size",
            DeclKind::Field,
            SourceLocation::File {
                file: fx.header,
                offset: 12,
            },
        ));
        let obj = fx.ast.add_decl(Decl::new("s", DeclKind::Variable, fx.loc(0)));
        let mut var = Decl::new("n", DeclKind::Variable, fx.loc(4));
        var.children = vec![AstNode::Member {
            location: fx.loc(10),
            member: field,
            base: Box::new(AstNode::DeclRef {
                location: fx.loc(8),
                decl: obj,
            }),
        }];
        let var = fx.ast.add_decl(var);

        // The base is always traversed; the member only under the policy.
        assert_eq!(fx.collect(Policy::default(), var), vec![(fx.loc(8), obj)]);
        let with_members = Policy {
            members: true,
            ..Policy::default()
        };
        assert_eq!(
            fx.collect(with_members, var),
            vec![(fx.loc(10), field), (fx.loc(8), obj)]
        );
    }

    #[test]
    fn test_unresolved_member_set_gated_by_policy() {
        let mut fx = Fixture::new();
        let a = fx.ast.add_decl(Decl::new(
            "f",
            DeclKind::Method,
            SourceLocation::File {
                file: fx.header,
                offset: 0,
            },
        ));
        let b = fx.ast.add_decl(Decl::new(
            "f",
            DeclKind::Method,
            SourceLocation::File {
                file: fx.header,
                offset: 10,
            },
        ));
        let mut var = Decl::new("x", DeclKind::Variable, fx.loc(0));
        var.children = vec![AstNode::Overload {
            location: fx.loc(4),
            candidates: vec![a, b],
            is_member: true,
            children: vec![],
        }];
        let var = fx.ast.add_decl(var);

        assert!(fx.collect(Policy::default(), var).is_empty());
        let with_members = Policy {
            members: true,
            ..Policy::default()
        };
        assert_eq!(
            fx.collect(with_members, var),
            vec![(fx.loc(4), a), (fx.loc(4), b)]
        );
    }

    #[test]
    fn test_construction_walks_unwritten_type() {
        let mut fx = Fixture::new();
        let vec_tmpl = fx.ast.add_decl(Decl::new(
            "vector",
            DeclKind::ClassTemplate,
            SourceLocation::File {
                file: fx.header,
                offset: 0,
            },
        ));
        let mut var = Decl::new("v", DeclKind::Variable, fx.loc(0));
        var.children = vec![AstNode::Construct {
            location: fx.loc(20),
            ty: TypeNode {
                ty: TypeRef::TemplateSpecialization {
                    primary: vec_tmpl,
                    specialized: None,
                },
                nested: vec![TypeNode {
                    ty: TypeRef::None,
                    nested: vec![],
                }],
            },
            args: vec![],
        }];
        let var = fx.ast.add_decl(var);

        assert!(fx.collect(Policy::default(), var).is_empty());
        let with_construction = Policy {
            construction: true,
            ..Policy::default()
        };
        // Every report lands at the call site.
        assert_eq!(
            fx.collect(with_construction, var),
            vec![(fx.loc(20), vec_tmpl)]
        );
    }

    #[test]
    fn test_function_definition_references_canonical() {
        let mut fx = Fixture::new();
        let declared = fx.ast.add_decl(Decl::new(
            "work",
            DeclKind::Function,
            SourceLocation::File {
                file: fx.header,
                offset: 5,
            },
        ));
        let mut definition = Decl::new("work", DeclKind::Function, fx.loc(5));
        definition.canonical = Some(declared);
        definition.is_definition = true;
        let definition = fx.ast.add_decl(definition);

        assert_eq!(
            fx.collect(Policy::default(), definition),
            vec![(fx.loc(5), declared)]
        );
        // A definition that is itself canonical reports nothing.
        let mut standalone = Decl::new("local", DeclKind::Function, fx.loc(30));
        standalone.is_definition = true;
        let standalone = fx.ast.add_decl(standalone);
        assert!(fx.collect(Policy::default(), standalone).is_empty());
    }

    #[test]
    fn test_using_decl_references_targets() {
        let mut fx = Fixture::new();
        let target = fx.ast.add_decl(Decl::new(
            "swap",
            DeclKind::Function,
            SourceLocation::File {
                file: fx.header,
                offset: 2,
            },
        ));
        let using = fx.ast.add_decl(Decl::new(
            "swap",
            DeclKind::Using {
                targets: vec![target],
            },
            fx.loc(6),
        ));

        assert_eq!(
            fx.collect(Policy::default(), using),
            vec![(fx.loc(6), target)]
        );
    }

    #[test]
    fn test_macro_body_references_are_suppressed() {
        let mut fx = Fixture::new();
        let foo = fx.ast.add_decl(Decl::new(
            "Foo",
            DeclKind::Record(TagKind::Struct),
            SourceLocation::File {
                file: fx.header,
                offset: 7,
            },
        ));
        // A reference spelled inside a macro body: suppressed.
        let body_exp = fx.sm.add_expansion(
            fx.loc(0),
            SourceLocation::File {
                file: fx.header,
                offset: 30,
            },
            false,
        );
        let mut var = Decl::new("a", DeclKind::Variable, fx.loc(0));
        var.children = vec![AstNode::DeclRef {
            location: SourceLocation::Macro {
                expansion: body_exp,
                offset: 0,
            },
            decl: foo,
        }];
        let var = fx.ast.add_decl(var);
        assert!(fx.collect(Policy::default(), var).is_empty());
    }

    #[test]
    fn test_macro_arg_references_walk_to_spelling() {
        let mut fx = Fixture::new();
        let foo = fx.ast.add_decl(Decl::new(
            "Foo",
            DeclKind::Record(TagKind::Struct),
            SourceLocation::File {
                file: fx.header,
                offset: 7,
            },
        ));
        // ID(Foo) - the argument is spelled in the caller at offset 3; the
        // use inside the expansion walks up to it, carrying the offset.
        let arg_exp = fx.sm.add_expansion(fx.loc(0), fx.loc(3), true);
        let mut var = Decl::new("a", DeclKind::Variable, fx.loc(0));
        var.children = vec![AstNode::DeclRef {
            location: SourceLocation::Macro {
                expansion: arg_exp,
                offset: 2,
            },
            decl: foo,
        }];
        let var = fx.ast.add_decl(var);
        assert_eq!(fx.collect(Policy::default(), var), vec![(fx.loc(5), foo)]);
    }

    #[test]
    fn test_reported_decls_are_canonical() {
        let mut fx = Fixture::new();
        let first = fx.ast.add_decl(Decl::new(
            "Foo",
            DeclKind::Record(TagKind::Struct),
            SourceLocation::File {
                file: fx.header,
                offset: 7,
            },
        ));
        let mut redecl = Decl::new("Foo", DeclKind::Record(TagKind::Struct), fx.loc(40));
        redecl.canonical = Some(first);
        let redecl = fx.ast.add_decl(redecl);

        let mut var = Decl::new("f", DeclKind::Variable, fx.loc(4));
        var.children = vec![AstNode::Type(TypeLoc {
            location: fx.loc(0),
            ty: TypeRef::Tag(redecl),
            nested: vec![],
        })];
        let var = fx.ast.add_decl(var);

        assert_eq!(fx.collect(Policy::default(), var), vec![(fx.loc(0), first)]);
    }
}
