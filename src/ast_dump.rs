use std::fmt::Display;

use crate::ast::{self, BinaryOp, Decl, Expr, LitKind, Stmt, TypeBody, TypeRef};
use crate::delegate_expr;
use crate::str_util::inspect_str;

#[derive(Debug, Clone)]
pub enum SExp {
    Tagged { tag: String, args: Vec<SExp> },
    Nil,
    Symbol { name: String },
    /// Printed as-is; used for numeric literals.
    Atom { text: String },
    Str { value: String },
    Invalid,
}

impl SExp {
    fn tagged(tag: &str, args: Vec<SExp>) -> Self {
        SExp::Tagged {
            tag: tag.to_owned(),
            args,
        }
    }

    fn symbol(name: &str) -> Self {
        SExp::Symbol {
            name: name.to_owned(),
        }
    }
}

impl Display for SExp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            SExpIndent {
                sexp: self,
                nest: 0,
            }
        )
    }
}

#[derive(Debug)]
pub struct SExpIndent<'a> {
    sexp: &'a SExp,
    nest: u32,
}

impl<'a> Display for SExpIndent<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.sexp {
            SExp::Tagged { tag, args } => {
                write!(f, "s(:{}", tag)?;
                for arg in args {
                    if matches!(arg, SExp::Tagged { .. }) {
                        write!(f, ",\n{}", Indent(self.nest + 1))?;
                    } else {
                        write!(f, ", ")?;
                    }
                    write!(
                        f,
                        "{}",
                        SExpIndent {
                            sexp: arg,
                            nest: self.nest + 1,
                        }
                    )?;
                }
                write!(f, ")")?;
            }
            SExp::Nil => {
                f.write_str("nil")?;
            }
            SExp::Symbol { name } => {
                write!(f, ":{}", name)?;
            }
            SExp::Atom { text } => {
                f.write_str(text)?;
            }
            SExp::Str { value } => {
                write!(f, "{}", inspect_str(value.as_bytes()))?;
            }
            SExp::Invalid => {
                f.write_str("<invalid>")?;
            }
        }
        Ok(())
    }
}

impl From<&ast::File> for SExp {
    fn from(file: &ast::File) -> Self {
        let ast::File {
            package,
            decls,
            pos: _,
        } = file;
        let package = match package {
            Some(package) => SExp::symbol(&package.name),
            None => SExp::Nil,
        };
        SExp::tagged(
            "file",
            std::iter::once(package)
                .chain(decls.iter().map(SExp::from))
                .collect(),
        )
    }
}

impl From<&Decl> for SExp {
    fn from(decl: &Decl) -> Self {
        match decl {
            Decl::Fun(decl) => SExp::from(decl),
            Decl::Var(decl) => SExp::from(decl),
            Decl::Type(decl) => SExp::from(decl),
            Decl::Impl(decl) => SExp::from(decl),
        }
    }
}

impl From<&ast::FunDecl> for SExp {
    fn from(decl: &ast::FunDecl) -> Self {
        let ast::FunDecl {
            name,
            params,
            return_type,
            body,
            pos: _,
        } = decl;
        let params = params
            .iter()
            .map(|ast::Param { name, ty, pos: _ }| {
                SExp::tagged("param", vec![SExp::symbol(&name.name), SExp::from(ty)])
            })
            .collect();
        SExp::tagged(
            "fun",
            vec![
                SExp::symbol(&name.name),
                SExp::tagged("params", params),
                SExp::from(return_type),
                SExp::from(body),
            ],
        )
    }
}

impl From<&ast::VarDecl> for SExp {
    fn from(decl: &ast::VarDecl) -> Self {
        let ast::VarDecl {
            name,
            ty,
            init,
            pos: _,
        } = decl;
        SExp::tagged(
            "def",
            vec![
                SExp::symbol(&name.name),
                ty.as_ref().map_or(SExp::Nil, SExp::from),
                SExp::from(init),
            ],
        )
    }
}

impl From<&ast::TypeDecl> for SExp {
    fn from(decl: &ast::TypeDecl) -> Self {
        let ast::TypeDecl { name, body, pos: _ } = decl;
        match body {
            TypeBody::Struct { fields } => SExp::tagged(
                "struct",
                std::iter::once(SExp::symbol(&name.name))
                    .chain(fields.iter().map(|ast::Field { name, ty, pos: _ }| {
                        SExp::tagged("field", vec![SExp::symbol(&name.name), SExp::from(ty)])
                    }))
                    .collect(),
            ),
            TypeBody::Enum { variants } => SExp::tagged(
                "enum",
                std::iter::once(&name.name)
                    .chain(variants.iter().map(|variant| &variant.name))
                    .map(|name| SExp::symbol(name))
                    .collect(),
            ),
        }
    }
}

impl From<&ast::ImplBlock> for SExp {
    fn from(decl: &ast::ImplBlock) -> Self {
        let ast::ImplBlock {
            target,
            methods,
            pos: _,
        } = decl;
        SExp::tagged(
            "impl",
            std::iter::once(SExp::symbol(&target.name))
                .chain(methods.iter().map(SExp::from))
                .collect(),
        )
    }
}

impl From<&TypeRef> for SExp {
    fn from(ty: &TypeRef) -> Self {
        match ty {
            TypeRef::Named(name) => SExp::symbol(&name.name),
            TypeRef::None(_) => SExp::symbol("none"),
            TypeRef::Errored(_) => SExp::Invalid,
        }
    }
}

impl From<&ast::Block> for SExp {
    fn from(block: &ast::Block) -> Self {
        let ast::Block { stmts, pos: _ } = block;
        SExp::tagged("block", stmts.iter().map(SExp::from).collect())
    }
}

impl From<&Stmt> for SExp {
    fn from(stmt: &Stmt) -> Self {
        match stmt {
            Stmt::Block(block) => SExp::from(block),
            Stmt::Var(decl) => SExp::from(decl),
            Stmt::Assign(ast::AssignStmt {
                left,
                right,
                pos: _,
            }) => SExp::tagged("assign", vec![SExp::from(left), SExp::from(right)]),
            Stmt::Expr(ast::ExprStmt { expr, pos: _ }) => SExp::from(expr),
            Stmt::Return(ast::ReturnStmt { result, pos: _ }) => {
                SExp::tagged("return", result.iter().map(SExp::from).collect())
            }
            Stmt::If(stmt) => SExp::from(stmt),
            Stmt::While(ast::WhileStmt { cond, body, pos: _ }) => {
                SExp::tagged("while", vec![SExp::from(cond), SExp::from(body)])
            }
            Stmt::ForIn(ast::ForInStmt {
                binding,
                iterable,
                body,
                pos: _,
            }) => SExp::tagged(
                "for",
                vec![
                    SExp::symbol(&binding.name),
                    SExp::from(iterable),
                    SExp::from(body),
                ],
            ),
        }
    }
}

impl From<&ast::IfStmt> for SExp {
    fn from(stmt: &ast::IfStmt) -> Self {
        let ast::IfStmt {
            cond,
            then,
            else_,
            pos: _,
        } = stmt;
        SExp::tagged(
            "if",
            vec![
                SExp::from(cond),
                SExp::from(then),
                else_.as_deref().map_or(SExp::Nil, SExp::from),
            ],
        )
    }
}

impl From<&ast::BinaryExpr> for SExp {
    fn from(expr: &ast::BinaryExpr) -> Self {
        let ast::BinaryExpr {
            left,
            op,
            right,
            pos: _,
        } = expr;
        match op {
            BinaryOp::LogicalOr => SExp::tagged("or", vec![to_sexp(left), to_sexp(right)]),
            BinaryOp::LogicalAnd => SExp::tagged("and", vec![to_sexp(left), to_sexp(right)]),
            _ => SExp::tagged(
                "binary",
                vec![SExp::symbol(op.as_str()), to_sexp(left), to_sexp(right)],
            ),
        }
    }
}

impl From<&ast::UnaryExpr> for SExp {
    fn from(expr: &ast::UnaryExpr) -> Self {
        let ast::UnaryExpr {
            op,
            operand,
            pos: _,
        } = expr;
        SExp::tagged("unary", vec![SExp::symbol(op.as_str()), to_sexp(operand)])
    }
}

impl From<&ast::CallExpr> for SExp {
    fn from(expr: &ast::CallExpr) -> Self {
        let ast::CallExpr {
            callee,
            args,
            pos: _,
        } = expr;
        SExp::tagged(
            "call",
            std::iter::once(to_sexp(callee))
                .chain(args.iter().map(to_sexp))
                .collect(),
        )
    }
}

impl From<&ast::Ident> for SExp {
    fn from(expr: &ast::Ident) -> Self {
        let ast::Ident { name, pos: _ } = expr;
        SExp::tagged("ident", vec![SExp::symbol(name)])
    }
}

impl From<&ast::BasicLit> for SExp {
    fn from(expr: &ast::BasicLit) -> Self {
        let ast::BasicLit { kind, text, pos: _ } = expr;
        match kind {
            LitKind::Int => SExp::tagged("int", vec![SExp::Atom { text: text.clone() }]),
            LitKind::Float => SExp::tagged("float", vec![SExp::Atom { text: text.clone() }]),
            LitKind::String => SExp::tagged("str", vec![SExp::Str { value: text.clone() }]),
            LitKind::Bool => SExp::tagged(text, vec![]),
            LitKind::None => SExp::tagged("none", vec![]),
        }
    }
}

impl From<&ast::ArrayLit> for SExp {
    fn from(expr: &ast::ArrayLit) -> Self {
        let ast::ArrayLit { elements, pos: _ } = expr;
        SExp::tagged("array", elements.iter().map(to_sexp).collect())
    }
}

impl From<&ast::Errored> for SExp {
    fn from(expr: &ast::Errored) -> Self {
        let ast::Errored { pos: _ } = expr;
        SExp::Invalid
    }
}

impl From<&Expr> for SExp {
    fn from(expr: &Expr) -> Self {
        delegate_expr!(expr, expr => SExp::from(expr))
    }
}

fn to_sexp(expr: &Expr) -> SExp {
    SExp::from(expr)
}

struct Indent(u32);

impl Display for Indent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for _ in 0..self.0 {
            f.write_str("  ")?;
        }
        Ok(())
    }
}

pub fn dump_file(file: &ast::File) -> SExp {
    SExp::from(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn dump(source: &str) -> String {
        let (file, errors) = parse("t.gvt", source);
        assert!(errors.is_empty(), "{:?}", errors);
        dump_file(&file).to_string()
    }

    #[test]
    fn test_dump_var() {
        assert_eq!(
            dump("package p\ndef a: int = -1 + x"),
            "\
s(:file, :p,
  s(:def, :a, :int,
    s(:binary, :+,
      s(:unary, :-,
        s(:int, 1)),
      s(:ident, :x))))"
        );
    }

    #[test]
    fn test_dump_fun() {
        assert_eq!(
            dump("fun f(a: int): none { if a { return } else { g(\"\\n\", true) } }"),
            "\
s(:file, nil,
  s(:fun, :f,
    s(:params,
      s(:param, :a, :int)), :none,
    s(:block,
      s(:if,
        s(:ident, :a),
        s(:block,
          s(:return)),
        s(:block,
          s(:call,
            s(:ident, :g),
            s(:str, \"\\n\"),
            s(:true)))))))"
        );
    }

    #[test]
    fn test_dump_types() {
        assert_eq!(
            dump("type P struct { x: int }\ntype C enum { R, G }"),
            "\
s(:file, nil,
  s(:struct, :P,
    s(:field, :x, :int)),
  s(:enum, :C, :R, :G))"
        );
    }

    #[test]
    fn test_dump_errored() {
        let (file, errors) = parse("t.gvt", "def a = )");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            dump_file(&file).to_string(),
            "\
s(:file, nil,
  s(:def, :a, nil, <invalid>))"
        );
    }
}
