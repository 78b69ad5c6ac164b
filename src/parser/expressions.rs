use super::{Parser, MAX_NESTING};
use crate::ast::{
    ArrayLit, BasicLit, BinaryExpr, BinaryOp, CallExpr, Errored, Expr, Ident, LitKind, UnaryExpr,
};
use crate::diagnostic::Span;
use crate::parser_diagnostics::ParseError;
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    pub(super) fn parse_expr(&mut self) -> Expr {
        self.nested(
            |p| p.parse_binary(Self::parse_and, |op| op == BinaryOp::LogicalOr),
            |p| {
                let pos = p.token.pos.clone();
                let span = p.token_span();
                p.too_deep(span, 0);
                Errored { pos }.into()
            },
        )
    }

    fn parse_and(&mut self) -> Expr {
        self.parse_binary(Self::parse_equality, |op| op == BinaryOp::LogicalAnd)
    }

    fn parse_equality(&mut self) -> Expr {
        self.parse_binary(Self::parse_additive, BinaryOp::is_equality)
    }

    fn parse_additive(&mut self) -> Expr {
        self.parse_binary(Self::parse_multiplicative, BinaryOp::is_additive)
    }

    fn parse_multiplicative(&mut self) -> Expr {
        self.parse_binary(Self::parse_unary, BinaryOp::is_multiplicative)
    }

    /// One left-associative precedence level: `operand (op operand)*` where
    /// `op` is any operator accepted by `accepts`.
    fn parse_binary(
        &mut self,
        operand: fn(&mut Self) -> Expr,
        accepts: fn(BinaryOp) -> bool,
    ) -> Expr {
        let mut left = operand(self);
        while let Some(op) = self.token.to_binop(accepts) {
            self.bump();
            let right = operand(self);
            let pos = left.pos().clone();
            left = BinaryExpr {
                left: Box::new(left),
                op,
                right: Box::new(right),
                pos,
            }
            .into();
        }
        left
    }

    /// Prefix operators are collected in a loop; each one still counts as
    /// a nesting level.
    fn parse_unary(&mut self) -> Expr {
        let mut ops = vec![];
        while let Some(op) = self.token.to_unop() {
            ops.push((op, self.bump()));
        }
        let operand = self.parse_postfix();
        if let Some((_, first)) = ops.first() {
            if self.depth + ops.len() > MAX_NESTING {
                let span = Span::new(first.pos.clone(), first.end.clone());
                self.report(ParseError::TooDeeplyNested { limit: MAX_NESTING }, span);
                return Errored {
                    pos: first.pos.clone(),
                }
                .into();
            }
        }
        ops.into_iter()
            .rev()
            .fold(operand, |operand, (op, token)| {
                UnaryExpr {
                    op,
                    operand: Box::new(operand),
                    pos: token.pos,
                }
                .into()
            })
    }

    fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_primary();
        while self.eat(&TokenKind::LParen).is_some() {
            let args = self.parse_comma_list(&TokenKind::RParen, Some("argument list"), |p| {
                p.parse_expr()
            });
            self.expect(&TokenKind::RParen);
            let pos = expr.pos().clone();
            expr = CallExpr {
                callee: Box::new(expr),
                args,
                pos,
            }
            .into();
        }
        expr
    }

    /// Reports and returns `Expr::Errored` without consuming anything when
    /// the current token cannot start an expression.
    fn parse_primary(&mut self) -> Expr {
        let kind = match self.token.kind {
            TokenKind::Ident => {
                let token = self.bump();
                return Ident {
                    name: token.text,
                    pos: token.pos,
                }
                .into();
            }
            TokenKind::LParen => {
                self.bump();
                let expr = self.parse_expr();
                self.expect(&TokenKind::RParen);
                return expr;
            }
            TokenKind::LBracket => {
                let open = self.bump();
                let elements =
                    self.parse_comma_list(&TokenKind::RBracket, None, |p| p.parse_expr());
                self.expect(&TokenKind::RBracket);
                return ArrayLit {
                    elements,
                    pos: open.pos,
                }
                .into();
            }
            TokenKind::Int => LitKind::Int,
            TokenKind::Float => LitKind::Float,
            TokenKind::String => LitKind::String,
            TokenKind::True | TokenKind::False => LitKind::Bool,
            TokenKind::None => LitKind::None,
            _ => {
                self.unexpected(|found| ParseError::ExpectedExpression { found });
                return Errored {
                    pos: self.token.pos.clone(),
                }
                .into();
            }
        };
        let token = self.bump();
        BasicLit {
            kind,
            text: token.text,
            pos: token.pos,
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Decl, Expr, LitKind};
    use crate::diagnostic::Diagnostic;
    use crate::parser::parse;

    fn parse_init(source: &str) -> (Expr, Vec<Diagnostic>) {
        let (file, errors) = parse("t.gvt", &format!("def x = {}", source));
        match file.decls.into_iter().next() {
            Some(Decl::Var(decl)) => (decl.init, errors),
            other => panic!("unexpected decl: {:?}", other),
        }
    }

    fn show(expr: &Expr) -> String {
        match expr {
            Expr::Binary(e) => format!("({} {} {})", e.op.as_str(), show(&e.left), show(&e.right)),
            Expr::Unary(e) => format!("({} {})", e.op.as_str(), show(&e.operand)),
            Expr::Call(e) => {
                let mut s = format!("(call {}", show(&e.callee));
                for arg in &e.args {
                    s.push(' ');
                    s.push_str(&show(arg));
                }
                s.push(')');
                s
            }
            Expr::Ident(e) => e.name.clone(),
            Expr::BasicLit(e) => e.text.clone(),
            Expr::ArrayLit(e) => {
                let elements = e.elements.iter().map(show).collect::<Vec<_>>();
                format!("[{}]", elements.join(" "))
            }
            Expr::Errored(_) => "<error>".to_owned(),
        }
    }

    #[track_caller]
    fn assert_expr(source: &str, expected: &str) {
        let (expr, errors) = parse_init(source);
        assert!(errors.is_empty(), "{}: {:?}", source, errors);
        assert_eq!(show(&expr), expected, "{}", source);
    }

    #[test]
    fn test_precedence() {
        assert_expr("1 + 2 * 3", "(+ 1 (* 2 3))");
        assert_expr("1 * 2 + 3", "(+ (* 1 2) 3)");
        assert_expr("(1 + 2) * 3", "(* (+ 1 2) 3)");
        assert_expr("a || b && c == d", "(|| a (&& b (== c d)))");
        assert_expr("a && b || c", "(|| (&& a b) c)");
        assert_expr("a < b + 1", "(< a (+ b 1))");
        assert_expr("a % b / c", "(/ (% a b) c)");
    }

    #[test]
    fn test_left_associative() {
        assert_expr("1 - 2 - 3", "(- (- 1 2) 3)");
        assert_expr("a < b > c", "(> (< a b) c)");
        assert_expr("a != b == c", "(== (!= a b) c)");
    }

    #[test]
    fn test_unary() {
        assert_expr("-!x", "(- (! x))");
        assert_expr("+1 - -2", "(- (+ 1) (- 2))");
        assert_expr("!f(x)", "(! (call f x))");
    }

    #[test]
    fn test_calls() {
        assert_expr("f()", "(call f)");
        assert_expr("f(1, g(2), 3)", "(call f 1 (call g 2) 3)");
        assert_expr("f(1)(2)", "(call (call f 1) 2)");
        assert_expr("(f)(1)", "(call f 1)");
    }

    #[test]
    fn test_arrays() {
        assert_expr("[]", "[]");
        assert_expr("[1, [2, 3], x]", "[1 [2 3] x]");
        assert_expr("[1, 2,]", "[1 2]");
    }

    #[test]
    fn test_literals() {
        let cases = [
            ("42", LitKind::Int, "42"),
            ("1_000", LitKind::Int, "1_000"),
            ("2.5", LitKind::Float, "2.5"),
            ("\"a\\tb\"", LitKind::String, "a\tb"),
            ("true", LitKind::Bool, "true"),
            ("false", LitKind::Bool, "false"),
            ("none", LitKind::None, "none"),
        ];
        for (source, kind, text) in cases {
            let (expr, errors) = parse_init(source);
            assert!(errors.is_empty(), "{}: {:?}", source, errors);
            match expr {
                Expr::BasicLit(lit) => {
                    assert_eq!(lit.kind, kind, "{}", source);
                    assert_eq!(lit.text, text, "{}", source);
                }
                other => panic!("{}: unexpected expr: {:?}", source, other),
            }
        }
    }

    #[test]
    fn test_positions() {
        let (expr, _) = parse_init("a + b * c");
        assert_eq!(expr.pos().column, 9);
        match expr {
            Expr::Binary(e) => assert_eq!(e.right.pos().column, 13),
            other => panic!("unexpected expr: {:?}", other),
        }
        let (expr, _) = parse_init("f(x)");
        assert_eq!(expr.pos().column, 9);
        let (expr, _) = parse_init("-x");
        assert_eq!(expr.pos().column, 9);
    }

    #[test]
    fn test_missing_operand() {
        let (expr, errors) = parse_init("1 +");
        assert_eq!(show(&expr), "(+ 1 <error>)");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "expected expression, got EOF");
    }

    #[test]
    fn test_trailing_comma_in_arguments() {
        let (expr, errors) = parse_init("f(a,)");
        assert_eq!(show(&expr), "(call f a)");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "trailing `,` in argument list");
        assert_eq!(errors[0].span.start.column, 12);
    }

    #[test]
    fn test_missing_separator() {
        let (expr, errors) = parse_init("f(a b)");
        assert_eq!(show(&expr), "(call f a b)");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "expected `,` or `)`, got IDENT (\"b\")");
    }

    #[test]
    fn test_unclosed_paren() {
        let (expr, errors) = parse_init("(1 + 2");
        assert_eq!(show(&expr), "(+ 1 2)");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "expected RPAREN, got EOF");
    }
}
