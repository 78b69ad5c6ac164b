use super::Parser;
use crate::ast::{
    AssignStmt, Block, Expr, ExprStmt, ForInStmt, IfStmt, ReturnStmt, Stmt, WhileStmt,
};
use crate::diagnostic::Span;
use crate::parser_diagnostics::ParseError;
use crate::token::{Token, TokenKind};

impl<'a> Parser<'a> {
    /// Parses the statements following `open` through the matching `}`.
    pub(super) fn parse_block(&mut self, open: Token) -> Block {
        let span = Span::new(open.pos.clone(), open.end.clone());
        let pos = open.pos.clone();
        self.nested(
            |p| p.parse_block_body(open),
            |p| {
                p.too_deep(span, 1);
                Block { stmts: vec![], pos }
            },
        )
    }

    fn parse_block_body(&mut self, open: Token) -> Block {
        let mut stmts = vec![];
        loop {
            match self.token.kind {
                TokenKind::RBrace => {
                    self.bump();
                    break;
                }
                TokenKind::Eof => {
                    self.report(
                        ParseError::UnclosedBlock,
                        Span::new(open.pos.clone(), self.token.pos.clone()),
                    );
                    break;
                }
                TokenKind::Semicolon => {
                    self.bump();
                }
                _ => {
                    let start = self.offset();
                    stmts.extend(self.parse_stmt());
                    if self.offset() == start {
                        self.bump();
                    }
                }
            }
        }
        Block {
            stmts,
            pos: open.pos,
        }
    }

    fn parse_block_required(&mut self) -> Block {
        match self.expect(&TokenKind::LBrace) {
            Some(open) => self.parse_block(open),
            None => Block {
                stmts: vec![],
                pos: self.token.pos.clone(),
            },
        }
    }

    fn parse_stmt(&mut self) -> Option<Stmt> {
        let stmt: Stmt = match self.token.kind {
            TokenKind::KeywordDef => self.parse_var_decl()?.into(),
            TokenKind::KeywordReturn => self.parse_return().into(),
            TokenKind::KeywordIf => self.parse_if().into(),
            TokenKind::KeywordWhile => {
                let while_token = self.bump();
                let cond = self.parse_expr();
                let body = self.parse_block_required();
                WhileStmt {
                    cond,
                    body,
                    pos: while_token.pos,
                }
                .into()
            }
            TokenKind::KeywordFor => self.parse_for()?.into(),
            TokenKind::LBrace => {
                let open = self.bump();
                self.parse_block(open).into()
            }
            _ => return self.parse_simple_stmt(),
        };
        Some(stmt)
    }

    fn parse_return(&mut self) -> ReturnStmt {
        let return_token = self.bump();
        let result = match self.token.kind {
            TokenKind::RBrace | TokenKind::Semicolon | TokenKind::Eof => None,
            _ => Some(self.parse_expr()),
        };
        ReturnStmt {
            result,
            pos: return_token.pos,
        }
    }

    /// `if COND BLOCK`, optionally followed by `else if ...` or `else BLOCK`.
    fn parse_if(&mut self) -> IfStmt {
        let if_token = self.bump();
        let cond = self.parse_expr();
        let then = self.parse_block_required();
        let else_ = if self.eat(&TokenKind::KeywordElse).is_some() {
            let stmt: Stmt = if self.at(&TokenKind::KeywordIf) {
                self.nested(
                    |p| Stmt::from(p.parse_if()),
                    |p| {
                        let pos = p.token.pos.clone();
                        let span = p.token_span();
                        p.too_deep(span, 0);
                        p.skip_if_chain();
                        Stmt::from(Block { stmts: vec![], pos })
                    },
                )
            } else {
                self.parse_block_required().into()
            };
            Some(Box::new(stmt))
        } else {
            None
        };
        IfStmt {
            cond,
            then,
            else_,
            pos: if_token.pos,
        }
    }

    /// Skips `if COND BLOCK` and any `else` branches after it without
    /// stopping at the enclosing `}`.
    fn skip_if_chain(&mut self) {
        loop {
            while !matches!(
                self.token.kind,
                TokenKind::LBrace | TokenKind::RBrace | TokenKind::Eof
            ) {
                let start = self.offset();
                self.skip_balanced(0);
                if self.offset() == start {
                    self.bump();
                }
            }
            if !self.at(&TokenKind::LBrace) {
                return;
            }
            self.skip_balanced(0);
            if self.eat(&TokenKind::KeywordElse).is_none() {
                return;
            }
        }
    }

    /// `for def NAME in EXPR BLOCK`. A missing `def` is reported but
    /// `for NAME in` is still accepted.
    fn parse_for(&mut self) -> Option<ForInStmt> {
        let for_token = self.bump();
        if self.expect(&TokenKind::KeywordDef).is_none()
            && !(self.at(&TokenKind::Ident) && self.peek() == &TokenKind::KeywordIn)
        {
            return None;
        }
        let binding = self.expect_ident()?;
        self.expect(&TokenKind::KeywordIn)?;
        let iterable = self.parse_expr();
        let body = self.parse_block_required();
        Some(ForInStmt {
            binding,
            iterable,
            body,
            pos: for_token.pos,
        })
    }

    /// An expression statement, or an assignment when `=` follows.
    fn parse_simple_stmt(&mut self) -> Option<Stmt> {
        let start = self.offset();
        let expr = self.parse_expr();
        if matches!(expr, Expr::Errored(_)) && self.offset() == start {
            return None;
        }
        let pos = expr.pos().clone();
        if self.eat(&TokenKind::Assign).is_some() {
            let right = self.parse_expr();
            return Some(
                AssignStmt {
                    left: expr,
                    right,
                    pos,
                }
                .into(),
            );
        }
        Some(ExprStmt { expr, pos }.into())
    }
}
