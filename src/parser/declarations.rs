use super::Parser;
use crate::ast::{
    Decl, Errored, Expr, Field, File, FunDecl, Ident, ImplBlock, Param, TypeBody, TypeDecl,
    TypeRef, VarDecl,
};
use crate::diagnostic::Span;
use crate::parser_diagnostics::ParseError;
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    pub(super) fn parse_file(&mut self) -> File {
        let pos = self.file_start();
        let package = if self.eat(&TokenKind::KeywordPackage).is_some() {
            self.expect_ident()
        } else {
            None
        };

        let mut decls = vec![];
        // Set after a reported error; further junk is skipped silently
        // until the next declaration keyword. Illegal tokens are still
        // reported since each one is an independent lexical problem.
        let mut recovering = false;
        loop {
            let decl = match self.token.kind {
                TokenKind::Eof => break,
                TokenKind::Semicolon => {
                    self.bump();
                    continue;
                }
                TokenKind::KeywordDef => self.parse_var_decl().map(Decl::from),
                TokenKind::KeywordFun => self.parse_fun_decl().map(Decl::from),
                TokenKind::KeywordType => self.parse_type_decl().map(Decl::from),
                TokenKind::KeywordImpl => self.parse_impl_block().map(Decl::from),
                TokenKind::KeywordImport | TokenKind::KeywordExport => {
                    let token = self.bump();
                    self.report(
                        ParseError::UnsupportedDeclaration {
                            keyword: token.text,
                        },
                        Span::new(token.pos, token.end),
                    );
                    recovering = true;
                    continue;
                }
                _ => {
                    if !recovering || self.token.is_illegal() {
                        self.unexpected(|found| ParseError::ExpectedDeclaration { found });
                    }
                    recovering = true;
                    self.bump();
                    continue;
                }
            };
            recovering = decl.is_none();
            decls.extend(decl);
        }
        File {
            package,
            decls,
            pos,
        }
    }

    /// `fun NAME ( PARAMS ) : TYPE BLOCK`
    ///
    /// Gives up (returning `None`) when the header is too broken to find the
    /// body.
    pub(super) fn parse_fun_decl(&mut self) -> Option<FunDecl> {
        let fun = self.bump();
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LParen)?;
        let params = self.parse_comma_list(&TokenKind::RParen, Some("parameter list"), |p| {
            p.parse_param()
        });
        if self.expect(&TokenKind::RParen).is_none()
            && !self.at(&TokenKind::Colon)
            && !self.at(&TokenKind::LBrace)
        {
            return None;
        }
        let return_type = if self.eat(&TokenKind::Colon).is_some() {
            self.parse_type()
        } else {
            let pos = self.token.pos.clone();
            self.expect(&TokenKind::Colon);
            TypeRef::Errored(pos)
        };
        let open = self.expect(&TokenKind::LBrace)?;
        let body = self.parse_block(open);
        Some(FunDecl {
            name,
            params,
            return_type,
            body,
            pos: fun.pos,
        })
    }

    /// `NAME : TYPE`; a broken parameter still yields a `Param` so the
    /// parameter count matches the source.
    fn parse_param(&mut self) -> Param {
        let pos = self.token.pos.clone();
        let name = self.expect_ident().unwrap_or_else(|| Ident {
            name: String::new(),
            pos: pos.clone(),
        });
        let ty = if self.expect(&TokenKind::Colon).is_some() {
            self.parse_type()
        } else {
            TypeRef::Errored(self.token.pos.clone())
        };
        Param { name, ty, pos }
    }

    /// `def NAME (: TYPE)? = EXPR`, at the top level or as a statement.
    pub(super) fn parse_var_decl(&mut self) -> Option<VarDecl> {
        let def = self.bump();
        let name = self.expect_ident()?;
        let ty = if self.eat(&TokenKind::Colon).is_some() {
            Some(self.parse_type())
        } else {
            None
        };
        let init = if self.expect(&TokenKind::Assign).is_some() {
            self.parse_expr()
        } else {
            Expr::Errored(Errored {
                pos: self.token.pos.clone(),
            })
        };
        Some(VarDecl {
            name,
            ty,
            init,
            pos: def.pos,
        })
    }

    /// `type NAME struct { FIELDS }` or `type NAME enum { VARIANTS }`
    fn parse_type_decl(&mut self) -> Option<TypeDecl> {
        let type_token = self.bump();
        let name = self.expect_ident()?;
        let body = match self.token.kind {
            TokenKind::KeywordStruct => {
                self.bump();
                self.expect(&TokenKind::LBrace)?;
                let fields = self.parse_comma_list(&TokenKind::RBrace, None, |p| p.parse_field());
                self.expect(&TokenKind::RBrace);
                TypeBody::Struct { fields }
            }
            TokenKind::KeywordEnum => {
                self.bump();
                self.expect(&TokenKind::LBrace)?;
                let variants = self.parse_comma_list(&TokenKind::RBrace, None, |p| {
                    let pos = p.token.pos.clone();
                    p.expect_ident().unwrap_or(Ident {
                        name: String::new(),
                        pos,
                    })
                });
                self.expect(&TokenKind::RBrace);
                TypeBody::Enum { variants }
            }
            _ => {
                self.unexpected(|found| ParseError::UnexpectedToken {
                    expected: "STRUCT or ENUM".to_owned(),
                    found,
                });
                return None;
            }
        };
        Some(TypeDecl {
            name,
            body,
            pos: type_token.pos,
        })
    }

    fn parse_field(&mut self) -> Field {
        let param = self.parse_param();
        Field {
            name: param.name,
            ty: param.ty,
            pos: param.pos,
        }
    }

    /// `impl NAME { fun ... }`
    fn parse_impl_block(&mut self) -> Option<ImplBlock> {
        let impl_token = self.bump();
        let target = self.expect_ident()?;
        let open = self.expect(&TokenKind::LBrace)?;
        let mut methods = vec![];
        let mut recovering = false;
        loop {
            match self.token.kind {
                TokenKind::RBrace => {
                    self.bump();
                    break;
                }
                TokenKind::Eof => {
                    self.report(
                        ParseError::UnclosedBlock,
                        Span::new(open.pos, self.token.pos.clone()),
                    );
                    break;
                }
                TokenKind::Semicolon => {
                    self.bump();
                }
                TokenKind::KeywordFun => {
                    let method = self.parse_fun_decl();
                    recovering = method.is_none();
                    methods.extend(method);
                }
                _ => {
                    if !recovering || self.token.is_illegal() {
                        self.unexpected(|found| ParseError::UnexpectedToken {
                            expected: "FUN".to_owned(),
                            found,
                        });
                    }
                    recovering = true;
                    self.bump();
                }
            }
        }
        Some(ImplBlock {
            target,
            methods,
            pos: impl_token.pos,
        })
    }

    /// A type name or `none`. Reports and returns `TypeRef::Errored` without
    /// consuming anything otherwise.
    pub(super) fn parse_type(&mut self) -> TypeRef {
        match self.token.kind {
            TokenKind::Ident => {
                let token = self.bump();
                TypeRef::Named(Ident {
                    name: token.text,
                    pos: token.pos,
                })
            }
            TokenKind::None => TypeRef::None(self.bump().pos),
            _ => {
                self.unexpected(|found| ParseError::ExpectedType { found });
                TypeRef::Errored(self.token.pos.clone())
            }
        }
    }

    pub(super) fn expect_ident(&mut self) -> Option<Ident> {
        if self.at(&TokenKind::Ident) {
            let token = self.bump();
            Some(Ident {
                name: token.text,
                pos: token.pos,
            })
        } else {
            self.unexpected(|found| ParseError::ExpectedIdentifier { found });
            None
        }
    }
}
