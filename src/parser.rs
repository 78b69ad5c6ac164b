use crate::ast::File;
use crate::diagnostic::{Diagnostic, Span};
use crate::lexing::Lexer;
use crate::parser_diagnostics::ParseError;
use crate::pos::Position;
use crate::token::{Token, TokenKind};
use std::sync::Arc;

mod declarations;
mod expressions;
mod statements;

/// How deep parentheses, brackets, blocks, unary operators and `else if`
/// chains may nest before the parser gives up on the construct.
pub const MAX_NESTING: usize = 100;

/// Parses a whole source file.
///
/// Never fails: syntax errors are returned as diagnostics next to a `File`
/// populated as far as parsing could proceed. The tree is only fit for
/// further compilation when the diagnostics are empty.
pub fn parse(file: impl Into<Arc<str>>, source: &str) -> (File, Vec<Diagnostic>) {
    let mut parser = Parser::new(file.into(), source);
    let file = parser.parse_file();
    (file, parser.errors)
}

#[derive(Debug)]
pub(self) struct Parser<'a> {
    pub(self) lexer: Lexer<'a>,
    pub(self) file: Arc<str>,
    pub(self) token: Token,
    pub(self) next_token: Token,
    pub(self) errors: Vec<Diagnostic>,
    pub(self) depth: usize,
}

impl<'a> Parser<'a> {
    fn new(file: Arc<str>, source: &'a str) -> Self {
        let mut lexer = Lexer::new(file.clone(), source);
        let token = lexer.next_token();
        let next_token = lexer.next_token();
        Parser {
            lexer,
            file,
            token,
            next_token,
            errors: vec![],
            depth: 0,
        }
    }

    /// Consumes the current token and returns it.
    fn bump(&mut self) -> Token {
        let next_token = self.lexer.next_token();
        let token = std::mem::replace(&mut self.next_token, next_token);
        std::mem::replace(&mut self.token, token)
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.token.kind == *kind
    }

    fn peek(&self) -> &TokenKind {
        &self.next_token.kind
    }

    fn eat(&mut self, kind: &TokenKind) -> Option<Token> {
        if self.at(kind) {
            Some(self.bump())
        } else {
            None
        }
    }

    /// Consumes a token of the given kind. On mismatch, reports at the
    /// current token and leaves it in place for the caller to resync on.
    fn expect(&mut self, kind: &TokenKind) -> Option<Token> {
        if let Some(token) = self.eat(kind) {
            return Some(token);
        }
        self.unexpected(|found| ParseError::UnexpectedToken {
            expected: kind.name().to_owned(),
            found,
        });
        None
    }

    /// Reports the current token. Illegal tokens are reported with the
    /// lexer's own explanation instead of `error`.
    fn unexpected<F>(&mut self, error: F)
    where
        F: FnOnce(String) -> ParseError,
    {
        let error = match &self.token.kind {
            TokenKind::Illegal(e) => ParseError::Illegal(e.clone()),
            _ => error(self.token.to_string()),
        };
        let span = self.token_span();
        self.report(error, span);
    }

    /// Records a diagnostic. A second report starting at the same place as
    /// the previous one is dropped, so a single bad token yields a single
    /// diagnostic even when several enclosing constructs trip over it.
    fn report(&mut self, error: ParseError, span: Span) {
        if self
            .errors
            .last()
            .map_or(false, |last| last.span.start.offset == span.start.offset)
        {
            return;
        }
        self.errors.push(error.into_diagnostic(span));
    }

    /// Runs `inner` one nesting level deeper, or `too_deep` once the limit
    /// is reached.
    fn nested<T>(
        &mut self,
        inner: impl FnOnce(&mut Self) -> T,
        too_deep: impl FnOnce(&mut Self) -> T,
    ) -> T {
        if self.depth >= MAX_NESTING {
            return too_deep(self);
        }
        self.depth += 1;
        let result = inner(self);
        self.depth -= 1;
        result
    }

    /// Reports a construct nested past the limit at `span` and skips it:
    /// through the delimiter matching the `open` ones already consumed, or
    /// through the group starting at the current token when `open` is 0.
    fn too_deep(&mut self, span: Span, open: usize) {
        self.report(ParseError::TooDeeplyNested { limit: MAX_NESTING }, span);
        self.skip_balanced(open);
    }

    fn skip_balanced(&mut self, mut open: usize) {
        loop {
            match self.token.kind {
                TokenKind::Eof => return,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => open += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    if open == 0 {
                        return;
                    }
                    open -= 1;
                }
                _ if open == 0 => return,
                _ => {}
            }
            self.bump();
            if open == 0 {
                return;
            }
        }
    }

    fn token_span(&self) -> Span {
        Span::new(self.token.pos.clone(), self.token.end.clone())
    }

    fn offset(&self) -> usize {
        self.token.pos.offset
    }

    fn file_start(&self) -> Position {
        Position::new(self.file.clone(), 0, 1, 1)
    }

    /// Tokens at which a comma-separated list gives up instead of
    /// consuming them as malformed items.
    fn at_list_stop(&self) -> bool {
        matches!(
            self.token.kind,
            TokenKind::Eof
                | TokenKind::LBrace
                | TokenKind::RBrace
                | TokenKind::Semicolon
                | TokenKind::KeywordDef
                | TokenKind::KeywordFun
                | TokenKind::KeywordType
                | TokenKind::KeywordImpl
                | TokenKind::KeywordReturn
                | TokenKind::KeywordIf
                | TokenKind::KeywordWhile
                | TokenKind::KeywordFor
        )
    }

    /// Parses `item (, item)*` up to (not including) `closing`.
    ///
    /// With `trailing_comma_in` set, a comma right before `closing` is
    /// reported as an error naming that list; otherwise it is accepted.
    /// Items that consume nothing are skipped one token at a time.
    fn parse_comma_list<T, F>(
        &mut self,
        closing: &TokenKind,
        trailing_comma_in: Option<&'static str>,
        mut item: F,
    ) -> Vec<T>
    where
        F: FnMut(&mut Self) -> T,
    {
        let closing_text = closing_text(closing);
        let mut items = vec![];
        loop {
            if self.at(closing) || self.at_list_stop() {
                break;
            }
            let start = self.offset();
            let parsed = item(self);
            if self.offset() == start {
                // Nothing was consumed; the item has already been reported.
                self.bump();
            }
            items.push(parsed);
            if let Some(comma) = self.eat(&TokenKind::Comma) {
                if self.at(closing) {
                    if let Some(list) = trailing_comma_in {
                        self.report(
                            ParseError::TrailingComma { list },
                            Span::new(comma.pos, comma.end),
                        );
                    }
                    break;
                }
            } else if self.at(closing) || self.at_list_stop() {
                break;
            } else {
                self.unexpected(|found| ParseError::MissingSeparator {
                    closing: closing_text,
                    found,
                });
            }
        }
        items
    }
}

fn closing_text(kind: &TokenKind) -> &'static str {
    match kind {
        TokenKind::RParen => ")",
        TokenKind::RBracket => "]",
        TokenKind::RBrace => "}",
        _ => unreachable!("not a closing delimiter: {}", kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Decl, Expr, LitKind};

    #[test]
    fn test_lookahead_buffers() {
        let mut parser = Parser::new(Arc::from("t.gvt"), "a b c");
        assert_eq!(parser.token.text, "a");
        assert_eq!(parser.peek(), &TokenKind::Ident);
        assert_eq!(parser.bump().text, "a");
        assert_eq!(parser.token.text, "b");
        assert_eq!(parser.next_token.text, "c");
        parser.bump();
        parser.bump();
        assert_eq!(parser.token.kind, TokenKind::Eof);
        assert_eq!(parser.peek(), &TokenKind::Eof);
        assert_eq!(parser.bump().kind, TokenKind::Eof);
    }

    #[test]
    fn test_expect_does_not_consume_on_mismatch() {
        let mut parser = Parser::new(Arc::from("t.gvt"), "x )");
        assert!(parser.expect(&TokenKind::LParen).is_none());
        assert_eq!(parser.token.text, "x");
        assert_eq!(parser.errors.len(), 1);
        assert_eq!(parser.errors[0].message, "expected LPAREN, got IDENT (\"x\")");
        // Reporting again at the same token is deduplicated
        assert!(parser.expect(&TokenKind::RParen).is_none());
        assert_eq!(parser.errors.len(), 1);
    }

    #[test]
    fn test_parse_var_decl() {
        let (file, errors) = parse("test.gvt", "package test\n\ndef A = 42\n");
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(file.package.as_ref().map(|p| &p.name[..]), Some("test"));
        assert_eq!(file.decls.len(), 1);
        match &file.decls[0] {
            Decl::Var(decl) => {
                assert_eq!(decl.name.name, "A");
                assert!(decl.ty.is_none());
                match &decl.init {
                    Expr::BasicLit(lit) => {
                        assert_eq!(lit.kind, LitKind::Int);
                        assert_eq!(lit.text, "42");
                    }
                    other => panic!("unexpected init: {:?}", other),
                }
                assert_eq!((decl.pos.line, decl.pos.column), (3, 1));
            }
            other => panic!("unexpected decl: {:?}", other),
        }
    }

    #[test]
    fn test_declaration_count() {
        let source = "package demo

def limit: int = 10

type Point struct { x: int, y: int, }
type Color enum { Red, Green, Blue }

impl Point {
    fun norm(): int { return x * x + y * y }
}

fun main(args: list, n: int): none {
    def total = 0
    for def i in args { total = total + i }
    print(total)
}
";
        let (file, errors) = parse("demo.gvt", source);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(file.decls.len(), 5);
        match &file.decls[4] {
            Decl::Fun(decl) => {
                assert_eq!(decl.name.name, "main");
                assert_eq!(decl.params.len(), 2);
                assert_eq!(decl.body.stmts.len(), 3);
            }
            other => panic!("unexpected decl: {:?}", other),
        }
    }

    #[test]
    fn test_pathological_input_terminates() {
        let (file, errors) = parse("t.gvt", "fun fun fun fun fun");
        assert!(file.decls.is_empty());
        assert!(!errors.is_empty());

        let (_, errors) = parse("t.gvt", "fun f(: ) ) { { ( [ , , ");
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_junk_is_reported_once() {
        let (file, errors) = parse("t.gvt", "1 2 3 + + def a = 1");
        assert_eq!(file.decls.len(), 1);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "expected declaration, got INT (\"1\")");
        assert_eq!(
            errors[0].notes,
            vec!["a declaration starts with `def`, `fun`, `type` or `impl`"]
        );
    }

    #[test]
    fn test_unsupported_declarations() {
        let (_, errors) = parse("t.gvt", "import \"fmt\"\ndef a = 1\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "`import` declarations are not supported");
    }

    #[test]
    fn test_unterminated_string() {
        let (_, errors) = parse("t.gvt", "def s = \"abc");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "unterminated string literal");
        assert_eq!(errors[0].span.start.column, 9);
    }

    #[test]
    fn test_lone_pipe() {
        let (_, errors) = parse("t.gvt", "def a = b | c");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "unexpected `|`; did you mean `||`?");
        assert_eq!(
            errors[0].notes,
            vec!["`|`-separated alternatives are not supported"]
        );
    }

    #[test]
    fn test_trailing_comma_in_parameters() {
        let (file, errors) = parse("t.gvt", "fun f(a: int,): none {}");
        assert_eq!(file.decls.len(), 1);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "trailing `,` in parameter list");
    }

    #[test]
    fn test_broken_parameter_keeps_its_slot() {
        let (file, errors) = parse("t.gvt", "fun f(a, b: int): none {}");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "expected COLON, got COMMA (\",\")");
        match &file.decls[..] {
            [Decl::Fun(decl)] => assert_eq!(decl.params.len(), 2),
            other => panic!("unexpected decls: {:?}", other),
        }
    }

    fn messages(errors: &[Diagnostic]) -> Vec<&str> {
        errors.iter().map(|e| &e.message[..]).collect()
    }

    #[test]
    fn test_every_lexical_error_is_reported() {
        let (_, errors) = parse("t.gvt", "$ @ # \"abc");
        assert_eq!(
            messages(&errors),
            [
                "unexpected character `$`",
                "unexpected character `@`",
                "unexpected character `#`",
                "unterminated string literal",
            ]
        );
        assert_eq!(
            errors.iter().map(|e| e.span.start.column).collect::<Vec<_>>(),
            [1, 3, 5, 7]
        );
    }

    #[test]
    fn test_lexical_errors_while_skipping_junk() {
        let (file, errors) = parse("t.gvt", "def = 1 $ def b = 2 @");
        assert_eq!(file.decls.len(), 1);
        assert_eq!(
            messages(&errors),
            [
                "expected identifier, got ASSIGN (\"=\")",
                "unexpected character `$`",
                "unexpected character `@`",
            ]
        );

        let (_, errors) = parse("t.gvt", "impl P { x $ fun f(): none {} }");
        assert_eq!(
            messages(&errors),
            [
                "expected FUN, got IDENT (\"x\")",
                "unexpected character `$`",
            ]
        );
    }

    #[test]
    fn test_deeply_nested_parentheses() {
        let depth = 100_000;
        let source = format!("def a = {}1{}", "(".repeat(depth), ")".repeat(depth));
        let (file, errors) = parse("t.gvt", &source);
        assert_eq!(file.decls.len(), 1);
        assert_eq!(
            messages(&errors),
            ["nesting is too deep (more than 100 levels)"]
        );
        assert_eq!(errors[0].span.start.column, 9 + MAX_NESTING as u32);

        let source = format!("def a = {}", "(".repeat(depth));
        let (_, errors) = parse("t.gvt", &source);
        assert_eq!(
            messages(&errors),
            [
                "nesting is too deep (more than 100 levels)",
                "expected RPAREN, got EOF",
            ]
        );
    }

    #[test]
    fn test_deeply_nested_unary_operators() {
        let source = format!("def a = {}1", "-".repeat(100_000));
        let (file, errors) = parse("t.gvt", &source);
        assert_eq!(file.decls.len(), 1);
        assert_eq!(
            messages(&errors),
            ["nesting is too deep (more than 100 levels)"]
        );
        assert_eq!(errors[0].span.start.column, 9);

        let (_, errors) = parse("t.gvt", "def a = - - ! + 1");
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_deeply_nested_blocks() {
        let depth = 100_000;
        let source = format!("fun f(): none {}{}", "{".repeat(depth), "}".repeat(depth));
        let (file, errors) = parse("t.gvt", &source);
        assert_eq!(file.decls.len(), 1);
        assert_eq!(
            messages(&errors),
            ["nesting is too deep (more than 100 levels)"]
        );
        assert_eq!(errors[0].span.start.column, 15 + MAX_NESTING as u32);
        assert_eq!(
            errors[0].notes,
            vec!["the nested part is skipped up to its closing delimiter"]
        );
    }

    #[test]
    fn test_long_else_if_chain() {
        let source = format!(
            "fun f(): none {{ if a {{}} {}}}\ndef b = 1\n",
            "else if a {} ".repeat(100_000)
        );
        let (file, errors) = parse("t.gvt", &source);
        assert_eq!(file.decls.len(), 2);
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| e.message == "nesting is too deep (more than 100 levels)"));
    }
}
