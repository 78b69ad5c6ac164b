use crate::pos::Position;
use crate::token::{LexError, Token, TokenKind};
use crate::util::CharExt;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    vec![
        ("package", TokenKind::KeywordPackage),
        ("import", TokenKind::KeywordImport),
        ("export", TokenKind::KeywordExport),
        ("def", TokenKind::KeywordDef),
        ("fun", TokenKind::KeywordFun),
        ("type", TokenKind::KeywordType),
        ("struct", TokenKind::KeywordStruct),
        ("enum", TokenKind::KeywordEnum),
        ("impl", TokenKind::KeywordImpl),
        ("return", TokenKind::KeywordReturn),
        ("if", TokenKind::KeywordIf),
        ("else", TokenKind::KeywordElse),
        ("while", TokenKind::KeywordWhile),
        ("for", TokenKind::KeywordFor),
        ("in", TokenKind::KeywordIn),
        ("handle", TokenKind::KeywordHandle),
        ("Ok", TokenKind::KeywordOk),
        ("Err", TokenKind::KeywordErr),
        ("as", TokenKind::KeywordAs),
        ("true", TokenKind::True),
        ("false", TokenKind::False),
        ("none", TokenKind::None),
    ]
    .into_iter()
    .collect::<HashMap<_, _>>()
});

/// On-demand tokenizer over an in-memory source.
///
/// Never fails: malformed input comes back as [`TokenKind::Illegal`] tokens,
/// and once the input is exhausted every call returns [`TokenKind::Eof`].
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    file: Arc<str>,
    pos: usize,
    line: u32,
    /// Scalars consumed since the start of the current line.
    col: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(file: impl Into<Arc<str>>, source: &'a str) -> Self {
        Lexer {
            source,
            file: file.into(),
            pos: 0,
            line: 1,
            col: 0,
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let start = self.here();
        let start_offset = self.pos;
        let first = match self.bump() {
            Some(ch) => ch,
            None => {
                return Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    end: start.clone(),
                    pos: start,
                };
            }
        };
        let kind = match first {
            '"' => return self.lex_string(start),
            '0'..='9' => self.lex_numeric(),
            '=' => {
                if self.eat('=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.eat('=') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.eat('=') {
                    TokenKind::LtEq
                } else {
                    TokenKind::LAngle
                }
            }
            '>' => {
                if self.eat('=') {
                    TokenKind::GtEq
                } else {
                    TokenKind::RAngle
                }
            }
            '&' => {
                if self.eat('&') {
                    TokenKind::AndAnd
                } else {
                    TokenKind::Illegal(LexError::LoneAmpersand)
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::OrOr
                } else {
                    TokenKind::Illegal(LexError::LonePipe)
                }
            }
            '-' => {
                if self.eat('>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                }
            }
            '+' => TokenKind::Plus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '?' => TokenKind::Question,
            ch if ch.is_ident_start() => {
                while self.peek().is_ident_part() {
                    self.bump();
                }
                let ident = &self.source[start_offset..self.pos];
                KEYWORDS.get(ident).cloned().unwrap_or(TokenKind::Ident)
            }
            ch => TokenKind::Illegal(LexError::UnexpectedChar(ch)),
        };
        Token {
            kind,
            text: self.source[start_offset..self.pos].to_owned(),
            pos: start,
            end: self.here(),
        }
    }

    /// Called after the opening quote has been consumed.
    fn lex_string(&mut self, start: Position) -> Token {
        let mut value = String::new();
        loop {
            let ch = match self.bump() {
                Some(ch) => ch,
                None => return self.unterminated_string(start),
            };
            match ch {
                '"' => break,
                '\\' => match self.bump() {
                    None => return self.unterminated_string(start),
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('x') => self.lex_hex_escape('x', 2, &mut value),
                    Some('u') => self.lex_hex_escape('u', 4, &mut value),
                    Some('U') => self.lex_hex_escape('U', 8, &mut value),
                    // `\"`, `\\`, and unknown escapes are taken literally
                    Some(other) => value.push(other),
                },
                _ => value.push(ch),
            }
        }
        Token {
            kind: TokenKind::String,
            text: value,
            pos: start,
            end: self.here(),
        }
    }

    fn unterminated_string(&mut self, start: Position) -> Token {
        Token {
            kind: TokenKind::Illegal(LexError::UnterminatedString),
            text: self.source[start.offset..self.pos].to_owned(),
            pos: start,
            end: self.here(),
        }
    }

    /// Decodes `digits` hex digits following `\x`, `\u` or `\U`.
    /// Malformed escapes are kept as written.
    fn lex_hex_escape(&mut self, letter: char, digits: usize, value: &mut String) {
        let rest = &self.source[self.pos..];
        let hex = rest
            .char_indices()
            .nth(digits - 1)
            .map(|(i, ch)| &rest[..i + ch.len_utf8()])
            .filter(|hex| hex.chars().all(|ch| ch.is_ascii_hexdigit()));
        let decoded = hex
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);
        match decoded {
            Some(ch) => {
                for _ in 0..digits {
                    self.bump();
                }
                value.push(ch);
            }
            None => {
                value.push('\\');
                value.push(letter);
            }
        }
    }

    /// Called after the first digit has been consumed.
    fn lex_numeric(&mut self) -> TokenKind {
        self.skip_digits();
        // `1.` followed by a non-digit leaves the dot for the next token
        if self.peek() == Some('.') && self.peek_n(1).map_or(false, |ch| ch.is_ascii_digit()) {
            self.bump();
            self.skip_digits();
            TokenKind::Float
        } else {
            TokenKind::Int
        }
    }

    fn skip_digits(&mut self) {
        while self
            .peek()
            .map_or(false, |ch| ch.is_ascii_digit() || ch == '_')
        {
            self.bump();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.bump();
            } else if ch == '/' && self.peek_n(1) == Some('/') {
                while self.peek().map_or(false, |ch| ch != '\n') {
                    self.bump();
                }
            } else if ch == '/' && self.peek_n(1) == Some('*') {
                self.bump();
                self.bump();
                // An unterminated block comment runs to the end of input
                while self.peek().is_some() {
                    if self.peek() == Some('*') && self.peek_n(1) == Some('/') {
                        self.bump();
                        self.bump();
                        break;
                    }
                    self.bump();
                }
            } else {
                return;
            }
        }
    }

    fn here(&self) -> Position {
        Position::new(self.file.clone(), self.pos, self.line, self.col + 1)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn peek_n(&self, off: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(off)
    }

    fn peek(&self) -> Option<char> {
        self.peek_n(0)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    /// Yields every token before `EOF`.
    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(source: &str) -> Vec<(TokenKind, String)> {
        let mut lexer = Lexer::new("test.gvt", source);
        let mut tokens = vec![];
        loop {
            let token = lexer.next_token();
            let eof = token.kind == TokenKind::Eof;
            tokens.push((token.kind, token.text));
            if eof {
                break;
            }
        }
        tokens
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex_all(source).into_iter().map(|(kind, _)| kind).collect()
    }

    fn tok(kind: TokenKind, text: &str) -> (TokenKind, String) {
        (kind, text.to_owned())
    }

    #[test]
    fn test_package_header() {
        assert_eq!(
            lex_all("package mypkg\n"),
            vec![
                tok(TokenKind::KeywordPackage, "package"),
                tok(TokenKind::Ident, "mypkg"),
                tok(TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_numbers_and_trailing_dot() {
        assert_eq!(
            lex_all("1.5 1. x"),
            vec![
                tok(TokenKind::Float, "1.5"),
                tok(TokenKind::Int, "1"),
                tok(TokenKind::Dot, "."),
                tok(TokenKind::Ident, "x"),
                tok(TokenKind::Eof, ""),
            ]
        );
        assert_eq!(
            lex_all("1_000 3.14_15 1.x"),
            vec![
                tok(TokenKind::Int, "1_000"),
                tok(TokenKind::Float, "3.14_15"),
                tok(TokenKind::Int, "1"),
                tok(TokenKind::Dot, "."),
                tok(TokenKind::Ident, "x"),
                tok(TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("= == ! != < <= > >= && || -> - + * / % ( ) { } [ ] : ; , . ?"),
            vec![
                TokenKind::Assign,
                TokenKind::EqEq,
                TokenKind::Bang,
                TokenKind::NotEq,
                TokenKind::LAngle,
                TokenKind::LtEq,
                TokenKind::RAngle,
                TokenKind::GtEq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Arrow,
                TokenKind::Minus,
                TokenKind::Plus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::Colon,
                TokenKind::Semicolon,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Question,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("a<=b==c"),
            vec![
                TokenKind::Ident,
                TokenKind::LtEq,
                TokenKind::Ident,
                TokenKind::EqEq,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lone_ampersand_and_pipe() {
        assert_eq!(
            lex_all("a & b | c"),
            vec![
                tok(TokenKind::Ident, "a"),
                tok(TokenKind::Illegal(LexError::LoneAmpersand), "&"),
                tok(TokenKind::Ident, "b"),
                tok(TokenKind::Illegal(LexError::LonePipe), "|"),
                tok(TokenKind::Ident, "c"),
                tok(TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("package import export def fun type struct enum impl return if else while for in handle Ok Err as true false none ok"),
            vec![
                TokenKind::KeywordPackage,
                TokenKind::KeywordImport,
                TokenKind::KeywordExport,
                TokenKind::KeywordDef,
                TokenKind::KeywordFun,
                TokenKind::KeywordType,
                TokenKind::KeywordStruct,
                TokenKind::KeywordEnum,
                TokenKind::KeywordImpl,
                TokenKind::KeywordReturn,
                TokenKind::KeywordIf,
                TokenKind::KeywordElse,
                TokenKind::KeywordWhile,
                TokenKind::KeywordFor,
                TokenKind::KeywordIn,
                TokenKind::KeywordHandle,
                TokenKind::KeywordOk,
                TokenKind::KeywordErr,
                TokenKind::KeywordAs,
                TokenKind::True,
                TokenKind::False,
                TokenKind::None,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            lex_all("_tmp x1 héllo 名前"),
            vec![
                tok(TokenKind::Ident, "_tmp"),
                tok(TokenKind::Ident, "x1"),
                tok(TokenKind::Ident, "héllo"),
                tok(TokenKind::Ident, "名前"),
                tok(TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_comments() {
        let source = "\n // comment here\n\tpackage\tname// trailing comment\n/* block\n comment */ x /* open";
        assert_eq!(
            lex_all(source),
            vec![
                tok(TokenKind::KeywordPackage, "package"),
                tok(TokenKind::Ident, "name"),
                tok(TokenKind::Ident, "x"),
                tok(TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            lex_all(r#""hello" "a\nb\t\r\"\\" "\x41é\U0001F600" "\q""#),
            vec![
                tok(TokenKind::String, "hello"),
                tok(TokenKind::String, "a\nb\t\r\"\\"),
                tok(TokenKind::String, "A\u{e9}\u{1F600}"),
                tok(TokenKind::String, "q"),
                tok(TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_malformed_hex_escapes() {
        assert_eq!(
            lex_all(r#""\xZZ" "\u12" "\uD800""#),
            vec![
                tok(TokenKind::String, "\\xZZ"),
                tok(TokenKind::String, "\\u12"),
                tok(TokenKind::String, "\\uD800"),
                tok(TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(
            lex_all("def s = \"abc"),
            vec![
                tok(TokenKind::KeywordDef, "def"),
                tok(TokenKind::Ident, "s"),
                tok(TokenKind::Assign, "="),
                tok(TokenKind::Illegal(LexError::UnterminatedString), "\"abc"),
                tok(TokenKind::Eof, ""),
            ]
        );
        assert_eq!(
            kinds("\"abc\\"),
            vec![
                TokenKind::Illegal(LexError::UnterminatedString),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_illegal_char() {
        assert_eq!(
            lex_all("$ @"),
            vec![
                tok(TokenKind::Illegal(LexError::UnexpectedChar('$')), "$"),
                tok(TokenKind::Illegal(LexError::UnexpectedChar('@')), "@"),
                tok(TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new("test.gvt", "x");
        assert_eq!(lexer.next_token().kind, TokenKind::Ident);
        for _ in 0..3 {
            assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        }
    }

    #[test]
    fn test_positions() {
        let source = "package a\n  def é = \"x\"\n";
        let tokens = Lexer::new("test.gvt", source).collect::<Vec<_>>();
        let positions = tokens
            .iter()
            .map(|token| (token.pos.line, token.pos.column, token.pos.offset))
            .collect::<Vec<_>>();
        assert_eq!(
            positions,
            vec![(1, 1, 0), (1, 9, 8), (2, 3, 12), (2, 7, 16), (2, 9, 19), (2, 11, 21)]
        );
        let string = &tokens[5];
        assert_eq!((string.end.line, string.end.column), (2, 14));
        assert_eq!(&*string.pos.file, "test.gvt");
    }
}
