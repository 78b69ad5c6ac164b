use crate::ast::{BinaryOp, UnaryOp};
use crate::pos::Position;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token. For strings this is the decoded value.
    pub text: String,
    pub pos: Position,
    /// Position just past the last character of the token.
    pub end: Position,
}

impl Token {
    pub(crate) fn is_illegal(&self) -> bool {
        matches!(self.kind, TokenKind::Illegal(_))
    }

    pub(crate) fn to_binop<F>(&self, cond: F) -> Option<BinaryOp>
    where
        F: FnOnce(BinaryOp) -> bool,
    {
        let op = match self.kind {
            TokenKind::OrOr => BinaryOp::LogicalOr,
            TokenKind::AndAnd => BinaryOp::LogicalAnd,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            TokenKind::LAngle => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::RAngle => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            _ => return None,
        };
        if cond(op) {
            Some(op)
        } else {
            None
        }
    }

    pub(crate) fn to_unop(&self) -> Option<UnaryOp> {
        match self.kind {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            _ => None,
        }
    }
}

/// Why the lexer produced an `ILLEGAL` token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character `{0}`")]
    UnexpectedChar(char),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unexpected `&`; did you mean `&&`?")]
    LoneAmpersand,
    #[error("unexpected `|`; did you mean `||`?")]
    LonePipe,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Illegal(LexError),

    Ident,

    /// `42`, `1_000`
    Int,
    /// `1.5`
    Float,
    /// `"..."`
    String,
    /// `true`
    True,
    /// `false`
    False,
    /// `none`
    None,

    /// `package`
    KeywordPackage,
    /// `import`
    KeywordImport,
    /// `export`
    KeywordExport,
    /// `def`
    KeywordDef,
    /// `fun`
    KeywordFun,
    /// `type`
    KeywordType,
    /// `struct`
    KeywordStruct,
    /// `enum`
    KeywordEnum,
    /// `impl`
    KeywordImpl,
    /// `return`
    KeywordReturn,
    /// `if`
    KeywordIf,
    /// `else`
    KeywordElse,
    /// `while`
    KeywordWhile,
    /// `for`
    KeywordFor,
    /// `in`
    KeywordIn,
    /// `handle`
    KeywordHandle,
    /// `Ok`
    KeywordOk,
    /// `Err`
    KeywordErr,
    /// `as`
    KeywordAs,

    /// `=`
    Assign,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `<`
    LAngle,
    /// `>`
    RAngle,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `?`
    Question,
    /// `!`
    Bang,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
    /// `->`
    Arrow,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Eof => "EOF",
            TokenKind::Illegal(_) => "ILLEGAL",
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::Float => "FLOAT",
            TokenKind::String => "STRING",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::None => "NONE",
            TokenKind::KeywordPackage => "PACKAGE",
            TokenKind::KeywordImport => "IMPORT",
            TokenKind::KeywordExport => "EXPORT",
            TokenKind::KeywordDef => "DEF",
            TokenKind::KeywordFun => "FUN",
            TokenKind::KeywordType => "TYPE",
            TokenKind::KeywordStruct => "STRUCT",
            TokenKind::KeywordEnum => "ENUM",
            TokenKind::KeywordImpl => "IMPL",
            TokenKind::KeywordReturn => "RETURN",
            TokenKind::KeywordIf => "IF",
            TokenKind::KeywordElse => "ELSE",
            TokenKind::KeywordWhile => "WHILE",
            TokenKind::KeywordFor => "FOR",
            TokenKind::KeywordIn => "IN",
            TokenKind::KeywordHandle => "HANDLE",
            TokenKind::KeywordOk => "OK",
            TokenKind::KeywordErr => "ERR",
            TokenKind::KeywordAs => "AS",
            TokenKind::Assign => "ASSIGN",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::LAngle => "LANGLE",
            TokenKind::RAngle => "RANGLE",
            TokenKind::Colon => "COLON",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::Question => "QUESTION",
            TokenKind::Bang => "BANG",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "STAR",
            TokenKind::Slash => "SLASH",
            TokenKind::Percent => "PERCENT",
            TokenKind::EqEq => "EQEQ",
            TokenKind::NotEq => "NEQ",
            TokenKind::LtEq => "LTE",
            TokenKind::GtEq => "GTE",
            TokenKind::AndAnd => "ANDAND",
            TokenKind::OrOr => "OROR",
            TokenKind::Arrow => "ARROW",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => f.write_str("EOF"),
            _ => write!(f, "{} ({:?})", self.kind, self.text),
        }
    }
}
