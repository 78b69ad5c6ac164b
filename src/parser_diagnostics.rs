use thiserror::Error;

use crate::diagnostic::{Diagnostic, Severity, Span};
use crate::token::LexError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected {expected}, got {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("expected declaration, got {found}")]
    ExpectedDeclaration { found: String },
    #[error("`{keyword}` declarations are not supported")]
    UnsupportedDeclaration { keyword: String },
    #[error("expected expression, got {found}")]
    ExpectedExpression { found: String },
    #[error("expected type, got {found}")]
    ExpectedType { found: String },
    #[error("expected identifier, got {found}")]
    ExpectedIdentifier { found: String },
    #[error("expected `,` or `{closing}`, got {found}")]
    MissingSeparator { closing: &'static str, found: String },
    #[error("trailing `,` in {list}")]
    TrailingComma { list: &'static str },
    #[error("unclosed block: expected `}}` before end of file")]
    UnclosedBlock,
    #[error("nesting is too deep (more than {limit} levels)")]
    TooDeeplyNested { limit: usize },
    #[error("{0}")]
    Illegal(LexError),
}

impl ParseError {
    pub fn severity(&self) -> Severity {
        use ParseError::*;
        match self {
            UnexpectedToken { .. }
            | ExpectedDeclaration { .. }
            | UnsupportedDeclaration { .. }
            | ExpectedExpression { .. }
            | ExpectedType { .. }
            | ExpectedIdentifier { .. }
            | MissingSeparator { .. }
            | TrailingComma { .. }
            | UnclosedBlock
            | TooDeeplyNested { .. }
            | Illegal(_) => Severity::Error,
        }
    }

    pub fn notes(&self) -> Vec<String> {
        use ParseError::*;
        match self {
            ExpectedDeclaration { .. } => {
                vec!["a declaration starts with `def`, `fun`, `type` or `impl`".to_owned()]
            }
            Illegal(LexError::LonePipe) => {
                vec!["`|`-separated alternatives are not supported".to_owned()]
            }
            UnclosedBlock => vec!["the block was opened here".to_owned()],
            TooDeeplyNested { .. } => {
                vec!["the nested part is skipped up to its closing delimiter".to_owned()]
            }
            _ => vec![],
        }
    }

    pub fn into_diagnostic(self, span: Span) -> Diagnostic {
        Diagnostic {
            severity: self.severity(),
            notes: self.notes(),
            message: self.to_string(),
            span,
        }
    }
}
