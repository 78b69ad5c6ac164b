pub use crate::diagnostic::{Diagnostic, Severity};
pub use crate::parser::parse;
pub use crate::parser_diagnostics::ParseError;

pub mod ast;
pub mod ast_dump;
pub mod diagnostic;
pub mod lexing;
pub mod parser;
pub mod parser_diagnostics;
pub mod pos;
pub mod str_util;
pub mod token;
pub(crate) mod util;
