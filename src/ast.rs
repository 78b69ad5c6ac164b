use crate::pos::Position;
use derive_more::From;
use serde::Serialize;

/// Root of a parsed source file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct File {
    pub package: Option<Ident>,
    pub decls: Vec<Decl>,
    pub pos: Position,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, From)]
#[serde(tag = "type")]
pub enum Decl {
    Fun(FunDecl),
    Var(VarDecl),
    Type(TypeDecl),
    Impl(ImplBlock),
}

impl Decl {
    pub fn pos(&self) -> &Position {
        match self {
            Decl::Fun(decl) => &decl.pos,
            Decl::Var(decl) => &decl.pos,
            Decl::Type(decl) => &decl.pos,
            Decl::Impl(decl) => &decl.pos,
        }
    }
}

/// `fun name(a: int, b: int): int { ... }`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FunDecl {
    pub name: Ident,
    pub params: Vec<Param>,
    pub return_type: TypeRef,
    pub body: Block,
    pub pos: Position,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Param {
    pub name: Ident,
    pub ty: TypeRef,
    pub pos: Position,
}

/// `def name: type = init`, both at the top level and inside blocks.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VarDecl {
    pub name: Ident,
    pub ty: Option<TypeRef>,
    pub init: Expr,
    pub pos: Position,
}

/// `type Name struct { ... }` or `type Name enum { ... }`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: Ident,
    pub body: TypeBody,
    pub pos: Position,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum TypeBody {
    Struct { fields: Vec<Field> },
    Enum { variants: Vec<Ident> },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Field {
    pub name: Ident,
    pub ty: TypeRef,
    pub pos: Position,
}

/// `impl Name { fun ... }`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ImplBlock {
    pub target: Ident,
    pub methods: Vec<FunDecl>,
    pub pos: Position,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum TypeRef {
    Named(Ident),
    /// The `none` type.
    None(Position),
    /// A type was required here but could not be parsed.
    Errored(Position),
}

impl TypeRef {
    pub fn pos(&self) -> &Position {
        match self {
            TypeRef::Named(ident) => &ident.pos,
            TypeRef::None(pos) | TypeRef::Errored(pos) => pos,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, From)]
#[serde(tag = "type")]
pub enum Stmt {
    Block(Block),
    Var(VarDecl),
    Assign(AssignStmt),
    Expr(ExprStmt),
    Return(ReturnStmt),
    If(IfStmt),
    While(WhileStmt),
    ForIn(ForInStmt),
}

impl Stmt {
    pub fn pos(&self) -> &Position {
        match self {
            Stmt::Block(stmt) => &stmt.pos,
            Stmt::Var(stmt) => &stmt.pos,
            Stmt::Assign(stmt) => &stmt.pos,
            Stmt::Expr(stmt) => &stmt.pos,
            Stmt::Return(stmt) => &stmt.pos,
            Stmt::If(stmt) => &stmt.pos,
            Stmt::While(stmt) => &stmt.pos,
            Stmt::ForIn(stmt) => &stmt.pos,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub pos: Position,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AssignStmt {
    pub left: Expr,
    pub right: Expr,
    pub pos: Position,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub pos: Position,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReturnStmt {
    pub result: Option<Expr>,
    pub pos: Position,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then: Block,
    /// Either another `If` (`else if`) or a `Block`.
    #[serde(rename = "else")]
    pub else_: Option<Box<Stmt>>,
    pub pos: Position,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Block,
    pub pos: Position,
}

/// `for def x in xs { ... }`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ForInStmt {
    pub binding: Ident,
    pub iterable: Expr,
    pub body: Block,
    pub pos: Position,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, From)]
#[serde(tag = "type")]
pub enum Expr {
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Call(CallExpr),
    Ident(Ident),
    BasicLit(BasicLit),
    ArrayLit(ArrayLit),
    Errored(Errored),
}

#[macro_export]
macro_rules! delegate_expr {
    ($e:expr, $x:ident => $arm:expr) => {
        match $e {
            $crate::ast::Expr::Binary($x) => $arm,
            $crate::ast::Expr::Unary($x) => $arm,
            $crate::ast::Expr::Call($x) => $arm,
            $crate::ast::Expr::Ident($x) => $arm,
            $crate::ast::Expr::BasicLit($x) => $arm,
            $crate::ast::Expr::ArrayLit($x) => $arm,
            $crate::ast::Expr::Errored($x) => $arm,
        }
    };
}

impl Expr {
    pub fn pos(&self) -> &Position {
        delegate_expr!(self, expr => &expr.pos)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub op: BinaryOp,
    pub right: Box<Expr>,
    pub pos: Position,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    pub pos: Position,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    pub pos: Position,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub pos: Position,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BasicLit {
    pub kind: LitKind,
    /// Source text; the decoded value for strings.
    pub text: String,
    pub pos: Position,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum LitKind {
    Int,
    Float,
    String,
    Bool,
    None,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ArrayLit {
    pub elements: Vec<Expr>,
    pub pos: Position,
}

/// Placeholder for an expression that failed to parse.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Errored {
    pub pos: Position,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `||`
    LogicalOr,
    /// `&&`
    LogicalAnd,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::LogicalOr => "||",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }

    pub(crate) fn is_equality(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
        )
    }

    pub(crate) fn is_additive(self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub)
    }

    pub(crate) fn is_multiplicative(self) -> bool {
        matches!(self, BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Neg,
    /// `+`
    Plus,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
        }
    }
}
