use std::rc::Rc;

use crate::literal::Literal;
use crate::stmt::Stmt;
use crate::token::Token;

/// Identifies one `Variable`/`Assign`/`This`/`Super` node for the
/// resolver's side-table. Assigned by the parser at construction time
/// (see `Parser::fresh_id`) since this host has no reference-equality
/// hash map to key on the node itself.
pub type ExprId = u32;

/// An expression: anything that produces a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Assign(AssignExpr),
    Binary(BinaryExpr),
    Call(CallExpr),
    /// An anonymous function (lambda expression).
    Function(FunctionExpr),
    Get(GetExpr),
    Grouping(GroupingExpr),
    Literal(Literal),
    Logical(LogicalExpr),
    Set(SetExpr),
    Super(SuperExpr),
    This(ThisExpr),
    Unary(UnaryExpr),
    Variable(VariableExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpr {
    pub id: ExprId,
    pub name: Token,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    /// The closing `)`, kept around purely so runtime errors ("Expected N
    /// arguments but got M.") can report a line number.
    pub paren: Token,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpr {
    pub params: Vec<Token>,
    pub body: Rc<Vec<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetExpr {
    pub object: Box<Expr>,
    pub name: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupingExpr {
    pub expression: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogicalExpr {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetExpr {
    pub object: Box<Expr>,
    pub name: Token,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuperExpr {
    pub id: ExprId,
    pub keyword: Token,
    pub method: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThisExpr {
    pub id: ExprId,
    pub keyword: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub operator: Token,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableExpr {
    pub id: ExprId,
    pub name: Token,
}
