//! Typed, evaluable expressions.
//!
//! The lowering never evaluates expressions; it only carries them into IR
//! statements. [`Expression`] is the closed representation semantic analysis
//! attaches to every parse-tree [`Expr`] node, reachable via
//! [`Expr::typed_expr`].

use serde::{Deserialize, Serialize};

use crate::ast::SourceRange;
use crate::sema::SymbolId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// A typed expression produced by semantic analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Integer(i64),
    Logical(bool),
    Symbol(SymbolId),
    Negate(Box<Expression>),
    Not(Box<Expression>),
    Binary(BinaryOp, Box<Expression>, Box<Expression>),
}

impl Expression {
    /// Integer constant expression.
    pub fn integer(value: i64) -> Self {
        Expression::Integer(value)
    }

    /// The constant `.TRUE.` expression.
    pub fn truth() -> Self {
        Expression::Logical(true)
    }

    pub fn binary(op: BinaryOp, lhs: Expression, rhs: Expression) -> Self {
        Expression::Binary(op, Box::new(lhs), Box::new(rhs))
    }
}

/// A parse-tree expression node with its pre-computed typed expression.
#[derive(Debug, Clone)]
pub struct Expr {
    pub source: SourceRange,
    typed: Expression,
}

impl Expr {
    pub fn new(typed: Expression, source: SourceRange) -> Self {
        Self { source, typed }
    }

    /// The typed expression semantic analysis attached to this node.
    pub fn typed_expr(&self) -> &Expression {
        &self.typed
    }
}
