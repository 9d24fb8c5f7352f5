//! Front-end interfaces for the taiga Fortran lowering.
//!
//! This crate is the boundary the lowering pass sees: the executable parse
//! tree ([`ast`]), typed expressions ([`expr`]), and the semantic context
//! ([`sema`]). It also provides the typed-index arena foundation ([`entity`])
//! shared with the IR crate.

pub mod ast;
pub mod entity;
pub mod expr;
pub mod sema;

pub use ast::{Label, SourceRange};
pub use expr::{BinaryOp, Expr, Expression};
pub use sema::{ScopeId, ScopeKind, SemanticsContext, SymbolId};
