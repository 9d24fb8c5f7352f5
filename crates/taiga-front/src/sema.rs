//! Semantic context: symbol table, scope tree, and the expression analyzer.
//!
//! The lowering consumes these through two narrow calls: scope lookup by
//! source range (for region attribution) and designator-to-expression
//! analysis. Symbol resolution itself happens before lowering and is not
//! modeled here beyond `intern`.

use serde::{Deserialize, Serialize};

use crate::ast::{DataRef, Name, SourceRange, StructureComponent, Variable};
use crate::define_entity;
use crate::entity::PrimaryMap;
use crate::expr::Expression;

define_entity!(SymbolId);
define_entity!(ScopeId);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub scope: ScopeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeKind {
    Global,
    /// A program unit (main program, function, subroutine).
    Unit,
    /// A construct that introduces a new lexical scope (BLOCK, DO, ...).
    Construct,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub source: SourceRange,
    pub kind: ScopeKind,
}

/// Owns the symbol table and scope tree for a whole program.
#[derive(Debug)]
pub struct SemanticsContext {
    symbols: PrimaryMap<SymbolId, Symbol>,
    scopes: PrimaryMap<ScopeId, Scope>,
    global: ScopeId,
}

impl Default for SemanticsContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticsContext {
    pub fn new() -> Self {
        let mut scopes = PrimaryMap::new();
        let global = scopes.push(Scope {
            parent: None,
            source: SourceRange::new(0, u32::MAX),
            kind: ScopeKind::Global,
        });
        Self {
            symbols: PrimaryMap::new(),
            scopes,
            global,
        }
    }

    pub fn global_scope(&self) -> ScopeId {
        self.global
    }

    pub fn add_scope(&mut self, parent: ScopeId, source: SourceRange, kind: ScopeKind) -> ScopeId {
        self.scopes.push(Scope {
            parent: Some(parent),
            source,
            kind,
        })
    }

    pub fn intern_symbol(&mut self, name: impl Into<String>, scope: ScopeId) -> SymbolId {
        self.symbols.push(Symbol {
            name: name.into(),
            scope,
        })
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id]
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    /// Innermost scope whose source range contains `source`.
    ///
    /// Falls back to the global scope, which spans everything.
    pub fn find_scope(&self, source: SourceRange) -> ScopeId {
        let mut best = self.global;
        let mut best_width = u64::MAX;
        for (id, scope) in self.scopes.iter() {
            if scope.source.contains(source) {
                let width = u64::from(scope.source.end - scope.source.start);
                if width <= best_width {
                    best = id;
                    best_width = width;
                }
            }
        }
        best
    }

    pub fn analyzer(&self) -> ExpressionAnalyzer<'_> {
        ExpressionAnalyzer { ctx: self }
    }
}

/// Converts designators into evaluable expressions.
///
/// Returns `None` when a name was never bound to a symbol — the caller treats
/// that as a semantics bug upstream.
pub struct ExpressionAnalyzer<'a> {
    ctx: &'a SemanticsContext,
}

impl ExpressionAnalyzer<'_> {
    pub fn analyze_name(&self, name: &Name) -> Option<Expression> {
        let symbol = name.symbol?;
        self.ctx.symbols.get(symbol)?;
        Some(Expression::Symbol(symbol))
    }

    pub fn analyze_variable(&self, var: &Variable) -> Option<Expression> {
        self.analyze_data_ref(&var.data_ref)
    }

    pub fn analyze_data_ref(&self, dr: &DataRef) -> Option<Expression> {
        match dr {
            DataRef::Name(name) => self.analyze_name(name),
            DataRef::Component(sc) => self.analyze_component(sc),
        }
    }

    /// Components resolve to the component's own symbol; the base designator
    /// is a data-layout concern, not a control-flow one.
    pub fn analyze_component(&self, sc: &StructureComponent) -> Option<Expression> {
        self.analyze_name(&sc.component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_scope_prefers_innermost() {
        let mut ctx = SemanticsContext::new();
        let unit = ctx.add_scope(ctx.global_scope(), SourceRange::new(0, 100), ScopeKind::Unit);
        let inner = ctx.add_scope(unit, SourceRange::new(20, 40), ScopeKind::Construct);

        assert_eq!(ctx.find_scope(SourceRange::new(25, 30)), inner);
        assert_eq!(ctx.find_scope(SourceRange::new(5, 10)), unit);
        assert_eq!(ctx.find_scope(SourceRange::new(0, 200)), ctx.global_scope());
    }

    #[test]
    fn analyzer_resolves_bound_names() {
        let mut ctx = SemanticsContext::new();
        let sym = ctx.intern_symbol("x", ctx.global_scope());
        let name = Name::resolved("x", sym);
        assert_eq!(
            ctx.analyzer().analyze_name(&name),
            Some(Expression::Symbol(sym))
        );

        let unbound = Name {
            ident: "y".into(),
            symbol: None,
        };
        assert_eq!(ctx.analyzer().analyze_name(&unbound), None);
    }
}
