//! Switch-argument composition.
//!
//! Turns a `Switch` linear op back into concrete terminator arguments:
//! selector statement, default label, and the value/label pairing. The
//! last label of the op's target list is always the fall-through; for the
//! SELECT constructs a `DEFAULT` arm takes its place when present.

use taiga_front::ast;
use taiga_front::sema::SemanticsContext;

use crate::ir::builder::FirBuilder;
use crate::ir::stmt::{CaseValue, RankValue, StmtId, TypeValue};
use crate::{semantics_bug, wrong_path};

use super::analysis::LLabel;
use super::linear::SwitchSource;

/// Composed arguments for one of the four switch terminators.
#[derive(Debug)]
pub enum ComposedSwitch {
    Plain {
        selector: Option<StmtId>,
        default: LLabel,
        targets: Vec<(i64, LLabel)>,
    },
    Case {
        selector: Option<StmtId>,
        default: LLabel,
        targets: Vec<(Vec<CaseValue>, LLabel)>,
    },
    Rank {
        selector: Option<StmtId>,
        default: LLabel,
        targets: Vec<(RankValue, LLabel)>,
    },
    Type {
        selector: Option<StmtId>,
        default: LLabel,
        targets: Vec<(TypeValue, LLabel)>,
    },
}

impl ComposedSwitch {
    /// Every label the terminator will need resolved, default included.
    pub fn labels(&self) -> Vec<LLabel> {
        match self {
            ComposedSwitch::Plain { default, targets, .. } => {
                collect_labels(targets.iter().map(|(_, l)| *l), *default)
            }
            ComposedSwitch::Case { default, targets, .. } => {
                collect_labels(targets.iter().map(|(_, l)| *l), *default)
            }
            ComposedSwitch::Rank { default, targets, .. } => {
                collect_labels(targets.iter().map(|(_, l)| *l), *default)
            }
            ComposedSwitch::Type { default, targets, .. } => {
                collect_labels(targets.iter().map(|(_, l)| *l), *default)
            }
        }
    }
}

fn collect_labels(targets: impl Iterator<Item = LLabel>, default: LLabel) -> Vec<LLabel> {
    let mut labels: Vec<LLabel> = targets.collect();
    labels.push(default);
    labels
}

/// Consult the parse tree behind a `Switch` op and produce its arguments.
///
/// Selector evaluation statements are emitted into the current block.
pub fn compose_switch_args(
    builder: &mut FirBuilder<'_>,
    ctx: &SemanticsContext,
    source: SwitchSource<'_>,
    refs: &[LLabel],
) -> ComposedSwitch {
    match source {
        SwitchSource::ComputedGoto(cg) => {
            let selector = builder.expr(cg.expr.typed_expr().clone());
            let (arms, default) = split_fallthrough(refs);
            ComposedSwitch::Plain {
                selector: Some(selector),
                default,
                targets: number_from_one(arms),
            }
        }
        SwitchSource::ArithmeticIf(aif) => {
            // <0 / ==0 / >0 is exhaustive; the zero branch doubles as the
            // default successor.
            let selector = builder.expr(aif.expr.typed_expr().clone());
            let [neg, zero, pos] = refs else {
                wrong_path!();
            };
            ComposedSwitch::Plain {
                selector: Some(selector),
                default: *zero,
                targets: vec![(-1, *neg), (1, *pos)],
            }
        }
        SwitchSource::Call(call) => {
            // The call itself happens here; the switch dispatches on its
            // alternate-return indicator.
            let callee = proc_designator_expr(ctx, &call.proc);
            let args = call
                .args
                .iter()
                .filter_map(|a| match a {
                    ast::ActualArg::Expr(e) => Some(e.typed_expr().clone()),
                    ast::ActualArg::AltReturn(_) => None,
                })
                .collect();
            let selector = builder.call(callee, args);
            let (arms, default) = split_fallthrough(refs);
            ComposedSwitch::Plain {
                selector: Some(selector),
                default,
                targets: number_from_one(arms),
            }
        }
        SwitchSource::Case(c) => {
            let selector = builder.expr(c.select.stmt.expr.typed_expr().clone());
            let (arms, fallthrough) = split_fallthrough(refs);
            let mut default = fallthrough;
            let mut targets = Vec::new();
            for (case, &label) in c.cases.iter().zip(arms) {
                match &case.case_stmt.stmt.selector {
                    ast::CaseSelector::Default => default = label,
                    ast::CaseSelector::Ranges(ranges) => {
                        let values = ranges
                            .iter()
                            .map(|r| case_value(builder, r))
                            .collect::<Vec<_>>();
                        targets.push((values, label));
                    }
                }
            }
            ComposedSwitch::Case {
                selector: Some(selector),
                default,
                targets,
            }
        }
        SwitchSource::Rank(c) => {
            let selector = selector_expr(builder, ctx, &c.select.stmt.selector);
            let (arms, fallthrough) = split_fallthrough(refs);
            let mut default = fallthrough;
            let mut targets = Vec::new();
            for (case, &label) in c.cases.iter().zip(arms) {
                match &case.rank_stmt.stmt.rank {
                    ast::RankGuard::Default => default = label,
                    ast::RankGuard::Star => targets.push((RankValue::AssumedSize, label)),
                    ast::RankGuard::Value(e) => {
                        let value = builder.expr(e.typed_expr().clone());
                        targets.push((RankValue::Exactly(value), label));
                    }
                }
            }
            ComposedSwitch::Rank {
                selector: Some(selector),
                default,
                targets,
            }
        }
        SwitchSource::Type(c) => {
            let selector = selector_expr(builder, ctx, &c.select.stmt.selector);
            let (arms, fallthrough) = split_fallthrough(refs);
            let mut default = fallthrough;
            let mut targets = Vec::new();
            for (case, &label) in c.cases.iter().zip(arms) {
                match &case.guard_stmt.stmt.guard {
                    ast::TypeGuard::Default => default = label,
                    ast::TypeGuard::TypeSpec(ts) => {
                        targets.push((TypeValue::Intrinsic(ts.name.clone()), label));
                    }
                    ast::TypeGuard::Derived(dts) => {
                        targets.push((TypeValue::Derived(dts.name.clone()), label));
                    }
                }
            }
            ComposedSwitch::Type {
                selector: Some(selector),
                default,
                targets,
            }
        }
    }
}

/// Split the target list into the arm labels and the trailing fall-through.
fn split_fallthrough(refs: &[LLabel]) -> (&[LLabel], LLabel) {
    let Some((&fallthrough, arms)) = refs.split_last() else {
        semantics_bug!("switch op with no targets");
    };
    (arms, fallthrough)
}

/// Arm positions count from 1 in source order.
fn number_from_one(arms: &[LLabel]) -> Vec<(i64, LLabel)> {
    arms.iter()
        .enumerate()
        .map(|(i, &l)| (i as i64 + 1, l))
        .collect()
}

fn case_value(builder: &mut FirBuilder<'_>, range: &ast::CaseValueRange) -> CaseValue {
    match range {
        ast::CaseValueRange::Exact(e) => CaseValue::Exactly(builder.expr(e.typed_expr().clone())),
        ast::CaseValueRange::Range { lower, upper } => match (lower, upper) {
            (Some(lo), Some(hi)) => {
                let lower = builder.expr(lo.typed_expr().clone());
                let upper = builder.expr(hi.typed_expr().clone());
                CaseValue::InclusiveRange { lower, upper }
            }
            (Some(lo), None) => CaseValue::InclusiveAbove {
                lower: builder.expr(lo.typed_expr().clone()),
            },
            (None, Some(hi)) => CaseValue::InclusiveBelow {
                upper: builder.expr(hi.typed_expr().clone()),
            },
            (None, None) => semantics_bug!("case range with neither bound"),
        },
    }
}

fn selector_expr(
    builder: &mut FirBuilder<'_>,
    ctx: &SemanticsContext,
    selector: &ast::Selector,
) -> StmtId {
    match selector {
        ast::Selector::Expr(e) => builder.expr(e.typed_expr().clone()),
        ast::Selector::Variable(v) => {
            let Some(expr) = ctx.analyzer().analyze_variable(v) else {
                semantics_bug!("selector variable is unresolved");
            };
            builder.expr(expr)
        }
    }
}

fn proc_designator_expr(
    ctx: &SemanticsContext,
    designator: &ast::ProcedureDesignator,
) -> taiga_front::expr::Expression {
    let analyzed = match designator {
        ast::ProcedureDesignator::Name(n) => ctx.analyzer().analyze_name(n),
        ast::ProcedureDesignator::Component(sc) => ctx.analyzer().analyze_component(sc),
    };
    let Some(expr) = analyzed else {
        semantics_bug!("procedure designator is unresolved");
    };
    expr
}
