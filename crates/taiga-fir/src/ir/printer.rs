//! Human-readable dump of lowered FIR.
//!
//! Structure mirrors ownership: procedure → regions → blocks → statements.
//! Entity ids print as `r0`/`b0`/`s0`; the output is deterministic, which
//! the isomorphism tests rely on.

use std::fmt::Write;

use taiga_front::entity::EntityRef;
use taiga_front::expr::{BinaryOp, Expression};

use super::block::BlockId;
use super::procedure::Procedure;
use super::program::Program;
use super::stmt::{CaseValue, RankValue, Stmt, StmtId, StoreValue, TypeValue};

pub fn print_program(program: &Program) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "program {} {{", program.name);
    for proc in program.procedures.values() {
        out.push_str(&print_procedure(proc));
    }
    out.push_str("}\n");
    out
}

pub fn print_procedure(proc: &Procedure) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "procedure {} {{", proc.name);
    for (region_id, region) in proc.regions.iter() {
        let parent = match region.parent {
            Some(p) => format!("r{}", p.index()),
            None => "none".to_string(),
        };
        let _ = writeln!(out, "  region r{} (parent: {}):", region_id.index(), parent);
        for &block_id in &region.blocks {
            let block = &proc.blocks[block_id];
            let preds = if block.preds.is_empty() {
                "none".to_string()
            } else {
                block
                    .preds
                    .iter()
                    .map(|p| format!("b{}", p.index()))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            let _ = writeln!(out, "    block b{}:  ; preds: {}", block_id.index(), preds);
            for &stmt_id in &block.stmts {
                let _ = writeln!(
                    out,
                    "      s{} = {}",
                    stmt_id.index(),
                    fmt_stmt(&proc.stmts[stmt_id])
                );
            }
        }
    }
    out.push_str("}\n");
    out
}

fn fmt_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Allocate { object } => format!("alloc {}", fmt_expression(object)),
        Stmt::Deallocate { object } => format!("dealloc {}", fmt_expression(object)),
        Stmt::ApplyExpr { expr } => format!("expr {}", fmt_expression(expr)),
        Stmt::LocateExpr { expr } => format!("addr {}", fmt_expression(expr)),
        Stmt::Load { addr } => format!("load {}", s(*addr)),
        Stmt::Store { addr, value } => match value {
            StoreValue::Value(v) => format!("store {}, {}", s(*addr), s(*v)),
            StoreValue::BlockAddr(target) => format!("store {}, &{}", s(*addr), b(*target)),
        },
        Stmt::Disassociate { addr } => format!("nullify {}", s(*addr)),
        Stmt::Increment { value, step } => format!("incr {}, {}", s(*value), s(*step)),
        Stmt::DoCondition { step, value, upper } => {
            format!("do-cond {}, {}, {}", s(*step), s(*value), s(*upper))
        }
        Stmt::Call { callee, args } => {
            format!("call {}({})", fmt_expression(callee), fmt_args(args))
        }
        Stmt::IoCall { call, args } => format!("io-call {:?}({})", call, fmt_args(args)),
        Stmt::RuntimeCall { call, args } => format!("rt-call {:?}({})", call, fmt_args(args)),
        Stmt::Branch {
            cond,
            true_target,
            false_target,
        } => match (cond, false_target) {
            (Some(cond), Some(false_target)) => format!(
                "cbranch {}, {}, {}",
                s(*cond),
                b(*true_target),
                b(*false_target)
            ),
            _ => format!("branch {}", b(*true_target)),
        },
        Stmt::Switch {
            selector,
            default,
            targets,
        } => format!(
            "switch {} [{}], default {}",
            fmt_selector(*selector),
            targets
                .iter()
                .map(|(v, t)| format!("{} -> {}", v, b(*t)))
                .collect::<Vec<_>>()
                .join(", "),
            b(*default)
        ),
        Stmt::SwitchCase {
            selector,
            default,
            targets,
        } => format!(
            "switch-case {} [{}], default {}",
            fmt_selector(*selector),
            targets
                .iter()
                .map(|(vs, t)| {
                    let alts = vs
                        .iter()
                        .map(fmt_case_value)
                        .collect::<Vec<_>>()
                        .join(" | ");
                    format!("({alts}) -> {}", b(*t))
                })
                .collect::<Vec<_>>()
                .join(", "),
            b(*default)
        ),
        Stmt::SwitchRank {
            selector,
            default,
            targets,
        } => format!(
            "switch-rank {} [{}], default {}",
            fmt_selector(*selector),
            targets
                .iter()
                .map(|(v, t)| {
                    let guard = match v {
                        RankValue::Exactly(e) => s(*e),
                        RankValue::AssumedSize => "*".to_string(),
                    };
                    format!("{guard} -> {}", b(*t))
                })
                .collect::<Vec<_>>()
                .join(", "),
            b(*default)
        ),
        Stmt::SwitchType {
            selector,
            default,
            targets,
        } => format!(
            "switch-type {} [{}], default {}",
            fmt_selector(*selector),
            targets
                .iter()
                .map(|(v, t)| {
                    let guard = match v {
                        TypeValue::Intrinsic(name) => format!("type({name})"),
                        TypeValue::Derived(name) => format!("class({name})"),
                    };
                    format!("{guard} -> {}", b(*t))
                })
                .collect::<Vec<_>>()
                .join(", "),
            b(*default)
        ),
        Stmt::IndirectBranch { variable, targets } => format!(
            "ibranch sym{} [{}]",
            variable.index(),
            targets
                .iter()
                .map(|t| b(*t))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        Stmt::Return { value } => format!("return {}", s(*value)),
        Stmt::Unreachable => "unreachable".to_string(),
    }
}

fn fmt_case_value(v: &CaseValue) -> String {
    match v {
        CaseValue::Exactly(e) => s(*e),
        CaseValue::InclusiveRange { lower, upper } => format!("{}:{}", s(*lower), s(*upper)),
        CaseValue::InclusiveAbove { lower } => format!("{}:", s(*lower)),
        CaseValue::InclusiveBelow { upper } => format!(":{}", s(*upper)),
    }
}

fn fmt_selector(selector: Option<StmtId>) -> String {
    match selector {
        Some(id) => s(id),
        None => "(?)".to_string(),
    }
}

fn fmt_args(args: &[Expression]) -> String {
    args.iter()
        .map(fmt_expression)
        .collect::<Vec<_>>()
        .join(", ")
}

fn fmt_expression(e: &Expression) -> String {
    match e {
        Expression::Integer(n) => n.to_string(),
        Expression::Logical(true) => ".true.".to_string(),
        Expression::Logical(false) => ".false.".to_string(),
        Expression::Symbol(sym) => format!("sym{}", sym.index()),
        Expression::Negate(inner) => format!("(-{})", fmt_expression(inner)),
        Expression::Not(inner) => format!("(.not. {})", fmt_expression(inner)),
        Expression::Binary(op, lhs, rhs) => {
            let tok = match op {
                BinaryOp::Add => "+",
                BinaryOp::Subtract => "-",
                BinaryOp::Multiply => "*",
                BinaryOp::Divide => "/",
                BinaryOp::Eq => "==",
                BinaryOp::Ne => "/=",
                BinaryOp::Lt => "<",
                BinaryOp::Le => "<=",
                BinaryOp::Gt => ">",
                BinaryOp::Ge => ">=",
                BinaryOp::And => ".and.",
                BinaryOp::Or => ".or.",
            };
            format!("({} {} {})", fmt_expression(lhs), tok, fmt_expression(rhs))
        }
    }
}

fn s(id: StmtId) -> String {
    format!("s{}", id.index())
}

fn b(id: BlockId) -> String {
    format!("b{}", id.index())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::builder::FirBuilder;
    use taiga_front::entity::EntityRef;
    use taiga_front::sema::ScopeId;

    #[test]
    fn prints_branching_procedure() {
        let mut proc = Procedure::new("demo", ScopeId::new(0));
        let entry = proc.create_block(proc.root_region);
        let mut fb = FirBuilder::new(&mut proc, entry);
        let root = fb.current_region();
        let exit = fb.create_block(root);
        let cond = fb.expr(Expression::truth());
        fb.cond_branch(cond, exit, exit);
        fb.set_insertion_point(exit);
        let zero = fb.expr(Expression::integer(0));
        fb.ret(zero);

        let text = print_procedure(&proc);
        assert!(text.contains("procedure demo {"));
        assert!(text.contains("block b0:  ; preds: none"));
        assert!(text.contains("cbranch s0, b1, b1"));
        assert!(text.contains("block b1:  ; preds: b0"));
        assert!(text.contains("return s2"));
    }
}
