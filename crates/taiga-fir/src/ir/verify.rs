//! Structural well-formedness checks for lowered FIR.
//!
//! Reports violations as strings rather than aborting: tests assert the
//! list is empty, and a debugging session can dump all findings at once.

use taiga_front::entity::EntityRef;

use super::procedure::Procedure;
use super::program::Program;

pub fn verify_program(program: &Program) -> Vec<String> {
    let mut violations = Vec::new();
    for proc in program.procedures.values() {
        for v in verify_procedure(proc) {
            violations.push(format!("{}: {}", proc.name, v));
        }
    }
    violations
}

pub fn verify_procedure(proc: &Procedure) -> Vec<String> {
    let mut violations = Vec::new();

    for (block_id, block) in proc.blocks.iter() {
        let bname = format!("b{}", block_id.index());

        // Closed blocks only: a single terminator, in last position.
        if block.stmts.is_empty() {
            violations.push(format!("{bname} is open and empty"));
            continue;
        }
        let last = *block.stmts.last().expect("non-empty");
        if !proc.stmts[last].is_terminator() {
            violations.push(format!("{bname} does not end with a terminator"));
        }
        for &stmt_id in &block.stmts[..block.stmts.len() - 1] {
            if proc.stmts[stmt_id].is_terminator() {
                violations.push(format!(
                    "{bname} has interior terminator s{}",
                    stmt_id.index()
                ));
            }
        }

        // Successor/predecessor symmetry, and region discipline: a branch
        // may only target a block whose region is related to its own by the
        // ancestor chain (entering a child region or leaving to an
        // enclosing one).
        for succ in proc.stmts[last].successors() {
            if !proc.blocks[succ].preds.contains(&block_id) {
                violations.push(format!(
                    "{bname} missing from preds of successor b{}",
                    succ.index()
                ));
            }
            let from = block.region;
            let to = proc.blocks[succ].region;
            if !proc.is_region_ancestor(from, to) && !proc.is_region_ancestor(to, from) {
                violations.push(format!(
                    "{bname} branches across unrelated regions to b{}",
                    succ.index()
                ));
            }
        }
    }

    // Every predecessor claims this block as a successor.
    for (block_id, block) in proc.blocks.iter() {
        for &pred in &block.preds {
            let lists_us = proc
                .terminator(pred)
                .map(|t| t.successors().contains(&block_id))
                .unwrap_or(false);
            if !lists_us {
                violations.push(format!(
                    "b{} lists pred b{} whose terminator does not target it",
                    block_id.index(),
                    pred.index()
                ));
            }
        }
    }

    violations
}
