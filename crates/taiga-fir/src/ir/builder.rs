use taiga_front::expr::Expression;
use taiga_front::sema::{ScopeId, SymbolId};

use crate::semantics_bug;

use super::block::BlockId;
use super::procedure::Procedure;
use super::region::RegionId;
use super::stmt::{CaseValue, IoCall, RankValue, RuntimeCall, Stmt, StmtId, StoreValue, TypeValue};

/// Statement emitter for a single [`Procedure`].
///
/// Tracks a cursor (current region + current block); statements are appended
/// to the cursor block. Terminators link predecessors as they are inserted.
/// The builder performs no other CFG validation — construction order is the
/// block builder's job.
pub struct FirBuilder<'a> {
    proc: &'a mut Procedure,
    cursor_region: RegionId,
    cursor_block: Option<BlockId>,
}

impl<'a> FirBuilder<'a> {
    pub fn new(proc: &'a mut Procedure, block: BlockId) -> Self {
        let cursor_region = proc.blocks[block].region;
        Self {
            proc,
            cursor_region,
            cursor_block: Some(block),
        }
    }

    pub fn proc(&self) -> &Procedure {
        self.proc
    }

    /// Append `stmt` to the cursor block.
    pub fn insert(&mut self, stmt: Stmt) -> StmtId {
        let Some(block) = self.cursor_block else {
            semantics_bug!("statement inserted with no insertion point");
        };
        let id = self.proc.stmts.push(stmt);
        self.proc.blocks[block].stmts.push(id);
        id
    }

    /// Append a terminator and register the cursor block as a predecessor of
    /// each successor.
    pub fn insert_terminator(&mut self, stmt: Stmt) -> StmtId {
        let Some(block) = self.cursor_block else {
            semantics_bug!("terminator inserted with no insertion point");
        };
        for succ in stmt.successors() {
            self.proc.blocks[succ].add_pred(block);
        }
        self.insert(stmt)
    }

    /// Allocate a new empty block in `region`. Does not move the cursor.
    pub fn create_block(&mut self, region: RegionId) -> BlockId {
        self.proc.create_block(region)
    }

    /// Allocate a child region. Does not move the cursor.
    pub fn create_region(&mut self, parent: RegionId, scope: ScopeId) -> RegionId {
        self.proc.create_region(parent, scope)
    }

    pub fn set_insertion_point(&mut self, block: BlockId) {
        self.cursor_region = self.proc.blocks[block].region;
        self.cursor_block = Some(block);
    }

    pub fn clear_insertion_point(&mut self) {
        self.cursor_block = None;
    }

    pub fn insertion_point(&self) -> Option<BlockId> {
        self.cursor_block
    }

    pub fn set_region(&mut self, region: RegionId) {
        self.cursor_region = region;
    }

    pub fn current_region(&self) -> RegionId {
        self.cursor_region
    }

    // -- terminators --

    pub fn branch(&mut self, target: BlockId) -> StmtId {
        self.insert_terminator(Stmt::Branch {
            cond: None,
            true_target: target,
            false_target: None,
        })
    }

    pub fn cond_branch(
        &mut self,
        cond: StmtId,
        true_target: BlockId,
        false_target: BlockId,
    ) -> StmtId {
        self.insert_terminator(Stmt::Branch {
            cond: Some(cond),
            true_target,
            false_target: Some(false_target),
        })
    }

    pub fn switch(
        &mut self,
        selector: Option<StmtId>,
        default: BlockId,
        targets: Vec<(i64, BlockId)>,
    ) -> StmtId {
        self.insert_terminator(Stmt::Switch {
            selector,
            default,
            targets,
        })
    }

    pub fn switch_case(
        &mut self,
        selector: Option<StmtId>,
        default: BlockId,
        targets: Vec<(Vec<CaseValue>, BlockId)>,
    ) -> StmtId {
        self.insert_terminator(Stmt::SwitchCase {
            selector,
            default,
            targets,
        })
    }

    pub fn switch_rank(
        &mut self,
        selector: Option<StmtId>,
        default: BlockId,
        targets: Vec<(RankValue, BlockId)>,
    ) -> StmtId {
        self.insert_terminator(Stmt::SwitchRank {
            selector,
            default,
            targets,
        })
    }

    pub fn switch_type(
        &mut self,
        selector: Option<StmtId>,
        default: BlockId,
        targets: Vec<(TypeValue, BlockId)>,
    ) -> StmtId {
        self.insert_terminator(Stmt::SwitchType {
            selector,
            default,
            targets,
        })
    }

    pub fn indirect_branch(&mut self, variable: SymbolId, targets: Vec<BlockId>) -> StmtId {
        self.insert_terminator(Stmt::IndirectBranch { variable, targets })
    }

    pub fn ret(&mut self, value: StmtId) -> StmtId {
        self.insert_terminator(Stmt::Return { value })
    }

    pub fn unreachable(&mut self) -> StmtId {
        self.insert_terminator(Stmt::Unreachable)
    }

    // -- non-terminators --

    pub fn alloc(&mut self, object: Expression) -> StmtId {
        self.insert(Stmt::Allocate { object })
    }

    pub fn dealloc(&mut self, object: Expression) -> StmtId {
        self.insert(Stmt::Deallocate { object })
    }

    pub fn expr(&mut self, expr: Expression) -> StmtId {
        self.insert(Stmt::ApplyExpr { expr })
    }

    pub fn addr(&mut self, expr: Expression) -> StmtId {
        self.insert(Stmt::LocateExpr { expr })
    }

    pub fn load(&mut self, addr: StmtId) -> StmtId {
        self.insert(Stmt::Load { addr })
    }

    pub fn store(&mut self, addr: StmtId, value: StmtId) -> StmtId {
        self.insert(Stmt::Store {
            addr,
            value: StoreValue::Value(value),
        })
    }

    pub fn store_block_addr(&mut self, addr: StmtId, target: BlockId) -> StmtId {
        self.insert(Stmt::Store {
            addr,
            value: StoreValue::BlockAddr(target),
        })
    }

    /// Insert a block-address store into `block`, before its terminator if
    /// it has gained one.
    ///
    /// Deferred `ASSIGN` patches replay after the block is closed; appending
    /// would land the store behind the terminator.
    pub fn store_block_addr_patched(
        &mut self,
        block: BlockId,
        addr: StmtId,
        target: BlockId,
    ) -> StmtId {
        let id = self.proc.stmts.push(Stmt::Store {
            addr,
            value: StoreValue::BlockAddr(target),
        });
        let stmts = &self.proc.blocks[block].stmts;
        let index = match stmts.last() {
            Some(&last) if self.proc.stmts[last].is_terminator() => stmts.len() - 1,
            _ => stmts.len(),
        };
        self.proc.blocks[block].stmts.insert(index, id);
        id
    }

    pub fn nullify(&mut self, addr: StmtId) -> StmtId {
        self.insert(Stmt::Disassociate { addr })
    }

    pub fn increment(&mut self, value: StmtId, step: StmtId) -> StmtId {
        self.insert(Stmt::Increment { value, step })
    }

    pub fn do_condition(&mut self, step: StmtId, value: StmtId, upper: StmtId) -> StmtId {
        self.insert(Stmt::DoCondition { step, value, upper })
    }

    pub fn call(&mut self, callee: Expression, args: Vec<Expression>) -> StmtId {
        self.insert(Stmt::Call { callee, args })
    }

    pub fn io_call(&mut self, call: IoCall, args: Vec<Expression>) -> StmtId {
        self.insert(Stmt::IoCall { call, args })
    }

    pub fn runtime_call(&mut self, call: RuntimeCall, args: Vec<Expression>) -> StmtId {
        self.insert(Stmt::RuntimeCall { call, args })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taiga_front::sema::ScopeId;
    use taiga_front::entity::EntityRef;

    fn proc_with_entry() -> (Procedure, BlockId) {
        let mut proc = Procedure::new("t", ScopeId::new(0));
        let entry = proc.create_block(proc.root_region);
        (proc, entry)
    }

    #[test]
    fn insert_appends_to_cursor() {
        let (mut proc, entry) = proc_with_entry();
        let mut fb = FirBuilder::new(&mut proc, entry);
        let a = fb.expr(Expression::integer(1));
        let b = fb.expr(Expression::integer(2));
        assert_eq!(proc.blocks[entry].stmts, vec![a, b]);
    }

    #[test]
    fn terminator_links_predecessors() {
        let (mut proc, entry) = proc_with_entry();
        let mut fb = FirBuilder::new(&mut proc, entry);
        let root = fb.current_region();
        let t = fb.create_block(root);
        let f = fb.create_block(root);
        let cond = fb.expr(Expression::truth());
        fb.cond_branch(cond, t, f);

        assert_eq!(proc.blocks[t].preds, vec![entry]);
        assert_eq!(proc.blocks[f].preds, vec![entry]);
        assert!(proc.terminator(entry).is_some());
    }

    #[test]
    fn cursor_follows_block_region() {
        let (mut proc, entry) = proc_with_entry();
        let root = proc.root_region;
        let mut fb = FirBuilder::new(&mut proc, entry);
        let child = fb.create_region(root, ScopeId::new(0));
        let inner = fb.create_block(child);
        fb.set_insertion_point(inner);
        assert_eq!(fb.current_region(), child);
        fb.set_insertion_point(entry);
        assert_eq!(fb.current_region(), root);
    }

    #[test]
    #[should_panic(expected = "no insertion point")]
    fn insert_without_cursor_is_a_bug() {
        let (mut proc, entry) = proc_with_entry();
        let mut fb = FirBuilder::new(&mut proc, entry);
        fb.clear_insertion_point();
        fb.expr(Expression::integer(0));
    }

    #[test]
    fn patched_store_lands_before_terminator() {
        let (mut proc, entry) = proc_with_entry();
        let mut fb = FirBuilder::new(&mut proc, entry);
        let addr = fb.addr(Expression::integer(0));
        let zero = fb.expr(Expression::integer(0));
        fb.ret(zero);
        let target = {
            let root = fb.current_region();
            fb.create_block(root)
        };
        fb.store_block_addr_patched(entry, addr, target);

        let stmts = &proc.blocks[entry].stmts;
        assert_eq!(stmts.len(), 4);
        assert!(matches!(
            proc.stmts[stmts[2]],
            Stmt::Store {
                value: StoreValue::BlockAddr(_),
                ..
            }
        ));
        // Terminator is still last.
        assert!(proc.terminator(entry).is_some());
    }
}
