//! Linear op stream → basic blocks.
//!
//! Phase two of the lowering. Blocks come into existence when their `Label`
//! op is reached; a branch whose target block does not exist yet is captured
//! as a pending-edge closure and replayed by [`BlockBuilder::resolve_edges`]
//! once every label has been materialized. Deferring is strictly simpler
//! than topologically ordering the stream: each label becomes a block
//! exactly once.

use std::collections::HashMap;

use taiga_front::ast;
use taiga_front::expr::Expression;
use taiga_front::sema::{SemanticsContext, SymbolId};

use crate::ir::block::BlockId;
use crate::ir::builder::FirBuilder;
use crate::ir::stmt::{IoCall, RuntimeCall, StmtId};
use crate::{semantics_bug, wrong_path};

use super::analysis::{AnalysisState, LLabel};
use super::compose::{compose_switch_args, ComposedSwitch};
use super::linear::{CondGotoSource, ConstructRef, IoSource, LinearOp, ReturnSource};

pub type LabelMap = HashMap<LLabel, BlockId>;

/// A deferred forward edge: replayed against the final label map.
type PendingEdge = Box<dyn FnOnce(&mut FirBuilder<'_>, &LabelMap)>;

/// Loop scaffolding for the innermost DO constructs, pushed at
/// `BeginConstruct` and popped at `EndConstruct`.
struct DoBoundsInfo {
    form: DoForm,
    /// Latch condition recorded by `DoCompare` for the following `CondGoto`.
    condition: Option<StmtId>,
}

enum DoForm {
    Counted {
        /// Address of the induction variable.
        var: StmtId,
        upper: StmtId,
        step: StmtId,
    },
    While(Expression),
    /// Infinite DO and DO CONCURRENT: always-true latch.
    Unbounded,
}

pub struct BlockBuilder<'w, 'p> {
    builder: FirBuilder<'p>,
    ctx: &'w SemanticsContext,
    state: &'w mut AnalysisState,
    block_map: LabelMap,
    pending_edges: Vec<PendingEdge>,
    do_stack: Vec<DoBoundsInfo>,
}

impl<'w, 'p> BlockBuilder<'w, 'p> {
    pub fn new(
        builder: FirBuilder<'p>,
        ctx: &'w SemanticsContext,
        state: &'w mut AnalysisState,
    ) -> Self {
        Self {
            builder,
            ctx,
            state,
            block_map: LabelMap::new(),
            pending_edges: Vec::new(),
            do_stack: Vec::new(),
        }
    }

    /// Materialize blocks for the whole op stream.
    pub fn run(&mut self, ops: &[LinearOp<'_>]) {
        let mut i = 0;
        while i < ops.len() {
            match &ops[i] {
                LinearOp::Label(l) => self.label(*l),
                LinearOp::Goto { target, .. } => {
                    self.ensure_cursor_open();
                    self.branch_or_queue(*target);
                    self.builder.clear_insertion_point();
                }
                LinearOp::CondGoto {
                    source,
                    true_label,
                    false_label,
                } => {
                    self.ensure_cursor_open();
                    let cond = self.condition_stmt(source);
                    self.cbranch_or_queue(cond, *true_label, *false_label);
                    self.builder.clear_insertion_point();
                }
                LinearOp::Return { source } => {
                    self.ensure_cursor_open();
                    self.lower_return(source);
                    self.builder.clear_insertion_point();
                }
                LinearOp::SwitchingIo {
                    source,
                    next,
                    err,
                    eor,
                    end,
                } => {
                    self.ensure_cursor_open();
                    let selector = self.emit_io_call(source);
                    let mut targets = Vec::new();
                    if let Some(l) = err {
                        targets.push((1, *l));
                    }
                    if let Some(l) = eor {
                        targets.push((2, *l));
                    }
                    if let Some(l) = end {
                        targets.push((3, *l));
                    }
                    self.switch_or_queue(ComposedSwitch::Plain {
                        selector: Some(selector),
                        default: *next,
                        targets,
                    });
                    self.builder.clear_insertion_point();
                }
                LinearOp::Switch { source, targets } => {
                    self.ensure_cursor_open();
                    let composed =
                        compose_switch_args(&mut self.builder, self.ctx, *source, targets);
                    self.switch_or_queue(composed);
                    self.builder.clear_insertion_point();
                }
                LinearOp::IndirectGoto { symbol, targets } => {
                    self.ensure_cursor_open();
                    let targets = if targets.is_empty() {
                        self.state.assigned_labels(*symbol)
                    } else {
                        targets.clone()
                    };
                    self.indirect_or_queue(*symbol, targets);
                    self.builder.clear_insertion_point();
                }
                LinearOp::Action(stmt) => {
                    self.ensure_cursor_open();
                    self.handle_action(stmt);
                }
                LinearOp::DoIncrement(_) => {
                    self.ensure_cursor_open();
                    self.do_increment();
                }
                LinearOp::DoCompare(_) => {
                    self.ensure_cursor_open();
                    self.do_compare();
                }
                LinearOp::BeginConstruct(c) => {
                    self.begin_construct(c);
                    // Fuse a label immediately following the construct entry
                    // into the entry block instead of creating a second one.
                    if let Some(LinearOp::Label(l)) = ops.get(i + 1) {
                        let block = self
                            .builder
                            .insertion_point()
                            .unwrap_or_else(|| semantics_bug!("construct entry left no block"));
                        self.block_map.insert(*l, block);
                        i += 1;
                    }
                }
                LinearOp::EndConstruct(c) => self.end_construct(c),
            }
            i += 1;
        }
    }

    /// Terminate a fall-off-the-end block with the implicit `RETURN 0`.
    pub fn finish(&mut self) {
        if self.builder.insertion_point().is_some() {
            let zero = self.builder.expr(Expression::integer(0));
            self.builder.ret(zero);
            self.builder.clear_insertion_point();
        }
    }

    /// Discharge the pending edges, in insertion order.
    pub fn resolve_edges(&mut self) {
        let edges = std::mem::take(&mut self.pending_edges);
        for edge in edges {
            edge(&mut self.builder, &self.block_map);
        }
    }

    // -- op handlers --------------------------------------------------------

    fn label(&mut self, l: LLabel) {
        let region = self.builder.current_region();
        let block = self.builder.create_block(region);
        self.block_map.insert(l, block);
        if self.builder.insertion_point().is_some() {
            self.builder.branch(block);
        }
        self.builder.set_insertion_point(block);
    }

    /// Re-open the insertion point when a terminator cleared it: statements
    /// after a GOTO/RETURN land in a fresh anonymous block.
    fn ensure_cursor_open(&mut self) {
        if self.builder.insertion_point().is_none() {
            let region = self.builder.current_region();
            let block = self.builder.create_block(region);
            self.builder.set_insertion_point(block);
        }
    }

    fn cursor(&self) -> BlockId {
        self.builder
            .insertion_point()
            .unwrap_or_else(|| semantics_bug!("no block open at terminator"))
    }

    fn condition_stmt(&mut self, source: &CondGotoSource<'_>) -> StmtId {
        match source {
            CondGotoSource::IfThen(s) => {
                self.builder.expr(s.stmt.cond.typed_expr().clone())
            }
            CondGotoSource::ElseIf(s) => self.builder.expr(s.stmt.cond.typed_expr().clone()),
            CondGotoSource::If(s) => self.builder.expr(s.cond.typed_expr().clone()),
            CondGotoSource::Do(_) => self
                .do_stack
                .last()
                .and_then(|d| d.condition)
                .unwrap_or_else(|| semantics_bug!("DO latch condition not recorded")),
        }
    }

    fn lower_return(&mut self, source: &ReturnSource<'_>) {
        match source {
            ReturnSource::FailImage => {
                self.builder.runtime_call(RuntimeCall::FailImage, Vec::new());
                self.builder.unreachable();
            }
            ReturnSource::Return(ret) => {
                let value = match &ret.value {
                    Some(e) => self.builder.expr(e.typed_expr().clone()),
                    None => self.builder.expr(Expression::integer(0)),
                };
                self.builder.ret(value);
            }
            ReturnSource::Stop(stop) => {
                let args = self.stop_args(stop);
                self.builder.runtime_call(RuntimeCall::Stop, args);
                self.builder.unreachable();
            }
        }
    }

    // -- branch-or-queue policy --------------------------------------------

    fn branch_or_queue(&mut self, target: LLabel) {
        if let Some(&block) = self.block_map.get(&target) {
            self.builder.branch(block);
        } else {
            let from = self.cursor();
            self.pending_edges.push(Box::new(move |fb, map| {
                fb.set_insertion_point(from);
                fb.branch(resolve(map, target));
            }));
        }
    }

    fn cbranch_or_queue(&mut self, cond: StmtId, true_label: LLabel, false_label: LLabel) {
        match (
            self.block_map.get(&true_label).copied(),
            self.block_map.get(&false_label).copied(),
        ) {
            (Some(t), Some(f)) => {
                self.builder.cond_branch(cond, t, f);
            }
            _ => {
                let from = self.cursor();
                self.pending_edges.push(Box::new(move |fb, map| {
                    fb.set_insertion_point(from);
                    let t = resolve(map, true_label);
                    let f = resolve(map, false_label);
                    fb.cond_branch(cond, t, f);
                }));
            }
        }
    }

    fn switch_or_queue(&mut self, composed: ComposedSwitch) {
        let known = composed
            .labels()
            .iter()
            .all(|l| self.block_map.contains_key(l));
        if known {
            emit_composed(&mut self.builder, composed, &self.block_map);
        } else {
            let from = self.cursor();
            self.pending_edges.push(Box::new(move |fb, map| {
                fb.set_insertion_point(from);
                emit_composed(fb, composed, map);
            }));
        }
    }

    fn indirect_or_queue(&mut self, symbol: SymbolId, targets: Vec<LLabel>) {
        let resolved: Option<Vec<BlockId>> = targets
            .iter()
            .map(|l| self.block_map.get(l).copied())
            .collect();
        match resolved {
            Some(blocks) => {
                self.builder.indirect_branch(symbol, blocks);
            }
            None => {
                let from = self.cursor();
                self.pending_edges.push(Box::new(move |fb, map| {
                    fb.set_insertion_point(from);
                    let blocks = targets.iter().map(|&l| resolve(map, l)).collect();
                    fb.indirect_branch(symbol, blocks);
                }));
            }
        }
    }

    // -- constructs ---------------------------------------------------------

    fn begin_construct(&mut self, construct: &ConstructRef<'_>) {
        self.ensure_cursor_open();
        match construct {
            ConstructRef::Associate(c) => {
                self.enter_region(c.assoc_stmt.source);
                for assoc in &c.assoc_stmt.stmt.associations {
                    let value = self.selector_value(&assoc.selector);
                    let value = self.builder.expr(value);
                    let name = self.name_expr(&assoc.name);
                    let addr = self.builder.addr(name);
                    self.builder.store(addr, value);
                }
            }
            ConstructRef::Block(c) => self.enter_region(c.block_stmt.source),
            ConstructRef::Case(c) => {
                let selector = c.select.stmt.expr.typed_expr().clone();
                self.builder.expr(selector);
            }
            ConstructRef::ChangeTeam(c) => {
                self.enter_region(c.team_stmt.source);
                let team = c.team_stmt.stmt.team.typed_expr().clone();
                self.builder.expr(team);
            }
            ConstructRef::Do(c) => {
                self.enter_region(c.do_stmt.source);
                self.initiate_do(c);
            }
            ConstructRef::If(c) => {
                let cond = c.if_then.stmt.cond.typed_expr().clone();
                self.builder.expr(cond);
            }
            ConstructRef::SelectRank(c) => self.enter_region(c.select.source),
            ConstructRef::SelectType(c) => self.enter_region(c.select.source),
            ConstructRef::Where(c) => {
                let mask = c.where_stmt.stmt.mask.typed_expr().clone();
                self.builder.expr(mask);
            }
            ConstructRef::Forall(c) => {
                if let Some(mask) = &c.forall_stmt.stmt.mask {
                    let mask = mask.typed_expr().clone();
                    self.builder.expr(mask);
                }
            }
            ConstructRef::Critical(_)
            | ConstructRef::CompilerDirective(_)
            | ConstructRef::OpenMp(_)
            | ConstructRef::OpenMpEndLoop(_) => {}
        }
    }

    fn end_construct(&mut self, construct: &ConstructRef<'_>) {
        match construct {
            ConstructRef::Block(_)
            | ConstructRef::Associate(_)
            | ConstructRef::ChangeTeam(_)
            | ConstructRef::SelectRank(_)
            | ConstructRef::SelectType(_) => self.exit_region(),
            ConstructRef::Do(_) => {
                if self.do_stack.pop().is_none() {
                    semantics_bug!("DO bounds stack underflow");
                }
                self.exit_region();
            }
            _ => {}
        }
    }

    /// Open a child region scoped via the statement's source range, branch
    /// into its entry block, and move the cursor there.
    fn enter_region(&mut self, source: ast::SourceRange) {
        let parent = self.builder.current_region();
        let scope = self.ctx.find_scope(source);
        let region = self.builder.create_region(parent, scope);
        let block = self.builder.create_block(region);
        self.builder.branch(block);
        self.builder.set_insertion_point(block);
    }

    fn exit_region(&mut self) {
        let region = self.builder.current_region();
        let parent = self.builder.proc().regions[region]
            .parent
            .unwrap_or_else(|| semantics_bug!("exited the root region"));
        self.builder.set_region(parent);
    }

    /// Evaluate loop-control operands and push the do-bounds entry.
    fn initiate_do(&mut self, c: &ast::DoConstruct) {
        let form = match &c.do_stmt.stmt.control {
            Some(ast::LoopControl::Bounds(bounds)) => {
                let name = self.name_expr(&bounds.var);
                let var = self.builder.addr(name);
                let lower = self.builder.expr(bounds.lower.typed_expr().clone());
                let upper = self.builder.expr(bounds.upper.typed_expr().clone());
                let step = match &bounds.step {
                    Some(e) => self.builder.expr(e.typed_expr().clone()),
                    None => self.builder.expr(Expression::integer(1)),
                };
                self.builder.store(var, lower);
                DoForm::Counted { var, upper, step }
            }
            Some(ast::LoopControl::While(e)) => DoForm::While(e.typed_expr().clone()),
            Some(ast::LoopControl::Concurrent) | None => DoForm::Unbounded,
        };
        self.do_stack.push(DoBoundsInfo {
            form,
            condition: None,
        });
    }

    /// `do_var = do_var + step` for counted loops; nothing otherwise.
    fn do_increment(&mut self) {
        let Some(info) = self.do_stack.last() else {
            semantics_bug!("DO increment outside a DO construct");
        };
        if let DoForm::Counted { var, step, .. } = info.form {
            let value = self.builder.load(var);
            self.builder.increment(value, step);
        }
    }

    /// Record the latch condition for the `CondGoto` that follows.
    fn do_compare(&mut self) {
        let Some(info) = self.do_stack.last() else {
            semantics_bug!("DO compare outside a DO construct");
        };
        let cond = match &info.form {
            DoForm::Counted { var, upper, step } => {
                let (var, upper, step) = (*var, *upper, *step);
                let value = self.builder.load(var);
                self.builder.do_condition(step, value, upper)
            }
            DoForm::While(expr) => {
                let expr = expr.clone();
                self.builder.expr(expr)
            }
            DoForm::Unbounded => self.builder.expr(Expression::truth()),
        };
        if let Some(info) = self.do_stack.last_mut() {
            info.condition = Some(cond);
        }
    }

    // -- action statements --------------------------------------------------

    fn handle_action(&mut self, stmt: &ast::Statement<ast::ActionStmt>) {
        match &stmt.stmt {
            ast::ActionStmt::Allocate(alloc) => {
                for allocation in &alloc.allocations {
                    let object = self.alloc_object_expr(&allocation.object);
                    self.builder.alloc(object);
                }
            }
            ast::ActionStmt::Assignment(assign) => self.lower_assignment(assign),
            ast::ActionStmt::PointerAssignment(pa) => {
                let value = self.builder.addr(pa.target.typed_expr().clone());
                let pointer = self.data_ref_expr(&pa.pointer);
                let addr = self.builder.addr(pointer);
                self.builder.store(addr, value);
            }
            ast::ActionStmt::Backspace(pos) => {
                let args = self.position_args(pos);
                self.builder.io_call(IoCall::Backspace, args);
            }
            ast::ActionStmt::Call(call) => {
                let callee = match &call.proc {
                    ast::ProcedureDesignator::Name(n) => self.name_expr(n),
                    ast::ProcedureDesignator::Component(sc) => self.component_expr(sc),
                };
                let args = call
                    .args
                    .iter()
                    .filter_map(|a| match a {
                        ast::ActualArg::Expr(e) => Some(e.typed_expr().clone()),
                        ast::ActualArg::AltReturn(_) => None,
                    })
                    .collect();
                self.builder.call(callee, args);
            }
            ast::ActionStmt::Close(close) => {
                let args = self.close_args(close);
                self.builder.io_call(IoCall::Close, args);
            }
            // Pure label carrier.
            ast::ActionStmt::Continue => {}
            ast::ActionStmt::Deallocate(dealloc) => {
                for object in &dealloc.objects {
                    let object = self.alloc_object_expr(object);
                    self.builder.dealloc(object);
                }
            }
            ast::ActionStmt::Endfile(pos) => {
                let args = self.position_args(pos);
                self.builder.io_call(IoCall::Endfile, args);
            }
            ast::ActionStmt::EventPost(ep) => {
                let args = vec![self.var_expr(&ep.event)];
                self.builder.runtime_call(RuntimeCall::EventPost, args);
            }
            ast::ActionStmt::EventWait(ew) => {
                let args = vec![self.var_expr(&ew.event)];
                self.builder.runtime_call(RuntimeCall::EventWait, args);
            }
            ast::ActionStmt::FailImage => {
                self.builder.runtime_call(RuntimeCall::FailImage, Vec::new());
            }
            ast::ActionStmt::Flush(pos) => {
                let args = self.position_args(pos);
                self.builder.io_call(IoCall::Flush, args);
            }
            ast::ActionStmt::FormTeam(ft) => {
                let args = vec![
                    ft.team_number.typed_expr().clone(),
                    self.var_expr(&ft.team),
                ];
                self.builder.runtime_call(RuntimeCall::FormTeam, args);
            }
            ast::ActionStmt::Inquire(inq) => {
                let args = self.inquire_args(inq);
                self.builder.io_call(IoCall::Inquire, args);
            }
            ast::ActionStmt::Lock(lock) => {
                let args = vec![self.var_expr(&lock.lock)];
                self.builder.runtime_call(RuntimeCall::Lock, args);
            }
            ast::ActionStmt::Nullify(nullify) => {
                for object in &nullify.objects {
                    let expr = match object {
                        ast::PointerObject::Name(n) => self.name_expr(n),
                        ast::PointerObject::Component(sc) => self.component_expr(sc),
                    };
                    let addr = self.builder.addr(expr);
                    self.builder.nullify(addr);
                }
            }
            ast::ActionStmt::Open(open) => {
                let args = self.open_args(open);
                self.builder.io_call(IoCall::Open, args);
            }
            ast::ActionStmt::Pause(pause) => {
                let args = pause
                    .code
                    .as_ref()
                    .map(|e| vec![e.typed_expr().clone()])
                    .unwrap_or_default();
                self.builder.runtime_call(RuntimeCall::Pause, args);
            }
            ast::ActionStmt::Print(print) => {
                let args = self.print_args(print);
                self.builder.io_call(IoCall::Print, args);
            }
            ast::ActionStmt::Read(read) => {
                let args = self.read_args(read);
                self.builder.io_call(IoCall::Read, args);
            }
            ast::ActionStmt::Rewind(pos) => {
                let args = self.position_args(pos);
                self.builder.io_call(IoCall::Rewind, args);
            }
            ast::ActionStmt::Stop(stop) => {
                let args = self.stop_args(stop);
                self.builder.runtime_call(RuntimeCall::Stop, args);
            }
            ast::ActionStmt::SyncAll(_) => {
                self.builder.runtime_call(RuntimeCall::SyncAll, Vec::new());
            }
            ast::ActionStmt::SyncImages(si) => {
                let args = si
                    .images
                    .as_ref()
                    .map(|e| vec![e.typed_expr().clone()])
                    .unwrap_or_default();
                self.builder.runtime_call(RuntimeCall::SyncImages, args);
            }
            ast::ActionStmt::SyncMemory(_) => {
                self.builder.runtime_call(RuntimeCall::SyncMemory, Vec::new());
            }
            ast::ActionStmt::SyncTeam(st) => {
                let args = vec![st.team.typed_expr().clone()];
                self.builder.runtime_call(RuntimeCall::SyncTeam, args);
            }
            ast::ActionStmt::Unlock(unlock) => {
                let args = vec![self.var_expr(&unlock.lock)];
                self.builder.runtime_call(RuntimeCall::Unlock, args);
            }
            ast::ActionStmt::Wait(wait) => {
                let args = self.wait_args(wait);
                self.builder.io_call(IoCall::Wait, args);
            }
            ast::ActionStmt::Where(where_stmt) => {
                let mask = where_stmt.mask.typed_expr().clone();
                self.builder.expr(mask);
                self.lower_assignment(&where_stmt.assignment);
            }
            ast::ActionStmt::Forall(forall) => self.lower_assignment(&forall.assignment),
            ast::ActionStmt::Write(write) => {
                let args = self.write_args(write);
                self.builder.io_call(IoCall::Write, args);
            }
            ast::ActionStmt::Assign(assign) => self.lower_assign(assign),
            // Consumed during linearization.
            ast::ActionStmt::Cycle(_)
            | ast::ActionStmt::Exit(_)
            | ast::ActionStmt::Goto(_)
            | ast::ActionStmt::If(_)
            | ast::ActionStmt::Return(_)
            | ast::ActionStmt::ComputedGoto(_)
            | ast::ActionStmt::ArithmeticIf(_)
            | ast::ActionStmt::AssignedGoto(_) => wrong_path!(),
        }
    }

    /// Intrinsic assignment: evaluate, locate, store. Defined assignment
    /// resolution is semantic analysis' call and reaches us as a `Call`.
    fn lower_assignment(&mut self, assign: &ast::AssignmentStmt) {
        let value = self.builder.expr(assign.value.typed_expr().clone());
        let target = self.var_expr(&assign.target);
        let addr = self.builder.addr(target);
        self.builder.store(addr, value);
    }

    /// `ASSIGN label TO var` stores the labeled block's address. A forward
    /// label has no block yet; the store is then queued as a patch that
    /// lands in the originating block, ahead of its terminator.
    fn lower_assign(&mut self, assign: &ast::AssignStmt) {
        let name = self.name_expr(&assign.var);
        let addr = self.builder.addr(name);
        let label = self.state.fetch_source_label(assign.label);
        if let Some(&block) = self.block_map.get(&label) {
            self.builder.store_block_addr(addr, block);
        } else {
            let in_block = self.cursor();
            self.pending_edges.push(Box::new(move |fb, map| {
                let target = resolve(map, label);
                fb.store_block_addr_patched(in_block, addr, target);
            }));
        }
    }

    // -- I/O and runtime argument collection --------------------------------

    fn emit_io_call(&mut self, source: &IoSource<'_>) -> StmtId {
        match source {
            IoSource::Read(read) => {
                let args = self.read_args(read);
                self.builder.io_call(IoCall::Read, args)
            }
            IoSource::Write(write) => {
                let args = self.write_args(write);
                self.builder.io_call(IoCall::Write, args)
            }
            IoSource::Wait(wait) => {
                let args = self.wait_args(wait);
                self.builder.io_call(IoCall::Wait, args)
            }
            IoSource::Open(open) => {
                let args = self.open_args(open);
                self.builder.io_call(IoCall::Open, args)
            }
            IoSource::Close(close) => {
                let args = self.close_args(close);
                self.builder.io_call(IoCall::Close, args)
            }
            IoSource::Backspace(pos) => {
                let args = self.position_args(pos);
                self.builder.io_call(IoCall::Backspace, args)
            }
            IoSource::Endfile(pos) => {
                let args = self.position_args(pos);
                self.builder.io_call(IoCall::Endfile, args)
            }
            IoSource::Rewind(pos) => {
                let args = self.position_args(pos);
                self.builder.io_call(IoCall::Rewind, args)
            }
            IoSource::Flush(pos) => {
                let args = self.position_args(pos);
                self.builder.io_call(IoCall::Flush, args)
            }
            IoSource::Inquire(inq) => {
                let args = self.inquire_args(inq);
                self.builder.io_call(IoCall::Inquire, args)
            }
        }
    }

    fn read_args(&self, read: &ast::ReadStmt) -> Vec<Expression> {
        let unit = read_write_unit(&read.unit, &read.controls);
        let mut args = Vec::new();
        args.extend(self.io_unit_expr(unit));
        let format = read.format.as_ref().or_else(|| {
            read.controls.iter().find_map(|c| match c {
                ast::IoControlSpec::Fmt(f) => Some(f),
                _ => None,
            })
        });
        if let Some(f) = format {
            args.extend(self.format_expr(f));
        }
        for item in &read.items {
            args.push(self.var_expr(item));
        }
        args
    }

    fn write_args(&self, write: &ast::WriteStmt) -> Vec<Expression> {
        let unit = read_write_unit(&write.unit, &write.controls);
        let mut args = Vec::new();
        args.extend(self.io_unit_expr(unit));
        let format = write.format.as_ref().or_else(|| {
            write.controls.iter().find_map(|c| match c {
                ast::IoControlSpec::Fmt(f) => Some(f),
                _ => None,
            })
        });
        if let Some(f) = format {
            args.extend(self.format_expr(f));
        }
        for item in &write.items {
            args.push(item.typed_expr().clone());
        }
        args
    }

    fn print_args(&self, print: &ast::PrintStmt) -> Vec<Expression> {
        let mut args = Vec::new();
        args.extend(self.format_expr(&print.format));
        for item in &print.items {
            args.push(item.typed_expr().clone());
        }
        args
    }

    fn open_args(&self, open: &ast::OpenStmt) -> Vec<Expression> {
        let mut args = Vec::new();
        for spec in &open.specs {
            match spec {
                ast::ConnectSpec::Unit(u) => args.extend(self.io_unit_expr(u)),
                ast::ConnectSpec::File(e) | ast::ConnectSpec::Status(e) => {
                    args.push(e.typed_expr().clone())
                }
                ast::ConnectSpec::Err(_) => {}
            }
        }
        args
    }

    fn close_args(&self, close: &ast::CloseStmt) -> Vec<Expression> {
        let mut args = Vec::new();
        for spec in &close.specs {
            match spec {
                ast::CloseSpec::Unit(u) => args.extend(self.io_unit_expr(u)),
                ast::CloseSpec::Status(e) => args.push(e.typed_expr().clone()),
                ast::CloseSpec::Err(_) => {}
            }
        }
        args
    }

    fn position_args(&self, pos: &ast::PositionStmt) -> Vec<Expression> {
        let mut args = Vec::new();
        for spec in &pos.specs {
            match spec {
                ast::PositionSpec::Unit(u) => args.extend(self.io_unit_expr(u)),
                ast::PositionSpec::Err(_)
                | ast::PositionSpec::Iostat(_)
                | ast::PositionSpec::Iomsg(_) => {}
            }
        }
        args
    }

    fn wait_args(&self, wait: &ast::WaitStmt) -> Vec<Expression> {
        let mut args = Vec::new();
        for spec in &wait.specs {
            match spec {
                ast::WaitSpec::Unit(u) => args.extend(self.io_unit_expr(u)),
                ast::WaitSpec::Id(e) => args.push(e.typed_expr().clone()),
                ast::WaitSpec::Err(_) | ast::WaitSpec::Eor(_) | ast::WaitSpec::End(_) => {}
            }
        }
        args
    }

    fn inquire_args(&self, inquire: &ast::InquireStmt) -> Vec<Expression> {
        match inquire {
            ast::InquireStmt::Specs(specs) => {
                let mut args = Vec::new();
                for spec in specs {
                    match spec {
                        ast::InquireSpec::Unit(u) => args.extend(self.io_unit_expr(u)),
                        ast::InquireSpec::File(e) => args.push(e.typed_expr().clone()),
                        ast::InquireSpec::Exist(v) => args.push(self.var_expr(v)),
                        ast::InquireSpec::Err(_) => {}
                    }
                }
                args
            }
            ast::InquireStmt::Iolength { length, items } => {
                let mut args = vec![self.var_expr(length)];
                for item in items {
                    args.push(item.typed_expr().clone());
                }
                args
            }
        }
    }

    fn stop_args(&self, stop: &ast::StopStmt) -> Vec<Expression> {
        stop.code
            .as_ref()
            .map(|e| vec![e.typed_expr().clone()])
            .unwrap_or_default()
    }

    fn io_unit_expr(&self, unit: &ast::IoUnit) -> Option<Expression> {
        match unit {
            ast::IoUnit::Number(n) => Some(Expression::integer(i64::from(*n))),
            ast::IoUnit::Star => None,
            ast::IoUnit::Variable(v) => Some(self.var_expr(v)),
        }
    }

    fn format_expr(&self, format: &ast::Format) -> Option<Expression> {
        match format {
            ast::Format::Label(l) => Some(Expression::integer(i64::from(*l))),
            ast::Format::Star => None,
            ast::Format::Expr(e) => Some(e.typed_expr().clone()),
        }
    }

    // -- designator analysis ------------------------------------------------

    fn selector_value(&self, selector: &ast::Selector) -> Expression {
        match selector {
            ast::Selector::Expr(e) => e.typed_expr().clone(),
            ast::Selector::Variable(v) => self.var_expr(v),
        }
    }

    fn var_expr(&self, var: &ast::Variable) -> Expression {
        self.ctx
            .analyzer()
            .analyze_variable(var)
            .unwrap_or_else(|| semantics_bug!("unresolved variable designator"))
    }

    fn name_expr(&self, name: &ast::Name) -> Expression {
        self.ctx
            .analyzer()
            .analyze_name(name)
            .unwrap_or_else(|| semantics_bug!("name '{}' has no symbol", name.ident))
    }

    fn data_ref_expr(&self, dr: &ast::DataRef) -> Expression {
        self.ctx
            .analyzer()
            .analyze_data_ref(dr)
            .unwrap_or_else(|| semantics_bug!("unresolved data reference"))
    }

    fn component_expr(&self, sc: &ast::StructureComponent) -> Expression {
        self.ctx
            .analyzer()
            .analyze_component(sc)
            .unwrap_or_else(|| semantics_bug!("unresolved structure component"))
    }

    fn alloc_object_expr(&self, object: &ast::AllocateObject) -> Expression {
        match object {
            ast::AllocateObject::Name(n) => self.name_expr(n),
            ast::AllocateObject::Component(sc) => self.component_expr(sc),
        }
    }
}

fn resolve(map: &LabelMap, label: LLabel) -> BlockId {
    match map.get(&label) {
        Some(&block) => block,
        None => semantics_bug!("branch target L{} was never materialized", label.index()),
    }
}

/// Look up a statement's UNIT specifier; READ/WRITE without one is malformed.
fn read_write_unit<'a>(
    unit: &'a Option<ast::IoUnit>,
    controls: &'a [ast::IoControlSpec],
) -> &'a ast::IoUnit {
    if let Some(u) = unit {
        return u;
    }
    let from_controls = controls.iter().find_map(|c| match c {
        ast::IoControlSpec::Unit(u) => Some(u),
        _ => None,
    });
    match from_controls {
        Some(u) => u,
        None => semantics_bug!("no UNIT specifier"),
    }
}

fn emit_composed(builder: &mut FirBuilder<'_>, composed: ComposedSwitch, map: &LabelMap) {
    match composed {
        ComposedSwitch::Plain {
            selector,
            default,
            targets,
        } => {
            let targets = targets
                .into_iter()
                .map(|(v, l)| (v, resolve(map, l)))
                .collect();
            builder.switch(selector, resolve(map, default), targets);
        }
        ComposedSwitch::Case {
            selector,
            default,
            targets,
        } => {
            let targets = targets
                .into_iter()
                .map(|(v, l)| (v, resolve(map, l)))
                .collect();
            builder.switch_case(selector, resolve(map, default), targets);
        }
        ComposedSwitch::Rank {
            selector,
            default,
            targets,
        } => {
            let targets = targets
                .into_iter()
                .map(|(v, l)| (v, resolve(map, l)))
                .collect();
            builder.switch_rank(selector, resolve(map, default), targets);
        }
        ComposedSwitch::Type {
            selector,
            default,
            targets,
        } => {
            let targets = targets
                .into_iter()
                .map(|(v, l)| (v, resolve(map, l)))
                .collect();
            builder.switch_type(selector, resolve(map, default), targets);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::procedure::Procedure;
    use crate::ir::stmt::Stmt;
    use taiga_front::ast::GotoStmt;
    use taiga_front::sema::SemanticsContext;

    use super::super::linear::GotoSource;

    #[test]
    fn forward_branch_is_deferred_then_patched() {
        let ctx = SemanticsContext::new();
        let mut state = AnalysisState::new();
        let target = state.fetch_source_label(100);

        let goto = GotoStmt { target: 100 };
        let ops = vec![
            LinearOp::Goto {
                source: GotoSource::Goto(&goto),
                target,
            },
            LinearOp::Label(target),
        ];

        let mut proc = Procedure::new("t", ctx.global_scope());
        let entry = proc.create_block(proc.root_region);
        {
            let builder = FirBuilder::new(&mut proc, entry);
            let mut blocks = BlockBuilder::new(builder, &ctx, &mut state);
            blocks.run(&ops);
            // The branch is pending until the resolver runs.
            assert!(proc_terminator_is_none(&blocks, entry));
            blocks.finish();
            blocks.resolve_edges();
            // Resolving again is a no-op: the queue drained.
            blocks.resolve_edges();
        }

        let term = proc.terminator(entry).expect("entry is closed");
        let Stmt::Branch { true_target, .. } = term else {
            panic!("expected a branch, got {term:?}");
        };
        assert!(proc.blocks[*true_target].preds.contains(&entry));
    }

    fn proc_terminator_is_none(blocks: &BlockBuilder<'_, '_>, block: BlockId) -> bool {
        blocks.builder.proc().terminator(block).is_none()
    }

    #[test]
    #[should_panic(expected = "never materialized")]
    fn unresolved_target_is_a_bug() {
        let ctx = SemanticsContext::new();
        let mut state = AnalysisState::new();
        let target = state.fetch_source_label(100);

        let goto = GotoStmt { target: 100 };
        let ops = vec![LinearOp::Goto {
            source: GotoSource::Goto(&goto),
            target,
        }];

        let mut proc = Procedure::new("t", ctx.global_scope());
        let entry = proc.create_block(proc.root_region);
        let builder = FirBuilder::new(&mut proc, entry);
        let mut blocks = BlockBuilder::new(builder, &ctx, &mut state);
        blocks.run(&ops);
        blocks.resolve_edges();
    }
}
