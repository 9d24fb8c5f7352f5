//! Structured parse tree → linear op stream.
//!
//! Single pass in program order. Construct bodies are bracketed by
//! `BeginConstruct`/`EndConstruct`; every jump target is a symbolic label
//! resolved later by the block builder. The construct name stack lives only
//! for the duration of the walk and is balanced on exit.

use taiga_front::ast;

use crate::semantics_bug;

use super::analysis::{AnalysisState, LLabel};
use super::linear::{
    CondGotoSource, ConstructRef, GotoSource, IoSource, LinearOp, ReturnSource, SwitchSource,
};

#[derive(Default)]
pub struct Linearizer<'a> {
    pub ops: Vec<LinearOp<'a>>,
}

impl<'a> Linearizer<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn walk_block(&mut self, block: &'a ast::Block, state: &mut AnalysisState) {
        for construct in block {
            self.construct(construct, state);
        }
    }

    fn construct(&mut self, construct: &'a ast::Construct, state: &mut AnalysisState) {
        match construct {
            ast::Construct::Action(stmt) => self.action_stmt(stmt, state),
            ast::Construct::If(c) => self.if_construct(c, state),
            ast::Construct::Do(c) => self.do_construct(c, state),
            ast::Construct::Case(c) => self.case_construct(c, state),
            ast::Construct::SelectRank(c) => self.select_rank_construct(c, state),
            ast::Construct::SelectType(c) => self.select_type_construct(c, state),
            ast::Construct::Block(c) => self.block_construct(c, state),
            ast::Construct::Associate(c) => self.wrapper_construct(
                ConstructRef::Associate(c),
                c.name.clone(),
                c.assoc_stmt.label,
                &c.body,
                state,
            ),
            ast::Construct::ChangeTeam(c) => self.wrapper_construct(
                ConstructRef::ChangeTeam(c),
                c.name.clone(),
                c.team_stmt.label,
                &c.body,
                state,
            ),
            ast::Construct::Critical(c) => self.wrapper_construct(
                ConstructRef::Critical(c),
                c.name.clone(),
                c.critical_stmt.label,
                &c.body,
                state,
            ),
            ast::Construct::Where(c) => self.where_construct(c, state),
            ast::Construct::Forall(c) => self.wrapper_construct(
                ConstructRef::Forall(c),
                c.name.clone(),
                c.forall_stmt.label,
                &c.body,
                state,
            ),
            ast::Construct::CompilerDirective(stmt) => {
                // Unhandled variant: opaque begin/end, nothing in between.
                self.header_label(stmt.label, state);
                self.ops
                    .push(LinearOp::BeginConstruct(ConstructRef::CompilerDirective(stmt)));
                self.ops
                    .push(LinearOp::EndConstruct(ConstructRef::CompilerDirective(stmt)));
            }
            ast::Construct::OpenMp(c) => {
                // Pass the body through so the rest of the lowering succeeds.
                self.header_label(c.directive.label, state);
                self.ops
                    .push(LinearOp::BeginConstruct(ConstructRef::OpenMp(c)));
                self.walk_block(&c.body, state);
                self.ops.push(LinearOp::EndConstruct(ConstructRef::OpenMp(c)));
            }
            ast::Construct::OpenMpEndLoop(stmt) => {
                self.header_label(stmt.label, state);
                self.ops
                    .push(LinearOp::BeginConstruct(ConstructRef::OpenMpEndLoop(stmt)));
                self.ops
                    .push(LinearOp::EndConstruct(ConstructRef::OpenMpEndLoop(stmt)));
            }
        }
    }

    /// Emit the `Label` op for a labeled statement.
    fn header_label(&mut self, label: Option<ast::Label>, state: &mut AnalysisState) {
        if let Some(l) = label {
            let ll = state.define_source_label(l);
            self.ops.push(LinearOp::Label(ll));
        }
    }

    fn goto(&mut self, source: GotoSource<'a>, target: LLabel) {
        self.ops.push(LinearOp::Goto { source, target });
    }

    // -- structured constructs ----------------------------------------------

    fn if_construct(&mut self, c: &'a ast::IfConstruct, state: &mut AnalysisState) {
        self.header_label(c.if_then.label, state);
        let then_label = state.fresh_label();
        let mut else_label = state.fresh_label();
        let exit = state.fresh_label();
        let exit_ref = state.reference(exit);
        state.push_construct(c.name.clone(), exit_ref, LLabel::UNSPECIFIED);
        self.ops.push(LinearOp::BeginConstruct(ConstructRef::If(c)));
        let t = state.reference(then_label);
        let f = state.reference(else_label);
        self.ops.push(LinearOp::CondGoto {
            source: CondGotoSource::IfThen(&c.if_then),
            true_label: t,
            false_label: f,
        });
        self.ops.push(LinearOp::Label(then_label));
        self.walk_block(&c.body, state);
        self.goto(GotoSource::Artificial, exit_ref);
        for else_if in &c.else_ifs {
            self.ops.push(LinearOp::Label(else_label));
            let new_then = state.fresh_label();
            let new_else = state.fresh_label();
            let t = state.reference(new_then);
            let f = state.reference(new_else);
            self.ops.push(LinearOp::CondGoto {
                source: CondGotoSource::ElseIf(&else_if.else_if),
                true_label: t,
                false_label: f,
            });
            self.ops.push(LinearOp::Label(new_then));
            self.walk_block(&else_if.body, state);
            self.goto(GotoSource::Artificial, exit_ref);
            else_label = new_else;
        }
        self.ops.push(LinearOp::Label(else_label));
        if let Some(body) = &c.else_body {
            self.walk_block(body, state);
        }
        self.goto(GotoSource::Artificial, exit_ref);
        self.ops.push(LinearOp::Label(exit));
        self.ops.push(LinearOp::EndConstruct(ConstructRef::If(c)));
        state.pop_construct();
    }

    /// Any DO form: scaffolding is header → latch → body → increment, with
    /// the stack entry routing `EXIT` to the exit label and `CYCLE` to the
    /// increment label.
    fn do_construct(&mut self, c: &'a ast::DoConstruct, state: &mut AnalysisState) {
        self.header_label(c.do_stmt.label, state);
        let backedge = state.fresh_label();
        let increment = state.fresh_label();
        let entry = state.fresh_label();
        let exit = state.fresh_label();
        let exit_ref = state.reference(exit);
        let cycle_ref = state.reference(increment);
        state.push_construct(c.name.clone(), exit_ref, cycle_ref);
        self.ops.push(LinearOp::BeginConstruct(ConstructRef::Do(c)));
        let back_ref = state.reference(backedge);
        self.goto(GotoSource::Artificial, back_ref);
        self.ops.push(LinearOp::Label(increment));
        self.ops.push(LinearOp::DoIncrement(c));
        self.ops.push(LinearOp::Label(backedge));
        self.ops.push(LinearOp::DoCompare(c));
        let entry_ref = state.reference(entry);
        self.ops.push(LinearOp::CondGoto {
            source: CondGotoSource::Do(&c.do_stmt),
            true_label: entry_ref,
            false_label: exit_ref,
        });
        self.ops.push(LinearOp::Label(entry));
        self.walk_block(&c.body, state);
        self.goto(GotoSource::Artificial, cycle_ref);
        self.ops.push(LinearOp::EndConstruct(ConstructRef::Do(c)));
        self.ops.push(LinearOp::Label(exit));
        state.pop_construct();
    }

    fn block_construct(&mut self, c: &'a ast::BlockConstruct, state: &mut AnalysisState) {
        self.header_label(c.block_stmt.label, state);
        let exit = state.fresh_label();
        let exit_ref = state.reference(exit);
        state.push_construct(c.block_stmt.stmt.clone(), exit_ref, LLabel::UNSPECIFIED);
        self.ops
            .push(LinearOp::BeginConstruct(ConstructRef::Block(c)));
        self.walk_block(&c.body, state);
        self.ops.push(LinearOp::EndConstruct(ConstructRef::Block(c)));
        self.ops.push(LinearOp::Label(exit));
        state.pop_construct();
    }

    /// ASSOCIATE, CHANGE TEAM, CRITICAL, FORALL: plain bracketed body with
    /// an exit label inside the construct.
    fn wrapper_construct(
        &mut self,
        construct: ConstructRef<'a>,
        name: Option<String>,
        label: Option<ast::Label>,
        body: &'a ast::Block,
        state: &mut AnalysisState,
    ) {
        self.header_label(label, state);
        let exit = state.fresh_label();
        let exit_ref = state.reference(exit);
        state.push_construct(name, exit_ref, LLabel::UNSPECIFIED);
        self.ops.push(LinearOp::BeginConstruct(construct));
        self.walk_block(body, state);
        self.ops.push(LinearOp::Label(exit));
        self.ops.push(LinearOp::EndConstruct(construct));
        state.pop_construct();
    }

    fn where_construct(&mut self, c: &'a ast::WhereConstruct, state: &mut AnalysisState) {
        self.header_label(c.where_stmt.label, state);
        let exit = state.fresh_label();
        let exit_ref = state.reference(exit);
        state.push_construct(c.name.clone(), exit_ref, LLabel::UNSPECIFIED);
        self.ops.push(LinearOp::BeginConstruct(ConstructRef::Where(c)));
        self.walk_block(&c.body, state);
        for masked in &c.masked_elsewheres {
            self.walk_block(&masked.body, state);
        }
        if let Some(elsewhere) = &c.elsewhere {
            self.walk_block(&elsewhere.body, state);
        }
        self.ops.push(LinearOp::Label(exit));
        self.ops.push(LinearOp::EndConstruct(ConstructRef::Where(c)));
        state.pop_construct();
    }

    fn case_construct(&mut self, c: &'a ast::CaseConstruct, state: &mut AnalysisState) {
        self.header_label(c.select.label, state);
        let exit = state.fresh_label();
        let exit_ref = state.reference(exit);
        state.push_construct(c.name.clone(), exit_ref, LLabel::UNSPECIFIED);
        self.ops.push(LinearOp::BeginConstruct(ConstructRef::Case(c)));
        if !c.cases.is_empty() {
            let arms: Vec<LLabel> = c.cases.iter().map(|_| state.fresh_label()).collect();
            let mut targets: Vec<LLabel> = arms.iter().map(|&l| state.reference(l)).collect();
            targets.push(exit_ref);
            self.ops.push(LinearOp::Switch {
                source: SwitchSource::Case(c),
                targets,
            });
            for (case, &arm) in c.cases.iter().zip(&arms) {
                self.ops.push(LinearOp::Label(arm));
                self.walk_block(&case.body, state);
                self.goto(GotoSource::Artificial, exit_ref);
            }
        }
        self.ops.push(LinearOp::Label(exit));
        self.ops.push(LinearOp::EndConstruct(ConstructRef::Case(c)));
        state.pop_construct();
    }

    fn select_rank_construct(
        &mut self,
        c: &'a ast::SelectRankConstruct,
        state: &mut AnalysisState,
    ) {
        self.header_label(c.select.label, state);
        let exit = state.fresh_label();
        let exit_ref = state.reference(exit);
        state.push_construct(c.name.clone(), exit_ref, LLabel::UNSPECIFIED);
        self.ops
            .push(LinearOp::BeginConstruct(ConstructRef::SelectRank(c)));
        if !c.cases.is_empty() {
            let arms: Vec<LLabel> = c.cases.iter().map(|_| state.fresh_label()).collect();
            let mut targets: Vec<LLabel> = arms.iter().map(|&l| state.reference(l)).collect();
            targets.push(exit_ref);
            self.ops.push(LinearOp::Switch {
                source: SwitchSource::Rank(c),
                targets,
            });
            for (case, &arm) in c.cases.iter().zip(&arms) {
                self.ops.push(LinearOp::Label(arm));
                self.walk_block(&case.body, state);
                self.goto(GotoSource::Artificial, exit_ref);
            }
        }
        self.ops.push(LinearOp::Label(exit));
        self.ops
            .push(LinearOp::EndConstruct(ConstructRef::SelectRank(c)));
        state.pop_construct();
    }

    fn select_type_construct(
        &mut self,
        c: &'a ast::SelectTypeConstruct,
        state: &mut AnalysisState,
    ) {
        self.header_label(c.select.label, state);
        let exit = state.fresh_label();
        let exit_ref = state.reference(exit);
        state.push_construct(c.name.clone(), exit_ref, LLabel::UNSPECIFIED);
        self.ops
            .push(LinearOp::BeginConstruct(ConstructRef::SelectType(c)));
        if !c.cases.is_empty() {
            let arms: Vec<LLabel> = c.cases.iter().map(|_| state.fresh_label()).collect();
            let mut targets: Vec<LLabel> = arms.iter().map(|&l| state.reference(l)).collect();
            targets.push(exit_ref);
            self.ops.push(LinearOp::Switch {
                source: SwitchSource::Type(c),
                targets,
            });
            for (case, &arm) in c.cases.iter().zip(&arms) {
                self.ops.push(LinearOp::Label(arm));
                self.walk_block(&case.body, state);
                self.goto(GotoSource::Artificial, exit_ref);
            }
        }
        self.ops.push(LinearOp::Label(exit));
        self.ops
            .push(LinearOp::EndConstruct(ConstructRef::SelectType(c)));
        state.pop_construct();
    }

    // -- action statements --------------------------------------------------

    fn action_stmt(&mut self, stmt: &'a ast::Statement<ast::ActionStmt>, state: &mut AnalysisState) {
        self.header_label(stmt.label, state);
        self.build_action(stmt, state);
    }

    fn build_action(
        &mut self,
        stmt: &'a ast::Statement<ast::ActionStmt>,
        state: &mut AnalysisState,
    ) {
        match &stmt.stmt {
            ast::ActionStmt::Call(call) if call.has_alt_returns() => {
                let next = state.fresh_label();
                let mut targets: Vec<LLabel> = call
                    .alt_return_labels()
                    .into_iter()
                    .map(|l| state.fetch_source_label(l))
                    .collect();
                targets.push(next);
                self.ops.push(LinearOp::Switch {
                    source: SwitchSource::Call(call),
                    targets,
                });
                self.ops.push(LinearOp::Label(next));
            }
            ast::ActionStmt::Assign(assign) => {
                let Some(symbol) = assign.var.symbol else {
                    semantics_bug!("ASSIGN variable '{}' has no symbol", assign.var.ident);
                };
                state.add_assign(symbol, assign.label);
                self.ops.push(LinearOp::Action(stmt));
            }
            ast::ActionStmt::Cycle(cycle) => {
                let target = match &cycle.name {
                    Some(name) => {
                        let entry = state.find_on_stack(name);
                        if entry.cycle.is_unspecified() {
                            semantics_bug!("CYCLE target '{name}' is not a DO construct");
                        }
                        entry.cycle
                    }
                    None => state.nearest_enclosing_do().cycle,
                };
                self.goto(GotoSource::Cycle(cycle), target);
            }
            ast::ActionStmt::Exit(exit) => {
                let target = match &exit.name {
                    Some(name) => state.find_on_stack(name).exit,
                    None => state.nearest_enclosing_do().exit,
                };
                self.goto(GotoSource::Exit(exit), target);
            }
            ast::ActionStmt::Goto(goto) => {
                let target = state.fetch_source_label(goto.target);
                self.goto(GotoSource::Goto(goto), target);
            }
            ast::ActionStmt::FailImage => {
                self.ops.push(LinearOp::Return {
                    source: ReturnSource::FailImage,
                });
            }
            ast::ActionStmt::Return(ret) => {
                self.ops.push(LinearOp::Return {
                    source: ReturnSource::Return(ret),
                });
            }
            ast::ActionStmt::Stop(stop) => {
                self.ops.push(LinearOp::Action(stmt));
                self.ops.push(LinearOp::Return {
                    source: ReturnSource::Stop(stop),
                });
            }
            ast::ActionStmt::Read(read) => {
                self.three_label_spec(
                    stmt,
                    IoSource::Read(read),
                    read.err_label(),
                    read.eor_label(),
                    read.end_label(),
                    state,
                );
            }
            ast::ActionStmt::Write(write) => {
                self.three_label_spec(
                    stmt,
                    IoSource::Write(write),
                    write.err_label(),
                    write.eor_label(),
                    write.end_label(),
                    state,
                );
            }
            ast::ActionStmt::Wait(wait) => {
                self.three_label_spec(
                    stmt,
                    IoSource::Wait(wait),
                    wait.err_label(),
                    wait.eor_label(),
                    wait.end_label(),
                    state,
                );
            }
            ast::ActionStmt::Open(open) => {
                self.err_label_spec(stmt, IoSource::Open(open), open.err_label(), state)
            }
            ast::ActionStmt::Close(close) => {
                self.err_label_spec(stmt, IoSource::Close(close), close.err_label(), state)
            }
            ast::ActionStmt::Backspace(pos) => {
                self.err_label_spec(stmt, IoSource::Backspace(pos), pos.err_label(), state)
            }
            ast::ActionStmt::Endfile(pos) => {
                self.err_label_spec(stmt, IoSource::Endfile(pos), pos.err_label(), state)
            }
            ast::ActionStmt::Rewind(pos) => {
                self.err_label_spec(stmt, IoSource::Rewind(pos), pos.err_label(), state)
            }
            ast::ActionStmt::Flush(pos) => {
                self.err_label_spec(stmt, IoSource::Flush(pos), pos.err_label(), state)
            }
            ast::ActionStmt::Inquire(inq) => {
                self.err_label_spec(stmt, IoSource::Inquire(inq), inq.err_label(), state)
            }
            ast::ActionStmt::ComputedGoto(cg) => {
                let next = state.fresh_label();
                let mut targets: Vec<LLabel> = cg
                    .labels
                    .iter()
                    .map(|&l| state.fetch_source_label(l))
                    .collect();
                targets.push(next);
                self.ops.push(LinearOp::Switch {
                    source: SwitchSource::ComputedGoto(cg),
                    targets,
                });
                self.ops.push(LinearOp::Label(next));
            }
            ast::ActionStmt::ArithmeticIf(aif) => {
                let targets = vec![
                    state.fetch_source_label(aif.negative),
                    state.fetch_source_label(aif.zero),
                    state.fetch_source_label(aif.positive),
                ];
                self.ops.push(LinearOp::Switch {
                    source: SwitchSource::ArithmeticIf(aif),
                    targets,
                });
            }
            ast::ActionStmt::AssignedGoto(ag) => {
                let Some(symbol) = ag.var.symbol else {
                    semantics_bug!("assigned GOTO variable '{}' has no symbol", ag.var.ident);
                };
                let targets: Vec<LLabel> = ag
                    .labels
                    .iter()
                    .map(|&l| state.fetch_source_label(l))
                    .collect();
                self.ops.push(LinearOp::IndirectGoto { symbol, targets });
            }
            ast::ActionStmt::If(if_stmt) => {
                let then_label = state.fresh_label();
                let endif = state.fresh_label();
                let t = state.reference(then_label);
                let f = state.reference(endif);
                self.ops.push(LinearOp::CondGoto {
                    source: CondGotoSource::If(if_stmt),
                    true_label: t,
                    false_label: f,
                });
                self.ops.push(LinearOp::Label(then_label));
                self.action_stmt(&if_stmt.action, state);
                self.ops.push(LinearOp::Label(endif));
            }
            _ => self.ops.push(LinearOp::Action(stmt)),
        }
    }

    /// READ/WRITE/WAIT: ERR, EOR, and END escapes.
    fn three_label_spec(
        &mut self,
        stmt: &'a ast::Statement<ast::ActionStmt>,
        source: IoSource<'a>,
        err: Option<ast::Label>,
        eor: Option<ast::Label>,
        end: Option<ast::Label>,
        state: &mut AnalysisState,
    ) {
        if err.is_none() && eor.is_none() && end.is_none() {
            self.ops.push(LinearOp::Action(stmt));
            return;
        }
        let err = err.map(|l| state.fetch_source_label(l));
        let eor = eor.map(|l| state.fetch_source_label(l));
        let end = end.map(|l| state.fetch_source_label(l));
        let next = state.fresh_label();
        self.ops.push(LinearOp::SwitchingIo {
            source,
            next,
            err,
            eor,
            end,
        });
        self.ops.push(LinearOp::Label(next));
    }

    /// OPEN/CLOSE/BACKSPACE/ENDFILE/REWIND/FLUSH/INQUIRE: ERR escape only.
    fn err_label_spec(
        &mut self,
        stmt: &'a ast::Statement<ast::ActionStmt>,
        source: IoSource<'a>,
        err: Option<ast::Label>,
        state: &mut AnalysisState,
    ) {
        let Some(err) = err else {
            self.ops.push(LinearOp::Action(stmt));
            return;
        };
        let err = state.fetch_source_label(err);
        let next = state.fresh_label();
        self.ops.push(LinearOp::SwitchingIo {
            source,
            next,
            err: Some(err),
            eor: None,
            end: None,
        });
        self.ops.push(LinearOp::Label(next));
    }
}
