//! The linear operation stream.
//!
//! Phase one of the lowering: the linearizer flattens structured constructs
//! into this ordered op sequence with symbolic labels; phase two (the block
//! builder) materializes blocks from it. Ops borrow the parse tree — the
//! stream never outlives a procedure's lowering.

use std::io::{self, Write};

use taiga_front::ast;
use taiga_front::sema::SymbolId;

use super::analysis::LLabel;

/// The statement a `Goto` op originated from, when any.
#[derive(Debug, Clone, Copy)]
pub enum GotoSource<'a> {
    Cycle(&'a ast::CycleStmt),
    Exit(&'a ast::ExitStmt),
    Goto(&'a ast::GotoStmt),
    /// Loop scaffolding and construct fall-throughs.
    Artificial,
}

/// The predicate-bearing statement behind a `CondGoto`.
#[derive(Debug, Clone, Copy)]
pub enum CondGotoSource<'a> {
    IfThen(&'a ast::Statement<ast::IfThenStmt>),
    ElseIf(&'a ast::Statement<ast::ElseIfStmt>),
    If(&'a ast::IfStmt),
    Do(&'a ast::Statement<ast::NonLabelDoStmt>),
}

#[derive(Debug, Clone, Copy)]
pub enum ReturnSource<'a> {
    FailImage,
    Return(&'a ast::ReturnStmt),
    Stop(&'a ast::StopStmt),
}

/// The multi-arm statement or construct behind a `Switch`.
#[derive(Debug, Clone, Copy)]
pub enum SwitchSource<'a> {
    Call(&'a ast::CallStmt),
    ComputedGoto(&'a ast::ComputedGotoStmt),
    ArithmeticIf(&'a ast::ArithmeticIfStmt),
    Case(&'a ast::CaseConstruct),
    Rank(&'a ast::SelectRankConstruct),
    Type(&'a ast::SelectTypeConstruct),
}

/// An I/O statement with at least one ERR/EOR/END escape specifier.
#[derive(Debug, Clone, Copy)]
pub enum IoSource<'a> {
    Read(&'a ast::ReadStmt),
    Write(&'a ast::WriteStmt),
    Wait(&'a ast::WaitStmt),
    Open(&'a ast::OpenStmt),
    Close(&'a ast::CloseStmt),
    Backspace(&'a ast::PositionStmt),
    Endfile(&'a ast::PositionStmt),
    Rewind(&'a ast::PositionStmt),
    Flush(&'a ast::PositionStmt),
    Inquire(&'a ast::InquireStmt),
}

/// A structured construct bracketed by `BeginConstruct`/`EndConstruct`.
#[derive(Debug, Clone, Copy)]
pub enum ConstructRef<'a> {
    Associate(&'a ast::AssociateConstruct),
    Block(&'a ast::BlockConstruct),
    Case(&'a ast::CaseConstruct),
    ChangeTeam(&'a ast::ChangeTeamConstruct),
    Critical(&'a ast::CriticalConstruct),
    Do(&'a ast::DoConstruct),
    If(&'a ast::IfConstruct),
    SelectRank(&'a ast::SelectRankConstruct),
    SelectType(&'a ast::SelectTypeConstruct),
    Where(&'a ast::WhereConstruct),
    Forall(&'a ast::ForallConstruct),
    CompilerDirective(&'a ast::Statement<String>),
    OpenMp(&'a ast::OpenMpConstruct),
    OpenMpEndLoop(&'a ast::Statement<String>),
}

impl ConstructRef<'_> {
    pub fn display_name(&self) -> &'static str {
        match self {
            ConstructRef::Associate(_) => "ASSOCIATE",
            ConstructRef::Block(_) => "BLOCK",
            ConstructRef::Case(_) => "SELECT CASE",
            ConstructRef::ChangeTeam(_) => "CHANGE TEAM",
            ConstructRef::Critical(_) => "CRITICAL",
            ConstructRef::Do(_) => "DO",
            ConstructRef::If(_) => "IF",
            ConstructRef::SelectRank(_) => "SELECT RANK",
            ConstructRef::SelectType(_) => "SELECT TYPE",
            ConstructRef::Where(_) => "WHERE",
            ConstructRef::Forall(_) => "FORALL",
            ConstructRef::CompilerDirective(_) => "<directive>",
            ConstructRef::OpenMp(_) => "<open-mp>",
            ConstructRef::OpenMpEndLoop(_) => "<open-mp-end-loop>",
        }
    }
}

/// One element of the linear stream.
#[derive(Debug, Clone)]
pub enum LinearOp<'a> {
    /// Join-point placeholder; becomes a basic block.
    Label(LLabel),
    Goto {
        source: GotoSource<'a>,
        target: LLabel,
    },
    CondGoto {
        source: CondGotoSource<'a>,
        true_label: LLabel,
        false_label: LLabel,
    },
    Return {
        source: ReturnSource<'a>,
    },
    /// Multiway dispatch. The last target is always the fall-through; the
    /// composer decides the final default.
    Switch {
        source: SwitchSource<'a>,
        targets: Vec<LLabel>,
    },
    /// I/O with escape specifiers: runtime call, then a switch over the
    /// result with `next` as the fall-through.
    SwitchingIo {
        source: IoSource<'a>,
        next: LLabel,
        err: Option<LLabel>,
        eor: Option<LLabel>,
        end: Option<LLabel>,
    },
    /// Assigned GOTO. An empty target list means "use the ASSIGN set".
    IndirectGoto {
        symbol: SymbolId,
        targets: Vec<LLabel>,
    },
    Action(&'a ast::Statement<ast::ActionStmt>),
    BeginConstruct(ConstructRef<'a>),
    EndConstruct(ConstructRef<'a>),
    DoIncrement(&'a ast::DoConstruct),
    DoCompare(&'a ast::DoConstruct),
}

impl LinearOp<'_> {
    /// One line of the linear-stream debug dump.
    pub fn dump(&self, out: &mut dyn Write) -> io::Result<()> {
        match self {
            LinearOp::Label(l) => writeln!(out, "label: {}", l.index()),
            LinearOp::Goto { target, .. } => writeln!(out, "goto {}", target.index()),
            LinearOp::CondGoto {
                true_label,
                false_label,
                ..
            } => writeln!(
                out,
                "cbranch (?) {} {}",
                true_label.index(),
                false_label.index()
            ),
            LinearOp::Return { .. } => writeln!(out, "return"),
            LinearOp::Switch { source, .. } => {
                let tag = match source {
                    SwitchSource::Case(_) => "case()",
                    SwitchSource::Rank(_) => "rank()",
                    SwitchSource::Type(_) => "type()",
                    SwitchSource::ComputedGoto(_) => "igoto(?)",
                    SwitchSource::ArithmeticIf(_) => "<=>(?)",
                    SwitchSource::Call(_) => "alt-return(?)",
                };
                writeln!(out, "switch-{tag} [...]")
            }
            LinearOp::SwitchingIo { err, eor, end, .. } => {
                write!(out, "io-op")?;
                if let Some(l) = err {
                    write!(out, " ERR={}", l.index())?;
                }
                if let Some(l) = eor {
                    write!(out, " EOR={}", l.index())?;
                }
                if let Some(l) = end {
                    write!(out, " END={}", l.index())?;
                }
                writeln!(out)
            }
            LinearOp::IndirectGoto { .. } => writeln!(out, "igoto"),
            LinearOp::Action(stmt) => writeln!(out, "action: {}", stmt.stmt.describe()),
            LinearOp::BeginConstruct(c) => writeln!(out, "construct-{} {{", c.display_name()),
            LinearOp::EndConstruct(c) => writeln!(out, "}} construct-{}", c.display_name()),
            LinearOp::DoIncrement(_) => writeln!(out, "do increment"),
            LinearOp::DoCompare(_) => writeln!(out, "do compare"),
        }
    }
}
