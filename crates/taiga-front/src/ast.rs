//! Fortran parse-tree interface.
//!
//! A closed sum of the executable constructs and action statements that the
//! control-flow lowering consumes. This is the shape of a parse tree *after*
//! semantic analysis: names carry resolved symbols and expressions carry
//! pre-computed typed expressions (see [`crate::expr::Expr::typed_expr`]).
//! No parsing happens here.

use serde::{Deserialize, Serialize};

use crate::expr::Expr;
use crate::sema::SymbolId;

/// A Fortran statement label (1..=99999).
pub type Label = u32;

/// Half-open byte range into the original source, used for scope attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    pub start: u32,
    pub end: u32,
}

impl SourceRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(self, other: SourceRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A statement wrapper carrying its optional source label and location.
#[derive(Debug, Clone)]
pub struct Statement<T> {
    pub label: Option<Label>,
    pub source: SourceRange,
    pub stmt: T,
}

impl<T> Statement<T> {
    pub fn new(stmt: T, source: SourceRange) -> Self {
        Self {
            label: None,
            source,
            stmt,
        }
    }

    pub fn labeled(label: Label, stmt: T, source: SourceRange) -> Self {
        Self {
            label: Some(label),
            source,
            stmt,
        }
    }
}

// ---------------------------------------------------------------------------
// Program units
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub units: Vec<ProgramUnit>,
}

#[derive(Debug, Clone)]
pub enum ProgramUnit {
    Main(MainProgram),
    Function(FunctionSubprogram),
    Subroutine(SubroutineSubprogram),
}

#[derive(Debug, Clone)]
pub struct MainProgram {
    /// `PROGRAM name`, when present.
    pub program_stmt: Option<Statement<String>>,
    pub body: Block,
    pub source: SourceRange,
}

#[derive(Debug, Clone)]
pub struct FunctionSubprogram {
    pub function_stmt: Statement<String>,
    pub body: Block,
    pub source: SourceRange,
}

#[derive(Debug, Clone)]
pub struct SubroutineSubprogram {
    pub subroutine_stmt: Statement<String>,
    pub body: Block,
    pub source: SourceRange,
}

// ---------------------------------------------------------------------------
// Executable constructs
// ---------------------------------------------------------------------------

/// An execution-part block: an ordered sequence of constructs.
pub type Block = Vec<Construct>;

#[derive(Debug, Clone)]
pub enum Construct {
    Action(Statement<ActionStmt>),
    If(IfConstruct),
    Do(DoConstruct),
    Case(CaseConstruct),
    SelectRank(SelectRankConstruct),
    SelectType(SelectTypeConstruct),
    Block(BlockConstruct),
    Associate(AssociateConstruct),
    ChangeTeam(ChangeTeamConstruct),
    Critical(CriticalConstruct),
    Where(WhereConstruct),
    Forall(ForallConstruct),
    /// `!DIR$ ...` — opaque to the lowering.
    CompilerDirective(Statement<String>),
    /// `!$OMP ...` block — opaque begin/end markers around a regular body.
    OpenMp(OpenMpConstruct),
    /// `!$OMP END DO`-style trailing directive.
    OpenMpEndLoop(Statement<String>),
}

#[derive(Debug, Clone)]
pub struct IfConstruct {
    pub name: Option<String>,
    pub if_then: Statement<IfThenStmt>,
    pub body: Block,
    pub else_ifs: Vec<ElseIfBlock>,
    pub else_body: Option<Block>,
}

#[derive(Debug, Clone)]
pub struct IfThenStmt {
    pub cond: Expr,
}

#[derive(Debug, Clone)]
pub struct ElseIfBlock {
    pub else_if: Statement<ElseIfStmt>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct ElseIfStmt {
    pub cond: Expr,
}

#[derive(Debug, Clone)]
pub struct DoConstruct {
    pub name: Option<String>,
    pub do_stmt: Statement<NonLabelDoStmt>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct NonLabelDoStmt {
    /// `None` is the infinite `DO`.
    pub control: Option<LoopControl>,
}

#[derive(Debug, Clone)]
pub enum LoopControl {
    Bounds(LoopBounds),
    While(Expr),
    /// Header detail is irrelevant to control-flow shape.
    Concurrent,
}

#[derive(Debug, Clone)]
pub struct LoopBounds {
    pub var: Name,
    pub lower: Expr,
    pub upper: Expr,
    pub step: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct CaseConstruct {
    pub name: Option<String>,
    pub select: Statement<SelectCaseStmt>,
    pub cases: Vec<Case>,
}

#[derive(Debug, Clone)]
pub struct SelectCaseStmt {
    pub expr: Expr,
}

#[derive(Debug, Clone)]
pub struct Case {
    pub case_stmt: Statement<CaseStmt>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct CaseStmt {
    pub selector: CaseSelector,
}

#[derive(Debug, Clone)]
pub enum CaseSelector {
    Default,
    Ranges(Vec<CaseValueRange>),
}

#[derive(Debug, Clone)]
pub enum CaseValueRange {
    Exact(Expr),
    /// `lo:`, `:hi`, or `lo:hi`. At least one bound is present.
    Range {
        lower: Option<Expr>,
        upper: Option<Expr>,
    },
}

#[derive(Debug, Clone)]
pub struct SelectRankConstruct {
    pub name: Option<String>,
    pub select: Statement<SelectRankStmt>,
    pub cases: Vec<RankCase>,
}

#[derive(Debug, Clone)]
pub struct SelectRankStmt {
    pub assoc_name: Option<Name>,
    pub selector: Selector,
}

#[derive(Debug, Clone)]
pub struct RankCase {
    pub rank_stmt: Statement<SelectRankCaseStmt>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct SelectRankCaseStmt {
    pub rank: RankGuard,
}

#[derive(Debug, Clone)]
pub enum RankGuard {
    /// `RANK (n)`
    Value(Expr),
    /// `RANK (*)` — assumed size.
    Star,
    /// `RANK DEFAULT`
    Default,
}

#[derive(Debug, Clone)]
pub struct SelectTypeConstruct {
    pub name: Option<String>,
    pub select: Statement<SelectTypeStmt>,
    pub cases: Vec<TypeCase>,
}

#[derive(Debug, Clone)]
pub struct SelectTypeStmt {
    pub assoc_name: Option<Name>,
    pub selector: Selector,
}

#[derive(Debug, Clone)]
pub struct TypeCase {
    pub guard_stmt: Statement<TypeGuardStmt>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct TypeGuardStmt {
    pub guard: TypeGuard,
}

#[derive(Debug, Clone)]
pub enum TypeGuard {
    TypeSpec(TypeSpec),
    Derived(DerivedTypeSpec),
    Default,
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct DerivedTypeSpec {
    pub name: String,
}

/// `SELECT` and `ASSOCIATE` selector: an expression or a variable designator.
#[derive(Debug, Clone)]
pub enum Selector {
    Expr(Expr),
    Variable(Variable),
}

#[derive(Debug, Clone)]
pub struct BlockConstruct {
    pub block_stmt: Statement<Option<String>>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct AssociateConstruct {
    pub name: Option<String>,
    pub assoc_stmt: Statement<AssociateStmt>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct AssociateStmt {
    pub associations: Vec<Association>,
}

#[derive(Debug, Clone)]
pub struct Association {
    pub name: Name,
    pub selector: Selector,
}

#[derive(Debug, Clone)]
pub struct ChangeTeamConstruct {
    pub name: Option<String>,
    pub team_stmt: Statement<ChangeTeamStmt>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct ChangeTeamStmt {
    pub team: Expr,
}

#[derive(Debug, Clone)]
pub struct CriticalConstruct {
    pub name: Option<String>,
    pub critical_stmt: Statement<CriticalStmt>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct CriticalStmt {}

#[derive(Debug, Clone)]
pub struct WhereConstruct {
    pub name: Option<String>,
    pub where_stmt: Statement<WhereConstructStmt>,
    pub body: Block,
    pub masked_elsewheres: Vec<MaskedElsewhere>,
    pub elsewhere: Option<ElsewhereBlock>,
}

#[derive(Debug, Clone)]
pub struct WhereConstructStmt {
    pub mask: Expr,
}

#[derive(Debug, Clone)]
pub struct MaskedElsewhere {
    pub stmt: Statement<MaskedElsewhereStmt>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct MaskedElsewhereStmt {
    pub mask: Expr,
}

#[derive(Debug, Clone)]
pub struct ElsewhereBlock {
    pub stmt: Statement<ElsewhereStmt>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct ElsewhereStmt {}

#[derive(Debug, Clone)]
pub struct ForallConstruct {
    pub name: Option<String>,
    pub forall_stmt: Statement<ForallConstructStmt>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct ForallConstructStmt {
    /// Scalar mask expression of the concurrent header, when present.
    pub mask: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct OpenMpConstruct {
    pub directive: Statement<String>,
    pub body: Block,
}

// ---------------------------------------------------------------------------
// Action statements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum ActionStmt {
    Allocate(AllocateStmt),
    Assignment(AssignmentStmt),
    PointerAssignment(PointerAssignmentStmt),
    Backspace(PositionStmt),
    Call(CallStmt),
    Close(CloseStmt),
    Continue,
    Cycle(CycleStmt),
    Deallocate(DeallocateStmt),
    Endfile(PositionStmt),
    EventPost(EventPostStmt),
    EventWait(EventWaitStmt),
    Exit(ExitStmt),
    FailImage,
    Flush(PositionStmt),
    FormTeam(FormTeamStmt),
    Goto(GotoStmt),
    If(IfStmt),
    Inquire(InquireStmt),
    Lock(LockStmt),
    Nullify(NullifyStmt),
    Open(OpenStmt),
    Pause(PauseStmt),
    Print(PrintStmt),
    Read(ReadStmt),
    Return(ReturnStmt),
    Rewind(PositionStmt),
    Stop(StopStmt),
    SyncAll(SyncAllStmt),
    SyncImages(SyncImagesStmt),
    SyncMemory(SyncMemoryStmt),
    SyncTeam(SyncTeamStmt),
    Unlock(UnlockStmt),
    Wait(WaitStmt),
    Where(WhereStmt),
    Forall(ForallStmt),
    Write(WriteStmt),
    ComputedGoto(ComputedGotoStmt),
    ArithmeticIf(ArithmeticIfStmt),
    Assign(AssignStmt),
    AssignedGoto(AssignedGotoStmt),
}

impl ActionStmt {
    /// Short statement-kind tag, used by the linear-stream dump.
    pub fn describe(&self) -> &'static str {
        match self {
            ActionStmt::Allocate(_) => "ALLOCATE",
            ActionStmt::Assignment(_) => "assignment",
            ActionStmt::PointerAssignment(_) => "pointer-assignment",
            ActionStmt::Backspace(_) => "BACKSPACE",
            ActionStmt::Call(_) => "CALL",
            ActionStmt::Close(_) => "CLOSE",
            ActionStmt::Continue => "CONTINUE",
            ActionStmt::Cycle(_) => "CYCLE",
            ActionStmt::Deallocate(_) => "DEALLOCATE",
            ActionStmt::Endfile(_) => "ENDFILE",
            ActionStmt::EventPost(_) => "EVENT POST",
            ActionStmt::EventWait(_) => "EVENT WAIT",
            ActionStmt::Exit(_) => "EXIT",
            ActionStmt::FailImage => "FAIL IMAGE",
            ActionStmt::Flush(_) => "FLUSH",
            ActionStmt::FormTeam(_) => "FORM TEAM",
            ActionStmt::Goto(_) => "GOTO",
            ActionStmt::If(_) => "IF",
            ActionStmt::Inquire(_) => "INQUIRE",
            ActionStmt::Lock(_) => "LOCK",
            ActionStmt::Nullify(_) => "NULLIFY",
            ActionStmt::Open(_) => "OPEN",
            ActionStmt::Pause(_) => "PAUSE",
            ActionStmt::Print(_) => "PRINT",
            ActionStmt::Read(_) => "READ",
            ActionStmt::Return(_) => "RETURN",
            ActionStmt::Rewind(_) => "REWIND",
            ActionStmt::Stop(_) => "STOP",
            ActionStmt::SyncAll(_) => "SYNC ALL",
            ActionStmt::SyncImages(_) => "SYNC IMAGES",
            ActionStmt::SyncMemory(_) => "SYNC MEMORY",
            ActionStmt::SyncTeam(_) => "SYNC TEAM",
            ActionStmt::Unlock(_) => "UNLOCK",
            ActionStmt::Wait(_) => "WAIT",
            ActionStmt::Where(_) => "WHERE",
            ActionStmt::Forall(_) => "FORALL",
            ActionStmt::Write(_) => "WRITE",
            ActionStmt::ComputedGoto(_) => "computed-GOTO",
            ActionStmt::ArithmeticIf(_) => "arithmetic-IF",
            ActionStmt::Assign(_) => "ASSIGN",
            ActionStmt::AssignedGoto(_) => "assigned-GOTO",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AllocateStmt {
    pub options: Vec<AllocOpt>,
    pub allocations: Vec<Allocation>,
}

#[derive(Debug, Clone)]
pub enum AllocOpt {
    Mold(Expr),
    Source(Expr),
    Stat(Variable),
    Errmsg(Variable),
}

#[derive(Debug, Clone)]
pub struct Allocation {
    pub object: AllocateObject,
}

#[derive(Debug, Clone)]
pub enum AllocateObject {
    Name(Name),
    Component(StructureComponent),
}

#[derive(Debug, Clone)]
pub struct AssignmentStmt {
    pub target: Variable,
    pub value: Expr,
}

#[derive(Debug, Clone)]
pub struct PointerAssignmentStmt {
    pub pointer: DataRef,
    pub target: Expr,
}

#[derive(Debug, Clone)]
pub struct CallStmt {
    pub proc: ProcedureDesignator,
    pub args: Vec<ActualArg>,
}

impl CallStmt {
    pub fn has_alt_returns(&self) -> bool {
        self.args
            .iter()
            .any(|a| matches!(a, ActualArg::AltReturn(_)))
    }

    pub fn alt_return_labels(&self) -> Vec<Label> {
        self.args
            .iter()
            .filter_map(|a| match a {
                ActualArg::AltReturn(l) => Some(*l),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub enum ProcedureDesignator {
    Name(Name),
    Component(StructureComponent),
}

#[derive(Debug, Clone)]
pub enum ActualArg {
    Expr(Expr),
    /// `*label` alternate-return specifier.
    AltReturn(Label),
}

#[derive(Debug, Clone)]
pub struct CycleStmt {
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExitStmt {
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GotoStmt {
    pub target: Label,
}

/// Bare logical `IF (cond) action`.
#[derive(Debug, Clone)]
pub struct IfStmt {
    pub cond: Expr,
    pub action: Box<Statement<ActionStmt>>,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    /// Alternate-return selector expression.
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopKind {
    Stop,
    ErrorStop,
}

#[derive(Debug, Clone)]
pub struct StopStmt {
    pub kind: StopKind,
    pub code: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct PauseStmt {
    pub code: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct ComputedGotoStmt {
    pub labels: Vec<Label>,
    pub expr: Expr,
}

#[derive(Debug, Clone)]
pub struct ArithmeticIfStmt {
    pub expr: Expr,
    pub negative: Label,
    pub zero: Label,
    pub positive: Label,
}

/// `ASSIGN label TO var`
#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub label: Label,
    pub var: Name,
}

/// `GOTO var [, (label-list)]`
#[derive(Debug, Clone)]
pub struct AssignedGotoStmt {
    pub var: Name,
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone)]
pub struct NullifyStmt {
    pub objects: Vec<PointerObject>,
}

#[derive(Debug, Clone)]
pub enum PointerObject {
    Name(Name),
    Component(StructureComponent),
}

#[derive(Debug, Clone)]
pub struct DeallocateStmt {
    pub objects: Vec<AllocateObject>,
    pub options: Vec<AllocOpt>,
}

// -- Image control ----------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EventPostStmt {
    pub event: Variable,
}

#[derive(Debug, Clone)]
pub struct EventWaitStmt {
    pub event: Variable,
}

#[derive(Debug, Clone)]
pub struct FormTeamStmt {
    pub team_number: Expr,
    pub team: Variable,
}

#[derive(Debug, Clone)]
pub struct LockStmt {
    pub lock: Variable,
}

#[derive(Debug, Clone)]
pub struct UnlockStmt {
    pub lock: Variable,
}

#[derive(Debug, Clone)]
pub struct SyncAllStmt {}

#[derive(Debug, Clone)]
pub struct SyncImagesStmt {
    /// Image set; `None` is `*`.
    pub images: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct SyncMemoryStmt {}

#[derive(Debug, Clone)]
pub struct SyncTeamStmt {
    pub team: Expr,
}

/// `WHERE (mask) assignment` single-statement form.
#[derive(Debug, Clone)]
pub struct WhereStmt {
    pub mask: Expr,
    pub assignment: AssignmentStmt,
}

/// `FORALL (...) assignment` single-statement form.
#[derive(Debug, Clone)]
pub struct ForallStmt {
    pub assignment: AssignmentStmt,
}

// ---------------------------------------------------------------------------
// I/O statements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum IoUnit {
    Number(i32),
    Star,
    Variable(Variable),
}

#[derive(Debug, Clone)]
pub enum Format {
    Label(Label),
    Star,
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub enum IoControlSpec {
    Unit(IoUnit),
    Fmt(Format),
    Err(Label),
    Eor(Label),
    End(Label),
    Iostat(Variable),
    Iomsg(Variable),
}

#[derive(Debug, Clone)]
pub struct ReadStmt {
    pub unit: Option<IoUnit>,
    pub format: Option<Format>,
    pub controls: Vec<IoControlSpec>,
    pub items: Vec<Variable>,
}

#[derive(Debug, Clone)]
pub struct WriteStmt {
    pub unit: Option<IoUnit>,
    pub format: Option<Format>,
    pub controls: Vec<IoControlSpec>,
    pub items: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct PrintStmt {
    pub format: Format,
    pub items: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub enum ConnectSpec {
    Unit(IoUnit),
    Err(Label),
    File(Expr),
    Status(Expr),
}

#[derive(Debug, Clone)]
pub struct OpenStmt {
    pub specs: Vec<ConnectSpec>,
}

#[derive(Debug, Clone)]
pub enum CloseSpec {
    Unit(IoUnit),
    Err(Label),
    Status(Expr),
}

#[derive(Debug, Clone)]
pub struct CloseStmt {
    pub specs: Vec<CloseSpec>,
}

/// Specifier list shared by BACKSPACE, ENDFILE, REWIND, and FLUSH.
#[derive(Debug, Clone)]
pub enum PositionSpec {
    Unit(IoUnit),
    Err(Label),
    Iostat(Variable),
    Iomsg(Variable),
}

#[derive(Debug, Clone)]
pub struct PositionStmt {
    pub specs: Vec<PositionSpec>,
}

#[derive(Debug, Clone)]
pub enum WaitSpec {
    Unit(IoUnit),
    Err(Label),
    Eor(Label),
    End(Label),
    Id(Expr),
}

#[derive(Debug, Clone)]
pub struct WaitStmt {
    pub specs: Vec<WaitSpec>,
}

#[derive(Debug, Clone)]
pub enum InquireSpec {
    Unit(IoUnit),
    Err(Label),
    File(Expr),
    Exist(Variable),
}

#[derive(Debug, Clone)]
pub enum InquireStmt {
    Specs(Vec<InquireSpec>),
    Iolength {
        length: Variable,
        items: Vec<Expr>,
    },
}

impl ReadStmt {
    pub fn err_label(&self) -> Option<Label> {
        find_control(&self.controls, |c| match c {
            IoControlSpec::Err(l) => Some(*l),
            _ => None,
        })
    }
    pub fn eor_label(&self) -> Option<Label> {
        find_control(&self.controls, |c| match c {
            IoControlSpec::Eor(l) => Some(*l),
            _ => None,
        })
    }
    pub fn end_label(&self) -> Option<Label> {
        find_control(&self.controls, |c| match c {
            IoControlSpec::End(l) => Some(*l),
            _ => None,
        })
    }
}

impl WriteStmt {
    pub fn err_label(&self) -> Option<Label> {
        find_control(&self.controls, |c| match c {
            IoControlSpec::Err(l) => Some(*l),
            _ => None,
        })
    }
    pub fn eor_label(&self) -> Option<Label> {
        find_control(&self.controls, |c| match c {
            IoControlSpec::Eor(l) => Some(*l),
            _ => None,
        })
    }
    pub fn end_label(&self) -> Option<Label> {
        find_control(&self.controls, |c| match c {
            IoControlSpec::End(l) => Some(*l),
            _ => None,
        })
    }
}

impl WaitStmt {
    pub fn err_label(&self) -> Option<Label> {
        self.specs.iter().find_map(|s| match s {
            WaitSpec::Err(l) => Some(*l),
            _ => None,
        })
    }
    pub fn eor_label(&self) -> Option<Label> {
        self.specs.iter().find_map(|s| match s {
            WaitSpec::Eor(l) => Some(*l),
            _ => None,
        })
    }
    pub fn end_label(&self) -> Option<Label> {
        self.specs.iter().find_map(|s| match s {
            WaitSpec::End(l) => Some(*l),
            _ => None,
        })
    }
}

impl OpenStmt {
    pub fn err_label(&self) -> Option<Label> {
        self.specs.iter().find_map(|s| match s {
            ConnectSpec::Err(l) => Some(*l),
            _ => None,
        })
    }
}

impl CloseStmt {
    pub fn err_label(&self) -> Option<Label> {
        self.specs.iter().find_map(|s| match s {
            CloseSpec::Err(l) => Some(*l),
            _ => None,
        })
    }
}

impl PositionStmt {
    pub fn err_label(&self) -> Option<Label> {
        self.specs.iter().find_map(|s| match s {
            PositionSpec::Err(l) => Some(*l),
            _ => None,
        })
    }
}

impl InquireStmt {
    pub fn err_label(&self) -> Option<Label> {
        match self {
            InquireStmt::Specs(specs) => specs.iter().find_map(|s| match s {
                InquireSpec::Err(l) => Some(*l),
                _ => None,
            }),
            InquireStmt::Iolength { .. } => None,
        }
    }
}

fn find_control<T>(controls: &[IoControlSpec], f: impl Fn(&IoControlSpec) -> Option<T>) -> Option<T> {
    controls.iter().find_map(f)
}

// ---------------------------------------------------------------------------
// Designators
// ---------------------------------------------------------------------------

/// A resolved name: the identifier plus the symbol semantic analysis bound it to.
#[derive(Debug, Clone)]
pub struct Name {
    pub ident: String,
    pub symbol: Option<SymbolId>,
}

impl Name {
    pub fn resolved(ident: impl Into<String>, symbol: SymbolId) -> Self {
        Self {
            ident: ident.into(),
            symbol: Some(symbol),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub data_ref: DataRef,
}

#[derive(Debug, Clone)]
pub enum DataRef {
    Name(Name),
    Component(Box<StructureComponent>),
}

#[derive(Debug, Clone)]
pub struct StructureComponent {
    pub base: DataRef,
    pub component: Name,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_escape_accessors() {
        let stmt = ReadStmt {
            unit: Some(IoUnit::Number(5)),
            format: Some(Format::Star),
            controls: vec![IoControlSpec::Err(10), IoControlSpec::End(20)],
            items: vec![],
        };
        assert_eq!(stmt.err_label(), Some(10));
        assert_eq!(stmt.eor_label(), None);
        assert_eq!(stmt.end_label(), Some(20));
    }

    #[test]
    fn alt_return_labels_in_order() {
        let call = CallStmt {
            proc: ProcedureDesignator::Name(Name {
                ident: "sub".into(),
                symbol: None,
            }),
            args: vec![
                ActualArg::AltReturn(100),
                ActualArg::AltReturn(200),
            ],
        };
        assert!(call.has_alt_returns());
        assert_eq!(call.alt_return_labels(), vec![100, 200]);
    }

    #[test]
    fn source_range_containment() {
        let outer = SourceRange::new(0, 100);
        let inner = SourceRange::new(10, 20);
        assert!(outer.contains(inner));
        assert!(!inner.contains(outer));
    }
}
