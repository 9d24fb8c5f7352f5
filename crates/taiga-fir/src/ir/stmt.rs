use serde::{Deserialize, Serialize};

use taiga_front::define_entity;
use taiga_front::expr::Expression;
use taiga_front::sema::SymbolId;

use super::block::BlockId;

define_entity!(StmtId);

/// The I/O runtime entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IoCall {
    Backspace,
    Close,
    Endfile,
    Flush,
    Inquire,
    Open,
    Print,
    Read,
    Rewind,
    Wait,
    Write,
}

/// The non-I/O runtime entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeCall {
    FailImage,
    Stop,
    Pause,
    FormTeam,
    EventPost,
    EventWait,
    SyncAll,
    SyncImages,
    SyncMemory,
    SyncTeam,
    Lock,
    Unlock,
}

/// What a `Store` writes: an ordinary value or a block address
/// (the lowering of `ASSIGN label TO var`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreValue {
    Value(StmtId),
    BlockAddr(BlockId),
}

/// One alternative of a `SwitchCase` arm.
///
/// Values reference the `ApplyExpr` statements that evaluate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseValue {
    Exactly(StmtId),
    InclusiveRange { lower: StmtId, upper: StmtId },
    InclusiveAbove { lower: StmtId },
    InclusiveBelow { upper: StmtId },
}

/// One `SwitchRank` arm guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankValue {
    Exactly(StmtId),
    AssumedSize,
}

/// One `SwitchType` arm guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeValue {
    Intrinsic(String),
    Derived(String),
}

/// An IR statement. The closed set: twelve non-terminators, eight
/// terminators. A block is closed once its last statement is a terminator.
///
/// Plain `Switch` values are `i64` codes: computed-GOTO and alternate-return
/// arms count from 1 in source order; arithmetic-IF uses -1/+1 with the zero
/// branch as the default; I/O escapes use ERR=1, EOR=2, END=3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    // -- Non-terminators --
    Allocate {
        object: Expression,
    },
    Deallocate {
        object: Expression,
    },
    /// Evaluate an expression.
    ApplyExpr {
        expr: Expression,
    },
    /// Take the address of a designator.
    LocateExpr {
        expr: Expression,
    },
    Load {
        addr: StmtId,
    },
    Store {
        addr: StmtId,
        value: StoreValue,
    },
    /// Nullify a pointer.
    Disassociate {
        addr: StmtId,
    },
    Increment {
        value: StmtId,
        step: StmtId,
    },
    /// Direction-aware loop latch test:
    /// `(step > 0 && value <= upper) || (step < 0 && value >= upper)`.
    DoCondition {
        step: StmtId,
        value: StmtId,
        upper: StmtId,
    },
    /// Non-alternate-return call.
    Call {
        callee: Expression,
        args: Vec<Expression>,
    },
    IoCall {
        call: IoCall,
        args: Vec<Expression>,
    },
    RuntimeCall {
        call: RuntimeCall,
        args: Vec<Expression>,
    },

    // -- Terminators --
    /// Unconditional (`cond: None`) or two-way conditional branch.
    /// `false_target` is present iff `cond` is.
    Branch {
        cond: Option<StmtId>,
        true_target: BlockId,
        false_target: Option<BlockId>,
    },
    Switch {
        selector: Option<StmtId>,
        default: BlockId,
        targets: Vec<(i64, BlockId)>,
    },
    SwitchCase {
        selector: Option<StmtId>,
        default: BlockId,
        targets: Vec<(Vec<CaseValue>, BlockId)>,
    },
    SwitchRank {
        selector: Option<StmtId>,
        default: BlockId,
        targets: Vec<(RankValue, BlockId)>,
    },
    SwitchType {
        selector: Option<StmtId>,
        default: BlockId,
        targets: Vec<(TypeValue, BlockId)>,
    },
    IndirectBranch {
        variable: SymbolId,
        targets: Vec<BlockId>,
    },
    Return {
        value: StmtId,
    },
    Unreachable,
}

impl Stmt {
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Stmt::Branch { .. }
                | Stmt::Switch { .. }
                | Stmt::SwitchCase { .. }
                | Stmt::SwitchRank { .. }
                | Stmt::SwitchType { .. }
                | Stmt::IndirectBranch { .. }
                | Stmt::Return { .. }
                | Stmt::Unreachable
        )
    }

    /// Successor blocks of a terminator, in target order (default last for
    /// switches). Empty for non-terminators, returns, and unreachable.
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Stmt::Branch {
                true_target,
                false_target,
                ..
            } => {
                let mut succs = vec![*true_target];
                if let Some(f) = false_target {
                    succs.push(*f);
                }
                succs
            }
            Stmt::Switch {
                default, targets, ..
            } => switch_successors(targets.iter().map(|(_, b)| *b), *default),
            Stmt::SwitchCase {
                default, targets, ..
            } => switch_successors(targets.iter().map(|(_, b)| *b), *default),
            Stmt::SwitchRank {
                default, targets, ..
            } => switch_successors(targets.iter().map(|(_, b)| *b), *default),
            Stmt::SwitchType {
                default, targets, ..
            } => switch_successors(targets.iter().map(|(_, b)| *b), *default),
            Stmt::IndirectBranch { targets, .. } => targets.clone(),
            _ => Vec::new(),
        }
    }
}

fn switch_successors(targets: impl Iterator<Item = BlockId>, default: BlockId) -> Vec<BlockId> {
    let mut succs: Vec<BlockId> = targets.collect();
    succs.push(default);
    succs
}

#[cfg(test)]
mod tests {
    use super::*;
    use taiga_front::entity::EntityRef;

    #[test]
    fn terminator_classification() {
        let ret = Stmt::Return {
            value: StmtId::new(0),
        };
        assert!(ret.is_terminator());
        assert!(ret.successors().is_empty());

        let load = Stmt::Load {
            addr: StmtId::new(0),
        };
        assert!(!load.is_terminator());
    }

    #[test]
    fn branch_successors_in_order() {
        let t = BlockId::new(1);
        let f = BlockId::new(2);
        let cbr = Stmt::Branch {
            cond: Some(StmtId::new(0)),
            true_target: t,
            false_target: Some(f),
        };
        assert_eq!(cbr.successors(), vec![t, f]);

        let br = Stmt::Branch {
            cond: None,
            true_target: t,
            false_target: None,
        };
        assert_eq!(br.successors(), vec![t]);
    }

    #[test]
    fn switch_default_is_last_successor() {
        let sw = Stmt::Switch {
            selector: None,
            default: BlockId::new(9),
            targets: vec![(1, BlockId::new(3)), (2, BlockId::new(4))],
        };
        assert_eq!(
            sw.successors(),
            vec![BlockId::new(3), BlockId::new(4), BlockId::new(9)]
        );
    }
}
