pub mod block;
pub mod builder;
pub mod printer;
pub mod procedure;
pub mod program;
pub mod region;
pub mod stmt;
pub mod verify;

pub use block::{BasicBlock, BlockId};
pub use builder::FirBuilder;
pub use printer::{print_procedure, print_program};
pub use procedure::{ProcId, Procedure};
pub use program::Program;
pub use region::{Region, RegionId};
pub use stmt::{
    CaseValue, IoCall, RankValue, RuntimeCall, Stmt, StmtId, StoreValue, TypeValue,
};
pub use verify::{verify_procedure, verify_program};
