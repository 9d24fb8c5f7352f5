use serde::{Deserialize, Serialize};

use taiga_front::define_entity;

use super::region::RegionId;
use super::stmt::StmtId;

define_entity!(BlockId);

/// A basic block: an ordered statement list inside one region.
///
/// Well-formed once closed: the last statement is the only terminator.
/// `preds` is the deduplicated set of blocks whose terminators target this
/// one, maintained by the builder at terminator insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicBlock {
    pub region: RegionId,
    pub stmts: Vec<StmtId>,
    pub preds: Vec<BlockId>,
}

impl BasicBlock {
    pub fn new(region: RegionId) -> Self {
        Self {
            region,
            stmts: Vec::new(),
            preds: Vec::new(),
        }
    }

    pub fn add_pred(&mut self, block: BlockId) {
        if !self.preds.contains(&block) {
            self.preds.push(block);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taiga_front::entity::EntityRef;

    #[test]
    fn add_pred_deduplicates() {
        let mut block = BasicBlock::new(RegionId::new(0));
        let p = BlockId::new(3);
        block.add_pred(p);
        block.add_pred(p);
        block.add_pred(BlockId::new(4));
        assert_eq!(block.preds, vec![p, BlockId::new(4)]);
    }
}
