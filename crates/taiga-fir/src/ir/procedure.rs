use serde::{Deserialize, Serialize};

use taiga_front::define_entity;
use taiga_front::entity::PrimaryMap;
use taiga_front::sema::ScopeId;

use super::block::{BasicBlock, BlockId};
use super::region::{Region, RegionId};
use super::stmt::{Stmt, StmtId};

define_entity!(ProcId);

/// A procedure: the arenas for its region tree, blocks, and statements.
///
/// Regions, blocks, and statements live for as long as the procedure;
/// cross-references are typed indices, never owning pointers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Procedure {
    pub name: String,
    pub regions: PrimaryMap<RegionId, Region>,
    pub blocks: PrimaryMap<BlockId, BasicBlock>,
    pub stmts: PrimaryMap<StmtId, Stmt>,
    /// Always the first region; scoped to the whole procedure.
    pub root_region: RegionId,
}

impl Procedure {
    pub fn new(name: impl Into<String>, scope: ScopeId) -> Self {
        let mut regions = PrimaryMap::new();
        let root_region = regions.push(Region::new(None, scope));
        Self {
            name: name.into(),
            regions,
            blocks: PrimaryMap::new(),
            stmts: PrimaryMap::new(),
            root_region,
        }
    }

    pub fn create_region(&mut self, parent: RegionId, scope: ScopeId) -> RegionId {
        self.regions.push(Region::new(Some(parent), scope))
    }

    /// Allocate a new empty block in `region`.
    pub fn create_block(&mut self, region: RegionId) -> BlockId {
        let block = self.blocks.push(BasicBlock::new(region));
        self.regions[region].blocks.push(block);
        block
    }

    /// The block's terminator, if the block is closed.
    pub fn terminator(&self, block: BlockId) -> Option<&Stmt> {
        let last = *self.blocks[block].stmts.last()?;
        let stmt = &self.stmts[last];
        stmt.is_terminator().then_some(stmt)
    }

    /// True when `ancestor` is `region` or appears on its parent chain.
    pub fn is_region_ancestor(&self, ancestor: RegionId, region: RegionId) -> bool {
        let mut cur = Some(region);
        while let Some(r) = cur {
            if r == ancestor {
                return true;
            }
            cur = self.regions[r].parent;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taiga_front::entity::EntityRef;

    fn scope() -> ScopeId {
        ScopeId::new(0)
    }

    #[test]
    fn new_procedure_has_root_region() {
        let proc = Procedure::new("sub", scope());
        assert_eq!(proc.regions.len(), 1);
        assert!(proc.regions[proc.root_region].parent.is_none());
    }

    #[test]
    fn created_blocks_join_their_region() {
        let mut proc = Procedure::new("sub", scope());
        let root = proc.root_region;
        let b0 = proc.create_block(root);
        let child = proc.create_region(root, scope());
        let b1 = proc.create_block(child);

        assert_eq!(proc.regions[root].blocks, vec![b0]);
        assert_eq!(proc.regions[child].blocks, vec![b1]);
        assert_eq!(proc.blocks[b1].region, child);
    }

    #[test]
    fn region_ancestry() {
        let mut proc = Procedure::new("sub", scope());
        let root = proc.root_region;
        let child = proc.create_region(root, scope());
        let grandchild = proc.create_region(child, scope());

        assert!(proc.is_region_ancestor(root, grandchild));
        assert!(proc.is_region_ancestor(child, grandchild));
        assert!(proc.is_region_ancestor(grandchild, grandchild));
        assert!(!proc.is_region_ancestor(grandchild, root));
    }

    #[test]
    fn terminator_requires_closing_statement() {
        let mut proc = Procedure::new("sub", scope());
        let b = proc.create_block(proc.root_region);
        assert!(proc.terminator(b).is_none());

        let e = proc.stmts.push(Stmt::ApplyExpr {
            expr: taiga_front::expr::Expression::integer(0),
        });
        proc.blocks[b].stmts.push(e);
        assert!(proc.terminator(b).is_none());

        let r = proc.stmts.push(Stmt::Return { value: e });
        proc.blocks[b].stmts.push(r);
        assert!(matches!(proc.terminator(b), Some(Stmt::Return { .. })));
    }
}
