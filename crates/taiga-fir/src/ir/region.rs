use serde::{Deserialize, Serialize};

use taiga_front::define_entity;
use taiga_front::sema::ScopeId;

use super::block::BlockId;

define_entity!(RegionId);

/// A nested scope container inside a procedure.
///
/// Regions mirror the Fortran constructs that introduce lexical scopes
/// (BLOCK, DO, ASSOCIATE, CHANGE TEAM, SELECT RANK, SELECT TYPE). The root
/// region has no parent and is scoped to the whole procedure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub parent: Option<RegionId>,
    /// Lexical scope supplied by semantic analysis.
    pub scope: ScopeId,
    /// Blocks in creation order.
    pub blocks: Vec<BlockId>,
}

impl Region {
    pub fn new(parent: Option<RegionId>, scope: ScopeId) -> Self {
        Self {
            parent,
            scope,
            blocks: Vec::new(),
        }
    }
}
