use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use taiga_front::entity::PrimaryMap;

use crate::error::LowerError;

use super::procedure::{ProcId, Procedure};

/// The whole lowered program: procedures in insertion order, keyed uniquely
/// by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub name: String,
    pub procedures: PrimaryMap<ProcId, Procedure>,
    by_name: HashMap<String, ProcId>,
}

impl Program {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            procedures: PrimaryMap::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn contains_procedure(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn insert_procedure(&mut self, proc: Procedure) -> Result<ProcId, LowerError> {
        if self.by_name.contains_key(&proc.name) {
            return Err(LowerError::DuplicateProcedure {
                name: proc.name.clone(),
            });
        }
        let name = proc.name.clone();
        let id = self.procedures.push(proc);
        self.by_name.insert(name, id);
        Ok(id)
    }

    pub fn procedure_by_name(&self, name: &str) -> Option<&Procedure> {
        self.by_name.get(name).map(|&id| &self.procedures[id])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taiga_front::entity::EntityRef;
    use taiga_front::sema::ScopeId;

    #[test]
    fn duplicate_names_are_rejected() {
        let mut prog = Program::new("test");
        prog.insert_procedure(Procedure::new("main", ScopeId::new(0)))
            .unwrap();
        let err = prog
            .insert_procedure(Procedure::new("main", ScopeId::new(0)))
            .unwrap_err();
        assert!(matches!(
            err,
            LowerError::DuplicateProcedure { name } if name == "main"
        ));
    }

    #[test]
    fn lookup_by_name() {
        let mut prog = Program::new("test");
        prog.insert_procedure(Procedure::new("f", ScopeId::new(0)))
            .unwrap();
        assert!(prog.contains_procedure("f"));
        assert_eq!(prog.procedure_by_name("f").unwrap().name, "f");
        assert!(prog.procedure_by_name("g").is_none());
    }
}
