//! Per-procedure analysis state for the linearizer.

use std::collections::{BTreeSet, HashMap};

use taiga_front::ast::Label;
use taiga_front::sema::SymbolId;

use crate::semantics_bug;

/// A symbolic linear label, resolved to a basic block during block building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LLabel(u32);

impl LLabel {
    /// Sentinel for "no label here" (the cycle slot of non-loop constructs).
    pub const UNSPECIFIED: LLabel = LLabel(u32::MAX);

    pub fn index(self) -> u32 {
        self.0
    }

    pub fn is_unspecified(self) -> bool {
        self == Self::UNSPECIFIED
    }
}

/// Allocates linear labels and tracks which are branch targets.
#[derive(Debug, Default)]
pub struct LabelRegistry {
    referenced: Vec<bool>,
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> LLabel {
        let label = LLabel(self.referenced.len() as u32);
        self.referenced.push(false);
        label
    }

    pub fn set_referenced(&mut self, label: LLabel) {
        self.referenced[label.0 as usize] = true;
    }

    pub fn is_referenced(&self, label: LLabel) -> bool {
        self.referenced[label.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.referenced.len()
    }

    pub fn is_empty(&self) -> bool {
        self.referenced.is_empty()
    }
}

/// One construct on the name stack: `(name, exit label, cycle label)`.
///
/// The cycle slot is [`LLabel::UNSPECIFIED`] for anything that is not a DO,
/// so `EXIT name` works on any named construct while `CYCLE` only matches
/// loops.
#[derive(Debug, Clone)]
pub struct ConstructEntry {
    pub name: Option<String>,
    pub exit: LLabel,
    pub cycle: LLabel,
}

/// Mutable per-procedure state: the source-label map, the construct name
/// stack, and the `ASSIGN` target sets. Created fresh for each procedure and
/// discarded before the next.
#[derive(Debug, Default)]
pub struct AnalysisState {
    labels: LabelRegistry,
    label_map: HashMap<Label, LLabel>,
    name_stack: Vec<ConstructEntry>,
    assign_map: HashMap<SymbolId, BTreeSet<Label>>,
}

impl AnalysisState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh_label(&mut self) -> LLabel {
        self.labels.fresh()
    }

    /// Mark `label` as a branch target and hand it back.
    pub fn reference(&mut self, label: LLabel) -> LLabel {
        self.labels.set_referenced(label);
        label
    }

    pub fn is_referenced(&self, label: LLabel) -> bool {
        self.labels.is_referenced(label)
    }

    /// Linear label for a source label used as a branch target.
    ///
    /// Creates on miss and marks referenced: the miss means the branch came
    /// before the definition, i.e. a forward reference.
    pub fn fetch_source_label(&mut self, label: Label) -> LLabel {
        if let Some(&l) = self.label_map.get(&label) {
            return l;
        }
        let l = self.labels.fresh();
        self.labels.set_referenced(l);
        self.label_map.insert(label, l);
        l
    }

    /// Linear label for a source label at its definition site.
    /// Creates on miss without marking referenced.
    pub fn define_source_label(&mut self, label: Label) -> LLabel {
        if let Some(&l) = self.label_map.get(&label) {
            return l;
        }
        let l = self.labels.fresh();
        self.label_map.insert(label, l);
        l
    }

    pub fn push_construct(&mut self, name: Option<String>, exit: LLabel, cycle: LLabel) {
        self.name_stack.push(ConstructEntry { name, exit, cycle });
    }

    pub fn pop_construct(&mut self) {
        if self.name_stack.pop().is_none() {
            semantics_bug!("construct stack underflow");
        }
    }

    pub fn stack_is_empty(&self) -> bool {
        self.name_stack.is_empty()
    }

    /// Innermost enclosing DO: the first stack entry with a real cycle label.
    pub fn nearest_enclosing_do(&self) -> &ConstructEntry {
        for entry in self.name_stack.iter().rev() {
            if !entry.cycle.is_unspecified() {
                return entry;
            }
        }
        semantics_bug!("CYCLE or EXIT not inside a DO construct");
    }

    /// Innermost construct with the given name.
    pub fn find_on_stack(&self, name: &str) -> &ConstructEntry {
        for entry in self.name_stack.iter().rev() {
            if entry.name.as_deref() == Some(name) {
                return entry;
            }
        }
        semantics_bug!("construct name '{name}' not on stack");
    }

    /// Record `ASSIGN label TO symbol`.
    pub fn add_assign(&mut self, symbol: SymbolId, label: Label) {
        self.assign_map.entry(symbol).or_default().insert(label);
    }

    /// All labels ever assigned to `symbol`, as linear labels, in ascending
    /// source-label order.
    pub fn assigned_labels(&mut self, symbol: SymbolId) -> Vec<LLabel> {
        let labels: Vec<Label> = self
            .assign_map
            .get(&symbol)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        labels
            .into_iter()
            .map(|l| self.fetch_source_label(l))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taiga_front::entity::EntityRef;

    #[test]
    fn fetch_marks_forward_references() {
        let mut state = AnalysisState::new();
        let fwd = state.fetch_source_label(100);
        assert!(state.is_referenced(fwd));

        let def = state.define_source_label(200);
        assert!(!state.is_referenced(def));
        // A later fetch of a defined label resolves to the same LLabel and
        // stays unreferenced: only forward references set the bit.
        assert_eq!(state.fetch_source_label(200), def);
        assert!(!state.is_referenced(def));
    }

    #[test]
    fn name_stack_search() {
        let mut state = AnalysisState::new();
        let outer_exit = state.fresh_label();
        let outer_cycle = state.fresh_label();
        let inner_exit = state.fresh_label();
        state.push_construct(Some("outer".into()), outer_exit, outer_cycle);
        state.push_construct(Some("blk".into()), inner_exit, LLabel::UNSPECIFIED);

        assert_eq!(state.find_on_stack("blk").exit, inner_exit);
        assert_eq!(state.find_on_stack("outer").cycle, outer_cycle);
        // Nearest DO skips the non-loop entry.
        assert_eq!(state.nearest_enclosing_do().cycle, outer_cycle);

        state.pop_construct();
        state.pop_construct();
        assert!(state.stack_is_empty());
    }

    #[test]
    #[should_panic(expected = "not inside a DO construct")]
    fn cycle_outside_loop_is_a_bug() {
        let mut state = AnalysisState::new();
        let exit = state.fresh_label();
        state.push_construct(Some("blk".into()), exit, LLabel::UNSPECIFIED);
        state.nearest_enclosing_do();
    }

    #[test]
    fn assign_map_is_a_set_per_symbol() {
        let mut state = AnalysisState::new();
        let sym = SymbolId::new(0);
        state.add_assign(sym, 300);
        state.add_assign(sym, 100);
        state.add_assign(sym, 300);

        let labels = state.assigned_labels(sym);
        assert_eq!(labels.len(), 2);
        // Ascending source-label order: 100 before 300.
        assert_eq!(labels[0], state.fetch_source_label(100));
        assert_eq!(labels[1], state.fetch_source_label(300));
    }
}
