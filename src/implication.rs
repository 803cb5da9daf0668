use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::database::Database;
use crate::kernel::assertion::Assertion;
use crate::kernel::atom::Atom;
use crate::kernel::parse_node::ParseNode;
use crate::kernel::variable_map::VariableMap;
use crate::worksheet::{StepId, WorksheetInfo};

/// Knows which symbols are implications and how to detach their consequents.
pub trait ImplicationRules: Send + Sync {
    fn is_impl_operator(&self, symbol: Atom) -> bool;

    /// Applies an assertion whose conclusion is "antecedent -> consequent" to a step proving an
    /// instance of the antecedent. Returns the step proving the matching instance of the
    /// consequent pattern.
    fn apply_implication_rule(
        &self,
        worksheet: &mut dyn WorksheetInfo,
        antecedent: StepId,
        consequent: &ParseNode,
        assertion: &Arc<Assertion>,
    ) -> StepId;
}

/// Implication operators recognized by their modus ponens rule: ph & ( ph -> ps ) => ps
#[derive(Clone, Default)]
pub struct ImplicationInfo {
    modus_ponens: HashMap<Atom, Arc<Assertion>>,
}

impl ImplicationInfo {
    pub fn new(db: &Database) -> ImplicationInfo {
        let mut info = ImplicationInfo::default();
        for assertion in db.assertions() {
            if let Some(op) = modus_ponens_operator(assertion) {
                trace!(assertion = %assertion, op = db.name(op), "modus ponens rule");
                info.modus_ponens.entry(op).or_insert_with(|| assertion.clone());
            }
        }
        debug!(operators = info.modus_ponens.len(), "implication operators");
        info
    }

    pub fn modus_ponens(&self, op: Atom) -> Option<&Arc<Assertion>> {
        self.modus_ponens.get(&op)
    }

    pub fn operators(&self) -> impl Iterator<Item = Atom> + '_ {
        self.modus_ponens.keys().copied()
    }
}

/// Returns the operator if the assertion has the shape ph & op(ph, ps) => ps.
fn modus_ponens_operator(assertion: &Assertion) -> Option<Atom> {
    let [minor, major] = assertion.hyps.as_slice() else {
        return None;
    };
    let ph = minor.tree.get_atom().as_variable()?;
    let ps = assertion.conclusion.get_atom().as_variable()?;
    if ph == ps || !minor.tree.is_leaf() || !assertion.conclusion.is_leaf() {
        return None;
    }
    let major = &major.tree;
    if major.num_children() != 2 || !major.get_atom().is_syntax() {
        return None;
    }
    if major.child(0).get_atom() != Atom::Variable(ph)
        || major.child(1).get_atom() != Atom::Variable(ps)
        || !major.child(0).is_leaf()
        || !major.child(1).is_leaf()
    {
        return None;
    }
    Some(major.get_atom())
}

impl ImplicationRules for ImplicationInfo {
    fn is_impl_operator(&self, symbol: Atom) -> bool {
        self.modus_ponens.contains_key(&symbol)
    }

    fn apply_implication_rule(
        &self,
        worksheet: &mut dyn WorksheetInfo,
        antecedent: StepId,
        consequent: &ParseNode,
        assertion: &Arc<Assertion>,
    ) -> StepId {
        let root = &assertion.conclusion;
        let op = root.get_atom();
        let mp = match self.modus_ponens.get(&op) {
            Some(mp) if root.num_children() == 2 && assertion.hyps.is_empty() => mp.clone(),
            _ => panic!("{} is not an implication without hypotheses", assertion),
        };

        let antecedent_formula = worksheet.formula(antecedent).clone();
        let mut map = VariableMap::new();
        if !map.match_nodes(root.child(0), &antecedent_formula) {
            panic!(
                "step {} does not match the antecedent of {}",
                antecedent, assertion
            );
        }
        for v in consequent.variables() {
            if !map.has_mapping(v) {
                panic!(
                    "variable x{} of the consequent of {} is not fixed by its antecedent",
                    v, assertion
                );
            }
        }
        let result = map.specialize(consequent);

        let instance = ParseNode::binary(op, antecedent_formula, result.clone());
        let instance_step = worksheet.get_or_create_proof_step(instance, vec![], assertion);
        worksheet.get_or_create_proof_step(result, vec![antecedent, instance_step], &mp)
    }
}
