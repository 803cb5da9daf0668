use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::TransformConfig;
use crate::database::Database;
use crate::kernel::assertion::Assertion;
use crate::kernel::atom::{Atom, AtomId};
use crate::kernel::parse_node::ParseNode;
use crate::kernel::symbol_table::SymbolTable;
use crate::kernel::types::TypeCode;
use crate::mining::{MiningOutcome, SkipReason};
use crate::worksheet::{StepId, WorksheetInfo};

/// The operator and operands if the node is op(x, y) for distinct variables x and y.
fn binary_variables(node: &ParseNode) -> Option<(Atom, AtomId, AtomId)> {
    if !node.get_atom().is_syntax() || node.num_children() != 2 || node.max_depth() != 2 {
        return None;
    }
    let left = node.child(0).get_atom().as_variable()?;
    let right = node.child(1).get_atom().as_variable()?;
    if left == right {
        return None;
    }
    Some((node.get_atom(), left, right))
}

/// Checks for the shape A = B => B = A.
/// Returns the relation.
pub fn find_commutative_rule(assertion: &Assertion) -> MiningOutcome<Atom> {
    let [hyp] = assertion.hyps.as_slice() else {
        return SkipReason::NotEquivalenceShape.into();
    };
    if assertion.mand_vars.len() != 2 {
        return SkipReason::NotEquivalenceShape.into();
    }
    let (Some((op, a, b)), Some((conclusion_op, b2, a2))) = (
        binary_variables(&hyp.tree),
        binary_variables(&assertion.conclusion),
    ) else {
        return SkipReason::NotEquivalenceShape.into();
    };
    if op != conclusion_op || a != a2 || b != b2 {
        return SkipReason::NotEquivalenceShape.into();
    }
    MiningOutcome::Recognized(op)
}

/// Checks for the shape A = B & B = C => A = C.
/// Returns the relation.
pub fn find_transitive_rule(assertion: &Assertion) -> MiningOutcome<Atom> {
    let [first, second] = assertion.hyps.as_slice() else {
        return SkipReason::NotEquivalenceShape.into();
    };
    if assertion.mand_vars.len() != 3 {
        return SkipReason::NotEquivalenceShape.into();
    }
    let (Some((op1, a, b)), Some((op2, b2, c)), Some((op, a2, c2))) = (
        binary_variables(&first.tree),
        binary_variables(&second.tree),
        binary_variables(&assertion.conclusion),
    ) else {
        return SkipReason::NotEquivalenceShape.into();
    };
    if op1 != op || op2 != op || a != a2 || b != b2 || c != c2 {
        return SkipReason::NotEquivalenceShape.into();
    }
    MiningOutcome::Recognized(op)
}

/// The relations that behave like equality: each has a commutative lemma and a transitive lemma.
/// Every type maps to at most one relation, the first one found for it. Relations that lose
/// their type to an earlier one are still equivalences, and are still listed in relations.
#[derive(Clone, Default)]
pub struct EquivalenceRules {
    commutative: HashMap<Atom, Arc<Assertion>>,
    transitive: HashMap<Atom, Arc<Assertion>>,
    eq_by_type: HashMap<TypeCode, Atom>,

    /// The surviving relations, in the order their commutative lemmas appear.
    relations: Vec<Atom>,
}

impl EquivalenceRules {
    pub fn new(db: &Database, config: &TransformConfig) -> EquivalenceRules {
        let mut rules = EquivalenceRules::default();
        if !config.equivalence {
            return rules;
        }

        let mut order = vec![];
        for assertion in db.assertions() {
            if let Some(op) = find_commutative_rule(assertion).recognized() {
                trace!(assertion = %assertion, op = db.name(op), "commutative lemma");
                if !rules.commutative.contains_key(&op) {
                    rules.commutative.insert(op, assertion.clone());
                    order.push(op);
                }
            }
        }
        for assertion in db.assertions() {
            if let Some(op) = find_transitive_rule(assertion).recognized() {
                trace!(assertion = %assertion, op = db.name(op), "transitive lemma");
                rules
                    .transitive
                    .entry(op)
                    .or_insert_with(|| assertion.clone());
            }
        }

        rules.filter_to_fixed_point();

        for op in order {
            let Some(comm) = rules.commutative.get(&op) else {
                continue;
            };
            rules.relations.push(op);
            let left = comm.conclusion.child(0).get_atom();
            let Some(type_code) = db.symbols.get_type(left) else {
                continue;
            };
            debug!(
                op = db.name(op),
                type_name = db.symbols.type_name(type_code),
                "equivalence relation"
            );
            rules.eq_by_type.entry(type_code).or_insert(op);
        }
        rules
    }

    /// Drops relations until the commutative and transitive maps have the same keys.
    fn filter_to_fixed_point(&mut self) {
        loop {
            let before = (self.commutative.len(), self.transitive.len());
            let commutative = &self.commutative;
            self.transitive.retain(|op, _| commutative.contains_key(op));
            let transitive = &self.transitive;
            self.commutative.retain(|op, _| transitive.contains_key(op));
            if (self.commutative.len(), self.transitive.len()) == before {
                break;
            }
        }
    }

    pub fn is_equivalence(&self, symbol: Atom) -> bool {
        self.commutative.contains_key(&symbol)
    }

    /// The relation for terms of this type.
    pub fn eq_symbol(&self, type_code: TypeCode) -> Option<Atom> {
        self.eq_by_type.get(&type_code).copied()
    }

    pub fn commutative(&self, symbol: Atom) -> Option<&Arc<Assertion>> {
        self.commutative.get(&symbol)
    }

    pub fn transitive(&self, symbol: Atom) -> Option<&Arc<Assertion>> {
        self.transitive.get(&symbol)
    }

    pub fn relations(&self) -> &[Atom] {
        &self.relations
    }

    /// Builds left = right, for the relation of the operands' type.
    /// Panics if the operands have different types or their type has no relation.
    pub fn create_eq_node(
        &self,
        symbols: &SymbolTable,
        left: ParseNode,
        right: ParseNode,
    ) -> ParseNode {
        let left_type = symbols.node_type(&left);
        let right_type = symbols.node_type(&right);
        if left_type != right_type {
            panic!("cannot equate {} and {}: different types", left, right);
        }
        let Some(op) = left_type.and_then(|t| self.eq_symbol(t)) else {
            panic!("there is no equivalence relation for the type of {}", left);
        };
        ParseNode::binary(op, left, right)
    }

    /// From a step proving a = b, the step proving b = a.
    pub fn create_reverse(&self, worksheet: &mut dyn WorksheetInfo, source: StepId) -> StepId {
        let root = worksheet.formula(source).clone();
        let op = root.get_atom();
        let Some(comm) = self.commutative.get(&op) else {
            panic!("{} is not an equivalence", root);
        };
        let reversed = ParseNode::binary(op, root.child(1).clone(), root.child(0).clone());
        worksheet.get_or_create_proof_step(reversed, vec![source], comm)
    }

    /// From steps proving a = b and b = c, the step proving a = c.
    /// With no first step, the second step is returned, so a chain can be folded from None.
    pub fn get_transitive_step(
        &self,
        worksheet: &mut dyn WorksheetInfo,
        first: Option<StepId>,
        second: StepId,
    ) -> StepId {
        let Some(first) = first else {
            return second;
        };
        let first_root = worksheet.formula(first).clone();
        let second_root = worksheet.formula(second).clone();
        let op = first_root.get_atom();
        if second_root.get_atom() != op {
            panic!("{} and {} use different relations", first_root, second_root);
        }
        if first_root.child(1) != second_root.child(0) {
            panic!("{} and {} do not chain", first_root, second_root);
        }
        let Some(trans) = self.transitive.get(&op) else {
            panic!("{} is not an equivalence", first_root);
        };
        let node = ParseNode::binary(
            op,
            first_root.child(0).clone(),
            second_root.child(1).clone(),
        );
        worksheet.get_or_create_proof_step(node, vec![first, second], trans)
    }
}
