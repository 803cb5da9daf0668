use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::database::Database;
use crate::kernel::assertion::Assertion;
use crate::kernel::atom::{Atom, AtomId};
use crate::kernel::parse_node::ParseNode;
use crate::worksheet::{StepId, WorksheetInfo};

/// Knows which symbols are conjunctions, and how to build conjunction steps.
pub trait ConjunctionRules: Send + Sync {
    /// Splits a tree into its conjuncts, left to right.
    /// A tree that isn't a conjunction is a single conjunct.
    fn separate_by_and(&self, node: &ParseNode) -> Vec<ParseNode>;

    /// Combines steps into a single step shaped like the pattern.
    /// The pattern must have exactly one conjunct per step, in the same order.
    fn concatenate_in_the_same_pattern(
        &self,
        steps: &[StepId],
        pattern: &ParseNode,
        worksheet: &mut dyn WorksheetInfo,
    ) -> StepId;
}

/// The rules that make an operator behave like an n-ary conjunction.
#[derive(Clone, Debug)]
pub struct ConjunctionOperator {
    pub arity: usize,

    /// ph & ps => ( ph /\ ps )
    pub intro: Arc<Assertion>,

    /// elims[i] has the form ( ph_0 /\ ... /\ ph_n ) => ph_i
    pub elims: Vec<Arc<Assertion>>,
}

/// Conjunction operators, recognized by having an introduction rule and an elimination rule
/// for every position.
#[derive(Clone, Default)]
pub struct ConjunctionInfo {
    operators: HashMap<Atom, ConjunctionOperator>,
}

/// The distinct bare variables of the nodes, or None.
fn distinct_variables(nodes: &[ParseNode]) -> Option<Vec<AtomId>> {
    let mut vars = vec![];
    for node in nodes {
        let v = node.get_atom().as_variable()?;
        if !node.is_leaf() || vars.contains(&v) {
            return None;
        }
        vars.push(v);
    }
    Some(vars)
}

/// Returns the operator if the assertion has the shape ph_0 & ... & ph_n => op(ph_0, ..., ph_n).
fn intro_operator(assertion: &Assertion) -> Option<Atom> {
    if assertion.hyps.len() < 2 {
        return None;
    }
    let hyp_nodes: Vec<ParseNode> = assertion.hyps.iter().map(|h| h.tree.clone()).collect();
    let hyp_vars = distinct_variables(&hyp_nodes)?;
    let conclusion = &assertion.conclusion;
    if !conclusion.get_atom().is_syntax() {
        return None;
    }
    if distinct_variables(conclusion.children())? != hyp_vars {
        return None;
    }
    Some(conclusion.get_atom())
}

/// Returns the operator and position if the assertion has the shape op(ph_0, ..., ph_n) => ph_i.
fn elim_operator(assertion: &Assertion) -> Option<(Atom, usize)> {
    let [hyp] = assertion.hyps.as_slice() else {
        return None;
    };
    let tree = &hyp.tree;
    if !tree.get_atom().is_syntax() || tree.num_children() < 2 {
        return None;
    }
    let vars = distinct_variables(tree.children())?;
    if !assertion.conclusion.is_leaf() {
        return None;
    }
    let v = assertion.conclusion.get_atom().as_variable()?;
    let position = vars.iter().position(|&w| w == v)?;
    Some((tree.get_atom(), position))
}

impl ConjunctionInfo {
    pub fn new(db: &Database) -> ConjunctionInfo {
        let mut intros: HashMap<Atom, Arc<Assertion>> = HashMap::new();
        let mut elims: HashMap<(Atom, usize), Arc<Assertion>> = HashMap::new();
        for assertion in db.assertions() {
            if let Some(op) = intro_operator(assertion) {
                trace!(assertion = %assertion, op = db.name(op), "conjunction introduction");
                intros.entry(op).or_insert_with(|| assertion.clone());
            }
            if let Some((op, position)) = elim_operator(assertion) {
                trace!(
                    assertion = %assertion,
                    op = db.name(op),
                    position,
                    "conjunction elimination"
                );
                elims
                    .entry((op, position))
                    .or_insert_with(|| assertion.clone());
            }
        }

        let mut operators = HashMap::new();
        for (op, intro) in intros {
            let arity = intro.hyps.len();
            let op_elims: Option<Vec<Arc<Assertion>>> =
                (0..arity).map(|i| elims.get(&(op, i)).cloned()).collect();
            if let Some(op_elims) = op_elims {
                operators.insert(
                    op,
                    ConjunctionOperator {
                        arity,
                        intro,
                        elims: op_elims,
                    },
                );
            }
        }
        debug!(operators = operators.len(), "conjunction operators");
        ConjunctionInfo { operators }
    }

    pub fn is_conjunction(&self, symbol: Atom) -> bool {
        self.operators.contains_key(&symbol)
    }

    pub fn get_operator(&self, symbol: Atom) -> Option<&ConjunctionOperator> {
        self.operators.get(&symbol)
    }

    /// The operator if the node is a full application of a conjunction.
    fn conjunction_at(&self, node: &ParseNode) -> Option<&ConjunctionOperator> {
        self.operators
            .get(&node.get_atom())
            .filter(|op| op.arity == node.num_children())
    }

    fn separate_into(&self, node: &ParseNode, output: &mut Vec<ParseNode>) {
        if self.conjunction_at(node).is_some() {
            for child in node.children() {
                self.separate_into(child, output);
            }
        } else {
            output.push(node.clone());
        }
    }

    fn concatenate(
        &self,
        steps: &[StepId],
        next: &mut usize,
        pattern: &ParseNode,
        worksheet: &mut dyn WorksheetInfo,
    ) -> StepId {
        let Some(op) = self.conjunction_at(pattern) else {
            let Some(&step) = steps.get(*next) else {
                panic!("not enough steps for the conjunction pattern {}", pattern);
            };
            *next += 1;
            return step;
        };
        let intro = op.intro.clone();
        let mut child_steps = vec![];
        let mut child_formulas = vec![];
        for child in pattern.children() {
            let step = self.concatenate(steps, next, child, worksheet);
            child_formulas.push(worksheet.formula(step).clone());
            child_steps.push(step);
        }
        let formula = ParseNode::new(pattern.get_atom(), child_formulas);
        worksheet.get_or_create_proof_step(formula, child_steps, &intro)
    }
}

impl ConjunctionRules for ConjunctionInfo {
    fn separate_by_and(&self, node: &ParseNode) -> Vec<ParseNode> {
        let mut answer = vec![];
        self.separate_into(node, &mut answer);
        answer
    }

    fn concatenate_in_the_same_pattern(
        &self,
        steps: &[StepId],
        pattern: &ParseNode,
        worksheet: &mut dyn WorksheetInfo,
    ) -> StepId {
        let mut next = 0;
        let answer = self.concatenate(steps, &mut next, pattern, worksheet);
        if next != steps.len() {
            panic!(
                "conjunction pattern {} used {} of {} steps",
                pattern,
                next,
                steps.len()
            );
        }
        answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worksheet::ProofWorksheet;

    fn db() -> Database {
        let mut db = Database::new();
        db.add_variables(&["ph", "ps", "ch"], "wff").unwrap();
        db.add_syntax(&["and", "or", "and3", "imp"], "wff").unwrap();
        db.add_syntax(&["T", "F", "U"], "wff").unwrap();
        db.add_assertion("andi", &["ph", "ps"], "and(ph, ps)").unwrap();
        db.add_assertion("simpl", &["and(ph, ps)"], "ph").unwrap();
        db.add_assertion("simpr", &["and(ph, ps)"], "ps").unwrap();
        db.add_assertion("and3i", &["ph", "ps", "ch"], "and3(ph, ps, ch)")
            .unwrap();
        db.add_assertion("simp1", &["and3(ph, ps, ch)"], "ph").unwrap();
        db.add_assertion("simp2", &["and3(ph, ps, ch)"], "ps").unwrap();
        db.add_assertion("simp3", &["and3(ph, ps, ch)"], "ch").unwrap();
        // Disjunction has an elimination-like shape for neither position.
        db.add_assertion("orci", &["ph"], "or(ph, ps)").unwrap();
        // Implication has an introduction-like theorem but no eliminations.
        db.add_assertion("2imp", &["ph", "ps"], "imp(ph, ps)").unwrap();
        db
    }

    #[test]
    fn test_recognizes_conjunctions() {
        let db = db();
        let info = ConjunctionInfo::new(&db);
        let atom = |name| db.symbols.get_atom(name).unwrap();
        assert!(info.is_conjunction(atom("and")));
        assert!(info.is_conjunction(atom("and3")));
        assert!(!info.is_conjunction(atom("or")));
        assert!(!info.is_conjunction(atom("imp")));
        assert_eq!(info.get_operator(atom("and3")).unwrap().arity, 3);
        assert_eq!(info.get_operator(atom("and")).unwrap().elims[1].label, "simpr");
    }

    #[test]
    fn test_separate_by_and() {
        let db = db();
        let info = ConjunctionInfo::new(&db);
        let node = db.parse("and(and3(T, F, U), imp(T, F))").unwrap();
        let parts: Vec<String> = info
            .separate_by_and(&node)
            .iter()
            .map(|n| db.display(n))
            .collect();
        assert_eq!(parts, vec!["T", "F", "U", "imp(T, F)"]);
        assert_eq!(info.separate_by_and(&db.parse("T").unwrap()).len(), 1);
    }

    #[test]
    fn test_concatenate_in_the_same_pattern() {
        let db = db();
        let info = ConjunctionInfo::new(&db);
        let mut ws = ProofWorksheet::new();
        let t = ws.add_hypothesis(db.parse("T").unwrap());
        let f = ws.add_hypothesis(db.parse("F").unwrap());
        let u = ws.add_hypothesis(db.parse("U").unwrap());

        let pattern = db.parse("and(ph, and(ps, ch))").unwrap();
        let step = info.concatenate_in_the_same_pattern(&[t, f, u], &pattern, &mut ws);
        assert_eq!(ws.formula(step), &db.parse("and(T, and(F, U))").unwrap());
        assert_eq!(ws.len(), 5);

        // A single conjunct is just the step itself.
        let single = info.concatenate_in_the_same_pattern(&[t], &db.parse("ph").unwrap(), &mut ws);
        assert_eq!(single, t);
    }

    #[test]
    #[should_panic]
    fn test_concatenate_rejects_extra_steps() {
        let db = db();
        let info = ConjunctionInfo::new(&db);
        let mut ws = ProofWorksheet::new();
        let t = ws.add_hypothesis(db.parse("T").unwrap());
        info.concatenate_in_the_same_pattern(&[t, t, t], &db.parse("and(ph, ps)").unwrap(), &mut ws);
    }
}
