use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::TransformConfig;
use crate::conjunction::ConjunctionRules;
use crate::database::Database;
use crate::generalized_stmt::{ClosureKey, ConstSubst, GeneralizedStmt};
use crate::implication::ImplicationRules;
use crate::kernel::assertion::Assertion;
use crate::kernel::atom::{Atom, AtomId};
use crate::kernel::parse_node::ParseNode;
use crate::mining::{MiningOutcome, SkipReason};
use crate::template::{MatchOutcome, PropertyTemplate};
use crate::worksheet::{StepId, WorksheetInfo};

/// Implication closure rules are recognized only at exactly this conclusion depth:
/// |- ( ( A e. CC /\ B e. CC ) -> ( A + B ) e. CC )
const IMPL_CLOSURE_DEPTH: usize = 4;

/// The two shapes a closure rule can be stated in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClosureKind {
    /// One hypothesis per argument: A e. CC & B e. CC => ( A + B ) e. CC
    Pure,

    /// A single implication from a conjunction:
    /// |- ( ( A e. CC /\ B e. CC ) -> ( A + B ) e. CC )
    Implication,
}

impl fmt::Display for ClosureKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClosureKind::Pure => write!(f, "pure"),
            ClosureKind::Implication => write!(f, "implication"),
        }
    }
}

/// A recognized closure rule: the catalog key plus the assertion that proves it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClosureRule {
    pub kind: ClosureKind,
    pub key: ClosureKey,
    pub assertion: Arc<Assertion>,
}

/// Maps (symbol, constant substitution, template) to the assertion proving closure.
/// The first assertion registered under a key keeps it.
#[derive(Clone, Default)]
struct ClosureCatalog {
    rules: HashMap<ClosureKey, Arc<Assertion>>,

    /// The keys for each function symbol, in registration order.
    by_symbol: HashMap<Atom, Vec<ClosureKey>>,
}

impl ClosureCatalog {
    /// Returns false, changing nothing, if the key is already taken.
    fn insert(&mut self, key: ClosureKey, assertion: Arc<Assertion>) -> bool {
        if self.rules.contains_key(&key) {
            return false;
        }
        self.by_symbol
            .entry(key.symbol)
            .or_default()
            .push(key.clone());
        self.rules.insert(key, assertion);
        true
    }

    fn get(&self, key: &ClosureKey) -> Option<&Arc<Assertion>> {
        self.rules.get(key)
    }

    fn keys_for(&self, symbol: Atom) -> &[ClosureKey] {
        self.by_symbol
            .get(&symbol)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    fn len(&self) -> usize {
        self.rules.len()
    }
}

/// Checks that every hypothesis after the first has the template's property, applied to
/// exactly its own variable.
fn check_hypotheses(
    template: &PropertyTemplate,
    hyps: &[&ParseNode],
    hyp_vars: &[AtomId],
) -> Result<(), SkipReason> {
    for i in 1..hyps.len() {
        match template.match_node(hyps[i]) {
            MatchOutcome::Matched(node) if node.get_atom() == Atom::Variable(hyp_vars[i]) => {}
            _ => return Err(SkipReason::InconsistentHypothesis(i)),
        }
    }
    Ok(())
}

/// Matches the template against the conclusion of a closure rule.
/// The captured node must be a function application where argument k is either the variable
/// of hypothesis k, or a constant.
/// Returns the function symbol and the constant substitution.
fn match_closure_conclusion(
    template: &PropertyTemplate,
    target: &ParseNode,
    hyp_vars: &[AtomId],
) -> Result<(Atom, ConstSubst), SkipReason> {
    let MatchOutcome::Matched(captured) = template.match_node(target) else {
        return Err(SkipReason::ConclusionMismatch);
    };
    if !captured.get_atom().is_syntax() || captured.is_leaf() {
        return Err(SkipReason::ConclusionMismatch);
    }

    // var_to_hyp[k] is the hypothesis for the k-th variable argument.
    let mut var_to_hyp: Vec<usize> = vec![];
    let mut used = vec![false; hyp_vars.len()];
    let mut slots = vec![];
    for (i, child) in captured.children().iter().enumerate() {
        if let Some(v) = child.get_atom().as_variable() {
            if var_to_hyp.len() >= hyp_vars.len() {
                return Err(SkipReason::UnmatchedVariable(i));
            }
            let Some(hyp) = hyp_vars.iter().position(|&w| w == v) else {
                return Err(SkipReason::UnmatchedVariable(i));
            };
            if used[hyp] {
                return Err(SkipReason::UnmatchedVariable(i));
            }
            used[hyp] = true;
            var_to_hyp.push(hyp);
            slots.push(None);
        } else if child.is_constant() {
            slots.push(Some(child.clone()));
        } else {
            return Err(SkipReason::NestedVariable(i));
        }
    }

    if var_to_hyp.len() != hyp_vars.len() {
        return Err(SkipReason::UnusedHypothesis);
    }
    // Permuted arguments could be supported, but real databases state closure in order.
    if var_to_hyp.iter().enumerate().any(|(k, &hyp)| k != hyp) {
        return Err(SkipReason::IncorrectOrder);
    }
    Ok((captured.get_atom(), ConstSubst::new(slots)))
}

/// Checks for the shape A e. CC & B e. CC => ( A + B ) e. CC
///
/// The hypotheses must all have the form P(x), for the same property P and distinct variables,
/// and the conclusion must have the form P(f(x, y, a, z, b)) where the arguments are the
/// hypothesis variables in order, interleaved with constants.
pub fn find_closure_rule(assertion: &Arc<Assertion>) -> MiningOutcome<ClosureRule> {
    if assertion.hyps.is_empty() {
        return SkipReason::NoHypotheses.into();
    }
    if assertion.hyps.len() != assertion.mand_vars.len() {
        return SkipReason::HypothesisCount {
            hyps: assertion.hyps.len(),
            vars: assertion.mand_vars.len(),
        }
        .into();
    }
    let Some(hyp_vars) = assertion.hyp_to_var_map() else {
        return SkipReason::HypothesisVariables.into();
    };
    let Some(template) = PropertyTemplate::from_hyp_root(&assertion.hyps[0].tree, hyp_vars[0])
    else {
        return SkipReason::NoTemplate.into();
    };
    let hyps: Vec<&ParseNode> = assertion.hyps.iter().map(|h| &h.tree).collect();
    if let Err(reason) = check_hypotheses(&template, &hyps, &hyp_vars) {
        return reason.into();
    }
    match match_closure_conclusion(&template, &assertion.conclusion, &hyp_vars) {
        Ok((symbol, const_subst)) => MiningOutcome::Recognized(ClosureRule {
            kind: ClosureKind::Pure,
            key: ClosureKey {
                symbol,
                const_subst,
                template,
            },
            assertion: assertion.clone(),
        }),
        Err(reason) => reason.into(),
    }
}

/// Checks for the shape |- ( ( A e. CC /\ B e. CC ) -> ( A + B ) e. CC )
/// The conjuncts play the role of the hypotheses of a pure closure rule.
pub fn find_impl_closure_rule(
    assertion: &Arc<Assertion>,
    implication: &dyn ImplicationRules,
    conjunction: &dyn ConjunctionRules,
) -> MiningOutcome<ClosureRule> {
    if !assertion.hyps.is_empty() {
        return SkipReason::HasHypotheses.into();
    }
    let root = &assertion.conclusion;
    let depth = root.max_depth();
    if depth != IMPL_CLOSURE_DEPTH {
        return SkipReason::Depth(depth).into();
    }
    if !implication.is_impl_operator(root.get_atom()) || root.num_children() != 2 {
        return SkipReason::NotImplication.into();
    }

    let conjuncts = conjunction.separate_by_and(root.child(0));
    let Some(first) = conjuncts.first() else {
        return SkipReason::NoHypotheses.into();
    };
    let mut hyp_vars = vec![];
    for conjunct in &conjuncts {
        match conjunct.variables().as_slice() {
            [v] => hyp_vars.push(*v),
            _ => return SkipReason::HypothesisVariables.into(),
        }
    }
    let Some(template) = PropertyTemplate::from_hyp_root(first, hyp_vars[0]) else {
        return SkipReason::NoTemplate.into();
    };
    let hyps: Vec<&ParseNode> = conjuncts.iter().collect();
    if let Err(reason) = check_hypotheses(&template, &hyps, &hyp_vars) {
        return reason.into();
    }
    match match_closure_conclusion(&template, root.child(1), &hyp_vars) {
        Ok((symbol, const_subst)) => MiningOutcome::Recognized(ClosureRule {
            kind: ClosureKind::Implication,
            key: ClosureKey {
                symbol,
                const_subst,
                template,
            },
            assertion: assertion.clone(),
        }),
        Err(reason) => reason.into(),
    }
}

/// The catalog of closure rules, and the synthesis of closure proofs from it.
///
/// For example, from "A e. CC & B e. CC => ( A + B ) e. CC" and the steps "A e. CC" and
/// "B e. CC", it can derive "( ( A + B ) + A ) e. CC".
///
/// The catalog is built once per database and is read-only afterwards.
pub struct ClosureRules {
    pure: ClosureCatalog,
    implication: ClosureCatalog,
    implication_rules: Arc<dyn ImplicationRules>,
    conjunction_rules: Arc<dyn ConjunctionRules>,
}

impl ClosureRules {
    /// An empty catalog.
    pub fn empty(
        implication_rules: Arc<dyn ImplicationRules>,
        conjunction_rules: Arc<dyn ConjunctionRules>,
    ) -> ClosureRules {
        ClosureRules {
            pure: ClosureCatalog::default(),
            implication: ClosureCatalog::default(),
            implication_rules,
            conjunction_rules,
        }
    }

    /// Scans the whole database. Pure rules are all cataloged before implication rules.
    pub fn new(
        db: &Database,
        config: &TransformConfig,
        implication_rules: Arc<dyn ImplicationRules>,
        conjunction_rules: Arc<dyn ConjunctionRules>,
    ) -> ClosureRules {
        let mut rules = ClosureRules::empty(implication_rules, conjunction_rules);
        if config.closure {
            for assertion in db.assertions() {
                let outcome = rules.add_closure_rule(assertion);
                log_outcome(db, assertion, &outcome);
            }
        }
        if config.impl_closure {
            for assertion in db.assertions() {
                let outcome = rules.add_impl_closure_rule(assertion);
                log_outcome(db, assertion, &outcome);
            }
        }
        debug!(
            pure = rules.pure.len(),
            implication = rules.implication.len(),
            "closure rules"
        );
        rules
    }

    /// Catalogs the assertion if it is a pure closure rule.
    /// A rule whose key is already cataloged is reported as a duplicate and dropped.
    pub fn add_closure_rule(&mut self, assertion: &Arc<Assertion>) -> MiningOutcome<ClosureRule> {
        let outcome = find_closure_rule(assertion);
        self.register(outcome)
    }

    /// Catalogs the assertion if it is an implication closure rule.
    pub fn add_impl_closure_rule(
        &mut self,
        assertion: &Arc<Assertion>,
    ) -> MiningOutcome<ClosureRule> {
        let outcome = find_impl_closure_rule(
            assertion,
            self.implication_rules.as_ref(),
            self.conjunction_rules.as_ref(),
        );
        self.register(outcome)
    }

    fn register(&mut self, outcome: MiningOutcome<ClosureRule>) -> MiningOutcome<ClosureRule> {
        let MiningOutcome::Recognized(rule) = outcome else {
            return outcome;
        };
        let catalog = match rule.kind {
            ClosureKind::Pure => &mut self.pure,
            ClosureKind::Implication => &mut self.implication,
        };
        if !catalog.insert(rule.key.clone(), rule.assertion.clone()) {
            return SkipReason::Duplicate.into();
        }
        MiningOutcome::Recognized(rule)
    }

    fn catalog(&self, kind: ClosureKind) -> &ClosureCatalog {
        match kind {
            ClosureKind::Pure => &self.pure,
            ClosureKind::Implication => &self.implication,
        }
    }

    pub fn get_closure_assert(
        &self,
        kind: ClosureKind,
        key: &ClosureKey,
    ) -> Option<&Arc<Assertion>> {
        self.catalog(kind).get(key)
    }

    /// Whether either catalog has a rule for this key.
    /// Clients must check this before calling closure_property.
    pub fn has_closure_assert(
        &self,
        symbol: Atom,
        const_subst: &ConstSubst,
        template: &PropertyTemplate,
    ) -> bool {
        let key = ClosureKey {
            symbol,
            const_subst: const_subst.clone(),
            template: template.clone(),
        };
        self.pure.get(&key).is_some() || self.implication.get(&key).is_some()
    }

    /// Finds a cataloged closure pattern that the node is an instance of, for this template.
    /// Pure rules are preferred, then the earliest registered rule.
    pub fn generalize(
        &self,
        node: &ParseNode,
        template: &PropertyTemplate,
    ) -> Option<GeneralizedStmt> {
        [&self.pure, &self.implication]
            .into_iter()
            .flat_map(|catalog| catalog.keys_for(node.get_atom()))
            .find(|key| &key.template == template && key.const_subst.fits(node))
            .map(GeneralizedStmt::from_key)
    }

    /// Whether closure_property would succeed, without creating any steps.
    /// Every position the recursion bottoms out at must already be proven in the worksheet.
    pub fn can_prove(
        &self,
        worksheet: &dyn WorksheetInfo,
        gen_stmt: &GeneralizedStmt,
        node: &ParseNode,
    ) -> bool {
        if worksheet
            .get_proof_step(&gen_stmt.template.subst(node))
            .is_some()
        {
            return true;
        }
        if !gen_stmt.fits(node)
            || !self.has_closure_assert(gen_stmt.symbol, &gen_stmt.const_subst, &gen_stmt.template)
        {
            return false;
        }
        gen_stmt
            .var_indexes
            .iter()
            .all(|&i| self.can_prove(worksheet, gen_stmt, node.child(i)))
    }

    /// Creates the closure step for the node, recursively.
    /// For the template "_ e. CC" and the node "( sin ` A )", given the step "A e. CC" this
    /// creates "( sin ` A ) e. CC".
    ///
    /// Existing steps are reused, so each distinct goal gets at most one step.
    /// Panics if there is no rule for gen_stmt, or if the recursion reaches a node that is
    /// neither proven already nor an instance of gen_stmt.
    pub fn closure_property(
        &self,
        worksheet: &mut dyn WorksheetInfo,
        gen_stmt: &GeneralizedStmt,
        node: &ParseNode,
    ) -> StepId {
        let goal = gen_stmt.template.subst(node);
        if let Some(step) = worksheet.get_proof_step(&goal) {
            return step;
        }
        if !gen_stmt.fits(node) {
            panic!(
                "incorrect call of closure_property: {} is neither proven nor an instance of {}",
                goal, gen_stmt
            );
        }

        let hyps: Vec<StepId> = gen_stmt
            .var_indexes
            .iter()
            .map(|&i| self.closure_property(worksheet, gen_stmt, node.child(i)))
            .collect();

        let key = gen_stmt.key();
        if let Some(assertion) = self.pure.get(&key) {
            assert_eq!(hyps.len(), assertion.hyps.len());
            return worksheet.get_or_create_proof_step(goal, hyps, assertion);
        }

        let Some(assertion) = self.implication.get(&key) else {
            panic!(
                "incorrect call of closure_property: there is no closure rule for {}",
                gen_stmt
            );
        };
        let root = &assertion.conclusion;
        let antecedent =
            self.conjunction_rules
                .concatenate_in_the_same_pattern(&hyps, root.child(0), worksheet);
        let step = self.implication_rules.apply_implication_rule(
            worksheet,
            antecedent,
            root.child(1),
            assertion,
        );
        assert_eq!(
            worksheet.formula(step),
            &goal,
            "{} did not produce the closure goal",
            assertion
        );
        step
    }

    /// Every cataloged rule, sorted by kind and key.
    pub fn rules(&self) -> Vec<ClosureRule> {
        let mut answer: Vec<ClosureRule> = [ClosureKind::Pure, ClosureKind::Implication]
            .into_iter()
            .flat_map(|kind| {
                self.catalog(kind)
                    .rules
                    .iter()
                    .map(move |(key, assertion)| ClosureRule {
                        kind,
                        key: key.clone(),
                        assertion: assertion.clone(),
                    })
            })
            .collect();
        answer.sort_by(|a, b| (a.kind, &a.key).cmp(&(b.kind, &b.key)));
        answer
    }

    pub fn len(&self) -> usize {
        self.pure.len() + self.implication.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn log_outcome(db: &Database, assertion: &Assertion, outcome: &MiningOutcome<ClosureRule>) {
    match outcome {
        MiningOutcome::Recognized(rule) => trace!(
            assertion = %assertion,
            kind = %rule.kind,
            symbol = db.name(rule.key.symbol),
            template = %db.display(rule.key.template.node()),
            "closure rule"
        ),
        MiningOutcome::NotApplicable(SkipReason::Duplicate) => trace!(
            assertion = %assertion,
            "duplicate closure rule"
        ),
        MiningOutcome::NotApplicable(_) => {}
    }
}
