use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::kernel::assertion::Assertion;
use crate::kernel::parse_node::ParseNode;

/// Identifies a proof step within a single worksheet.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy, Ord, PartialOrd)]
pub struct StepId(pub usize);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0 + 1)
    }
}

/// How a proof step was justified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Justification {
    /// A hypothesis of the proof being constructed. It needs no justification.
    Hypothesis,

    /// An application of a database assertion to previous steps.
    Assertion(Arc<Assertion>),
}

#[derive(Debug, Clone)]
pub struct ProofStep {
    pub formula: ParseNode,

    /// The steps that instantiate the hypotheses of the assertion, in hypothesis order.
    pub hyps: Vec<StepId>,

    pub justification: Justification,
}

/// The part of a proof session that the transforms read from and write to.
/// Steps are content-addressed: there is at most one step per distinct formula.
pub trait WorksheetInfo {
    /// Finds the existing step that proves exactly this formula.
    fn get_proof_step(&self, formula: &ParseNode) -> Option<StepId>;

    /// Returns the existing step for this formula, or creates one justified by the assertion.
    fn get_or_create_proof_step(
        &mut self,
        formula: ParseNode,
        hyps: Vec<StepId>,
        assertion: &Arc<Assertion>,
    ) -> StepId;

    /// The formula a step proves.
    fn formula(&self, id: StepId) -> &ParseNode;
}

/// An in-memory worksheet: an ordered list of steps with a formula index.
#[derive(Default)]
pub struct ProofWorksheet {
    steps: Vec<ProofStep>,
    by_formula: HashMap<ParseNode, StepId>,
}

impl ProofWorksheet {
    pub fn new() -> ProofWorksheet {
        ProofWorksheet::default()
    }

    /// Adds a hypothesis, or returns the step that already proves it.
    pub fn add_hypothesis(&mut self, formula: ParseNode) -> StepId {
        self.get_or_insert(formula, vec![], Justification::Hypothesis)
    }

    pub fn get_step(&self, id: StepId) -> &ProofStep {
        &self.steps[id.0]
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StepId, &ProofStep)> {
        self.steps.iter().enumerate().map(|(i, s)| (StepId(i), s))
    }

    fn get_or_insert(
        &mut self,
        formula: ParseNode,
        hyps: Vec<StepId>,
        justification: Justification,
    ) -> StepId {
        if let Some(&id) = self.by_formula.get(&formula) {
            return id;
        }
        let id = StepId(self.steps.len());
        self.by_formula.insert(formula.clone(), id);
        self.steps.push(ProofStep {
            formula,
            hyps,
            justification,
        });
        id
    }
}

impl WorksheetInfo for ProofWorksheet {
    fn get_proof_step(&self, formula: &ParseNode) -> Option<StepId> {
        self.by_formula.get(formula).copied()
    }

    fn get_or_create_proof_step(
        &mut self,
        formula: ParseNode,
        hyps: Vec<StepId>,
        assertion: &Arc<Assertion>,
    ) -> StepId {
        for hyp in &hyps {
            assert!(hyp.0 < self.steps.len(), "step {} does not exist", hyp);
        }
        self.get_or_insert(formula, hyps, Justification::Assertion(assertion.clone()))
    }

    fn formula(&self, id: StepId) -> &ParseNode {
        &self.steps[id.0].formula
    }
}
