use std::fmt;

/// Why an assertion does not have a recognized rule shape.
/// None of these are errors. Most assertions in a database are skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NoHypotheses,

    /// A pure closure rule needs exactly one hypothesis per variable.
    HypothesisCount { hyps: usize, vars: usize },

    /// Some hypothesis or conjunct mentions zero variables or more than one.
    HypothesisVariables,

    /// The first hypothesis doesn't yield a template with exactly one hole.
    NoTemplate,

    /// Hypothesis or conjunct i doesn't have the same property as the first one, applied to
    /// its own variable.
    InconsistentHypothesis(usize),

    /// The conclusion doesn't have the property of the hypotheses.
    ConclusionMismatch,

    /// A function argument is a compound expression that contains a variable.
    NestedVariable(usize),

    /// A function argument is a variable that no hypothesis is about, or the hypotheses
    /// don't cover every argument variable exactly once.
    UnmatchedVariable(usize),

    /// The arguments use the hypothesis variables in a different order than the hypotheses.
    IncorrectOrder,

    /// Not every hypothesis is used by an argument.
    UnusedHypothesis,

    /// The same rule is already cataloged from an earlier assertion.
    Duplicate,

    /// Implication closure rules must be stated without separate hypotheses.
    HasHypotheses,

    /// The conclusion is not an implication.
    NotImplication,

    /// The conclusion doesn't have the canonical depth.
    Depth(usize),

    /// The assertion is not a commutative or transitive lemma.
    NotEquivalenceShape,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SkipReason::NoHypotheses => write!(f, "no hypotheses"),
            SkipReason::HypothesisCount { hyps, vars } => {
                write!(f, "{} hypotheses for {} variables", hyps, vars)
            }
            SkipReason::HypothesisVariables => {
                write!(f, "a hypothesis does not have exactly one variable")
            }
            SkipReason::NoTemplate => write!(f, "no single-hole template"),
            SkipReason::InconsistentHypothesis(i) => {
                write!(f, "hypothesis {} does not match the template", i)
            }
            SkipReason::ConclusionMismatch => write!(f, "conclusion does not match the template"),
            SkipReason::NestedVariable(i) => write!(f, "argument {} nests a variable", i),
            SkipReason::UnmatchedVariable(i) => {
                write!(f, "argument {} has no matching hypothesis", i)
            }
            SkipReason::IncorrectOrder => write!(f, "arguments are out of hypothesis order"),
            SkipReason::UnusedHypothesis => write!(f, "a hypothesis is unused"),
            SkipReason::Duplicate => write!(f, "duplicate rule"),
            SkipReason::HasHypotheses => write!(f, "has separate hypotheses"),
            SkipReason::NotImplication => write!(f, "not an implication"),
            SkipReason::Depth(d) => write!(f, "depth {}", d),
            SkipReason::NotEquivalenceShape => write!(f, "not an equivalence lemma"),
        }
    }
}

/// The result of checking one assertion for a rule shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MiningOutcome<R> {
    Recognized(R),
    NotApplicable(SkipReason),
}

impl<R> MiningOutcome<R> {
    pub fn is_recognized(&self) -> bool {
        matches!(self, MiningOutcome::Recognized(_))
    }

    pub fn recognized(self) -> Option<R> {
        match self {
            MiningOutcome::Recognized(r) => Some(r),
            MiningOutcome::NotApplicable(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            MiningOutcome::Recognized(_) => None,
            MiningOutcome::NotApplicable(reason) => Some(*reason),
        }
    }
}

impl<R> From<SkipReason> for MiningOutcome<R> {
    fn from(reason: SkipReason) -> Self {
        MiningOutcome::NotApplicable(reason)
    }
}
