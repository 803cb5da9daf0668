use std::fmt;

use crate::kernel::atom::AtomId;
use crate::kernel::parse_node::ParseNode;

/// A logical hypothesis of an assertion, like "A e. CC".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hypothesis {
    pub label: String,
    pub tree: ParseNode,
}

impl Hypothesis {
    pub fn new(label: impl Into<String>, tree: ParseNode) -> Hypothesis {
        Hypothesis {
            label: label.into(),
            tree,
        }
    }

    /// The variables this hypothesis mentions, in order of first occurrence.
    pub fn variables(&self) -> Vec<AtomId> {
        self.tree.variables()
    }
}

/// A named theorem or axiom from the database.
/// Assertions are created when the database loads and never change afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assertion {
    pub label: String,

    /// The mandatory variables, in declaration order.
    /// These are all the variables that appear in the hypotheses or the conclusion.
    pub mand_vars: Vec<AtomId>,

    /// The logical hypotheses, in order.
    pub hyps: Vec<Hypothesis>,

    pub conclusion: ParseNode,
}

impl Assertion {
    /// Creates an assertion, computing the mandatory variables.
    pub fn new(label: impl Into<String>, hyps: Vec<Hypothesis>, conclusion: ParseNode) -> Assertion {
        let mut mand_vars = conclusion.variables();
        for hyp in &hyps {
            for v in hyp.variables() {
                if !mand_vars.contains(&v) {
                    mand_vars.push(v);
                }
            }
        }
        mand_vars.sort_unstable();
        Assertion {
            label: label.into(),
            mand_vars,
            hyps,
            conclusion,
        }
    }

    /// For each hypothesis, the single variable it mentions.
    /// None if any hypothesis mentions zero variables or more than one.
    pub fn hyp_to_var_map(&self) -> Option<Vec<AtomId>> {
        self.hyps
            .iter()
            .map(|hyp| match hyp.variables().as_slice() {
                [v] => Some(*v),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}
