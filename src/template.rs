use std::fmt;

use crate::kernel::atom::{Atom, AtomId};
use crate::kernel::parse_node::ParseNode;

/// The result of matching a template against a tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    NoMatch,

    /// The subtree of the input that sits where the template has its hole.
    Matched(ParseNode),
}

impl MatchOutcome {
    pub fn captured(self) -> Option<ParseNode> {
        match self {
            MatchOutcome::Matched(node) => Some(node),
            MatchOutcome::NoMatch => None,
        }
    }
}

/// What a lock-step walk found in one subtree.
enum Correspondence {
    /// The input differs from the template outside the hole.
    Mismatch,

    /// The subtrees are identical and the template has no hole here.
    Concrete,

    Captured(ParseNode),
}

fn correspond(template: &ParseNode, input: &ParseNode) -> Correspondence {
    if template.get_atom().is_hole() {
        return Correspondence::Captured(input.clone());
    }
    if template.get_atom() != input.get_atom()
        || template.num_children() != input.num_children()
    {
        return Correspondence::Mismatch;
    }
    let mut answer = Correspondence::Concrete;
    for (t, i) in template.children().iter().zip(input.children()) {
        match correspond(t, i) {
            Correspondence::Mismatch => return Correspondence::Mismatch,
            Correspondence::Concrete => {}
            captured => answer = captured,
        }
    }
    answer
}

/// A property with one free position, like "_ e. CC".
/// The tree always contains exactly one hole.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyTemplate {
    node: ParseNode,
}

impl PropertyTemplate {
    /// Accepts a tree with exactly one hole.
    pub fn new(node: ParseNode) -> Option<PropertyTemplate> {
        if node.count_holes() != 1 {
            return None;
        }
        Some(PropertyTemplate { node })
    }

    /// Builds the template of a hypothesis by replacing its variable with the hole.
    /// Fails unless the variable occurs exactly once.
    /// A hypothesis that is just the bare variable carries no property, so it fails too.
    pub fn from_hyp_root(hyp_root: &ParseNode, var: AtomId) -> Option<PropertyTemplate> {
        if hyp_root.get_atom() == Atom::Variable(var) {
            return None;
        }
        let (node, count) = hyp_root.replace_variable(var, &ParseNode::hole());
        if count != 1 {
            return None;
        }
        Some(PropertyTemplate { node })
    }

    pub fn node(&self) -> &ParseNode {
        &self.node
    }

    /// Walks the template and the input in lock step.
    /// They must agree everywhere outside the hole.
    pub fn match_node(&self, input: &ParseNode) -> MatchOutcome {
        match correspond(&self.node, input) {
            Correspondence::Captured(node) => MatchOutcome::Matched(node),
            Correspondence::Mismatch | Correspondence::Concrete => MatchOutcome::NoMatch,
        }
    }

    /// The template with its hole filled in.
    pub fn subst(&self, node: &ParseNode) -> ParseNode {
        self.node.replace_atom(Atom::Hole, node).0
    }
}

impl fmt::Display for PropertyTemplate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.node)
    }
}

impl fmt::Debug for PropertyTemplate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PropertyTemplate({})", self.node)
    }
}
