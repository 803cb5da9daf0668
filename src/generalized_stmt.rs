use std::fmt;

use crate::kernel::atom::Atom;
use crate::kernel::parse_node::ParseNode;
use crate::template::PropertyTemplate;

/// The fixed arguments of a function application, one slot per child position.
/// None marks a variable position, where closure recurses.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstSubst(Vec<Option<ParseNode>>);

impl ConstSubst {
    pub fn new(slots: Vec<Option<ParseNode>>) -> ConstSubst {
        ConstSubst(slots)
    }

    /// A substitution where every position is variable.
    pub fn all_variable(arity: usize) -> ConstSubst {
        ConstSubst(vec![None; arity])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&ParseNode> {
        self.0[i].as_ref()
    }

    pub fn var_indexes(&self) -> Vec<usize> {
        (0..self.0.len()).filter(|&i| self.0[i].is_none()).collect()
    }

    /// Whether the node's children agree with every constant position.
    pub fn fits(&self, node: &ParseNode) -> bool {
        node.num_children() == self.0.len()
            && self
                .0
                .iter()
                .zip(node.children())
                .all(|(slot, child)| slot.as_ref().map_or(true, |c| c == child))
    }
}

impl fmt::Display for ConstSubst {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, slot) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match slot {
                Some(node) => write!(f, "{}", node)?,
                None => write!(f, "*")?,
            }
        }
        write!(f, "]")
    }
}

/// The key of a closure catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClosureKey {
    pub symbol: Atom,
    pub const_subst: ConstSubst,
    pub template: PropertyTemplate,
}

impl fmt::Display for ClosureKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.symbol, self.const_subst, self.template)
    }
}

/// A node recognized as an instance of a cataloged closure pattern.
/// For "( sin ` A ) e. CC" this would be the symbol for "`", the constant "sin" in the
/// first position, and the template "_ e. CC".
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GeneralizedStmt {
    pub symbol: Atom,
    pub const_subst: ConstSubst,
    pub template: PropertyTemplate,

    /// The child positions that are variable, in increasing order.
    pub var_indexes: Vec<usize>,
}

impl GeneralizedStmt {
    pub fn new(symbol: Atom, const_subst: ConstSubst, template: PropertyTemplate) -> Self {
        let var_indexes = const_subst.var_indexes();
        GeneralizedStmt {
            symbol,
            const_subst,
            template,
            var_indexes,
        }
    }

    pub fn from_key(key: &ClosureKey) -> Self {
        GeneralizedStmt::new(key.symbol, key.const_subst.clone(), key.template.clone())
    }

    pub fn key(&self) -> ClosureKey {
        ClosureKey {
            symbol: self.symbol,
            const_subst: self.const_subst.clone(),
            template: self.template.clone(),
        }
    }

    /// Whether the node is an application of this symbol that agrees on the constant positions.
    pub fn fits(&self, node: &ParseNode) -> bool {
        node.get_atom() == self.symbol && self.const_subst.fits(node)
    }
}

impl fmt::Display for GeneralizedStmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.symbol, self.const_subst, self.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_const_subst_structural_identity() {
        let a = ConstSubst::new(vec![None, Some(ParseNode::parse("s1"))]);
        let b = ConstSubst::new(vec![None, Some(ParseNode::parse("s1"))]);
        let c = ConstSubst::new(vec![Some(ParseNode::parse("s1")), None]);
        let set: HashSet<ConstSubst> = [a.clone(), b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(a.var_indexes(), vec![0]);
        assert_eq!(a.to_string(), "[*, s1]");
    }

    #[test]
    fn test_fits() {
        let template = PropertyTemplate::new(ParseNode::parse("s0(_, s9)")).unwrap();
        let gen = GeneralizedStmt::new(
            Atom::Syntax(2),
            ConstSubst::new(vec![None, Some(ParseNode::parse("s1"))]),
            template,
        );
        assert_eq!(gen.var_indexes, vec![0]);
        assert!(gen.fits(&ParseNode::parse("s2(s3(x0), s1)")));
        assert!(!gen.fits(&ParseNode::parse("s2(x0, s4)")));
        assert!(!gen.fits(&ParseNode::parse("s2(x0)")));
        assert!(!gen.fits(&ParseNode::parse("s5(x0, s1)")));
    }
}
