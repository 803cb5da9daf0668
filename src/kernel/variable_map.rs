use crate::kernel::atom::{Atom, AtomId};
use crate::kernel::parse_node::ParseNode;
use std::fmt;

// A VariableMap maintains a mapping from variables to trees, allowing us to turn a more general
// tree into a more specific one by substituting variables.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Default)]
pub struct VariableMap {
    map: Vec<Option<ParseNode>>,
}

impl VariableMap {
    pub fn new() -> VariableMap {
        VariableMap { map: Vec::new() }
    }

    pub fn get_mapping(&self, i: AtomId) -> Option<&ParseNode> {
        self.map.get(i as usize).and_then(|opt| opt.as_ref())
    }

    pub fn match_var(&mut self, var_id: AtomId, special: &ParseNode) -> bool {
        let var_id = var_id as usize;
        if var_id >= self.map.len() {
            self.map.resize(var_id + 1, None);
        }
        match &self.map[var_id] {
            None => {
                self.map[var_id] = Some(special.clone());
                true
            }
            Some(general) => general == special,
        }
    }

    /// One-sided matching: finds a substitution for the variables of general that turns it
    /// into special. Variables in special are treated as constants.
    /// On failure the map may be left partially filled.
    pub fn match_nodes(&mut self, general: &ParseNode, special: &ParseNode) -> bool {
        if let Atom::Variable(i) = general.get_atom() {
            return self.match_var(i, special);
        }
        if general.get_atom() != special.get_atom()
            || general.num_children() != special.num_children()
        {
            return false;
        }
        for (g, s) in general.children().iter().zip(special.children()) {
            if !self.match_nodes(g, s) {
                return false;
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.iter().all(|opt| opt.is_none())
    }

    pub fn set(&mut self, i: AtomId, node: ParseNode) {
        let i = i as usize;
        if i >= self.map.len() {
            self.map.resize(i + 1, None);
        }
        self.map[i] = Some(node);
    }

    pub fn has_mapping(&self, i: AtomId) -> bool {
        self.get_mapping(i).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ParseNode)> {
        self.map
            .iter()
            .enumerate()
            .filter_map(|(i, opt)| opt.as_ref().map(|node| (i, node)))
    }

    /// Substitutes mapped variables.
    /// Unmapped variables are kept as-is.
    pub fn specialize(&self, node: &ParseNode) -> ParseNode {
        if let Atom::Variable(i) = node.get_atom() {
            if let Some(replacement) = self.get_mapping(i) {
                return replacement.clone();
            }
        }
        if node.is_leaf() {
            return node.clone();
        }
        let children = node.children().iter().map(|c| self.specialize(c)).collect();
        ParseNode::new(node.get_atom(), children)
    }
}

impl fmt::Display for VariableMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        let mut first = true;
        for (i, node) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "x{} -> {}", i, node)?;
            first = false;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_and_specialize() {
        let general = ParseNode::parse("s0(x0, s1(x1, x0))");
        let special = ParseNode::parse("s0(s2(x5), s1(s3, s2(x5)))");
        let mut map = VariableMap::new();
        assert!(map.match_nodes(&general, &special));
        assert_eq!(map.get_mapping(0), Some(&ParseNode::parse("s2(x5)")));
        assert_eq!(map.get_mapping(1), Some(&ParseNode::parse("s3")));
        assert_eq!(map.specialize(&general), special);
        assert_eq!(map.to_string(), "(x0 -> s2(x5), x1 -> s3)");
    }

    #[test]
    fn test_inconsistent_binding_fails() {
        let general = ParseNode::parse("s0(x0, x0)");
        let special = ParseNode::parse("s0(s1, s2)");
        assert!(!VariableMap::new().match_nodes(&general, &special));
    }

    #[test]
    fn test_specialize_keeps_unmapped() {
        let mut map = VariableMap::new();
        map.set(1, ParseNode::parse("s4"));
        assert_eq!(
            map.specialize(&ParseNode::parse("s0(x0, x1)")),
            ParseNode::parse("s0(x0, s4)")
        );
    }
}
