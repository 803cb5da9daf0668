use std::fmt;
use std::sync::Arc;

use crate::kernel::atom::{Atom, AtomId};

/// A formula tree: an atom applied to an ordered list of children.
/// Leaves are variables or constants.
///
/// Nodes are immutable and shared. Cloning a ParseNode is cheap, and equality and hashing are
/// structural, so two independently built trees with the same shape compare equal.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParseNode(Arc<NodeData>);

#[derive(PartialEq, Eq, Hash, PartialOrd, Ord)]
struct NodeData {
    atom: Atom,
    children: Vec<ParseNode>,
}

impl ParseNode {
    pub fn new(atom: Atom, children: Vec<ParseNode>) -> ParseNode {
        ParseNode(Arc::new(NodeData { atom, children }))
    }

    pub fn atom(atom: Atom) -> ParseNode {
        ParseNode::new(atom, vec![])
    }

    pub fn hole() -> ParseNode {
        ParseNode::atom(Atom::Hole)
    }

    /// Creates op(left, right).
    pub fn binary(op: Atom, left: ParseNode, right: ParseNode) -> ParseNode {
        ParseNode::new(op, vec![left, right])
    }

    pub fn get_atom(&self) -> Atom {
        self.0.atom
    }

    pub fn children(&self) -> &[ParseNode] {
        &self.0.children
    }

    pub fn child(&self, i: usize) -> &ParseNode {
        &self.0.children[i]
    }

    pub fn num_children(&self) -> usize {
        self.0.children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.0.children.is_empty()
    }

    /// A constant contains no variables and no hole anywhere inside it.
    pub fn is_constant(&self) -> bool {
        !self.0.atom.is_variable()
            && !self.0.atom.is_hole()
            && self.0.children.iter().all(|c| c.is_constant())
    }

    /// Whether the two nodes share the same allocation.
    pub fn ptr_eq(&self, other: &ParseNode) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The depth of the tree. A leaf has depth 1.
    pub fn max_depth(&self) -> usize {
        1 + self
            .0
            .children
            .iter()
            .map(|c| c.max_depth())
            .max()
            .unwrap_or(0)
    }

    /// The distinct variables of this tree, in order of first occurrence.
    pub fn variables(&self) -> Vec<AtomId> {
        let mut answer = vec![];
        self.collect_variables(&mut answer);
        answer
    }

    fn collect_variables(&self, output: &mut Vec<AtomId>) {
        if let Atom::Variable(i) = self.0.atom {
            if !output.contains(&i) {
                output.push(i);
            }
        }
        for child in &self.0.children {
            child.collect_variables(output);
        }
    }

    pub fn count_holes(&self) -> usize {
        let here = if self.0.atom.is_hole() { 1 } else { 0 };
        here + self
            .0
            .children
            .iter()
            .map(|c| c.count_holes())
            .sum::<usize>()
    }

    /// Replaces every occurrence of the variable with the replacement.
    /// Returns the new tree and the number of replacements made.
    /// Subtrees without the variable are shared with the original.
    pub fn replace_variable(&self, var: AtomId, replacement: &ParseNode) -> (ParseNode, usize) {
        self.replace_atom(Atom::Variable(var), replacement)
    }

    /// Replaces every leaf labeled with the given atom.
    pub fn replace_atom(&self, target: Atom, replacement: &ParseNode) -> (ParseNode, usize) {
        if self.0.atom == target && self.is_leaf() {
            return (replacement.clone(), 1);
        }
        let mut count = 0;
        let mut changed = false;
        let mut children = Vec::with_capacity(self.num_children());
        for child in &self.0.children {
            let (new_child, n) = child.replace_atom(target, replacement);
            if n > 0 {
                changed = true;
                count += n;
            }
            children.push(new_child);
        }
        if !changed {
            return (self.clone(), 0);
        }
        (ParseNode::new(self.0.atom, children), count)
    }

    /// Parses the raw display form, like "s0(x1, s2)".
    /// Panics on malformed input, so it's intended for tests.
    pub fn parse(s: &str) -> ParseNode {
        match ParseNode::parse_with(s, &|name| Atom::parse(name)) {
            Ok(node) => node,
            Err(e) => panic!("failed to parse '{}': {}", s, e),
        }
    }

    /// Parses prefix notation "f(a, g(b))", resolving each name to an atom.
    pub fn parse_with(
        s: &str,
        resolve: &dyn Fn(&str) -> Option<Atom>,
    ) -> Result<ParseNode, String> {
        let tokens = tokenize(s);
        let mut pos = 0;
        let node = parse_tokens(&tokens, &mut pos, resolve)?;
        if pos != tokens.len() {
            return Err(format!("unexpected trailing input in '{}'", s));
        }
        Ok(node)
    }

    /// Renders the tree, naming each atom with the provided function.
    pub fn fmt_with(
        &self,
        f: &mut fmt::Formatter,
        name: &dyn Fn(Atom) -> String,
    ) -> fmt::Result {
        write!(f, "{}", name(self.0.atom))?;
        if self.is_leaf() {
            return Ok(());
        }
        write!(f, "(")?;
        for (i, child) in self.0.children.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            child.fmt_with(f, name)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for ParseNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_with(f, &|atom| atom.to_string())
    }
}

impl fmt::Debug for ParseNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Name(&'a str),
    Open,
    Close,
    Comma,
}

fn tokenize(s: &str) -> Vec<Token<'_>> {
    let mut tokens = vec![];
    let mut start: Option<usize> = None;
    for (i, c) in s.char_indices() {
        let punct = match c {
            '(' => Some(Token::Open),
            ')' => Some(Token::Close),
            ',' => Some(Token::Comma),
            _ => None,
        };
        if punct.is_some() || c.is_whitespace() {
            if let Some(j) = start.take() {
                tokens.push(Token::Name(&s[j..i]));
            }
            if let Some(token) = punct {
                tokens.push(token);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(j) = start {
        tokens.push(Token::Name(&s[j..]));
    }
    tokens
}

fn parse_tokens(
    tokens: &[Token],
    pos: &mut usize,
    resolve: &dyn Fn(&str) -> Option<Atom>,
) -> Result<ParseNode, String> {
    let name = match tokens.get(*pos) {
        Some(Token::Name(name)) => *name,
        Some(token) => return Err(format!("expected a name but found {:?}", token)),
        None => return Err("unexpected end of input".to_string()),
    };
    *pos += 1;
    let atom = resolve(name).ok_or_else(|| format!("unknown name '{}'", name))?;

    let mut children = vec![];
    if tokens.get(*pos) == Some(&Token::Open) {
        *pos += 1;
        loop {
            children.push(parse_tokens(tokens, pos, resolve)?);
            match tokens.get(*pos) {
                Some(Token::Comma) => *pos += 1,
                Some(Token::Close) => {
                    *pos += 1;
                    break;
                }
                _ => return Err(format!("expected ',' or ')' after argument of '{}'", name)),
            }
        }
    }
    Ok(ParseNode::new(atom, children))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let node = ParseNode::parse("s0(s1(x0, x1), s2)");
        assert_eq!(node.to_string(), "s0(s1(x0, x1), s2)");
        assert_eq!(node.num_children(), 2);
        assert_eq!(node.child(1).get_atom(), Atom::Syntax(2));
    }

    #[test]
    fn test_parse_errors() {
        let resolve = |name: &str| Atom::parse(name);
        assert!(ParseNode::parse_with("s0(x0", &resolve).is_err());
        assert!(ParseNode::parse_with("s0 x0", &resolve).is_err());
        assert!(ParseNode::parse_with("foo", &resolve).is_err());
        assert!(ParseNode::parse_with("", &resolve).is_err());
    }

    #[test]
    fn test_structural_equality() {
        let a = ParseNode::parse("s0(x0, s1)");
        let b = ParseNode::parse("s0(x0, s1)");
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
        assert_ne!(a, ParseNode::parse("s0(s1, x0)"));
    }

    #[test]
    fn test_max_depth() {
        assert_eq!(ParseNode::parse("x0").max_depth(), 1);
        assert_eq!(ParseNode::parse("s0(x0, x1)").max_depth(), 2);
        assert_eq!(
            ParseNode::parse("s0(s1(s2(x0, s3), s2(x1, s3)), s2(s4(x0, x1), s3))").max_depth(),
            4
        );
    }

    #[test]
    fn test_constants_and_variables() {
        assert!(ParseNode::parse("s0(s1, s2)").is_constant());
        assert!(!ParseNode::parse("s0(s1, x2)").is_constant());
        assert!(!ParseNode::parse("s0(_)").is_constant());
        assert_eq!(ParseNode::parse("s0(x2, s1(x0, x2))").variables(), vec![2, 0]);
    }

    #[test]
    fn test_replace_variable_counts() {
        let node = ParseNode::parse("s0(x0, s1(x0, x1))");
        let (replaced, n) = node.replace_variable(0, &ParseNode::hole());
        assert_eq!(n, 2);
        assert_eq!(replaced, ParseNode::parse("s0(_, s1(_, x1))"));

        let (same, n) = node.replace_variable(7, &ParseNode::hole());
        assert_eq!(n, 0);
        assert!(same.ptr_eq(&node));
    }
}
