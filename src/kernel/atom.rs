use std::fmt;

use serde::{Deserialize, Serialize};

pub type AtomId = u16;

/// An atomic value does not have any internal structure.
/// Every node of a formula tree is labeled with exactly one atom.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum Atom {
    // A variable hypothesis, like the "A" in "A e. CC".
    // Variables are numbered in declaration order.
    Variable(AtomId),

    // A syntax axiom: a constant, a function symbol, or a relation symbol.
    Syntax(AtomId),

    // The placeholder of a property template.
    // Holes never appear in trees that come from the database.
    Hole,
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Atom::Variable(i) => write!(f, "x{}", i),
            Atom::Syntax(i) => write!(f, "s{}", i),
            Atom::Hole => write!(f, "_"),
        }
    }
}

impl Atom {
    pub fn new(s: &str) -> Atom {
        match Atom::parse(s) {
            Some(atom) => atom,
            None => panic!("failed to parse atom: '{}'", s),
        }
    }

    /// Parses the raw display form of an atom: "x3", "s12" or "_".
    pub fn parse(s: &str) -> Option<Atom> {
        let s = s.trim();
        if s == "_" {
            return Some(Atom::Hole);
        }
        let mut chars = s.chars();
        let first = chars.next()?;
        let rest = chars.as_str();
        match first {
            'x' => Some(Atom::Variable(rest.parse().ok()?)),
            's' => Some(Atom::Syntax(rest.parse().ok()?)),
            _ => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Atom::Variable(_))
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, Atom::Syntax(_))
    }

    pub fn is_hole(&self) -> bool {
        matches!(self, Atom::Hole)
    }

    /// Returns the variable id if this is a variable.
    pub fn as_variable(&self) -> Option<AtomId> {
        match self {
            Atom::Variable(i) => Some(*i),
            _ => None,
        }
    }
}
