use std::collections::HashMap;
use std::fmt;

use crate::kernel::atom::{Atom, AtomId};
use crate::kernel::parse_node::ParseNode;
use crate::kernel::types::TypeCode;

/// The name and type code of a single variable or syntax axiom.
#[derive(Clone, Debug)]
struct SymbolInfo {
    name: String,
    type_code: TypeCode,
}

/// In the database, variables, syntax axioms, and type codes have names.
/// The transforms, on the other hand, operate on compact atoms.
/// The SymbolTable is a mapping between the two.
#[derive(Clone, Default)]
pub struct SymbolTable {
    /// For type code i, type_names[i] is its name.
    type_names: Vec<String>,

    /// For variable i, variables[i] is its name and type.
    variables: Vec<SymbolInfo>,

    /// For syntax axiom i, syntax[i] is its name and the type it produces.
    syntax: Vec<SymbolInfo>,

    /// The name -> Atom lookup direction.
    name_to_atom: HashMap<String, Atom>,

    /// The name -> TypeCode lookup direction.
    name_to_type: HashMap<String, TypeCode>,
}

/// The id for the next symbol of a kind that already has `count` symbols.
fn next_id(count: usize, name: &str) -> Result<AtomId, String> {
    AtomId::try_from(count).map_err(|_| format!("too many symbols to declare '{}'", name))
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    /// Assigns an id to this type code name if it doesn't already have one.
    pub fn add_type(&mut self, name: &str) -> Result<TypeCode, String> {
        if let Some(&t) = self.name_to_type.get(name) {
            return Ok(t);
        }
        let Ok(id) = u16::try_from(self.type_names.len()) else {
            return Err(format!("too many type codes to declare '{}'", name));
        };
        let t = TypeCode::new(id);
        self.type_names.push(name.to_string());
        self.name_to_type.insert(name.to_string(), t);
        Ok(t)
    }

    pub fn get_type_code(&self, name: &str) -> Option<TypeCode> {
        self.name_to_type.get(name).copied()
    }

    pub fn type_name(&self, type_code: TypeCode) -> &str {
        &self.type_names[type_code.as_u16() as usize]
    }

    /// Declares a new variable. Returns an error if the name is taken.
    pub fn add_variable(&mut self, name: &str, type_code: TypeCode) -> Result<Atom, String> {
        let id = next_id(self.variables.len(), name)?;
        let atom = Atom::Variable(id);
        self.claim_name(name, atom)?;
        self.variables.push(SymbolInfo {
            name: name.to_string(),
            type_code,
        });
        Ok(atom)
    }

    /// Declares a new syntax axiom producing the given type.
    /// Returns an error if the name is taken.
    pub fn add_syntax(&mut self, name: &str, type_code: TypeCode) -> Result<Atom, String> {
        let id = next_id(self.syntax.len(), name)?;
        let atom = Atom::Syntax(id);
        self.claim_name(name, atom)?;
        self.syntax.push(SymbolInfo {
            name: name.to_string(),
            type_code,
        });
        Ok(atom)
    }

    fn claim_name(&mut self, name: &str, atom: Atom) -> Result<(), String> {
        if name == "_" || name.is_empty() || name.contains(|c: char| "(),".contains(c) || c.is_whitespace())
        {
            return Err(format!("'{}' cannot be used as a symbol name", name));
        }
        if self.name_to_atom.contains_key(name) {
            return Err(format!("symbol '{}' is already declared", name));
        }
        self.name_to_atom.insert(name.to_string(), atom);
        Ok(())
    }

    pub fn get_atom(&self, name: &str) -> Option<Atom> {
        if name == "_" {
            return Some(Atom::Hole);
        }
        self.name_to_atom.get(name).copied()
    }

    /// The type code of a variable or syntax axiom. Holes have no type.
    pub fn get_type(&self, atom: Atom) -> Option<TypeCode> {
        match atom {
            Atom::Variable(i) => self.variables.get(i as usize).map(|s| s.type_code),
            Atom::Syntax(i) => self.syntax.get(i as usize).map(|s| s.type_code),
            Atom::Hole => None,
        }
    }

    /// The type of a tree is the type of its root symbol.
    pub fn node_type(&self, node: &ParseNode) -> Option<TypeCode> {
        self.get_type(node.get_atom())
    }

    pub fn name(&self, atom: Atom) -> &str {
        match atom {
            Atom::Variable(i) => &self.variables[i as usize].name,
            Atom::Syntax(i) => &self.syntax[i as usize].name,
            Atom::Hole => "_",
        }
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }


    /// Parses prefix notation using declared names, like "in(plus(A, B), CC)".
    /// The name "_" denotes a hole.
    pub fn parse(&self, s: &str) -> Result<ParseNode, String> {
        ParseNode::parse_with(s, &|name| self.get_atom(name))
    }

    /// A displayable form of the node that uses declared names.
    pub fn display<'a>(&'a self, node: &'a ParseNode) -> NamedNode<'a> {
        NamedNode {
            symbols: self,
            node,
        }
    }
}

/// Displays a tree with the names from a symbol table.
pub struct NamedNode<'a> {
    symbols: &'a SymbolTable,
    node: &'a ParseNode,
}

impl fmt::Display for NamedNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.node
            .fmt_with(f, &|atom| self.symbols.name(atom).to_string())
    }
}
