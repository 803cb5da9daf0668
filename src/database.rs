use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::kernel::assertion::{Assertion, Hypothesis};
use crate::kernel::atom::Atom;
use crate::kernel::parse_node::ParseNode;
use crate::kernel::symbol_table::SymbolTable;
use crate::kernel::types::TypeCode;

// Errors from reading or building a database.
#[derive(Debug)]
pub struct DatabaseError(pub String);

impl From<io::Error> for DatabaseError {
    fn from(error: io::Error) -> Self {
        DatabaseError(format!("{}", error))
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(error: serde_json::Error) -> Self {
        DatabaseError(format!("invalid database file: {}", error))
    }
}

impl From<String> for DatabaseError {
    fn from(message: String) -> Self {
        DatabaseError(message)
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for DatabaseError {}

/// The assertion database that the transforms mine.
/// Assertions are kept in insertion order, and every scan over the database uses that order.
#[derive(Clone, Default)]
pub struct Database {
    pub symbols: SymbolTable,
    assertions: Vec<Arc<Assertion>>,
}

impl Database {
    pub fn new() -> Database {
        Database::default()
    }

    pub fn assertions(&self) -> &[Arc<Assertion>] {
        &self.assertions
    }

    pub fn len(&self) -> usize {
        self.assertions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty()
    }

    pub fn get_assertion(&self, label: &str) -> Option<&Arc<Assertion>> {
        self.assertions.iter().find(|a| a.label == label)
    }

    pub fn add_type(&mut self, name: &str) -> Result<TypeCode, DatabaseError> {
        Ok(self.symbols.add_type(name)?)
    }

    /// Declares variables of the given type code, creating the type code if needed.
    pub fn add_variables(&mut self, names: &[&str], type_name: &str) -> Result<(), DatabaseError> {
        let type_code = self.symbols.add_type(type_name)?;
        for name in names {
            self.symbols.add_variable(name, type_code)?;
        }
        Ok(())
    }

    /// Declares syntax axioms producing the given type code, creating the type code if needed.
    pub fn add_syntax(&mut self, names: &[&str], type_name: &str) -> Result<(), DatabaseError> {
        let type_code = self.symbols.add_type(type_name)?;
        for name in names {
            self.symbols.add_syntax(name, type_code)?;
        }
        Ok(())
    }

    pub fn parse(&self, s: &str) -> Result<ParseNode, DatabaseError> {
        let node = self
            .symbols
            .parse(s)
            .map_err(|e| DatabaseError(format!("in '{}': {}", s, e)))?;
        if node.count_holes() > 0 {
            return Err(DatabaseError(format!(
                "'{}' contains a hole, which is only allowed in templates",
                s
            )));
        }
        Ok(node)
    }

    /// Adds an assertion. Hypotheses are labeled "<label>.<n>", counting from 1.
    pub fn add_assertion(
        &mut self,
        label: &str,
        hyps: &[&str],
        conclusion: &str,
    ) -> Result<Arc<Assertion>, DatabaseError> {
        if self.get_assertion(label).is_some() {
            return Err(DatabaseError(format!(
                "assertion '{}' is already declared",
                label
            )));
        }
        let mut hypotheses = vec![];
        for (i, hyp) in hyps.iter().enumerate() {
            let tree = self.parse(hyp)?;
            hypotheses.push(Hypothesis::new(format!("{}.{}", label, i + 1), tree));
        }
        let conclusion = self.parse(conclusion)?;
        let assertion = Arc::new(Assertion::new(label, hypotheses, conclusion));
        self.assertions.push(assertion.clone());
        Ok(assertion)
    }

    /// Renders a tree with declared names.
    pub fn display(&self, node: &ParseNode) -> String {
        self.symbols.display(node).to_string()
    }

    pub fn name(&self, atom: Atom) -> &str {
        self.symbols.name(atom)
    }

    /// Builds a database from its serializable description.
    pub fn from_file(file: &DatabaseFile) -> Result<Database, DatabaseError> {
        let mut db = Database::new();
        for decl in &file.variables {
            let names: Vec<&str> = decl.names.iter().map(|s| s.as_str()).collect();
            db.add_variables(&names, &decl.type_code)?;
        }
        for decl in &file.syntax {
            let names: Vec<&str> = decl.names.iter().map(|s| s.as_str()).collect();
            db.add_syntax(&names, &decl.type_code)?;
        }
        for a in &file.assertions {
            let hyps: Vec<&str> = a.hyps.iter().map(|s| s.as_str()).collect();
            db.add_assertion(&a.label, &hyps, &a.conclusion)?;
        }
        Ok(db)
    }

    /// Loads a database from a JSON file.
    pub fn load(filename: &Path) -> Result<Database, DatabaseError> {
        let file = File::open(filename)?;
        let description: DatabaseFile = serde_json::from_reader(BufReader::new(file))?;
        Database::from_file(&description)
    }
}

/// A group of symbols that share a type code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymbolDecl {
    #[serde(rename = "type")]
    pub type_code: String,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssertionDecl {
    pub label: String,
    #[serde(default)]
    pub hyps: Vec<String>,
    pub conclusion: String,
}

/// The on-disk description of a database.
/// Formulas are written in prefix notation, like "in(plus(A, B), CC)".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DatabaseFile {
    #[serde(default)]
    pub variables: Vec<SymbolDecl>,
    #[serde(default)]
    pub syntax: Vec<SymbolDecl>,
    #[serde(default)]
    pub assertions: Vec<AssertionDecl>,
}
