use serde::{Deserialize, Serialize};
use std::fmt;

/// A type code identifies the syntactic category of an expression, like "wff" or "class".
/// Every variable and every syntax axiom has exactly one type code.
/// Equivalence relations are indexed by the type code of their operands.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, Default,
)]
pub struct TypeCode(u16);

impl TypeCode {
    pub const fn new(id: u16) -> TypeCode {
        TypeCode(id)
    }

    pub fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}
