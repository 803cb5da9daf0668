pub mod assertion;
pub mod atom;
pub mod parse_node;
pub mod symbol_table;
pub mod types;
pub mod variable_map;
