pub mod closure_rules;
pub mod config;
pub mod conjunction;
pub mod database;
pub mod equivalence_rules;
pub mod generalized_stmt;
pub mod implication;
pub mod kernel;
pub mod mining;
pub mod template;
pub mod transforms;
pub mod worksheet;

#[cfg(test)]
mod tests;
