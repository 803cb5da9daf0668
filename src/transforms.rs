use std::sync::Arc;

use tracing::info;

use crate::closure_rules::ClosureRules;
use crate::config::TransformConfig;
use crate::conjunction::ConjunctionInfo;
use crate::database::Database;
use crate::equivalence_rules::EquivalenceRules;
use crate::implication::ImplicationInfo;
use crate::kernel::symbol_table::SymbolTable;

/// Everything mined from one database snapshot.
/// It is read-only once built. A changed database needs a new TransformInfo.
pub struct TransformInfo {
    pub symbols: SymbolTable,
    pub implication: Arc<ImplicationInfo>,
    pub conjunction: Arc<ConjunctionInfo>,
    pub closure: ClosureRules,
    pub equivalence: EquivalenceRules,
}

impl TransformInfo {
    pub fn new(db: &Database, config: &TransformConfig) -> TransformInfo {
        let implication = Arc::new(ImplicationInfo::new(db));
        let conjunction = Arc::new(ConjunctionInfo::new(db));
        let closure = ClosureRules::new(db, config, implication.clone(), conjunction.clone());
        let equivalence = EquivalenceRules::new(db, config);
        info!(
            assertions = db.len(),
            closure_rules = closure.len(),
            relations = equivalence.relations().len(),
            "transforms initialized"
        );
        TransformInfo {
            symbols: db.symbols.clone(),
            implication,
            conjunction,
            closure,
            equivalence,
        }
    }
}
