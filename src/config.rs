use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Which rule catalogs get built when a database loads.
/// A disabled catalog is left empty, so nothing can be synthesized from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    // Closure rules proved directly from one hypothesis per argument.
    pub closure: bool,

    // Closure rules stated as a single implication from a conjunction.
    pub impl_closure: bool,

    // Commutative and transitive lemmas for equivalence relations.
    pub equivalence: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            closure: true,
            impl_closure: true,
            equivalence: true,
        }
    }
}

impl TransformConfig {
    /// Loads a config from a JSON file. Missing fields take their default values.
    pub fn load(filename: &Path) -> Result<TransformConfig, Box<dyn Error>> {
        let file = File::open(filename)?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }
}
