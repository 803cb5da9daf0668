use indoc::indoc;

use crate::config::TransformConfig;
use crate::database::{Database, DatabaseFile};
use crate::generalized_stmt::GeneralizedStmt;
use crate::kernel::parse_node::ParseNode;
use crate::template::PropertyTemplate;
use crate::transforms::TransformInfo;
use crate::worksheet::{ProofWorksheet, StepId};

/// A small database in the style of set.mm.
/// wi is implication, wa is conjunction, wcel is membership, wceq and wb are equivalences.
pub const SET_MM: &str = indoc! {r#"
    {
      "variables": [
        { "type": "wff", "names": ["ph", "ps", "ch"] },
        { "type": "class", "names": ["A", "B", "C"] }
      ],
      "syntax": [
        { "type": "wff", "names": ["wi", "wa", "wb", "wcel", "wceq"] },
        { "type": "class", "names": ["cc", "caddc", "cmul", "csub", "cneg", "fv", "csin", "f", "K"] }
      ],
      "assertions": [
        { "label": "ax-mp", "hyps": ["ph", "wi(ph, ps)"], "conclusion": "ps" },
        { "label": "pm3.2i", "hyps": ["ph", "ps"], "conclusion": "wa(ph, ps)" },
        { "label": "simpli", "hyps": ["wa(ph, ps)"], "conclusion": "ph" },
        { "label": "simpri", "hyps": ["wa(ph, ps)"], "conclusion": "ps" },
        { "label": "addcl", "hyps": ["wcel(A, cc)", "wcel(B, cc)"], "conclusion": "wcel(caddc(A, B), cc)" },
        { "label": "addcl2", "hyps": ["wcel(B, cc)", "wcel(C, cc)"], "conclusion": "wcel(caddc(B, C), cc)" },
        { "label": "fkcl", "hyps": ["wcel(A, cc)"], "conclusion": "wcel(f(A, K), cc)" },
        { "label": "sincl", "hyps": ["wcel(A, cc)"], "conclusion": "wcel(fv(csin, A), cc)" },
        { "label": "subrevcl", "hyps": ["wcel(A, cc)", "wcel(B, cc)"], "conclusion": "wcel(csub(B, A), cc)" },
        { "label": "mulcl", "conclusion": "wi(wa(wcel(A, cc), wcel(B, cc)), wcel(cmul(A, B), cc))" },
        { "label": "negcl", "conclusion": "wi(wcel(A, cc), wcel(cneg(A), cc))" },
        { "label": "eqcomi", "hyps": ["wceq(A, B)"], "conclusion": "wceq(B, A)" },
        { "label": "eqtri", "hyps": ["wceq(A, B)", "wceq(B, C)"], "conclusion": "wceq(A, C)" },
        { "label": "bicomi", "hyps": ["wb(ph, ps)"], "conclusion": "wb(ps, ph)" },
        { "label": "bitri", "hyps": ["wb(ph, ps)", "wb(ps, ch)"], "conclusion": "wb(ph, ch)" }
      ]
    }
"#};

pub fn set_mm() -> Database {
    let file: DatabaseFile = serde_json::from_str(SET_MM).unwrap();
    Database::from_file(&file).unwrap()
}

/// The fixture database, with every catalog built.
pub fn setup() -> (Database, TransformInfo) {
    let db = set_mm();
    let info = TransformInfo::new(&db, &TransformConfig::default());
    (db, info)
}

pub fn node(db: &Database, s: &str) -> ParseNode {
    match db.parse(s) {
        Ok(node) => node,
        Err(e) => panic!("{}", e),
    }
}

pub fn template(db: &Database, s: &str) -> PropertyTemplate {
    let node = db.symbols.parse(s).unwrap();
    PropertyTemplate::new(node).unwrap()
}

/// The cataloged closure pattern for the node under the template, which must exist.
pub fn generalize(info: &TransformInfo, db: &Database, node: &ParseNode, t: &str) -> GeneralizedStmt {
    match info.closure.generalize(node, &template(db, t)) {
        Some(gen) => gen,
        None => panic!("no closure rule for {}", db.display(node)),
    }
}

/// A worksheet whose hypotheses are the given formulas.
pub fn worksheet(db: &Database, hyps: &[&str]) -> (ProofWorksheet, Vec<StepId>) {
    let mut ws = ProofWorksheet::new();
    let steps = hyps.iter().map(|h| ws.add_hypothesis(node(db, h))).collect();
    (ws, steps)
}

pub fn label(ws: &ProofWorksheet, step: StepId) -> String {
    use crate::worksheet::Justification;
    match &ws.get_step(step).justification {
        Justification::Assertion(a) => a.label.clone(),
        Justification::Hypothesis => "hyp".to_string(),
    }
}
