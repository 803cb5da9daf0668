use crate::closure_rules::{find_closure_rule, ClosureKind};
use crate::config::TransformConfig;
use crate::generalized_stmt::ConstSubst;
use crate::mining::SkipReason;
use crate::tests::common::*;
use crate::transforms::TransformInfo;
use crate::worksheet::WorksheetInfo;

#[test]
fn test_pure_closure_is_cataloged() {
    let (db, info) = setup();
    let plus = db.symbols.get_atom("caddc").unwrap();
    assert!(info.closure.has_closure_assert(
        plus,
        &ConstSubst::all_variable(2),
        &template(&db, "wcel(_, cc)")
    ));
    assert!(!info.closure.has_closure_assert(
        plus,
        &ConstSubst::all_variable(2),
        &template(&db, "wcel(_, caddc(cc, cc))")
    ));
}

#[test]
fn test_constant_argument_is_cataloged() {
    let (db, info) = setup();
    let f = db.symbols.get_atom("f").unwrap();
    let cs = ConstSubst::new(vec![None, Some(node(&db, "K"))]);
    assert!(info
        .closure
        .has_closure_assert(f, &cs, &template(&db, "wcel(_, cc)")));
    assert!(!info.closure.has_closure_assert(
        f,
        &ConstSubst::all_variable(2),
        &template(&db, "wcel(_, cc)")
    ));
}

#[test]
fn test_reversed_arguments_are_not_cataloged() {
    let (db, info) = setup();
    let sub = db.symbols.get_atom("csub").unwrap();
    assert!(!info.closure.has_closure_assert(
        sub,
        &ConstSubst::all_variable(2),
        &template(&db, "wcel(_, cc)")
    ));
    let subrevcl = db.get_assertion("subrevcl").unwrap();
    assert_eq!(
        find_closure_rule(subrevcl).skip_reason(),
        Some(SkipReason::IncorrectOrder)
    );
}

#[test]
fn test_catalog_contents() {
    let (db, info) = setup();
    let rules = info.closure.rules();
    let labels: Vec<(ClosureKind, &str)> = rules
        .iter()
        .map(|r| (r.kind, r.assertion.label.as_str()))
        .collect();
    assert_eq!(labels.len(), 5);
    for expected in ["addcl", "fkcl", "sincl"] {
        assert!(labels.contains(&(ClosureKind::Pure, expected)), "{}", expected);
    }
    for expected in ["mulcl", "negcl"] {
        assert!(
            labels.contains(&(ClosureKind::Implication, expected)),
            "{}",
            expected
        );
    }

    // addcl2 has the same key as addcl, and comes later.
    let plus = db.symbols.get_atom("caddc").unwrap();
    let plus_rules: Vec<&str> = rules
        .iter()
        .filter(|r| r.key.symbol == plus)
        .map(|r| r.assertion.label.as_str())
        .collect();
    assert_eq!(plus_rules, vec!["addcl"]);
}

#[test]
fn test_pure_closure_property() {
    let (db, info) = setup();
    let (mut ws, hyps) = worksheet(&db, &["wcel(A, cc)", "wcel(B, cc)"]);
    let goal = node(&db, "caddc(caddc(A, B), A)");
    let gen = generalize(&info, &db, &goal, "wcel(_, cc)");
    assert!(info.closure.can_prove(&ws, &gen, &goal));

    let step = info.closure.closure_property(&mut ws, &gen, &goal);
    assert_eq!(ws.formula(step), &node(&db, "wcel(caddc(caddc(A, B), A), cc)"));
    assert_eq!(label(&ws, step), "addcl");
    assert_eq!(ws.len(), 4);

    let inner = ws
        .get_proof_step(&node(&db, "wcel(caddc(A, B), cc)"))
        .unwrap();
    assert_eq!(ws.get_step(inner).hyps, hyps);
    assert_eq!(ws.get_step(step).hyps, vec![inner, hyps[0]]);
}

#[test]
fn test_closure_property_is_memoized() {
    let (db, info) = setup();
    let (mut ws, _) = worksheet(&db, &["wcel(A, cc)", "wcel(B, cc)"]);
    let goal = node(&db, "caddc(caddc(A, B), caddc(A, B))");
    let gen = generalize(&info, &db, &goal, "wcel(_, cc)");

    let first = info.closure.closure_property(&mut ws, &gen, &goal);
    let len = ws.len();
    let second = info.closure.closure_property(&mut ws, &gen, &goal);
    assert_eq!(first, second);
    assert_eq!(ws.len(), len);

    // The repeated argument gets one step.
    assert_eq!(len, 4);
    let inner = ws
        .get_proof_step(&node(&db, "wcel(caddc(A, B), cc)"))
        .unwrap();
    assert_eq!(ws.get_step(first).hyps, vec![inner, inner]);
}

#[test]
fn test_constant_argument_closure_property() {
    let (db, info) = setup();
    let (mut ws, _) = worksheet(&db, &["wcel(A, cc)"]);
    let goal = node(&db, "fv(csin, fv(csin, A))");
    let gen = generalize(&info, &db, &goal, "wcel(_, cc)");
    assert_eq!(gen.var_indexes, vec![1]);

    let step = info.closure.closure_property(&mut ws, &gen, &goal);
    assert_eq!(ws.formula(step), &node(&db, "wcel(fv(csin, fv(csin, A)), cc)"));
    assert_eq!(label(&ws, step), "sincl");
    assert_eq!(ws.len(), 3);
}

#[test]
fn test_implication_closure_property() {
    let (db, info) = setup();
    let (mut ws, hyps) = worksheet(&db, &["wcel(C, cc)", "wcel(caddc(A, B), cc)"]);
    let goal = node(&db, "cmul(C, caddc(A, B))");
    let gen = generalize(&info, &db, &goal, "wcel(_, cc)");

    let step = info.closure.closure_property(&mut ws, &gen, &goal);
    assert_eq!(ws.formula(step), &node(&db, "wcel(cmul(C, caddc(A, B)), cc)"));
    assert_eq!(label(&ws, step), "ax-mp");

    let &[conj, instance] = ws.get_step(step).hyps.as_slice() else {
        panic!("modus ponens needs two hypotheses");
    };
    assert_eq!(
        ws.formula(conj),
        &node(&db, "wa(wcel(C, cc), wcel(caddc(A, B), cc))")
    );
    assert_eq!(label(&ws, conj), "pm3.2i");
    assert_eq!(ws.get_step(conj).hyps, hyps);
    assert_eq!(
        ws.formula(instance),
        &node(
            &db,
            "wi(wa(wcel(C, cc), wcel(caddc(A, B), cc)), wcel(cmul(C, caddc(A, B)), cc))"
        )
    );
    assert_eq!(label(&ws, instance), "mulcl");
    assert_eq!(ws.len(), 5);
}

#[test]
fn test_nested_implication_closure() {
    let (db, info) = setup();
    let (mut ws, _) = worksheet(&db, &["wcel(C, cc)"]);
    let goal = node(&db, "cneg(cneg(C))");
    let gen = generalize(&info, &db, &goal, "wcel(_, cc)");

    let step = info.closure.closure_property(&mut ws, &gen, &goal);
    assert_eq!(ws.formula(step), &node(&db, "wcel(cneg(cneg(C)), cc)"));
    assert!(ws
        .get_proof_step(&node(&db, "wi(wcel(C, cc), wcel(cneg(C), cc))"))
        .is_some());
    assert_eq!(ws.len(), 5);
}

#[test]
fn test_mixed_symbols_compose_through_the_worksheet() {
    let (db, info) = setup();
    let (mut ws, _) = worksheet(&db, &["wcel(A, cc)", "wcel(B, cc)"]);

    let product = node(&db, "cmul(A, B)");
    let gen = generalize(&info, &db, &product, "wcel(_, cc)");
    info.closure.closure_property(&mut ws, &gen, &product);

    let goal = node(&db, "caddc(cmul(A, B), A)");
    let gen = generalize(&info, &db, &goal, "wcel(_, cc)");
    let step = info.closure.closure_property(&mut ws, &gen, &goal);
    assert_eq!(ws.formula(step), &node(&db, "wcel(caddc(cmul(A, B), A), cc)"));
    assert_eq!(label(&ws, step), "addcl");
}

#[test]
fn test_can_prove_requires_hypotheses() {
    let (db, info) = setup();
    let (ws, _) = worksheet(&db, &["wcel(A, cc)"]);
    let goal = node(&db, "caddc(A, B)");
    let gen = generalize(&info, &db, &goal, "wcel(_, cc)");
    assert!(!info.closure.can_prove(&ws, &gen, &goal));
    assert!(info
        .closure
        .can_prove(&ws, &gen, &node(&db, "caddc(A, caddc(A, A))")));
    assert_eq!(ws.len(), 1);
}

#[test]
#[should_panic]
fn test_closure_property_without_hypothesis() {
    let (db, info) = setup();
    let (mut ws, _) = worksheet(&db, &["wcel(A, cc)"]);
    let goal = node(&db, "caddc(A, B)");
    let gen = generalize(&info, &db, &goal, "wcel(_, cc)");
    info.closure.closure_property(&mut ws, &gen, &goal);
}

#[test]
fn test_disabled_implication_catalog() {
    let db = set_mm();
    let config = TransformConfig {
        impl_closure: false,
        ..TransformConfig::default()
    };
    let info = TransformInfo::new(&db, &config);
    let t = template(&db, "wcel(_, cc)");
    assert!(info
        .closure
        .generalize(&node(&db, "cmul(A, B)"), &t)
        .is_none());
    assert!(info
        .closure
        .generalize(&node(&db, "caddc(A, B)"), &t)
        .is_some());
}
