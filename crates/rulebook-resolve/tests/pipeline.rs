//! End-to-end compile tests over YAML-authored rule sets.

use indexmap::IndexMap;
use rulebook_ast::ast::{walk_node, NodeKind};
use rulebook_ast::diagnostics::CollectingSink;
use rulebook_ast::error::{CompileError, ErrorKind};
use rulebook_ast::foundation::DottedName;
use rulebook_ast::raw::RawValue;
use rulebook_parse::{parse_rule, CompileOptions, MechanismParser};
use rulebook_resolve::resolve::references::resolve_references;
use rulebook_resolve::{compile, desugar_rules, CompiledRules};

fn raw(source: &str) -> IndexMap<String, RawValue> {
    serde_yaml::from_str(source).expect("valid yaml")
}

fn try_compile(source: &str) -> Result<(CompiledRules, CollectingSink), CompileError> {
    let mut sink = CollectingSink::new();
    let compiled = compile(raw(source), CompileOptions::default(), &MechanismParser, &mut sink)?;
    Ok((compiled, sink))
}

fn compile_ok(source: &str) -> CompiledRules {
    try_compile(source)
        .unwrap_or_else(|e| panic!("compile failed: {}", e))
        .0
}

fn resolved_targets(compiled: &CompiledRules, rule: &str) -> Vec<String> {
    let mut targets = Vec::new();
    let rule = compiled.get(rule).expect("rule exists");
    walk_node(&rule.expression, &mut |node| {
        if let Some(reference) = node.as_reference() {
            if let Some(target) = &reference.dotted_name {
                targets.push(target.to_string());
            }
        }
    });
    targets
}

const PAYROLL: &str = r#"
salary: gross - contributions
salary . gross:
  title: Gross salary
  acronym: GS
salary . contributions: gross * rate
salary . contributions . rate: 22%
bonus:
  applicable if: salary . gross > 3000
  value: 500
total:
  sum:
    - salary
    - bonus
"#;

#[test]
fn test_key_count_and_references_resolve_to_keys() {
    let compiled = compile_ok(PAYROLL);
    assert_eq!(compiled.len(), 6);

    for (name, rule) in &compiled.rules {
        walk_node(&rule.expression, &mut |node| {
            if let Some(reference) = node.as_reference() {
                let target = reference
                    .dotted_name
                    .as_ref()
                    .unwrap_or_else(|| panic!("unresolved `{}` in {}", reference.name, name));
                assert!(compiled.rules.contains_key(target), "{} not a key", target);
            }
        });
    }
}

#[test]
fn test_references_carry_target_metadata() {
    let compiled = compile_ok(PAYROLL);
    let rule = compiled.get("salary . contributions").unwrap();
    let mut titles = Vec::new();
    walk_node(&rule.expression, &mut |node| {
        if let Some(reference) = node.as_reference() {
            titles.push((reference.title.clone(), reference.acronym.clone()));
        }
    });
    assert_eq!(
        titles[0],
        (Some("Gross salary".to_string()), Some("GS".to_string()))
    );
    assert_eq!(
        resolved_targets(&compiled, "salary . contributions"),
        vec!["salary . gross", "salary . contributions . rate"]
    );
}

#[test]
fn test_nullability_of_gates_and_sums() {
    let compiled = compile_ok(PAYROLL);
    assert_eq!(compiled.is_nullable("bonus"), Some(true));
    assert_eq!(compiled.is_nullable("total"), Some(false));
    assert_eq!(compiled.is_nullable("salary . contributions . rate"), Some(false));
    // inputs forward their null default
    assert_eq!(compiled.is_nullable("salary . gross"), Some(true));
}

#[test]
fn test_cycles_compile() {
    let compiled = compile_ok(
        r#"
a: b + 1
b: a + 1
"#,
    );
    assert_eq!(compiled.len(), 2);
    assert_eq!(resolved_targets(&compiled, "a"), vec!["b"]);
    assert_eq!(resolved_targets(&compiled, "b"), vec!["a"]);
}

#[test]
fn test_list_body_error_names_the_rule() {
    let error = try_compile("broken rule: [1, 2]").unwrap_err();
    assert_eq!(error.kind, ErrorKind::Syntax);
    assert!(error.message.contains("broken rule"));
    assert_eq!(error.rule, Some(DottedName::parse("broken rule")));
}

#[test]
fn test_compile_is_deterministic() {
    assert_eq!(compile_ok(PAYROLL), compile_ok(PAYROLL));
}

#[test]
fn test_inline_ref_shorthand_defines_rule() {
    let compiled = compile_ok(
        r#"
salary: 2000
contribution:
  product:
    base [ref]: salary
    rate [ref employer rate]: 4%
"#,
    );
    let names: Vec<String> = compiled.rules.keys().map(ToString::to_string).collect();
    assert_eq!(
        names,
        vec![
            "salary",
            "contribution",
            "contribution . base",
            "contribution . employer rate",
        ]
    );
    assert_eq!(
        resolved_targets(&compiled, "contribution"),
        vec!["contribution . base", "contribution . employer rate"]
    );
    assert_eq!(resolved_targets(&compiled, "contribution . base"), vec!["salary"]);
}

#[test]
fn test_inline_ref_colliding_with_plain_key_is_fatal() {
    let error = try_compile(
        r#"
salary: 3000
contribution:
  product:
    base: 1
    base [ref]: salary
    rate: 10%
"#,
    )
    .unwrap_err();
    assert_eq!(error.kind, ErrorKind::Syntax);
    assert_eq!(error.rule, Some(DottedName::parse("contribution")));
    assert!(error.message.contains("`base`"));
}

#[test]
fn test_with_children_are_registered() {
    let compiled = compile_ok(
        r#"
net:
  value: gross - tax
  with:
    gross: 3000
    tax: gross * 10%
"#,
    );
    assert_eq!(compiled.len(), 3);
    assert_eq!(resolved_targets(&compiled, "net"), vec!["net . gross", "net . tax"]);
    assert_eq!(resolved_targets(&compiled, "net . tax"), vec!["net . gross"]);
}

#[test]
fn test_duplicate_names_are_fatal() {
    let error = try_compile(
        r#"
a:
  with:
    b: 1
a . b: 2
"#,
    )
    .unwrap_err();
    assert_eq!(error.kind, ErrorKind::DuplicateName);
    assert_eq!(error.rule, Some(DottedName::parse("a . b")));
}

#[test]
fn test_ambiguous_and_undefined_references() {
    let error = try_compile(
        r#"
employee . rate: 1
employer . rate: 2
total: rate
"#,
    )
    .unwrap_err();
    assert_eq!(error.kind, ErrorKind::AmbiguousName);
    assert_eq!(error.notes.len(), 2);

    let error = try_compile("total: missing + 1").unwrap_err();
    assert_eq!(error.kind, ErrorKind::UndefinedName);
    assert!(error.message.contains("missing") && error.message.contains("total"));
}

fn build_rules(source: &str) -> IndexMap<DottedName, rulebook_ast::ast::RuleNode> {
    let mut rules = IndexMap::new();
    for (name, body) in desugar_rules(raw(source)).unwrap() {
        let parsed = parse_rule(&DottedName::parse(&name), &body, &CompileOptions::default())
            .expect("rule builds");
        for rule in std::iter::once(parsed.rule).chain(parsed.discovered) {
            rules.insert(rule.name.clone(), rule);
        }
    }
    rules
}

#[test]
fn test_graph_excludes_fake_references_and_keeps_duplicates() {
    let rules = build_rules(
        r#"
status:
  one of:
    choices: [employee, contractor]
status . employee:
status . contractor:
double: status . employee + status . employee
"#,
    );
    let (_, graph) = resolve_references(rules).unwrap();
    assert!(graph[&DottedName::parse("status")].is_empty());
    assert_eq!(
        graph[&DottedName::parse("double")],
        vec![DottedName::parse("status . employee"); 2]
    );
}

const REPLACEMENTS: &str = r#"
salary: 3000
reduced salary:
  replaces:
    - rule: salary
      except: tax
  value: 2000
net: salary
tax: salary * 10%
payroll:
  value: salary
  with:
    detail: salary
"#;

#[test]
fn test_replacements_rewrite_eligible_references() {
    let (compiled, sink) = try_compile(REPLACEMENTS).unwrap();
    assert!(sink.is_empty());

    let net = &compiled.get("net").unwrap().expression;
    let NodeKind::ReplacementTarget { original, candidates } = &net.kind else {
        panic!("expected replacement target, got {}", net.kind.mechanism_name());
    };
    assert_eq!(
        original.as_reference().and_then(|r| r.dotted_name.clone()),
        Some(DottedName::parse("salary"))
    );
    assert_eq!(candidates.len(), 1);
    assert_eq!(
        candidates[0]
            .applicable
            .as_reference()
            .and_then(|r| r.dotted_name.clone()),
        Some(DottedName::parse("reduced salary"))
    );

    // blacklisted namespace
    let tax = &compiled.get("tax").unwrap().expression;
    let mut wrapped = false;
    walk_node(tax, &mut |node| {
        wrapped |= matches!(node.kind, NodeKind::ReplacementTarget { .. });
    });
    assert!(!wrapped);

    // nested rules are replaced too
    let detail = &compiled.get("payroll . detail").unwrap().expression;
    assert!(matches!(detail.kind, NodeKind::ReplacementTarget { .. }));
}

#[test]
fn test_replacement_whitelist() {
    let compiled = compile_ok(
        r#"
salary: 3000
reduced salary:
  replaces:
    rule: salary
    in: payroll
  value: 2000
net: salary
payroll: salary
"#,
    );
    assert!(compiled.get("net").unwrap().expression.as_reference().is_some());
    assert!(matches!(
        compiled.get("payroll").unwrap().expression.kind,
        NodeKind::ReplacementTarget { .. }
    ));
}

#[test]
fn test_replacement_warnings_go_to_the_sink() {
    let (compiled, sink) = try_compile(
        r#"
bonus: 100
override:
  replaces:
    - rule: bonus
      by: 50
    - bonus
  value: 1
total: bonus
"#,
    )
    .unwrap();

    let kinds: Vec<ErrorKind> = sink.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![ErrorKind::Deprecated, ErrorKind::RedundantReplacement]);
    assert!(sink.has_warnings());
    assert!(sink
        .diagnostics
        .iter()
        .all(|d| d.rule == Some(DottedName::parse("override"))));

    let NodeKind::ReplacementTarget { candidates, .. } =
        &compiled.get("total").unwrap().expression.kind
    else {
        panic!("expected replacement target");
    };
    assert_eq!(candidates.len(), 1);
    assert!(matches!(candidates[0].value.kind, NodeKind::Constant { .. }));
}
