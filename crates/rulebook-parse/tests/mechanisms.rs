//! Mechanism parser tests over YAML-authored rule bodies.

use rulebook_ast::ast::{Node, NodeKind, Operator};
use rulebook_ast::error::ErrorKind;
use rulebook_ast::foundation::DottedName;
use rulebook_ast::raw::{RawValue, Scalar};
use rulebook_parse::{parse_rule, CompileOptions, ParsedRule};

fn build(name: &str, yaml: &str) -> ParsedRule {
    try_build(name, yaml).unwrap_or_else(|e| panic!("build failed: {}", e))
}

fn try_build(name: &str, yaml: &str) -> Result<ParsedRule, rulebook_ast::CompileError> {
    let body: RawValue = serde_yaml::from_str(yaml).expect("valid yaml");
    parse_rule(&DottedName::parse(name), &body, &CompileOptions::default())
}

fn reference_name(node: &Node) -> &str {
    &node.as_reference().expect("reference").name
}

#[test]
fn test_formula_shorthand() {
    let parsed = build("total", "'a + 2'");
    match &parsed.rule.expression.kind {
        NodeKind::Operation { operator, left, .. } => {
            assert_eq!(*operator, Operator::Add);
            assert_eq!(reference_name(left), "a");
        }
        other => panic!("unexpected {}", other.mechanism_name()),
    }
    assert_eq!(parsed.rule.expression.context, DottedName::parse("total"));
}

#[test]
fn test_number_body_is_constant() {
    let parsed = build("rate", "0.2");
    assert_eq!(
        parsed.rule.expression.kind,
        NodeKind::Constant {
            value: Scalar::Number(0.2)
        }
    );
}

#[test]
fn test_rule_without_value_is_input() {
    let parsed = build("salary", "title: Gross salary");
    assert_eq!(parsed.rule.title.as_deref(), Some("Gross salary"));
    match &parsed.rule.expression.kind {
        NodeKind::SituationLookup { key, value } => {
            assert_eq!(key, &DottedName::parse("salary"));
            assert_eq!(value.kind, NodeKind::Constant { value: Scalar::Null });
        }
        other => panic!("unexpected {}", other.mechanism_name()),
    }
}

#[test]
fn test_chainable_keys_apply_in_fixed_order() {
    let parsed = build(
        "bonus",
        r#"
unit: EUR
ceiling: 1000
applicable if: employed
value: base * 2
"#,
    );
    let root = &parsed.rule.expression;
    let NodeKind::ApplicableIf { condition, value } = &root.kind else {
        panic!("expected applicable if, got {}", root.kind.mechanism_name());
    };
    assert_eq!(reference_name(condition), "employed");
    let NodeKind::Ceiling { value, .. } = &value.kind else {
        panic!("expected ceiling");
    };
    let NodeKind::Unit { unit, operand } = &value.kind else {
        panic!("expected unit");
    };
    assert_eq!(unit, "EUR");
    assert!(matches!(operand.kind, NodeKind::Operation { .. }));
}

#[test]
fn test_unit_label_hook() {
    let body: RawValue = serde_yaml::from_str("value: 3\nunit: ' Days '").unwrap();
    let options = CompileOptions::default().with_unit_label(|unit| unit.trim().to_lowercase());
    let parsed = parse_rule(&DottedName::parse("d"), &body, &options).unwrap();
    let NodeKind::Unit { unit, .. } = &parsed.rule.expression.kind else {
        panic!("expected unit");
    };
    assert_eq!(unit, "days");
}

#[test]
fn test_scale_brackets() {
    let parsed = build(
        "tax",
        r#"
scale:
  base: income
  brackets:
    - rate: 0%
      ceiling: 10000
    - rate: 20%
"#,
    );
    let NodeKind::Scale(brackets) = &parsed.rule.expression.kind else {
        panic!("expected scale");
    };
    assert_eq!(reference_name(&brackets.base), "income");
    assert_eq!(brackets.brackets.len(), 2);
    assert!(brackets.brackets[0].ceiling.is_some());
    assert!(brackets.brackets[1].ceiling.is_none());
    assert_eq!(
        brackets.brackets[1].value.kind,
        NodeKind::Constant {
            value: Scalar::Number(0.2)
        }
    );
}

#[test]
fn test_product_defaults_missing_operands_to_one() {
    let parsed = build("p", "product: { base: salary }");
    let NodeKind::Product {
        rate,
        factor,
        ceiling,
        ..
    } = &parsed.rule.expression.kind
    else {
        panic!("expected product");
    };
    assert_eq!(rate.kind, NodeKind::Constant { value: Scalar::Number(1.0) });
    assert_eq!(factor.kind, NodeKind::Constant { value: Scalar::Number(1.0) });
    assert!(ceiling.is_none());
}

#[test]
fn test_components_expand_into_sum_with_source_map() {
    let parsed = build(
        "contributions",
        r#"
product:
  rate: 10%
  components:
    - base: salary
    - base: bonus
      applicable if: eligible
      rate: 5%
"#,
    );
    let root = &parsed.rule.expression;
    let source_map = root.source_map.as_ref().expect("source map");
    assert_eq!(source_map.mechanism, "components");
    assert_eq!(source_map.origin_key.as_deref(), Some("product"));

    let NodeKind::Sum { terms } = &root.kind else {
        panic!("expected sum");
    };
    assert_eq!(terms.len(), 2);
    let NodeKind::Product { base, rate, .. } = &terms[0].kind else {
        panic!("expected product");
    };
    assert_eq!(reference_name(base), "salary");
    assert_eq!(rate.kind, NodeKind::Constant { value: Scalar::Number(0.1) });

    let NodeKind::ApplicableIf { value, .. } = &terms[1].kind else {
        panic!("expected gated summand");
    };
    let NodeKind::Product { rate, .. } = &value.kind else {
        panic!("expected product");
    };
    assert_eq!(rate.kind, NodeKind::Constant { value: Scalar::Number(0.05) });
}

#[test]
fn test_one_of_choices_are_fake_references() {
    let parsed = build("status", "one of: { choices: [employee, contractor], mandatory: true }");
    let NodeKind::OneOf { choices, mandatory } = &parsed.rule.expression.kind else {
        panic!("expected one of");
    };
    assert!(*mandatory);
    assert!(choices.iter().all(|c| c.as_reference().is_some_and(|r| r.fake)));
}

#[test]
fn test_variations_with_else() {
    let parsed = build(
        "rate",
        r#"
variations:
  - if: age < 26
    then: 0
  - else: 10%
"#,
    );
    let NodeKind::Variations { branches } = &parsed.rule.expression.kind else {
        panic!("expected variations");
    };
    assert_eq!(branches.len(), 2);
    assert!(branches[0].condition.is_some());
    assert!(branches[1].condition.is_none());
}

#[test]
fn test_else_must_be_last() {
    let error = try_build(
        "rate",
        r#"
variations:
  - else: 1
  - if: a
    then: 2
"#,
    )
    .unwrap_err();
    assert_eq!(error.kind, ErrorKind::Syntax);
}

#[test]
fn test_with_children_are_discovered() {
    let parsed = build(
        "salary",
        r#"
value: gross - contributions
with:
  gross: 3000
  contributions:
    with:
      rate: 20%
"#,
    );
    let names: Vec<String> = parsed.discovered.iter().map(|r| r.name.to_string()).collect();
    assert_eq!(
        names,
        vec![
            "salary . gross",
            "salary . contributions . rate",
            "salary . contributions",
        ]
    );
}

#[test]
fn test_inline_named_rule_yields_reference() {
    let parsed = build(
        "net",
        r#"
sum:
  - name: base
    value: 100
  - 5
"#,
    );
    assert_eq!(parsed.discovered.len(), 1);
    assert_eq!(parsed.discovered[0].name, DottedName::parse("net . base"));
    let NodeKind::Sum { terms } = &parsed.rule.expression.kind else {
        panic!("expected sum");
    };
    assert_eq!(reference_name(&terms[0]), "base");
}

#[test]
fn test_replaces_declarations() {
    let parsed = build(
        "reduced rate",
        r#"
replaces:
  - rule: rate
    in: [employer]
    except: employer . exempt
  - bonus
"#,
    );
    let replacements = &parsed.rule.replacements;
    assert_eq!(replacements.len(), 2);
    assert_eq!(reference_name(&replacements[0].replaced), "rate");
    assert_eq!(replacements[0].whitelist.len(), 1);
    assert_eq!(reference_name(&replacements[0].blacklist[0]), "employer . exempt");
    assert!(replacements[1].by.is_none());
    assert!(replacements[0].replaced.as_reference().is_some_and(|r| r.fake));
}

#[test]
fn test_errors_name_the_rule() {
    let error = try_build("broken", "frobnicate: 3").unwrap_err();
    assert_eq!(error.kind, ErrorKind::UnknownMechanism);
    assert_eq!(error.rule, Some(DottedName::parse("broken")));

    let error = try_build("broken", "value: 'a +'").unwrap_err();
    assert_eq!(error.kind, ErrorKind::InvalidFormula);

    let error = try_build("broken", "[1, 2]").unwrap_err();
    assert_eq!(error.kind, ErrorKind::Syntax);
    assert!(error.message.contains("broken"));

    let error = try_build("broken", "sum: 3").unwrap_err();
    assert!(error.message.contains("expects a list"));

    let error = try_build("broken", "value: 1\nformula: 2").unwrap_err();
    assert_eq!(error.kind, ErrorKind::Syntax);
}
